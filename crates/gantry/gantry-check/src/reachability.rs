//! Memoized reachability over the dependency graph.
//!
//! For each querying source target the engine runs at most two
//! breadth-first walks: one over permitted edges only, one over all
//! edges. A permitted path is a sequence of public-dependency edges,
//! except that the first hop out of the source may be private: a direct
//! dependent may always include its dependency's headers.
//!
//! Each walk leaves behind a breadcrumb table recording, per discovered
//! target, the predecessor through which it was first reached and that
//! edge's publicness. Only the first discovery is recorded; BFS layer
//! order makes that a shortest chain. Breadcrumbs are write-once, so
//! cyclic graphs terminate, and the tables are kept after the walk so
//! later queries reconstruct chains without walking again.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use gantry_core::target::{TargetGraph, TargetId};
use gantry_core::types::collections::FxHashMap;

/// One link of a dependency chain. `is_public` describes the edge
/// through which `target` was reached from the link after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub target: TargetId,
    pub is_public: bool,
}

/// A reverse dependency chain: `chain[0]` is the queried target,
/// `chain[len - 1]` the querying source.
pub type Chain = Vec<ChainLink>;

/// Answer to "is X a dependency of the cache's source target?".
#[derive(Debug, Clone)]
pub struct DependencyLookup {
    pub found: bool,
    /// Whether the chain is permitted. Also set on the self-reference
    /// convention (`found == false`, empty chain).
    pub is_permitted: bool,
    pub chain: Chain,
}

#[derive(Debug, Clone, Copy)]
struct BreadcrumbNode {
    pred: TargetId,
    is_public: bool,
}

#[derive(Debug, Default)]
struct BreadcrumbTable {
    nodes: FxHashMap<TargetId, BreadcrumbNode>,
}

impl BreadcrumbTable {
    /// Record the first discovery of `target`. Returns false when the
    /// target was already discovered; later discoveries never overwrite.
    fn insert(&mut self, target: TargetId, pred: TargetId, is_public: bool) -> bool {
        match self.nodes.entry(target) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(BreadcrumbNode { pred, is_public });
                true
            }
        }
    }

    fn get(&self, target: TargetId) -> Option<BreadcrumbNode> {
        self.nodes.get(&target).copied()
    }
}

#[derive(Debug, Default)]
struct Walk {
    breadcrumbs: BreadcrumbTable,
    complete: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    permitted: Walk,
    any: Walk,
}

/// Reachability results for all queries from one source target.
#[derive(Debug)]
pub struct ReachabilityCache {
    source: TargetId,
    state: RwLock<CacheState>,
}

impl ReachabilityCache {
    pub fn new(source: TargetId) -> ReachabilityCache {
        ReachabilityCache {
            source,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn source_target(&self) -> TargetId {
        self.source
    }

    /// Look up whether `search_for` is reachable from the source target.
    ///
    /// Permitted chains are considered first; a chain with non-public
    /// intermediate edges is returned only when no permitted chain
    /// exists. A target is trivially visible from itself, reported as
    /// `found == false` with `is_permitted` set so callers can recognize
    /// self-reference without a chain.
    pub fn is_dependency_of(&self, graph: &TargetGraph, search_for: TargetId) -> DependencyLookup {
        if search_for == self.source {
            return DependencyLookup {
                found: false,
                is_permitted: true,
                chain: Chain::new(),
            };
        }

        if let Some(chain) = self.search(graph, search_for, true) {
            return DependencyLookup {
                found: true,
                is_permitted: true,
                chain,
            };
        }
        if let Some(chain) = self.search(graph, search_for, false) {
            return DependencyLookup {
                found: true,
                is_permitted: false,
                chain,
            };
        }
        DependencyLookup {
            found: false,
            is_permitted: false,
            chain: Chain::new(),
        }
    }

    /// One flavor of lookup, running the walk on first use.
    fn search(&self, graph: &TargetGraph, search_for: TargetId, permitted: bool) -> Option<Chain> {
        {
            let state = self.state.read().expect("reachability cache poisoned");
            let walk = if permitted { &state.permitted } else { &state.any };
            if walk.complete {
                return reconstruct_chain(&walk.breadcrumbs, self.source, search_for);
            }
        }

        let mut state = self.state.write().expect("reachability cache poisoned");
        // Another thread may have completed the walk while we upgraded.
        let walk = if permitted {
            &mut state.permitted
        } else {
            &mut state.any
        };
        if !walk.complete {
            perform_dependency_walk(graph, self.source, permitted, &mut walk.breadcrumbs);
            walk.complete = true;
        }
        reconstruct_chain(&walk.breadcrumbs, self.source, search_for)
    }
}

/// Exhaustive BFS from `source`, filling `breadcrumbs`.
fn perform_dependency_walk(
    graph: &TargetGraph,
    source: TargetId,
    permitted: bool,
    breadcrumbs: &mut BreadcrumbTable,
) {
    let mut work_queue: VecDeque<ChainLink> = VecDeque::new();
    work_queue.push_back(ChainLink {
        target: source,
        is_public: true,
    });

    let mut first_hop = true;
    while let Some(link) = work_queue.pop_front() {
        let target = graph.get(link.target);

        // Public dependencies are always eligible.
        for &dep in &target.public_deps {
            if breadcrumbs.insert(dep, link.target, true) {
                work_queue.push_back(ChainLink {
                    target: dep,
                    is_public: true,
                });
            }
        }

        // Private dependencies join when any path is acceptable, and
        // once on the first hop: direct dependents may include headers
        // regardless of the edge's publicness.
        if first_hop || !permitted {
            first_hop = false;
            for &dep in &target.private_deps {
                if breadcrumbs.insert(dep, link.target, false) {
                    work_queue.push_back(ChainLink {
                        target: dep,
                        is_public: false,
                    });
                }
            }
        }
    }
}

/// Rebuild the chain from `search_for` back to `source` out of the
/// breadcrumbs of a completed walk.
fn reconstruct_chain(
    breadcrumbs: &BreadcrumbTable,
    source: TargetId,
    search_for: TargetId,
) -> Option<Chain> {
    let mut chain = Chain::new();
    let mut current = search_for;
    while current != source {
        let node = breadcrumbs.get(current)?;
        chain.push(ChainLink {
            target: current,
            is_public: node.is_public,
        });
        current = node.pred;
    }
    chain.push(ChainLink {
        target: source,
        is_public: true,
    });
    Some(chain)
}

const SHARD_COUNT: usize = 64;

#[derive(Debug, Default)]
struct Shard {
    caches: RwLock<FxHashMap<TargetId, Arc<ReachabilityCache>>>,
}

/// Per-source reachability caches, sharded by source id to limit lock
/// contention across worker threads.
#[derive(Debug)]
pub struct DependencyCache {
    shards: [Shard; SHARD_COUNT],
}

impl DependencyCache {
    pub fn new() -> DependencyCache {
        DependencyCache {
            shards: std::array::from_fn(|_| Shard::default()),
        }
    }

    /// The cache for the given source target, created on first use.
    pub fn cache_for(&self, source: TargetId) -> Arc<ReachabilityCache> {
        let shard = &self.shards[source.index() % SHARD_COUNT];
        if let Some(cache) = shard
            .caches
            .read()
            .expect("dependency cache poisoned")
            .get(&source)
        {
            return Arc::clone(cache);
        }
        let mut caches = shard.caches.write().expect("dependency cache poisoned");
        Arc::clone(
            caches
                .entry(source)
                .or_insert_with(|| Arc::new(ReachabilityCache::new(source))),
        )
    }
}

impl Default for DependencyCache {
    fn default() -> DependencyCache {
        DependencyCache::new()
    }
}
