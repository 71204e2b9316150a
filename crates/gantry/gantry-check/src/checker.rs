//! The header checker: work dispatch and per-file checking.
//!
//! `run` fans one task per `(target, file)` pair out to the worker pool
//! and blocks until the outstanding-task counter drains. Tasks share the
//! immutable file map and graph, the sharded reachability caches, and a
//! mutex-guarded error list; nothing else is mutable during a run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use gantry_core::config::{BuildSettings, CheckConfig};
use gantry_core::input_file::{InputFile, InputFileArena, LocationRange};
use gantry_core::label_pattern::LabelPattern;
use gantry_core::source_dir::SourceDir;
use gantry_core::source_file::SourceFile;
use gantry_core::target::{TargetGraph, TargetId};
use gantry_core::traits::{DiskFiles, FileProvider, RayonPool, WorkerPool};
use gantry_core::types::collections::FxHashSet;

use crate::diagnostics::{self, CheckError};
use crate::file_map::FileMap;
use crate::include_iterator::{IncludeIterator, IncludeStyle};
use crate::reachability::{DependencyCache, ReachabilityCache};
use crate::resolver;
use crate::summary::CheckSummary;

/// Checks that every include in the given targets' files is allowed by
/// the dependency graph.
pub struct HeaderChecker {
    /// Worker tasks hold a reference to this shared state, so it lives
    /// behind an `Arc` from construction on.
    inner: Arc<CheckerState>,
}

struct CheckerState {
    build_settings: BuildSettings,
    graph: Arc<TargetGraph>,
    check_generated: bool,
    check_system: bool,

    /// Maps source files to the targets claiming them. Covers the whole
    /// universe, not just the targets being checked.
    file_map: FileMap,

    files: Arc<dyn FileProvider>,
    pool: Arc<dyn WorkerPool>,

    arena: InputFileArena,
    dependency_cache: DependencyCache,

    errors: Mutex<Vec<CheckError>>,

    /// Tasks posted but not yet finished.
    task_count: AtomicUsize,
    task_count_lock: Mutex<()>,
    /// Signaled when `task_count` reaches zero.
    task_count_cv: Condvar,
}

impl HeaderChecker {
    /// Build a checker over the full target universe. `check_generated`
    /// extends checking to generated files, which only makes sense after
    /// a build has produced them; `check_system` extends it to
    /// `#include <…>` directives.
    pub fn new(
        build_settings: BuildSettings,
        graph: Arc<TargetGraph>,
        check_generated: bool,
        check_system: bool,
    ) -> HeaderChecker {
        let mut file_map = FileMap::new();
        for id in graph.ids() {
            file_map.add_target(&graph, id);
        }
        HeaderChecker {
            inner: Arc::new(CheckerState {
                build_settings,
                graph,
                check_generated,
                check_system,
                file_map,
                files: Arc::new(DiskFiles),
                pool: Arc::new(RayonPool),
                arena: InputFileArena::new(),
                dependency_cache: DependencyCache::new(),
                errors: Mutex::new(Vec::new()),
                task_count: AtomicUsize::new(0),
                task_count_lock: Mutex::new(()),
                task_count_cv: Condvar::new(),
            }),
        }
    }

    /// Build a checker from a loaded [`CheckConfig`].
    pub fn with_config(
        build_settings: BuildSettings,
        graph: Arc<TargetGraph>,
        config: CheckConfig,
    ) -> HeaderChecker {
        HeaderChecker::new(
            build_settings,
            graph,
            config.check_generated,
            config.check_system,
        )
    }

    /// Substitute the filesystem, for tests. Only valid before `run`.
    pub fn with_file_provider(mut self, files: Arc<dyn FileProvider>) -> HeaderChecker {
        self.state_mut().files = files;
        self
    }

    /// Substitute the worker pool, for tests or single-threaded callers.
    /// Only valid before `run`.
    pub fn with_worker_pool(mut self, pool: Arc<dyn WorkerPool>) -> HeaderChecker {
        self.state_mut().pool = pool;
        self
    }

    fn state_mut(&mut self) -> &mut CheckerState {
        Arc::get_mut(&mut self.inner).expect("checker collaborators must be set before running")
    }

    /// Check every file of the given targets. Returns the collected
    /// violations from all tasks if there were any; the set of
    /// violations is deterministic, their order is not.
    ///
    /// `force_check` overrides targets that opted out with
    /// `check_includes = false`.
    pub fn run(
        &self,
        to_check: &[TargetId],
        force_check: bool,
    ) -> Result<CheckSummary, Vec<CheckError>> {
        let start = Instant::now();
        let state = &self.inner;

        // The caller may hand us the full list; checking only applies
        // to binary targets.
        let mut files_to_check = FileMap::new();
        for &id in to_check {
            if state.graph.get(id).kind.is_binary() {
                files_to_check.add_target(&state.graph, id);
            }
        }
        tracing::debug!(
            targets = to_check.len(),
            files = files_to_check.len(),
            "starting header check"
        );

        let (files_checked, tasks_run) =
            run_check_over_files(state, &files_to_check, force_check);

        let errors = std::mem::take(&mut *state.errors.lock().expect("error list poisoned"));
        if errors.is_empty() {
            Ok(CheckSummary {
                files_checked,
                tasks_run,
                duration: start.elapsed(),
            })
        } else {
            tracing::debug!(violations = errors.len(), "header check failed");
            Err(errors)
        }
    }
}

/// Post one task per claiming target for every checkable file, then
/// wait for the counter to drain.
fn run_check_over_files(
    state: &Arc<CheckerState>,
    files: &FileMap,
    force_check: bool,
) -> (usize, usize) {
    // Hold one guard increment while posting so the counter can't hit
    // zero before everything is queued.
    state.task_count.fetch_add(1, Ordering::SeqCst);

    let mut files_checked = 0usize;
    let mut tasks_run = 0usize;
    for (file, claims) in files.iter() {
        if !file.kind().is_checkable() {
            continue;
        }

        if !state.check_generated {
            // If any target marks the file generated, skip it. The full
            // map decides: `files` covers only the targets being
            // checked, other targets may still generate it.
            let is_generated = state
                .file_map
                .get(file)
                .is_some_and(|all| all.iter().any(|claim| claim.is_generated));
            if is_generated {
                continue;
            }
        }

        files_checked += 1;
        for claim in claims {
            if state.graph.get(claim.target).check_includes || force_check {
                tasks_run += 1;
                state.task_count.fetch_add(1, Ordering::SeqCst);
                let task_state = Arc::clone(state);
                let target = claim.target;
                let file = file.clone();
                state
                    .pool
                    .spawn(Box::new(move || task_state.do_work(target, &file)));
            }
        }
    }

    state.finish_task();

    let mut guard = state.task_count_lock.lock().expect("task lock poisoned");
    while state.task_count.load(Ordering::SeqCst) != 0 {
        guard = state
            .task_count_cv
            .wait(guard)
            .expect("task lock poisoned");
    }
    (files_checked, tasks_run)
}

impl CheckerState {
    fn finish_task(&self) {
        if self.task_count.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _guard = self.task_count_lock.lock().expect("task lock poisoned");
            self.task_count_cv.notify_one();
        }
    }

    /// One task: check a single file in the context of one target.
    fn do_work(&self, target: TargetId, file: &SourceFile) {
        let mut errors = Vec::new();
        if !self.check_file(target, file, &mut errors) {
            self.errors
                .lock()
                .expect("error list poisoned")
                .append(&mut errors);
        }
        self.finish_task();
    }

    /// Check every include of `file` as seen from `from_target`. Returns
    /// false when new errors were appended.
    fn check_file(
        &self,
        from_target: TargetId,
        file: &SourceFile,
        errors: &mut Vec<CheckError>,
    ) -> bool {
        // Generated files included as sources elsewhere don't exist at
        // checking time. Generated files must live in the output tree,
        // so the name alone tells us to skip.
        if !self.check_generated && self.build_settings.is_output_file(file) {
            return true;
        }

        let path = self.build_settings.full_path(file);
        let contents = match self.files.read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) if self.build_settings.is_output_file(file) => {
                // A not-yet-generated output is acceptable; this code
                // does not understand conditional compilation anyway.
                return true;
            }
            Err(err) => {
                tracing::debug!(file = %file, error = %err, "source file unreadable");
                errors.push(diagnostics::source_file_not_found(
                    self.graph.get(from_target),
                    file.value(),
                ));
                return false;
            }
        };
        let input_file = InputFile::new(file.clone(), contents);

        // The include search path: every configuration contributing to
        // the target, in declaration order. Duplicates are fine, first
        // match wins.
        let mut include_dirs: Vec<SourceDir> = Vec::new();
        for values in self.graph.get(from_target).all_config_values() {
            include_dirs.extend(values.include_dirs.iter().cloned());
        }

        let error_count_before = errors.len();
        let cache = self.dependency_cache.cache_for(from_target);

        // Pairs already proven non-dependent for this file, so repeated
        // includes from the same target skip the cache lookup entirely.
        let mut no_dependency_cache: FxHashSet<(TargetId, TargetId)> = FxHashSet::default();

        for include in IncludeIterator::new(&input_file) {
            if include.style == IncludeStyle::System && !self.check_system {
                continue;
            }
            let resolved = resolver::source_file_for_include(
                include.literal,
                include.style,
                &include_dirs,
                file,
                &self.file_map,
            );
            if let Some(include_file) = resolved {
                self.check_include(
                    from_target,
                    &cache,
                    &input_file,
                    &include_file,
                    include.range,
                    &mut no_dependency_cache,
                    errors,
                );
            }
        }

        errors.len() == error_count_before
    }

    /// Decide whether `from_target`'s file may include `include_file`.
    ///
    /// The header must be effectively public in some claiming target
    /// (public in the target, or the includer is friended), and that
    /// target must be reachable over a permitted chain. With several
    /// claiming targets one good claim is enough: success discards any
    /// error recorded for an earlier claim.
    #[allow(clippy::too_many_arguments)]
    fn check_include(
        &self,
        from_target: TargetId,
        cache: &ReachabilityCache,
        source_file: &InputFile,
        include_file: &SourceFile,
        range: LocationRange,
        no_dependency_cache: &mut FxHashSet<(TargetId, TargetId)>,
        errors: &mut Vec<CheckError>,
    ) {
        // Unknown headers are tolerated: the scanner reports every
        // lexical include, even ones the preprocessor would drop, and
        // buildfiles legitimately omit headers behind conditionals.
        let Some(claims) = self.file_map.get(include_file) else {
            return;
        };
        let from = self.graph.get(from_target);

        // If no claim is in the includer's toolchain the file belongs to
        // another build variant entirely. The union of all toolchains is
        // visible here, and reasoning across them produces false
        // missing-dependency reports for platform headers.
        let present_in_current_toolchain = claims.iter().any(|claim| {
            self.graph
                .get(claim.target)
                .label
                .toolchains_equal(&from.label)
        });
        if !present_in_current_toolchain {
            return;
        }

        // An error from an earlier claim; a later claim may exonerate.
        let mut pending_error: Option<CheckError> = None;
        let mut found_dependency = false;

        for claim in claims {
            let to_target = claim.target;
            // Files in a target may always include other files of the
            // same target.
            if to_target == from_target {
                return;
            }

            if no_dependency_cache.contains(&(to_target, from_target)) {
                continue;
            }

            let to = self.graph.get(to_target);
            let lookup = cache.is_dependency_of(&self.graph, to_target);
            if lookup.found {
                debug_assert!(lookup.chain.len() >= 2);
                debug_assert_eq!(lookup.chain[0].target, to_target);
                debug_assert_eq!(lookup.chain[lookup.chain.len() - 1].target, from_target);

                found_dependency = true;

                let effectively_public =
                    claim.is_public || LabelPattern::vector_matches(&to.friends, &from.label);

                if effectively_public && lookup.is_permitted {
                    // This claim is fine; discard anything recorded so
                    // far and stop.
                    pending_error = None;
                    break;
                }

                if !effectively_public {
                    pending_error = Some(diagnostics::private_header_error(
                        &self.arena,
                        source_file,
                        range,
                        to,
                    ));
                } else {
                    pending_error = Some(diagnostics::non_public_chain_error(
                        &self.arena,
                        source_file,
                        range,
                        &self.graph,
                        &lookup.chain,
                    ));
                }
            } else if to.allow_circular_includes_from.contains(&from.label) {
                // Not a dependency, but the destination explicitly
                // allows this includer.
                found_dependency = true;
                pending_error = None;
                break;
            } else {
                no_dependency_cache.insert((to_target, from_target));
            }
        }

        if !found_dependency {
            debug_assert!(pending_error.is_none());
            errors.push(diagnostics::unreachable_error(
                &self.arena,
                source_file,
                range,
                &self.graph,
                from_target,
                claims,
            ));
        } else if let Some(error) = pending_error {
            errors.push(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use gantry_core::source_dir::SourceDir;
    use gantry_core::traits::SerialPool;

    use super::*;

    #[test]
    fn empty_universe_runs_clean() {
        let settings = BuildSettings::new("/src", SourceDir::new("//out/"));
        let graph = Arc::new(TargetGraph::new());
        let checker = HeaderChecker::with_config(settings, graph, CheckConfig::default())
            .with_worker_pool(Arc::new(SerialPool));
        let summary = checker.run(&[], false).unwrap();
        assert_eq!(summary.files_checked, 0);
        assert_eq!(summary.tasks_run, 0);
    }
}
