//! Hash collections for hot paths.
//!
//! FxHash is measurably faster than SipHash for the short keys this
//! workspace hashes (target ids, interned-style path strings). All crates
//! import the aliases from here instead of naming `rustc_hash` directly.

pub use rustc_hash::{FxHashMap, FxHashSet};
