//! Capability traits for the checker's outward-facing effects.
//!
//! Filesystem access and task scheduling go through narrow traits so
//! tests can substitute deterministic implementations.

pub mod file_provider;
pub mod worker_pool;

pub use file_provider::{DiskFiles, FileProvider};
pub use worker_pool::{RayonPool, SerialPool, WorkerPool};
