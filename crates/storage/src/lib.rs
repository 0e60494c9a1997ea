//! Task storage for Taskdash.
//!
//! This crate provides the `TaskStore` interface with an in-memory
//! implementation and a lock-guarded handle for sharing it across tasks.

#![warn(missing_docs)]

pub mod trait_;
pub mod memory;
pub mod shared;
pub mod audit;

pub use trait_::TaskStore;
pub use memory::MemoryTaskStore;
pub use shared::SharedTaskStore;
pub use audit::diff_activities;
