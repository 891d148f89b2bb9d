//! Registry module orchestrator.
//!
//! Explicit per-container session bookkeeping, owned by the host application.

mod core;

pub use core::{ContainerId, SessionRegistry};
