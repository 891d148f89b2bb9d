//! Tick planning module orchestrator.
//!
//! Turns an axis length into an ordered sequence of tick descriptors; the
//! implementation lives in the private `core` module.

mod core;

pub use core::{TickDescriptor, TickWeight, plan_axis};
