//! Render module orchestrator.
//!
//! Terminal implementation of the surface renderer capability: retained
//! shapes rasterized into a character grid and flushed as ANSI sequences.

mod core;

pub use core::{AnsiSurface, SurfaceSettings};
