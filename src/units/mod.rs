//! Unit module orchestrator.
//!
//! Measurement units, the pixels-per-unit scale factor, and the DPI probe
//! collaborator used to resolve physical units against the host surface.

mod core;

pub use core::{
    DpiProbe, FixedProbe, ScaleFactor, Unit, UnavailableProbe, resolve_pixels_per_unit,
};
