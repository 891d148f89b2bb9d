//! Surface renderer module orchestrator.
//!
//! The shape model and the capability trait the session drives; any UI
//! toolkit can implement [`SurfaceRenderer`] to host a ruler.

mod core;

pub use core::{
    LabelShape, LineShape, LineStyle, NullSurface, Orientation, RecordingSurface, RecordedShape,
    RectShape, ShapeId, SurfaceRenderer,
};
