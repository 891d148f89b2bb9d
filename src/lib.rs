//! Measurement ruler overlay engine.
//!
//! Converts a pixel-space container into a labeled measurement grid in a
//! chosen unit and keeps it synchronized with pointer movement and container
//! resizing. The host supplies the collaborators: a DPI probe, a surface
//! renderer to draw through, and an event source for resize/pointer wiring.
//! A terminal-backed surface and host driver ship as the reference
//! implementation of those collaborators.

pub mod error;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod pointer;
pub mod registry;
pub mod render;
pub mod session;
pub mod surface;
pub mod ticks;
pub mod units;
pub mod width;

pub use error::{Result, RulerError};
pub use geometry::{ContainerFrame, PointPx, SizePx};
pub use host::{HostEvent, TerminalHost};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, event_with_fields, json_kv,
};
pub use metrics::{MetricSnapshot, SessionMetrics};
pub use pointer::{PointerSample, round_to, sample};
pub use registry::{ContainerId, SessionRegistry};
pub use render::{AnsiSurface, SurfaceSettings};
pub use session::{
    EventKind, EventSource, RulerConfig, RulerSession, SessionState, SubscriptionId,
    SubscriptionLedger,
};
pub use surface::{
    LabelShape, LineShape, LineStyle, NullSurface, Orientation, RecordedShape, RecordingSurface,
    RectShape, ShapeId, SurfaceRenderer,
};
pub use ticks::{TickDescriptor, TickWeight, plan_axis};
pub use units::{
    DpiProbe, FixedProbe, ScaleFactor, Unit, UnavailableProbe, resolve_pixels_per_unit,
};
pub use width::display_width;
