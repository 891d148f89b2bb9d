use serde::Serialize;

/// Point in pixel space, relative to the host viewport unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointPx {
    pub x: f64,
    pub y: f64,
}

impl PointPx {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizePx {
    pub width: f64,
    pub height: f64,
}

impl SizePx {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Placement of the host container: viewport origin plus content size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerFrame {
    pub origin: PointPx,
    pub size: SizePx,
}

impl ContainerFrame {
    pub const fn new(origin: PointPx, size: SizePx) -> Self {
        Self { origin, size }
    }
}
