//! Pointer sampling: raw viewport coordinates to container-relative pixel and
//! unit values.
//!
//! Samples are ephemeral and recomputed on every pointer move. Values are
//! deliberately unclamped: a pointer inside the rule bands or outside the
//! container yields negative or out-of-range readings, and the crosshair and
//! readout keep tracking linearly.

use serde::Serialize;

use crate::geometry::PointPx;
use crate::units::ScaleFactor;

/// One pointer reading, relative to the container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointerSample {
    pub x_px: f64,
    pub y_px: f64,
    /// Unit-space x, measured from the inner edge of the vertical rule band.
    pub x_unit: f64,
    /// Unit-space y, measured from the inner edge of the horizontal rule band.
    pub y_unit: f64,
}

/// Map a viewport pointer position to a [`PointerSample`].
///
/// `v_rule_px` is the width of the vertical rule band (offsets x),
/// `h_rule_px` the height of the horizontal one (offsets y).
pub fn sample(
    client: PointPx,
    container_origin: PointPx,
    v_rule_px: f64,
    h_rule_px: f64,
    scale: ScaleFactor,
    precision: usize,
) -> PointerSample {
    let x_px = client.x - container_origin.x;
    let y_px = client.y - container_origin.y;
    PointerSample {
        x_px,
        y_px,
        x_unit: round_to(scale.to_units(x_px - v_rule_px), precision),
        y_unit: round_to(scale.to_units(y_px - h_rule_px), precision),
    }
}

/// Round to `precision` decimal places, matching label formatting.
pub fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
