use serde::Serialize;

use crate::error::{Result, RulerError};

const CM_PER_INCH: f64 = 2.54;
const MM_PER_INCH: f64 = 25.4;

/// Measurement system a ruler is drawn in. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pixel,
    Inch,
    Centimeter,
    Millimeter,
}

impl Unit {
    /// Short symbol used in tick labels and the mouse readout.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Pixel => "px",
            Self::Inch => "in",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
        }
    }

    /// Parse a unit symbol coming from host configuration.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            "px" => Ok(Self::Pixel),
            "in" => Ok(Self::Inch),
            "cm" => Ok(Self::Centimeter),
            "mm" => Ok(Self::Millimeter),
            other => Err(RulerError::InvalidConfiguration(format!(
                "unknown unit `{other}`"
            ))),
        }
    }

    /// Distance between consecutive ticks in unit space when the host does not
    /// override it.
    pub fn default_step(self) -> f64 {
        match self {
            Self::Pixel => 10.0,
            _ => 0.1,
        }
    }
}

/// Pixels corresponding to one unit. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(px_per_unit: f64) -> Result<Self> {
        if !px_per_unit.is_finite() || px_per_unit <= 0.0 {
            return Err(RulerError::InvalidConfiguration(format!(
                "scale factor must be finite and positive, got {px_per_unit}"
            )));
        }
        Ok(Self(px_per_unit))
    }

    pub fn px_per_unit(self) -> f64 {
        self.0
    }

    pub fn to_pixels(self, value: f64) -> f64 {
        value * self.0
    }

    pub fn to_units(self, px: f64) -> f64 {
        px / self.0
    }
}

/// Host collaborator that measures how many pixels span one physical inch.
///
/// The reference element must never become visible; the converter unmounts it
/// unconditionally, including when measurement fails.
pub trait DpiProbe {
    /// Mount a hidden one-inch-wide reference element on the host surface.
    fn mount_reference_inch(&mut self) -> Result<()>;
    /// Read the rendered pixel width of the mounted reference element.
    fn measure_px(&mut self) -> Result<f64>;
    /// Remove the reference element. Must tolerate a failed mount/measure.
    fn unmount_reference(&mut self);
}

/// Resolve the pixels-per-unit scale for `unit`.
///
/// `Unit::Pixel` is exactly 1 and never touches the probe. Physical units
/// derive from a single probed pixels-per-inch reading.
pub fn resolve_pixels_per_unit(unit: Unit, probe: &mut dyn DpiProbe) -> Result<ScaleFactor> {
    if unit == Unit::Pixel {
        return ScaleFactor::new(1.0);
    }

    probe.mount_reference_inch()?;
    let measured = probe.measure_px();
    probe.unmount_reference();

    let ppi = measured?;
    if !ppi.is_finite() || ppi <= 0.0 {
        return Err(RulerError::MeasurementUnavailable(format!(
            "probe reported {ppi} px per inch"
        )));
    }

    let px_per_unit = match unit {
        Unit::Pixel => unreachable!("handled above"),
        Unit::Inch => ppi,
        Unit::Centimeter => ppi / CM_PER_INCH,
        Unit::Millimeter => ppi / MM_PER_INCH,
    };
    ScaleFactor::new(px_per_unit)
}

/// Probe backed by an explicit caller-supplied reference measurement.
///
/// Hosts that know their rendering density pass it here; tests use it to pin
/// a deterministic DPI. This is an explicit host decision, not a silent
/// engine default.
#[derive(Debug, Clone)]
pub struct FixedProbe {
    px_per_inch: f64,
    mounted: bool,
}

impl FixedProbe {
    pub fn new(px_per_inch: f64) -> Self {
        Self {
            px_per_inch,
            mounted: false,
        }
    }
}

impl DpiProbe for FixedProbe {
    fn mount_reference_inch(&mut self) -> Result<()> {
        self.mounted = true;
        Ok(())
    }

    fn measure_px(&mut self) -> Result<f64> {
        if !self.mounted {
            return Err(RulerError::MeasurementUnavailable(
                "reference element not mounted".to_string(),
            ));
        }
        Ok(self.px_per_inch)
    }

    fn unmount_reference(&mut self) {
        self.mounted = false;
    }
}

/// Probe for hosts with no measurable surface. Always fails to mount.
#[derive(Debug, Clone)]
pub struct UnavailableProbe {
    reason: String,
}

impl UnavailableProbe {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl DpiProbe for UnavailableProbe {
    fn mount_reference_inch(&mut self) -> Result<()> {
        Err(RulerError::MeasurementUnavailable(self.reason.clone()))
    }

    fn measure_px(&mut self) -> Result<f64> {
        Err(RulerError::MeasurementUnavailable(self.reason.clone()))
    }

    fn unmount_reference(&mut self) {}
}
