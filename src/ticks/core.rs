use serde::Serialize;

use crate::error::{Result, RulerError};
use crate::units::{ScaleFactor, Unit};

/// Tolerance when matching a tick value against subdivision boundaries.
const SUBDIVISION_EPSILON: f64 = 0.001;

/// Visual weight of a tick mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TickWeight {
    Small,
    Medium,
    Major,
}

/// One tick along an axis. Rebuilt from scratch on every layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickDescriptor {
    /// Absolute pixel offset along the axis, including the rule band.
    pub position_px: f64,
    pub weight: TickWeight,
    /// Present on `Major` ticks only.
    pub label: Option<String>,
}

/// Plan the ticks for one axis.
///
/// The usable span starts after the rule band; ticks sit at `i * step` in
/// unit space for every `i` whose value still fits. An axis shorter than its
/// rule band yields an empty plan, not an error.
pub fn plan_axis(
    axis_length_px: f64,
    rule_thickness_px: f64,
    unit: Unit,
    scale: ScaleFactor,
    step: f64,
    precision: usize,
) -> Result<Vec<TickDescriptor>> {
    if !step.is_finite() || step <= 0.0 {
        return Err(RulerError::InvalidConfiguration(format!(
            "tick step must be finite and positive, got {step}"
        )));
    }

    let usable_px = axis_length_px - rule_thickness_px;
    if usable_px <= 0.0 {
        return Ok(Vec::new());
    }
    let usable_units = scale.to_units(usable_px);

    let mut ticks = Vec::new();
    let mut index: u64 = 0;
    loop {
        let unit_value = index as f64 * step;
        if unit_value > usable_units {
            break;
        }

        let weight = classify(unit_value, unit);
        let label = match weight {
            TickWeight::Major => Some(format_label(unit_value, unit, precision)),
            _ => None,
        };
        ticks.push(TickDescriptor {
            position_px: rule_thickness_px + scale.to_pixels(unit_value),
            weight,
            label,
        });
        index += 1;
    }

    Ok(ticks)
}

/// Weight classification by the unit's natural subdivision.
///
/// Millimeter has no subdivision and every tick stays `Small`. That preserves
/// the shipped behavior verbatim; see DESIGN.md before changing it.
fn classify(unit_value: f64, unit: Unit) -> TickWeight {
    match unit {
        Unit::Inch | Unit::Centimeter => {
            let frac = unit_value % 1.0;
            if frac.abs() < SUBDIVISION_EPSILON {
                TickWeight::Major
            } else if (frac - 0.5).abs() < SUBDIVISION_EPSILON {
                TickWeight::Medium
            } else {
                TickWeight::Small
            }
        }
        Unit::Pixel => {
            let rem = unit_value % 100.0;
            if rem == 0.0 {
                TickWeight::Major
            } else if rem == 50.0 {
                TickWeight::Medium
            } else {
                TickWeight::Small
            }
        }
        Unit::Millimeter => TickWeight::Small,
    }
}

fn format_label(unit_value: f64, unit: Unit, precision: usize) -> String {
    format!("{:.*} {}", precision, unit_value, unit.symbol())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_scale() -> ScaleFactor {
        ScaleFactor::new(1.0).unwrap()
    }

    #[test]
    fn pixel_axis_has_expected_count_and_order() {
        let ticks = plan_axis(518.0, 18.0, Unit::Pixel, pixel_scale(), 10.0, 0).unwrap();
        // usable 500px, step 10 -> 0..=500 inclusive.
        assert_eq!(ticks.len(), 51);
        for pair in ticks.windows(2) {
            assert!(pair[0].position_px <= pair[1].position_px);
        }
        assert_eq!(ticks[0].position_px, 18.0);
        assert_eq!(ticks.last().unwrap().position_px, 518.0);
    }

    #[test]
    fn pixel_weights_follow_hundreds_and_fifties() {
        let ticks = plan_axis(518.0, 18.0, Unit::Pixel, pixel_scale(), 10.0, 0).unwrap();
        let weight_at = |value: f64| {
            ticks
                .iter()
                .find(|t| (t.position_px - (18.0 + value)).abs() < 1e-9)
                .unwrap()
                .weight
        };
        assert_eq!(weight_at(100.0), TickWeight::Major);
        assert_eq!(weight_at(50.0), TickWeight::Medium);
        assert_eq!(weight_at(30.0), TickWeight::Small);
    }

    #[test]
    fn inch_weights_follow_halves() {
        let scale = ScaleFactor::new(96.0).unwrap();
        let ticks = plan_axis(18.0 + 96.0 * 2.0, 18.0, Unit::Inch, scale, 0.1, 1).unwrap();
        let tick_at = |value: f64| {
            ticks
                .iter()
                .find(|t| (t.position_px - (18.0 + scale.to_pixels(value))).abs() < 1e-6)
                .unwrap()
        };
        assert_eq!(tick_at(1.0).weight, TickWeight::Major);
        assert_eq!(tick_at(0.5).weight, TickWeight::Medium);
        assert_eq!(tick_at(0.3).weight, TickWeight::Small);
    }

    #[test]
    fn labels_only_on_major_ticks() {
        let scale = ScaleFactor::new(96.0).unwrap();
        let ticks = plan_axis(18.0 + 96.0 * 2.0, 18.0, Unit::Inch, scale, 0.1, 1).unwrap();
        for tick in &ticks {
            match tick.weight {
                TickWeight::Major => assert!(tick.label.is_some()),
                _ => assert!(tick.label.is_none()),
            }
        }
        assert_eq!(ticks[0].label.as_deref(), Some("0.0 in"));
        let one_inch = ticks
            .iter()
            .find(|t| (t.position_px - (18.0 + 96.0)).abs() < 1e-6)
            .unwrap();
        assert_eq!(one_inch.label.as_deref(), Some("1.0 in"));
    }

    #[test]
    fn label_precision_is_honored() {
        let ticks = plan_axis(218.0, 18.0, Unit::Pixel, pixel_scale(), 100.0, 2).unwrap();
        assert_eq!(ticks[1].label.as_deref(), Some("100.00 px"));
    }

    #[test]
    fn millimeter_ticks_are_all_small() {
        let scale = ScaleFactor::new(96.0 / 25.4).unwrap();
        let ticks = plan_axis(400.0, 18.0, Unit::Millimeter, scale, 1.0, 0).unwrap();
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|t| t.weight == TickWeight::Small));
        assert!(ticks.iter().all(|t| t.label.is_none()));
    }

    #[test]
    fn degenerate_axis_yields_empty_plan() {
        let ticks = plan_axis(50.0, 60.0, Unit::Pixel, pixel_scale(), 10.0, 0).unwrap();
        assert!(ticks.is_empty());
    }

    #[test]
    fn non_positive_step_is_rejected() {
        for step in [0.0, -0.5, f64::NAN] {
            let err = plan_axis(100.0, 18.0, Unit::Pixel, pixel_scale(), step, 0).unwrap_err();
            assert!(matches!(err, RulerError::InvalidConfiguration(_)));
        }
    }
}
