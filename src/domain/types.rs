use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

use super::TwinError;

/// Operating mode of the electrolyzer.
///
/// Selects how the control inputs drift on their own while the twin is
/// running. Each mode accepts the alternate name used by the extended
/// dashboard variant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case", try_from = "String")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Mode {
    /// Constant grid supply, no autonomous drift.
    #[default]
    #[strum(to_string = "steady", serialize = "constant")]
    Steady,
    /// Intermittent renewable supply, power jitters every second.
    #[strum(to_string = "variable", serialize = "renewable")]
    Variable,
    /// Price-following operation, occasional load shedding.
    #[strum(to_string = "optimized", serialize = "cost-optimized")]
    Optimized,
    /// Carbon-aware operation, occasional ramp-up on green surplus.
    #[strum(to_string = "carbon", serialize = "low-carbon")]
    Carbon,
}

impl TryFrom<String> for Mode {
    type Error = TwinError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Mode::from_str(name.trim()).map_err(|_| TwinError::UnknownMode(name))
    }
}

/// Scheduler run state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Closed range a control input is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
}

impl ControlRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a requested value into the range.
    ///
    /// Returns `None` for NaN or infinite input, which cannot be placed
    /// meaningfully inside the range.
    pub fn clamp(&self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        Some(value.clamp(self.min, self.max))
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-control input ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Electrical power input (MW)
    pub power_input: ControlRange,
    /// Stack load factor (%)
    pub load_factor: ControlRange,
    /// Target outlet pressure (bar)
    pub target_pressure: ControlRange,
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self {
            power_input: ControlRange::new(20.0, 200.0),
            load_factor: ControlRange::new(10.0, 100.0),
            target_pressure: ControlRange::new(10.0, 80.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("steady", Mode::Steady)]
    #[case("constant", Mode::Steady)]
    #[case("variable", Mode::Variable)]
    #[case("Renewable", Mode::Variable)]
    #[case("optimized", Mode::Optimized)]
    #[case("cost-optimized", Mode::Optimized)]
    #[case("carbon", Mode::Carbon)]
    #[case("LOW-CARBON", Mode::Carbon)]
    fn test_mode_accepts_both_dashboard_names(#[case] name: &str, #[case] expected: Mode) {
        assert_eq!(Mode::from_str(name).unwrap(), expected);
    }

    #[test]
    fn test_mode_serde_alias() {
        let mode: Mode = serde_json::from_str("\"renewable\"").unwrap();
        assert_eq!(mode, Mode::Variable);
        assert_eq!(serde_json::to_string(&Mode::Carbon).unwrap(), "\"carbon\"");
    }

    #[test]
    fn test_display_names_parse_back() {
        use strum::IntoEnumIterator;
        for mode in Mode::iter() {
            assert_eq!(Mode::from_str(&mode.to_string()).unwrap(), mode);
            assert_eq!(
                serde_json::to_string(&mode).unwrap(),
                format!("\"{mode}\"")
            );
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Mode::from_str("turbo").is_err());
        let err = serde_json::from_str::<Mode>("\"turbo\"").unwrap_err();
        assert!(err.to_string().contains("Unknown operating mode: turbo"));
    }

    #[rstest]
    #[case(5.0, 20.0)]
    #[case(250.0, 200.0)]
    #[case(120.0, 120.0)]
    fn test_range_clamp(#[case] input: f64, #[case] expected: f64) {
        let range = ControlLimits::default().power_input;
        assert_eq!(range.clamp(input), Some(expected));
    }

    #[test]
    fn test_range_rejects_non_finite() {
        let range = ControlRange::new(0.0, 1.0);
        assert_eq!(range.clamp(f64::NAN), None);
        assert_eq!(range.clamp(f64::INFINITY), None);
    }
}
