//! Named operating presets for the control surface.

use serde::Serialize;

use crate::domain::{ControlInputs, Mode, TwinError};

/// Operating preset applied by `LoadScenario`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub power_input: f64,
    pub load_factor: f64,
    pub target_pressure: f64,
    pub mode: Mode,
}

impl Scenario {
    pub fn controls(&self) -> ControlInputs {
        ControlInputs {
            power_input: self.power_input,
            load_factor: self.load_factor,
            target_pressure: self.target_pressure,
            mode: self.mode,
        }
    }
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "baseline",
        description: "Nominal operation on a firm grid supply",
        power_input: 100.0,
        load_factor: 75.0,
        target_pressure: 30.0,
        mode: Mode::Steady,
    },
    Scenario {
        name: "peak-demand",
        description: "Full stack load at high delivery pressure",
        power_input: 180.0,
        load_factor: 100.0,
        target_pressure: 50.0,
        mode: Mode::Steady,
    },
    Scenario {
        name: "renewable-intermittency",
        description: "Wind and solar supply with second-to-second fluctuation",
        power_input: 120.0,
        load_factor: 85.0,
        target_pressure: 35.0,
        mode: Mode::Variable,
    },
    Scenario {
        name: "grid-optimized",
        description: "Price-following operation shedding load at expensive hours",
        power_input: 90.0,
        load_factor: 70.0,
        target_pressure: 30.0,
        mode: Mode::Optimized,
    },
    Scenario {
        name: "low-carbon",
        description: "Ramping up whenever green surplus is available",
        power_input: 150.0,
        load_factor: 90.0,
        target_pressure: 40.0,
        mode: Mode::Carbon,
    },
    Scenario {
        name: "maintenance",
        description: "Reduced throughput for inspection windows",
        power_input: 40.0,
        load_factor: 30.0,
        target_pressure: 20.0,
        mode: Mode::Steady,
    },
];

/// Look up a preset by name, ignoring ASCII case and `_`/`-` differences.
pub fn find_scenario(name: &str) -> Result<&'static Scenario, TwinError> {
    let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
    SCENARIOS
        .iter()
        .find(|s| s.name == wanted)
        .ok_or_else(|| TwinError::UnknownScenario(name.to_string()))
}
