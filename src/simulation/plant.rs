//! # Electrolyzer Plant Model
//!
//! Maps the control inputs to the derived plant outputs once per tick.
//!
//! ## Model
//!
//! ```text
//! load        = load_factor / 100
//! production  = power * load * 10 * efficiency / 100      (kg/h)
//! efficiency' = 70 - load * 5 + U(0, 2)                   (%)
//! temperature = 65 + load * 15 + U(0, 2)                  (°C)
//! purity      = 99.95 + U(0, 0.04)                        (%)
//! consumption = power * load * 0.95                       (MW)
//! flow        = production * 0.95                         (kg/h)
//! cost        = 250 * (70 / efficiency') * (1 + (p_target - 30) / 100)
//! storage'    = min(storage + production / 3600, capacity)
//! pressure    = p_target + U(-1, 1)                       (bar)
//! ```
//!
//! Production is computed from the efficiency of the *previous* tick, before
//! the new efficiency is sampled. The one-tick lag is part of the model's
//! observable behavior and is kept.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::noise::NoiseSource;
use crate::domain::{ControlInputs, PlantOutputs, DEFAULT_MAX_STORAGE_KG};

/// Efficiency at zero load before noise (%)
pub const BASE_EFFICIENCY_PERCENT: f64 = 70.0;
/// Stack temperature at zero load before noise (°C)
pub const BASE_TEMPERATURE_C: f64 = 65.0;
pub const BASE_PURITY_PERCENT: f64 = 99.95;
/// Cost at reference efficiency and pressure (currency/kg)
pub const BASE_COST_PER_KG: f64 = 250.0;
/// Pressure the base cost is quoted at (bar)
pub const REFERENCE_PRESSURE_BAR: f64 = 30.0;
/// kg/h of hydrogen per MW of loaded input at 100 % efficiency
pub const PRODUCTION_PER_MW: f64 = 10.0;
/// Floor applied to the efficiency divisor of the cost formula (%)
pub const MIN_COST_EFFICIENCY_PERCENT: f64 = 1.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Plant model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParams {
    /// Hydrogen buffer capacity (kg)
    pub max_storage_kg: f64,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            max_storage_kg: DEFAULT_MAX_STORAGE_KG,
        }
    }
}

/// Electrolyzer plant model
#[derive(Debug, Clone, Default)]
pub struct PlantModel {
    params: PlantParams,
}

impl PlantModel {
    pub fn new(params: PlantParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PlantParams {
        &self.params
    }

    /// Recompute every derived output in place.
    ///
    /// Advances the storage inventory by one second of production.
    pub fn recompute(
        &self,
        controls: &ControlInputs,
        outputs: &mut PlantOutputs,
        noise: &mut dyn NoiseSource,
    ) {
        let effective_load = controls.load_factor / 100.0;
        let base_production = controls.power_input * effective_load * PRODUCTION_PER_MW;

        // Reads last tick's efficiency on purpose.
        let h2_production = base_production * outputs.efficiency_percent / 100.0;

        let efficiency = BASE_EFFICIENCY_PERCENT - effective_load * 5.0 + noise.uniform(0.0, 2.0);
        let temperature = BASE_TEMPERATURE_C + effective_load * 15.0 + noise.uniform(0.0, 2.0);
        let purity = BASE_PURITY_PERCENT + noise.uniform(0.0, 0.04);
        let power_consumption = controls.power_input * effective_load * 0.95;
        let flow_rate = h2_production * 0.95;

        let cost = BASE_COST_PER_KG
            * (BASE_EFFICIENCY_PERCENT / efficiency.max(MIN_COST_EFFICIENCY_PERCENT))
            * (1.0 + (controls.target_pressure - REFERENCE_PRESSURE_BAR) / 100.0);

        let capacity = self.params.max_storage_kg;
        let storage_amount =
            (outputs.storage_amount_kg + h2_production / SECONDS_PER_HOUR).min(capacity);
        let storage_level = if capacity > 0.0 {
            storage_amount / capacity * 100.0
        } else {
            0.0
        };
        let pressure = controls.target_pressure + noise.uniform(-1.0, 1.0);

        *outputs = PlantOutputs {
            h2_production_kg_h: finite(h2_production, "h2_production"),
            temperature_c: finite(temperature, "temperature"),
            power_consumption_mw: finite(power_consumption, "power_consumption"),
            purity_percent: finite(purity, "purity"),
            efficiency_percent: finite(efficiency, "efficiency"),
            flow_rate_kg_h: finite(flow_rate, "flow_rate"),
            cost_per_kg: finite(cost, "cost"),
            storage_level_percent: finite(storage_level, "storage_level"),
            storage_amount_kg: finite(storage_amount, "storage_amount"),
            pressure_bar: finite(pressure, "pressure"),
        };
    }
}

/// A non-finite output is a defect in the formulas. Fail fast in debug
/// builds, keep the display clean in release builds.
fn finite(value: f64, field: &'static str) -> f64 {
    debug_assert!(value.is_finite(), "plant output {field} is not finite: {value}");
    if value.is_finite() {
        value
    } else {
        warn!(field, value, "non-finite plant output replaced with 0");
        0.0
    }
}
