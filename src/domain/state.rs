use serde::{Deserialize, Serialize};

use super::history::History;
use super::types::{Mode, RunState};

/// Default storage capacity of the hydrogen buffer (kg)
pub const DEFAULT_MAX_STORAGE_KG: f64 = 1000.0;

/// Operator-controlled inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlInputs {
    /// Electrical power input (MW)
    pub power_input: f64,
    /// Stack load factor (%)
    pub load_factor: f64,
    /// Target outlet pressure (bar)
    pub target_pressure: f64,
    pub mode: Mode,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            power_input: 100.0,
            load_factor: 75.0,
            target_pressure: 30.0,
            mode: Mode::Steady,
        }
    }
}

impl ControlInputs {
    /// All-zero inputs used by an emergency stop
    pub fn offline(mode: Mode) -> Self {
        Self {
            power_input: 0.0,
            load_factor: 0.0,
            target_pressure: 0.0,
            mode,
        }
    }
}

/// Values derived by the plant model on every recompute.
///
/// Nothing here is carried between ticks except `storage_amount_kg`, which
/// integrates production over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantOutputs {
    /// Hydrogen production rate (kg/h)
    pub h2_production_kg_h: f64,
    /// Stack temperature (°C)
    pub temperature_c: f64,
    /// Electrical power drawn by the stack (MW)
    pub power_consumption_mw: f64,
    /// Hydrogen purity (%)
    pub purity_percent: f64,
    /// Stack efficiency (%)
    pub efficiency_percent: f64,
    /// Delivered hydrogen flow (kg/h)
    pub flow_rate_kg_h: f64,
    /// Levelized production cost (currency/kg)
    pub cost_per_kg: f64,
    /// Storage fill level (%)
    pub storage_level_percent: f64,
    /// Hydrogen held in storage (kg)
    pub storage_amount_kg: f64,
    /// Outlet pressure (bar)
    pub pressure_bar: f64,
}

impl PlantOutputs {
    /// Documented start-up values for a buffer of the given capacity
    pub fn initial(max_storage_kg: f64) -> Self {
        Self {
            h2_production_kg_h: 0.0,
            temperature_c: 65.0,
            power_consumption_mw: 0.0,
            purity_percent: 99.95,
            efficiency_percent: 70.0,
            flow_rate_kg_h: 0.0,
            cost_per_kg: 250.0,
            storage_level_percent: 50.0,
            storage_amount_kg: max_storage_kg * 0.5,
            pressure_bar: 30.0,
        }
    }

    /// Zero every process value while keeping the stored inventory.
    pub fn shut_down(&mut self) {
        *self = Self {
            storage_level_percent: self.storage_level_percent,
            storage_amount_kg: self.storage_amount_kg,
            h2_production_kg_h: 0.0,
            temperature_c: 0.0,
            power_consumption_mw: 0.0,
            purity_percent: 0.0,
            efficiency_percent: 0.0,
            flow_rate_kg_h: 0.0,
            cost_per_kg: 0.0,
            pressure_bar: 0.0,
        };
    }
}

/// The complete mutable record of the twin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub run_state: RunState,
    /// Simulated seconds elapsed while running
    pub time: u64,
    pub controls: ControlInputs,
    pub outputs: PlantOutputs,
    pub history: History,
}

impl SimulationState {
    pub fn new(max_storage_kg: f64, history_capacity: usize) -> Self {
        Self {
            run_state: RunState::Idle,
            time: 0,
            controls: ControlInputs::default(),
            outputs: PlantOutputs::initial(max_storage_kg),
            history: History::with_capacity(history_capacity),
        }
    }

    pub fn running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Restore the documented defaults in place, keeping the history allocation.
    pub fn reinitialize(&mut self, max_storage_kg: f64) {
        self.run_state = RunState::Idle;
        self.time = 0;
        self.controls = ControlInputs::default();
        self.outputs = PlantOutputs::initial(max_storage_kg);
        self.history.clear();
    }
}
