//! Rendering adapter between the twin and its display collaborators.
//!
//! The twin never formats anything itself. After each recompute it hands a
//! [`DisplaySnapshot`] to the injected [`RenderSink`], and every chart period
//! it appends one point per chart to the [`ChartSink`].

pub mod chart;
pub mod watch;

pub use chart::{ChartBuffer, ChartPoint, ChartSeries, SharedCharts};
pub use watch::WatchRenderer;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::domain::{Mode, RunState, SimulationState};

/// Receives a formatted view of the state after every recompute
#[cfg_attr(test, mockall::automock)]
pub trait RenderSink: Send {
    fn render(&mut self, snapshot: &DisplaySnapshot);
}

/// Receives one point per chart every chart period
#[cfg_attr(test, mockall::automock)]
pub trait ChartSink: Send {
    /// Append `(first, second)` under the time label `label`
    fn append(&mut self, chart: ChartId, label: &str, first: f64, second: f64);

    fn clear(&mut self);
}

/// The two dashboard charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartId {
    /// Power input (MW) against hydrogen production (kg/h)
    PowerProduction,
    /// Efficiency (%) against cost (currency/kg)
    EfficiencyCost,
}

impl ChartId {
    pub fn series_labels(&self) -> (&'static str, &'static str) {
        match self {
            ChartId::PowerProduction => ("Power Input (MW)", "H2 Production (kg/h)"),
            ChartId::EfficiencyCost => ("Efficiency (%)", "Cost (€/kg)"),
        }
    }
}

/// Display unit of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "MW")]
    Megawatt,
    #[serde(rename = "kg/h")]
    KilogramPerHour,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "bar")]
    Bar,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "€/kg")]
    CurrencyPerKg,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Megawatt => "MW",
            Unit::KilogramPerHour => "kg/h",
            Unit::Kilogram => "kg",
            Unit::Celsius => "°C",
            Unit::Bar => "bar",
            Unit::Percent => "%",
            Unit::CurrencyPerKg => "€/kg",
        }
    }

    fn decimals(&self) -> usize {
        match self {
            Unit::Percent | Unit::Celsius | Unit::Bar | Unit::Megawatt => 1,
            Unit::KilogramPerHour | Unit::Kilogram | Unit::CurrencyPerKg => 0,
        }
    }
}

/// One labeled value of the display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub unit: Unit,
    /// Value and unit as shown to the operator, e.g. `65.0 %`
    pub text: String,
}

impl DisplayField {
    fn new(key: &'static str, label: &'static str, value: f64, unit: Unit) -> Self {
        Self {
            key,
            label,
            value,
            unit,
            text: format!("{:.*} {}", unit.decimals(), value, unit.symbol()),
        }
    }

    fn with_decimals(mut self, decimals: usize) -> Self {
        self.text = format!("{:.*} {}", decimals, self.value, self.unit.symbol());
        self
    }
}

/// Formatted view of the twin handed to the render sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub run_state: RunState,
    /// Operator-facing status text
    pub status: &'static str,
    pub mode: Mode,
    pub time: u64,
    /// Elapsed simulated time as `HH:MM:SS`
    pub elapsed: String,
    pub fields: Vec<DisplayField>,
}

impl DisplaySnapshot {
    pub fn from_state(state: &SimulationState) -> Self {
        let c = &state.controls;
        let o = &state.outputs;
        let fields = vec![
            DisplayField::new("power_input", "Power Input", c.power_input, Unit::Megawatt),
            DisplayField::new("load_factor", "Load Factor", c.load_factor, Unit::Percent),
            DisplayField::new("target_pressure", "Target Pressure", c.target_pressure, Unit::Bar),
            DisplayField::new(
                "h2_production",
                "H2 Production",
                o.h2_production_kg_h,
                Unit::KilogramPerHour,
            ),
            DisplayField::new("temperature", "Stack Temperature", o.temperature_c, Unit::Celsius),
            DisplayField::new(
                "power_consumption",
                "Power Consumption",
                o.power_consumption_mw,
                Unit::Megawatt,
            ),
            DisplayField::new("purity", "H2 Purity", o.purity_percent, Unit::Percent)
                .with_decimals(2),
            DisplayField::new("efficiency", "Efficiency", o.efficiency_percent, Unit::Percent),
            DisplayField::new("flow_rate", "Flow Rate", o.flow_rate_kg_h, Unit::KilogramPerHour),
            DisplayField::new("cost", "Production Cost", o.cost_per_kg, Unit::CurrencyPerKg),
            DisplayField::new(
                "storage_level",
                "Storage Level",
                o.storage_level_percent,
                Unit::Percent,
            ),
            DisplayField::new("storage_amount", "Stored H2", o.storage_amount_kg, Unit::Kilogram),
            DisplayField::new("pressure", "Outlet Pressure", o.pressure_bar, Unit::Bar),
        ];

        let offline = c.power_input == 0.0 && c.load_factor == 0.0;
        let status = match state.run_state {
            RunState::Running => "Running",
            RunState::Paused => "Paused",
            RunState::Idle if offline => "Offline",
            RunState::Idle => "Ready",
        };

        Self {
            run_state: state.run_state,
            status,
            mode: c.mode,
            time: state.time,
            elapsed: format_elapsed(state.time),
            fields,
        }
    }

    pub fn field(&self, key: &str) -> Option<&DisplayField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// `HH:MM:SS` for a number of seconds
pub fn format_elapsed(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Chart time label for a simulated second
pub fn time_label(seconds: u64) -> String {
    format!("{seconds}s")
}
