//! # Twin Core
//!
//! Single owner of the simulation state and everything that mutates it.
//!
//! Every control command and the tick body live here as plain synchronous
//! methods. The async side (`TwinController` and the ticker task) only decides
//! *when* to call them and serializes the calls through one mutex.
//!
//! ## Tick
//!
//! ```text
//! time += 1 → mode policy → plant recompute → render
//!           → every Nth second: history sample + chart points
//!           → alert evaluation
//! ```

use tracing::{debug, info, warn};

use super::safety::{AlertMonitor, AlertThresholds};
use crate::config::Config;
use crate::domain::{
    Alert, ControlInputs, ControlLimits, ControlRange, EventLog, HistorySample, Mode, RunState,
    Severity, SimulationState, TwinError,
};
use crate::render::{time_label, ChartId, ChartSink, DisplaySnapshot, RenderSink};
use crate::simulation::{
    apply_mode_policy, find_scenario, NoiseSource, PlantModel, PlantParams, PolicyAction, Scenario,
};

pub struct Twin {
    state: SimulationState,
    model: PlantModel,
    noise: Box<dyn NoiseSource>,
    events: EventLog,
    limits: ControlLimits,
    alerts: AlertMonitor,
    chart_every_ticks: u64,
    renderer: Box<dyn RenderSink>,
    charts: Box<dyn ChartSink>,
}

impl Twin {
    pub fn new(
        cfg: &Config,
        noise: Box<dyn NoiseSource>,
        renderer: Box<dyn RenderSink>,
        charts: Box<dyn ChartSink>,
    ) -> Self {
        let sim = &cfg.simulation;
        Self {
            state: SimulationState::new(sim.max_storage_kg, sim.history_capacity),
            model: PlantModel::new(PlantParams {
                max_storage_kg: sim.max_storage_kg,
            }),
            noise,
            events: EventLog::with_capacity(sim.event_log_capacity),
            limits: cfg.limits,
            alerts: AlertMonitor::new(cfg.alerts),
            chart_every_ticks: sim.chart_every_ticks.max(1),
            renderer,
            charts,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn limits(&self) -> &ControlLimits {
        &self.limits
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        self.alerts.thresholds()
    }

    pub fn alert_monitor(&self) -> &AlertMonitor {
        &self.alerts
    }

    pub fn is_running(&self) -> bool {
        self.state.running()
    }

    /// Idle/Paused → Running. Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        if self.state.running() {
            return false;
        }
        self.state.run_state = RunState::Running;
        self.events.record(Severity::Info, "Simulation started");
        self.render();
        true
    }

    /// Running → Paused, keeping every value. Returns `false` when not running.
    pub fn pause(&mut self) -> bool {
        if !self.state.running() {
            return false;
        }
        self.state.run_state = RunState::Paused;
        self.events.record(Severity::Info, "Simulation paused");
        self.render();
        true
    }

    /// Back to the documented defaults from any state.
    ///
    /// No recompute runs. A recompute would integrate storage and draw a
    /// new efficiency, and the state must equal a freshly built twin.
    pub fn reset(&mut self) {
        let max_storage_kg = self.model.params().max_storage_kg;
        self.state.reinitialize(max_storage_kg);
        self.charts.clear();
        self.alerts.clear_alerts();
        self.events.clear();
        self.events.record(Severity::Info, "Simulation reset");
        self.render();
    }

    /// Force the plant offline.
    ///
    /// Inputs are zeroed below their ranges. Time, history and the stored
    /// inventory survive until the next reset.
    pub fn emergency_stop(&mut self) {
        self.state.run_state = RunState::Idle;
        self.state.controls = ControlInputs::offline(self.state.controls.mode);
        self.state.outputs.shut_down();
        self.events.record(
            Severity::Critical,
            "EMERGENCY STOP activated: all systems shut down",
        );
        self.render();
    }

    /// Returns the applied value, or `None` when the request was not finite.
    pub fn set_power_input(&mut self, value: f64) -> Option<f64> {
        let applied = clamp_input("power_input", &self.limits.power_input, value)?;
        self.state.controls.power_input = applied;
        self.refresh_if_running();
        Some(applied)
    }

    pub fn set_load_factor(&mut self, value: f64) -> Option<f64> {
        let applied = clamp_input("load_factor", &self.limits.load_factor, value)?;
        self.state.controls.load_factor = applied;
        self.refresh_if_running();
        Some(applied)
    }

    pub fn set_target_pressure(&mut self, value: f64) -> Option<f64> {
        let applied = clamp_input("target_pressure", &self.limits.target_pressure, value)?;
        self.state.controls.target_pressure = applied;
        self.refresh_if_running();
        Some(applied)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.state.controls.mode = mode;
        self.events
            .record(Severity::Info, format!("Operating mode changed to {mode}"));
        self.refresh_if_running();
    }

    /// Apply a named preset through the control ranges.
    pub fn load_scenario(&mut self, name: &str) -> Result<&'static Scenario, TwinError> {
        let scenario = find_scenario(name)?;
        let preset = scenario.controls();
        let controls = &mut self.state.controls;

        controls.power_input = self
            .limits
            .power_input
            .clamp(preset.power_input)
            .unwrap_or(controls.power_input);
        controls.load_factor = self
            .limits
            .load_factor
            .clamp(preset.load_factor)
            .unwrap_or(controls.load_factor);
        controls.target_pressure = self
            .limits
            .target_pressure
            .clamp(preset.target_pressure)
            .unwrap_or(controls.target_pressure);
        controls.mode = preset.mode;

        self.events.record(
            Severity::Info,
            format!("Scenario loaded: {}", scenario.name),
        );
        self.refresh_if_running();
        Ok(scenario)
    }

    /// Advance the simulation by one second.
    pub fn tick(&mut self) {
        self.state.time += 1;
        let time = self.state.time;

        match apply_mode_policy(
            &mut self.state.controls,
            time,
            &self.limits,
            self.noise.as_mut(),
        ) {
            Some(PolicyAction::LoadShed(power)) => self.events.record(
                Severity::Info,
                format!("Grid optimization: load reduced to {power:.1} MW"),
            ),
            Some(PolicyAction::RampUp(power)) => self.events.record(
                Severity::Info,
                format!("Green energy surplus: power increased to {power:.1} MW"),
            ),
            Some(PolicyAction::Jitter(_)) | None => {}
        }

        self.model.recompute(
            &self.state.controls,
            &mut self.state.outputs,
            self.noise.as_mut(),
        );
        self.render();

        if time % self.chart_every_ticks == 0 {
            self.sample(time);
        }

        for alert in self.alerts.evaluate(&self.state.outputs) {
            self.raise(alert);
        }

        let o = &self.state.outputs;
        debug!(
            time,
            power_input = self.state.controls.power_input,
            h2_production = o.h2_production_kg_h,
            efficiency = o.efficiency_percent,
            storage_level = o.storage_level_percent,
            "tick"
        );
    }

    fn sample(&mut self, time: u64) {
        let sample = HistorySample {
            time,
            power_input: self.state.controls.power_input,
            h2_production: self.state.outputs.h2_production_kg_h,
            efficiency: self.state.outputs.efficiency_percent,
            cost: self.state.outputs.cost_per_kg,
        };
        self.state.history.push(sample);

        let label = time_label(time);
        self.charts.append(
            ChartId::PowerProduction,
            &label,
            sample.power_input,
            sample.h2_production,
        );
        self.charts
            .append(ChartId::EfficiencyCost, &label, sample.efficiency, sample.cost);
    }

    fn raise(&mut self, alert: Alert) {
        self.events.record(Severity::Warning, alert.message());
    }

    fn refresh_if_running(&mut self) {
        if !self.state.running() {
            return;
        }
        self.model.recompute(
            &self.state.controls,
            &mut self.state.outputs,
            self.noise.as_mut(),
        );
        self.render();
    }

    fn render(&mut self) {
        self.renderer.render(&DisplaySnapshot::from_state(&self.state));
    }
}

fn clamp_input(name: &'static str, range: &ControlRange, value: f64) -> Option<f64> {
    match range.clamp(value) {
        Some(applied) => {
            if applied != value {
                info!(control = name, requested = value, applied, "control input clamped");
            }
            Some(applied)
        }
        None => {
            warn!(control = name, requested = value, "ignoring non-finite control input");
            None
        }
    }
}
