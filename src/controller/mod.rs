pub mod safety;
pub mod scheduler;
pub mod twin;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{
    Alert, ControlLimits, EventEntry, HistorySeries, Mode, SimulationState, TwinError,
};
use crate::render::{ChartBuffer, DisplaySnapshot, SharedCharts, WatchRenderer};
use crate::simulation::noise_source;

pub use safety::{AlertMonitor, AlertThresholds};
pub use scheduler::Ticker;
pub use twin::Twin;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub controller: Arc<TwinController>,
    pub display: watch::Receiver<DisplaySnapshot>,
    pub charts: SharedCharts,
    pub session_id: Uuid,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let sim = &cfg.simulation;
        let initial = SimulationState::new(sim.max_storage_kg, sim.history_capacity);
        let (renderer, display) = WatchRenderer::new(DisplaySnapshot::from_state(&initial));
        let charts = SharedCharts::new(sim.history_capacity);

        let twin = Twin::new(
            &cfg,
            noise_source(sim.noise_enabled, sim.random_seed),
            Box::new(renderer),
            Box::new(charts.clone()),
        );
        let controller = Arc::new(TwinController::new(twin, sim.tick_period()));
        let session_id = Uuid::new_v4();

        info!(
            %session_id,
            tick_ms = sim.tick_millis,
            noise = sim.noise_enabled,
            seed = ?sim.random_seed,
            "twin initialized"
        );

        Self {
            cfg,
            controller,
            display,
            charts,
            session_id,
        }
    }

    /// Last rendered view
    pub fn display(&self) -> DisplaySnapshot {
        self.display.borrow().clone()
    }

    pub fn charts(&self) -> ChartBuffer {
        self.charts.snapshot()
    }
}

/// Operator command accepted by the control surface.
///
/// On the wire: `{"command": "set_power_input", "value": 150.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Reset,
    EmergencyStop,
    SetPowerInput(f64),
    SetLoadFactor(f64),
    SetTargetPressure(f64),
    SetMode(Mode),
    LoadScenario(String),
}

/// Ticker plus the part of the current period already run before a pause
#[derive(Default)]
struct TickerSlot {
    active: Option<Ticker>,
    owed: Option<Duration>,
}

/// Async-facing handle on the twin.
///
/// Owns the ticker. Lock order is always twin, then ticker.
pub struct TwinController {
    twin: Arc<Mutex<Twin>>,
    ticker: Mutex<TickerSlot>,
    period: Duration,
}

impl TwinController {
    pub fn new(twin: Twin, period: Duration) -> Self {
        Self {
            twin: Arc::new(Mutex::new(twin)),
            ticker: Mutex::new(TickerSlot::default()),
            period,
        }
    }

    /// Start ticking. Must be called from within a tokio runtime.
    ///
    /// After a pause the first tick fires once the rest of the interrupted
    /// period has elapsed, so simulated time tracks running time exactly.
    pub fn start(&self) -> bool {
        let mut twin = self.twin.lock();
        if !twin.start() {
            return false;
        }
        let mut slot = self.ticker.lock();
        if let Some(stale) = slot.active.take() {
            stale.cancel();
        }
        let first_delay = slot.owed.take().unwrap_or(self.period);
        slot.active = Some(Ticker::spawn(self.twin.clone(), self.period, first_delay));
        true
    }

    pub fn pause(&self) -> bool {
        let mut twin = self.twin.lock();
        if !twin.is_running() {
            return false;
        }
        let owed = self.stop_ticker();
        twin.pause();
        self.ticker.lock().owed = owed;
        true
    }

    pub fn reset(&self) {
        let mut twin = self.twin.lock();
        self.stop_ticker();
        twin.reset();
    }

    pub fn emergency_stop(&self) {
        let mut twin = self.twin.lock();
        self.stop_ticker();
        twin.emergency_stop();
    }

    /// Run one command against the twin.
    pub fn dispatch(&self, command: Command) -> Result<(), TwinError> {
        info!(?command, "dispatching command");
        match command {
            Command::Start => {
                self.start();
            }
            Command::Pause => {
                self.pause();
            }
            Command::Reset => self.reset(),
            Command::EmergencyStop => self.emergency_stop(),
            Command::SetPowerInput(v) => {
                self.twin.lock().set_power_input(v);
            }
            Command::SetLoadFactor(v) => {
                self.twin.lock().set_load_factor(v);
            }
            Command::SetTargetPressure(v) => {
                self.twin.lock().set_target_pressure(v);
            }
            Command::SetMode(mode) => self.twin.lock().set_mode(mode),
            Command::LoadScenario(name) => {
                self.twin.lock().load_scenario(&name)?;
            }
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.twin.lock().is_running()
    }

    pub fn state(&self) -> SimulationState {
        self.twin.lock().state().clone()
    }

    pub fn history(&self) -> HistorySeries {
        self.twin.lock().state().history.series()
    }

    /// Event log, most recent first
    pub fn events(&self) -> Vec<EventEntry> {
        self.twin.lock().events().entries().cloned().collect()
    }

    pub fn limits(&self) -> ControlLimits {
        *self.twin.lock().limits()
    }

    pub fn thresholds(&self) -> AlertThresholds {
        *self.twin.lock().thresholds()
    }

    /// Most recent `count` alerts, oldest first
    pub fn recent_alerts(&self, count: usize) -> Vec<(DateTime<Utc>, Alert)> {
        self.twin.lock().alert_monitor().get_recent_alerts(count)
    }

    /// Cancel the ticker and forget any owed period. Returns what the
    /// cancelled ticker still owed.
    fn stop_ticker(&self) -> Option<Duration> {
        let mut slot = self.ticker.lock();
        slot.owed = None;
        slot.active.take().map(Ticker::cancel)
    }
}
