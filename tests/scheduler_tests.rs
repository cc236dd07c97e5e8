//! Scheduler timing against a paused tokio clock.
//!
//! Every test runs with `start_paused = true`, so sleeps advance virtual time
//! and tick counts are exact.

use std::time::Duration;
use tokio::time::sleep;

use h2_twin::config::Config;
use h2_twin::controller::{AppState, Command};
use h2_twin::domain::{ControlInputs, Mode, RunState, SimulationState, DEFAULT_MAX_STORAGE_KG};

fn quiet_state() -> AppState {
    let mut cfg = Config::default();
    cfg.simulation.noise_enabled = false;
    AppState::new(cfg)
}

#[tokio::test(start_paused = true)]
async fn test_ticks_once_per_second() {
    let app = quiet_state();
    assert!(app.controller.start());

    sleep(Duration::from_millis(3500)).await;

    let state = app.controller.state();
    assert_eq!(state.time, 3);
    assert_eq!(state.run_state, RunState::Running);
    assert_eq!(app.display().time, 3);
}

#[tokio::test(start_paused = true)]
async fn test_pause_resume_keeps_clock_exact() {
    let app = quiet_state();
    app.controller.start();
    sleep(Duration::from_millis(3500)).await;

    assert!(app.controller.pause());
    sleep(Duration::from_secs(10)).await;
    assert_eq!(app.controller.state().time, 3);
    assert_eq!(app.display().status, "Paused");

    app.controller.start();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(app.controller.state().time, 5);
}

#[tokio::test(start_paused = true)]
async fn test_sub_second_runs_add_up() {
    let app = quiet_state();
    for _ in 0..10 {
        assert!(app.controller.start());
        sleep(Duration::from_millis(650)).await;
        assert!(app.controller.pause());
        sleep(Duration::from_millis(200)).await;
    }

    // 10 x 650 ms of running time
    assert_eq!(app.controller.state().time, 6);
    assert_eq!(app.controller.state().history.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_partial_period() {
    let app = quiet_state();
    app.controller.start();
    sleep(Duration::from_millis(700)).await;
    app.controller.pause();
    app.controller.reset();

    app.controller.start();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(app.controller.state().time, 0);
    sleep(Duration::from_millis(600)).await;
    assert_eq!(app.controller.state().time, 1);
}

#[tokio::test(start_paused = true)]
async fn test_emergency_stop_discards_partial_period() {
    let app = quiet_state();
    app.controller.start();
    sleep(Duration::from_millis(1800)).await;
    app.controller.pause();
    app.controller.emergency_stop();

    app.controller.start();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(app.controller.state().time, 1);
    sleep(Duration::from_millis(600)).await;
    assert_eq!(app.controller.state().time, 2);
}

#[tokio::test(start_paused = true)]
async fn test_double_start_spawns_one_ticker() {
    let app = quiet_state();
    assert!(app.controller.start());
    assert!(!app.controller.start());

    sleep(Duration::from_millis(3500)).await;
    assert_eq!(app.controller.state().time, 3);
}

#[tokio::test(start_paused = true)]
async fn test_emergency_stop_halts_ticks() {
    let app = quiet_state();
    app.controller.start();
    sleep(Duration::from_millis(2500)).await;

    app.controller.emergency_stop();
    sleep(Duration::from_secs(5)).await;

    let state = app.controller.state();
    assert!(!state.running());
    assert_eq!(state.time, 2);
    assert_eq!(state.controls, ControlInputs::offline(Mode::Steady));
    assert_eq!(state.outputs.h2_production_kg_h, 0.0);
    assert_eq!(app.display().status, "Offline");
}

#[tokio::test(start_paused = true)]
async fn test_reset_while_running() {
    let app = quiet_state();
    app.controller.start();
    sleep(Duration::from_millis(7500)).await;

    app.controller.reset();
    sleep(Duration::from_secs(3)).await;

    assert_eq!(
        app.controller.state(),
        SimulationState::new(DEFAULT_MAX_STORAGE_KG, 20)
    );
    let events = app.controller.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "Simulation reset");
    assert!(app.charts().series(h2_twin::render::ChartId::PowerProduction).points.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_history_after_long_run() {
    let app = quiet_state();
    app.controller.start();
    sleep(Duration::from_millis(105_500)).await;
    app.controller.pause();

    let history = app.controller.history();
    assert_eq!(history.time.len(), 20);
    assert_eq!(history.time.first().copied(), Some(10));
    assert_eq!(history.time.last().copied(), Some(105));
    assert_eq!(history.power.len(), history.cost.len());

    let charts = app.charts();
    let points = &charts.series(h2_twin::render::ChartId::EfficiencyCost).points;
    assert_eq!(points.len(), 20);
    assert_eq!(points.back().map(|p| p.label.as_str()), Some("105s"));
}

#[tokio::test(start_paused = true)]
async fn test_setter_while_running_applies_immediately() {
    let app = quiet_state();
    app.controller.start();
    sleep(Duration::from_millis(1500)).await;

    app.controller
        .dispatch(Command::SetLoadFactor(100.0))
        .unwrap();

    let state = app.controller.state();
    assert_eq!(state.time, 1);
    assert_eq!(state.outputs.power_consumption_mw, 95.0);
    assert_eq!(app.display().field("load_factor").unwrap().text, "100.0 %");
}

#[tokio::test(start_paused = true)]
async fn test_storage_never_decreases_while_running() {
    let app = quiet_state();
    app.controller.dispatch(Command::LoadScenario("peak-demand".into())).unwrap();
    app.controller.start();

    let mut last = app.controller.state().outputs.storage_amount_kg;
    for _ in 0..30 {
        sleep(Duration::from_secs(1)).await;
        let now = app.controller.state().outputs.storage_amount_kg;
        assert!(now >= last);
        assert!(now <= DEFAULT_MAX_STORAGE_KG);
        last = now;
    }
    app.controller.pause();
}
