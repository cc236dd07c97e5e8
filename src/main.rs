use anyhow::Result;
use h2_twin::{api, config, controller, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    init_tracing();

    let cfg = Config::load()?;
    let app_state = controller::AppState::new(cfg.clone());
    let app = api::router(app_state.clone(), &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!("server binding to 0.0.0.0, the control surface is reachable from the network");
    }

    info!(%addr, "starting electrolyzer twin");

    if cfg.simulation.autostart {
        app_state.controller.start();
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    app_state.controller.pause();
    warn!("shutdown complete");
    Ok(())
}
