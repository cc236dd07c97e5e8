use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::controller::safety::AlertThresholds;
use crate::domain::{
    ControlLimits, ControlRange, DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_MAX_STORAGE_KG,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "H2TWIN__";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub simulation: SimulationConfig,
    #[validate(custom(function = "validate_limits"))]
    pub limits: ControlLimits,
    #[validate(custom(function = "validate_alerts"))]
    pub alerts: AlertThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SimulationConfig {
    /// Real-time period of one simulated second
    #[validate(range(min = 1, max = 60000))]
    pub tick_millis: u64,
    /// Ticks between history/chart samples
    #[validate(range(min = 1, max = 3600))]
    pub chart_every_ticks: u64,
    #[validate(range(min = 1, max = 1000))]
    pub history_capacity: usize,
    #[validate(range(min = 20, max = 50))]
    pub event_log_capacity: usize,
    #[validate(range(min = 1.0))]
    pub max_storage_kg: f64,
    /// Disable to run the plant model without random perturbations
    pub noise_enabled: bool,
    pub random_seed: Option<u64>,
    /// Start ticking as soon as the service is up
    pub autostart: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_millis: 1000,
            chart_every_ticks: 5,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
            max_storage_kg: DEFAULT_MAX_STORAGE_KG,
            noise_enabled: true,
            random_seed: None,
            autostart: false,
        }
    }
}

impl SimulationConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

impl Config {
    /// Defaults, then the TOML file (`H2TWIN_CONFIG` or `config/default.toml`),
    /// then `H2TWIN__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("H2TWIN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_figment(Self::figment(&path))
    }

    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract().context("failed to extract configuration")?;
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }
}

fn validate_range(range: &ControlRange) -> Result<(), ValidationError> {
    if !(range.min.is_finite() && range.max.is_finite()) || range.min >= range.max {
        return Err(ValidationError::new("control_range_min_not_below_max"));
    }
    Ok(())
}

fn validate_limits(limits: &ControlLimits) -> Result<(), ValidationError> {
    validate_range(&limits.power_input)?;
    validate_range(&limits.load_factor)?;
    validate_range(&limits.target_pressure)?;
    if limits.power_input.min < 0.0
        || limits.load_factor.min < 0.0
        || limits.target_pressure.min < 0.0
    {
        return Err(ValidationError::new("control_range_negative"));
    }
    Ok(())
}

fn validate_alerts(alerts: &AlertThresholds) -> Result<(), ValidationError> {
    let values = [
        alerts.max_temperature_c,
        alerts.max_storage_level_percent,
        alerts.min_efficiency_percent,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ValidationError::new("alert_threshold_not_finite"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.simulation.tick_period(), Duration::from_secs(1));
        assert_eq!(cfg.simulation.history_capacity, 20);
        assert_eq!(cfg.alerts.max_temperature_c, 85.0);
    }

    #[test]
    fn test_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "twin.toml",
                r#"
                [server]
                port = 9090

                [simulation]
                event_log_capacity = 20
                random_seed = 42

                [limits.power_input]
                min = 10.0
                max = 150.0
                "#,
            )?;
            jail.set_env("H2TWIN__SIMULATION__TICK_MILLIS", "250");

            let cfg = Config::from_figment(Config::figment("twin.toml"))
                .map_err(|e| figment::Error::from(e.to_string()))?;

            assert_eq!(cfg.server.port, 9090);
            assert_eq!(cfg.server.host, "127.0.0.1");
            assert_eq!(cfg.simulation.event_log_capacity, 20);
            assert_eq!(cfg.simulation.random_seed, Some(42));
            assert_eq!(cfg.simulation.tick_millis, 250);
            assert_eq!(cfg.limits.power_input, ControlRange::new(10.0, 150.0));
            assert_eq!(cfg.limits.load_factor, ControlLimits::default().load_factor);
            Ok(())
        });
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut cfg = Config::default();
        cfg.limits.target_pressure = ControlRange::new(80.0, 10.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_event_log() {
        let mut cfg = Config::default();
        cfg.simulation.event_log_capacity = 500;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8080);
    }
}
