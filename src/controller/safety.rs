use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::domain::{Alert, AlertKind, PlantOutputs};

/// Alert thresholds for the plant outputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Maximum stack temperature (°C)
    pub max_temperature_c: f64,
    /// Storage level considered near-full (%)
    pub max_storage_level_percent: f64,
    /// Minimum acceptable efficiency (%)
    pub min_efficiency_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_temperature_c: 85.0,
            max_storage_level_percent: 95.0,
            min_efficiency_percent: 60.0,
        }
    }
}

/// Evaluates plant outputs against the alert thresholds.
///
/// Alerts are informational: they are reported and remembered, but never
/// stop the plant or alter the state.
pub struct AlertMonitor {
    thresholds: AlertThresholds,
    last_alerts: VecDeque<(DateTime<Utc>, Alert)>,
    max_alert_history: usize,
}

impl Default for AlertMonitor {
    fn default() -> Self {
        Self::new(AlertThresholds::default())
    }
}

impl AlertMonitor {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self {
            thresholds,
            last_alerts: VecDeque::new(),
            max_alert_history: 100,
        }
    }

    /// Check every threshold independently and return the alerts raised
    pub fn evaluate(&mut self, outputs: &PlantOutputs) -> Vec<Alert> {
        let now = Utc::now();
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        if outputs.temperature_c > t.max_temperature_c {
            alerts.push(Alert {
                kind: AlertKind::HighTemperature,
                value: outputs.temperature_c,
                limit: t.max_temperature_c,
            });
        }

        if outputs.storage_level_percent > t.max_storage_level_percent {
            alerts.push(Alert {
                kind: AlertKind::StorageNearFull,
                value: outputs.storage_level_percent,
                limit: t.max_storage_level_percent,
            });
        }

        if outputs.efficiency_percent < t.min_efficiency_percent {
            alerts.push(Alert {
                kind: AlertKind::LowEfficiency,
                value: outputs.efficiency_percent,
                limit: t.min_efficiency_percent,
            });
        }

        for alert in &alerts {
            debug!(
                kind = ?alert.kind,
                value = alert.value,
                limit = alert.limit,
                "alert threshold crossed"
            );
            self.record_alert(now, *alert);
        }

        alerts
    }

    fn record_alert(&mut self, timestamp: DateTime<Utc>, alert: Alert) {
        self.last_alerts.push_back((timestamp, alert));

        if self.last_alerts.len() > self.max_alert_history {
            self.last_alerts.pop_front();
        }
    }

    /// Most recent `count` alerts, oldest first
    pub fn get_recent_alerts(&self, count: usize) -> Vec<(DateTime<Utc>, Alert)> {
        let start = self.last_alerts.len().saturating_sub(count);
        self.last_alerts.iter().skip(start).cloned().collect()
    }

    pub fn clear_alerts(&mut self) {
        self.last_alerts.clear();
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_MAX_STORAGE_KG;

    fn nominal_outputs() -> PlantOutputs {
        PlantOutputs {
            temperature_c: 78.0,
            storage_level_percent: 60.0,
            efficiency_percent: 66.0,
            ..PlantOutputs::initial(DEFAULT_MAX_STORAGE_KG)
        }
    }

    #[test]
    fn test_nominal_outputs_raise_nothing() {
        let mut monitor = AlertMonitor::default();
        assert!(monitor.evaluate(&nominal_outputs()).is_empty());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut monitor = AlertMonitor::default();
        let outputs = PlantOutputs {
            temperature_c: 85.0,
            storage_level_percent: 95.0,
            efficiency_percent: 60.0,
            ..nominal_outputs()
        };
        assert!(monitor.evaluate(&outputs).is_empty());
    }

    #[test]
    fn test_each_threshold_independent() {
        let mut monitor = AlertMonitor::default();
        let outputs = PlantOutputs {
            temperature_c: 86.5,
            storage_level_percent: 97.0,
            efficiency_percent: 55.0,
            ..nominal_outputs()
        };

        let kinds: Vec<AlertKind> = monitor.evaluate(&outputs).iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::HighTemperature,
                AlertKind::StorageNearFull,
                AlertKind::LowEfficiency
            ]
        );
    }

    #[test]
    fn test_alert_does_not_touch_outputs() {
        let mut monitor = AlertMonitor::default();
        let outputs = PlantOutputs {
            temperature_c: 90.0,
            ..nominal_outputs()
        };
        let before = outputs;
        let alerts = monitor.evaluate(&outputs);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].value, 90.0);
        assert_eq!(outputs, before);
    }

    #[test]
    fn test_alert_history() {
        let mut monitor = AlertMonitor::default();
        for i in 0..5 {
            let outputs = PlantOutputs {
                temperature_c: 86.0 + i as f64,
                ..nominal_outputs()
            };
            monitor.evaluate(&outputs);
        }

        let recent = monitor.get_recent_alerts(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[2].1.value, 90.0);

        monitor.clear_alerts();
        assert!(monitor.get_recent_alerts(10).is_empty());
    }
}
