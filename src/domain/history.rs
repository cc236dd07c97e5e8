use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of samples kept for the dashboard charts
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// One chart-eligible sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// Simulated second the sample was taken at
    pub time: u64,
    /// Power input (MW)
    pub power_input: f64,
    /// Hydrogen production (kg/h)
    pub h2_production: f64,
    /// Efficiency (%)
    pub efficiency: f64,
    /// Cost (currency/kg)
    pub cost: f64,
}

/// Fixed-capacity FIFO of history samples.
///
/// Samples are stored as whole records, so the per-field series handed to
/// charts always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    capacity: usize,
    samples: VecDeque<HistorySample>,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a sample, evicting the oldest once the capacity is exceeded.
    pub fn push(&mut self, sample: HistorySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn times(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn power(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.power_input).collect()
    }

    pub fn production(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.h2_production).collect()
    }

    pub fn efficiency(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.efficiency).collect()
    }

    pub fn cost(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.cost).collect()
    }

    /// Parallel per-field view, the shape chart front-ends consume
    pub fn series(&self) -> HistorySeries {
        HistorySeries {
            time: self.times(),
            power: self.power(),
            production: self.production(),
            efficiency: self.efficiency(),
            cost: self.cost(),
        }
    }
}

/// Column-oriented copy of a [`History`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub time: Vec<u64>,
    pub power: Vec<f64>,
    pub production: Vec<f64>,
    pub efficiency: Vec<f64>,
    pub cost: Vec<f64>,
}
