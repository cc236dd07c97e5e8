use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

use super::{ChartId, ChartSink};
use crate::domain::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub first: f64,
    pub second: f64,
}

/// One chart: two value series sharing a time axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub chart: ChartId,
    pub first_label: &'static str,
    pub second_label: &'static str,
    pub points: VecDeque<ChartPoint>,
}

impl ChartSeries {
    fn new(chart: ChartId) -> Self {
        let (first_label, second_label) = chart.series_labels();
        Self {
            chart,
            first_label,
            second_label,
            points: VecDeque::new(),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }
}

/// In-memory chart sink keeping the most recent points of each chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBuffer {
    capacity: usize,
    power_production: ChartSeries,
    efficiency_cost: ChartSeries,
}

impl Default for ChartBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ChartBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            power_production: ChartSeries::new(ChartId::PowerProduction),
            efficiency_cost: ChartSeries::new(ChartId::EfficiencyCost),
        }
    }

    pub fn series(&self, chart: ChartId) -> &ChartSeries {
        match chart {
            ChartId::PowerProduction => &self.power_production,
            ChartId::EfficiencyCost => &self.efficiency_cost,
        }
    }

    fn series_mut(&mut self, chart: ChartId) -> &mut ChartSeries {
        match chart {
            ChartId::PowerProduction => &mut self.power_production,
            ChartId::EfficiencyCost => &mut self.efficiency_cost,
        }
    }
}

impl ChartSink for ChartBuffer {
    fn append(&mut self, chart: ChartId, label: &str, first: f64, second: f64) {
        let capacity = self.capacity;
        let series = self.series_mut(chart);
        series.points.push_back(ChartPoint {
            label: label.to_string(),
            first,
            second,
        });
        while series.points.len() > capacity {
            series.points.pop_front();
        }
    }

    fn clear(&mut self) {
        self.power_production.points.clear();
        self.efficiency_cost.points.clear();
    }
}

/// Chart buffer shared between the twin (writer) and the API (reader)
#[derive(Debug, Clone, Default)]
pub struct SharedCharts(Arc<RwLock<ChartBuffer>>);

impl SharedCharts {
    pub fn new(capacity: usize) -> Self {
        Self(Arc::new(RwLock::new(ChartBuffer::with_capacity(capacity))))
    }

    pub fn snapshot(&self) -> ChartBuffer {
        self.0.read().clone()
    }
}

impl ChartSink for SharedCharts {
    fn append(&mut self, chart: ChartId, label: &str, first: f64, second: f64) {
        self.0.write().append(chart, label, first, second);
    }

    fn clear(&mut self) {
        self.0.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::time_label;

    #[test]
    fn test_charts_are_independent() {
        let mut charts = ChartBuffer::default();
        charts.append(ChartId::PowerProduction, "5s", 100.0, 700.0);

        assert_eq!(charts.series(ChartId::PowerProduction).points.len(), 1);
        assert!(charts.series(ChartId::EfficiencyCost).points.is_empty());
    }

    #[test]
    fn test_keeps_latest_points() {
        let mut charts = ChartBuffer::with_capacity(20);
        for i in 1..=25u64 {
            charts.append(ChartId::EfficiencyCost, &time_label(i * 5), 65.0, 260.0);
        }

        let series = charts.series(ChartId::EfficiencyCost);
        assert_eq!(series.points.len(), 20);
        assert_eq!(series.labels().first().copied(), Some("30s"));
        assert_eq!(series.labels().last().copied(), Some("125s"));
    }

    #[test]
    fn test_shared_charts_visible_to_reader() {
        let reader = SharedCharts::new(20);
        let mut writer = reader.clone();
        writer.append(ChartId::PowerProduction, "5s", 100.0, 650.0);

        let snapshot = reader.snapshot();
        assert_eq!(snapshot.series(ChartId::PowerProduction).points[0].second, 650.0);

        writer.clear();
        assert!(reader.snapshot().series(ChartId::PowerProduction).points.is_empty());
    }
}
