//! Performance evaluation against declared metric thresholds

use serde_json::Value;

use crate::core::{MetricKind, MetricThreshold, PerformanceMetric};

use super::Verdict;
use super::path::count_at;

/// Raw measurements taken for one execution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub response_time_ms: u64,
    pub response_size_bytes: usize,
    pub entry_count: usize,
}

impl Measurements {
    pub fn new(response_time_ms: u64, body: &Value, response_size_bytes: usize) -> Self {
        Self {
            response_time_ms,
            response_size_bytes,
            entry_count: count_at(body, "entry"),
        }
    }

    /// Measurements carrying only a response time
    pub fn timed(response_time_ms: u64) -> Self {
        Self {
            response_time_ms,
            response_size_bytes: 0,
            entry_count: 0,
        }
    }

    pub fn value_of(&self, metric: MetricKind) -> f64 {
        match metric {
            MetricKind::ResponseTime => self.response_time_ms as f64,
            MetricKind::ResponseSize => self.response_size_bytes as f64,
            MetricKind::EntryCount => self.entry_count as f64,
        }
    }
}

/// Compare measurements to every threshold; a metric passes when `value <= threshold`
pub fn evaluate_performance(measurements: &Measurements, thresholds: &[MetricThreshold]) -> Verdict {
    let metrics: Vec<PerformanceMetric> = thresholds
        .iter()
        .map(|threshold| {
            let value = measurements.value_of(threshold.metric);
            PerformanceMetric {
                metric: threshold.metric.name().to_string(),
                value,
                unit: threshold.metric.unit().to_string(),
                threshold: Some(threshold.threshold),
                passed: value <= threshold.threshold,
            }
        })
        .collect();

    let exceeded: Vec<String> = metrics
        .iter()
        .filter(|m| !m.passed)
        .map(|m| {
            format!(
                "{} {}{} exceeds {}{}",
                m.metric,
                m.value,
                m.unit,
                m.threshold.unwrap_or_default(),
                m.unit
            )
        })
        .collect();

    let mut verdict = if exceeded.is_empty() {
        Verdict::pass()
    } else {
        Verdict::fail(format!("Performance threshold exceeded: {}", exceeded.join(", ")))
    };
    verdict.performance_metrics = metrics;
    verdict
}
