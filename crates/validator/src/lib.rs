use common::{BenchError, TargetMetrics};
use serde::Deserialize;

/// Bounds a benchmark run must stay inside to be considered healthy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerformanceThresholds {
    /// Hard ceiling for any single response.
    pub max_response_time_ms: f64,
    /// Ceiling for the average response time of a run.
    pub avg_response_time_ms: f64,
    /// Token-rate sanity cap; rates above this indicate a broken measurement.
    pub max_token_rate: f64,
    pub min_success_rate: f64,
    pub max_error_rate: f64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            max_response_time_ms: 5000.0,
            avg_response_time_ms: 2000.0,
            max_token_rate: 100.0,
            min_success_rate: 75.0,
            max_error_rate: 25.0,
        }
    }
}

impl PerformanceThresholds {
    /// Validate aggregate metrics, returning the first violated rule.
    pub fn check(&self, metrics: &TargetMetrics) -> Result<(), BenchError> {
        // 1. Nothing measured
        if metrics.total_queries == 0 {
            return Err(BenchError::ThresholdViolation(format!(
                "{}: no queries completed",
                metrics.target
            )));
        }

        // 2. Single-response ceiling
        if metrics.max_response_time_ms > self.max_response_time_ms {
            return Err(BenchError::ThresholdViolation(format!(
                "{}: max response time {:.1} ms exceeds {:.1} ms",
                metrics.target, metrics.max_response_time_ms, self.max_response_time_ms
            )));
        }

        // 3. Average ceiling
        if metrics.avg_response_time_ms > self.avg_response_time_ms {
            return Err(BenchError::ThresholdViolation(format!(
                "{}: avg response time {:.1} ms exceeds {:.1} ms",
                metrics.target, metrics.avg_response_time_ms, self.avg_response_time_ms
            )));
        }

        // 4. Token-rate sanity
        if metrics.avg_token_rate > self.max_token_rate {
            return Err(BenchError::ThresholdViolation(format!(
                "{}: token rate {:.1}/s exceeds {:.1}/s",
                metrics.target, metrics.avg_token_rate, self.max_token_rate
            )));
        }

        // 5. Success floor
        if metrics.task_success_rate < self.min_success_rate {
            return Err(BenchError::ThresholdViolation(format!(
                "{}: success rate {:.1}% below {:.1}%",
                metrics.target, metrics.task_success_rate, self.min_success_rate
            )));
        }

        // 6. Error ceiling
        if metrics.error_rate > self.max_error_rate {
            return Err(BenchError::ThresholdViolation(format!(
                "{}: error rate {:.1}% exceeds {:.1}%",
                metrics.target, metrics.error_rate, self.max_error_rate
            )));
        }

        Ok(())
    }

    /// Validate one response latency against the hard ceiling.
    pub fn check_sample(&self, latency_ms: f64) -> Result<(), BenchError> {
        if latency_ms > self.max_response_time_ms {
            return Err(BenchError::ThresholdViolation(format!(
                "response time {:.1} ms exceeds {:.1} ms",
                latency_ms, self.max_response_time_ms
            )));
        }
        Ok(())
    }
}
