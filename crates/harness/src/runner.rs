use crate::targets::Target;
use common::time::ElapsedTimer;
use common::{BenchError, Scenario, TargetMetrics};
use hdrhistogram::Histogram;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Tuning knobs for a benchmark run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub iterations_per_scenario: usize,
    /// Unmeasured queries fired before the clock starts.
    pub warmup_iterations: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            iterations_per_scenario: 1,
            warmup_iterations: 0,
        }
    }
}

pub struct BenchRunner {
    opts: RunOptions,
}

impl BenchRunner {
    pub fn new(opts: RunOptions) -> Self {
        Self { opts }
    }

    /// Run every scenario against one target and aggregate the metrics.
    /// `shutdown` is checked between queries; after a shutdown request the
    /// metrics cover the queries completed so far.
    pub async fn run_target(
        &self,
        target: &Target,
        scenarios: &[Scenario],
        shutdown: &AtomicBool,
    ) -> TargetMetrics {
        // Microsecond buckets, up to 10 minutes per response.
        let mut hist = Histogram::<u64>::new_with_bounds(1, 600_000_000, 3)
            .expect("Failed to build latency histogram");
        let mut response_times_ms: Vec<f64> = Vec::new();
        let mut total_tokens = 0usize;
        let mut success_count = 0usize;
        let mut error_count = 0usize;
        let mut total_queries = 0usize;

        let mut clock = ElapsedTimer::new();
        clock.measure();

        if !scenarios.is_empty() {
            for i in 0..self.opts.warmup_iterations {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                let scenario = &scenarios[i % scenarios.len()];
                let _ = target.invoke(&scenario.prompt).await;
            }
        }

        // Restart the clock so warmup time is excluded from the totals.
        clock.reset();
        clock.measure();

        'outer: for scenario in scenarios {
            for _ in 0..self.opts.iterations_per_scenario {
                if shutdown.load(Ordering::Relaxed) {
                    tracing::warn!("Shutdown requested - stopping benchmark early");
                    break 'outer;
                }

                total_queries += 1;
                let start = Instant::now();

                match target.invoke(&scenario.prompt).await {
                    Ok(response) => {
                        let elapsed = start.elapsed();
                        let latency_ms = elapsed.as_secs_f64() * 1000.0;
                        hist.saturating_record(elapsed.as_micros() as u64);
                        response_times_ms.push(latency_ms);
                        total_tokens += response.token_count();

                        let success = scenario.validate(&response.text);
                        if success {
                            success_count += 1;
                        } else {
                            error_count += 1;
                        }

                        tracing::info!(
                            target_name = %target.name(),
                            scenario = %scenario.name,
                            ts_nanos = common::time::now_nanos(),
                            latency_ms = latency_ms,
                            success = success,
                            "query complete"
                        );
                    }
                    Err(e) => {
                        error_count += 1;
                        tracing::error!(
                            target_name = %target.name(),
                            scenario = %scenario.name,
                            "query failed: {}",
                            e
                        );
                    }
                }
            }
        }

        let total_execution_time_secs = clock.measure();

        let measured_secs: f64 = response_times_ms.iter().sum::<f64>() / 1000.0;
        let avg_response_time_ms = if response_times_ms.is_empty() {
            0.0
        } else {
            response_times_ms.iter().sum::<f64>() / response_times_ms.len() as f64
        };
        let median_response_time_ms = if hist.is_empty() {
            0.0
        } else {
            hist.value_at_quantile(0.5) as f64 / 1000.0
        };
        let max_response_time_ms = hist.max() as f64 / 1000.0;
        let avg_token_rate = if measured_secs > 0.0 {
            total_tokens as f64 / measured_secs
        } else {
            0.0
        };
        let (task_success_rate, error_rate) = if total_queries > 0 {
            (
                (success_count as f64 / total_queries as f64) * 100.0,
                (error_count as f64 / total_queries as f64) * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        TargetMetrics {
            target: target.name().to_string(),
            total_queries,
            avg_response_time_ms,
            median_response_time_ms,
            max_response_time_ms,
            avg_token_rate,
            task_success_rate,
            error_rate,
            total_execution_time_secs,
        }
    }

    /// Fire `n` concurrent invocations of the same prompt and collect the
    /// per-request latencies in milliseconds.
    pub async fn run_concurrent(
        target: Arc<Target>,
        prompt: &str,
        n: usize,
    ) -> Vec<Result<f64, BenchError>> {
        let tasks: Vec<_> = (0..n)
            .map(|_| {
                let target = target.clone();
                let prompt = prompt.to_string();
                tokio::spawn(async move {
                    let start = Instant::now();
                    target
                        .invoke(&prompt)
                        .await
                        .map(|_| start.elapsed().as_secs_f64() * 1000.0)
                })
            })
            .collect();

        futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(result) => result,
                Err(e) => Err(BenchError::TargetError(format!("Worker panicked: {}", e))),
            })
            .collect()
    }
}
