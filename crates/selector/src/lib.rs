use common::TargetMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// How demanding a task is. Weights the composite score so slower but more
/// reliable targets win harder tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Low,
    Medium,
    High,
    Extreme,
}

impl TaskComplexity {
    pub fn weight(&self) -> f64 {
        match self {
            TaskComplexity::Low => 0.2,
            TaskComplexity::Medium => 0.5,
            TaskComplexity::High => 0.8,
            TaskComplexity::Extreme => 1.0,
        }
    }
}

impl FromStr for TaskComplexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TaskComplexity::Low),
            "medium" => Ok(TaskComplexity::Medium),
            "high" => Ok(TaskComplexity::High),
            "extreme" => Ok(TaskComplexity::Extreme),
            other => Err(format!(
                "Unknown complexity '{}' (expected low|medium|high|extreme)",
                other
            )),
        }
    }
}

/// Weighted composite of latency, throughput, success and error rates.
/// Higher is better.
pub fn composite_score(metrics: &TargetMetrics, complexity: TaskComplexity) -> f64 {
    let avg_response_time = if metrics.avg_response_time_ms > 0.0 {
        metrics.avg_response_time_ms
    } else {
        1000.0
    };

    let response_time_score = 1.0 / avg_response_time;
    let token_efficiency_score = metrics.avg_token_rate / 100.0;
    let success_rate_score = metrics.task_success_rate / 100.0;
    let error_rate_penalty = 1.0 - (metrics.error_rate / 100.0);

    (0.3 * response_time_score
        + 0.3 * token_efficiency_score
        + 0.2 * success_rate_score
        + 0.2 * error_rate_penalty)
        * complexity.weight()
}

/// Pick the best target from historical metrics: the latest record per
/// target is scored and the highest score wins. Returns `None` when the
/// history is empty.
pub fn select_optimal(history: &[TargetMetrics], complexity: TaskComplexity) -> Option<&str> {
    let mut latest: HashMap<&str, &TargetMetrics> = HashMap::new();
    for metrics in history {
        latest.insert(metrics.target.as_str(), metrics);
    }

    let (name, score) = latest
        .into_iter()
        .map(|(name, metrics)| (name, composite_score(metrics, complexity)))
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    tracing::info!(
        selected = name,
        score = score,
        complexity = ?complexity,
        "target selected"
    );
    Some(name)
}
