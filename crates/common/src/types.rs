use serde::{Deserialize, Serialize};

/// A benchmark scenario: the prompt sent to a target and the markers a
/// successful response is expected to contain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub prompt: String,
    /// Case-insensitive substrings a passing response must contain.
    /// An empty list accepts any response.
    pub expected_markers: Vec<String>,
}

impl Scenario {
    /// Build a free-form scenario from a task description. No markers, so
    /// any non-erroring response counts as a success.
    pub fn ad_hoc(task: impl Into<String>) -> Self {
        let task = task.into();
        Self {
            prompt: format!("Complete the following task: {}", task),
            name: task,
            expected_markers: Vec::new(),
        }
    }

    pub fn validate(&self, response: &str) -> bool {
        let lower = response.to_lowercase();
        self.expected_markers
            .iter()
            .all(|marker| lower.contains(&marker.to_lowercase()))
    }
}

/// Completion returned by a benchmark target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetResponse {
    pub text: String,
}

impl TargetResponse {
    /// Whitespace-delimited token count, the unit the token-rate metric uses.
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Aggregate performance metrics for one target over a benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetMetrics {
    pub target: String,
    pub total_queries: usize,
    pub avg_response_time_ms: f64,
    pub median_response_time_ms: f64,
    pub max_response_time_ms: f64,
    /// Tokens per second over measured response time.
    pub avg_token_rate: f64,
    /// Percentage of queries whose response passed scenario validation.
    pub task_success_rate: f64,
    /// Percentage of queries that failed outright.
    pub error_rate: f64,
    pub total_execution_time_secs: f64,
}
