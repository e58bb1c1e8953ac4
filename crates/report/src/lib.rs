use chrono::{DateTime, Utc};
use common::{BenchError, TargetMetrics};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// A complete benchmark run, ready for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub metrics: Vec<TargetMetrics>,
}

impl RunReport {
    pub fn new(metrics: Vec<TargetMetrics>) -> Self {
        Self {
            generated_at: Utc::now(),
            metrics,
        }
    }
}

/// One line of the JSONL history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryRecord {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    metrics: TargetMetrics,
}

/// Write a pretty-printed JSON report and return its path. The filename
/// embeds a UTC timestamp so successive runs don't clobber each other.
pub fn write_report(dir: impl AsRef<Path>, run: &RunReport) -> Result<PathBuf, BenchError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .map_err(|e| BenchError::ReportError(format!("Failed to create report dir: {}", e)))?;

    let filename = format!(
        "benchmark_{}.json",
        run.generated_at.format("%Y%m%dT%H%M%SZ")
    );
    let path = dir.join(filename);

    let json = serde_json::to_string_pretty(run)
        .map_err(|e| BenchError::ReportError(e.to_string()))?;
    fs::write(&path, json)
        .map_err(|e| BenchError::ReportError(format!("Failed to write report: {}", e)))?;

    tracing::info!(path = %path.display(), "report written");
    Ok(path)
}

/// Append one timestamped record per target to the JSONL history file.
pub fn append_history(
    path: impl AsRef<Path>,
    metrics: &[TargetMetrics],
) -> Result<(), BenchError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| BenchError::ReportError(format!("Failed to create history dir: {}", e)))?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BenchError::ReportError(format!("Failed to open history: {}", e)))?;

    for m in metrics {
        let record = HistoryRecord {
            timestamp: Utc::now(),
            metrics: m.clone(),
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| BenchError::ReportError(e.to_string()))?;
        writeln!(file, "{}", line)
            .map_err(|e| BenchError::ReportError(format!("Failed to append history: {}", e)))?;
    }

    Ok(())
}

/// Load historical metrics in file order. A missing file is an empty
/// history; malformed lines are skipped with a warning.
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<TargetMetrics>, BenchError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| BenchError::ReportError(format!("Failed to read history: {}", e)))?;

    let mut history = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HistoryRecord>(line) {
            Ok(record) => history.push(record.metrics),
            Err(e) => {
                tracing::warn!("Skipping malformed history line {}: {}", line_no + 1, e);
            }
        }
    }

    Ok(history)
}

/// Plain-text block per target, for terminal output.
pub fn render_summary(metrics: &[TargetMetrics]) -> String {
    let mut out = String::new();
    for m in metrics {
        let _ = writeln!(out, "\n--- {} Results ---", m.target);
        let _ = writeln!(out, "Queries:    {}", m.total_queries);
        let _ = writeln!(out, "Avg:        {:.2} ms", m.avg_response_time_ms);
        let _ = writeln!(out, "Median:     {:.2} ms", m.median_response_time_ms);
        let _ = writeln!(out, "Max:        {:.2} ms", m.max_response_time_ms);
        let _ = writeln!(out, "Token Rate: {:.2} tok/s", m.avg_token_rate);
        let _ = writeln!(out, "Success:    {:.1} %", m.task_success_rate);
        let _ = writeln!(out, "Errors:     {:.1} %", m.error_rate);
        let _ = writeln!(out, "Duration:   {:.2} s", m.total_execution_time_secs);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics(target: &str) -> TargetMetrics {
        TargetMetrics {
            target: target.to_string(),
            total_queries: 4,
            avg_response_time_ms: 12.5,
            median_response_time_ms: 11.0,
            max_response_time_ms: 20.0,
            avg_token_rate: 42.0,
            task_success_rate: 100.0,
            error_rate: 0.0,
            total_execution_time_secs: 0.05,
        }
    }

    #[test]
    fn test_report_roundtrip() {
        let dir = "test_reports_roundtrip";
        let run = RunReport::new(vec![sample_metrics("replay")]);

        let path = write_report(dir, &run).expect("Failed to write report");
        let content = fs::read_to_string(&path).expect("Failed to read report back");
        let loaded: RunReport = serde_json::from_str(&content).expect("Failed to parse report");

        let _ = fs::remove_dir_all(dir);

        assert_eq!(loaded.metrics, run.metrics);
    }

    #[test]
    fn test_history_append_and_load() {
        let dir = "test_reports_history";
        let path = Path::new(dir).join("history.jsonl");

        append_history(&path, &[sample_metrics("alpha")]).expect("Failed to append");
        append_history(&path, &[sample_metrics("beta")]).expect("Failed to append");

        let history = load_history(&path).expect("Failed to load history");

        let _ = fs::remove_dir_all(dir);

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].target, "alpha");
        assert_eq!(history[1].target, "beta");
    }

    #[test]
    fn test_load_history_skips_malformed_lines() {
        let dir = "test_reports_malformed";
        let path = Path::new(dir).join("history.jsonl");

        append_history(&path, &[sample_metrics("alpha")]).expect("Failed to append");
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "not json at all").unwrap();
        }
        append_history(&path, &[sample_metrics("beta")]).expect("Failed to append");

        let history = load_history(&path).expect("Failed to load history");

        let _ = fs::remove_dir_all(dir);

        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_missing_history_is_empty() {
        let history = load_history("test_reports_missing/none.jsonl").expect("Load failed");
        assert!(history.is_empty());
    }

    #[test]
    fn test_render_summary_lists_targets() {
        let rendered = render_summary(&[sample_metrics("alpha"), sample_metrics("beta")]);
        assert!(rendered.contains("--- alpha Results ---"));
        assert!(rendered.contains("--- beta Results ---"));
        assert!(rendered.contains("Token Rate: 42.00 tok/s"));
    }
}
