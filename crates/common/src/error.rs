use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Parse Error: {0}")]
    ParseError(String),
    #[error("Target Error: {0}")]
    TargetError(String),
    #[error("Threshold Violation: {0}")]
    ThresholdViolation(String),
    #[error("Report Error: {0}")]
    ReportError(String),
}
