pub mod runner;
pub mod scenarios;
pub mod targets;

pub use runner::{BenchRunner, RunOptions};
pub use scenarios::{builtin_scenarios, sample_responses};
pub use targets::{HttpTarget, ReplayTarget, Target};
