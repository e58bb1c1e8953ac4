pub mod error;
pub mod types;
pub mod time;

pub use error::BenchError;
pub use types::*;
