//! Naive-versus-pooled connection benchmark
//!
//! Runs the same batch of concurrent operations twice against a simulated
//! database: once opening a fresh connection per operation, once through a
//! [`tidepool::ConnectionPool`].

pub mod config;
pub mod logging;
pub mod report;
pub mod runner;
pub mod simulated;

pub use config::{BenchConfig, BenchMode};
pub use report::{BenchReport, OutputFormat, RunReport};
pub use runner::{run, run_naive, run_pooled};
pub use simulated::{SimulatedConnection, SimulatedConnector, SimulationConfig};
