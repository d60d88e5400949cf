pub mod config;
pub mod error;
pub mod schedule;
pub mod sync;
pub mod telemetry;
