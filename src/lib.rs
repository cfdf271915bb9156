pub mod access;
pub mod clock;
pub mod config;
pub mod error;
pub mod persistence;
pub mod router;
pub mod session;
pub mod telemetry;
pub mod workflows;
