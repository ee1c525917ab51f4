//! Domain logic for the museum environment monitor.
//!
//! Everything in this crate is free of I/O: sensor readings, threshold
//! resolution, rule-based anomaly evaluation and the explanation text that
//! accompanies a verdict. The `db`, `devices` and `api` crates build on it.

pub mod anomaly;
pub mod chat;
pub mod error;
pub mod explanation;
pub mod placeholder;
pub mod sensor;
pub mod thresholds;
pub mod types;
