//! Jobs spawned by `main` next to the HTTP server. Each `run` returns once
//! the shared shutdown token is cancelled.

pub mod monitor_poll;
pub mod reading_retention;
