//! Telemetry module
//!
//! Log sinks for the pipeline stages.
//!
//! # Overview
//!
//! There is no global logger registry. Each stage runs inside a
//! [`LogSink`], a `tracing` dispatcher handed to it by whoever owns the run:
//! the orchestrator, a standalone CLI command, or a test harness.
//!
//! File sinks write `YYYY-MM-DD HH:MM:SS | LEVEL | message` lines through a
//! size-capped [`RotatingFileWriter`].

mod rotate;
mod sink;

pub use rotate::RotatingFileWriter;
pub use sink::{separator, LineFormat, LogSink, SEPARATOR_WIDTH};

#[cfg(test)]
pub(crate) mod tests;
