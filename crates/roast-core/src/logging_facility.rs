//! Structured logging facility for Roast
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use roast_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! The orchestration layer owns lifecycle events (start/end/end_error). The
//! kernel itself only emits `tracing::debug!` for internal details.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
