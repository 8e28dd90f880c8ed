//! Shared plumbing for the tweetie crates.
//!
//! Only observability lives here today: a single [`observability::init_logging`]
//! entry point that every binary and integration test calls before doing any work,
//! so all components log through the same `tracing` subscriber and file sink.
//!
//! # Examples
//!
//! ```rust
//! use tweetie_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, tweetie_common::APP_NAME);
//! ```

pub mod observability;

/// Logical application name used for log files and default data directories.
pub const APP_NAME: &str = "tweetie";
