//! Copyright (c) 2026, Kirky.X
//!
//! Licensed under the Apache License, Version 2.0
//!
//! oknotok - Three-State Circuit Breaker
//!
//! Protects callers from repeatedly invoking an operation that is likely to
//! fail. Recent outcomes are tracked in a stats window and every call is
//! gated through a breaker that is `Ok`, `HalfOk` or `NotOk`.
//!
//! # API Layers
//!
//! ## Prelude (Quick Start)
//!
//! Use `use oknotok::prelude::*;` to import all commonly used types.
//!
//! ## Core API
//!
//! - [`CircuitBreaker`] - Call gate wrapping sync (`call`) and async (`execute`) operations
//! - [`Settings`] - Construction-time configuration and strategies
//! - [`CircuitState`] - `Ok` / `HalfOk` / `NotOk`
//! - [`Stats`] - Counters of the current stats window
//! - [`CallError`] - Rejections and pass-through operation errors
//!
//! ## Extensions
//!
//! - [`BreakerRegistry`] - Named breakers shared across a process
//! - [`SettingsFile`] - Settings loaded from YAML / TOML / JSON
//! - Logging bootstrap (requires `telemetry` feature)
//!
//! # Examples
//!
//! ```rust
//! use oknotok::prelude::*;
//! use std::time::Duration;
//!
//! let breaker = CircuitBreaker::new(
//!     Settings::new("inventory")
//!         .timeout(Duration::from_millis(100))
//!         .ready_to_trip(|stats| stats.consecutive_failures >= 2),
//! );
//!
//! for _ in 0..2 {
//!     let _ = breaker.call(|| Err::<(), _>("backend down"));
//! }
//! assert_eq!(breaker.state(), CircuitState::NotOk);
//! assert!(matches!(breaker.call(|| Ok(())), Err(CallError::Open)));
//! ```
//!
//! # Timers
//!
//! There is no background clock. Timeouts and stats rollover are evaluated
//! lazily from a stored expiration timestamp each time the breaker is
//! accessed.

pub mod prelude;

pub mod circuit_breaker;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod registry;
pub mod state;
mod state_machine;
pub mod stats;
#[cfg(feature = "telemetry")]
pub mod telemetry;

// 重新导出常用类型
pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    parse_duration, ConsecutiveFailures, ErrorIsFailure, NoopObserver, Settings, SettingsFile,
    StateObserver, SuccessClassifier, TripPolicy,
};
pub use error::{CallError, ConfigError};
pub use registry::BreakerRegistry;
pub use state::{CircuitState, ParseStateError};
pub use stats::Stats;
#[cfg(feature = "telemetry")]
pub use telemetry::init_logging;
