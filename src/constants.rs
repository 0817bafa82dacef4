//! Copyright (c) 2026, Kirky.X
//!
//! Licensed under the Apache License, Version 2.0
//!
//! Centralized configuration constants for oknotok.
//!
//! All default values used by [`Settings`](crate::config::Settings) are
//! defined here with their purpose and usage context.

/// Default number of trial calls admitted while the breaker is half-ok.
///
/// Also the number of consecutive successes needed to close the trial
/// window and return to the ok state.
pub const DEFAULT_MAX_REQUESTS: u64 = 1;

/// Default stats rollover interval while ok, in seconds.
///
/// Zero disables periodic rollover: stats accumulate until the next
/// state transition.
pub const DEFAULT_INTERVAL_SECS: u64 = 0;

/// Default time spent in the not-ok state before a trial is allowed (1 minute).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Consecutive failures tolerated by the default trip policy.
///
/// The default policy trips once the streak is strictly greater than this
/// value, i.e. on the sixth consecutive failure.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u64 = 5;

/// Message of the rejection returned while the breaker is not ok.
pub const CIRCUIT_OPEN_MESSAGE: &str = "circuit open, call rejected";

/// Message of the rejection returned once the half-ok quota is used up.
pub const TOO_MANY_TRIAL_CALLS_MESSAGE: &str = "too many trial calls";
