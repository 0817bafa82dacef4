//! Prelude module - Commonly used types for quick imports
//!
//! Re-exports the most commonly used types so they can be imported with a
//! single `use oknotok::prelude::*;` statement.

pub use crate::circuit_breaker::CircuitBreaker;
pub use crate::config::{Settings, StateObserver, SuccessClassifier, TripPolicy};
pub use crate::error::CallError;
pub use crate::registry::BreakerRegistry;
pub use crate::state::CircuitState;
pub use crate::stats::Stats;
