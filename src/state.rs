//! 熔断器状态
//!
//! 三种状态：Ok（正常）、HalfOk（试探）、NotOk（熔断）。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 熔断器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// 正常状态，请求放行并计入统计
    #[default]
    Ok,
    /// 试探状态，只放行有限数量的请求
    HalfOk,
    /// 熔断状态，拒绝所有请求
    NotOk,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Ok => "ok",
            CircuitState::HalfOk => "half-ok",
            CircuitState::NotOk => "not-ok",
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == CircuitState::Ok
    }

    pub fn is_half_ok(&self) -> bool {
        *self == CircuitState::HalfOk
    }

    pub fn is_not_ok(&self) -> bool {
        *self == CircuitState::NotOk
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的状态名称
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的熔断器状态: {0}")]
pub struct ParseStateError(pub String);

impl FromStr for CircuitState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ok" => Ok(CircuitState::Ok),
            "half-ok" | "half_ok" | "halfok" => Ok(CircuitState::HalfOk),
            "not-ok" | "not_ok" | "notok" => Ok(CircuitState::NotOk),
            other => Err(ParseStateError(other.to_string())),
        }
    }
}
