//! 统计窗口
//!
//! 记录当前窗口内的请求数、成功数、失败数以及连续成功/失败次数。
//! 每次状态转换以及 Ok 状态下的周期性滚动都会清零。

use serde::{Deserialize, Serialize};

/// 统计计数器
///
/// 只由状态机持有，所有修改都发生在熔断器的互斥锁内。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// 放行的请求数
    pub requests: u64,
    /// 成功次数
    pub successes: u64,
    /// 失败次数
    pub failures: u64,
    /// 连续成功次数
    pub consecutive_successes: u64,
    /// 连续失败次数
    pub consecutive_failures: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次放行
    pub fn record_call(&mut self) {
        self.requests += 1;
    }

    /// 记录一次成功，清零连续失败
    pub fn record_success(&mut self) {
        self.successes += 1;
        self.consecutive_successes += 1;
        self.consecutive_failures = 0;
    }

    /// 记录一次失败，清零连续成功
    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.consecutive_failures += 1;
        self.consecutive_successes = 0;
    }

    /// 清零所有计数
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 已放行但尚未完成的请求数
    pub fn in_flight(&self) -> u64 {
        self.requests.saturating_sub(self.successes + self.failures)
    }
}
