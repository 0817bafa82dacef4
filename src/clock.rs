//! 时钟与惰性计时
//!
//! 熔断器没有后台定时任务。每次访问时用存储的到期时间与当前时间比较，
//! 由 [`timer_expired`] 决定是否需要先执行一次由时间驱动的状态转换。

use crate::state::CircuitState;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 时间来源
pub trait Clock: Send + Sync + Debug {
    /// 当前时间
    fn now(&self) -> Instant;
}

/// 系统单调时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动推进的时钟
///
/// 克隆体共享同一个时间点，适合在测试中精确控制超时与滚动。
///
/// # 示例
/// ```rust
/// use oknotok::clock::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now() - start, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// 向前推进时间
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// 判断当前状态的计时是否已到期
///
/// - `Ok`：仅在设置了滚动周期（存在到期时间）时才会到期
/// - `NotOk`：超时到期后应转为 `HalfOk`
/// - `HalfOk`：没有计时
pub fn timer_expired(state: CircuitState, expiration: Option<Instant>, now: Instant) -> bool {
    match state {
        CircuitState::Ok | CircuitState::NotOk => {
            expiration.is_some_and(|deadline| now >= deadline)
        }
        CircuitState::HalfOk => false,
    }
}
