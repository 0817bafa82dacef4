//! 熔断器实现
//!
//! 包装任意操作：调用前询问状态机是否放行，调用后把结果报告给状态机。
//!
//! # 特性
//!
//! - **三状态**: Ok（正常）、HalfOk（试探）、NotOk（熔断）
//! - **惰性计时**: 没有后台任务，每次访问时比较到期时间
//! - **线程安全**: 调用前后的判定与修改在同一把互斥锁内完成，操作本身在锁外执行
//! - **panic 记账**: 操作 panic 时先记为失败，再原样继续展开

use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, SuccessClassifier};
use crate::error::CallError;
use crate::state::CircuitState;
use crate::state_machine::{Admission, StateMachine};
use crate::stats::Stats;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 熔断器快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    /// 名称
    pub name: String,
    /// 当前状态
    pub state: CircuitState,
    /// 当前统计窗口
    pub stats: Stats,
    /// 最后状态变更时间
    pub last_state_change: Option<chrono::DateTime<chrono::Utc>>,
    /// 距离当前计时到期的剩余时间
    pub expires_in: Option<Duration>,
}

/// 熔断器
///
/// 通过 `Arc` 在多个调用方之间共享。
pub struct CircuitBreaker<E> {
    machine: Mutex<StateMachine>,
    classifier: Arc<dyn SuccessClassifier<E>>,
    clock: Arc<dyn Clock>,
    settings: Settings<E>,
}

impl<E> CircuitBreaker<E> {
    /// 创建新的熔断器
    ///
    /// # 示例
    /// ```rust
    /// use oknotok::{CircuitBreaker, CircuitState, Settings};
    /// use std::time::Duration;
    ///
    /// let breaker: CircuitBreaker<std::io::Error> =
    ///     CircuitBreaker::new(Settings::new("storage").timeout(Duration::from_secs(30)));
    /// assert_eq!(breaker.state(), CircuitState::Ok);
    /// ```
    pub fn new(settings: Settings<E>) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// 使用指定时钟创建熔断器
    pub fn with_clock(settings: Settings<E>, clock: Arc<dyn Clock>) -> Self {
        let settings = settings.normalized();
        info!(
            breaker = %settings.name,
            max_requests = settings.max_requests,
            interval = ?settings.interval,
            timeout = ?settings.timeout,
            "创建熔断器"
        );

        Self {
            machine: Mutex::new(StateMachine::new(&settings, clock.now())),
            classifier: Arc::clone(&settings.classifier),
            clock,
            settings,
        }
    }

    /// 同步执行操作
    ///
    /// # 返回
    /// - `Err(CallError::Open)` / `Err(CallError::TooManyTrialCalls)`: 被拒绝，操作未执行
    /// - 其余情况返回操作本身的结果，错误包装在 `CallError::Operation` 中
    ///
    /// # 示例
    /// ```rust
    /// use oknotok::{CallError, CircuitBreaker, Settings};
    ///
    /// let breaker = CircuitBreaker::new(Settings::new("parser"));
    /// let value = breaker.call(|| "42".parse::<u32>()).unwrap();
    /// assert_eq!(value, 42);
    ///
    /// let err = breaker.call(|| "x".parse::<u32>()).unwrap_err();
    /// assert!(matches!(err, CallError::Operation(_)));
    /// ```
    pub fn call<T, F>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let guard = self.before_call()?;
        let result = operation();
        guard.complete(result.as_ref().err());
        result.map_err(CallError::Operation)
    }

    /// 异步执行操作
    ///
    /// 锁不会跨越 `.await` 持有。
    ///
    /// # 示例
    /// ```rust
    /// use oknotok::{CircuitBreaker, Settings};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let breaker = CircuitBreaker::new(Settings::new("remote"));
    ///
    /// let result = breaker
    ///     .execute(|| async { Ok::<_, std::io::Error>("pong") })
    ///     .await;
    /// assert_eq!(result.unwrap(), "pong");
    /// # }
    /// ```
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let guard = self.before_call()?;
        let result = operation().await;
        guard.complete(result.as_ref().err());
        result.map_err(CallError::Operation)
    }

    fn before_call(&self) -> Result<InFlight<'_, E>, CallError<E>> {
        let admission = {
            let mut machine = self.machine.lock();
            let now = self.clock.now();
            machine.before_call::<E>(now)?
        };
        Ok(InFlight {
            breaker: self,
            admission: Some(admission),
        })
    }

    /// 结果分类与记账在同一临界区内完成
    fn after_call(&self, admission: Admission, outcome: Outcome<'_, E>) {
        let mut machine = self.machine.lock();
        let success = match outcome {
            Outcome::Returned(error) => self.classifier.is_successful(error),
            Outcome::Aborted => false,
        };
        let now = self.clock.now();
        machine.after_call(now, admission, success);
    }

    /// 名称
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// 当前状态（会先执行到期的计时转换）
    pub fn state(&self) -> CircuitState {
        let mut machine = self.machine.lock();
        let now = self.clock.now();
        machine.current_state(now)
    }

    /// 当前统计窗口
    pub fn stats(&self) -> Stats {
        let mut machine = self.machine.lock();
        let now = self.clock.now();
        machine.current_state(now);
        machine.stats()
    }

    /// 获取快照
    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut machine = self.machine.lock();
        let now = self.clock.now();
        let state = machine.current_state(now);

        let since_change = now.saturating_duration_since(machine.last_state_change());
        let last_state_change = chrono::Duration::from_std(since_change)
            .ok()
            .map(|elapsed| chrono::Utc::now() - elapsed);

        BreakerSnapshot {
            name: machine.name().to_string(),
            state,
            stats: machine.stats(),
            last_state_change,
            expires_in: machine
                .expiration()
                .map(|deadline| deadline.saturating_duration_since(now)),
        }
    }

    /// 重置到 Ok 状态
    pub fn reset(&self) {
        let mut machine = self.machine.lock();
        let now = self.clock.now();
        machine.reset(now);
    }

    /// 获取配置
    pub fn settings(&self) -> &Settings<E> {
        &self.settings
    }
}

impl<E> Default for CircuitBreaker<E> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl<E> std::fmt::Debug for CircuitBreaker<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("settings", &self.settings)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

enum Outcome<'e, E> {
    /// 操作正常返回，`None` 表示返回了 `Ok`
    Returned(Option<&'e E>),
    /// 操作 panic 或被取消
    Aborted,
}

/// 已放行、尚未报告结果的调用
///
/// 没有通过 [`InFlight::complete`] 报告就被丢弃时（操作 panic 或 future
/// 被取消），按失败记账。
struct InFlight<'a, E> {
    breaker: &'a CircuitBreaker<E>,
    admission: Option<Admission>,
}

impl<E> InFlight<'_, E> {
    fn complete(mut self, error: Option<&E>) {
        if let Some(admission) = self.admission.take() {
            self.breaker.after_call(admission, Outcome::Returned(error));
        }
    }
}

impl<E> Drop for InFlight<'_, E> {
    fn drop(&mut self) {
        if let Some(admission) = self.admission.take() {
            if std::thread::panicking() {
                warn!(breaker = %self.breaker.name(), "操作发生 panic，记为失败");
            } else {
                debug!(breaker = %self.breaker.name(), "调用在完成前被取消，记为失败");
            }
            self.breaker.after_call(admission, Outcome::Aborted);
        }
    }
}
