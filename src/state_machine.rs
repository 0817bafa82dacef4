//! 熔断器状态机
//!
//! 持有状态、到期时间和统计窗口，负责所有状态转换：
//!
//! | 当前状态 | 触发条件 | 目标状态 |
//! |---|---|---|
//! | Ok | 记录失败且 `ready_to_trip` 为真 | NotOk |
//! | Ok | 滚动周期到期 | Ok（只清零统计） |
//! | NotOk | 超时到期 | HalfOk |
//! | HalfOk | 记录失败 | NotOk |
//! | HalfOk | 连续成功数达到 `max_requests` | Ok |
//!
//! 状态机本身不加锁，由 [`CircuitBreaker`](crate::CircuitBreaker) 用互斥锁整体保护。

use crate::clock::timer_expired;
use crate::config::{Settings, StateObserver, TripPolicy};
use crate::error::CallError;
use crate::state::CircuitState;
use crate::stats::Stats;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// 一次放行的凭证，记录放行时所在的状态代次和统计窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Admission {
    generation: u64,
    window: u64,
}

pub(crate) struct StateMachine {
    name: String,
    max_requests: u64,
    interval: Duration,
    timeout: Duration,
    trip_policy: Arc<dyn TripPolicy>,
    observer: Arc<dyn StateObserver>,

    state: CircuitState,
    expiration: Option<Instant>,
    stats: Stats,
    /// 状态代次，每次状态转换或重置加一
    generation: u64,
    /// 统计窗口编号，每次清零加一
    window: u64,
    last_state_change: Instant,
}

impl StateMachine {
    pub(crate) fn new<E>(settings: &Settings<E>, now: Instant) -> Self {
        let mut machine = Self {
            name: settings.name.clone(),
            max_requests: settings.max_requests,
            interval: settings.interval,
            timeout: settings.timeout,
            trip_policy: Arc::clone(&settings.trip_policy),
            observer: Arc::clone(&settings.observer),
            state: CircuitState::Ok,
            expiration: None,
            stats: Stats::new(),
            generation: 0,
            window: 0,
            last_state_change: now,
        };
        machine.restart_clock(now);
        machine
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn stats(&self) -> Stats {
        self.stats
    }

    pub(crate) fn last_state_change(&self) -> Instant {
        self.last_state_change
    }

    pub(crate) fn expiration(&self) -> Option<Instant> {
        self.expiration
    }

    /// 解析当前状态，必要时先执行到期的计时转换
    pub(crate) fn current_state(&mut self, now: Instant) -> CircuitState {
        if timer_expired(self.state, self.expiration, now) {
            match self.state {
                CircuitState::Ok => {
                    debug!(breaker = %self.name, stats = ?self.stats, "统计周期滚动");
                    self.restart_clock(now);
                }
                CircuitState::NotOk => self.set_state(CircuitState::HalfOk, now),
                CircuitState::HalfOk => {}
            }
        }
        self.state
    }

    /// 调用前检查，放行时记录一次请求
    pub(crate) fn before_call<E>(&mut self, now: Instant) -> Result<Admission, CallError<E>> {
        match self.current_state(now) {
            CircuitState::NotOk => {
                debug!(breaker = %self.name, "熔断器处于 NotOk 状态，拒绝请求");
                return Err(CallError::Open);
            }
            CircuitState::HalfOk if self.stats.requests >= self.max_requests => {
                debug!(
                    breaker = %self.name,
                    requests = self.stats.requests,
                    max_requests = self.max_requests,
                    "试探请求已达上限，拒绝请求"
                );
                return Err(CallError::TooManyTrialCalls);
            }
            _ => {}
        }

        self.stats.record_call();
        Ok(Admission {
            generation: self.generation,
            window: self.window,
        })
    }

    /// 调用后记录结果
    ///
    /// 放行后发生过状态转换或重置时，结果不再计入；只发生了 Ok 周期滚动时，
    /// 结果连同这次请求一起计入当前窗口。
    pub(crate) fn after_call(&mut self, now: Instant, admission: Admission, success: bool) {
        let state = self.current_state(now);

        if admission.generation != self.generation {
            trace!(
                breaker = %self.name,
                success,
                "放行后状态已变化，忽略本次结果"
            );
            return;
        }

        if admission.window != self.window {
            trace!(breaker = %self.name, success, "结果跨越统计周期，计入当前窗口");
            self.stats.record_call();
        }

        if success {
            self.on_success(state, now);
        } else {
            self.on_failure(state, now);
        }
    }

    fn on_success(&mut self, state: CircuitState, now: Instant) {
        match state {
            CircuitState::Ok => {
                self.stats.record_success();
                trace!(breaker = %self.name, "操作成功（Ok 状态）");
            }
            CircuitState::HalfOk => {
                self.stats.record_success();
                if self.stats.consecutive_successes >= self.max_requests {
                    self.set_state(CircuitState::Ok, now);
                } else {
                    trace!(
                        breaker = %self.name,
                        "操作成功（HalfOk 状态）: {}/{}",
                        self.stats.consecutive_successes,
                        self.max_requests
                    );
                }
            }
            CircuitState::NotOk => {}
        }
    }

    fn on_failure(&mut self, state: CircuitState, now: Instant) {
        match state {
            CircuitState::Ok => {
                self.stats.record_failure();
                if self.trip_policy.ready_to_trip(&self.stats) {
                    self.set_state(CircuitState::NotOk, now);
                } else {
                    trace!(
                        breaker = %self.name,
                        consecutive_failures = self.stats.consecutive_failures,
                        "操作失败（Ok 状态）"
                    );
                }
            }
            CircuitState::HalfOk => {
                self.stats.record_failure();
                self.set_state(CircuitState::NotOk, now);
            }
            CircuitState::NotOk => {}
        }
    }

    /// 强制回到 Ok 状态并清零统计
    pub(crate) fn reset(&mut self, now: Instant) {
        info!(breaker = %self.name, "重置熔断器");
        if self.state == CircuitState::Ok {
            self.generation = self.generation.wrapping_add(1);
            self.restart_clock(now);
        } else {
            self.set_state(CircuitState::Ok, now);
        }
    }

    fn set_state(&mut self, to: CircuitState, now: Instant) {
        if self.state == to {
            return;
        }

        let from = self.state;
        let stats = self.stats;
        self.state = to;
        self.generation = self.generation.wrapping_add(1);
        self.last_state_change = now;
        self.restart_clock(now);

        if to == CircuitState::NotOk {
            warn!(
                breaker = %self.name,
                %from,
                %to,
                failures = stats.failures,
                consecutive_failures = stats.consecutive_failures,
                "熔断器状态变更"
            );
        } else {
            info!(breaker = %self.name, %from, %to, "熔断器状态变更");
        }

        self.observer.on_state_changed(&self.name, from, to);
    }

    /// 清零统计并按当前状态重新设置到期时间
    ///
    /// 到期时间超出 `Instant` 可表示的范围时视为永不到期。
    fn restart_clock(&mut self, now: Instant) {
        self.stats.reset();
        self.window = self.window.wrapping_add(1);

        self.expiration = match self.state {
            CircuitState::NotOk => now.checked_add(self.timeout),
            CircuitState::HalfOk => None,
            CircuitState::Ok if self.interval.is_zero() => None,
            CircuitState::Ok => now.checked_add(self.interval),
        };
    }
}
