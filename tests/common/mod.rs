//! 测试通用工具模块
//!
//! 提供测试中常用的工具函数和辅助结构。

#![allow(dead_code)]

use oknotok::{CircuitBreaker, CircuitState, ManualClock, Settings, StateObserver};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// 记录状态变更的回调
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    transitions: Arc<Mutex<Vec<(String, CircuitState, CircuitState)>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的 (from, to)
    pub fn transitions(&self) -> Vec<(CircuitState, CircuitState)> {
        self.transitions
            .lock()
            .iter()
            .map(|(_, from, to)| (*from, *to))
            .collect()
    }

    /// 已记录的名称
    pub fn names(&self) -> Vec<String> {
        self.transitions
            .lock()
            .iter()
            .map(|(name, _, _)| name.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.transitions.lock().len()
    }
}

impl StateObserver for RecordingObserver {
    fn on_state_changed(&self, name: &str, from: CircuitState, to: CircuitState) {
        self.transitions.lock().push((name.to_string(), from, to));
    }
}

/// 测试用的操作错误
pub fn test_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "test error")
}

/// 使用手动时钟创建熔断器
pub fn manual_breaker(
    settings: Settings<io::Error>,
) -> (CircuitBreaker<io::Error>, ManualClock, RecordingObserver) {
    let clock = ManualClock::new();
    let observer = RecordingObserver::new();
    let breaker =
        CircuitBreaker::with_clock(settings.observer(observer.clone()), Arc::new(clock.clone()));
    (breaker, clock, observer)
}

/// 让熔断器执行一次失败调用
pub fn fail(breaker: &CircuitBreaker<io::Error>) {
    let _ = breaker.call(|| Err::<(), _>(test_error()));
}

/// 让熔断器执行一次成功调用
pub fn succeed(breaker: &CircuitBreaker<io::Error>) {
    let _ = breaker.call(|| Ok::<(), io::Error>(()));
}
