//! 熔断器注册表
//!
//! 按名称共享熔断器实例，同名只创建一次。

use crate::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::config::Settings;
use ahash::AHashMap as HashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// 熔断器注册表
pub struct BreakerRegistry<E> {
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker<E>>>>,
}

impl<E> BreakerRegistry<E> {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self {
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// 获取或创建熔断器
    ///
    /// 只有在名称不存在时才调用 `make_settings`；新熔断器的名称总是注册键。
    ///
    /// # 示例
    /// ```rust
    /// use oknotok::{BreakerRegistry, Settings};
    /// use std::sync::Arc;
    ///
    /// let registry = BreakerRegistry::<std::io::Error>::new();
    /// let a = registry.get_or_create("db", || Settings::default().max_requests(2));
    /// let b = registry.get_or_create("db", Settings::default);
    /// assert!(Arc::ptr_eq(&a, &b));
    /// assert_eq!(b.settings().max_requests, 2);
    /// ```
    pub fn get_or_create<F>(&self, name: &str, make_settings: F) -> Arc<CircuitBreaker<E>>
    where
        F: FnOnce() -> Settings<E>,
    {
        let mut breakers = self.breakers.lock();
        if let Some(breaker) = breakers.get(name) {
            return breaker.clone();
        }
        debug!(breaker = %name, "注册熔断器");
        let breaker = Arc::new(CircuitBreaker::new(make_settings().name(name)));
        breakers.insert(name.to_string(), breaker.clone());
        breaker
    }

    /// 按名称获取
    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker<E>>> {
        self.breakers.lock().get(name).cloned()
    }

    /// 移除熔断器，已持有的 `Arc` 仍然可用
    pub fn remove(&self, name: &str) -> Option<Arc<CircuitBreaker<E>>> {
        self.breakers.lock().remove(name)
    }

    /// 所有名称（已排序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// 所有熔断器的快照（按名称排序）
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let breakers: Vec<Arc<CircuitBreaker<E>>> =
            self.breakers.lock().values().cloned().collect();
        let mut snapshots: Vec<BreakerSnapshot> =
            breakers.iter().map(|breaker| breaker.snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.breakers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.lock().is_empty()
    }

    /// 清除所有熔断器
    pub fn clear(&self) {
        self.breakers.lock().clear();
    }
}

impl<E> Default for BreakerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
