//! 注册表模块集成测试

use crate::common::{fail, test_error};
use oknotok::{BreakerRegistry, CallError, CircuitState, Settings};
use std::io;
use std::sync::{Arc, Barrier};
use std::thread;

/// 并发 get_or_create 只创建一个实例
#[test]
fn test_concurrent_get_or_create_shares_instance() {
    let registry = Arc::new(BreakerRegistry::<io::Error>::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.get_or_create("shared", Settings::default)
            })
        })
        .collect();

    let breakers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(breakers.iter().all(|b| Arc::ptr_eq(b, &breakers[0])));
    assert_eq!(registry.len(), 1);
}

/// 不同名称的熔断器互相独立
#[test]
fn test_breakers_are_isolated_by_name() {
    let registry = BreakerRegistry::<io::Error>::new();
    let settings = || Settings::default().ready_to_trip(|stats| stats.failures >= 1);

    let payments = registry.get_or_create("payments", settings);
    let search = registry.get_or_create("search", settings);

    fail(&payments);
    assert_eq!(payments.state(), CircuitState::NotOk);
    assert_eq!(search.state(), CircuitState::Ok);

    let result = registry
        .get("payments")
        .unwrap()
        .call(|| Ok::<_, io::Error>(()));
    assert!(matches!(result, Err(CallError::Open)));

    let result = search.call(|| Err::<(), _>(test_error()));
    assert!(matches!(result, Err(CallError::Operation(_))));

    let snapshots = registry.snapshots();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].name, "payments");
    assert_eq!(snapshots[0].state, CircuitState::NotOk);
    assert_eq!(snapshots[1].state, CircuitState::NotOk);
}
