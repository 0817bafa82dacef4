//! 熔断器示例
//!
//! 本示例演示 CircuitBreaker 的完整状态循环。
//!
//! 运行方式: `cargo run --example circuit_breaker --features telemetry`

use oknotok::prelude::*;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    oknotok::init_logging("oknotok=debug").ok();

    println!("=== 熔断器示例 ===\n");

    let healthy = Arc::new(AtomicBool::new(false));
    let breaker = CircuitBreaker::new(
        Settings::new("inventory")
            .max_requests(2)
            .timeout(Duration::from_millis(200))
            .ready_to_trip(|stats| stats.consecutive_failures >= 3)
            .on_state_changed(|name, from, to| {
                println!("  [{}] 状态变更: {} -> {}", name, from, to);
            }),
    );

    let backend = |healthy: Arc<AtomicBool>| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if healthy.load(Ordering::SeqCst) {
            Ok("200 OK")
        } else {
            Err(io::Error::other("connection refused"))
        }
    };

    println!("--- 后端故障 ---\n");
    for i in 1..=5 {
        let result = breaker.execute(|| backend(healthy.clone())).await;
        println!("  请求 {}: {:?}", i, result.map_err(|e| e.to_string()));
    }

    println!("\n--- 等待超时并恢复后端 ---\n");
    tokio::time::sleep(Duration::from_millis(250)).await;
    healthy.store(true, Ordering::SeqCst);

    for i in 6..=8 {
        let result = breaker.execute(|| backend(healthy.clone())).await;
        println!("  请求 {}: {:?}", i, result.map_err(|e| e.to_string()));
    }

    println!("\n--- 快照 ---\n");
    match serde_json::to_string_pretty(&breaker.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("  序列化失败: {}", e),
    }

    println!("\n=== 示例完成 ===");
}
