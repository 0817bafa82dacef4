//! 日志初始化
//!
//! 熔断器通过 `tracing` 输出日志；本模块为没有自行配置订阅者的应用
//! 提供一个基于 `tracing-subscriber` 的默认输出。

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅者
///
/// 优先使用 `RUST_LOG` 环境变量，未设置时使用 `default_filter`。
///
/// # 返回
/// - `Ok(())`: 初始化成功
/// - `Err(_)`: 过滤表达式无效，或全局订阅者已经设置
///
/// # 示例
/// ```rust
/// oknotok::telemetry::init_logging("oknotok=debug").ok();
/// ```
pub fn init_logging(default_filter: &str) -> Result<(), String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| format!("无效的日志过滤表达式 {}: {}", default_filter, e))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("日志订阅者初始化失败: {}", e))?;

    info!("日志系统初始化完成");
    Ok(())
}
