//! 配置模块
//!
//! 定义熔断器的构造参数和三个可注入的策略：
//!
//! - [`TripPolicy`]：根据统计决定 Ok 状态下是否熔断
//! - [`SuccessClassifier`]：判断一次调用结果是否算作成功
//! - [`StateObserver`]：状态变更回调
//!
//! 另外提供 [`SettingsFile`]，可以从 YAML / TOML / JSON 文件加载基础参数。

use crate::constants::{
    DEFAULT_INTERVAL_SECS, DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_MAX_REQUESTS,
    DEFAULT_TIMEOUT_SECS,
};
use crate::error::ConfigError;
use crate::state::CircuitState;
use crate::stats::Stats;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// 熔断判定策略
pub trait TripPolicy: Send + Sync {
    /// 在 Ok 状态下记录一次失败后调用，返回 true 时熔断
    fn ready_to_trip(&self, stats: &Stats) -> bool;
}

/// 结果分类策略
pub trait SuccessClassifier<E>: Send + Sync {
    /// `error` 为 `None` 表示操作返回了 `Ok`
    fn is_successful(&self, error: Option<&E>) -> bool;
}

/// 状态变更回调
///
/// 在熔断器内部锁中同步调用，同一实例上不会并发执行。
/// 实现中不能再调用同一个熔断器。
pub trait StateObserver: Send + Sync {
    fn on_state_changed(&self, name: &str, from: CircuitState, to: CircuitState);
}

/// 默认熔断策略：连续失败次数超过阈值时熔断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsecutiveFailures {
    pub threshold: u64,
}

impl Default for ConsecutiveFailures {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }
}

impl TripPolicy for ConsecutiveFailures {
    fn ready_to_trip(&self, stats: &Stats) -> bool {
        stats.consecutive_failures > self.threshold
    }
}

/// 默认分类策略：没有错误即成功
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorIsFailure;

impl<E> SuccessClassifier<E> for ErrorIsFailure {
    fn is_successful(&self, error: Option<&E>) -> bool {
        error.is_none()
    }
}

/// 默认回调：什么都不做
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StateObserver for NoopObserver {
    fn on_state_changed(&self, _name: &str, _from: CircuitState, _to: CircuitState) {}
}

struct FnTripPolicy<F>(F);

impl<F> TripPolicy for FnTripPolicy<F>
where
    F: Fn(&Stats) -> bool + Send + Sync,
{
    fn ready_to_trip(&self, stats: &Stats) -> bool {
        (self.0)(stats)
    }
}

struct FnClassifier<F>(F);

impl<E, F> SuccessClassifier<E> for FnClassifier<F>
where
    F: Fn(Option<&E>) -> bool + Send + Sync,
{
    fn is_successful(&self, error: Option<&E>) -> bool {
        (self.0)(error)
    }
}

struct FnObserver<F>(F);

impl<F> StateObserver for FnObserver<F>
where
    F: Fn(&str, CircuitState, CircuitState) + Send + Sync,
{
    fn on_state_changed(&self, name: &str, from: CircuitState, to: CircuitState) {
        (self.0)(name, from, to)
    }
}

/// 熔断器配置
///
/// `max_requests` 与 `timeout` 为 0 时在构造熔断器时回退到默认值；
/// `interval` 为 0 表示 Ok 状态下不做周期性清零。
///
/// # 示例
/// ```rust
/// use oknotok::config::Settings;
/// use std::time::Duration;
///
/// let settings = Settings::<std::io::Error>::new("payments")
///     .max_requests(3)
///     .timeout(Duration::from_secs(30))
///     .ready_to_trip(|stats| stats.consecutive_failures >= 3);
/// assert_eq!(settings.max_requests, 3);
/// ```
pub struct Settings<E> {
    /// 熔断器名称
    pub name: String,
    /// HalfOk 状态下允许的最大试探请求数
    pub max_requests: u64,
    /// Ok 状态下统计清零周期
    pub interval: Duration,
    /// NotOk 状态持续时间
    pub timeout: Duration,
    pub(crate) trip_policy: Arc<dyn TripPolicy>,
    pub(crate) classifier: Arc<dyn SuccessClassifier<E>>,
    pub(crate) observer: Arc<dyn StateObserver>,
}

impl<E> Settings<E> {
    /// 使用默认参数创建指定名称的配置
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_requests: DEFAULT_MAX_REQUESTS,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            trip_policy: Arc::new(ConsecutiveFailures::default()),
            classifier: Arc::new(ErrorIsFailure),
            observer: Arc::new(NoopObserver),
        }
    }

    /// 设置名称
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置 HalfOk 状态下的最大试探请求数
    pub fn max_requests(mut self, max_requests: u64) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// 设置 Ok 状态下的统计清零周期
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 设置 NotOk 状态持续时间
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 使用闭包作为熔断判定策略
    pub fn ready_to_trip<F>(self, f: F) -> Self
    where
        F: Fn(&Stats) -> bool + Send + Sync + 'static,
    {
        self.trip_policy(FnTripPolicy(f))
    }

    /// 使用闭包作为结果分类策略
    pub fn is_successful<F>(self, f: F) -> Self
    where
        F: Fn(Option<&E>) -> bool + Send + Sync + 'static,
    {
        self.classifier(FnClassifier(f))
    }

    /// 使用闭包作为状态变更回调
    pub fn on_state_changed<F>(self, f: F) -> Self
    where
        F: Fn(&str, CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.observer(FnObserver(f))
    }

    pub fn trip_policy(mut self, policy: impl TripPolicy + 'static) -> Self {
        self.trip_policy = Arc::new(policy);
        self
    }

    pub fn classifier(mut self, classifier: impl SuccessClassifier<E> + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn observer(mut self, observer: impl StateObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// 零值回退到默认值
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_requests == 0 {
            self.max_requests = DEFAULT_MAX_REQUESTS;
        }
        if self.timeout.is_zero() {
            self.timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        }
        self
    }
}

impl<E> Default for Settings<E> {
    fn default() -> Self {
        Self::new("")
    }
}

impl<E> Clone for Settings<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            max_requests: self.max_requests,
            interval: self.interval,
            timeout: self.timeout,
            trip_policy: Arc::clone(&self.trip_policy),
            classifier: Arc::clone(&self.classifier),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<E> fmt::Debug for Settings<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("name", &self.name)
            .field("max_requests", &self.max_requests)
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// 可序列化的配置文件
///
/// 只包含基础参数，策略使用默认实现，可在 [`SettingsFile::into_settings`]
/// 之后通过构建方法替换。
///
/// ```yaml
/// name: payments
/// max_requests: 3
/// interval: 30s
/// timeout: 500ms
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub name: String,
    pub max_requests: u64,
    pub interval: Option<String>,
    pub timeout: Option<String>,
}

impl SettingsFile {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// 从文件加载，格式由扩展名决定
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::UnsupportedFormat(format!("无法确定配置文件类型: {}", path.display()))
            })?;

        let content = std::fs::read_to_string(path)?;

        match extension {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// 转换为熔断器配置
    pub fn into_settings<E>(self) -> Result<Settings<E>, ConfigError> {
        let mut settings = Settings::new(self.name).max_requests(self.max_requests);
        if let Some(interval) = self.interval.as_deref() {
            settings.interval = parse_duration(interval)?;
        }
        if let Some(timeout) = self.timeout.as_deref() {
            settings.timeout = parse_duration(timeout)?;
        }
        Ok(settings)
    }
}

/// 解析时间字符串
///
/// 支持的格式：
/// - `0` - 零（关闭）
/// - `250ms` - 250毫秒
/// - `10s` - 10秒
/// - `5m` - 5分钟
/// - `2h` - 2小时
/// - `1d` - 1天
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidDuration("时间不能为空".to_string()));
    }

    let (num_part, unit_part) =
        value.split_at(value.find(|c: char| c.is_alphabetic()).unwrap_or(value.len()));

    let num_str = num_part.trim();
    let unit = unit_part.trim().to_lowercase();

    if num_str.is_empty() {
        return Err(ConfigError::InvalidDuration(format!(
            "缺少数字部分: {}",
            value
        )));
    }

    let num: u64 = num_str
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(format!("无效的数字格式: {}", num_str)))?;

    let secs_per_unit = match unit.as_str() {
        "" if num == 0 => return Ok(Duration::ZERO),
        "ms" | "msec" | "millis" => return Ok(Duration::from_millis(num)),
        "s" | "sec" | "second" | "seconds" => 1,
        "m" | "min" | "minute" | "minutes" => 60,
        "h" | "hr" | "hour" | "hours" => 3600,
        "d" | "day" | "days" => 86400,
        _ => {
            return Err(ConfigError::InvalidDuration(format!(
                "不支持的单位: {}。支持的单位: ms, s, m, h, d",
                value
            )));
        }
    };

    num.checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidDuration(format!("时间超出范围: {}", value)))
}
