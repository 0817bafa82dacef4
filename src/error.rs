//! Copyright (c) 2026, Kirky.X
//!
//! Licensed under the Apache License, Version 2.0
//!
//! 错误类型定义
//!
//! 使用thiserror定义所有错误类型。

use thiserror::Error;

/// 调用错误
///
/// 两种拒绝（熔断、试探配额用尽）不会执行被包装的操作；
/// 其余错误原样来自操作本身。
#[derive(Error, Debug)]
pub enum CallError<E> {
    /// 熔断器处于 NotOk 状态
    #[error("circuit open, call rejected")]
    Open,

    /// HalfOk 状态下试探请求已达上限
    #[error("too many trial calls")]
    TooManyTrialCalls,

    /// 操作本身返回的错误
    #[error("{0}")]
    Operation(E),
}

impl<E> CallError<E> {
    /// 是否为熔断器拒绝（操作未执行）
    pub fn is_rejection(&self) -> bool {
        matches!(self, CallError::Open | CallError::TooManyTrialCalls)
    }

    /// 操作错误的引用
    pub fn operation(&self) -> Option<&E> {
        match self {
            CallError::Operation(e) => Some(e),
            _ => None,
        }
    }

    /// 取出操作错误
    pub fn into_operation(self) -> Option<E> {
        match self {
            CallError::Operation(e) => Some(e),
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// YAML解析错误
    #[error("YAML解析错误: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML解析错误
    #[error("TOML解析错误: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON解析错误
    #[error("JSON解析错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 不支持的配置文件类型
    #[error("不支持的配置文件类型: {0}")]
    UnsupportedFormat(String),

    /// 时间格式错误
    #[error("无效的时间格式: {0}")]
    InvalidDuration(String),
}
