//! 端到端场景
