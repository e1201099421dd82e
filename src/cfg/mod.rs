//! cfg 模块 - 配置辅助
//!
//! 提供 From 实现宏以及人性化的时长序列化

#[macro_use]
pub mod macros;
pub mod serde_duration;

pub use serde_duration::{format_duration, parse_duration, HumanDur};
