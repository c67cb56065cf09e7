// crates/wl_foundation/src/lib.rs

//! WLAD Foundation Layer
//!
//! 基础层，提供整个工作区共用的错误类型。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型与验证辅助方法

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

// 重导出常用类型
pub use error::{WlError, WlResult};
