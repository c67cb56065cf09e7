// crates/wl_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `WlError` 枚举和 `WlResult` 类型别名。物理相关的错误
//! （植被参数、字段注册、边界强迫）在 `wl_physics` 各模块中单独定义。
//!
//! # 示例
//!
//! ```
//! use wl_foundation::error::{WlError, WlResult};
//!
//! fn check_cells(n: usize) -> WlResult<()> {
//!     WlError::check_size("stage", 100, n)
//! }
//!
//! assert!(check_cells(100).is_ok());
//! assert!(check_cells(99).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type WlResult<T> = Result<T, WlError>;

/// WLAD 错误类型
#[derive(Error, Debug)]
pub enum WlError {
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },
}

impl WlError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl WlError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> WlResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查值是否在范围内
    #[inline]
    pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> WlResult<()> {
        if !(min..=max).contains(&value) {
            Err(Self::out_of_range(field, value, min, max))
        } else {
            Ok(())
        }
    }

    /// 检查数组中所有值均为有限非负数
    ///
    /// 返回第一个违规值的错误。
    pub fn check_non_negative(field: &'static str, values: &[f64]) -> WlResult<()> {
        match values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            Some(&bad) => Err(Self::out_of_range(field, bad, 0.0, f64::MAX)),
            None => Ok(()),
        }
    }
}
