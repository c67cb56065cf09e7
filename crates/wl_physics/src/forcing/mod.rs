// crates/wl_physics/src/forcing/mod.rs

//! 边界强迫模块
//!
//! 提供时变边界条件的数据提供者：
//! - 潮位提供者 (TideProvider)：恒定潮位、实测潮位序列、余弦合成潮
//! - 河流流量 (RiverProvider / RiverSystem)：恒定或实测流量过程
//! - 风场提供者 (WindProvider)：实测风速风向
//! - 时间序列 (TimeSeries)
//!
//! # 设计思路
//!
//! 实测数据以 `(时间戳, 值)` 记录给出，文件读取由调用方负责。
//! 时间轴统一为相对首条记录的秒数。

pub mod river;
pub mod tide;
pub mod timeseries;
pub mod wind;

pub use river::{RiverData, RiverEntry, RiverProvider, RiverSystem};
pub use tide::{TideCosine, TideData, TideProvider};
pub use timeseries::{ExtrapolationMode, InterpolationMode, TimeSeries};
pub use wind::{solver_direction, WindProvider, WindSample};

/// 边界强迫错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForcingError {
    /// 时间序列为空
    #[error("Time series cannot be empty")]
    Empty,

    /// 时间和值数组长度不同
    #[error("Times and values must have same length: {times} != {values}")]
    LengthMismatch {
        /// 时间点数量
        times: usize,
        /// 值数量
        values: usize,
    },

    /// 时间不是严格单调递增
    #[error("Times must be monotonically increasing: times[{index}]={current} <= {previous}")]
    NonMonotonic {
        /// 违规位置
        index: usize,
        /// 前一个时间
        previous: f64,
        /// 当前时间
        current: f64,
    },

    /// 时间或值非有限数
    #[error("Non-finite time or value at record {index}")]
    NonFinite {
        /// 违规位置
        index: usize,
    },

    /// 查询时间超出数据范围
    #[error("'{name}': time {t} outside data range [{start}, {end}]")]
    OutOfRange {
        /// 数据名称
        name: String,
        /// 查询时间
        t: f64,
        /// 数据起始时间
        start: f64,
        /// 数据结束时间
        end: f64,
    },
}
