// crates/wl_physics/src/forcing/tide.rs

//! 潮位边界数据提供者
//!
//! 三角洲外海边界的潮位有三种来源：
//! - 恒定潮位（无潮汐试验）
//! - 内陆潮位站实测序列，附加到达时间修正和基准修正
//! - 余弦合成潮 `η(t) = A cos(ωt + φ) + η₀`
//!
//! 合成潮默认振幅 0.25 m，角频率取 N2 分潮 7.2722e-5 rad/s，平均潮位 0.26 m。

use chrono::{NaiveDateTime, TimeDelta};
use wl_config::BoundaryConfig;

use super::timeseries::{ExtrapolationMode, TimeSeries};
use super::ForcingError;

/// 余弦合成潮
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TideCosine {
    /// 振幅 [m]
    pub amplitude: f64,
    /// 角频率 [rad/s]
    pub omega: f64,
    /// 相位 [rad]
    pub phase: f64,
    /// 平均潮位 [m]
    pub offset: f64,
}

impl Default for TideCosine {
    fn default() -> Self {
        Self {
            amplitude: 0.25,
            omega: 7.2722e-5,
            phase: 0.0,
            offset: 0.26,
        }
    }
}

impl TideCosine {
    /// 计算潮位
    #[inline]
    pub fn level(&self, t: f64) -> f64 {
        self.amplitude * (self.omega * t + self.phase).cos() + self.offset
    }
}

/// 潮位数据类型
#[derive(Debug, Clone, PartialEq)]
pub enum TideData {
    /// 恒定潮位
    Constant(f64),
    /// 余弦合成潮
    Cosine(TideCosine),
    /// 实测潮位序列（已含修正）
    Gauge(TimeSeries),
}

/// 潮位数据提供者
#[derive(Debug, Clone)]
pub struct TideProvider {
    /// 数据类型
    data: TideData,
    /// 缓存的潮位
    cached_level: f64,
}

impl TideProvider {
    fn from_data(data: TideData) -> Self {
        let mut provider = Self {
            data,
            cached_level: 0.0,
        };
        provider.update(0.0);
        provider
    }

    /// 创建恒定潮位
    pub fn constant(level: f64) -> Self {
        Self::from_data(TideData::Constant(level))
    }

    /// 创建余弦合成潮
    pub fn cosine(tide: TideCosine) -> Self {
        Self::from_data(TideData::Cosine(tide))
    }

    /// 从潮位站记录创建
    ///
    /// `time_offset` 修正潮波从外海到测站的传播时间（时间轴前移），
    /// `vertical_offset` 修正测站基准。序列两端之外保持端点值。
    pub fn gauge(
        records: &[(NaiveDateTime, f64)],
        time_offset: TimeDelta,
        vertical_offset: f64,
    ) -> Result<Self, ForcingError> {
        let series = TimeSeries::from_records(records, time_offset, vertical_offset)?
            .with_extrapolation(ExtrapolationMode::Clamp);
        Ok(Self::from_data(TideData::Gauge(series)))
    }

    /// 按边界配置创建
    ///
    /// 恒定潮位开关打开时使用恒定潮位；否则有测站记录时使用实测序列，
    /// 没有记录时使用默认余弦合成潮。
    pub fn from_config(
        config: &BoundaryConfig,
        gauge_records: Option<&[(NaiveDateTime, f64)]>,
    ) -> Result<Self, ForcingError> {
        if config.steady_tide {
            return Ok(Self::constant(config.steady_tide_level));
        }
        match gauge_records {
            Some(records) => Self::gauge(
                records,
                TimeDelta::milliseconds((config.tide_time_offset * 1000.0).round() as i64),
                config.tide_vertical_offset,
            ),
            None => Ok(Self::cosine(TideCosine::default())),
        }
    }

    /// 数据类型
    pub fn data(&self) -> &TideData {
        &self.data
    }

    /// 获取指定时间的潮位
    pub fn get_level_at(&self, t: f64) -> f64 {
        match &self.data {
            TideData::Constant(level) => *level,
            TideData::Cosine(tide) => tide.level(t),
            TideData::Gauge(series) => series.get_value(t),
        }
    }

    /// 更新缓存
    pub fn update(&mut self, t: f64) {
        self.cached_level = self.get_level_at(t);
    }

    /// 缓存的潮位
    pub fn cached(&self) -> f64 {
        self.cached_level
    }
}
