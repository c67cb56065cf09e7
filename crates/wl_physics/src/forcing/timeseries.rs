// crates/wl_physics/src/forcing/timeseries.rs

//! 时间序列数据结构和插值
//!
//! 提供边界强迫使用的时间序列，支持：
//! - 线性插值和前值插值
//! - 多种外推模式（截断、线性、循环）
//! - 严格查询（超出范围时无值）
//! - 从带时间戳的实测记录构建，可附加时间和数值修正
//!
//! # 使用示例
//!
//! ```
//! use wl_physics::forcing::timeseries::{TimeSeries, ExtrapolationMode};
//!
//! let series = TimeSeries::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0])
//!     .unwrap()
//!     .with_extrapolation(ExtrapolationMode::Cyclic);
//!
//! assert!((series.get_value(0.5) - 0.5).abs() < 1e-12);
//! assert!((series.get_value(2.5) - 0.5).abs() < 1e-12);
//! assert_eq!(series.try_value(2.5), None);
//! ```

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::ForcingError;

/// 外推模式
///
/// 定义当查询时间超出数据范围时的处理方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationMode {
    /// 截断模式：超出范围时返回边界值
    #[default]
    Clamp,

    /// 线性外推：使用首/末两个点的斜率延伸
    Linear,

    /// 循环模式：t -> t_start + (t - t_start) mod (t_end - t_start)
    Cyclic,
}

/// 区间内插值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// 线性插值
    #[default]
    Linear,
    /// 前值保持：取不晚于 t 的最后一个记录
    Previous,
}

/// 时间序列数据
///
/// # 约束
///
/// - 时间数组严格单调递增
/// - 时间和值数组长度相等且非空，所有值有限
///
/// 反序列化经过 [`TimeSeries::new`] 的同样检查。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeries")]
pub struct TimeSeries {
    /// 时间点 [s]
    times: Vec<f64>,
    /// 对应的值
    values: Vec<f64>,
    /// 插值方式
    interp_mode: InterpolationMode,
    /// 外推模式
    extrap_mode: ExtrapolationMode,
}

/// 未验证的序列化形式
#[derive(Deserialize)]
struct RawTimeSeries {
    times: Vec<f64>,
    values: Vec<f64>,
    #[serde(default)]
    interp_mode: InterpolationMode,
    #[serde(default)]
    extrap_mode: ExtrapolationMode,
}

impl TryFrom<RawTimeSeries> for TimeSeries {
    type Error = ForcingError;

    fn try_from(raw: RawTimeSeries) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.times, raw.values)?
            .with_interpolation(raw.interp_mode)
            .with_extrapolation(raw.extrap_mode))
    }
}

impl TimeSeries {
    /// 从时间和值数组创建时间序列
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, ForcingError> {
        if times.len() != values.len() {
            return Err(ForcingError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Err(ForcingError::Empty);
        }
        if let Some(index) = times
            .iter()
            .zip(&values)
            .position(|(t, v)| !t.is_finite() || !v.is_finite())
        {
            return Err(ForcingError::NonFinite { index });
        }
        if let Some(i) = (1..times.len()).find(|&i| times[i] <= times[i - 1]) {
            return Err(ForcingError::NonMonotonic {
                index: i,
                previous: times[i - 1],
                current: times[i],
            });
        }

        Ok(Self {
            times,
            values,
            interp_mode: InterpolationMode::Linear,
            extrap_mode: ExtrapolationMode::Clamp,
        })
    }

    /// 从 (时间, 值) 点对列表创建时间序列
    pub fn from_points(points: Vec<(f64, f64)>) -> Result<Self, ForcingError> {
        let (times, values): (Vec<_>, Vec<_>) = points.into_iter().unzip();
        Self::new(times, values)
    }

    /// 从带时间戳的记录创建时间序列
    ///
    /// 时间轴为相对首条记录的秒数减去 `time_offset`，向下取整到整秒；
    /// 每个值加上 `value_offset`。
    pub fn from_records(
        records: &[(NaiveDateTime, f64)],
        time_offset: TimeDelta,
        value_offset: f64,
    ) -> Result<Self, ForcingError> {
        let Some(&(t0, _)) = records.first() else {
            return Err(ForcingError::Empty);
        };
        let (times, values) = records
            .iter()
            .map(|&(dt, value)| (elapsed_seconds(dt - t0 - time_offset), value + value_offset))
            .unzip();
        Self::new(times, values)
    }

    /// 设置插值方式
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interp_mode = mode;
        self
    }

    /// 设置外推模式
    pub fn with_extrapolation(mut self, mode: ExtrapolationMode) -> Self {
        self.extrap_mode = mode;
        self
    }

    /// 获取插值方式
    pub fn interpolation_mode(&self) -> InterpolationMode {
        self.interp_mode
    }

    /// 获取外推模式
    pub fn extrapolation_mode(&self) -> ExtrapolationMode {
        self.extrap_mode
    }

    /// 获取时间范围
    pub fn time_range(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// 获取数据点数量
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// 是否为空（构造时已保证非空）
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// 获取时间点数组引用
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// 获取值数组引用
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 所有值的算术平均
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// 是否在数据范围内
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        let (t_start, t_end) = self.time_range();
        t >= t_start && t <= t_end
    }

    /// 获取指定时间的值，超出范围时按外推模式处理
    pub fn get_value(&self, t: f64) -> f64 {
        if self.contains(t) {
            return self.interpolate_internal(t);
        }
        self.handle_extrapolation(t)
    }

    /// 严格查询：超出数据范围时返回 `None`
    pub fn try_value(&self, t: f64) -> Option<f64> {
        self.contains(t).then(|| self.interpolate_internal(t))
    }

    fn handle_extrapolation(&self, t: f64) -> f64 {
        let n = self.times.len();
        let (t_start, t_end) = self.time_range();

        match self.extrap_mode {
            ExtrapolationMode::Clamp => {
                if t < t_start {
                    self.values[0]
                } else {
                    self.values[n - 1]
                }
            }
            ExtrapolationMode::Cyclic => {
                let duration = t_end - t_start;
                if duration < 1e-12 {
                    return self.values[0];
                }
                let offset = (t - t_start).rem_euclid(duration);
                self.interpolate_internal(t_start + offset)
            }
            ExtrapolationMode::Linear => {
                if n < 2 {
                    return self.values[0];
                }
                if t < t_start {
                    let slope = (self.values[1] - self.values[0]) / (self.times[1] - t_start);
                    self.values[0] + slope * (t - t_start)
                } else {
                    let slope =
                        (self.values[n - 1] - self.values[n - 2]) / (t_end - self.times[n - 2]);
                    self.values[n - 1] + slope * (t - t_end)
                }
            }
        }
    }

    /// 内部插值（假设 t 在范围内）
    fn interpolate_internal(&self, t: f64) -> f64 {
        let n = self.times.len();
        // 最后一个 times[idx] <= t 的区间
        let idx = self.times.partition_point(|&ti| ti <= t).saturating_sub(1);
        if idx >= n - 1 {
            return self.values[n - 1];
        }

        match self.interp_mode {
            InterpolationMode::Previous => self.values[idx],
            InterpolationMode::Linear => {
                let (t0, t1) = (self.times[idx], self.times[idx + 1]);
                let (v0, v1) = (self.values[idx], self.values[idx + 1]);
                v0 + (t - t0) / (t1 - t0) * (v1 - v0)
            }
        }
    }
}

/// 时间差转为整秒（向下取整）
fn elapsed_seconds(delta: TimeDelta) -> f64 {
    let secs = delta.num_seconds();
    let has_fraction = delta.subsec_nanos() != 0;
    if has_fraction && delta < TimeDelta::zero() {
        (secs - 1) as f64
    } else {
        secs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(TimeSeries::new(vec![], vec![]), Err(ForcingError::Empty)));
        assert!(matches!(
            TimeSeries::new(vec![0.0, 1.0], vec![0.0]),
            Err(ForcingError::LengthMismatch { times: 2, values: 1 })
        ));
        assert!(matches!(
            TimeSeries::new(vec![0.0, 0.0], vec![0.0, 1.0]),
            Err(ForcingError::NonMonotonic { index: 1, .. })
        ));
        assert!(matches!(
            TimeSeries::new(vec![0.0, 1.0], vec![0.0, f64::NAN]),
            Err(ForcingError::NonFinite { index: 1 })
        ));
    }

    #[test]
    fn test_linear_interpolation() {
        let series = TimeSeries::new(vec![0.0, 10.0, 20.0], vec![0.0, 1.0, 3.0]).unwrap();
        assert!((series.get_value(5.0) - 0.5).abs() < 1e-12);
        assert!((series.get_value(15.0) - 2.0).abs() < 1e-12);
        assert_eq!(series.get_value(20.0), 3.0);
        assert_eq!(series.get_value(0.0), 0.0);
    }

    #[test]
    fn test_previous_interpolation() {
        let series = TimeSeries::new(vec![0.0, 10.0, 20.0], vec![0.0, 1.0, 3.0])
            .unwrap()
            .with_interpolation(InterpolationMode::Previous);
        assert_eq!(series.get_value(9.99), 0.0);
        assert_eq!(series.get_value(10.0), 1.0);
        assert_eq!(series.get_value(19.0), 1.0);
        assert_eq!(series.get_value(20.0), 3.0);
    }

    #[test]
    fn test_extrapolation_modes() {
        let base = TimeSeries::new(vec![0.0, 10.0], vec![0.0, 1.0]).unwrap();
        assert_eq!(base.get_value(-5.0), 0.0);
        assert_eq!(base.get_value(15.0), 1.0);

        let linear = base.clone().with_extrapolation(ExtrapolationMode::Linear);
        assert!((linear.get_value(15.0) - 1.5).abs() < 1e-12);
        assert!((linear.get_value(-5.0) + 0.5).abs() < 1e-12);

        let cyclic = base.with_extrapolation(ExtrapolationMode::Cyclic);
        assert!((cyclic.get_value(12.0) - 0.2).abs() < 1e-12);
        assert!((cyclic.get_value(-2.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_strict_query() {
        let series = TimeSeries::new(vec![0.0, 10.0], vec![2.0, 4.0]).unwrap();
        assert_eq!(series.try_value(-0.1), None);
        assert_eq!(series.try_value(10.1), None);
        assert_eq!(series.try_value(5.0), Some(3.0));
        assert!((series.mean() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_records_with_offsets() {
        let records = [(at(0, 0, 0), 0.1), (at(0, 6, 0), 0.2), (at(0, 12, 0), 0.3)];
        let series =
            TimeSeries::from_records(&records, TimeDelta::minutes(45), -0.3).unwrap();
        assert_eq!(series.times(), &[-2700.0, -2340.0, -1980.0]);
        assert!((series.values()[0] + 0.2).abs() < 1e-12);
        assert!((series.values()[2] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_elapsed_seconds_floors() {
        assert_eq!(elapsed_seconds(TimeDelta::milliseconds(1500)), 1.0);
        assert_eq!(elapsed_seconds(TimeDelta::milliseconds(-1500)), -2.0);
        assert_eq!(elapsed_seconds(TimeDelta::seconds(-3)), -3.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<TimeSeries>(r#"{"times":[],"values":[]}"#);
        assert!(err.is_err());
        assert!(serde_json::from_str::<TimeSeries>(r#"{"times":[0.0,1.0],"values":[1.0]}"#).is_err());
        assert!(serde_json::from_str::<TimeSeries>(r#"{"times":[1.0,0.0],"values":[1.0,2.0]}"#).is_err());

        let series: TimeSeries =
            serde_json::from_str(r#"{"times":[0.0,10.0],"values":[1.0,3.0],"extrap_mode":"cyclic"}"#)
                .unwrap();
        assert!((series.get_value(15.0) - 2.0).abs() < 1e-12);

        let text = serde_json::to_string(&series).unwrap();
        assert_eq!(serde_json::from_str::<TimeSeries>(&text).unwrap(), series);
    }
}
