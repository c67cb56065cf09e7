// crates/wl_physics/src/forcing/wind.rs

//! 风场数据提供者
//!
//! 气象站给出风速和风向（来向，0 = 北，90 = 东）。风速线性插值，
//! 风向取不晚于查询时刻的最后一个记录（前值保持）。
//!
//! 风向转换为求解器约定 `φ = -(dir + 90)`：0° 为来自西方，
//! 风矢量 `(s cos φ, s sin φ)` 指向风吹去的方向。
//!
//! 每个输出区间取区间中点的风场。

use chrono::{NaiveDateTime, TimeDelta};
use glam::DVec2;

use super::timeseries::{InterpolationMode, TimeSeries};
use super::ForcingError;

/// 来向风向（0 = 北）转换为求解器风向 [度]
#[inline]
pub fn solver_direction(direction_from_north: f64) -> f64 {
    -(direction_from_north + 90.0)
}

/// 单个时刻的风场
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    /// 风速 [m/s]
    pub speed: f64,
    /// 求解器约定风向 [度]
    pub phi: f64,
}

impl WindSample {
    /// 风矢量 [m/s]
    pub fn to_vector(&self) -> DVec2 {
        let phi = self.phi.to_radians();
        DVec2::new(self.speed * phi.cos(), self.speed * phi.sin())
    }
}

/// 风场数据提供者
#[derive(Debug, Clone)]
pub struct WindProvider {
    /// 风速序列（线性）
    speed: TimeSeries,
    /// 求解器风向序列（前值）
    direction: TimeSeries,
    /// 缓存的风场
    cached: Option<WindSample>,
}

impl WindProvider {
    /// 从气象站记录 `(时间戳, 风速, 来向风向)` 创建
    pub fn from_records(records: &[(NaiveDateTime, f64, f64)]) -> Result<Self, ForcingError> {
        let speeds: Vec<_> = records.iter().map(|&(t, s, _)| (t, s)).collect();
        let directions: Vec<_> = records
            .iter()
            .map(|&(t, _, dir)| (t, solver_direction(dir)))
            .collect();

        let speed = TimeSeries::from_records(&speeds, TimeDelta::zero(), 0.0)?;
        let direction = TimeSeries::from_records(&directions, TimeDelta::zero(), 0.0)?
            .with_interpolation(InterpolationMode::Previous);
        let cached = Self::sample(&speed, &direction, 0.0);
        Ok(Self {
            speed,
            direction,
            cached,
        })
    }

    fn sample(speed: &TimeSeries, direction: &TimeSeries, t: f64) -> Option<WindSample> {
        Some(WindSample {
            speed: speed.try_value(t)?,
            phi: direction.try_value(t)?,
        })
    }

    /// 获取指定时间的风场，超出记录范围时返回 `None`
    pub fn get_wind_at(&self, t: f64) -> Option<WindSample> {
        Self::sample(&self.speed, &self.direction, t)
    }

    /// 获取输出区间 `[t, t + interval]` 中点的风场
    pub fn get_wind_centered(&self, t: f64, interval: f64) -> Option<WindSample> {
        self.get_wind_at(t + 0.5 * interval)
    }

    /// 按区间中点更新缓存，无记录时保持原值
    ///
    /// 返回是否更新。
    pub fn update(&mut self, t: f64, interval: f64) -> bool {
        match self.get_wind_centered(t, interval) {
            Some(sample) => {
                self.cached = Some(sample);
                true
            }
            None => false,
        }
    }

    /// 缓存的风场
    pub fn cached(&self) -> Option<WindSample> {
        self.cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 21)
            .unwrap()
            .and_hms_opt(0, m, 0)
            .unwrap()
    }

    fn provider() -> WindProvider {
        WindProvider::from_records(&[(at(0), 4.0, 0.0), (at(6), 6.0, 90.0), (at(12), 8.0, 180.0)])
            .unwrap()
    }

    #[test]
    fn test_direction_convention() {
        assert_eq!(solver_direction(0.0), -90.0);
        assert_eq!(solver_direction(270.0), -360.0);

        // 北风吹向南
        let v = WindSample { speed: 5.0, phi: solver_direction(0.0) }.to_vector();
        assert!(v.x.abs() < 1e-12);
        assert!((v.y + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_speed_linear_direction_previous() {
        let wind = provider();
        let w = wind.get_wind_at(540.0).unwrap();
        assert!((w.speed - 7.0).abs() < 1e-12);
        assert_eq!(w.phi, -180.0);
        assert!(wind.get_wind_at(721.0).is_none());
    }

    #[test]
    fn test_centered_update() {
        let mut wind = provider();
        assert_eq!(wind.cached().map(|w| w.speed), Some(4.0));

        assert!(wind.update(0.0, 360.0));
        let w = wind.cached().unwrap();
        assert!((w.speed - 5.0).abs() < 1e-12);
        assert_eq!(w.phi, -90.0);

        assert!(!wind.update(720.0, 360.0));
        assert!((wind.cached().unwrap().speed - 5.0).abs() < 1e-12);
    }
}
