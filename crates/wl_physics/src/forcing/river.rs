// crates/wl_physics/src/forcing/river.rs

//! 河流流量数据提供者
//!
//! 入口/出口流量来自流量站实测记录：
//! - 恒定流量：取实测记录的算术平均
//! - 非恒定流量：线性插值，超出记录范围时无值
//!
//! [`RiverSystem`] 管理所有入口的当前流量。每个输出时刻更新一次，
//! 流量过程没有值时保持上一时刻的流量；恒定入口从不改变。

use chrono::{NaiveDateTime, TimeDelta};
use tracing::debug;

use super::timeseries::TimeSeries;
use super::ForcingError;

/// 河流数据类型
#[derive(Debug, Clone, PartialEq)]
pub enum RiverData {
    /// 恒定流量 [m³/s]
    Constant(f64),
    /// 流量过程线（严格查询）
    TimeSeries(TimeSeries),
}

/// 河流流量数据提供者
#[derive(Debug, Clone, PartialEq)]
pub struct RiverProvider {
    /// 数据类型
    data: RiverData,
}

impl RiverProvider {
    /// 创建恒定流量
    pub fn constant(discharge: f64) -> Self {
        Self {
            data: RiverData::Constant(discharge),
        }
    }

    /// 从流量站记录创建
    ///
    /// `steady` 为真时使用记录均值作为恒定流量。
    pub fn hydrograph(records: &[(NaiveDateTime, f64)], steady: bool) -> Result<Self, ForcingError> {
        let series = TimeSeries::from_records(records, TimeDelta::zero(), 0.0)?;
        let data = if steady {
            RiverData::Constant(series.mean())
        } else {
            RiverData::TimeSeries(series)
        };
        Ok(Self { data })
    }

    /// 数据类型
    pub fn data(&self) -> &RiverData {
        &self.data
    }

    /// 是否为恒定流量
    pub fn is_constant(&self) -> bool {
        matches!(self.data, RiverData::Constant(_))
    }

    /// 获取指定时间的流量，超出记录范围时返回 `None`
    pub fn discharge_at(&self, t: f64) -> Option<f64> {
        match &self.data {
            RiverData::Constant(q) => Some(*q),
            RiverData::TimeSeries(series) => series.try_value(t),
        }
    }
}

/// 单条河流入口
#[derive(Debug, Clone)]
pub struct RiverEntry {
    /// 入口名称
    pub name: String,
    /// 数据提供者
    pub provider: RiverProvider,
    /// 当前流量 [m³/s]，负值为出流
    discharge: f64,
}

impl RiverEntry {
    /// 当前流量
    pub fn discharge(&self) -> f64 {
        self.discharge
    }
}

/// 河流入口系统
#[derive(Debug, Clone, Default)]
pub struct RiverSystem {
    /// 入口列表
    rivers: Vec<RiverEntry>,
}

impl RiverSystem {
    /// 创建空系统
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加入口，初始流量取 t = 0 时的值
    pub fn add_river(&mut self, name: &str, provider: RiverProvider) -> Result<(), ForcingError> {
        let discharge = provider.discharge_at(0.0).ok_or_else(|| {
            let (start, end) = match provider.data() {
                RiverData::TimeSeries(series) => series.time_range(),
                RiverData::Constant(_) => (0.0, 0.0),
            };
            ForcingError::OutOfRange {
                name: name.to_string(),
                t: 0.0,
                start,
                end,
            }
        })?;
        self.rivers.push(RiverEntry {
            name: name.to_string(),
            provider,
            discharge,
        });
        Ok(())
    }

    /// 添加恒定流量入口
    pub fn add_constant(&mut self, name: &str, discharge: f64) {
        self.rivers.push(RiverEntry {
            name: name.to_string(),
            provider: RiverProvider::constant(discharge),
            discharge,
        });
    }

    /// 更新所有入口的流量
    ///
    /// 返回实际更新的非恒定入口数。
    pub fn update(&mut self, t: f64) -> usize {
        let mut updated = 0;
        for river in self.rivers.iter_mut().filter(|r| !r.provider.is_constant()) {
            match river.provider.discharge_at(t) {
                Some(q) => {
                    river.discharge = q;
                    updated += 1;
                    debug!("Updated {} discharge: {:.2} m³/s at t={}", river.name, q, t);
                }
                None => debug!("{}: 无 t={} 的流量记录，保持 {:.2} m³/s", river.name, t, river.discharge),
            }
        }
        updated
    }

    /// 按名称获取当前流量
    pub fn discharge(&self, name: &str) -> Option<f64> {
        self.rivers
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.discharge)
    }

    /// 所有入口的净流量
    pub fn total_discharge(&self) -> f64 {
        self.rivers.iter().map(|r| r.discharge).sum()
    }

    /// 入口数量
    pub fn count(&self) -> usize {
        self.rivers.len()
    }

    /// 所有入口
    pub fn rivers(&self) -> &[RiverEntry] {
        &self.rivers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 21)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn records() -> Vec<(NaiveDateTime, f64)> {
        vec![(at(0), 1000.0), (at(1), 1200.0), (at(2), 1100.0)]
    }

    #[test]
    fn test_steady_hydrograph_is_mean() {
        let river = RiverProvider::hydrograph(&records(), true).unwrap();
        assert!(river.is_constant());
        assert!((river.discharge_at(1e9).unwrap() - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsteady_hydrograph_is_strict() {
        let river = RiverProvider::hydrograph(&records(), false).unwrap();
        assert!((river.discharge_at(1800.0).unwrap() - 1100.0).abs() < 1e-9);
        assert_eq!(river.discharge_at(7200.0), Some(1100.0));
        assert_eq!(river.discharge_at(7201.0), None);
    }

    #[test]
    fn test_system_keeps_previous_value() {
        let mut system = RiverSystem::new();
        system
            .add_river("calumet", RiverProvider::hydrograph(&records(), false).unwrap())
            .unwrap();
        system.add_constant("avoca", -511.84);
        assert_eq!(system.count(), 2);
        assert_eq!(system.discharge("calumet"), Some(1000.0));

        assert_eq!(system.update(3600.0), 1);
        assert_eq!(system.discharge("calumet"), Some(1200.0));

        // 超出记录范围：保持上一时刻
        assert_eq!(system.update(10_000.0), 0);
        assert_eq!(system.discharge("calumet"), Some(1200.0));
        assert_eq!(system.discharge("avoca"), Some(-511.84));
        assert!((system.total_discharge() - (1200.0 - 511.84)).abs() < 1e-9);
        assert!(system.discharge("franklin").is_none());
    }

    #[test]
    fn test_empty_records_and_constant_entry() {
        assert!(RiverProvider::hydrograph(&[], false).is_err());
        let mut system = RiverSystem::new();
        assert!(system.add_river("const", RiverProvider::constant(5.0)).is_ok());
        assert_eq!(system.rivers()[0].discharge(), 5.0);
    }
}
