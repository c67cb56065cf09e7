// crates/wl_physics/src/initial.rs

//! 初始条件
//!
//! - 冷启动：水位等于底高程，低于边界水位的单元抬升到边界水位
//! - 热启动：水位 = 底高程 + 上一次运行保存的水深，动量取自同一快照
//!
//! 快照以 JSON 保存，供后续热启动使用。

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use wl_foundation::error::{WlError, WlResult};

use crate::domain::Domain;
use crate::host::SimulationHost;

/// 初始条件错误
#[derive(Debug, thiserror::Error)]
pub enum InitialConditionError {
    /// 数据验证失败
    #[error(transparent)]
    Validation(#[from] WlError),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 快照解析错误
    #[error("快照解析错误: {0}")]
    Parse(String),
}

/// 热启动快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSnapshot {
    /// 快照时间 [s]
    pub time: f64,
    /// 单元水深 [m]
    pub depth: Vec<f64>,
    /// x 动量 [m²/s]
    pub xmomentum: Vec<f64>,
    /// y 动量 [m²/s]
    pub ymomentum: Vec<f64>,
}

impl InitialSnapshot {
    /// 从宿主当前状态提取快照
    pub fn extract(host: &dyn SimulationHost) -> Self {
        let depth = host
            .stage()
            .iter()
            .zip(host.elevation())
            .map(|(s, z)| s - z)
            .collect();
        let (xmom, ymom) = host.momentum();
        Self {
            time: host.time(),
            depth,
            xmomentum: xmom.to_vec(),
            ymomentum: ymom.to_vec(),
        }
    }

    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.depth.len()
    }

    /// 检查数组长度
    pub fn validate(&self, n_cells: usize) -> WlResult<()> {
        WlError::check_size("depth", n_cells, self.depth.len())?;
        WlError::check_size("xmomentum", n_cells, self.xmomentum.len())?;
        WlError::check_size("ymomentum", n_cells, self.ymomentum.len())?;
        Ok(())
    }

    /// 保存快照到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), InitialConditionError> {
        let content = serde_json::to_string(self)
            .map_err(|e| InitialConditionError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 从 JSON 文件加载快照
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InitialConditionError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| InitialConditionError::Parse(e.to_string()))
    }
}

/// 冷启动水位
pub fn cold_start_stage(elevation: &[f64], boundary_level: f64) -> Vec<f64> {
    elevation
        .iter()
        .map(|&z| if z <= boundary_level { boundary_level } else { z })
        .collect()
}

/// 热启动水位
pub fn hot_start_stage(elevation: &[f64], depth: &[f64]) -> WlResult<Vec<f64>> {
    WlError::check_size("depth", elevation.len(), depth.len())?;
    Ok(elevation.iter().zip(depth).map(|(z, h)| z + h).collect())
}

/// 对域应用冷启动，动量置零
pub fn apply_cold_start(domain: &mut Domain, boundary_level: f64) -> WlResult<()> {
    let stage = cold_start_stage(domain.elevation(), boundary_level);
    let n = stage.len();
    let wet = stage
        .iter()
        .zip(domain.elevation())
        .filter(|(s, z)| s > z)
        .count();
    domain.set_stage(stage)?;
    domain.set_momentum(vec![0.0; n], vec![0.0; n])?;
    info!("冷启动: 边界水位 {:.3} m, {}/{} 个单元有水", boundary_level, wet, n);
    Ok(())
}

/// 对域应用热启动快照
pub fn apply_hot_start(domain: &mut Domain, snapshot: &InitialSnapshot) -> WlResult<()> {
    snapshot.validate(domain.n_cells())?;
    let stage = hot_start_stage(domain.elevation(), &snapshot.depth)?;
    domain.set_stage(stage)?;
    domain.set_momentum(snapshot.xmomentum.clone(), snapshot.ymomentum.clone())?;
    info!("热启动: 快照时间 {} s, {} 个单元", snapshot.time, snapshot.n_cells());
    Ok(())
}
