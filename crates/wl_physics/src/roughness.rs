// crates/wl_physics/src/roughness.rs

//! 糙率分配与有效 Chezy 系数
//!
//! 糙率栅格的类别编号在单元中心采样后，按糙率分类表展开为逐单元的
//! Manning 系数和 Baptist 植被参数。编号 0 表示栅格外或无数据，
//! 对应全零类别（无 Manning 摩擦、无植被）。
//!
//! 后处理时由 Manning 系数和植被参数换算出统一的有效 Chezy 系数：
//!
//! ```text
//! C = h^(1/6) / n                n > 0
//! C = Cv(h)  (Baptist)           m > 0，覆盖 Manning 值
//! C = 65                         其余
//! ```

use glam::DVec2;
use rayon::prelude::*;
use tracing::debug;
use wl_config::FrictionClass;
use wl_foundation::error::{WlError, WlResult};
use wl_terrain::RasterData;

use crate::fields::{FieldError, FieldLocation};
use crate::host::SimulationHost;
use crate::sources::vegetation::{vegetated_chezy, BaptistParams, DEFAULT_BED_CHEZY, DEFAULT_DRAG_COEFFICIENT};

/// Manning 系数字段名
pub const MANNING_FIELD: &str = "friction";

/// 糙率分配错误
#[derive(Debug, thiserror::Error)]
pub enum RoughnessError {
    /// 类别编号不在分类表中
    #[error("Cell {cell}: friction class {class_id} not in table of {n_classes} classes")]
    UnknownClass {
        /// 单元编号
        cell: usize,
        /// 类别编号
        class_id: i32,
        /// 分类表长度
        n_classes: usize,
    },

    /// 输入验证失败
    #[error(transparent)]
    Validation(#[from] WlError),
}

/// 逐单元糙率参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrictionAssignment {
    /// Manning 系数
    pub manning_n: Vec<f64>,
    /// 茎密度 [#/m²]
    pub stem_density: Vec<f64>,
    /// 植被高度 [m]
    pub stem_height: Vec<f64>,
    /// 茎直径 [m]
    pub stem_diameter: Vec<f64>,
}

impl FrictionAssignment {
    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.manning_n.len()
    }

    /// 有植被的单元数
    pub fn n_vegetated(&self) -> usize {
        self.stem_density.iter().filter(|&&m| m > 0.0).count()
    }

    /// 逐单元 Baptist 参数
    pub fn baptist_params(&self) -> BaptistParams {
        BaptistParams::new()
            .with_diameter(self.stem_diameter.clone())
            .with_density(self.stem_density.clone())
            .with_height(self.stem_height.clone())
    }

    /// 把 Manning 系数写入宿主的 `friction` 字段
    pub fn apply_manning(&self, host: &mut dyn SimulationHost) -> Result<(), FieldError> {
        host.set_field(MANNING_FIELD, self.manning_n.clone(), FieldLocation::Cell)
    }
}

/// 按类别编号分配糙率参数（编号从 1 开始，0 为全零类别）
pub fn assign_friction(
    class_ids: &[i32],
    classes: &[FrictionClass],
) -> Result<FrictionAssignment, RoughnessError> {
    let n = class_ids.len();
    let mut out = FrictionAssignment {
        manning_n: vec![0.0; n],
        stem_density: vec![0.0; n],
        stem_height: vec![0.0; n],
        stem_diameter: vec![0.0; n],
    };

    for (cell, &class_id) in class_ids.iter().enumerate() {
        if class_id == 0 {
            continue;
        }
        let class = usize::try_from(class_id)
            .ok()
            .and_then(|id| classes.get(id - 1))
            .ok_or(RoughnessError::UnknownClass {
                cell,
                class_id,
                n_classes: classes.len(),
            })?;
        out.manning_n[cell] = class.manning_n;
        out.stem_density[cell] = class.stem_density;
        out.stem_height[cell] = class.stem_height;
        out.stem_diameter[cell] = class.stem_diameter;
    }

    debug!(
        "糙率分配: {} 个单元, {} 个有植被",
        n,
        out.n_vegetated()
    );
    Ok(out)
}

/// 在单元中心采样糙率栅格并分配糙率参数
pub fn assign_from_raster(
    raster: &RasterData,
    centroids: &[DVec2],
    classes: &[FrictionClass],
) -> Result<FrictionAssignment, RoughnessError> {
    let class_ids = raster.sample_class_ids(centroids);
    assign_friction(&class_ids, classes)
}

/// 有效 Chezy 换算参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChezyConversion {
    /// 裸床 Chezy 系数，也是无摩擦单元的回退值
    pub bed_chezy: f64,
    /// 阻力系数
    pub drag_coefficient: f64,
    /// 重力加速度
    pub gravity: f64,
}

impl Default for ChezyConversion {
    fn default() -> Self {
        Self {
            bed_chezy: DEFAULT_BED_CHEZY,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            gravity: 9.81,
        }
    }
}

impl ChezyConversion {
    /// 单个水深快照的有效 Chezy 系数
    pub fn effective_chezy(&self, depth: &[f64], friction: &FrictionAssignment) -> WlResult<Vec<f64>> {
        WlError::check_size("depth", friction.n_cells(), depth.len())?;
        let a1 = self.bed_chezy.powi(-2);

        Ok(depth
            .par_iter()
            .enumerate()
            .map(|(i, &h)| {
                let h = h.max(0.0);
                let (n, m) = (friction.manning_n[i], friction.stem_density[i]);
                let mut chezy = 0.0;
                if n > 0.0 {
                    chezy = h.powf(1.0 / 6.0) / n;
                }
                if m > 0.0 {
                    let a2 = friction.stem_diameter[i] * m / (2.0 * self.gravity);
                    chezy = vegetated_chezy(h, friction.stem_height[i], a1, a2, self.drag_coefficient);
                }
                if chezy == 0.0 {
                    self.bed_chezy
                } else {
                    chezy
                }
            })
            .collect())
    }

    /// 水深时间序列（每个输出时刻一个快照）的有效 Chezy 系数
    pub fn effective_chezy_series(
        &self,
        depths: &[Vec<f64>],
        friction: &FrictionAssignment,
    ) -> WlResult<Vec<Vec<f64>>> {
        depths
            .iter()
            .map(|snapshot| self.effective_chezy(snapshot, friction))
            .collect()
    }
}
