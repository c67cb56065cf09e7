// crates/wl_physics/src/sources/vegetation/mod.rs

//! 植被阻力
//!
//! - [`baptist`]: Baptist (2007) 阻力算子，逐时间步更新动量
//! - [`params`]: 算子参数（统一值/逐单元数组/从宿主字段读取）
//! - [`drag`]: 阻力系数（常数或 Nepf 1999 曲线）
//! - [`diffusivity`]: Nepf (1999) 植被涡扩散闭合

pub mod baptist;
pub mod diffusivity;
pub mod drag;
pub mod params;

pub use baptist::{
    drag_step, friction_slope, vegetated_chezy, BaptistOperator, VegetationError, BAPTIST_A3,
    DIFFUSIVITY_FIELD, FRICTION_SLOPE_EPSILON, VEGETATED_DEPTH_THRESHOLD, VEG_DENSITY_FIELD,
    VEG_DIAMETER_FIELD, VEG_HEIGHT_FIELD,
};
pub use drag::{nepf_1999_cd, solid_fraction, DragCoefficient, DEFAULT_DRAG_COEFFICIENT};
pub use params::{BaptistParams, CellParam, DEFAULT_BED_CHEZY};
