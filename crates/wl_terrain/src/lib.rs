// crates/wl_terrain/src/lib.rs

//! 地形数据管理
//!
//! 提供栅格数据的存储和网格采样功能。
//!
//! # 模块
//!
//! - `raster`: 栅格数据、地理变换与单元中心采样

pub mod raster;

// 重导出常用类型
pub use raster::{GeoTransform, RasterData};
