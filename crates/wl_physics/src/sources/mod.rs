// crates/wl_physics/src/sources/mod.rs

//! 源项模块
//!
//! 当前提供植被阻力（Baptist 算子及其涡扩散闭合）。
//! 所有源项以 [`ForcingOperator`](crate::host::ForcingOperator) 的形式挂接到宿主。

pub mod vegetation;

pub use vegetation::{BaptistOperator, BaptistParams, CellParam, DragCoefficient, VegetationError};
