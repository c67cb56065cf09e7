// crates/wl_config/src/lib.rs

//! WLAD Config Layer
//!
//! 配置层，提供模型运行配置和糙率分类表。
//! 本层无泛型，所有数值使用 f64，便于 JSON 序列化。
//!
//! # 模块概览
//!
//! - [`model_config`]: ModelConfig 模型配置
//! - [`friction_classes`]: 糙率分类表
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! wl_cli      ─> uses ModelConfig
//! wl_physics  ─> reads VegetationSettings / FrictionClass
//! wl_config   ─> (本层)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod friction_classes;
pub mod model_config;

// 重导出核心类型
pub use error::ConfigError;
pub use friction_classes::{default_friction_classes, FrictionClass};
pub use model_config::{
    BoundaryConfig, DragCoefficientSetting, InitialConfig, ModelConfig, PhysicsConfig,
    TimingConfig, VegetationSettings,
};
