// crates/wl_physics/src/lib.rs

//! 物理模块
//!
//! 挂接到外部浅水求解器的物理过程，包括：
//! - 命名字段存储 (fields)
//! - 宿主接口与算子接口 (host)
//! - 算子注册与调度 (operators)
//! - 内存宿主域 (domain)
//! - 源项 (sources) - Baptist 植被阻力、植被涡扩散
//! - 糙率分配与有效 Chezy 系数 (roughness)
//! - 边界强迫 (forcing) - 潮位、河流流量、风场
//! - 初始条件 (initial) - 冷启动、热启动、快照
//!
//! # Trait 抽象
//!
//! - [`SimulationHost`]: 宿主状态与命名字段访问接口
//! - [`ForcingOperator`]: 每时间步调用的算子接口

pub mod domain;
pub mod fields;
pub mod forcing;
pub mod host;
pub mod initial;
pub mod operators;
pub mod roughness;
pub mod sources;

// 重导出常用类型
pub use domain::Domain;
pub use fields::{FieldError, FieldLocation, FieldMeta, FieldStore};
pub use host::{ForcingOperator, SimulationHost};
pub use operators::OperatorRegistry;

// 重导出源项类型
pub use sources::vegetation::{
    BaptistOperator, BaptistParams, CellParam, DragCoefficient, VegetationError,
};

// 重导出糙率类型
pub use roughness::{
    assign_friction, assign_from_raster, ChezyConversion, FrictionAssignment, RoughnessError,
};

// 重导出边界强迫类型
pub use forcing::{
    ForcingError, RiverProvider, RiverSystem, TideCosine, TideProvider, TimeSeries,
    WindProvider, WindSample,
};

// 重导出初始条件类型
pub use initial::{
    apply_cold_start, apply_hot_start, InitialConditionError, InitialSnapshot,
};
