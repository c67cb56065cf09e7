// crates/wl_physics/src/host.rs

//! 宿主模拟接口
//!
//! 浅水求解器本身不在本库内，算子通过 [`SimulationHost`] 访问宿主持有的
//! 单元状态和命名字段，通过 [`ForcingOperator`] 挂接到宿主的时间推进循环。
//!
//! 核心字段（水位、底高程、动量）以切片直接暴露，每步更新无需按名称查找，
//! 因此不会因字段缺失而失败。

use crate::fields::{FieldError, FieldLocation, FieldStore};

/// 宿主模拟接口
pub trait SimulationHost {
    /// 单元数
    fn n_cells(&self) -> usize;

    /// 重力加速度 [m/s²]
    fn gravity(&self) -> f64;

    /// 当前模拟时间 [s]
    fn time(&self) -> f64;

    /// 当前时间步长 [s]
    fn timestep(&self) -> f64;

    /// 单元水位 [m]
    fn stage(&self) -> &[f64];

    /// 单元底高程 [m]
    fn elevation(&self) -> &[f64];

    /// 单元动量 (hu, hv) [m²/s]
    fn momentum(&self) -> (&[f64], &[f64]);

    /// 可变单元动量 (hu, hv)
    fn momentum_mut(&mut self) -> (&mut [f64], &mut [f64]);

    /// 命名字段存储
    fn fields(&self) -> &FieldStore;

    /// 可变命名字段存储
    fn fields_mut(&mut self) -> &mut FieldStore;

    /// 通知宿主是否启用涡粘性项
    fn enable_viscosity(&mut self, _enabled: bool) {}

    /// 按名称读取字段，核心字段优先
    fn get_field(&self, name: &str) -> Option<&[f64]> {
        match name {
            "stage" => Some(self.stage()),
            "elevation" => Some(self.elevation()),
            "xmomentum" => Some(self.momentum().0),
            "ymomentum" => Some(self.momentum().1),
            _ => self.fields().get(name),
        }
    }

    /// 写入命名字段（不存在时注册）
    fn set_field(
        &mut self,
        name: &str,
        values: Vec<f64>,
        location: FieldLocation,
    ) -> Result<(), FieldError> {
        self.fields_mut().set(name, values, location)
    }
}

/// 挂接到时间推进循环的算子
///
/// 宿主每个内部时间步调用一次 [`apply`](ForcingOperator::apply)，
/// 调用顺序由 [`OperatorRegistry`](crate::operators::OperatorRegistry) 的注册顺序决定。
pub trait ForcingOperator: Send {
    /// 算子标签（在注册表中唯一）
    fn name(&self) -> &str;

    /// 执行一步更新
    fn apply(&mut self, host: &mut dyn SimulationHost);

    /// 是否逐单元独立，可在分区上并行执行
    fn parallel_safe(&self) -> bool {
        true
    }

    /// 时间步统计信息
    fn timestepping_statistics(&self, host: &dyn SimulationHost) -> String;
}
