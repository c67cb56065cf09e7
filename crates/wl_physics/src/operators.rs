// crates/wl_physics/src/operators.rs

//! 算子注册中心
//!
//! 按注册顺序依次执行算子，支持按名称查找和启用/禁用。

use std::collections::HashMap;

use tracing::trace;

use crate::host::{ForcingOperator, SimulationHost};

/// 算子注册中心
#[derive(Default)]
pub struct OperatorRegistry {
    /// 已注册的算子（执行顺序）
    operators: Vec<Box<dyn ForcingOperator>>,
    /// 名称到索引的映射
    name_index: HashMap<String, usize>,
    /// 启用状态
    enabled: Vec<bool>,
}

impl OperatorRegistry {
    /// 创建空注册中心
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册算子
    ///
    /// 同名算子已存在时替换原算子，保留其执行位置。
    pub fn register<O: ForcingOperator + 'static>(&mut self, operator: O) -> usize {
        let name = operator.name().to_string();
        if let Some(&idx) = self.name_index.get(&name) {
            self.operators[idx] = Box::new(operator);
            self.enabled[idx] = true;
            return idx;
        }
        let idx = self.operators.len();
        self.operators.push(Box::new(operator));
        self.name_index.insert(name, idx);
        self.enabled.push(true);
        idx
    }

    /// 按名称获取算子
    pub fn get(&self, name: &str) -> Option<&dyn ForcingOperator> {
        self.name_index
            .get(name)
            .and_then(|&idx| self.operators.get(idx))
            .map(|op| op.as_ref())
    }

    /// 按名称获取可变算子
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn ForcingOperator + 'static)> {
        let idx = *self.name_index.get(name)?;
        Some(self.operators.get_mut(idx)?.as_mut())
    }

    /// 启用/禁用算子
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        if let Some(&idx) = self.name_index.get(name) {
            if let Some(flag) = self.enabled.get_mut(idx) {
                *flag = enabled;
                return true;
            }
        }
        false
    }

    /// 算子是否启用
    pub fn is_enabled(&self, name: &str) -> bool {
        self.name_index
            .get(name)
            .and_then(|&idx| self.enabled.get(idx).copied())
            .unwrap_or(false)
    }

    /// 移除算子（其余算子保持原有顺序）
    pub fn unregister(&mut self, name: &str) -> bool {
        let Some(idx) = self.name_index.remove(name) else {
            return false;
        };
        self.operators.remove(idx);
        self.enabled.remove(idx);
        // 重建索引
        self.name_index.clear();
        for (i, op) in self.operators.iter().enumerate() {
            self.name_index.insert(op.name().to_string(), i);
        }
        true
    }

    /// 所有已注册算子名称（执行顺序）
    pub fn list_operators(&self) -> Vec<&str> {
        self.operators.iter().map(|op| op.name()).collect()
    }

    /// 已注册算子数量
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// 所有启用的算子是否都可并行执行
    pub fn all_parallel_safe(&self) -> bool {
        self.operators
            .iter()
            .zip(&self.enabled)
            .filter(|&(_, &on)| on)
            .all(|(op, _)| op.parallel_safe())
    }

    /// 按注册顺序执行所有启用的算子
    pub fn apply_all(&mut self, host: &mut dyn SimulationHost) {
        for (op, &on) in self.operators.iter_mut().zip(&self.enabled) {
            if on {
                trace!(operator = op.name(), time = host.time(), "apply");
                op.apply(host);
            }
        }
    }

    /// 收集所有启用算子的时间步统计
    pub fn statistics(&self, host: &dyn SimulationHost) -> Vec<String> {
        self.operators
            .iter()
            .zip(&self.enabled)
            .filter(|&(_, &on)| on)
            .map(|(op, _)| op.timestepping_statistics(host))
            .collect()
    }
}

impl std::fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.list_operators())
            .field("enabled", &self.enabled)
            .finish()
    }
}
