// crates/wl_physics/src/fields.rs

//! 命名字段存储
//!
//! 宿主模拟以字符串名称管理单元中心数组（如 `veg_diameter`、
//! `diffusivity`），算子之间和输出模块通过名称相互引用这些数组。
//!
//! # 设计原则
//!
//! 1. **元数据驱动**：字段携带单位、描述等语义信息
//! 2. **名称验证**：强制 snake_case 命名规范，防止拼写错误
//! 3. **核心字段保留**：`stage`、`elevation`、`xmomentum`、`ymomentum`
//!    由宿主状态直接持有，不允许经由本存储覆盖
//! 4. **长度一致**：所有数组长度等于单元数
//!
//! # 示例
//!
//! ```rust
//! use wl_physics::fields::{FieldStore, FieldMeta, FieldLocation};
//!
//! let mut store = FieldStore::new(3);
//! store.set("veg_height", vec![0.5, 1.0, 0.0], FieldLocation::Cell).unwrap();
//! assert_eq!(store.get("veg_height"), Some(&[0.5, 1.0, 0.0][..]));
//!
//! store.register(FieldMeta::cell_scalar("diffusivity", "m²/s")).unwrap();
//! assert_eq!(store.get("diffusivity"), Some(&[0.0, 0.0, 0.0][..]));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 字段存储位置
///
/// 标识数据存储在网格的哪个拓扑元素上。当前仅支持单元中心。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldLocation {
    /// 单元中心（有限体积法主变量）
    #[default]
    Cell,
    /// 网格节点
    Vertex,
}

/// 字段错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// 无效字段名（非 snake_case 或包含非法字符）
    #[error("Invalid field name '{0}': must be snake_case (a-z, 0-9, _)")]
    InvalidName(String),

    /// 试图覆盖保留字段
    #[error("Cannot override reserved field '{0}'")]
    ReservedField(String),

    /// 数组长度与单元数不一致
    #[error("Field '{name}' has {actual} values, expected {expected}")]
    LengthMismatch {
        /// 字段名
        name: String,
        /// 期望长度（单元数）
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 不支持的存储位置
    #[error("Field '{name}' cannot be stored at {location:?}")]
    UnsupportedLocation {
        /// 字段名
        name: String,
        /// 请求的位置
        location: FieldLocation,
    },
}

/// 保留字段集合
///
/// 浅水方程核心状态，由宿主直接持有。
pub const RESERVED_FIELDS: &[&str] = &["stage", "elevation", "xmomentum", "ymomentum"];

/// 验证字段名是否符合 snake_case 规范
///
/// # 规则
/// - 仅允许小写字母 a-z、数字 0-9 和下划线 `_`
/// - 不能以下划线开头或结尾
/// - 不能包含连续下划线
fn is_valid_field_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('_') || name.ends_with('_') {
        return false;
    }
    if name.contains("__") {
        return false;
    }
    name.chars()
        .all(|ch| matches!(ch, 'a'..='z' | '0'..='9' | '_'))
}

/// 检查是否为保留字段
#[inline]
pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// 字段元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// 字段名称（唯一标识符）
    pub name: String,
    /// 存储位置
    #[serde(default)]
    pub location: FieldLocation,
    /// 物理单位（如：m/s, #/m²）
    pub unit: String,
    /// 描述文本
    #[serde(default)]
    pub description: String,
}

impl FieldMeta {
    /// 创建单元标量场元数据
    #[inline]
    pub fn cell_scalar(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: FieldLocation::Cell,
            unit: unit.into(),
            description: String::new(),
        }
    }

    /// 添加描述文本
    #[inline]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// 命名字段存储
///
/// 保存字段元数据和对应的单元数组，迭代顺序与注册顺序一致。
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    /// 单元数
    n_cells: usize,
    /// 字段元数据（名称 -> 元数据）
    metas: HashMap<String, FieldMeta>,
    /// 字段数据（名称 -> 单元数组）
    data: HashMap<String, Vec<f64>>,
    /// 注册顺序
    order: Vec<String>,
}

impl FieldStore {
    /// 创建空存储
    pub fn new(n_cells: usize) -> Self {
        Self {
            n_cells,
            ..Self::default()
        }
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    fn check_name(&self, name: &str) -> Result<(), FieldError> {
        if !is_valid_field_name(name) {
            return Err(FieldError::InvalidName(name.to_string()));
        }
        if is_reserved_field(name) {
            return Err(FieldError::ReservedField(name.to_string()));
        }
        Ok(())
    }

    fn check_location(name: &str, location: FieldLocation) -> Result<(), FieldError> {
        if location != FieldLocation::Cell {
            return Err(FieldError::UnsupportedLocation {
                name: name.to_string(),
                location,
            });
        }
        Ok(())
    }

    /// 注册字段
    ///
    /// 新字段初始化为全零数组；已存在的字段只更新元数据，保留数据和顺序。
    pub fn register(&mut self, meta: FieldMeta) -> Result<(), FieldError> {
        self.check_name(&meta.name)?;
        Self::check_location(&meta.name, meta.location)?;

        let name = meta.name.clone();
        if !self.data.contains_key(&name) {
            self.order.push(name.clone());
            self.data.insert(name.clone(), vec![0.0; self.n_cells]);
        }
        self.metas.insert(name, meta);
        Ok(())
    }

    /// 仅在字段不存在时注册
    ///
    /// 返回是否新建了字段。
    pub fn ensure(&mut self, meta: FieldMeta) -> Result<bool, FieldError> {
        if self.contains(&meta.name) {
            return Ok(false);
        }
        self.register(meta)?;
        Ok(true)
    }

    /// 设置字段数据
    ///
    /// 字段不存在时自动注册（单位为空）。
    pub fn set(
        &mut self,
        name: &str,
        values: Vec<f64>,
        location: FieldLocation,
    ) -> Result<(), FieldError> {
        self.check_name(name)?;
        Self::check_location(name, location)?;
        if values.len() != self.n_cells {
            return Err(FieldError::LengthMismatch {
                name: name.to_string(),
                expected: self.n_cells,
                actual: values.len(),
            });
        }

        if !self.metas.contains_key(name) {
            self.order.push(name.to_string());
            self.metas
                .insert(name.to_string(), FieldMeta::cell_scalar(name, ""));
        }
        self.data.insert(name.to_string(), values);
        Ok(())
    }

    /// 获取字段数据
    #[inline]
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.data.get(name).map(Vec::as_slice)
    }

    /// 获取可变字段数据
    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut [f64]> {
        self.data.get_mut(name).map(Vec::as_mut_slice)
    }

    /// 获取字段元数据
    #[inline]
    pub fn meta(&self, name: &str) -> Option<&FieldMeta> {
        self.metas.get(name)
    }

    /// 检查字段是否存在
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// 获取所有字段名（按注册顺序）
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// 获取字段数量
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 检查存储是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 验证必需字段是否存在
    ///
    /// 返回缺失的字段名列表。
    pub fn validate_required<'a>(&self, required: &[&'a str]) -> Result<(), Vec<&'a str>> {
        let missing: Vec<_> = required
            .iter()
            .filter(|&&name| !self.contains(name))
            .copied()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}
