// crates/wl_config/src/friction_classes.rs

//! 糙率分类表
//!
//! 糙率栅格中的每个类别编号对应一组 Manning 系数和 Baptist 植被参数。
//! 类别编号从 1 开始，编号 `k` 对应表中第 `k - 1` 行。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 单个糙率类别
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionClass {
    /// 类别名称
    pub name: String,
    /// Manning 系数 [s/m^(1/3)]，0 表示不使用 Manning 摩擦
    #[serde(default)]
    pub manning_n: f64,
    /// 茎密度 [#/m²]，0 表示无植被
    #[serde(default)]
    pub stem_density: f64,
    /// 植被高度 [m]
    #[serde(default)]
    pub stem_height: f64,
    /// 茎直径 [m]
    #[serde(default)]
    pub stem_diameter: f64,
}

impl FrictionClass {
    /// 裸床类别（仅 Manning 摩擦）
    pub fn bare(name: impl Into<String>, manning_n: f64) -> Self {
        Self {
            name: name.into(),
            manning_n,
            stem_density: 0.0,
            stem_height: 0.0,
            stem_diameter: 0.0,
        }
    }

    /// 植被类别（仅 Baptist 阻力）
    pub fn vegetated(name: impl Into<String>, density: f64, height: f64, diameter: f64) -> Self {
        Self {
            name: name.into(),
            manning_n: 0.0,
            stem_density: density,
            stem_height: height,
            stem_diameter: diameter,
        }
    }

    /// 是否有植被
    #[inline]
    pub fn is_vegetated(&self) -> bool {
        self.stem_density > 0.0
    }

    /// 验证类别参数
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let key = |field: &str| format!("friction_classes[{index}].{field}");
        for (field, value) in [
            ("manning_n", self.manning_n),
            ("stem_density", self.stem_density),
            ("stem_height", self.stem_height),
            ("stem_diameter", self.stem_diameter),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(key(field), value, "必须为有限非负数"));
            }
        }
        if self.is_vegetated() && (self.stem_height <= 0.0 || self.stem_diameter <= 0.0) {
            return Err(ConfigError::invalid(
                key("stem_height"),
                self.stem_height,
                "有植被的类别需要正的植被高度和茎直径",
            ));
        }
        Ok(())
    }
}

/// Wax Lake / Atchafalaya 三角洲默认六类糙率表
///
/// 顺序：外海、主河道、小河道、潮下带、潮间带、潮上带。
pub fn default_friction_classes() -> Vec<FrictionClass> {
    vec![
        FrictionClass::bare("ocean", 0.015),
        FrictionClass::bare("channels", 0.028),
        FrictionClass::bare("small_channels", 0.005),
        FrictionClass::vegetated("subtidal", 120.0, 0.5, 0.01),
        FrictionClass::vegetated("intertidal", 200.0, 1.0, 0.01),
        FrictionClass::vegetated("supratidal", 200.0, 10.0, 0.015),
    ]
}
