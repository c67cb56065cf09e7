// crates/wl_physics/src/sources/vegetation/drag.rs

//! 植被阻力系数
//!
//! 默认使用常数 `Cd = 1.68`。Nepf (1999) 图 6 的拟合曲线作为备选，
//! 只有显式选择时才启用：
//!
//! ```text
//! Cd(ad) = 56.11 ad² - 15.28 ad + 1.3 - 0.0005465 / ad    (ad >= 0.006)
//! Cd(ad) = 1.2                                             (ad <  0.006)
//! ```
//!
//! 其中 `ad = m D²` 为无量纲茎体积分数。

use serde::{Deserialize, Serialize};
use wl_config::DragCoefficientSetting;

/// 默认阻力系数
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 1.68;

/// 低于此体积分数时拟合曲线失效，取常数
const NEPF_AD_CUTOFF: f64 = 0.006;

/// 稀疏植被的阻力系数
const NEPF_SPARSE_CD: f64 = 1.2;

/// 阻力系数选择
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DragCoefficient {
    /// 常数阻力系数
    Constant(f64),
    /// Nepf (1999) 拟合曲线，阻力系数按单元的 `ad` 计算
    Nepf1999 {
        /// 体积阻力折减系数
        alpha: f64,
    },
}

impl Default for DragCoefficient {
    fn default() -> Self {
        Self::Constant(DEFAULT_DRAG_COEFFICIENT)
    }
}

impl From<DragCoefficientSetting> for DragCoefficient {
    fn from(setting: DragCoefficientSetting) -> Self {
        match setting {
            DragCoefficientSetting::Constant { value } => Self::Constant(value),
            DragCoefficientSetting::Nepf1999 { alpha } => Self::Nepf1999 { alpha },
        }
    }
}

impl DragCoefficient {
    /// 单元阻力系数
    #[inline]
    pub fn cell_value(&self, diameter: f64, density: f64) -> f64 {
        match *self {
            Self::Constant(cd) => cd,
            Self::Nepf1999 { .. } => nepf_1999_cd(solid_fraction(diameter, density)),
        }
    }

    /// 体积阻力系数 `0.5 Cd alpha`（常数系数时 alpha 取 1）
    #[inline]
    pub fn bulk_drag(&self, diameter: f64, density: f64) -> f64 {
        let alpha = match *self {
            Self::Constant(_) => 1.0,
            Self::Nepf1999 { alpha } => alpha,
        };
        0.5 * self.cell_value(diameter, density) * alpha
    }

    /// 方法名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::Nepf1999 { .. } => "nepf1999",
        }
    }
}

/// 茎体积分数 `ad = m D²`
#[inline]
pub fn solid_fraction(diameter: f64, density: f64) -> f64 {
    density * diameter * diameter
}

/// Nepf (1999) 阻力系数拟合曲线
#[inline]
pub fn nepf_1999_cd(ad: f64) -> f64 {
    if ad < NEPF_AD_CUTOFF {
        return NEPF_SPARSE_CD;
    }
    56.11 * ad * ad - 15.28 * ad + 1.3 - 0.0005465 / ad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_constant() {
        let cd = DragCoefficient::default();
        assert_eq!(cd, DragCoefficient::Constant(1.68));
        assert_eq!(cd.cell_value(0.01, 120.0), 1.68);
        assert_eq!(cd.cell_value(0.0, 0.0), 1.68);
    }

    #[test]
    fn test_nepf_sparse_cutoff() {
        assert_eq!(nepf_1999_cd(0.0), 1.2);
        assert_eq!(nepf_1999_cd(0.0059), 1.2);
    }

    #[test]
    fn test_nepf_curve() {
        let ad = 0.012;
        let expected = 56.11 * 0.012 * 0.012 - 15.28 * 0.012 + 1.3 - 0.0005465 / 0.012;
        assert!((nepf_1999_cd(ad) - expected).abs() < 1e-14);
        // 曲线在常用范围内单调减小
        assert!(nepf_1999_cd(0.02) < nepf_1999_cd(0.01));
    }

    #[test]
    fn test_nepf_per_cell() {
        let cd = DragCoefficient::Nepf1999 { alpha: 0.8 };
        // ad = 120 * 0.01² = 0.012
        let value = cd.cell_value(0.01, 120.0);
        assert!((value - nepf_1999_cd(0.012)).abs() < 1e-14);
        assert!((cd.bulk_drag(0.01, 120.0) - 0.5 * value * 0.8).abs() < 1e-14);
    }

    #[test]
    fn test_from_setting() {
        let cd: DragCoefficient = DragCoefficientSetting::Nepf1999 { alpha: 0.9 }.into();
        assert_eq!(cd, DragCoefficient::Nepf1999 { alpha: 0.9 });
        assert_eq!(cd.name(), "nepf1999");
        let cd: DragCoefficient = DragCoefficientSetting::default().into();
        assert_eq!(cd, DragCoefficient::Constant(1.68));
    }
}
