// crates/wl_physics/src/sources/vegetation/params.rs

//! Baptist 算子参数
//!
//! 每个植被参数可以是全域统一值、逐单元数组或缺省。缺省时从宿主的命名
//! 字段中查找。参数在初始化时一次性展开为单元数组。

use wl_config::{FrictionClass, VegetationSettings};
use wl_foundation::error::{WlError, WlResult};

use super::drag::DragCoefficient;

/// 默认裸床 Chezy 系数 [m^(1/2)/s]
pub const DEFAULT_BED_CHEZY: f64 = 65.0;

/// 单元参数
#[derive(Debug, Clone, PartialEq)]
pub enum CellParam {
    /// 全域统一值
    Uniform(f64),
    /// 逐单元数组
    PerCell(Vec<f64>),
}

impl CellParam {
    /// 展开为长度 `n_cells` 的数组
    pub fn into_cells(self, name: &'static str, n_cells: usize) -> WlResult<Vec<f64>> {
        match self {
            Self::Uniform(value) => Ok(vec![value; n_cells]),
            Self::PerCell(values) => {
                WlError::check_size(name, n_cells, values.len())?;
                Ok(values)
            }
        }
    }
}

impl From<f64> for CellParam {
    fn from(value: f64) -> Self {
        Self::Uniform(value)
    }
}

impl From<Vec<f64>> for CellParam {
    fn from(values: Vec<f64>) -> Self {
        Self::PerCell(values)
    }
}

impl From<&[f64]> for CellParam {
    fn from(values: &[f64]) -> Self {
        Self::PerCell(values.to_vec())
    }
}

/// Baptist 算子参数
#[derive(Debug, Clone, PartialEq)]
pub struct BaptistParams {
    /// 茎直径 [m]
    pub veg_diameter: Option<CellParam>,
    /// 茎密度 [#/m²]
    pub veg_density: Option<CellParam>,
    /// 植被高度 [m]
    pub veg_height: Option<CellParam>,
    /// 裸床 Chezy 系数 [m^(1/2)/s]
    pub bed_friction: CellParam,
    /// 阻力系数
    pub drag: DragCoefficient,
    /// 是否计算植被涡扩散
    pub use_diffusivity: bool,
    /// 算子标签
    pub label: Option<String>,
}

impl Default for BaptistParams {
    fn default() -> Self {
        Self {
            veg_diameter: None,
            veg_density: None,
            veg_height: None,
            bed_friction: CellParam::Uniform(DEFAULT_BED_CHEZY),
            drag: DragCoefficient::default(),
            use_diffusivity: false,
            label: None,
        }
    }
}

impl BaptistParams {
    /// 创建参数（植被参数全部缺省）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从模型配置的植被设置创建
    pub fn from_settings(settings: &VegetationSettings) -> Self {
        Self {
            bed_friction: CellParam::Uniform(settings.bed_friction),
            drag: settings.drag_coefficient.into(),
            use_diffusivity: settings.use_diffusivity,
            ..Self::default()
        }
    }

    /// 用单个糙率类别的植被参数作为全域统一值
    pub fn from_class(class: &FrictionClass) -> Self {
        Self::new()
            .with_diameter(class.stem_diameter)
            .with_density(class.stem_density)
            .with_height(class.stem_height)
            .with_label(class.name.clone())
    }

    /// 设置茎直径
    pub fn with_diameter(mut self, value: impl Into<CellParam>) -> Self {
        self.veg_diameter = Some(value.into());
        self
    }

    /// 设置茎密度
    pub fn with_density(mut self, value: impl Into<CellParam>) -> Self {
        self.veg_density = Some(value.into());
        self
    }

    /// 设置植被高度
    pub fn with_height(mut self, value: impl Into<CellParam>) -> Self {
        self.veg_height = Some(value.into());
        self
    }

    /// 设置裸床 Chezy 系数
    pub fn with_bed_friction(mut self, value: impl Into<CellParam>) -> Self {
        self.bed_friction = value.into();
        self
    }

    /// 设置阻力系数
    pub fn with_drag(mut self, drag: DragCoefficient) -> Self {
        self.drag = drag;
        self
    }

    /// 启用/关闭涡扩散
    pub fn with_diffusivity(mut self, enabled: bool) -> Self {
        self.use_diffusivity = enabled;
        self
    }

    /// 设置算子标签
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_expands() {
        let cells = CellParam::Uniform(0.5).into_cells("veg_height", 3).unwrap();
        assert_eq!(cells, vec![0.5; 3]);
    }

    #[test]
    fn test_per_cell_length_checked() {
        let param: CellParam = vec![1.0, 2.0].into();
        assert!(param.clone().into_cells("veg_density", 3).is_err());
        assert_eq!(param.into_cells("veg_density", 2).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_defaults() {
        let params = BaptistParams::new();
        assert!(params.veg_diameter.is_none());
        assert_eq!(params.bed_friction, CellParam::Uniform(65.0));
        assert_eq!(params.drag, DragCoefficient::Constant(1.68));
        assert!(!params.use_diffusivity);
    }

    #[test]
    fn test_from_class_and_settings() {
        let class = FrictionClass::vegetated("intertidal", 200.0, 1.0, 0.01);
        let params = BaptistParams::from_class(&class);
        assert_eq!(params.veg_density, Some(CellParam::Uniform(200.0)));
        assert_eq!(params.label.as_deref(), Some("intertidal"));

        let mut settings = VegetationSettings::default();
        settings.bed_friction = 50.0;
        settings.use_diffusivity = true;
        let params = BaptistParams::from_settings(&settings);
        assert_eq!(params.bed_friction, CellParam::Uniform(50.0));
        assert!(params.use_diffusivity);
    }
}
