// crates/wl_config/src/model_config.rs

//! ModelConfig - 模型运行配置
//!
//! 汇总一次三角洲模拟所需的全部设置：输出时间控制、物理常数、
//! 植被阻力参数、糙率分类表、边界条件开关和初始条件来源。
//! 所有字段都有默认值，JSON 中缺省的字段使用默认值填充。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::friction_classes::{default_friction_classes, FrictionClass};

/// 模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 模型名称
    #[serde(default = "default_name")]
    pub name: String,

    /// 时间控制
    #[serde(default)]
    pub timing: TimingConfig,

    /// 物理参数
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// 植被阻力参数
    #[serde(default)]
    pub vegetation: VegetationSettings,

    /// 糙率分类表（类别编号从 1 开始）
    #[serde(default = "default_friction_classes")]
    pub friction_classes: Vec<FrictionClass>,

    /// 边界条件设置
    #[serde(default)]
    pub boundaries: BoundaryConfig,

    /// 初始条件设置
    #[serde(default)]
    pub initial: InitialConfig,
}

fn default_name() -> String { "WLAD2_2103_7day".to_string() }

/// 时间控制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// 输出间隔 [s]
    #[serde(default = "default_yieldstep")]
    pub yieldstep: f64,

    /// 结束时间 [s]
    #[serde(default = "default_final_time")]
    pub final_time: f64,
}

fn default_yieldstep() -> f64 { 900.0 }
fn default_final_time() -> f64 { 7.0 * 24.0 * 3600.0 + default_yieldstep() }

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            yieldstep: default_yieldstep(),
            final_time: default_final_time(),
        }
    }
}

/// 物理参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 重力加速度 [m/s²]
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// 存储的最小水深 [m]
    #[serde(default = "default_minimum_allowed_height")]
    pub minimum_allowed_height: f64,
}

fn default_gravity() -> f64 { 9.81 }
fn default_minimum_allowed_height() -> f64 { 0.005 }

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            minimum_allowed_height: default_minimum_allowed_height(),
        }
    }
}

/// 阻力系数选择
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum DragCoefficientSetting {
    /// 常数阻力系数
    Constant {
        /// 阻力系数值
        #[serde(default = "default_drag_coefficient")]
        value: f64,
    },
    /// Nepf (1999) 图 6 拟合曲线
    Nepf1999 {
        /// 体积阻力折减系数
        alpha: f64,
    },
}

fn default_drag_coefficient() -> f64 { 1.68 }

impl Default for DragCoefficientSetting {
    fn default() -> Self {
        Self::Constant { value: default_drag_coefficient() }
    }
}

/// 植被阻力参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegetationSettings {
    /// 裸床 Chezy 系数 [m^(1/2)/s]
    #[serde(default = "default_bed_friction")]
    pub bed_friction: f64,

    /// 是否启用植被涡扩散
    #[serde(default)]
    pub use_diffusivity: bool,

    /// 阻力系数
    #[serde(default)]
    pub drag_coefficient: DragCoefficientSetting,
}

fn default_bed_friction() -> f64 { 65.0 }

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            bed_friction: default_bed_friction(),
            use_diffusivity: false,
            drag_coefficient: DragCoefficientSetting::default(),
        }
    }
}

/// 边界条件设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// 使用恒定流量（取实测均值）
    #[serde(default)]
    pub steady_discharge: bool,

    /// 使用恒定潮位
    #[serde(default)]
    pub steady_tide: bool,

    /// 恒定潮位 [m]
    #[serde(default = "default_steady_tide_level")]
    pub steady_tide_level: f64,

    /// 潮位站到达时间修正 [s]
    #[serde(default = "default_tide_time_offset")]
    pub tide_time_offset: f64,

    /// 潮位基准修正 [m]
    #[serde(default = "default_tide_vertical_offset")]
    pub tide_vertical_offset: f64,

    /// 是否启用风应力
    #[serde(default)]
    pub wind_on: bool,

    /// 无测站出口的恒定流量 [m³/s]，负值为出流
    #[serde(default = "default_constant_outlet_discharge")]
    pub constant_outlet_discharge: f64,
}

fn default_steady_tide_level() -> f64 { 0.26 }
fn default_tide_time_offset() -> f64 { 45.0 * 60.0 }
fn default_tide_vertical_offset() -> f64 { -0.3 }
fn default_constant_outlet_discharge() -> f64 { -511.84 }

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            steady_discharge: false,
            steady_tide: false,
            steady_tide_level: default_steady_tide_level(),
            tide_time_offset: default_tide_time_offset(),
            tide_vertical_offset: default_tide_vertical_offset(),
            wind_on: false,
            constant_outlet_discharge: default_constant_outlet_discharge(),
        }
    }
}

/// 初始条件设置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialConfig {
    /// 是否从上一次运行的快照热启动
    #[serde(default)]
    pub hot_start: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            timing: TimingConfig::default(),
            physics: PhysicsConfig::default(),
            vegetation: VegetationSettings::default(),
            friction_classes: default_friction_classes(),
            boundaries: BoundaryConfig::default(),
            initial: InitialConfig::default(),
        }
    }
}

impl ModelConfig {
    /// 从 JSON 文件加载配置并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串解析配置并验证
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timing.yieldstep > 0.0) {
            return Err(ConfigError::invalid(
                "timing.yieldstep",
                self.timing.yieldstep,
                "输出间隔必须为正",
            ));
        }

        if !(self.timing.final_time >= 0.0) {
            return Err(ConfigError::invalid(
                "timing.final_time",
                self.timing.final_time,
                "结束时间不能为负",
            ));
        }

        if !(self.physics.gravity > 0.0) {
            return Err(ConfigError::invalid(
                "physics.gravity",
                self.physics.gravity,
                "重力必须为正",
            ));
        }

        if !(self.physics.minimum_allowed_height >= 0.0) {
            return Err(ConfigError::invalid(
                "physics.minimum_allowed_height",
                self.physics.minimum_allowed_height,
                "最小水深不能为负",
            ));
        }

        if !(self.vegetation.bed_friction > 0.0) || !self.vegetation.bed_friction.is_finite() {
            return Err(ConfigError::invalid(
                "vegetation.bed_friction",
                self.vegetation.bed_friction,
                "Chezy 系数必须为有限正数",
            ));
        }

        match self.vegetation.drag_coefficient {
            DragCoefficientSetting::Constant { value } if !(value > 0.0) => {
                return Err(ConfigError::invalid(
                    "vegetation.drag_coefficient.value",
                    value,
                    "阻力系数必须为正",
                ));
            }
            DragCoefficientSetting::Nepf1999 { alpha } if !(alpha > 0.0) => {
                return Err(ConfigError::invalid(
                    "vegetation.drag_coefficient.alpha",
                    alpha,
                    "折减系数必须为正",
                ));
            }
            _ => {}
        }

        if self.friction_classes.is_empty() {
            return Err(ConfigError::Missing("friction_classes".to_string()));
        }
        for (i, class) in self.friction_classes.iter().enumerate() {
            class.validate(i)?;
        }

        for (key, value) in [
            ("boundaries.steady_tide_level", self.boundaries.steady_tide_level),
            ("boundaries.tide_time_offset", self.boundaries.tide_time_offset),
            ("boundaries.tide_vertical_offset", self.boundaries.tide_vertical_offset),
            ("boundaries.constant_outlet_discharge", self.boundaries.constant_outlet_discharge),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(key, value, "必须为有限数"));
            }
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 按类别编号查找糙率类别（编号从 1 开始）
    pub fn friction_class(&self, class_id: usize) -> Option<&FrictionClass> {
        class_id.checked_sub(1).and_then(|i| self.friction_classes.get(i))
    }
}
