// crates/wl_physics/src/sources/vegetation/baptist.rs

//! Baptist 植被阻力算子
//!
//! 基于 Baptist et al. (2007)，适用于淹没和露出植被。植被 Chezy 系数：
//!
//! ```text
//! Cv = (Cb^-2 + Cd m D / (2g) min(h, hv))^-0.5 + (√g / κ) ln(max(h, hv) / hv)
//! ```
//!
//! 初始化时预先合并为三个系数：
//!
//! ```text
//! Cv = (a1 + a2 Cd min(h, hv))^-0.5 + a3 ln(max(h, hv) / hv)
//! a1 = Cb^-2,  a2 = D m / (2g),  a3 = 7.8289
//! ```
//!
//! 动量采用显式前向 Euler 更新：
//!
//! ```text
//! Sf  = g q_i |q| / (Cv² h² + ε)
//! q_i ← q_i - Sf Δt
//! ```
//!
//! 只更新有植被且水深超过 0.01 m 的单元，其余单元保持不变。

use rayon::prelude::*;
use tracing::{debug, info, warn};
use wl_foundation::error::WlError;

use super::diffusivity::cell_diffusivity;
use super::drag::DragCoefficient;
use super::params::{BaptistParams, CellParam};
use crate::fields::{FieldError, FieldLocation, FieldMeta};
use crate::host::{ForcingOperator, SimulationHost};

/// 第三合并系数 `√g / κ`
pub const BAPTIST_A3: f64 = 7.8289;

/// 参与阻力计算的最小水深 [m]
pub const VEGETATED_DEPTH_THRESHOLD: f64 = 0.01;

/// 摩擦坡度分母正则化项
pub const FRICTION_SLOPE_EPSILON: f64 = 1e-6;

/// 茎直径字段名
pub const VEG_DIAMETER_FIELD: &str = "veg_diameter";
/// 茎密度字段名
pub const VEG_DENSITY_FIELD: &str = "veg_density";
/// 植被高度字段名
pub const VEG_HEIGHT_FIELD: &str = "veg_height";
/// 涡扩散字段名
pub const DIFFUSIVITY_FIELD: &str = "diffusivity";

const DEFAULT_LABEL: &str = "baptist_operator";

/// 植被算子错误
#[derive(Debug, thiserror::Error)]
pub enum VegetationError {
    /// 参数未给出且宿主中不存在同名字段
    #[error("Vegetation parameter '{0}' not defined")]
    MissingParameter(&'static str),

    /// 参数验证失败
    #[error(transparent)]
    Validation(#[from] WlError),

    /// 有植被的单元植被高度为零
    #[error("Cell {cell} has stem density {density} but zero stem height")]
    ZeroStemHeight {
        /// 单元编号
        cell: usize,
        /// 茎密度
        density: f64,
    },

    /// 字段注册失败
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// 植被 Chezy 系数 [m^(1/2)/s]
#[inline]
pub fn vegetated_chezy(depth: f64, veg_height: f64, a1: f64, a2: f64, cd: f64) -> f64 {
    (a1 + a2 * cd * depth.min(veg_height)).powf(-0.5)
        + BAPTIST_A3 * (depth.max(veg_height) / veg_height).ln()
}

/// 单个动量分量的摩擦坡度
#[inline]
pub fn friction_slope(gravity: f64, momentum: f64, discharge: f64, chezy: f64, depth: f64) -> f64 {
    gravity * momentum * discharge / (chezy * chezy * depth * depth + FRICTION_SLOPE_EPSILON)
}

/// 单元显式阻力更新，返回更新后的 (hu, hv)
#[inline]
pub fn drag_step(
    (hu, hv): (f64, f64),
    depth: f64,
    veg_height: f64,
    a1: f64,
    a2: f64,
    cd: f64,
    gravity: f64,
    dt: f64,
) -> (f64, f64) {
    let q = (hu * hu + hv * hv).sqrt();
    let cv = vegetated_chezy(depth, veg_height, a1, a2, cd);
    let sf_x = friction_slope(gravity, hu, q, cv, depth);
    let sf_y = friction_slope(gravity, hv, q, cv, depth);
    (hu - sf_x * dt, hv - sf_y * dt)
}

/// Baptist 植被阻力算子
#[derive(Debug, Clone)]
pub struct BaptistOperator {
    label: String,
    gravity: f64,
    veg_diameter: Vec<f64>,
    veg_density: Vec<f64>,
    veg_height: Vec<f64>,
    bed_friction: Vec<f64>,
    /// 第一合并系数 `Cb^-2`
    a1: Vec<f64>,
    /// 第二合并系数 `D m / (2g)`
    a2: Vec<f64>,
    /// 单元阻力系数
    cd: Vec<f64>,
    drag: DragCoefficient,
    use_diffusivity: bool,
    // 每步工作数组
    depth: Vec<f64>,
    mask: Vec<bool>,
    diffusivity: Vec<f64>,
    n_vegetated: usize,
}

/// 解析单个植被参数：显式给出的展开为数组，缺省的从宿主字段读取
///
/// 返回数组和是否需要写回宿主。
fn resolve_param(
    host: &dyn SimulationHost,
    name: &'static str,
    param: Option<CellParam>,
) -> Result<(Vec<f64>, bool), VegetationError> {
    match param {
        Some(param) => Ok((param.into_cells(name, host.n_cells())?, true)),
        None => host
            .get_field(name)
            .map(|values| (values.to_vec(), false))
            .ok_or(VegetationError::MissingParameter(name)),
    }
}

fn validate_drag(drag: &DragCoefficient) -> Result<(), WlError> {
    match *drag {
        DragCoefficient::Constant(cd) => {
            WlError::check_range("drag_coefficient", cd, f64::MIN_POSITIVE, f64::MAX)
        }
        DragCoefficient::Nepf1999 { alpha } => {
            WlError::check_range("alpha", alpha, f64::MIN_POSITIVE, f64::MAX)
        }
    }
}

impl BaptistOperator {
    /// 创建算子并挂接到宿主
    ///
    /// 所有参数在写入宿主之前完成解析和验证，失败时宿主保持不变。
    pub fn attach(
        host: &mut dyn SimulationHost,
        params: BaptistParams,
    ) -> Result<Self, VegetationError> {
        let n = host.n_cells();
        let gravity = host.gravity();
        WlError::check_range("gravity", gravity, f64::MIN_POSITIVE, f64::MAX)?;

        let (veg_diameter, write_diameter) =
            resolve_param(&*host, VEG_DIAMETER_FIELD, params.veg_diameter)?;
        let (veg_density, write_density) =
            resolve_param(&*host, VEG_DENSITY_FIELD, params.veg_density)?;
        let (veg_height, write_height) =
            resolve_param(&*host, VEG_HEIGHT_FIELD, params.veg_height)?;
        let bed_friction = params.bed_friction.into_cells("bed_friction", n)?;

        WlError::check_non_negative("veg_diameter", &veg_diameter)?;
        WlError::check_non_negative("veg_density", &veg_density)?;
        WlError::check_non_negative("veg_height", &veg_height)?;
        for &c in &bed_friction {
            WlError::check_range("bed_friction", c, f64::MIN_POSITIVE, f64::MAX)?;
        }
        if let Some(cell) = (0..n).find(|&i| veg_density[i] > 0.0 && veg_height[i] == 0.0) {
            return Err(VegetationError::ZeroStemHeight {
                cell,
                density: veg_density[cell],
            });
        }
        validate_drag(&params.drag)?;

        // 验证完成，写入宿主
        for (name, values, write) in [
            (VEG_DIAMETER_FIELD, &veg_diameter, write_diameter),
            (VEG_DENSITY_FIELD, &veg_density, write_density),
            (VEG_HEIGHT_FIELD, &veg_height, write_height),
        ] {
            if write {
                host.set_field(name, values.clone(), FieldLocation::Cell)?;
            }
        }
        host.fields_mut().register(
            FieldMeta::cell_scalar(VEG_DIAMETER_FIELD, "m").with_desc("茎直径"),
        )?;
        host.fields_mut().register(
            FieldMeta::cell_scalar(VEG_DENSITY_FIELD, "#/m²").with_desc("茎密度"),
        )?;
        host.fields_mut().register(
            FieldMeta::cell_scalar(VEG_HEIGHT_FIELD, "m").with_desc("植被高度"),
        )?;
        if params.use_diffusivity {
            host.fields_mut().ensure(
                FieldMeta::cell_scalar(DIFFUSIVITY_FIELD, "m²/s").with_desc("植被涡扩散系数"),
            )?;
        }
        host.enable_viscosity(params.use_diffusivity);

        // 预计算合并系数
        let a1: Vec<f64> = bed_friction.iter().map(|c| c.powi(-2)).collect();
        let a2: Vec<f64> = veg_diameter
            .iter()
            .zip(&veg_density)
            .map(|(d, m)| d * m / (2.0 * gravity))
            .collect();
        let cd: Vec<f64> = veg_diameter
            .iter()
            .zip(&veg_density)
            .map(|(&d, &m)| params.drag.cell_value(d, m))
            .collect();

        let label = params.label.unwrap_or_else(|| DEFAULT_LABEL.to_string());
        let n_canopy = veg_density.iter().filter(|&&m| m > 0.0).count();
        info!(
            "{}: Baptist 算子初始化, {} 个单元, {} 个有植被, Cd={}, diffusivity={}",
            label,
            n,
            n_canopy,
            params.drag.name(),
            params.use_diffusivity
        );

        Ok(Self {
            label,
            gravity,
            veg_diameter,
            veg_density,
            veg_height,
            bed_friction,
            a1,
            a2,
            cd,
            drag: params.drag,
            use_diffusivity: params.use_diffusivity,
            depth: vec![0.0; n],
            mask: vec![false; n],
            diffusivity: vec![0.0; n],
            n_vegetated: 0,
        })
    }

    /// 算子标签
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 第一合并系数
    pub fn a1(&self) -> &[f64] {
        &self.a1
    }

    /// 第二合并系数
    pub fn a2(&self) -> &[f64] {
        &self.a2
    }

    /// 第三合并系数
    pub fn a3(&self) -> f64 {
        BAPTIST_A3
    }

    /// 单元阻力系数
    pub fn drag_coefficients(&self) -> &[f64] {
        &self.cd
    }

    /// 阻力系数选择
    pub fn drag(&self) -> DragCoefficient {
        self.drag
    }

    /// 裸床 Chezy 系数
    pub fn bed_friction(&self) -> &[f64] {
        &self.bed_friction
    }

    /// 茎直径
    pub fn veg_diameter(&self) -> &[f64] {
        &self.veg_diameter
    }

    /// 茎密度
    pub fn veg_density(&self) -> &[f64] {
        &self.veg_density
    }

    /// 植被高度
    pub fn veg_height(&self) -> &[f64] {
        &self.veg_height
    }

    /// 是否计算涡扩散
    pub fn use_diffusivity(&self) -> bool {
        self.use_diffusivity
    }

    /// 最近一步的植被掩码
    pub fn vegetated_mask(&self) -> &[bool] {
        &self.mask
    }

    /// 最近一步参与计算的单元数
    pub fn n_vegetated(&self) -> usize {
        self.n_vegetated
    }

    /// 按当前水深计算单元的植被 Chezy 系数
    ///
    /// 无植被的单元返回 `None`。
    pub fn cell_chezy(&self, cell: usize, depth: f64) -> Option<f64> {
        (self.veg_density[cell] > 0.0).then(|| {
            vegetated_chezy(depth, self.veg_height[cell], self.a1[cell], self.a2[cell], self.cd[cell])
        })
    }

    /// 更新水深和植被掩码，返回参与计算的单元数
    fn update_mask(&mut self, host: &dyn SimulationHost) -> usize {
        let stage = host.stage();
        let elevation = host.elevation();
        self.depth
            .par_iter_mut()
            .zip(stage.par_iter().zip(elevation.par_iter()))
            .for_each(|(h, (s, z))| *h = s - z);

        let depth = &self.depth;
        let density = &self.veg_density;
        self.mask
            .par_iter_mut()
            .enumerate()
            .map(|(i, flag)| {
                *flag = density[i] > 0.0 && depth[i] > VEGETATED_DEPTH_THRESHOLD;
                usize::from(*flag)
            })
            .sum()
    }

    /// 由更新前的动量计算涡扩散，无植被单元置零
    fn update_diffusivity(&mut self, host: &mut dyn SimulationHost) {
        let (xmom, ymom) = host.momentum();
        let (depth, mask) = (&self.depth, &self.mask);
        let (diameter, density, cd) = (&self.veg_diameter, &self.veg_density, &self.cd);
        self.diffusivity
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, nu)| {
                *nu = if mask[i] {
                    let q = (xmom[i] * xmom[i] + ymom[i] * ymom[i]).sqrt();
                    cell_diffusivity(depth[i], q, diameter[i], density[i], cd[i])
                } else {
                    0.0
                };
            });

        match host.fields_mut().get_mut(DIFFUSIVITY_FIELD) {
            Some(target) => target.copy_from_slice(&self.diffusivity),
            None => warn!("{}: 宿主缺少 diffusivity 字段，跳过写回", self.label),
        }
    }
}

impl ForcingOperator for BaptistOperator {
    fn name(&self) -> &str {
        &self.label
    }

    fn apply(&mut self, host: &mut dyn SimulationHost) {
        let dt = host.timestep();
        self.n_vegetated = self.update_mask(&*host);
        if self.n_vegetated == 0 {
            return;
        }

        if self.use_diffusivity {
            self.update_diffusivity(host);
        }

        let gravity = self.gravity;
        let (depth, mask, height) = (&self.depth, &self.mask, &self.veg_height);
        let (a1, a2, cd) = (&self.a1, &self.a2, &self.cd);
        let (xmom, ymom) = host.momentum_mut();
        xmom.par_iter_mut()
            .zip(ymom.par_iter_mut())
            .enumerate()
            .filter(|(i, _)| mask[*i])
            .for_each(|(i, (hu, hv))| {
                let (new_hu, new_hv) =
                    drag_step((*hu, *hv), depth[i], height[i], a1[i], a2[i], cd[i], gravity, dt);
                *hu = new_hu;
                *hv = new_hv;
            });

        debug!(
            "{}: 阻力更新 {} 个单元, dt={}",
            self.label, self.n_vegetated, dt
        );
    }

    fn parallel_safe(&self) -> bool {
        true
    }

    fn timestepping_statistics(&self, host: &dyn SimulationHost) -> String {
        format!("    {}: Baptist operator, time {}", self.label, host.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    fn single_cell(depth: f64, xmom: f64) -> Domain {
        let mut domain = Domain::new(vec![0.0], 9.81);
        domain.set_stage(vec![depth]).unwrap();
        domain.set_momentum(vec![xmom], vec![0.0]).unwrap();
        domain
    }

    #[test]
    fn test_chezy_without_vegetation_is_bed_chezy() {
        // a2 = 0, h < hv
        let cv = vegetated_chezy(0.5, 1.0, 65f64.powi(-2), 0.0, 1.68);
        assert!((cv - 65.0).abs() < 1e-10);
    }

    #[test]
    fn test_chezy_submerged_adds_log_term() {
        let a1 = 65f64.powi(-2);
        let a2 = 0.01 * 120.0 / (2.0 * 9.81);
        let emergent = vegetated_chezy(1.0, 1.0, a1, a2, 1.68);
        let submerged = vegetated_chezy(2.0, 1.0, a1, a2, 1.68);
        assert!((submerged - emergent - BAPTIST_A3 * 2f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn test_friction_slope_regularized() {
        // h = 0 时分母退化为 ε
        let sf = friction_slope(9.81, 1.0, 1.0, 65.0, 0.0);
        assert!((sf - 9.81 / FRICTION_SLOPE_EPSILON).abs() < 1e-3);
    }

    #[test]
    fn test_drag_step_opposes_flow() {
        let a1 = 65f64.powi(-2);
        let a2 = 0.01 * 120.0 / (2.0 * 9.81);
        let (hu, hv) = drag_step((0.3, -0.4), 0.5, 1.0, a1, a2, 1.68, 9.81, 0.1);
        assert!(hu < 0.3 && hu > 0.0);
        assert!(hv > -0.4 && hv < 0.0);
    }

    #[test]
    fn test_drag_step_explicit_overshoot() {
        // Sf dt > |hu| 时显式格式越过零点，不做限幅
        let a1 = 65f64.powi(-2);
        let a2 = 0.01 * 120.0 / (2.0 * 9.81);
        let cv = vegetated_chezy(0.5, 1.0, a1, a2, 1.68);
        let sf_x = friction_slope(9.81, 0.3, 0.5, cv, 0.5);
        let sf_y = friction_slope(9.81, -0.4, 0.5, cv, 0.5);
        let (hu, hv) = drag_step((0.3, -0.4), 0.5, 1.0, a1, a2, 1.68, 9.81, 1.0);
        assert_eq!(hu, 0.3 - sf_x * 1.0);
        assert_eq!(hv, -0.4 - sf_y * 1.0);
        assert!(hu < 0.0);
    }

    #[test]
    fn test_attach_registers_fields() {
        let mut domain = single_cell(0.5, 1.0);
        let params = BaptistParams::new()
            .with_diameter(0.01)
            .with_density(120.0)
            .with_height(1.0)
            .with_diffusivity(true);
        let op = BaptistOperator::attach(&mut domain, params).unwrap();

        assert_eq!(domain.get_field("veg_density"), Some(&[120.0][..]));
        assert_eq!(domain.fields().meta("veg_density").unwrap().unit, "#/m²");
        assert_eq!(domain.get_field("diffusivity"), Some(&[0.0][..]));
        assert!(domain.viscosity_enabled());
        assert_eq!(op.label(), "baptist_operator");
        assert_eq!(op.a3(), 7.8289);
        assert!((op.a1()[0] - 65f64.powi(-2)).abs() < 1e-18);
        assert!((op.a2()[0] - 0.01 * 120.0 / 19.62).abs() < 1e-15);
        assert_eq!(op.drag_coefficients(), &[1.68]);
    }

    #[test]
    fn test_cell_chezy() {
        let mut domain = single_cell(0.5, 0.0);
        let params = BaptistParams::new()
            .with_diameter(vec![0.01])
            .with_density(vec![120.0])
            .with_height(vec![1.0]);
        let op = BaptistOperator::attach(&mut domain, params).unwrap();
        let cv = op.cell_chezy(0, 0.5).unwrap();
        assert!((cv - vegetated_chezy(0.5, 1.0, op.a1()[0], op.a2()[0], 1.68)).abs() < 1e-14);

        let mut bare = single_cell(0.5, 0.0);
        let params = BaptistParams::new()
            .with_diameter(0.0)
            .with_density(0.0)
            .with_height(0.0);
        let op = BaptistOperator::attach(&mut bare, params).unwrap();
        assert!(op.cell_chezy(0, 0.5).is_none());
    }

    #[test]
    fn test_statistics_format() {
        let mut domain = single_cell(0.5, 0.0);
        let params = BaptistParams::new()
            .with_diameter(0.01)
            .with_density(120.0)
            .with_height(1.0)
            .with_label("marsh");
        let op = BaptistOperator::attach(&mut domain, params).unwrap();
        domain.set_time(1800.0);
        assert_eq!(
            op.timestepping_statistics(&domain),
            "    marsh: Baptist operator, time 1800"
        );
        assert!(op.parallel_safe());
    }

    #[test]
    fn test_attach_rejects_non_finite_coefficients() {
        let base = || {
            BaptistParams::new()
                .with_diameter(0.01)
                .with_density(120.0)
                .with_height(1.0)
        };
        let mut domain = single_cell(0.5, 0.0);

        let err = BaptistOperator::attach(&mut domain, base().with_bed_friction(f64::NAN)).unwrap_err();
        assert!(matches!(
            err,
            VegetationError::Validation(WlError::OutOfRange { field: "bed_friction", .. })
        ));

        let params = base().with_drag(DragCoefficient::Constant(f64::INFINITY));
        let err = BaptistOperator::attach(&mut domain, params).unwrap_err();
        assert!(matches!(
            err,
            VegetationError::Validation(WlError::OutOfRange { field: "drag_coefficient", .. })
        ));

        let params = base().with_drag(DragCoefficient::Nepf1999 { alpha: 0.0 });
        assert!(BaptistOperator::attach(&mut domain, params).is_err());

        let mut no_gravity = Domain::new(vec![0.0], 0.0);
        let err = BaptistOperator::attach(&mut no_gravity, base()).unwrap_err();
        assert!(matches!(
            err,
            VegetationError::Validation(WlError::OutOfRange { field: "gravity", .. })
        ));
        assert!(domain.fields().is_empty());
    }
}
