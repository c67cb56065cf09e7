// apps/wl_cli/src/commands/run.rs

//! 运行潮沟算例
//!
//! 在矩形网格上构造一条从海侧向陆侧抬升的潮沟，按高程划分糙率类别，
//! 挂接 Baptist 植被阻力算子后推进到结束时间。每个输出时刻更新潮位
//! 和河流流量并输出统计。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use glam::DVec2;
use tracing::{info, warn};
use wl_config::{DragCoefficientSetting, ModelConfig};
use wl_physics::sources::vegetation::DEFAULT_DRAG_COEFFICIENT;
use wl_physics::{
    apply_cold_start, apply_hot_start, assign_friction, BaptistOperator, ChezyConversion, Domain,
    InitialSnapshot, OperatorRegistry, RiverSystem, SimulationHost, TideProvider,
};

use super::load_config;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 沿程单元数
    #[arg(long, default_value = "40")]
    pub nx: usize,

    /// 横向单元数
    #[arg(long, default_value = "4")]
    pub ny: usize,

    /// 单元边长 [m]
    #[arg(long, default_value = "25.0")]
    pub dx: f64,

    /// 内部时间步长 [秒]
    #[arg(long, default_value = "30.0")]
    pub dt: f64,

    /// 结束时间 [秒]，缺省取配置
    #[arg(short = 't', long)]
    pub end_time: Option<f64>,

    /// 输出间隔 [秒]，缺省取配置
    #[arg(long)]
    pub yieldstep: Option<f64>,

    /// 陆侧入流 [m³/s]
    #[arg(long, default_value = "10.0")]
    pub inflow: f64,

    /// 启用植被涡扩散
    #[arg(long)]
    pub diffusivity: bool,

    /// 热启动快照
    #[arg(long)]
    pub hot_start: Option<PathBuf>,

    /// 结束时保存快照
    #[arg(long)]
    pub save_snapshot: Option<PathBuf>,
}

/// 潮沟床面高程：海侧 -1.5 m，陆侧 +1.5 m
fn channel_bed(length: f64) -> impl Fn(DVec2) -> f64 {
    move |p| -1.5 + 3.0 * p.x / length
}

/// 按高程划分糙率类别（编号对应默认糙率表）
fn class_for_elevation(z: f64) -> i32 {
    match z {
        z if z < -1.0 => 1,
        z if z < -0.25 => 2,
        z if z < 0.25 => 4,
        z if z < 0.75 => 5,
        _ => 6,
    }
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== WLAD 算例启动 ===");

    let config = load_config(args.config.as_deref())?;
    let final_time = args.end_time.unwrap_or(config.timing.final_time);
    let yieldstep = args.yieldstep.unwrap_or(config.timing.yieldstep);
    if args.nx == 0 || args.ny == 0 || !(args.dx > 0.0) {
        bail!("网格尺寸无效: {} x {}, dx = {}", args.nx, args.ny, args.dx);
    }

    let gravity = config.physics.gravity;
    let length = args.nx as f64 * args.dx;
    let mut domain = Domain::rectangular(
        args.nx,
        args.ny,
        args.dx,
        args.dx,
        gravity,
        channel_bed(length),
    );
    info!("网格: {} x {} = {} 单元, dx = {} m", args.nx, args.ny, domain.n_cells(), args.dx);

    // 糙率
    let class_ids: Vec<i32> = domain.elevation().iter().map(|&z| class_for_elevation(z)).collect();
    let friction = assign_friction(&class_ids, &config.friction_classes)?;
    friction.apply_manning(&mut domain)?;
    info!(
        "糙率: {} 个单元有植被, {} 个类别",
        friction.n_vegetated(),
        config.friction_classes.len()
    );

    // 边界强迫
    let mut tide = TideProvider::from_config(&config.boundaries, None)?;
    let mut rivers = RiverSystem::new();
    rivers.add_constant("inlet", -args.inflow.abs());
    rivers.add_constant("outlet", config.boundaries.constant_outlet_discharge);
    if config.boundaries.wind_on {
        warn!("未提供气象站记录，忽略风场");
    }

    // 初始条件
    if config.initial.hot_start {
        let path = args
            .hot_start
            .as_ref()
            .context("配置要求热启动，但未指定 --hot-start 快照")?;
        let snapshot = InitialSnapshot::from_file(path)
            .with_context(|| format!("无法读取快照: {}", path.display()))?;
        apply_hot_start(&mut domain, &snapshot)?;
    } else {
        apply_cold_start(&mut domain, tide.cached())?;
        set_inflow_momentum(&mut domain, &config, rivers.total_discharge(), args.ny as f64 * args.dx)?;
    }

    // 植被阻力
    let params = friction
        .baptist_params()
        .with_bed_friction(config.vegetation.bed_friction)
        .with_drag(config.vegetation.drag_coefficient.into())
        .with_diffusivity(args.diffusivity || config.vegetation.use_diffusivity);
    let operator = BaptistOperator::attach(&mut domain, params)?;
    info!(
        "植被阻力: {}, 阻力系数 {}, 涡扩散 {}",
        operator.label(),
        operator.drag().name(),
        operator.use_diffusivity()
    );

    let mut registry = OperatorRegistry::new();
    registry.register(operator);
    domain.set_timestep(args.dt)?;

    let start = Instant::now();
    info!("开始模拟: 结束时间={} s, 输出间隔={} s, dt={} s", final_time, yieldstep, args.dt);

    let yields = domain.evolve(&mut registry, yieldstep, final_time, |d| {
        tide.update(d.time());
        let changed = rivers.update(d.time());
        let (xmom, ymom) = d.momentum();
        let q_max = xmom
            .iter()
            .zip(ymom)
            .map(|(hu, hv)| (hu * hu + hv * hv).sqrt())
            .fold(0.0_f64, f64::max);
        info!(
            "t={:.1} s: 潮位={:.3} m, 净流量={:.2} m³/s ({} 个更新), |q|_max={:.5} m²/s",
            d.time(),
            tide.cached(),
            rivers.total_discharge(),
            changed,
            q_max
        );
    })?;

    for line in domain.timestepping_statistics(&registry).lines() {
        info!("{}", line);
    }

    // 有效 Chezy
    let conversion = chezy_conversion(&config);
    let chezy = conversion.effective_chezy(&domain.depth(), &friction)?;
    let c_min = chezy.iter().copied().fold(f64::INFINITY, f64::min);
    let c_max = chezy.iter().copied().fold(0.0_f64, f64::max);
    info!("有效 Chezy: {:.2} ~ {:.2} m^0.5/s", c_min, c_max);

    if let Some(path) = &args.save_snapshot {
        InitialSnapshot::extract(&domain)
            .save_to_file(path)
            .with_context(|| format!("无法保存快照: {}", path.display()))?;
        info!("快照已保存: {}", path.display());
    }

    info!("=== 模拟完成 ===");
    info!("输出次数: {}", yields);
    info!("总步数: {}", domain.n_steps());
    info!("计算时间: {:.2} s", start.elapsed().as_secs_f64());

    Ok(())
}

/// 有效 Chezy 换算参数
///
/// 换算只支持单一阻力系数；选用 Nepf 曲线时退回常数 Cd 并给出警告。
fn chezy_conversion(config: &ModelConfig) -> ChezyConversion {
    let drag_coefficient = match config.vegetation.drag_coefficient {
        DragCoefficientSetting::Constant { value } => value,
        DragCoefficientSetting::Nepf1999 { .. } => {
            warn!(
                "有效 Chezy 按常数 Cd = {} 换算，与本次运行使用的逐单元 Nepf 阻力系数不一致",
                DEFAULT_DRAG_COEFFICIENT
            );
            DEFAULT_DRAG_COEFFICIENT
        }
    };
    ChezyConversion {
        bed_chezy: config.vegetation.bed_friction,
        drag_coefficient,
        gravity: config.physics.gravity,
    }
}

/// 湿单元按净流量设置均匀单宽流量（沿 x 方向）
fn set_inflow_momentum(
    domain: &mut Domain,
    config: &ModelConfig,
    discharge: f64,
    width: f64,
) -> Result<()> {
    let q = discharge / width;
    let h_min = config.physics.minimum_allowed_height;
    let xmom: Vec<f64> = domain
        .depth()
        .iter()
        .map(|&h| if h > h_min { q } else { 0.0 })
        .collect();
    let n = xmom.len();
    domain.set_momentum(xmom, vec![0.0; n])?;
    Ok(())
}
