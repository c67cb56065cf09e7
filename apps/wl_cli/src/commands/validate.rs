// apps/wl_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 验证模型配置和热启动快照。

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{info, warn};
use wl_config::{DragCoefficientSetting, ModelConfig};
use wl_physics::InitialSnapshot;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 热启动快照路径
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== WLAD 配置验证 ===");

    if args.config.is_none() && args.snapshot.is_none() {
        println!("用法: wl_cli validate --config <配置文件> [--snapshot <快照文件>]");
        return Ok(());
    }

    let mut warnings = Vec::new();

    if let Some(path) = &args.config {
        println!("\n检查配置文件: {}", path.display());
        let config = ModelConfig::from_file(path)
            .with_context(|| format!("配置无效: {}", path.display()))?;
        collect_warnings(&config, &mut warnings);
        println!("  ✓ 配置有效: {} 个糙率类别", config.friction_classes.len());
    }

    if let Some(path) = &args.snapshot {
        println!("\n检查快照: {}", path.display());
        let snapshot = InitialSnapshot::from_file(path)
            .with_context(|| format!("快照无效: {}", path.display()))?;
        snapshot.validate(snapshot.n_cells())?;
        println!("  ✓ 快照有效: {} 个单元, 时间 {} s", snapshot.n_cells(), snapshot.time);
    }

    for w in &warnings {
        warn!("{}", w);
        println!("  ⚠ {}", w);
    }

    if args.strict && !warnings.is_empty() {
        bail!("严格模式: {} 个警告", warnings.len());
    }
    Ok(())
}

fn collect_warnings(config: &ModelConfig, warnings: &mut Vec<String>) {
    if !config.friction_classes.iter().any(|c| c.is_vegetated()) {
        warnings.push("没有植被类别，植被阻力不起作用".to_string());
    }
    if config.timing.final_time < config.timing.yieldstep {
        warnings.push(format!(
            "结束时间 {} s 小于输出间隔 {} s",
            config.timing.final_time, config.timing.yieldstep
        ));
    }
    if let DragCoefficientSetting::Nepf1999 { alpha } = config.vegetation.drag_coefficient {
        if alpha > 1.0 {
            warnings.push(format!("Nepf 折减系数 {} 大于 1", alpha));
        }
    }
    if config.vegetation.use_diffusivity && config.physics.minimum_allowed_height <= 0.0 {
        warnings.push("启用涡扩散时建议设置正的最小水深".to_string());
    }
}
