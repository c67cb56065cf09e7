// apps/wl_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 列出糙率类别，以及植被类别在参考水深下的 Baptist 系数。

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;
use wl_physics::sources::vegetation::{solid_fraction, vegetated_chezy, BAPTIST_A3};
use wl_physics::DragCoefficient;

use super::load_config;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径（缺省使用默认糙率表）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 参考水深 [m]
    #[arg(long, default_value = "0.5")]
    pub depth: f64,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let gravity = config.physics.gravity;
    let bed_chezy = config.vegetation.bed_friction;
    let drag = DragCoefficient::from(config.vegetation.drag_coefficient);

    info!("=== WLAD 信息 ===");
    println!("配置: {}", config.name);
    println!("重力加速度: {} m/s²", gravity);
    println!("裸床 Chezy: {} m^0.5/s", bed_chezy);
    println!("阻力系数: {}", drag.name());
    println!("a3: {}", BAPTIST_A3);
    println!("参考水深: {} m", args.depth);

    println!("\n=== 糙率类别 ===");
    println!(
        "{:>3} {:<16} {:>8} {:>8} {:>7} {:>7} {:>10} {:>10} {:>7} {:>9}",
        "id", "name", "n", "m", "hv", "D", "ad", "a2", "Cd", "C"
    );
    let a1 = bed_chezy.powi(-2);
    for (i, class) in config.friction_classes.iter().enumerate() {
        if class.is_vegetated() {
            let (d, m) = (class.stem_diameter, class.stem_density);
            let cd = drag.cell_value(d, m);
            let a2 = d * m / (2.0 * gravity);
            let cv = vegetated_chezy(args.depth, class.stem_height, a1, a2, cd);
            println!(
                "{:>3} {:<16} {:>8} {:>8} {:>7} {:>7} {:>10.2e} {:>10.4} {:>7.3} {:>9.3}",
                i + 1,
                class.name,
                "-",
                m,
                class.stem_height,
                d,
                solid_fraction(d, m),
                a2,
                cd,
                cv
            );
        } else {
            let chezy = if class.manning_n > 0.0 {
                args.depth.max(0.0).powf(1.0 / 6.0) / class.manning_n
            } else {
                bed_chezy
            };
            println!(
                "{:>3} {:<16} {:>8} {:>8} {:>7} {:>7} {:>10} {:>10} {:>7} {:>9.3}",
                i + 1,
                class.name,
                class.manning_n,
                "-",
                "-",
                "-",
                "-",
                "-",
                "-",
                chezy
            );
        }
    }

    Ok(())
}
