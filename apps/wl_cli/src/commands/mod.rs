// apps/wl_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use wl_config::ModelConfig;

/// 加载配置文件，未指定时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<ModelConfig> {
    match path {
        Some(path) => ModelConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件: {}", path.display())),
        None => Ok(ModelConfig::default()),
    }
}
