//! 配置管理命令

use crate::config::{AxioConfig, default_config_file};
use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效的配置（TOML）
    Show,

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, config: &AxioConfig, loaded_from: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                match loaded_from {
                    Some(path) => println!("# Loaded from {}", path.display()),
                    None => println!("# Built-in defaults"),
                }
                print!("{}", config.to_toml()?);
            },
            ConfigCommand::Path => match loaded_from.map(Path::to_path_buf).or_else(default_config_file) {
                Some(path) => println!("{}", path.display()),
                None => println!("(no configuration directory)"),
            },
        }
        Ok(())
    }
}
