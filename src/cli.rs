//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::StaticConfig;
use crate::errors::{LinkcoreError, Result};

/// linkcore - URL shortener service
#[derive(Parser)]
#[command(name = "linkcore")]
#[command(version)]
#[command(about = "URL shortener service", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: print to stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

/// 生成示例配置，写入文件或打印到 stdout
pub fn config_generate(output: Option<String>) -> Result<()> {
    let Some(path) = output else {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    };

    StaticConfig::default().save_to_file(&path).map_err(|e| {
        LinkcoreError::file_operation(format!(
            "Unable to write configuration file '{}': {}",
            path, e
        ))
    })?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}
