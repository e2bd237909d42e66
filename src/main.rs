use clap::Parser;
use tracing::info;

use linkcore::cli::{Cli, Commands, ConfigCommands, config_generate};
use linkcore::config::{get_config, init_config};
use linkcore::runtime::modes::run_server;
use linkcore::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 生成配置不需要加载配置和日志
    if let Some(Commands::Config {
        action: ConfigCommands::Generate { output },
    }) = cli.command
    {
        if let Err(e) = config_generate(output) {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
        return Ok(());
    }

    init_config(cli.config.as_deref());
    let config = get_config();

    let _guard = init_logging(&config.logging)?;
    info!("linkcore v{} starting", env!("CARGO_PKG_VERSION"));

    run_server().await
}
