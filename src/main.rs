mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 初始化日志系统
    ruflow::logger::init_logger(if cli.verbose { "debug" } else { "warn" });

    cli::run(cli).await
}
