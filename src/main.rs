use anyhow::Result;
use clap::Parser;
use paper_generator::orchestrator::{App, Cli};
use paper_generator::{logger, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    // 初始化并执行命令
    App::initialize(config).await?.run(cli.command).await?;

    Ok(())
}
