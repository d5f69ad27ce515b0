use anyhow::Result;
use clap::Parser;

use toeic_toolkit::app::App;
use toeic_toolkit::cli::Cli;
use toeic_toolkit::config::Config;
use toeic_toolkit::error::{AppError, ConfigError};
use toeic_toolkit::logger;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    // 缺少必需变量时打印清单后退出
    let app = match App::initialize(config, cli.command) {
        Ok(app) => app,
        Err(e) => {
            if let Some(AppError::Config(ConfigError::MissingVars(_))) = e.downcast_ref::<AppError>() {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    app.run().await
}
