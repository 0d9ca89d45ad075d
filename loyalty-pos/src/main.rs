//! Loyalty POS - operator console for points redemption at the till

mod config;
mod console;
mod logger;

use std::sync::Arc;

use clap::Parser;
use loyalty_client::LoyaltyHttpClient;
use loyalty_session::SessionController;

use crate::config::{Args, Config};
use crate::console::Console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 工作目录, 日志)
    let config = setup_environment(Args::parse())?;

    // 打印横幅
    print_banner();

    tracing::info!(
        api_url = %config.api_url,
        work_dir = %config.work_dir.display(),
        "🦀 Loyalty POS starting..."
    );

    // 2. 初始化 HTTP 客户端 (凭证保存在工作目录)
    let client = Arc::new(LoyaltyHttpClient::from_config(&config.client_config())?);

    // 3. 初始化会话控制器
    let controller = Arc::new(SessionController::new(
        Arc::clone(&client),
        config.session_config(),
    ));

    // 4. 运行控制台，直到 quit 或 stdin 关闭
    Console::new(client, controller).run().await
}

fn setup_environment(args: Args) -> anyhow::Result<Config> {
    // .env 文件可选
    dotenv::dotenv().ok();

    let config = Config::from_env().with_args(args);
    std::fs::create_dir_all(&config.work_dir)?;
    logger::init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    Ok(config)
}

fn print_banner() {
    println!(
        r#"
    __                    ____
   / /   ____  __  ______ _/ / /___  __
  / /   / __ \/ / / / __ `/ / __/ / / /
 / /___/ /_/ / /_/ / /_/ / / /_/ /_/ /
/_____/\____/\__, /\__,_/_/\__/\__, /
            /____/            /____/
    "#
    );
}
