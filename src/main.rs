//! App Vitals 主程序入口
//!
//! 一次性应用健康检测工具

use anyhow::{Context, Result};
use app_vitals::cli::{Args, CheckCommand};
use app_vitals::config;
use app_vitals::logging::LoggingSystem;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let args = Args::parse();

    match run(&args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if LoggingSystem::is_initialized() {
                error!("健康检测失败: {:#}", e);
            } else {
                eprintln!("健康检测失败: {e:#}");
            }
            std::process::exit(1);
        }
    }
}

/// 加载配置、初始化日志并执行检测，返回退出码
async fn run(args: &Args) -> Result<i32> {
    let (file_config, config_path) = config::load_optional(args.config.as_deref())
        .await
        .context("加载配置文件失败")?;

    // 初始化日志系统
    let log_config = args.log_config(&file_config);
    let _logging_system =
        LoggingSystem::setup_logging(log_config.clone()).context("初始化日志系统失败")?;

    info!("App Vitals v{} 启动", app_vitals::VERSION);
    if let Some(path) = &config_path {
        info!("已加载配置文件: {}", path.display());
    }

    let verdict = CheckCommand::new(file_config)
        .execute(args, log_config, &mut std::io::stdout())
        .await
        .context("执行健康检测失败")?;

    Ok(verdict.exit_code())
}
