//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::{FileConfig, PodSource};
use crate::logging::LogConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// App Vitals - 应用健康检测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "app-vitals",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 被检测应用的URL
    #[arg(value_name = "URL", help = "被检测应用的URL（默认 http://localhost:4499）")]
    pub url: Option<String>,

    /// 请求超时时间（秒）
    #[arg(short, long, value_name = "SECONDS", help = "请求超时时间（秒，默认10）")]
    pub timeout: Option<u64>,

    /// 启用编排模式，检测Pod就绪状态
    #[arg(
        short = 'k',
        long = "orchestrator",
        visible_alias = "k8s-mode",
        help = "启用编排模式，检测Pod就绪状态"
    )]
    pub orchestrator: bool,

    /// 命名空间
    #[arg(
        short,
        long,
        value_name = "NAMESPACE",
        help = "Pod所在命名空间（默认 default）",
        env = "NAMESPACE"
    )]
    pub namespace: Option<String>,

    /// 应用名称（Pod标签 app=<name>）
    #[arg(
        short,
        long,
        value_name = "NAME",
        help = "应用名称，用于Pod标签选择（默认 wisecow）",
        env = "APP_NAME"
    )]
    pub app_name: Option<String>,

    /// JSON报告输出文件
    #[arg(short, long, value_name = "FILE", help = "将JSON报告写入文件")]
    pub output: Option<PathBuf>,

    /// 安静模式，只输出总体结论
    #[arg(short, long, help = "安静模式，只输出总体结论")]
    pub quiet: bool,

    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "APP_VITALS_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别（默认 info）",
        env = "APP_VITALS_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 以JSON格式输出日志
    #[arg(long, help = "以JSON格式输出日志")]
    pub json_logs: bool,

    /// 日志文件
    #[arg(long, value_name = "FILE", help = "将日志写入文件而不是标准错误")]
    pub log_file: Option<PathBuf>,

    /// Pod查询方式
    #[arg(long, value_enum, help = "Pod查询方式（默认 auto）")]
    pub pod_source: Option<PodSource>,

    /// kubectl可执行文件路径
    #[arg(long, value_name = "PATH", help = "kubectl可执行文件路径")]
    pub kubectl: Option<PathBuf>,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl LogLevel {
    /// 从配置文件中的字符串解析
    fn from_config(level: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(level, true).ok()
    }
}

impl Args {
    /// 生效的日志级别：安静模式 > 命令行 > 配置文件 > info
    pub fn effective_log_level(&self, file: &FileConfig) -> LogLevel {
        if self.quiet {
            return LogLevel::Error;
        }

        self.log_level
            .or_else(|| file.log_level.as_deref().and_then(LogLevel::from_config))
            .unwrap_or(LogLevel::Info)
    }

    /// 构建日志配置
    pub fn log_config(&self, file: &FileConfig) -> LogConfig {
        LogConfig {
            level: self.effective_log_level(file).into(),
            file_path: self.log_file.clone().or_else(|| file.log_file.clone()),
            json_format: self.json_logs || file.json_logs.unwrap_or(false),
        }
    }
}
