//! 日志系统模块
//!
//! 诊断日志写到标准错误，指定日志文件时改写到文件。标准输出只留给检测报告。

use log::LevelFilter;
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 全局订阅者只安装一次，记录安装结果
static SUBSCRIBER_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别，RUST_LOG 中的指令优先
    pub level: LevelFilter,
    /// 日志文件路径，未设置时写到标准错误
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            json_format: false,
        }
    }
}

/// 日志系统
pub struct LoggingSystem {
    config: LogConfig,
}

impl LoggingSystem {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// 安装全局订阅者
    ///
    /// 进程内只会安装一次；之后的调用返回第一次的结果。
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        let result = SUBSCRIBER_INIT.get_or_init(|| install(&config).map_err(|e| e.to_string()));

        match result {
            Ok(()) => Ok(Self::new(config)),
            Err(e) => Err(anyhow::anyhow!("日志系统初始化失败: {}", e)),
        }
    }

    /// 全局订阅者是否已安装成功
    pub fn is_initialized() -> bool {
        matches!(SUBSCRIBER_INIT.get(), Some(Ok(())))
    }

    /// 记录单项检测的结果
    pub fn check_log(&self, check: &str, status: &str, latency_ms: u64, details: Option<&str>) {
        if self.config.json_format {
            let entry = json!({
                "type": "health_check",
                "check": check,
                "status": status,
                "latency_ms": latency_ms,
                "details": details.unwrap_or(""),
            });
            tracing::info!("{entry}");
        } else {
            tracing::info!(
                "CHECK: {} - {} ({}ms) {}",
                check,
                status,
                latency_ms,
                details.unwrap_or("")
            );
        }
    }
}

/// 把 log::LevelFilter 转成过滤指令
fn level_directive(level: LevelFilter) -> Directive {
    use tracing_subscriber::filter::LevelFilter as TracingLevel;
    let level = match level {
        LevelFilter::Off => TracingLevel::OFF,
        LevelFilter::Error => TracingLevel::ERROR,
        LevelFilter::Warn => TracingLevel::WARN,
        LevelFilter::Info => TracingLevel::INFO,
        LevelFilter::Debug => TracingLevel::DEBUG,
        LevelFilter::Trace => TracingLevel::TRACE,
    };
    Directive::from(level)
}

/// 构建输出层：文件或标准错误，文本或JSON
fn output_layer<S>(config: &LogConfig) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let timer = fmt::time::ChronoUtc::rfc_3339();

    let layer = match &config.file_path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| anyhow::anyhow!("创建日志文件失败 {}: {}", path.display(), e))?;
            let writer = Mutex::new(file);
            if config.json_format {
                fmt::layer().json().with_writer(writer).with_timer(timer).boxed()
            } else {
                fmt::layer()
                    .with_writer(writer)
                    .with_timer(timer)
                    .with_ansi(false)
                    .boxed()
            }
        }
        None if config.json_format => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_timer(timer)
            .boxed(),
        None => fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(timer)
            .with_target(false)
            .boxed(),
    };

    Ok(layer)
}

fn install(config: &LogConfig) -> anyhow::Result<()> {
    // log crate 到 tracing 的桥接；测试进程里可能已经装过
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("LogTracer已存在: {}", e);
    }

    let env_filter = EnvFilter::from_default_env().add_directive(level_directive(config.level));

    registry()
        .with(env_filter)
        .with(output_layer(config)?)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber初始化失败: {}", e))?;

    tracing::debug!("日志配置: {:?}", config);
    Ok(())
}
