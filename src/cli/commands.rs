//! 命令处理逻辑
//!
//! 把命令行参数和配置文件合并成检测目标，执行检测并输出报告

use crate::cli::args::Args;
use crate::config::types::{DEFAULT_KUBECTL, DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};
use crate::config::{
    validate_target, CheckTarget, FileConfig, DEFAULT_APP_NAME, DEFAULT_NAMESPACE, DEFAULT_URL,
};
use crate::error::{ConfigError, Result};
use crate::health::orchestrator::{detect_orchestrator, SERVICE_ACCOUNT_DIR};
use crate::health::result::{HealthReport, Verdict};
use crate::health::runner::HealthCheckRunner;
use crate::logging::LogConfig;
use crate::report;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// 一次性健康检测命令
pub struct CheckCommand {
    file_config: FileConfig,
}

impl CheckCommand {
    /// 使用已加载的配置文件内容创建命令
    pub fn new(file_config: FileConfig) -> Self {
        Self { file_config }
    }

    /// 合并命令行参数、配置文件和默认值，得到检测目标
    ///
    /// `in_orchestrator` 表示是否检测到运行在编排环境的容器内，
    /// 只有在命令行和配置文件都没有指定编排模式时才会用到。
    pub fn resolve_target(&self, args: &Args, in_orchestrator: bool) -> Result<CheckTarget> {
        let file = &self.file_config;

        let url = args
            .url
            .as_deref()
            .or(file.url.as_deref())
            .unwrap_or(DEFAULT_URL);
        let timeout = args
            .timeout
            .or(file.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let orchestrator_mode = if args.orchestrator {
            true
        } else if let Some(mode) = file.orchestrator_mode {
            mode
        } else if in_orchestrator {
            info!("检测到编排环境，自动启用编排模式");
            true
        } else {
            false
        };

        let mut target = CheckTarget::new(url, Duration::from_secs(timeout))
            .with_pod_source(args.pod_source.or(file.pod_source).unwrap_or_default())
            .with_kubectl_path(
                args.kubectl
                    .clone()
                    .or_else(|| file.kubectl_path.clone())
                    .unwrap_or_else(|| DEFAULT_KUBECTL.into()),
            )
            .with_query_timeout(Duration::from_secs(
                file.query_timeout_seconds
                    .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS),
            ));

        let namespace = args
            .namespace
            .as_deref()
            .or(file.namespace.as_deref())
            .unwrap_or(DEFAULT_NAMESPACE);
        let app_name = args
            .app_name
            .as_deref()
            .or(file.app_name.as_deref())
            .unwrap_or(DEFAULT_APP_NAME);
        if orchestrator_mode {
            target = target.with_orchestrator(namespace, app_name);
        } else {
            target.namespace = namespace.to_string();
            target.app_name = app_name.to_string();
        }

        validate_target(&target).map_err(ConfigError::ValidationError)?;
        Ok(target)
    }

    /// 执行检测，把报告写到 `out`，返回总体结论
    pub async fn execute<W: Write + Send>(
        &self,
        args: &Args,
        log_config: LogConfig,
        out: &mut W,
    ) -> Result<Verdict> {
        let in_orchestrator = detect_orchestrator(Path::new(SERVICE_ACCOUNT_DIR));
        let target = self.resolve_target(args, in_orchestrator)?;

        info!(
            "开始健康检测: url={}, 超时={}s, 编排模式={}",
            target.base_url,
            target.timeout.as_secs(),
            target.orchestrator_mode
        );

        let runner = HealthCheckRunner::new(&target, log_config).await?;
        let report = runner.run(&target).await?;

        emit(args, &report, out).await?;
        Ok(report.overall_health)
    }
}

/// 输出报告
///
/// 安静模式只写总体结论；指定了输出文件时无论是否安静都写JSON报告。
pub async fn emit<W: Write + Send>(args: &Args, report: &HealthReport, out: &mut W) -> Result<()> {
    if args.quiet {
        writeln!(out, "{}", report.overall_health)?;
    } else {
        write!(out, "{}", report::TextReport(report))?;
    }

    if let Some(path) = &args.output {
        report::save_to_file(report, path).await?;
        if !args.quiet {
            writeln!(out, "\nReport saved to: {}", path.display())?;
        }
    }

    out.flush()?;
    Ok(())
}
