//! 检测流程
//!
//! 依次执行连通性探测、内容校验和（可选的）Pod就绪检测，然后汇总成报告。
//! 各项检测严格串行，每次运行都是独立的一次性流程。

use crate::config::CheckTarget;
use crate::error::Result;
use crate::health::aggregator::assess;
use crate::health::content::ContentValidator;
use crate::health::http_probe::HttpProbe;
use crate::health::orchestrator::OrchestratorProbe;
use crate::health::result::{CheckOutcomes, HealthReport};
use crate::logging::{LogConfig, LoggingSystem};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// 检测执行器
pub struct HealthCheckRunner {
    http_probe: HttpProbe,
    validator: ContentValidator,
    /// 仅在编排模式下存在
    orchestrator: Option<OrchestratorProbe>,
    logger: LoggingSystem,
}

impl HealthCheckRunner {
    /// 根据检测目标创建执行器
    pub async fn new(target: &CheckTarget, log_config: LogConfig) -> Result<Self> {
        let orchestrator = if target.orchestrator_mode {
            Some(OrchestratorProbe::connect(target).await?)
        } else {
            None
        };

        Self::with_orchestrator(target, log_config, orchestrator)
    }

    /// 使用指定的Pod探测器创建执行器
    pub fn with_orchestrator(
        target: &CheckTarget,
        log_config: LogConfig,
        orchestrator: Option<OrchestratorProbe>,
    ) -> Result<Self> {
        Ok(Self {
            http_probe: HttpProbe::new(target.timeout)?,
            validator: ContentValidator::new(target.timeout)?,
            orchestrator,
            logger: LoggingSystem::new(log_config),
        })
    }

    /// 执行全部检测并生成报告
    pub async fn run(&self, target: &CheckTarget) -> Result<HealthReport> {
        info!("检测HTTP连通性: {}", target.base_url);
        let http_connectivity = self.http_probe.probe(&target.base_url).await;
        self.logger.check_log(
            "http_connectivity",
            &http_connectivity.status,
            (http_connectivity.latency_seconds * 1000.0) as u64,
            None,
        );

        info!("检测应用功能");
        let functionality = self.validator.validate(&target.base_url).await;
        self.logger.check_log(
            "functionality",
            &functionality.functionality.to_string(),
            0,
            functionality.error.as_deref(),
        );

        let pod_status = match &self.orchestrator {
            Some(probe) if target.orchestrator_mode => {
                info!(
                    "检测Pod状态: namespace={}, selector={}",
                    target.namespace,
                    target.label_selector()
                );
                let outcome = probe.check(target).await?;
                let summary = format!("{}/{} ready", outcome.ready_pods, outcome.total_pods);
                self.logger.check_log(
                    "pod_status",
                    &outcome.status.to_string(),
                    0,
                    Some(outcome.error.as_deref().unwrap_or(&summary)),
                );
                Some(outcome)
            }
            _ => None,
        };

        let checks = CheckOutcomes {
            http_connectivity,
            functionality,
            pod_status,
        };
        let assessment = assess(target.orchestrator_mode, &checks);

        info!("总体健康状态: {}", assessment.verdict);

        Ok(HealthReport {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            target: target.clone(),
            checks,
            overall_health: assessment.verdict,
            recommendations: assessment.recommendations,
        })
    }
}
