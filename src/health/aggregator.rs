//! 检测结果汇总
//!
//! 纯函数：根据三项检测结果得出总体结论和处理建议。

use crate::health::result::{
    CheckOutcomes, Functionality, HttpOutcome, PodStatusOutcome, Verdict,
};

/// 超过该响应时间（秒）给出性能建议
pub const SLOW_RESPONSE_THRESHOLD_SECS: f64 = 5.0;

/// 汇总结论
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub recommendations: Vec<String>,
}

/// 只有编排模式开启且查询成功时才返回Pod结果
fn successful_pod_query(
    orchestrator_mode: bool,
    pod_status: Option<&PodStatusOutcome>,
) -> Option<&PodStatusOutcome> {
    pod_status.filter(|pods| orchestrator_mode && pods.is_success())
}

/// 计算总体结论
///
/// Pod查询失败时不计入结论，只看应用层的检测结果。
pub fn overall_verdict(orchestrator_mode: bool, checks: &CheckOutcomes) -> Verdict {
    let mut healthy = checks.http_connectivity.success
        && checks.functionality.functionality == Functionality::Healthy;

    if let Some(pods) = successful_pod_query(orchestrator_mode, checks.pod_status.as_ref()) {
        healthy = healthy && pods.ready_pods > 0;
    }

    if healthy {
        Verdict::Healthy
    } else {
        Verdict::Unhealthy
    }
}

/// 生成处理建议，各项条件互相独立，按固定顺序追加
pub fn recommendations(orchestrator_mode: bool, checks: &CheckOutcomes) -> Vec<String> {
    let mut recommendations = Vec::new();
    let http: &HttpOutcome = &checks.http_connectivity;

    if !http.success {
        recommendations
            .push("HTTP connectivity failed - check if application is running".to_string());
    }

    match checks.functionality.functionality {
        Functionality::Degraded => recommendations.push(
            "Application functionality degraded - check fortune/cowsay installation and configuration"
                .to_string(),
        ),
        Functionality::Failed => recommendations
            .push("Application functionality failed - check application logs".to_string()),
        Functionality::Healthy => {}
    }

    if http.latency_seconds > SLOW_RESPONSE_THRESHOLD_SECS {
        recommendations.push(format!(
            "High response time ({}s) - check application performance",
            http.latency_seconds
        ));
    }

    if let Some(pods) = successful_pod_query(orchestrator_mode, checks.pod_status.as_ref()) {
        if pods.ready_pods == 0 {
            recommendations
                .push("No ready pods - check pod logs and readiness probes".to_string());
        } else if pods.ready_pods < pods.total_pods {
            recommendations.push(format!(
                "Only {}/{} pods ready - check failing pods",
                pods.ready_pods, pods.total_pods
            ));
        }
    }

    recommendations
}

/// 汇总三项检测结果
pub fn assess(orchestrator_mode: bool, checks: &CheckOutcomes) -> Assessment {
    Assessment {
        verdict: overall_verdict(orchestrator_mode, checks),
        recommendations: recommendations(orchestrator_mode, checks),
    }
}
