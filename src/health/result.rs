//! 健康检测结果数据结构
//!
//! 定义三项检测的结果类型、状态枚举以及最终的健康报告

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::CheckTarget;

/// 功能检测状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Functionality {
    /// 状态码200且所有内容标记都存在
    Healthy,
    /// 有响应，但内容不符合预期
    Degraded,
    /// 请求或读取过程中出错
    Failed,
}

impl fmt::Display for Functionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Functionality::Healthy => write!(f, "HEALTHY"),
            Functionality::Degraded => write!(f, "DEGRADED"),
            Functionality::Failed => write!(f, "FAILED"),
        }
    }
}

/// Pod查询状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PodQueryStatus {
    /// 未启用编排模式
    NotInOrch,
    Success,
    /// 查询被拒绝（命令非零退出或API返回错误）
    CliError,
    Timeout,
    /// 输出无法解析
    ParseError,
    Error,
}

impl fmt::Display for PodQueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            PodQueryStatus::NotInOrch => "NOT_IN_ORCH",
            PodQueryStatus::Success => "SUCCESS",
            PodQueryStatus::CliError => "CLI_ERROR",
            PodQueryStatus::Timeout => "TIMEOUT",
            PodQueryStatus::ParseError => "PARSE_ERROR",
            PodQueryStatus::Error => "ERROR",
        };
        f.write_str(tag)
    }
}

/// 总体健康结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Healthy,
    Unhealthy,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Healthy => write!(f, "HEALTHY"),
            Verdict::Unhealthy => write!(f, "UNHEALTHY"),
        }
    }
}

impl Verdict {
    /// 判断结论是否为健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, Verdict::Healthy)
    }

    /// 对应的进程退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Healthy => 0,
            Verdict::Unhealthy => 1,
        }
    }
}

/// HTTP连通性检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpOutcome {
    /// 是否收到了HTTP响应（任意状态码都算）
    pub success: bool,
    /// 数字状态码、`TIMEOUT` 或带标签的错误描述
    pub status: String,
    /// 响应耗时（秒，保留三位小数），失败时为0
    pub latency_seconds: f64,
}

impl HttpOutcome {
    /// 收到响应
    pub fn responded(status_code: u16, latency_seconds: f64) -> Self {
        Self {
            success: true,
            status: status_code.to_string(),
            latency_seconds: round_latency(latency_seconds),
        }
    }

    /// 请求超时
    pub fn timed_out() -> Self {
        Self {
            success: false,
            status: "TIMEOUT".to_string(),
            latency_seconds: 0.0,
        }
    }

    /// 传输层错误
    pub fn failed(status: String) -> Self {
        Self {
            success: false,
            status,
            latency_seconds: 0.0,
        }
    }
}

/// 响应时间保留三位小数
pub fn round_latency(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// 内容功能检测结果
///
/// 检测失败时除了 `functionality` 和 `error` 之外的字段全部为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalityOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// 解码后响应体的字节数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fortune_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cow_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_format_detected: Option<bool>,
    pub functionality: Functionality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FunctionalityOutcome {
    /// 请求或解析失败
    pub fn failed(error: String) -> Self {
        Self {
            http_status: None,
            response_size: None,
            content_type: None,
            fortune_detected: None,
            cow_detected: None,
            html_format_detected: None,
            functionality: Functionality::Failed,
            error: Some(error),
        }
    }

    pub fn fortune(&self) -> bool {
        self.fortune_detected.unwrap_or(false)
    }

    pub fn cow(&self) -> bool {
        self.cow_detected.unwrap_or(false)
    }

    pub fn html_format(&self) -> bool {
        self.html_format_detected.unwrap_or(false)
    }
}

/// 单个Pod的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodDetail {
    pub name: String,
    pub phase: String,
    pub ready: bool,
}

impl PodDetail {
    pub fn is_running(&self) -> bool {
        self.phase == "Running"
    }
}

/// Pod就绪状态检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodStatusOutcome {
    pub status: PodQueryStatus,
    pub total_pods: usize,
    pub running_pods: usize,
    pub ready_pods: usize,
    /// 按查询返回的顺序保存
    pub pod_details: Vec<PodDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PodStatusOutcome {
    /// 未启用编排模式
    pub fn not_in_orchestrator() -> Self {
        Self::empty(PodQueryStatus::NotInOrch, None)
    }

    /// 查询失败，计数全部为0
    pub fn failed(status: PodQueryStatus, error: impl Into<String>) -> Self {
        Self::empty(status, Some(error.into()))
    }

    /// 根据Pod列表累计各项计数
    pub fn from_details(pod_details: Vec<PodDetail>) -> Self {
        let running_pods = pod_details.iter().filter(|pod| pod.is_running()).count();
        let ready_pods = pod_details.iter().filter(|pod| pod.ready).count();

        Self {
            status: PodQueryStatus::Success,
            total_pods: pod_details.len(),
            running_pods,
            ready_pods,
            pod_details,
            error: None,
        }
    }

    fn empty(status: PodQueryStatus, error: Option<String>) -> Self {
        Self {
            status,
            total_pods: 0,
            running_pods: 0,
            ready_pods: 0,
            pod_details: Vec::new(),
            error,
        }
    }

    /// 查询是否成功
    pub fn is_success(&self) -> bool {
        self.status == PodQueryStatus::Success
    }
}

/// 三项检测结果的集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcomes {
    pub http_connectivity: HttpOutcome,
    pub functionality: FunctionalityOutcome,
    /// 仅在编排模式下存在
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_status: Option<PodStatusOutcome>,
}

/// 健康报告，生成后只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// 本次运行ID
    pub run_id: Uuid,
    /// 生成时间
    pub timestamp: DateTime<Utc>,
    pub target: CheckTarget,
    pub checks: CheckOutcomes,
    pub overall_health: Verdict,
    pub recommendations: Vec<String>,
}

impl HealthReport {
    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从JSON字符串创建
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
