//! 配置数据结构定义
//!
//! 定义配置文件结构、检测目标以及验证逻辑

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 默认检测地址
pub const DEFAULT_URL: &str = "http://localhost:4499";
/// 默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// 默认命名空间
pub const DEFAULT_NAMESPACE: &str = "default";
/// 默认应用标签
pub const DEFAULT_APP_NAME: &str = "wisecow";
/// Pod查询超时（秒）
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;
/// 默认kubectl程序
pub const DEFAULT_KUBECTL: &str = "kubectl";

/// Pod状态的查询方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PodSource {
    /// 优先使用API客户端，无法推断集群配置时退回kubectl
    #[default]
    Auto,
    /// 只使用API客户端
    Api,
    /// 只使用kubectl
    Kubectl,
}

/// 配置文件结构，所有字段均可省略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// 检测地址
    pub url: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_seconds: Option<u64>,
    /// 是否启用编排模式
    pub orchestrator_mode: Option<bool>,
    pub namespace: Option<String>,
    pub app_name: Option<String>,
    pub pod_source: Option<PodSource>,
    /// kubectl可执行文件路径
    pub kubectl_path: Option<PathBuf>,
    /// Pod查询超时时间（秒）
    pub query_timeout_seconds: Option<u64>,
    /// 日志级别
    pub log_level: Option<String>,
    /// 是否输出JSON格式日志
    pub json_logs: Option<bool>,
    /// 日志文件路径
    pub log_file: Option<PathBuf>,
}

/// 检测目标，启动时构建一次，之后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckTarget {
    /// 检测地址（已去掉末尾的斜杠）
    pub base_url: String,
    /// 请求超时时间
    #[serde(rename = "timeout_seconds", with = "duration_secs")]
    pub timeout: Duration,
    /// 是否启用编排模式
    pub orchestrator_mode: bool,
    pub namespace: String,
    pub app_name: String,
    pub pod_source: PodSource,
    pub kubectl_path: PathBuf,
    /// Pod查询超时时间
    #[serde(rename = "query_timeout_seconds", with = "duration_secs")]
    pub query_timeout: Duration,
}

impl CheckTarget {
    /// 创建检测目标，其余字段取默认值
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: normalize_url(base_url),
            timeout,
            orchestrator_mode: false,
            namespace: DEFAULT_NAMESPACE.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            pod_source: PodSource::default(),
            kubectl_path: PathBuf::from(DEFAULT_KUBECTL),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    /// 启用编排模式
    pub fn with_orchestrator(mut self, namespace: &str, app_name: &str) -> Self {
        self.orchestrator_mode = true;
        self.namespace = namespace.to_string();
        self.app_name = app_name.to_string();
        self
    }

    /// 设置Pod查询方式
    pub fn with_pod_source(mut self, pod_source: PodSource) -> Self {
        self.pod_source = pod_source;
        self
    }

    /// 设置kubectl路径
    pub fn with_kubectl_path(mut self, kubectl_path: PathBuf) -> Self {
        self.kubectl_path = kubectl_path;
        self
    }

    /// 设置Pod查询超时
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// 标签选择器
    pub fn label_selector(&self) -> String {
        format!("app={}", self.app_name)
    }
}

/// 去掉URL末尾的斜杠
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// 检测目标验证函数
///
/// # 参数
/// * `target` - 要验证的检测目标
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_target(target: &CheckTarget) -> Result<(), String> {
    if target.timeout.is_zero() {
        return Err("请求超时时间不能为0".to_string());
    }

    if target.query_timeout.is_zero() {
        return Err("Pod查询超时时间不能为0".to_string());
    }

    let url = reqwest::Url::parse(&target.base_url)
        .map_err(|e| format!("无效的URL {}: {}", target.base_url, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("不支持的URL协议: {}", url.scheme()));
    }

    if target.namespace.trim().is_empty() {
        return Err("命名空间不能为空".to_string());
    }

    if target.app_name.trim().is_empty() {
        return Err("应用名称不能为空".to_string());
    }

    Ok(())
}

/// 配置文件验证函数
pub fn validate_file_config(config: &FileConfig) -> Result<(), String> {
    if config.timeout_seconds == Some(0) {
        return Err("请求超时时间不能为0".to_string());
    }

    if config.query_timeout_seconds == Some(0) {
        return Err("Pod查询超时时间不能为0".to_string());
    }

    if let Some(level) = &config.log_level {
        let valid_log_levels = ["debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&level.as_str()) {
            return Err(format!(
                "无效的日志级别: {level}，支持的级别: {valid_log_levels:?}"
            ));
        }
    }

    Ok(())
}

/// Duration按秒序列化
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
