//! 错误处理模块
//!
//! 定义应用程序的统一错误类型。单项检测内部的失败不会走这里，
//! 而是记录在各自的检测结果中。

use thiserror::Error;

/// App Vitals 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum AppVitalsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测器构建错误
    #[error("探测器错误: {0}")]
    Probe(#[from] ProbeError),

    /// 编排环境相关错误
    #[error("编排环境错误: {0}")]
    Orchestrator(#[from] OrchestratorError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 探测器错误类型
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP客户端构建失败
    #[error("HTTP客户端构建失败: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// 编排环境错误类型
///
/// 只有无法恢复的环境问题才会变成这个错误，查询本身的失败记录在
/// `PodStatusOutcome` 里。
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// 外部命令无法启动
    #[error("无法执行命令 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Kubernetes客户端初始化失败
    #[error("Kubernetes客户端初始化失败: {0}")]
    Client(#[from] kube::Error),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppVitalsError>;
