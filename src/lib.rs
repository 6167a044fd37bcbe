//! App Vitals - 一次性应用健康检测工具
//!
//! 对一个返回 fortune/cowsay 内容的Web应用执行一次性检测：
//! - HTTP连通性与响应时间
//! - 页面内容校验
//! - Kubernetes Pod就绪状态（可选）
//! - 汇总结论、处理建议和退出码

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod report;

// 重新导出主要类型
pub use config::{CheckTarget, FileConfig};
pub use error::AppVitalsError;
pub use health::{HealthCheckRunner, HealthReport, Verdict};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
