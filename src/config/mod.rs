//! 配置管理模块
//!
//! 提供配置文件解析、验证以及检测目标的构建

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{load_optional, ConfigLoader, TomlConfigLoader};
pub use types::{
    normalize_url, validate_target, CheckTarget, FileConfig, PodSource, DEFAULT_APP_NAME,
    DEFAULT_NAMESPACE, DEFAULT_URL,
};
