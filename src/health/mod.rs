//! 健康检测模块
//!
//! 提供HTTP连通性探测、内容校验、Pod就绪检测以及结果汇总

pub mod aggregator;
pub mod content;
pub mod http_probe;
pub mod orchestrator;
pub mod result;
pub mod runner;

// 重新导出主要类型
pub use aggregator::{assess, Assessment};
pub use content::ContentValidator;
pub use http_probe::HttpProbe;
pub use orchestrator::{KubeApiPodQuery, KubectlPodQuery, OrchestratorProbe, PodQuery};
pub use result::{
    CheckOutcomes, Functionality, FunctionalityOutcome, HealthReport, HttpOutcome, PodDetail,
    PodQueryStatus, PodStatusOutcome, Verdict,
};
pub use runner::HealthCheckRunner;
