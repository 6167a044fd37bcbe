//! Pod就绪状态探测
//!
//! 查询带 `app=<应用名>` 标签的Pod并统计运行和就绪数量。支持两种查询方式：
//! Kubernetes API客户端，以及调用 `kubectl get pods -o json`。两者共用同一套
//! 就绪判断和计数逻辑。
//!
//! 查询失败只会体现在结果的状态字段里；只有外部命令根本无法启动、
//! 或明确要求API客户端却无法创建时才返回错误。

use crate::config::{CheckTarget, PodSource};
use crate::error::{OrchestratorError, Result};
use crate::health::result::{PodDetail, PodQueryStatus, PodStatusOutcome};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// 容器内才会存在的服务账号目录，用于自动识别编排环境
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount/";

/// 判断是否运行在Pod中
pub fn detect_orchestrator(service_account_dir: &Path) -> bool {
    service_account_dir.exists()
}

/// Pod查询接口
#[async_trait]
pub trait PodQuery: Send + Sync {
    /// 查询方式名称，用于日志
    fn name(&self) -> &'static str;

    /// 查询命名空间内匹配标签的Pod
    ///
    /// # 返回
    /// * `Result<PodStatusOutcome>` - 查询失败记录在结果中，只有环境错误返回Err
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<PodStatusOutcome>;
}

/// 条件列表中存在 `Ready=True` 即视为就绪
pub fn is_ready<'a, I>(conditions: I) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    conditions
        .into_iter()
        .any(|(condition_type, status)| condition_type == "Ready" && status == "True")
}

/// `kubectl -o json` 的输出结构，只保留需要的字段
#[derive(Debug, Deserialize)]
struct PodListDocument {
    #[serde(default)]
    items: Vec<PodDocument>,
}

#[derive(Debug, Deserialize)]
struct PodDocument {
    metadata: PodMetadataDocument,
    #[serde(default)]
    status: PodStatusDocument,
}

#[derive(Debug, Deserialize)]
struct PodMetadataDocument {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct PodStatusDocument {
    phase: Option<String>,
    #[serde(default)]
    conditions: Vec<ConditionDocument>,
}

#[derive(Debug, Deserialize)]
struct ConditionDocument {
    #[serde(rename = "type")]
    condition_type: String,
    status: String,
}

/// 解析 `kubectl get pods -o json` 的输出
pub fn parse_pod_list(json: &str) -> std::result::Result<Vec<PodDetail>, serde_json::Error> {
    let document: PodListDocument = serde_json::from_str(json)?;

    Ok(document
        .items
        .into_iter()
        .map(|pod| {
            let ready = is_ready(
                pod.status
                    .conditions
                    .iter()
                    .map(|c| (c.condition_type.as_str(), c.status.as_str())),
            );
            PodDetail {
                name: pod.metadata.name,
                phase: pod.status.phase.unwrap_or_else(|| "Unknown".to_string()),
                ready,
            }
        })
        .collect())
}

/// 将API返回的Pod转换为检测结果
pub fn pod_detail(pod: &Pod) -> PodDetail {
    let status = pod.status.as_ref();
    let conditions = status
        .and_then(|s| s.conditions.as_ref())
        .into_iter()
        .flatten()
        .map(|c| (c.type_.as_str(), c.status.as_str()));

    PodDetail {
        name: pod.metadata.name.clone().unwrap_or_default(),
        phase: status
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        ready: is_ready(conditions),
    }
}

/// 通过kubectl查询Pod
pub struct KubectlPodQuery {
    /// kubectl程序路径
    program: PathBuf,
    /// 命令超时时间
    timeout: Duration,
}

impl KubectlPodQuery {
    pub fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }
}

#[async_trait]
impl PodQuery for KubectlPodQuery {
    fn name(&self) -> &'static str {
        "kubectl"
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<PodStatusOutcome> {
        debug!(
            "执行 {} get pods -l {} -n {} -o json",
            self.program.display(),
            label_selector,
            namespace
        );

        let child = Command::new(&self.program)
            .args(["get", "pods", "-l", label_selector, "-n", namespace, "-o", "json"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OrchestratorError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Ok(PodStatusOutcome::failed(PodQueryStatus::Error, e.to_string())),
            Err(_) => {
                return Ok(PodStatusOutcome::failed(
                    PodQueryStatus::Timeout,
                    "kubectl command timed out",
                ))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Ok(PodStatusOutcome::failed(PodQueryStatus::CliError, stderr));
        }

        let stdout = match String::from_utf8(output.stdout) {
            Ok(stdout) => stdout,
            Err(e) => return Ok(PodStatusOutcome::failed(PodQueryStatus::Error, e.to_string())),
        };

        Ok(match parse_pod_list(&stdout) {
            Ok(pods) => PodStatusOutcome::from_details(pods),
            Err(e) => PodStatusOutcome::failed(PodQueryStatus::ParseError, e.to_string()),
        })
    }
}

/// 通过Kubernetes API查询Pod
pub struct KubeApiPodQuery {
    client: Client,
    timeout: Duration,
}

impl KubeApiPodQuery {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// 从kubeconfig或Pod内的服务账号推断集群配置
    pub async fn connect(timeout: Duration) -> std::result::Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self::new(client, timeout))
    }
}

#[async_trait]
impl PodQuery for KubeApiPodQuery {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<PodStatusOutcome> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = ListParams::default().labels(label_selector);

        Ok(match timeout(self.timeout, pods.list(&lp)).await {
            Ok(Ok(list)) => {
                PodStatusOutcome::from_details(list.items.iter().map(pod_detail).collect())
            }
            Ok(Err(kube::Error::Api(response))) => {
                PodStatusOutcome::failed(PodQueryStatus::CliError, response.to_string())
            }
            Ok(Err(kube::Error::SerdeError(e))) => {
                PodStatusOutcome::failed(PodQueryStatus::ParseError, e.to_string())
            }
            Ok(Err(e)) => PodStatusOutcome::failed(PodQueryStatus::Error, e.to_string()),
            Err(_) => PodStatusOutcome::failed(PodQueryStatus::Timeout, "pod query timed out"),
        })
    }
}

/// Pod就绪状态探测器
pub struct OrchestratorProbe {
    query: Box<dyn PodQuery>,
}

impl OrchestratorProbe {
    /// 使用指定的查询方式
    pub fn new(query: Box<dyn PodQuery>) -> Self {
        Self { query }
    }

    /// 按检测目标的配置选择查询方式
    pub async fn connect(target: &CheckTarget) -> Result<Self> {
        let kubectl = || -> Box<dyn PodQuery> {
            Box::new(KubectlPodQuery::new(
                target.kubectl_path.clone(),
                target.query_timeout,
            ))
        };

        let query: Box<dyn PodQuery> = match target.pod_source {
            PodSource::Kubectl => kubectl(),
            PodSource::Api => Box::new(
                KubeApiPodQuery::connect(target.query_timeout)
                    .await
                    .map_err(OrchestratorError::Client)?,
            ),
            PodSource::Auto => match KubeApiPodQuery::connect(target.query_timeout).await {
                Ok(query) => Box::new(query),
                Err(e) => {
                    warn!("无法创建Kubernetes客户端，改用kubectl: {}", e);
                    kubectl()
                }
            },
        };

        info!("Pod查询方式: {}", query.name());
        Ok(Self::new(query))
    }

    /// 执行Pod就绪检测，未启用编排模式时不发起任何查询
    pub async fn check(&self, target: &CheckTarget) -> Result<PodStatusOutcome> {
        if !target.orchestrator_mode {
            return Ok(PodStatusOutcome::not_in_orchestrator());
        }

        self.query
            .list_pods(&target.namespace, &target.label_selector())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_URL;
    use k8s_openapi::api::core::v1::{PodCondition, PodStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const KUBECTL_OUTPUT: &str = r#"{
        "apiVersion": "v1",
        "kind": "List",
        "items": [
            {
                "metadata": {"name": "wisecow-0"},
                "status": {
                    "phase": "Running",
                    "conditions": [
                        {"type": "Initialized", "status": "True"},
                        {"type": "Ready", "status": "True"}
                    ]
                }
            },
            {
                "metadata": {"name": "wisecow-1"},
                "status": {
                    "phase": "Running",
                    "conditions": [{"type": "Ready", "status": "False"}]
                }
            },
            {
                "metadata": {"name": "wisecow-2"},
                "status": {}
            }
        ],
        "metadata": {"resourceVersion": ""}
    }"#;

    /// 记录调用次数的假查询
    struct CountingQuery {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PodQuery for CountingQuery {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn list_pods(&self, _namespace: &str, _selector: &str) -> Result<PodStatusOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PodStatusOutcome::from_details(Vec::new()))
        }
    }

    #[test]
    fn test_is_ready() {
        assert!(is_ready([("PodScheduled", "True"), ("Ready", "True")]));
        assert!(!is_ready([("Ready", "False"), ("ContainersReady", "True")]));
        assert!(!is_ready(std::iter::empty::<(&str, &str)>()));
    }

    #[test]
    fn test_parse_pod_list() {
        let pods = parse_pod_list(KUBECTL_OUTPUT).unwrap();
        assert_eq!(pods.len(), 3);

        assert_eq!(pods[0].name, "wisecow-0");
        assert!(pods[0].ready);
        assert!(!pods[1].ready);
        assert_eq!(pods[2].phase, "Unknown");
        assert!(!pods[2].ready);

        let outcome = PodStatusOutcome::from_details(pods);
        assert_eq!(outcome.total_pods, 3);
        assert_eq!(outcome.running_pods, 2);
        assert_eq!(outcome.ready_pods, 1);
    }

    #[test]
    fn test_parse_empty_list() {
        let pods = parse_pod_list(r#"{"kind": "List"}"#).unwrap();
        assert!(pods.is_empty());
    }

    #[test]
    fn test_parse_malformed_output() {
        assert!(parse_pod_list("error: not json").is_err());
        assert!(parse_pod_list(r#"{"items": [{"status": {}}]}"#).is_err());
    }

    #[test]
    fn test_pod_detail_from_api_object() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("wisecow-api".to_string()),
                ..Default::default()
            },
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                conditions: Some(vec![PodCondition {
                    type_: "Ready".to_string(),
                    status: "True".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let detail = pod_detail(&pod);
        assert_eq!(detail.name, "wisecow-api");
        assert_eq!(detail.phase, "Running");
        assert!(detail.ready);

        let bare = pod_detail(&Pod::default());
        assert_eq!(bare.phase, "Unknown");
        assert!(!bare.ready);
    }

    #[test]
    fn test_detect_orchestrator() {
        let dir = tempfile::tempdir().unwrap();
        assert!(detect_orchestrator(dir.path()));
        assert!(!detect_orchestrator(&dir.path().join("serviceaccount")));
    }

    #[tokio::test]
    async fn test_disabled_mode_skips_query() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = OrchestratorProbe::new(Box::new(CountingQuery {
            calls: Arc::clone(&calls),
        }));

        let target = CheckTarget::new(DEFAULT_URL, Duration::from_secs(1));
        let outcome = probe.check(&target).await.unwrap();

        assert_eq!(outcome.status, PodQueryStatus::NotInOrch);
        assert!(outcome.pod_details.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let target = target.with_orchestrator("default", "wisecow");
        let outcome = probe.check(&target).await.unwrap();
        assert_eq!(outcome.status, PodQueryStatus::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_kubectl_is_fatal() {
        let query = KubectlPodQuery::new(
            PathBuf::from("/nonexistent/bin/kubectl"),
            Duration::from_secs(1),
        );
        let result = query.list_pods("default", "app=wisecow").await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    mod kubectl {
        use super::*;
        use serial_test::serial;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// 写一个假的kubectl脚本
        fn fake_kubectl(dir: &TempDir, script: &str) -> PathBuf {
            let path = dir.path().join("kubectl");
            std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        #[serial]
        async fn test_success_and_arguments() {
            let dir = TempDir::new().unwrap();
            let args_file = dir.path().join("args");
            let script = format!(
                "echo \"$@\" > {}\ncat <<'EOF'\n{}\nEOF",
                args_file.display(),
                KUBECTL_OUTPUT
            );
            let query = KubectlPodQuery::new(fake_kubectl(&dir, &script), Duration::from_secs(5));

            let outcome = query.list_pods("prod", "app=wisecow").await.unwrap();
            assert_eq!(outcome.status, PodQueryStatus::Success);
            assert_eq!(outcome.total_pods, 3);
            assert_eq!(outcome.ready_pods, 1);

            let args = std::fs::read_to_string(args_file).unwrap();
            assert_eq!(args.trim(), "get pods -l app=wisecow -n prod -o json");
        }

        #[tokio::test]
        #[serial]
        async fn test_nonzero_exit_is_cli_error() {
            let dir = TempDir::new().unwrap();
            let script = "echo 'error: You must be logged in to the server' >&2\nexit 1";
            let query = KubectlPodQuery::new(fake_kubectl(&dir, script), Duration::from_secs(5));

            let outcome = query.list_pods("default", "app=wisecow").await.unwrap();
            assert_eq!(outcome.status, PodQueryStatus::CliError);
            assert_eq!(
                outcome.error.as_deref(),
                Some("error: You must be logged in to the server")
            );
            assert_eq!(outcome.total_pods, 0);
        }

        #[tokio::test]
        #[serial]
        async fn test_malformed_output_is_parse_error() {
            let dir = TempDir::new().unwrap();
            let query = KubectlPodQuery::new(
                fake_kubectl(&dir, "echo 'No resources found'"),
                Duration::from_secs(5),
            );

            let outcome = query.list_pods("default", "app=wisecow").await.unwrap();
            assert_eq!(outcome.status, PodQueryStatus::ParseError);
            assert!(outcome.error.is_some());
        }

        #[tokio::test]
        #[serial]
        async fn test_slow_command_times_out() {
            let dir = TempDir::new().unwrap();
            let query = KubectlPodQuery::new(
                fake_kubectl(&dir, "exec sleep 5"),
                Duration::from_millis(200),
            );

            let outcome = query.list_pods("default", "app=wisecow").await.unwrap();
            assert_eq!(outcome.status, PodQueryStatus::Timeout);
        }
    }
}
