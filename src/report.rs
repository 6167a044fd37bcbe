//! 报告输出
//!
//! 将健康报告渲染为控制台文本或JSON，并保存到文件。

use crate::error::Result;
use crate::health::result::{HealthReport, PodQueryStatus};
use std::fmt;
use std::path::Path;

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

/// 控制台文本报告
pub struct TextReport<'a>(pub &'a HealthReport);

/// 渲染控制台文本报告
pub fn render_text(report: &HealthReport) -> String {
    TextReport(report).to_string()
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let target = &report.target;
        let checks = &report.checks;

        writeln!(out, "{}", "=".repeat(70))?;
        writeln!(out, "APPLICATION HEALTH CHECK REPORT")?;
        writeln!(out, "{}", "=".repeat(70))?;
        writeln!(
            out,
            "Timestamp: {}",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(out, "Application URL: {}", target.base_url)?;
        writeln!(out, "Orchestrator Mode: {}", target.orchestrator_mode)?;
        if target.orchestrator_mode {
            writeln!(out, "Namespace: {}", target.namespace)?;
            writeln!(out, "App Name: {}", target.app_name)?;
        }
        writeln!(out, "Overall Health: {}", report.overall_health)?;
        writeln!(out)?;

        let http = &checks.http_connectivity;
        writeln!(out, "HTTP Connectivity: {}", mark(http.success))?;
        writeln!(out, "  Status: {}", http.status)?;
        writeln!(out, "  Response Time: {}s", http.latency_seconds)?;
        writeln!(out)?;

        let functionality = &checks.functionality;
        writeln!(out, "Application Functionality:")?;
        writeln!(out, "  Status: {}", functionality.functionality)?;
        writeln!(out, "  Fortune Detected: {}", mark(functionality.fortune()))?;
        writeln!(out, "  Cow Detected: {}", mark(functionality.cow()))?;
        writeln!(out, "  HTML Format: {}", mark(functionality.html_format()))?;
        if let Some(error) = &functionality.error {
            writeln!(out, "  Error: {error}")?;
        }
        writeln!(out)?;

        if target.orchestrator_mode {
            writeln!(out, "Pod Status:")?;
            match &checks.pod_status {
                Some(pods) if pods.status == PodQueryStatus::Success => {
                    writeln!(out, "  Total Pods: {}", pods.total_pods)?;
                    writeln!(out, "  Running Pods: {}", pods.running_pods)?;
                    writeln!(out, "  Ready Pods: {}", pods.ready_pods)?;
                    for pod in &pods.pod_details {
                        writeln!(out, "    {} {} ({})", mark(pod.ready), pod.name, pod.phase)?;
                    }
                }
                Some(pods) => {
                    writeln!(out, "  Status: {}", pods.status)?;
                    if let Some(error) = &pods.error {
                        writeln!(out, "  Error: {error}")?;
                    }
                }
                None => writeln!(out, "  Status: UNKNOWN")?,
            }
            writeln!(out)?;
        }

        if report.recommendations.is_empty() {
            writeln!(out, "Recommendations: No issues detected")?;
        } else {
            writeln!(out, "Recommendations:")?;
            for (i, recommendation) in report.recommendations.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, recommendation)?;
            }
        }

        Ok(())
    }
}

/// 渲染JSON报告
pub fn render_json(report: &HealthReport) -> Result<String> {
    Ok(report.to_json()?)
}

/// 保存JSON报告到文件，写入失败直接返回错误
pub async fn save_to_file(report: &HealthReport, path: &Path) -> Result<()> {
    let json = render_json(report)?;
    tokio::fs::write(path, json).await?;
    log::info!("报告已保存: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckTarget, DEFAULT_URL};
    use crate::health::result::{
        CheckOutcomes, FunctionalityOutcome, HttpOutcome, PodDetail, PodStatusOutcome, Verdict,
    };
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn sample_report(orchestrator_mode: bool, pod_status: Option<PodStatusOutcome>) -> HealthReport {
        let mut target = CheckTarget::new(DEFAULT_URL, Duration::from_secs(10));
        if orchestrator_mode {
            target = target.with_orchestrator("prod", "wisecow");
        }

        HealthReport {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            target,
            checks: CheckOutcomes {
                http_connectivity: HttpOutcome::failed("URL_ERROR: connection refused".to_string()),
                functionality: FunctionalityOutcome::failed("connection refused".to_string()),
                pod_status,
            },
            overall_health: Verdict::Unhealthy,
            recommendations: vec![
                "HTTP connectivity failed - check if application is running".to_string(),
            ],
        }
    }

    #[test]
    fn test_text_report_without_orchestrator() {
        let text = render_text(&sample_report(false, None));

        assert!(text.contains("Overall Health: UNHEALTHY"));
        assert!(text.contains("HTTP Connectivity: ✗"));
        assert!(text.contains("Status: URL_ERROR: connection refused"));
        assert!(text.contains("  Status: FAILED"));
        assert!(text.contains("1. HTTP connectivity failed"));
        assert!(!text.contains("Pod Status:"));
        assert!(!text.contains("Namespace:"));
    }

    #[test]
    fn test_text_report_with_pods() {
        let pods = PodStatusOutcome::from_details(vec![
            PodDetail {
                name: "wisecow-0".to_string(),
                phase: "Running".to_string(),
                ready: true,
            },
            PodDetail {
                name: "wisecow-1".to_string(),
                phase: "Pending".to_string(),
                ready: false,
            },
        ]);
        let text = render_text(&sample_report(true, Some(pods)));

        assert!(text.contains("Namespace: prod"));
        assert!(text.contains("Ready Pods: 1"));
        assert!(text.contains("    ✓ wisecow-0 (Running)"));
        assert!(text.contains("    ✗ wisecow-1 (Pending)"));
    }

    #[test]
    fn test_text_report_with_failed_pod_query() {
        let pods = PodStatusOutcome::failed(PodQueryStatus::CliError, "forbidden");
        let text = render_text(&sample_report(true, Some(pods)));

        assert!(text.contains("  Status: CLI_ERROR"));
        assert!(text.contains("  Error: forbidden"));
    }

    #[test]
    fn test_no_issues_line() {
        let mut report = sample_report(false, None);
        report.recommendations.clear();
        assert!(render_text(&report).contains("Recommendations: No issues detected"));
    }

    #[test]
    fn test_text_report_streams_to_writer() {
        let report = sample_report(true, None);
        let mut out = Vec::new();
        std::io::Write::write_fmt(&mut out, format_args!("{}", TextReport(&report))).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, render_text(&report));
        assert!(text.starts_with(&"=".repeat(70)));
        assert!(text.contains("  Status: UNKNOWN"));
        assert!(text.ends_with("  1. HTTP connectivity failed - check if application is running\n"));
    }

    #[test]
    fn test_json_report_fields() {
        let report = sample_report(false, None);
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(value["overall_health"], "UNHEALTHY");
        assert_eq!(value["target"]["base_url"], "http://localhost:4499");
        assert_eq!(value["checks"]["http_connectivity"]["success"], false);
        assert_eq!(value["checks"]["functionality"]["functionality"], "FAILED");
        assert!(value["checks"].get("pod_status").is_none());
        assert_eq!(value["recommendations"].as_array().unwrap().len(), 1);

        let parsed = HealthReport::from_json(&render_json(&report).unwrap()).unwrap();
        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.checks, report.checks);
    }

    #[tokio::test]
    async fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample_report(false, None);

        save_to_file(&report, &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"overall_health\": \"UNHEALTHY\""));
    }

    #[tokio::test]
    async fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");

        assert!(save_to_file(&sample_report(false, None), &path).await.is_err());
    }
}
