//! 应用内容校验
//!
//! 独立于连通性探测，再发起一次GET请求并检查响应体中的特征内容。
//! 4xx/5xx 响应视为请求失败。

use crate::error::{ProbeError, Result};
use crate::health::result::{Functionality, FunctionalityOutcome};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;

/// 响应体中检测到的特征标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentMarkers {
    pub fortune: bool,
    pub cow: bool,
    pub html_format: bool,
}

impl ContentMarkers {
    /// 在响应体中查找特征标记（不区分大小写）
    pub fn scan(body: &str) -> Self {
        let body = body.to_lowercase();
        Self {
            fortune: body.contains("fortune"),
            cow: body.contains("cow") || body.contains("moo"),
            html_format: body.contains("<pre>") && body.contains("</pre>"),
        }
    }

    pub fn all_present(&self) -> bool {
        self.fortune && self.cow && self.html_format
    }
}

/// 根据状态码和特征标记判断功能状态
pub fn classify(status_code: u16, markers: &ContentMarkers) -> Functionality {
    if status_code == 200 && markers.all_present() {
        Functionality::Healthy
    } else {
        Functionality::Degraded
    }
}

/// 内容校验器
pub struct ContentValidator {
    client: Client,
    timeout: Duration,
}

impl ContentValidator {
    /// 创建新的内容校验器
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}-content/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(ProbeError::ClientBuild)?;

        Ok(Self { client, timeout })
    }

    /// 执行内容校验
    pub async fn validate(&self, url: &str) -> FunctionalityOutcome {
        match timeout(self.timeout, self.fetch(url)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => FunctionalityOutcome::failed(e.to_string()),
            Err(_) => FunctionalityOutcome::failed("request timed out".to_string()),
        }
    }

    async fn fetch(&self, url: &str) -> std::result::Result<FunctionalityOutcome, reqwest::Error> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Ok(FunctionalityOutcome::failed(format!(
                "HTTP Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let status_code = status.as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let bytes = response.bytes().await?;
        // 非法字节替换掉，不视为错误
        let body = String::from_utf8_lossy(&bytes);
        let markers = ContentMarkers::scan(&body);

        Ok(FunctionalityOutcome {
            http_status: Some(status_code),
            response_size: Some(body.len()),
            content_type: Some(content_type),
            fortune_detected: Some(markers.fortune),
            cow_detected: Some(markers.cow),
            html_format_detected: Some(markers.html_format),
            functionality: classify(status_code, &markers),
            error: None,
        })
    }
}
