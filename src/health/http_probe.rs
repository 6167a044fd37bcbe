//! HTTP连通性探测
//!
//! 对目标地址发起一次GET请求，记录耗时并对结果分类。任何HTTP响应
//! （包括非2xx状态码）都算探测成功。

use crate::error::{ProbeError, Result};
use crate::health::result::HttpOutcome;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// HTTP连通性探测器
pub struct HttpProbe {
    /// HTTP客户端
    client: Client,
    /// 超时时间
    timeout: Duration,
}

impl HttpProbe {
    /// 创建新的探测器
    ///
    /// # 参数
    /// * `timeout` - 请求超时时间
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(ProbeError::ClientBuild)?;

        Ok(Self { client, timeout })
    }

    /// 执行一次探测，不重试
    pub async fn probe(&self, url: &str) -> HttpOutcome {
        let start_time = Instant::now();

        let response_result = timeout(self.timeout, self.client.get(url).send()).await;

        match response_result {
            Ok(Ok(response)) => {
                let latency = start_time.elapsed().as_secs_f64();
                HttpOutcome::responded(response.status().as_u16(), latency)
            }
            Ok(Err(e)) => classify_transport_error(&e),
            Err(_) => HttpOutcome::timed_out(),
        }
    }
}

/// 对传输层错误分类
fn classify_transport_error(error: &reqwest::Error) -> HttpOutcome {
    if error.is_timeout() {
        HttpOutcome::timed_out()
    } else if error.is_connect() || error.is_request() || error.is_redirect() {
        HttpOutcome::failed(format!("URL_ERROR: {error}"))
    } else {
        HttpOutcome::failed(format!("REQUEST_ERROR: {error}"))
    }
}
