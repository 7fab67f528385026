//! 会话建立服务 - 业务能力层

use crate::config::Config;
use crate::error::{AppError, AppResult, TransportError};
use crate::infrastructure::Transport;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// 会话建立服务
///
/// 职责：
/// - 设置固定 User-Agent 并访问起始页，拿到站点 Cookie
/// - 非 200 或网络错误时等待后重试
/// - 预算耗尽后返回 `TransportExhausted`，不做空结果兜底
pub struct SessionBootstrapper {
    start_url: String,
    user_agent: String,
    max_attempts: usize,
    retry_delay: Duration,
}

impl SessionBootstrapper {
    pub fn new(config: &Config) -> Self {
        Self {
            start_url: config.start_url.clone(),
            user_agent: config.user_agent.clone(),
            max_attempts: config.bootstrap_max_attempts,
            retry_delay: config.bootstrap_retry_delay(),
        }
    }

    /// 建立会话
    ///
    /// # 返回
    /// 成功时会话已带上起始页下发的 Cookie
    pub async fn bootstrap<T: Transport>(&self, session: &mut T) -> AppResult<()> {
        session.set_header("User-Agent", &self.user_agent);

        let mut last_failure = None;
        for attempt in 1..=self.max_attempts {
            let failure = match session.get(&self.start_url).await {
                Ok(response) if response.is_ok() => {
                    info!("✓ 会话建立成功 (第 {} 次)", attempt);
                    return Ok(());
                }
                Ok(response) => TransportError::status(&self.start_url, response.status),
                Err(e) => e,
            };

            warn!(
                "起始页访问失败 (尝试 {}/{}): {}",
                attempt, self.max_attempts, failure
            );
            last_failure = Some(failure);

            if attempt < self.max_attempts {
                sleep(self.retry_delay).await;
            }
        }

        let last = last_failure
            .unwrap_or_else(|| TransportError::status(&self.start_url, 0));
        Err(AppError::transport_exhausted(
            &self.start_url,
            self.max_attempts,
            last,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::HttpResponse;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StartPage {
        statuses: Mutex<VecDeque<u16>>,
        gets: Mutex<usize>,
        headers: Vec<(String, String)>,
    }

    impl Transport for StartPage {
        async fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
            *self.gets.lock().unwrap() += 1;
            let status = self.statuses.lock().unwrap().pop_front().unwrap_or(503);
            Ok(HttpResponse::new(status, Vec::new()))
        }

        async fn post_form(
            &self,
            url: &str,
            _form: &[(&str, &str)],
        ) -> Result<HttpResponse, TransportError> {
            Err(TransportError::status(url, 405))
        }

        fn set_header(&mut self, name: &str, value: &str) {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    fn bootstrapper() -> SessionBootstrapper {
        SessionBootstrapper::new(&Config {
            bootstrap_retry_delay_ms: 0,
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let mut page = StartPage {
            statuses: Mutex::new(vec![500, 502, 200].into()),
            ..Default::default()
        };

        bootstrapper().bootstrap(&mut page).await.unwrap();

        assert_eq!(*page.gets.lock().unwrap(), 3);
        assert_eq!(page.headers[0].0, "User-Agent");
        assert!(page.headers[0].1.contains("Chrome/74"));
    }

    #[tokio::test]
    async fn test_never_exceeds_twenty_one_attempts() {
        let mut page = StartPage::default();

        let err = bootstrapper().bootstrap(&mut page).await.unwrap_err();

        assert_eq!(*page.gets.lock().unwrap(), 21);
        match err {
            AppError::TransportExhausted { attempts, last, .. } => {
                assert_eq!(attempts, 21);
                assert!(matches!(last, TransportError::Status { status: 503, .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
