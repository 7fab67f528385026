//! HTTP 会话 - 基础设施层
//!
//! 持有一次查询执行独占的 HTTP 上下文（Cookie + 请求头），只暴露"发请求"的能力

use crate::config::Config;
use crate::error::TransportError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use tracing::{debug, warn};

/// 一次 HTTP 交互的结果（任意状态码）
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// 按 UTF-8 解码响应体，非法字节替换为 U+FFFD
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 会话能力
///
/// 职责：
/// - 在多次请求之间保持 Cookie 和请求头
/// - 只负责传输，不判断状态码含义
/// - 不认识验证码 / 表单 / 包裹
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// 原地设置一个请求头，后续所有请求都会带上
    fn set_header(&mut self, name: &str, value: &str);
}

/// 为每次执行创建一个全新的会话
pub trait SessionFactory {
    type Session: Transport;

    fn open(&self) -> Result<Self::Session, TransportError>;
}

/// 基于 reqwest 的会话实现
pub struct HttpSession {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl HttpSession {
    /// 创建新的会话（启用 Cookie 存储和请求超时）
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()
            .map_err(TransportError::ClientBuild)?;

        Ok(Self {
            client,
            headers: HeaderMap::new(),
        })
    }

    /// 当前请求头（只读）
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::request(url, e))?;
        debug!("{} -> {} ({} 字节)", url, status, body.len());
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

impl Transport for HttpSession {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| TransportError::request(url, e))?;
        Self::read(url, response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| TransportError::request(url, e))?;
        Self::read(url, response).await
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!("忽略非法请求头: {}: {}", name, value),
        }
    }
}

/// 使用同一份配置创建 [`HttpSession`]
#[derive(Clone)]
pub struct HttpSessionFactory {
    config: Config,
}

impl HttpSessionFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    fn open(&self) -> Result<HttpSession, TransportError> {
        HttpSession::new(&self.config)
    }
}
