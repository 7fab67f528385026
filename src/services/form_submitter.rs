//! 表单提交服务 - 业务能力层
//!
//! 只负责"提交一次查询表单并判断结果"，被拒绝后是否重试由流程层决定

use crate::config::Config;
use crate::error::{AppError, AppResult, DataShapeError, TransportError};
use crate::infrastructure::Transport;
use crate::models::{CaptchaToken, SearchCriteria};
use scraper::{Html, Selector};
use tracing::{debug, error, info, warn};

/// 出现该文本即表示查询成功，结果列表已渲染
pub const SUCCESS_MARKER: &str = "Ver Detalhes";

/// 服务器端错误提示所在的元素
const ERROR_MESSAGE_SELECTOR: &str = "span.erro";

/// 固定的表单动作标记
const FORM_ACTION: &str = "pesquisar";

/// 单次提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 查询成功，附带结果列表页 HTML
    Accepted { listing_html: String },
    /// 服务器拒绝（验证码错误、输入校验失败等），附带页面上的错误提示
    Rejected { message: Option<String> },
}

/// 表单提交服务
///
/// 职责：
/// - 组装查询参数 + 验证码并 POST
/// - 非 200 时在预算内重试，耗尽即 `TransportExhausted`
/// - 根据页面内容区分成功与被拒绝
pub struct FormSubmitter {
    submit_url: String,
    max_attempts: usize,
}

impl FormSubmitter {
    pub fn new(config: &Config) -> Self {
        Self {
            submit_url: config.submit_url.clone(),
            max_attempts: config.submit_max_attempts,
        }
    }

    /// 提交查询表单
    pub async fn submit<T: Transport>(
        &self,
        session: &T,
        criteria: &SearchCriteria,
        token: &CaptchaToken,
    ) -> AppResult<SubmissionOutcome> {
        let form = build_form(criteria, token);

        let mut last_failure = None;
        for attempt in 1..=self.max_attempts {
            match session.post_form(&self.submit_url, &form).await {
                Ok(response) if response.is_ok() => {
                    return classify_response(&response.text());
                }
                Ok(response) => {
                    debug!(
                        "表单提交返回 {} (尝试 {}/{})",
                        response.status, attempt, self.max_attempts
                    );
                    last_failure = Some(TransportError::status(&self.submit_url, response.status));
                }
                Err(e) => {
                    debug!("表单提交失败 (尝试 {}/{}): {}", attempt, self.max_attempts, e);
                    last_failure = Some(e);
                }
            }
        }

        error!("❌ 无法访问: {}", self.submit_url);
        let last = last_failure.unwrap_or_else(|| TransportError::status(&self.submit_url, 0));
        Err(AppError::transport_exhausted(
            &self.submit_url,
            self.max_attempts,
            last,
        ))
    }
}

/// 组装表单字段
pub fn build_form<'a>(criteria: &'a SearchCriteria, token: &'a CaptchaToken) -> [(&'static str, &'a str); 5] {
    [
        ("nome_razao", criteria.name.as_str()),
        ("cpf_cnpj", criteria.tax_id.as_str()),
        ("cep", criteria.postal_code.as_str()),
        ("verificador", token.as_str()),
        ("action", FORM_ACTION),
    ]
}

/// 判断 200 响应是成功还是被拒绝
pub fn classify_response(html: &str) -> AppResult<SubmissionOutcome> {
    if html.contains(SUCCESS_MARKER) {
        info!("✓ 表单提交成功");
        return Ok(SubmissionOutcome::Accepted {
            listing_html: html.to_string(),
        });
    }

    let message = extract_error_message(html)?;
    match &message {
        Some(text) => warn!("⚠️ 表单被拒绝: {}", text),
        None => warn!("⚠️ 表单被拒绝，页面上没有错误提示"),
    }
    Ok(SubmissionOutcome::Rejected { message })
}

/// 读取第一个错误提示元素的文本
pub fn extract_error_message(html: &str) -> AppResult<Option<String>> {
    let selector = Selector::parse(ERROR_MESSAGE_SELECTOR)
        .map_err(|e| DataShapeError::pattern(ERROR_MESSAGE_SELECTOR, e))?;
    let document = Html::parse_document(html);

    let message = document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty());

    Ok(message)
}
