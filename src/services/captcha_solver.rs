//! 验证码识别服务 - 业务能力层
//!
//! 只负责"拿到一个合法验证码"的能力，不关心拿到之后做什么

use crate::config::Config;
use crate::error::{AppError, AppResult, CaptchaAttemptError, TransportError};
use crate::infrastructure::{OcrEngine, ScratchSpace, Transport};
use crate::models::CaptchaToken;
use crate::services::image_preprocessor;
use tracing::{debug, info, warn};

/// 验证码识别服务
///
/// 职责：
/// - 通过已有会话下载验证码图片
/// - 预处理 + OCR + 格式校验
/// - 在预算内重试，耗尽后报告 `CaptchaExhausted`
pub struct CaptchaSolver<E> {
    engine: E,
    captcha_url: String,
    max_attempts: usize,
}

impl<E: OcrEngine> CaptchaSolver<E> {
    pub fn new(engine: E, config: &Config) -> Self {
        Self {
            engine,
            captcha_url: config.captcha_image_url.clone(),
            max_attempts: config.captcha_max_attempts,
        }
    }

    /// 连续尝试识别验证码
    ///
    /// # 返回
    /// 第一个通过校验的验证码；预算内全部失败则返回 `AppError::CaptchaExhausted`
    pub async fn solve<T: Transport>(
        &self,
        session: &T,
        scratch: &ScratchSpace,
    ) -> AppResult<CaptchaToken> {
        for attempt in 1..=self.max_attempts {
            match self.solve_once(session, scratch, attempt).await {
                Ok(token) => {
                    info!("✓ 验证码识别成功: {} (第 {} 次)", token, attempt);
                    return Ok(token);
                }
                Err(CaptchaAttemptError::Format { text }) => {
                    debug!(
                        "验证码格式不符 (尝试 {}/{}): {:?}",
                        attempt, self.max_attempts, text
                    );
                }
                Err(e @ CaptchaAttemptError::Fetch(_)) => {
                    warn!("验证码下载失败 (尝试 {}/{}): {}", attempt, self.max_attempts, e);
                }
                Err(e @ CaptchaAttemptError::Decode(_)) => {
                    warn!("验证码图片无效 (尝试 {}/{}): {}", attempt, self.max_attempts, e);
                }
                Err(e @ CaptchaAttemptError::Ocr(_)) => {
                    warn!("OCR 引擎出错 (尝试 {}/{}): {}", attempt, self.max_attempts, e);
                }
            }
        }

        Err(AppError::CaptchaExhausted {
            attempts: self.max_attempts,
        })
    }

    /// 单次识别：下载 → 预处理 → OCR → 校验
    pub async fn solve_once<T: Transport>(
        &self,
        session: &T,
        scratch: &ScratchSpace,
        attempt: usize,
    ) -> Result<CaptchaToken, CaptchaAttemptError> {
        let response = session
            .get(&self.captcha_url)
            .await
            .map_err(CaptchaAttemptError::Fetch)?;
        if !response.is_ok() {
            return Err(CaptchaAttemptError::Fetch(TransportError::status(
                &self.captcha_url,
                response.status,
            )));
        }

        keep_copy(scratch, &format!("captcha-{attempt}.img"), &response.body);

        let refined =
            image_preprocessor::preprocess(&response.body).map_err(CaptchaAttemptError::Decode)?;

        keep_copy(scratch, &format!("captcha-{attempt}-refined.png"), &refined);

        let text = self
            .engine
            .recognize(&refined)
            .map_err(CaptchaAttemptError::Ocr)?;

        CaptchaToken::parse(&text).ok_or(CaptchaAttemptError::Format { text })
    }
}

/// 验证码副本只用于排查，写入失败不影响识别
fn keep_copy(scratch: &ScratchSpace, file_name: &str, bytes: &[u8]) {
    match scratch.write(file_name, bytes) {
        Ok(path) => debug!("验证码图片已保存: {}", path.display()),
        Err(e) => warn!("验证码图片保存失败: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::infrastructure::HttpResponse;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Mutex;

    struct ImageServer {
        responses: Mutex<VecDeque<HttpResponse>>,
        gets: Mutex<usize>,
    }

    impl ImageServer {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                gets: Mutex::new(0),
            }
        }

        fn gets(&self) -> usize {
            *self.gets.lock().unwrap()
        }
    }

    impl Transport for ImageServer {
        async fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
            *self.gets.lock().unwrap() += 1;
            let next = self.responses.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| HttpResponse::new(200, png())))
        }

        async fn post_form(
            &self,
            url: &str,
            _form: &[(&str, &str)],
        ) -> Result<HttpResponse, TransportError> {
            Err(TransportError::status(url, 405))
        }

        fn set_header(&mut self, _name: &str, _value: &str) {}
    }

    struct ScriptedOcr {
        outputs: Mutex<VecDeque<Result<String, OcrError>>>,
    }

    impl ScriptedOcr {
        fn new(outputs: Vec<Result<&str, OcrError>>) -> Self {
            Self {
                outputs: Mutex::new(
                    outputs
                        .into_iter()
                        .map(|o| o.map(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    impl OcrEngine for ScriptedOcr {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("?????".to_string()))
        }
    }

    fn png() -> Vec<u8> {
        let img = GrayImage::from_pixel(10, 4, Luma([40]));
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn solver(outputs: Vec<Result<&str, OcrError>>, max_attempts: usize) -> CaptchaSolver<ScriptedOcr> {
        let config = Config {
            captcha_max_attempts: max_attempts,
            ..Config::default()
        };
        CaptchaSolver::new(ScriptedOcr::new(outputs), &config)
    }

    #[tokio::test]
    async fn test_non_numeric_output_triggers_new_fetch() {
        let server = ImageServer::new(vec![]);
        let scratch = ScratchSpace::new().unwrap();
        let solver = solver(vec![Ok("12a45"), Ok("12345\n")], 20);

        let token = solver.solve(&server, &scratch).await.unwrap();

        assert_eq!(token.as_str(), "12345");
        assert_eq!(server.gets(), 2);
    }

    #[tokio::test]
    async fn test_every_failure_kind_counts_toward_budget() {
        let server = ImageServer::new(vec![
            HttpResponse::new(500, Vec::new()),
            HttpResponse::new(200, b"not an image".to_vec()),
        ]);
        let scratch = ScratchSpace::new().unwrap();
        let solver = solver(
            vec![Err(OcrError::Processing("boom".to_string())), Ok("1234")],
            4,
        );

        let err = solver.solve(&server, &scratch).await.unwrap_err();

        assert!(matches!(err, AppError::CaptchaExhausted { attempts: 4 }));
        assert_eq!(server.gets(), 4);
    }

    #[tokio::test]
    async fn test_solve_once_distinguishes_failure_kinds() {
        let server = ImageServer::new(vec![
            HttpResponse::new(404, Vec::new()),
            HttpResponse::new(200, b"garbage".to_vec()),
        ]);
        let scratch = ScratchSpace::new().unwrap();
        let solver = solver(vec![Ok("abcde")], 20);

        assert!(matches!(
            solver.solve_once(&server, &scratch, 1).await,
            Err(CaptchaAttemptError::Fetch(TransportError::Status { status: 404, .. }))
        ));
        assert!(matches!(
            solver.solve_once(&server, &scratch, 2).await,
            Err(CaptchaAttemptError::Decode(_))
        ));
        match solver.solve_once(&server, &scratch, 3).await {
            Err(CaptchaAttemptError::Format { text }) => assert_eq!(text, "abcde"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attempt_images_land_in_scratch_space() {
        let server = ImageServer::new(vec![]);
        let scratch = ScratchSpace::new().unwrap();
        let solver = solver(vec![Ok("54321")], 20);

        solver.solve(&server, &scratch).await.unwrap();

        assert!(scratch.path().join("captcha-1.img").exists());
        assert!(scratch.path().join("captcha-1-refined.png").exists());
    }
}
