use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 程序配置
///
/// 显式传入各层构造函数，不存在进程级的全局配置表。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 查询名称（写入结果记录和输出路径）
    pub query_name: String,
    /// 查询版本
    pub query_version: String,
    // --- 目标站点 ---
    pub start_url: String,
    pub captcha_image_url: String,
    pub user_agent: String,
    pub submit_url: String,
    pub tracking_detail_url_prefix: String,
    /// 单个请求超时（秒）
    pub request_timeout_seconds: u64,
    /// 提交表单前追加的 Accept-Language 头
    pub accept_language: String,
    // --- 重试预算 ---
    pub bootstrap_max_attempts: usize,
    pub bootstrap_retry_delay_ms: u64,
    pub captcha_max_attempts: usize,
    pub submit_max_attempts: usize,
    pub max_rejections: usize,
    pub restart_delay_ms: u64,
    pub max_restarts: usize,
    // --- 批处理 ---
    /// 输入记录（TOML）存放目录
    pub input_folder: String,
    /// 结果输出根目录
    pub output_root: String,
    /// 同时执行的查询数量
    pub max_concurrent_queries: usize,
    // --- OCR ---
    pub tessdata_dir: Option<String>,
    pub ocr_language: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_name: "PES014".to_string(),
            query_version: "0.1.0".to_string(),
            start_url: "http://tracking.totalexpress.com.br/tracking/0?cpf_cnpj".to_string(),
            captcha_image_url: "http://tracking.totalexpress.com.br/images/imagem_verifica.php"
                .to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36".to_string(),
            submit_url: "http://tracking.totalexpress.com.br/tracking/0".to_string(),
            tracking_detail_url_prefix:
                "http://tracking.totalexpress.com.br/tracking_encomenda.php?code=".to_string(),
            request_timeout_seconds: 15,
            accept_language: "en-US,en;q=0.9,pt-BR,es".to_string(),
            bootstrap_max_attempts: 21,
            bootstrap_retry_delay_ms: 500,
            captcha_max_attempts: 20,
            submit_max_attempts: 21,
            max_rejections: 3,
            restart_delay_ms: 5000,
            max_restarts: 1,
            input_folder: "input_toml".to_string(),
            output_root: ".".to_string(),
            max_concurrent_queries: 1,
            tessdata_dir: None,
            ocr_language: "eng".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，无法解析的值回退到默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            query_name: std::env::var("QUERY_NAME").unwrap_or(default.query_name),
            query_version: std::env::var("QUERY_VERSION").unwrap_or(default.query_version),
            start_url: std::env::var("START_URL").unwrap_or(default.start_url),
            captcha_image_url: std::env::var("CAPTCHA_IMAGE_URL").unwrap_or(default.captcha_image_url),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            submit_url: std::env::var("SUBMIT_URL").unwrap_or(default.submit_url),
            tracking_detail_url_prefix: std::env::var("TRACKING_DETAIL_URL_PREFIX").unwrap_or(default.tracking_detail_url_prefix),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_seconds),
            accept_language: std::env::var("ACCEPT_LANGUAGE").unwrap_or(default.accept_language),
            bootstrap_max_attempts: std::env::var("BOOTSTRAP_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.bootstrap_max_attempts),
            bootstrap_retry_delay_ms: std::env::var("BOOTSTRAP_RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.bootstrap_retry_delay_ms),
            captcha_max_attempts: std::env::var("CAPTCHA_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.captcha_max_attempts),
            submit_max_attempts: std::env::var("SUBMIT_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.submit_max_attempts),
            max_rejections: std::env::var("MAX_REJECTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_rejections),
            restart_delay_ms: std::env::var("RESTART_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.restart_delay_ms),
            max_restarts: std::env::var("MAX_RESTARTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_restarts),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_root: std::env::var("OUTPUT_ROOT").unwrap_or(default.output_root),
            max_concurrent_queries: std::env::var("MAX_CONCURRENT_QUERIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_queries),
            tessdata_dir: std::env::var("TESSDATA_DIR").ok().or(default.tessdata_dir),
            ocr_language: std::env::var("OCR_LANGUAGE").unwrap_or(default.ocr_language),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从环境变量读取配置，数值或布尔变量无法解析时报错
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file(path.display().to_string(), e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            })?;
        Ok(config)
    }

    /// 检查配置是否可以用于执行查询
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("start_url", &self.start_url),
            ("captcha_image_url", &self.captcha_image_url),
            ("submit_url", &self.submit_url),
            ("tracking_detail_url_prefix", &self.tracking_detail_url_prefix),
        ];
        for (field, value) in urls {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "URL 不能为空".to_string(),
                });
            }
        }

        let budgets = [
            ("bootstrap_max_attempts", self.bootstrap_max_attempts),
            ("captcha_max_attempts", self.captcha_max_attempts),
            ("submit_max_attempts", self.submit_max_attempts),
            ("max_rejections", self.max_rejections),
            ("max_concurrent_queries", self.max_concurrent_queries),
        ];
        for (field, value) in budgets {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "必须大于 0".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn bootstrap_retry_delay(&self) -> Duration {
        Duration::from_millis(self.bootstrap_retry_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let text = |name: &str, target: &mut String| {
            if let Some(value) = lookup(name) {
                *target = value;
            }
        };
        text("QUERY_NAME", &mut config.query_name);
        text("QUERY_VERSION", &mut config.query_version);
        text("START_URL", &mut config.start_url);
        text("CAPTCHA_IMAGE_URL", &mut config.captcha_image_url);
        text("USER_AGENT", &mut config.user_agent);
        text("SUBMIT_URL", &mut config.submit_url);
        text("TRACKING_DETAIL_URL_PREFIX", &mut config.tracking_detail_url_prefix);
        text("ACCEPT_LANGUAGE", &mut config.accept_language);
        text("INPUT_FOLDER", &mut config.input_folder);
        text("OUTPUT_ROOT", &mut config.output_root);
        text("OCR_LANGUAGE", &mut config.ocr_language);
        if let Some(dir) = lookup("TESSDATA_DIR") {
            config.tessdata_dir = Some(dir);
        }

        parse_var(&lookup, "REQUEST_TIMEOUT_SECONDS", "u64", &mut config.request_timeout_seconds)?;
        parse_var(&lookup, "BOOTSTRAP_MAX_ATTEMPTS", "usize", &mut config.bootstrap_max_attempts)?;
        parse_var(&lookup, "BOOTSTRAP_RETRY_DELAY_MS", "u64", &mut config.bootstrap_retry_delay_ms)?;
        parse_var(&lookup, "CAPTCHA_MAX_ATTEMPTS", "usize", &mut config.captcha_max_attempts)?;
        parse_var(&lookup, "SUBMIT_MAX_ATTEMPTS", "usize", &mut config.submit_max_attempts)?;
        parse_var(&lookup, "MAX_REJECTIONS", "usize", &mut config.max_rejections)?;
        parse_var(&lookup, "RESTART_DELAY_MS", "u64", &mut config.restart_delay_ms)?;
        parse_var(&lookup, "MAX_RESTARTS", "usize", &mut config.max_restarts)?;
        parse_var(&lookup, "MAX_CONCURRENT_QUERIES", "usize", &mut config.max_concurrent_queries)?;
        parse_var(&lookup, "VERBOSE_LOGGING", "bool", &mut config.verbose_logging)?;

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup(var_name) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: value.clone(),
                expected_type: expected_type.to_string(),
            })?;
    }
    Ok(())
}
