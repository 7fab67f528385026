use thiserror::Error;

/// 应用程序错误类型
///
/// 只有致命或需要调用方感知的失败才会出现在这里；
/// 表单被拒绝、单个详情页失败等情况都会收敛进 `QueryResult`。
#[derive(Debug, Error)]
pub enum AppError {
    /// 会话建立或表单提交的传输重试预算耗尽
    #[error("传输重试耗尽 ({endpoint}, 共 {attempts} 次): {last}")]
    TransportExhausted {
        endpoint: String,
        attempts: usize,
        #[source]
        last: TransportError,
    },
    /// 连续多次无法识别出合法验证码
    #[error("验证码识别连续失败 {attempts} 次")]
    CaptchaExhausted { attempts: usize },
    /// 页面或图片结构与预期不符
    #[error("数据结构错误: {0}")]
    DataShape(#[from] DataShapeError),
    /// 输入记录不合法
    #[error("输入字段 {field} 不能为空")]
    InvalidInput { field: &'static str },
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件操作失败 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    /// HTTP 客户端本身出错（例如构建失败）
    #[error("HTTP错误: {0}")]
    Transport(#[from] TransportError),
    /// OCR 引擎初始化失败
    #[error("OCR错误: {0}")]
    Ocr(#[from] OcrError),
}

/// 单次 HTTP 交互失败
#[derive(Debug, Error)]
pub enum TransportError {
    /// 网络请求失败（连接、超时、读取响应体）
    #[error("请求失败 ({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回了非 200 状态码
    #[error("状态码异常 ({url}): {status}")]
    Status { url: String, status: u16 },
    /// 无法构建 HTTP 客户端
    #[error("无法构建 HTTP 客户端: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// 数据结构错误
#[derive(Debug, Error)]
pub enum DataShapeError {
    /// 列表行带有 action 属性但缺少标签单元格
    #[error("列表第 {row} 行缺少包裹标签")]
    ListingLabelMissing { row: usize },
    /// action 属性中找不到单引号包裹的追踪编码
    #[error("列表第 {row} 行的 action 属性无法解析: {action}")]
    MalformedRowAction { row: usize, action: String },
    /// 验证码图片无法解码
    #[error("验证码图片解码失败: {0}")]
    CaptchaDecode(#[source] image::ImageError),
    /// 预处理后的验证码图片无法编码
    #[error("验证码图片编码失败: {0}")]
    CaptchaEncode(#[source] image::ImageError),
    /// 内置的 CSS 选择器或正则无法编译
    #[error("匹配模式 {pattern} 无法编译: {message}")]
    Pattern {
        pattern: &'static str,
        message: String,
    },
}

/// OCR 引擎错误
#[derive(Debug, Error)]
pub enum OcrError {
    /// 引擎初始化失败
    #[error("OCR 引擎初始化失败: {0}")]
    Init(String),
    /// 识别过程失败
    #[error("OCR 识别失败: {0}")]
    Processing(String),
    /// 当前构建未启用 OCR 引擎
    #[error("当前构建未启用 `ocr` 特性")]
    Unavailable,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置项取值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// 单次验证码识别失败的原因
///
/// 不会向上传播，只用于日志区分和计数。
#[derive(Debug, Error)]
pub enum CaptchaAttemptError {
    /// 获取验证码图片失败
    #[error("获取验证码图片失败: {0}")]
    Fetch(#[source] TransportError),
    /// 图片解码或编码失败
    #[error("验证码图片处理失败: {0}")]
    Decode(#[source] DataShapeError),
    /// OCR 引擎报错
    #[error("OCR 失败: {0}")]
    Ocr(#[source] OcrError),
    /// OCR 结果不是 5 位数字
    #[error("OCR 结果格式不符: {text:?}")]
    Format { text: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件操作错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 创建传输重试耗尽错误
    pub fn transport_exhausted(
        endpoint: impl Into<String>,
        attempts: usize,
        last: TransportError,
    ) -> Self {
        AppError::TransportExhausted {
            endpoint: endpoint.into(),
            attempts,
            last,
        }
    }

    /// 是否是可以通过重启流水线恢复的错误
    pub fn is_restartable(&self) -> bool {
        matches!(self, AppError::CaptchaExhausted { .. })
    }
}

impl TransportError {
    /// 包装 reqwest 错误并记录 URL
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        TransportError::Request {
            url: url.into(),
            source,
        }
    }

    /// 创建状态码异常错误
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        TransportError::Status {
            url: url.into(),
            status,
        }
    }
}

impl DataShapeError {
    /// 创建匹配模式编译错误
    pub fn pattern(pattern: &'static str, message: impl ToString) -> Self {
        DataShapeError::Pattern {
            pattern,
            message: message.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
