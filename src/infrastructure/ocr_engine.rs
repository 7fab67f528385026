use crate::config::Config;
use crate::error::OcrError;

/// OCR 能力：输入图片字节，输出识别出的原始文本
///
/// 不做任何格式校验，校验由验证码服务负责。
pub trait OcrEngine {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for &T {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

/// Tesseract OCR 引擎
/// 仅在启用 `ocr` 特性时可用。
#[cfg(feature = "ocr")]
pub struct TesseractEngine {
    tessdata_dir: Option<String>,
    language: String,
}

#[cfg(feature = "ocr")]
impl TesseractEngine {
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        if let Some(dir) = &config.tessdata_dir {
            if !std::path::Path::new(dir).is_dir() {
                return Err(OcrError::Init(format!("tessdata 目录不存在: {dir}")));
            }
        }
        Ok(Self {
            tessdata_dir: config.tessdata_dir.clone(),
            language: config.ocr_language.clone(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractEngine {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let tess = tesseract::Tesseract::new(self.tessdata_dir.as_deref(), Some(self.language.as_str()))
            .map_err(|e| OcrError::Init(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| OcrError::Processing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| OcrError::Processing(format!("{e:?}")))
    }
}

/// 当前构建使用的 OCR 引擎类型
#[cfg(feature = "ocr")]
pub type DefaultEngine = TesseractEngine;
#[cfg(not(feature = "ocr"))]
pub type DefaultEngine = UnavailableEngine;

/// 根据构建特性创建默认 OCR 引擎
#[cfg(feature = "ocr")]
pub fn default_engine(config: &Config) -> Result<DefaultEngine, OcrError> {
    TesseractEngine::new(config)
}

#[cfg(not(feature = "ocr"))]
pub fn default_engine(_config: &Config) -> Result<DefaultEngine, OcrError> {
    Err(OcrError::Unavailable)
}

/// 未启用 `ocr` 特性时的占位引擎，任何识别都会失败
#[cfg(not(feature = "ocr"))]
pub struct UnavailableEngine;

#[cfg(not(feature = "ocr"))]
impl OcrEngine for UnavailableEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::Unavailable)
    }
}
