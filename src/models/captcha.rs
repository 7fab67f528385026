use std::fmt::Display;

/// 验证码长度
pub const CAPTCHA_LENGTH: usize = 5;

/// 通过校验的验证码：恰好 5 个 ASCII 数字
///
/// 只能通过 [`CaptchaToken::parse`] 构造，因此任何持有该类型的地方都满足这一约束。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaToken(String);

impl CaptchaToken {
    /// 校验 OCR 输出，去掉首尾空白后必须是 5 位数字
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.chars().count() == CAPTCHA_LENGTH && text.chars().all(|c| c.is_ascii_digit()) {
            Some(Self(text.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CaptchaToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_five_digits() {
        let token = CaptchaToken::parse("12345").unwrap();
        assert_eq!(token.as_str(), "12345");
    }

    #[test]
    fn test_trims_ocr_trailing_noise() {
        let token = CaptchaToken::parse("  04210\n\x0c").unwrap();
        assert_eq!(token.as_str(), "04210");
    }

    #[test]
    fn test_rejects_non_numeric_and_wrong_length() {
        assert!(CaptchaToken::parse("12a45").is_none());
        assert!(CaptchaToken::parse("1234").is_none());
        assert!(CaptchaToken::parse("123456").is_none());
        assert!(CaptchaToken::parse("12 45").is_none());
        assert!(CaptchaToken::parse("").is_none());
        // 全角数字不是 ASCII 数字
        assert!(CaptchaToken::parse("１２３４５").is_none());
    }
}
