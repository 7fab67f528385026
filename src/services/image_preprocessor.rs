//! 验证码图片预处理 - 业务能力层
//!
//! 灰度化 → 阈值过滤 → 3×3 均值模糊，输出 PNG 字节。
//! 纯函数：相同输入必然得到逐字节相同的输出。

use crate::error::DataShapeError;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;

/// 字形像素所在灰度带的上限，超过即视为背景
pub const GLYPH_BAND_MAX: u8 = 80;

const WHITE: u8 = 255;

/// 预处理验证码图片
///
/// # 参数
/// - `raw`: 服务器返回的原始图片字节（PNG / JPEG / GIF / BMP）
///
/// # 返回
/// 处理后的单通道 PNG 字节
pub fn preprocess(raw: &[u8]) -> Result<Vec<u8>, DataShapeError> {
    let decoded = image::load_from_memory(raw).map_err(DataShapeError::CaptchaDecode)?;

    let mut gray = to_gray(&decoded);
    keep_glyph_band(&mut gray);
    let blurred = box_blur_3x3(&gray);

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(blurred)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(DataShapeError::CaptchaEncode)?;
    Ok(out)
}

/// 按 BT.601 权重转灰度（定点运算，与常见视觉库的 BGR→GRAY 一致）
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted = r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868;
        Luma([((weighted + (1 << 13)) >> 14) as u8])
    })
}

/// 纯黑（噪点）和亮于 [`GLYPH_BAND_MAX`] 的像素全部置白
pub fn keep_glyph_band(image: &mut GrayImage) {
    for pixel in image.pixels_mut() {
        let value = pixel.0[0];
        if value == 0 || value > GLYPH_BAND_MAX {
            pixel.0[0] = WHITE;
        }
    }
}

/// 3×3 均值模糊，边界按 reflect-101 方式取值，结果四舍五入
pub fn box_blur_3x3(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let mut sum = 0u32;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let sx = reflect_101(x as i64 + dx, width);
                let sy = reflect_101(y as i64 + dy, height);
                sum += image.get_pixel(sx, sy).0[0] as u32;
            }
        }
        Luma([((sum + 4) / 9) as u8])
    })
}

fn reflect_101(index: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let mut i = index;
    if i < 0 {
        i = -i;
    }
    if i >= len {
        i = 2 * len - 2 - i;
    }
    i as u32
}
