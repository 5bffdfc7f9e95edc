use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};

/// 裁剪和最终封面统一使用的输出格式
pub const OUTPUT_MIME: &str = "image/png";

/// 居中裁剪为正方形，边长取宽高较小值。
///
/// 起点为 `((w - side) / 2, (h - side) / 2)`，整数除法向下取整，
/// 奇数余量时窗口偏向左上。
pub fn crop_square(img: &DynamicImage) -> Result<DynamicImage> {
    let (w, h) = (img.width(), img.height());
    let side = w.min(h);
    if side == 0 {
        return Err(Error::Crop(format!("图片尺寸为 {w}x{h}")));
    }
    let x = (w - side) / 2;
    let y = (h - side) / 2;
    Ok(img.crop_imm(x, y, side, side))
}

/// 重新编码为 PNG
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(Error::Decode)?;
    Ok(buf.into_inner())
}
