use ratatui::layout::Rect;

/// 计算在 `max_w × max_h` 个 cell 内按原比例放下一张 `img_w × img_h` 图片所需的 cell 数。
///
/// `fw`/`fh` 为单个 cell 的像素宽高，结果至少为 1×1。
pub fn fit_cells(max_w: u16, max_h: u16, img_w: u32, img_h: u32, fw: u16, fh: u16) -> (u16, u16) {
    if max_w == 0 || max_h == 0 || img_w == 0 || img_h == 0 || fw == 0 || fh == 0 {
        return (max_w.min(1), max_h.min(1));
    }
    let box_w = f64::from(max_w) * f64::from(fw);
    let box_h = f64::from(max_h) * f64::from(fh);
    let scale = (box_w / f64::from(img_w)).min(box_h / f64::from(img_h));

    let w = (f64::from(img_w) * scale / f64::from(fw)).floor() as u16;
    let h = (f64::from(img_h) * scale / f64::from(fh)).floor() as u16;
    (w.clamp(1, max_w), h.clamp(1, max_h))
}

/// 在 area 中居中放置 w × h 的矩形
pub fn centered(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width);
    let h = h.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_image_fills_pixel_square() {
        // 8x16 的 cell：20 列 × 10 行 = 160 × 160 像素
        assert_eq!(fit_cells(40, 10, 512, 512, 8, 16), (20, 10));
    }

    #[test]
    fn wide_image_is_limited_by_width() {
        assert_eq!(fit_cells(20, 40, 256, 128, 8, 16), (20, 5));
    }

    #[test]
    fn degenerate_inputs_stay_inside_the_box() {
        assert_eq!(fit_cells(0, 5, 10, 10, 8, 16), (0, 1));
        assert_eq!(fit_cells(5, 5, 0, 10, 8, 16), (1, 1));
        assert_eq!(fit_cells(4, 3, 64, 1, 8, 16), (4, 1));
    }

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(2, 4, 10, 6);
        assert_eq!(centered(area, 4, 2), Rect::new(5, 6, 4, 2));
        assert_eq!(centered(area, 40, 20), area);
    }
}
