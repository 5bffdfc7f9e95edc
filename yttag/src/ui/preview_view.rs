use ratatui::{
    Frame,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Paragraph},
};
use ratatui_image::{StatefulImage, protocol::StatefulProtocol};

use super::theme::Theme;
use super::util::{centered, fit_cells};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// 右侧封面预览框
pub fn render(
    frame: &mut Frame,
    area: Rect,
    protocol: Option<&mut StatefulProtocol>,
    image_size: Option<(u32, u32)>,
    font_size: (u16, u16),
    loading: bool,
    tick: u16,
) {
    let title = if loading {
        format!(" cover preview {} ", SPINNER[tick as usize % SPINNER.len()])
    } else {
        " cover preview ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border(false))
        .title(Span::styled(title, Theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match (protocol, image_size) {
        (Some(protocol), Some((w, h))) => {
            let (fw, fh) = font_size;
            let (cw, ch) = fit_cells(inner.width, inner.height, w, h, fw, fh);
            let image = StatefulImage::new(None);
            frame.render_stateful_widget(image, centered(inner, cw, ch), protocol);
        }
        _ => {
            let hint = if loading { "  loading..." } else { "  no cover" };
            frame.render_widget(
                Paragraph::new(Span::styled(hint, Theme::secondary())),
                inner,
            );
        }
    }
}
