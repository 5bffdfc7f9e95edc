use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme::Theme;

/// 表单左上角常驻的快捷键说明
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("Tab / Shift+Tab", "next / previous item"),
    ("Ctrl+T", "switch form / comments"),
    ("Ctrl+\\ or Ctrl+U", "clear current input"),
    ("Space", "toggle crop"),
    ("Ctrl+S", "save"),
    ("Esc / Ctrl+Q", "quit without saving"),
    ("Ctrl+L", "show logs"),
];

/// 快捷键框所需高度（含边框）
pub fn height() -> u16 {
    SHORTCUTS.len() as u16 + 2
}

pub fn render(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = SHORTCUTS
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!(" {key:<18}"), Theme::active()),
                Span::raw(*desc),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border(false))
        .title(Span::styled(" keyboard shortcuts ", Theme::title()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
