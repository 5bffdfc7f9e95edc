use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use yttag_core::Field;

use super::input::{TextInput, build_input_line};
use super::theme::Theme;

/// 标签列宽度，按最长的 "cover (filename/url)" 对齐
const LABEL_WIDTH: usize = 20;

/// 渲染表单所需的只读视图
pub struct FormView<'a> {
    pub heading: &'a str,
    pub fields: &'a [(Field, &'a TextInput)],
    /// 当前选中的文本字段（选中复选框或按钮时为 None）
    pub focused_field: Option<Field>,
    pub crop_checked: bool,
    pub crop_focused: bool,
    pub save_focused: bool,
    pub cancel_focused: bool,
    pub active: bool,
}

/// 表单框高度：字段 + 复选框 + 空行 + 按钮 + 边框
pub fn height(field_count: usize) -> u16 {
    field_count as u16 + 5
}

pub fn render(frame: &mut Frame, area: Rect, view: &FormView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border(view.active))
        .title(Span::styled(
            format!(" audio metadata · {} ", view.heading),
            Theme::title(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines: Vec<Line> = view
        .fields
        .iter()
        .map(|(field, input)| {
            build_input_line(
                field.label(),
                LABEL_WIDTH,
                input,
                view.active && view.focused_field == Some(*field),
                width,
            )
        })
        .collect();

    let check = if view.crop_checked { "[x]" } else { "[ ]" };
    let crop_style = if view.active && view.crop_focused {
        Theme::highlight()
    } else {
        Theme::secondary()
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{:<LABEL_WIDTH$} ", "crop to square"), crop_style),
        Span::styled(format!("  {check}"), crop_style),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 3)),
        Span::styled(" save ", Theme::button(view.active && view.save_focused)),
        Span::raw("  "),
        Span::styled(" cancel ", Theme::button(view.active && view.cancel_focused)),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// 封面输入框下方的补全下拉，覆盖在后面的内容上
pub fn render_suggestions(
    frame: &mut Frame,
    form_area: Rect,
    row: u16,
    items: &[String],
    selected: Option<usize>,
) {
    if items.is_empty() {
        return;
    }
    let x = form_area.x + 1 + LABEL_WIDTH as u16 + 3;
    let y = form_area.y + 1 + row + 1;
    let frame_area = frame.area();
    if x >= frame_area.right() || y >= frame_area.bottom() {
        return;
    }
    let width = form_area.right().saturating_sub(x + 1).max(10).min(frame_area.right() - x);
    let height = (items.len() as u16 + 2).min(frame_area.bottom() - y);
    let area = Rect::new(x, y, width, height);

    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if Some(i) == selected {
                Theme::selected_row()
            } else {
                Theme::secondary()
            };
            ListItem::new(item.as_str()).style(style)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        List::new(list_items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border(true)),
        ),
        area,
    );
}
