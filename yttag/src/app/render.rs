use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::Span,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use yttag_core::{Field, PreviewPhase};

use crate::ui::form_view::{self, FormView};
use crate::ui::theme::Theme;

use super::{Focus, FormApp, FormItem};

impl FormApp {
    pub(crate) fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[0]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(crate::ui::help::height()),
                Constraint::Length(form_view::height(Field::ALL.len())),
                Constraint::Min(3),
            ])
            .split(cols[0]);

        crate::ui::help::render(frame, left[0]);
        self.render_form(frame, left[1]);
        self.render_comments(frame, left[2]);
        self.render_preview(frame, cols[1]);
        crate::ui::log_view::render_status(frame, chunks[1], &self.logs);

        // 下拉要盖在注释框上，最后画
        if self.focus == Focus::Form
            && self.current_item() == FormItem::Text(Field::CoverSource)
        {
            let row = Field::ALL.len() as u16 - 1;
            form_view::render_suggestions(
                frame,
                left[1],
                row,
                &self.suggestions.items,
                self.suggestions.selected,
            );
        }

        if self.show_logs {
            crate::ui::log_view::render(frame, frame.area(), &self.logs);
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let item = self.current_item();
        let fields: Vec<_> = Field::ALL.iter().map(|f| (*f, self.input(*f))).collect();
        let view = FormView {
            heading: &self.heading,
            fields: &fields,
            focused_field: match item {
                FormItem::Text(f) => Some(f),
                _ => None,
            },
            crop_checked: self.crop_checked,
            crop_focused: item == FormItem::Crop,
            save_focused: item == FormItem::Save,
            cancel_focused: item == FormItem::Cancel,
            active: self.focus == Focus::Form,
        };
        form_view::render(frame, area, &view);
    }

    fn render_comments(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border(self.focus == Focus::Comments))
            .title(Span::styled(" comments ", Theme::title()));
        let para = Paragraph::new(self.comments.as_str())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.comments_scroll, 0));
        frame.render_widget(para, area);
    }

    fn render_preview(&mut self, frame: &mut Frame, area: Rect) {
        // 渲染时不能等锁；拿不到就沿用"非加载中"
        let loading = matches!(
            self.form.preview().try_phase(),
            Some(PreviewPhase::Fetching { .. })
        );
        let font_size = self
            .view
            .picker
            .as_ref()
            .map(|p| p.font_size())
            .unwrap_or((8, 16));
        let image_size = self.view.image.as_ref().map(|img| (img.width(), img.height()));
        crate::ui::preview_view::render(
            frame,
            area,
            self.view.protocol.as_mut(),
            image_size,
            font_size,
            loading,
            self.tick,
        );
    }
}
