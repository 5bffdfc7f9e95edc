use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use yttag_core::{Field, PreviewEvent};

use crate::ui::log_view::LogLevel;

use super::{AppMessage, Focus, FormApp, FormItem};

/// 按键翻译后的表单意图，由 `dispatch` 作用到表单状态上
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    FieldEdited(Field, String),
    CropToggled(bool),
    Save,
    Cancel,
}

impl FormApp {
    pub(crate) async fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if let Some(intent) = self.handle_key(key) {
                self.dispatch(intent).await;
            }
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Option<FormIntent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        // 日志浮层打开时，只响应滚动和关闭
        if self.show_logs {
            match (key.modifiers, key.code) {
                (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
                    self.show_logs = false;
                }
                (_, KeyCode::Down) => self.logs.scroll_down(),
                (_, KeyCode::Up) => self.logs.scroll_up(),
                _ => {}
            }
            return None;
        }

        // 全局
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc)
            | (KeyModifiers::CONTROL, KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                if self.suggestions.selected.is_some() {
                    self.suggestions.selected = None;
                    return None;
                }
                return Some(FormIntent::Cancel);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => return Some(FormIntent::Save),
            (KeyModifiers::CONTROL, KeyCode::Char('t')) => {
                self.focus = match self.focus {
                    Focus::Form => Focus::Comments,
                    Focus::Comments => Focus::Form,
                };
                return None;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
                self.show_logs = true;
                self.logs.mark_read();
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Form => self.handle_form_key(key),
            Focus::Comments => {
                self.handle_comments_key(key);
                None
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<FormIntent> {
        match key.code {
            KeyCode::Tab => {
                self.select_next();
                return None;
            }
            KeyCode::BackTab => {
                self.select_prev();
                return None;
            }
            _ => {}
        }

        match self.current_item() {
            FormItem::Text(field) => self.handle_text_key(field, key),
            FormItem::Crop => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    Some(FormIntent::CropToggled(!self.crop_checked))
                }
                KeyCode::Down => {
                    self.select_next();
                    None
                }
                KeyCode::Up => {
                    self.select_prev();
                    None
                }
                _ => None,
            },
            FormItem::Save => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(FormIntent::Save),
                KeyCode::Right => {
                    self.select_next();
                    None
                }
                KeyCode::Up | KeyCode::Left => {
                    self.select_prev();
                    None
                }
                _ => None,
            },
            FormItem::Cancel => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(FormIntent::Cancel),
                KeyCode::Left | KeyCode::Up => {
                    self.select_prev();
                    None
                }
                _ => None,
            },
        }
    }

    fn handle_text_key(&mut self, field: Field, key: KeyEvent) -> Option<FormIntent> {
        // 封面输入框的补全下拉优先处理上下和回车
        if field == Field::CoverSource && !self.suggestions.items.is_empty() {
            let len = self.suggestions.items.len();
            match key.code {
                KeyCode::Down => {
                    self.suggestions.selected = Some(match self.suggestions.selected {
                        Some(i) => (i + 1) % len,
                        None => 0,
                    });
                    return None;
                }
                KeyCode::Up if self.suggestions.selected.is_some() => {
                    self.suggestions.selected = match self.suggestions.selected {
                        Some(0) | None => None,
                        Some(i) => Some(i - 1),
                    };
                    return None;
                }
                KeyCode::Enter => {
                    if let Some(choice) = self
                        .suggestions
                        .selected
                        .and_then(|i| self.suggestions.items.get(i))
                        .cloned()
                    {
                        let input = self.input_mut(field);
                        input.set(choice);
                        return Some(FormIntent::FieldEdited(field, input.value.clone()));
                    }
                }
                _ => {}
            }
        }

        let changed = match (key.modifiers, key.code) {
            // 多数终端把 Ctrl+\ 报告为 Ctrl+4
            (KeyModifiers::CONTROL, KeyCode::Char('\\'))
            | (KeyModifiers::CONTROL, KeyCode::Char('4'))
            | (KeyModifiers::CONTROL, KeyCode::Char('u')) => self.input_mut(field).clear(),
            (_, KeyCode::Enter) | (_, KeyCode::Down) => {
                self.select_next();
                return None;
            }
            (_, KeyCode::Up) => {
                self.select_prev();
                return None;
            }
            _ => self.input_mut(field).handle_key(key),
        };

        changed.then(|| FormIntent::FieldEdited(field, self.input(field).value.clone()))
    }

    fn handle_comments_key(&mut self, key: KeyEvent) {
        let max = self.comments.lines().count().saturating_sub(1) as u16;
        match key.code {
            KeyCode::Down => self.comments_scroll = (self.comments_scroll + 1).min(max),
            KeyCode::Up => self.comments_scroll = self.comments_scroll.saturating_sub(1),
            KeyCode::PageDown => self.comments_scroll = (self.comments_scroll + 10).min(max),
            KeyCode::PageUp => self.comments_scroll = self.comments_scroll.saturating_sub(10),
            KeyCode::Home => self.comments_scroll = 0,
            KeyCode::End => self.comments_scroll = max,
            KeyCode::Tab | KeyCode::BackTab => self.focus = Focus::Form,
            _ => {}
        }
    }

    pub(crate) async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::TermEvent(ev) => {
                self.handle_event(ev).await;
            }
            AppMessage::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            AppMessage::Preview(event) => match event {
                PreviewEvent::Fetching { source } => {
                    tracing::debug!("开始获取封面：{source}");
                }
                PreviewEvent::Updated { source } => {
                    self.refresh_preview().await;
                    self.logs.push(LogLevel::Info, format!("封面已更新：{source}"));
                }
                PreviewEvent::Failed { source, error } => {
                    self.logs
                        .push(LogLevel::Warn, format!("无法预览封面 {source}：{error}"));
                }
                PreviewEvent::Discarded { source } => {
                    tracing::debug!("丢弃过期的封面结果：{source}");
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn select(app: &mut FormApp, item: FormItem) {
        while app.current_item() != item {
            app.handle_key(key(KeyCode::Tab));
        }
    }

    #[test]
    fn typing_emits_field_edits() {
        let mut app = app("");
        assert_eq!(app.current_item(), FormItem::Text(Field::Title));
        assert_eq!(
            app.handle_key(key(KeyCode::Char('!'))),
            Some(FormIntent::FieldEdited(Field::Title, "Title!".to_string()))
        );
        // 光标移动不算编辑
        assert_eq!(app.handle_key(key(KeyCode::Left)), None);
    }

    #[test]
    fn tab_cycles_through_all_items() {
        let mut app = app("");
        for _ in 0..super::super::FORM_ITEMS.len() {
            app.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(app.selected, 0);
        app.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(app.current_item(), FormItem::Cancel);
    }

    #[test]
    fn clear_shortcut_empties_the_focused_input() {
        let mut app = app("cover.jpg");
        select(&mut app, FormItem::Text(Field::CoverSource));
        assert_eq!(
            app.handle_key(ctrl('\\')),
            Some(FormIntent::FieldEdited(Field::CoverSource, String::new()))
        );
        // 已经为空时不再产生编辑
        assert_eq!(app.handle_key(ctrl('u')), None);
        assert_eq!(app.handle_key(ctrl('4')), None);
    }

    #[test]
    fn crop_checkbox_toggles_on_space() {
        let mut app = app("");
        select(&mut app, FormItem::Crop);
        assert_eq!(
            app.handle_key(key(KeyCode::Char(' '))),
            Some(FormIntent::CropToggled(false))
        );
    }

    #[test]
    fn save_and_cancel_shortcuts() {
        let mut app = app("");
        assert_eq!(app.handle_key(ctrl('s')), Some(FormIntent::Save));
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Some(FormIntent::Cancel));
        assert_eq!(app.handle_key(ctrl('q')), Some(FormIntent::Cancel));

        select(&mut app, FormItem::Save);
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Some(FormIntent::Save));
        select(&mut app, FormItem::Cancel);
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Some(FormIntent::Cancel));
    }

    #[test]
    fn comments_focus_swallows_typing() {
        let mut app = app("");
        app.handle_key(ctrl('t'));
        assert_eq!(app.focus, Focus::Comments);
        assert_eq!(app.handle_key(key(KeyCode::Char('x'))), None);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.comments_scroll, 1);
        app.handle_key(ctrl('t'));
        assert_eq!(app.focus, Focus::Form);
        assert_eq!(app.input(Field::Title).value, "Title");
    }

    #[test]
    fn suggestion_is_accepted_with_enter() {
        let mut app = app("mus");
        select(&mut app, FormItem::Text(Field::CoverSource));
        app.suggestions.items = vec!["music/".to_string(), "mustard/".to_string()];

        assert_eq!(app.handle_key(key(KeyCode::Down)), None);
        assert_eq!(app.handle_key(key(KeyCode::Down)), None);
        assert_eq!(app.suggestions.selected, Some(1));
        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(FormIntent::FieldEdited(Field::CoverSource, "mustard/".to_string()))
        );
    }

    #[test]
    fn log_overlay_captures_keys() {
        let mut app = app("");
        app.handle_key(ctrl('l'));
        assert!(app.show_logs);
        assert_eq!(app.handle_key(ctrl('s')), None);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), None);
        assert!(!app.show_logs);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut app = app("");
        let mut release = key(KeyCode::Char('x'));
        release.kind = KeyEventKind::Release;
        assert_eq!(app.handle_key(release), None);
        assert_eq!(app.input(Field::Title).value, "Title");
    }
}
