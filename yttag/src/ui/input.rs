use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

/// 单行文本输入框。光标按字符计，不是字节。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    /// 整体替换内容，光标移到末尾
    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::new(value);
    }

    pub fn clear(&mut self) -> bool {
        if self.value.is_empty() {
            return false;
        }
        self.value.clear();
        self.cursor = 0;
        true
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// 处理编辑类按键，返回内容是否变化
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let len = self.value.chars().count();
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => {
                self.cursor = 0;
                false
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => {
                self.cursor = len;
                false
            }
            (_, KeyCode::Left) => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            (_, KeyCode::Right) => {
                self.cursor = (self.cursor + 1).min(len);
                false
            }
            (_, KeyCode::Backspace) => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            (_, KeyCode::Delete) => {
                if self.cursor >= len {
                    return false;
                }
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            (m, KeyCode::Char(c))
                if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            _ => false,
        }
    }
}

/// 构建输入行：label > content  (光标用反色块表示)
///
/// 内容超出 `width` 时向左滚动，保证光标可见。
pub fn build_input_line(
    label: &str,
    label_width: usize,
    input: &TextInput,
    is_focused: bool,
    width: usize,
) -> Line<'static> {
    let label_style = if is_focused {
        Theme::highlight()
    } else {
        Theme::secondary()
    };
    let label = Span::styled(format!("{label:<label_width$} "), label_style);
    let prefix = if is_focused { "> " } else { "  " };

    let avail = width.saturating_sub(label_width + 3).max(1);
    let chars: Vec<char> = input.value.chars().collect();
    // 从光标往左回溯，直到显示宽度装满
    let mut start = input.cursor.min(chars.len());
    let mut used = 1;
    while start > 0 {
        let w = chars[start - 1].to_string().width();
        if used + w > avail {
            break;
        }
        used += w;
        start -= 1;
    }

    if is_focused {
        let before: String = chars[start..input.cursor.min(chars.len())].iter().collect();
        let cursor_char: String = chars
            .get(input.cursor)
            .map_or(" ".to_string(), |c| c.to_string());
        let after: String = chars.iter().skip(input.cursor + 1).collect();

        Line::from(vec![
            label,
            Span::styled(prefix.to_string(), Theme::active()),
            Span::raw(before),
            Span::styled(
                cursor_char,
                Style::default().add_modifier(Modifier::REVERSED),
            ),
            Span::raw(after),
        ])
    } else {
        Line::from(vec![
            label,
            Span::styled(prefix.to_string(), Theme::secondary()),
            Span::raw(input.value.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut TextInput, code: KeyCode) -> bool {
        input.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = TextInput::new("ac");
        press(&mut input, KeyCode::Left);
        assert!(press(&mut input, KeyCode::Char('b')));
        assert_eq!(input.value, "abc");
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn multibyte_edits_stay_on_char_boundaries() {
        let mut input = TextInput::new("曲名");
        assert!(press(&mut input, KeyCode::Backspace));
        assert_eq!(input.value, "曲");
        press(&mut input, KeyCode::Home);
        assert!(press(&mut input, KeyCode::Char('新')));
        assert_eq!(input.value, "新曲");
        assert!(press(&mut input, KeyCode::Delete));
        assert_eq!(input.value, "新");
    }

    #[test]
    fn navigation_does_not_report_change() {
        let mut input = TextInput::new("x");
        assert!(!press(&mut input, KeyCode::Left));
        assert!(!press(&mut input, KeyCode::Backspace));
        assert!(!press(&mut input, KeyCode::End));
        assert!(!press(&mut input, KeyCode::Delete));
        assert_eq!(input.value, "x");
    }

    #[test]
    fn control_chars_are_not_inserted() {
        let mut input = TextInput::default();
        let changed = input.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(!changed);
        assert!(input.value.is_empty());
        let shifted = input.handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert!(shifted);
        assert_eq!(input.value, "A");
    }

    #[test]
    fn clear_reports_only_real_changes() {
        let mut input = TextInput::new("abc");
        assert!(input.clear());
        assert_eq!(input.cursor, 0);
        assert!(!input.clear());
    }

    #[test]
    fn long_value_scrolls_to_keep_cursor_visible() {
        let input = TextInput::new("0123456789abcdef");
        let line = build_input_line("t", 1, &input, true, 12);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.ends_with("def "));
        assert!(!text.contains('0'));
    }
}
