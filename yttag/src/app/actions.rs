use std::sync::Arc;

use image::DynamicImage;
use yttag_core::{Field, autocomplete, source};

use super::{FORM_ITEMS, FormApp, FormIntent, SessionOutcome};
use crate::ui::log_view::LogLevel;

/// 下拉里最多列出的候选数
const MAX_SUGGESTIONS: usize = 8;

impl FormApp {
    pub(crate) async fn dispatch(&mut self, intent: FormIntent) {
        match intent {
            FormIntent::FieldEdited(Field::CoverSource, text) => {
                self.form.set_field(Field::CoverSource, text.clone());
                self.debouncer.on_text_changed(&text).await;
                self.refresh_suggestions();
            }
            FormIntent::FieldEdited(field, text) => {
                self.form.set_field(field, text);
            }
            FormIntent::CropToggled(enabled) => {
                self.crop_checked = enabled;
                let shown = self.form.toggle_crop(enabled).await;
                self.show_image(shown);
                self.report_crop_error().await;
            }
            FormIntent::Save => {
                let fields = match self.form.try_finalize().await {
                    Ok(fields) => fields,
                    Err(e) if !self.keep_seeded_cover => {
                        self.logs.push(
                            LogLevel::Error,
                            format!("封面编码失败：{e}，再次保存将沿用原封面"),
                        );
                        self.keep_seeded_cover = true;
                        return;
                    }
                    Err(_) => self.form.seeded_fields(),
                };
                self.outcome = Some(SessionOutcome::Saved(fields));
                self.running = false;
            }
            FormIntent::Cancel => {
                self.outcome = Some(SessionOutcome::Cancelled);
                self.running = false;
            }
        }
    }

    pub(crate) fn select_next(&mut self) {
        self.selected = (self.selected + 1) % FORM_ITEMS.len();
        self.suggestions.selected = None;
    }

    pub(crate) fn select_prev(&mut self) {
        self.selected = (self.selected + FORM_ITEMS.len() - 1) % FORM_ITEMS.len();
        self.suggestions.selected = None;
    }

    /// 按裁剪开关重新取出应显示的图片
    pub(crate) async fn refresh_preview(&mut self) {
        let shown = self.form.displayed().await;
        self.show_image(shown);
        self.report_crop_error().await;
    }

    async fn report_crop_error(&mut self) {
        if let Some(e) = self.form.preview().take_crop_error().await {
            self.logs.push(LogLevel::Warn, format!("{e}，显示未裁剪的图片"));
        }
    }

    /// 仅在图片确实换了时才重建终端协议，避免闪烁
    fn show_image(&mut self, image: Option<Arc<DynamicImage>>) {
        let same = match (&self.view.image, &image) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }
        // 图片换了，之前的编码失败提示不再适用
        self.keep_seeded_cover = false;

        self.view.protocol = match (&image, self.view.picker.as_mut()) {
            (Some(img), Some(picker)) => Some(picker.new_resize_protocol((**img).clone())),
            _ => None,
        };
        self.view.image = image;
    }

    /// 封面输入框的目录补全；URL 不做补全
    pub(crate) fn refresh_suggestions(&mut self) {
        self.suggestions.selected = None;
        let text = self.input(Field::CoverSource).value.clone();
        if text.is_empty() || source::is_url(&text) {
            self.suggestions.items.clear();
            return;
        }

        let mut items: Vec<String> = autocomplete::complete_directory(&text)
            .into_iter()
            .filter(|entry| *entry != text)
            .collect();
        items.truncate(MAX_SUGGESTIONS);
        self.suggestions.items = items;
    }
}
