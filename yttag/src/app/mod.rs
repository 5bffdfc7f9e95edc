mod actions;
mod event;
mod render;

const UI_TICK_MS: u64 = 300;
const EVENT_POLL_MS: u64 = 100;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::DynamicImage;
use ratatui::{Terminal, backend::CrosstermBackend};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use tokio::sync::mpsc;
use yttag_core::{
    Field, FormState, HttpCoverFetcher, PreviewDebouncer, PreviewEvent, RawPreview, TagFields,
};

use crate::config::settings::Settings;
use crate::logging;
use crate::ui::input::TextInput;
use crate::ui::log_view::LogStore;

pub use event::FormIntent;

/// 异步消息，从后台任务发送到主循环
pub enum AppMessage {
    /// 终端事件（由会话内的读取线程送来）
    TermEvent(Event),
    /// UI 定时 tick（驱动加载动画）
    Tick,
    /// 封面预览流水线的进度
    Preview(PreviewEvent),
}

/// 一次表单会话的结果
#[derive(Debug)]
pub enum SessionOutcome {
    /// 用户按下保存，字段已冻结，封面已编码
    Saved(TagFields),
    /// 取消或退出，不写任何内容
    Cancelled,
}

/// 打开表单所需的初始内容
pub struct SessionSeed {
    /// 表单标题中显示的文件名
    pub heading: String,
    pub fields: TagFields,
    pub cover_source: String,
    /// 已有封面（编辑本地文件时）解码后的预览
    pub preview: Option<RawPreview>,
    pub crop_enabled: bool,
    /// 右下方只读区域显示的文字（视频简介或原有注释）
    pub comments: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    Comments,
}

/// 表单中可选中的一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormItem {
    Text(Field),
    Crop,
    Save,
    Cancel,
}

pub const FORM_ITEMS: [FormItem; 9] = [
    FormItem::Text(Field::Title),
    FormItem::Text(Field::Artist),
    FormItem::Text(Field::Album),
    FormItem::Text(Field::Genre),
    FormItem::Text(Field::Year),
    FormItem::Text(Field::CoverSource),
    FormItem::Crop,
    FormItem::Save,
    FormItem::Cancel,
];

/// 封面目录补全的下拉状态
#[derive(Default)]
pub struct Suggestions {
    pub items: Vec<String>,
    pub selected: Option<usize>,
}

pub struct PreviewView {
    /// 当前显示的图片，用于判断是否需要重建终端协议
    pub image: Option<Arc<DynamicImage>>,
    pub protocol: Option<StatefulProtocol>,
    pub picker: Option<Picker>,
}

pub struct FormApp {
    pub running: bool,
    pub heading: String,
    pub form: FormState,
    pub inputs: Vec<TextInput>,
    pub selected: usize,
    pub focus: Focus,
    pub crop_checked: bool,
    pub comments: String,
    pub comments_scroll: u16,
    pub suggestions: Suggestions,
    pub view: PreviewView,
    pub logs: LogStore,
    pub show_logs: bool,
    pub tick: u16,
    /// 封面编码失败并已提示过，再次保存时沿用原封面
    keep_seeded_cover: bool,
    outcome: Option<SessionOutcome>,
    debouncer: PreviewDebouncer<HttpCoverFetcher>,
    preview_rx: Option<mpsc::UnboundedReceiver<PreviewEvent>>,
    pub msg_tx: mpsc::UnboundedSender<AppMessage>,
    msg_rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl FormApp {
    pub fn new(settings: &Settings, fetcher: Arc<HttpCoverFetcher>, seed: SessionSeed) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (preview_tx, preview_rx) = mpsc::unbounded_channel();

        let inputs = Field::ALL
            .iter()
            .map(|f| match f {
                Field::Title => TextInput::new(seed.fields.title.as_str()),
                Field::Artist => TextInput::new(seed.fields.artist.as_str()),
                Field::Album => TextInput::new(seed.fields.album.as_str()),
                Field::Genre => TextInput::new(seed.fields.genre.as_str()),
                Field::Year => TextInput::new(seed.fields.year.as_str()),
                Field::CoverSource => TextInput::new(seed.cover_source.as_str()),
            })
            .collect();

        let form = FormState::new(
            seed.fields,
            seed.cover_source,
            seed.preview,
            seed.crop_enabled,
        );
        let debouncer = PreviewDebouncer::new(
            fetcher,
            form.preview().clone(),
            settings.quiet_period(),
            preview_tx,
        );

        Self {
            running: true,
            heading: seed.heading,
            form,
            inputs,
            selected: 0,
            focus: Focus::Form,
            crop_checked: seed.crop_enabled,
            comments: seed.comments,
            comments_scroll: 0,
            suggestions: Suggestions::default(),
            view: PreviewView {
                image: None,
                protocol: None,
                picker: None,
            },
            logs: LogStore::new(),
            show_logs: false,
            tick: 0,
            keep_seeded_cover: false,
            outcome: None,
            debouncer,
            preview_rx: Some(preview_rx),
            msg_tx,
            msg_rx,
        }
    }

    pub(crate) fn input(&self, field: Field) -> &TextInput {
        &self.inputs[field_index(field)]
    }

    pub(crate) fn input_mut(&mut self, field: Field) -> &mut TextInput {
        &mut self.inputs[field_index(field)]
    }

    pub(crate) fn current_item(&self) -> FormItem {
        FORM_ITEMS[self.selected]
    }

    /// 接管终端运行表单，直到保存或取消
    pub async fn run(mut self) -> Result<SessionOutcome> {
        logging::set_tui_active(true);
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.view.picker = Some(
            Picker::from_query_stdio()
                .unwrap_or_else(|_| Picker::from_fontsize((8, 16)))
        );

        let result = self.main_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        logging::set_tui_active(false);

        result?;
        Ok(self.outcome.take().unwrap_or(SessionOutcome::Cancelled))
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        // 会话结束时必须停掉读取线程，否则它会吞掉下一个会话的按键
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let event_tx = self.msg_tx.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    match crossterm::event::poll(Duration::from_millis(EVENT_POLL_MS)) {
                        Ok(true) => match crossterm::event::read() {
                            Ok(ev) => {
                                if event_tx.send(AppMessage::TermEvent(ev)).is_err() {
                                    break;
                                }
                            }
                            Err(_) => break,
                        },
                        Ok(false) => {}
                        Err(_) => break,
                    }
                }
            })
        };

        let tick_tx = self.msg_tx.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(UI_TICK_MS));
            loop {
                interval.tick().await;
                if tick_tx.send(AppMessage::Tick).is_err() {
                    break;
                }
            }
        });

        // 预览事件转发为 AppMessage
        if let Some(mut preview_rx) = self.preview_rx.take() {
            let preview_tx = self.msg_tx.clone();
            tokio::spawn(async move {
                while let Some(event) = preview_rx.recv().await {
                    if preview_tx.send(AppMessage::Preview(event)).is_err() {
                        break;
                    }
                }
            });
        }

        self.refresh_preview().await;
        let source = self.input(Field::CoverSource).value.clone();
        if !source.is_empty() {
            self.debouncer.prime(&source).await;
        }

        let result = self.drive(terminal).await;

        stop.store(true, Ordering::Relaxed);
        ticker.abort();
        if reader.join().is_err() {
            tracing::warn!("终端事件读取线程异常退出");
        }
        result
    }

    async fn drive(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while self.running {
            terminal.draw(|f| self.render(f))?;

            // 等待至少一条消息
            if let Some(msg) = self.msg_rx.recv().await {
                self.handle_message(msg).await;
            }
            // 批量处理所有已积压的消息，避免每条消息都触发一次 draw
            while let Ok(msg) = self.msg_rx.try_recv() {
                self.handle_message(msg).await;
            }
        }
        Ok(())
    }
}

fn field_index(field: Field) -> usize {
    Field::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn app(cover_source: &str) -> FormApp {
        build(cover_source, None)
    }

    pub fn app_with_preview(preview: RawPreview) -> FormApp {
        build("", Some(preview))
    }

    fn build(cover_source: &str, preview: Option<RawPreview>) -> FormApp {
        let seed = SessionSeed {
            heading: "song.mp3".to_string(),
            fields: TagFields {
                title: "Title".to_string(),
                year: "2020".to_string(),
                ..Default::default()
            },
            cover_source: cover_source.to_string(),
            preview,
            crop_enabled: true,
            comments: "line one\nline two".to_string(),
        };
        let fetcher = Arc::new(HttpCoverFetcher::new(reqwest::Client::new()));
        FormApp::new(&Settings::default(), fetcher, seed)
    }
}
