use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fetch::CoverFetcher;
use crate::preview::{PreviewSlot, RawPreview};

/// 默认防抖静默期
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// 预览管线发给 UI 的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    /// 静默期结束，开始获取
    Fetching { source: String },
    /// 新预览已写入，需要重绘
    Updated { source: String },
    /// 获取或解码失败，旧预览保留
    Failed { source: String, error: String },
    /// 结果返回时已被更新的输入取代，已丢弃
    Discarded { source: String },
}

/// 封面来源输入的防抖与取消。
///
/// 每次输入都会递增代数；只有代数仍为最新的任务才能把结果写入预览。
/// 已在获取中的旧任务不会被强制终止，只是结果被丢弃。
pub struct PreviewDebouncer<F: CoverFetcher> {
    fetcher: Arc<F>,
    slot: PreviewSlot,
    quiet: Duration,
    events: mpsc::UnboundedSender<PreviewEvent>,
    pending: Option<JoinHandle<()>>,
}

impl<F: CoverFetcher> PreviewDebouncer<F> {
    pub fn new(
        fetcher: Arc<F>,
        slot: PreviewSlot,
        quiet: Duration,
        events: mpsc::UnboundedSender<PreviewEvent>,
    ) -> Self {
        Self {
            fetcher,
            slot,
            quiet,
            events,
            pending: None,
        }
    }

    /// 封面输入框内容变化。空字符串不触发任何请求。
    pub async fn on_text_changed(&mut self, source: &str) -> bool {
        if source.is_empty() {
            return false;
        }
        self.schedule(source, self.quiet).await;
        true
    }

    /// 打开表单时立即加载初始封面，不等待静默期
    pub async fn prime(&mut self, source: &str) -> bool {
        if source.is_empty() {
            return false;
        }
        self.schedule(source, Duration::ZERO).await;
        true
    }

    async fn schedule(&mut self, source: &str, delay: Duration) {
        let deadline = Instant::now() + delay;
        let (generation, was_waiting) = self.slot.begin(source, deadline).await;

        // 仍在等待的定时器直接取消；已在获取中的任务让它跑完，结果会被代数检查丢弃
        if was_waiting {
            if let Some(h) = self.pending.take() {
                h.abort();
            }
        }

        let task = run_fetch(
            self.fetcher.clone(),
            self.slot.clone(),
            self.events.clone(),
            generation,
            source.to_string(),
            deadline,
        );
        self.pending = Some(tokio::spawn(task));
    }
}

impl<F: CoverFetcher> Drop for PreviewDebouncer<F> {
    fn drop(&mut self) {
        if let Some(h) = self.pending.take() {
            h.abort();
        }
    }
}

async fn run_fetch<F: CoverFetcher>(
    fetcher: Arc<F>,
    slot: PreviewSlot,
    events: mpsc::UnboundedSender<PreviewEvent>,
    generation: u64,
    source: String,
    deadline: Instant,
) {
    tokio::time::sleep_until(deadline).await;
    if !slot.start_fetching(generation, &source).await {
        return;
    }
    let _ = events.send(PreviewEvent::Fetching {
        source: source.clone(),
    });

    let result: Result<RawPreview> = match fetcher.fetch(&source).await {
        // 解码放到 blocking 线程
        Ok(cover) => match tokio::task::spawn_blocking(move || RawPreview::decode(&cover)).await {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("封面解码任务异常退出：{e}");
                slot.finish_failed(generation).await;
                return;
            }
        },
        Err(e) => Err(e),
    };

    let event = match result {
        Ok(raw) => {
            let (w, h) = (raw.image.width(), raw.image.height());
            if slot.apply_fetched_preview(generation, raw).await {
                info!(source = %source, "封面预览已更新 {w}x{h}");
                PreviewEvent::Updated { source }
            } else {
                debug!(source = %source, "封面结果已过期，丢弃");
                PreviewEvent::Discarded { source }
            }
        }
        Err(e) => {
            if slot.finish_failed(generation).await {
                warn!(source = %source, "封面预览更新失败：{e}");
                PreviewEvent::Failed {
                    source,
                    error: e.to_string(),
                }
            } else {
                debug!(source = %source, "过期请求失败：{e}");
                PreviewEvent::Discarded { source }
            }
        }
    };
    let _ = events.send(event);
}
