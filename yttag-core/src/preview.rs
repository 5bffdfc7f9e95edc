use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::crop::crop_square;
use crate::error::{Error, Result};
use crate::fetch::CoverBytes;

/// 完整解码后的源图片及其 MIME 类型，每次获取成功后整体替换
#[derive(Debug, Clone)]
pub struct RawPreview {
    pub image: Arc<DynamicImage>,
    pub mime: String,
}

impl RawPreview {
    pub fn decode(cover: &CoverBytes) -> Result<Self> {
        let image = image::load_from_memory(&cover.data).map_err(Error::Decode)?;
        Ok(Self {
            image: Arc::new(image),
            mime: cover.mime.clone(),
        })
    }
}

/// 预览获取的状态机
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewPhase {
    Idle,
    /// 防抖等待中，deadline 前没有新输入才会发起请求
    Waiting { source: String, deadline: Instant },
    Fetching { source: String },
}

#[derive(Debug)]
struct PreviewInner {
    raw: Option<RawPreview>,
    /// 仅在 raw 存在且开启裁剪并实际显示时才计算；raw 替换时清空
    cropped: Option<Arc<DynamicImage>>,
    crop_enabled: bool,
    /// 最近一次裁剪失败的原因，由界面取走后显示
    crop_error: Option<String>,
    generation: u64,
    phase: PreviewPhase,
}

impl PreviewInner {
    /// 按裁剪开关返回当前应显示的图片，必要时惰性计算裁剪结果
    fn selected(&mut self) -> Option<Arc<DynamicImage>> {
        let raw = self.raw.as_ref()?;
        if !self.crop_enabled {
            return Some(raw.image.clone());
        }
        if self.cropped.is_none() {
            match crop_square(&raw.image) {
                Ok(img) => self.cropped = Some(Arc::new(img)),
                Err(e) => {
                    warn!("{e}，改用未裁剪的图片");
                    self.crop_error = Some(e.to_string());
                    return Some(raw.image.clone());
                }
            }
        }
        self.cropped.clone()
    }
}

/// 预览图、裁剪缓存、裁剪开关与代数共用一把锁。
/// 控制线程和后台获取任务是仅有的两个竞争方。
#[derive(Debug, Clone)]
pub struct PreviewSlot {
    inner: Arc<Mutex<PreviewInner>>,
}

impl PreviewSlot {
    pub fn new(raw: Option<RawPreview>, crop_enabled: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PreviewInner {
                raw,
                cropped: None,
                crop_enabled,
                crop_error: None,
                generation: 0,
                phase: PreviewPhase::Idle,
            })),
        }
    }

    /// 开启新一代请求：旧的等待或获取全部作废。
    /// 返回新代数，以及旧状态是否仍处于防抖等待。
    pub(crate) async fn begin(&self, source: &str, deadline: Instant) -> (u64, bool) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        let was_waiting = matches!(inner.phase, PreviewPhase::Waiting { .. });
        inner.phase = PreviewPhase::Waiting {
            source: source.to_string(),
            deadline,
        };
        (inner.generation, was_waiting)
    }

    /// 防抖结束进入获取阶段；若已被新输入取代则返回 false
    pub(crate) async fn start_fetching(&self, generation: u64, source: &str) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return false;
        }
        inner.phase = PreviewPhase::Fetching {
            source: source.to_string(),
        };
        true
    }

    /// 写入获取结果。代数过期时什么也不做并返回 false。
    pub async fn apply_fetched_preview(&self, generation: u64, raw: RawPreview) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return false;
        }
        inner.raw = Some(raw);
        inner.cropped = None;
        inner.phase = PreviewPhase::Idle;
        true
    }

    /// 获取失败：保留旧预览，仅在仍为当前代时回到 Idle
    pub(crate) async fn finish_failed(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return false;
        }
        inner.phase = PreviewPhase::Idle;
        true
    }

    pub async fn set_crop(&self, enabled: bool) -> Option<Arc<DynamicImage>> {
        let mut inner = self.inner.lock().await;
        inner.crop_enabled = enabled;
        inner.selected()
    }

    pub async fn displayed(&self) -> Option<Arc<DynamicImage>> {
        self.inner.lock().await.selected()
    }

    pub async fn crop_enabled(&self) -> bool {
        self.inner.lock().await.crop_enabled
    }

    pub async fn raw(&self) -> Option<RawPreview> {
        self.inner.lock().await.raw.clone()
    }

    pub async fn cached_crop(&self) -> Option<Arc<DynamicImage>> {
        self.inner.lock().await.cropped.clone()
    }

    /// 取走裁剪失败的原因（如有）
    pub async fn take_crop_error(&self) -> Option<String> {
        self.inner.lock().await.crop_error.take()
    }

    pub async fn phase(&self) -> PreviewPhase {
        self.inner.lock().await.phase.clone()
    }

    /// 渲染路径用的非阻塞读取
    pub fn try_phase(&self) -> Option<PreviewPhase> {
        self.inner.try_lock().ok().map(|g| g.phase.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(w: u32, h: u32) -> RawPreview {
        RawPreview {
            image: Arc::new(DynamicImage::new_rgb8(w, h)),
            mime: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn stale_generation_is_not_applied() {
        let slot = PreviewSlot::new(None, false);
        let (a, _) = slot.begin("a", Instant::now()).await;
        let (b, _) = slot.begin("b", Instant::now()).await;

        assert!(slot.apply_fetched_preview(b, raw(20, 10)).await);
        assert!(!slot.apply_fetched_preview(a, raw(99, 99)).await);

        let shown = slot.raw().await.unwrap();
        assert_eq!((shown.image.width(), shown.image.height()), (20, 10));
        assert_eq!(slot.phase().await, PreviewPhase::Idle);
    }

    #[tokio::test]
    async fn new_raw_invalidates_crop_cache() {
        let slot = PreviewSlot::new(Some(raw(100, 50)), true);
        assert!(slot.displayed().await.is_some());
        assert!(slot.cached_crop().await.is_some());

        let (g, _) = slot.begin("next", Instant::now()).await;
        assert!(slot.apply_fetched_preview(g, raw(30, 40)).await);
        assert!(slot.cached_crop().await.is_none());
    }

    #[tokio::test]
    async fn begin_reports_previous_waiting_phase() {
        let slot = PreviewSlot::new(None, false);
        let (g1, was_waiting) = slot.begin("a", Instant::now()).await;
        assert!(!was_waiting);
        let (_, was_waiting) = slot.begin("ab", Instant::now()).await;
        assert!(was_waiting);
        assert!(!slot.start_fetching(g1, "a").await);
    }

    #[tokio::test]
    async fn failed_crop_falls_back_to_raw() {
        let slot = PreviewSlot::new(Some(raw(0, 10)), true);

        let shown = slot.displayed().await.unwrap();
        assert_eq!((shown.width(), shown.height()), (0, 10));
        assert!(Arc::ptr_eq(&shown, &slot.raw().await.unwrap().image));
        assert!(slot.cached_crop().await.is_none());

        assert!(slot.take_crop_error().await.is_some());
        assert!(slot.take_crop_error().await.is_none());

        let again = slot.set_crop(true).await.unwrap();
        assert_eq!(again.width(), 0);
        assert!(slot.cached_crop().await.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_previous_preview() {
        let slot = PreviewSlot::new(Some(raw(8, 8)), false);
        let (g, _) = slot.begin("broken", Instant::now()).await;
        assert!(slot.start_fetching(g, "broken").await);
        assert!(slot.finish_failed(g).await);
        assert_eq!(slot.raw().await.unwrap().image.width(), 8);
        assert_eq!(slot.phase().await, PreviewPhase::Idle);
    }
}
