use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use yttag_core::extract::{ExtractedItem, list_items};
use yttag_core::sidecar::SidecarInfo;
use yttag_core::{CoverBytes, HttpCoverFetcher, RawPreview, TagFields, tags};

use crate::app::{FormApp, SessionOutcome, SessionSeed};
use crate::config::settings::Settings;

const USER_AGENT: &str = concat!("yttag/", env!("CARGO_PKG_VERSION"));

fn build_fetcher() -> Result<Arc<HttpCoverFetcher>> {
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()
        .context("无法创建 HTTP 客户端")?;
    Ok(Arc::new(HttpCoverFetcher::new(http)))
}

/// 下载链接中的全部音频，逐个打开表单编辑。
/// 下载失败直接返回错误；单个条目出错只记录并跳过。
pub async fn download_and_tag(settings: &Settings, url: &str) -> Result<()> {
    let output_dir = settings.download.output_dir.as_path();
    let workdir = settings
        .extractor()
        .download(url, output_dir)
        .await
        .with_context(|| format!("下载失败：{url}"))?;

    let items = list_items(workdir.path())?;
    if items.is_empty() {
        warn!("没有下载到任何音频");
        return Ok(());
    }

    let fetcher = build_fetcher()?;
    for item in &items {
        if let Err(e) = tag_downloaded(settings, &fetcher, item, output_dir).await {
            warn!("跳过 {}：{e:#}", item.file_name);
        }
    }
    Ok(())
}

async fn tag_downloaded(
    settings: &Settings,
    fetcher: &Arc<HttpCoverFetcher>,
    item: &ExtractedItem,
    output_dir: &Path,
) -> Result<()> {
    // 先确认标签可读，不可读的文件后面也写不进去
    tags::read_existing(&item.audio_path)
        .with_context(|| format!("无法读取标签：{}", item.audio_path.display()))?;
    let info = SidecarInfo::read(&item.sidecar_path)?;

    let seed = SessionSeed {
        heading: item.file_name.clone(),
        fields: TagFields::from_sidecar(&info),
        cover_source: info.thumbnail.clone(),
        preview: None,
        crop_enabled: settings.form.crop_downloads,
        comments: info.description.clone(),
    };

    match FormApp::new(settings, fetcher.clone(), seed).run().await? {
        SessionOutcome::Saved(fields) => {
            tags::write_fields(&item.audio_path, &fields)
                .with_context(|| format!("无法写入标签：{}", item.audio_path.display()))?;
            let target = item
                .move_into(output_dir)
                .with_context(|| format!("无法移动 {}", item.file_name))?;
            info!("已保存：{}", target.display());
        }
        SessionOutcome::Cancelled => {
            // 取消只是不写标签，音频照样保留
            let target = item
                .move_into(output_dir)
                .with_context(|| format!("无法移动 {}", item.file_name))?;
            info!("未写入标签：{}", target.display());
        }
    }
    Ok(())
}

/// 直接编辑本地音频文件的标签
pub async fn edit_file(settings: &Settings, path: &Path) -> Result<()> {
    let existing = tags::read_existing(path)
        .with_context(|| format!("无法读取标签：{}", path.display()))?;

    let preview = existing.fields.cover.as_ref().and_then(|cover| {
        let bytes = CoverBytes {
            data: cover.data.clone(),
            mime: cover.mime.clone(),
        };
        RawPreview::decode(&bytes)
            .map_err(|e| warn!("原封面无法解码：{e}"))
            .ok()
    });

    let heading = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let seed = SessionSeed {
        heading,
        fields: existing.fields,
        cover_source: String::new(),
        preview,
        crop_enabled: false,
        comments: existing.comment,
    };

    match FormApp::new(settings, build_fetcher()?, seed).run().await? {
        SessionOutcome::Saved(fields) => {
            tags::write_fields(path, &fields)
                .with_context(|| format!("无法写入标签：{}", path.display()))?;
            info!("已保存：{}", path.display());
        }
        SessionOutcome::Cancelled => info!("未做任何修改"),
    }
    Ok(())
}
