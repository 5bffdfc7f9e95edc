use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

const DIR_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIR_NAME_LEN: usize = 10;

/// 调用外部下载器（yt-dlp）提取音频
#[derive(Debug, Clone)]
pub struct Extractor {
    pub program: String,
    pub audio_format: String,
    pub sponsorblock_mark: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            sponsorblock_mark: "all".to_string(),
        }
    }
}

impl Extractor {
    /// 下载到 `parent` 下新建的随机命名目录，每个条目产出一个音频和一个 info.json
    pub async fn download(&self, url: &str, parent: &Path) -> Result<WorkDir> {
        let work = WorkDir::create(parent)?;
        let template = format!("{}/%(title)s.%(ext)s", work.path().display());

        info!(program = %self.program, dir = %work.path().display(), "开始下载 {url}");
        let output = tokio::process::Command::new(&self.program)
            .args(["--write-info-json", "-x"])
            .args(["--audio-format", self.audio_format.as_str()])
            .args(["--sponsorblock-mark", self.sponsorblock_mark.as_str()])
            .args(["-o", template.as_str()])
            .arg(url)
            .output()
            .await
            .map_err(|e| Error::Extract(format!("无法启动 {}：{e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(Error::Extract(format!(
                "{} 退出状态 {}：{}",
                self.program,
                output.status,
                tail.join("\n")
            )));
        }
        Ok(work)
    }
}

/// 临时工作目录，drop 时连同剩余文件一起删除
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn create(parent: &Path) -> Result<Self> {
        let path = parent.join(random_dir_name());
        std::fs::create_dir_all(&path)
            .map_err(|e| Error::Extract(format!("无法创建工作目录 {}：{e}", path.display())))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!("清理工作目录 {} 失败：{e}", self.path.display());
        }
    }
}

fn random_dir_name() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..DIR_NAME_LEN)
        .map(|_| DIR_CHARSET[rng.random_range(0..DIR_CHARSET.len())] as char)
        .collect()
}

/// 按最后一个点拆分文件名；没有点时两者皆空
pub fn split_name_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(i) => (&file_name[..i], &file_name[i + 1..]),
        None => ("", ""),
    }
}

/// 工作目录中的一个音频条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedItem {
    pub file_name: String,
    pub stem: String,
    pub audio_path: PathBuf,
    pub sidecar_path: PathBuf,
}

impl ExtractedItem {
    /// 移动到输出目录，保持原文件名
    pub fn move_into(&self, output_dir: &Path) -> std::io::Result<PathBuf> {
        let target = output_dir.join(&self.file_name);
        std::fs::rename(&self.audio_path, &target)?;
        Ok(target)
    }
}

/// 列出工作目录中的音频条目（按文件名排序）。
/// 子目录和 json 文件不算条目；缺少文件名或扩展名的记录警告后跳过。
pub fn list_items(dir: &Path) -> Result<Vec<ExtractedItem>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::Extract(format!("无法读取 {}：{e}", dir.display())))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut items = Vec::new();
    for file_name in names {
        let (stem, ext) = split_name_extension(&file_name);
        if ext == "json" {
            continue;
        }
        if stem.is_empty() || ext.is_empty() {
            warn!("无效的文件名或扩展名：{file_name}");
            continue;
        }
        debug!("发现条目 {file_name}");
        items.push(ExtractedItem {
            stem: stem.to_string(),
            audio_path: dir.join(&file_name),
            sidecar_path: dir.join(format!("{stem}.info.json")),
            file_name,
        });
    }
    Ok(items)
}
