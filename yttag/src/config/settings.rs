use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use yttag_core::extract::Extractor;

use super::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub preview: PreviewSettings,
    #[serde(default)]
    pub download: DownloadSettings,
    #[serde(default)]
    pub form: FormSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSettings {
    /// 封面输入停止多久后才发起请求
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
    #[serde(default = "default_sponsorblock_mark")]
    pub sponsorblock_mark: String,
    /// 工作目录的父目录，也是保存后音频的去处
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSettings {
    /// 下载流程中裁剪勾选框的初始状态（编辑本地文件时始终不裁剪）
    #[serde(default = "default_true")]
    pub crop_downloads: bool,
}

fn default_debounce_ms() -> u64 {
    500
}
fn default_program() -> String {
    "yt-dlp".to_string()
}
fn default_audio_format() -> String {
    "mp3".to_string()
}
fn default_sponsorblock_mark() -> String {
    "all".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_true() -> bool {
    true
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            audio_format: default_audio_format(),
            sponsorblock_mark: default_sponsorblock_mark(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            crop_downloads: true,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let path = paths::config_file()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let settings = Self::default();
            settings.save()?;
            Ok(settings)
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = paths::config_file()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.preview.debounce_ms)
    }

    pub fn extractor(&self) -> Extractor {
        Extractor {
            program: self.download.program.clone(),
            audio_format: self.download.audio_format.clone(),
            sponsorblock_mark: self.download.sponsorblock_mark.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [preview]
            debounce_ms = 250

            [download]
            audio_format = "opus"
            "#,
        )
        .unwrap();
        assert_eq!(settings.quiet_period(), Duration::from_millis(250));
        assert_eq!(settings.download.audio_format, "opus");
        assert_eq!(settings.download.program, "yt-dlp");
        assert_eq!(settings.download.output_dir, PathBuf::from("."));
        assert!(settings.form.crop_downloads);
    }

    #[test]
    fn empty_file_is_default() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.preview.debounce_ms, 500);
        let extractor = settings.extractor();
        assert_eq!(extractor.sponsorblock_mark, "all");
    }

    #[test]
    fn defaults_survive_serialization() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.download.audio_format, "mp3");
        assert!(back.form.crop_downloads);
    }
}
