use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// yt-dlp `--write-info-json` 输出中用到的字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SidecarInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub uploader: String,
    /// YYYYMMDD
    #[serde(default)]
    pub upload_date: String,
}

impl SidecarInfo {
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let sidecar_err = |reason: String| Error::Sidecar {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| sidecar_err(e.to_string()))?;
        Self::parse(&content).map_err(|e| sidecar_err(e.to_string()))
    }

    /// 上传日期前 4 个字符作为默认年份
    pub fn default_year(&self) -> String {
        self.upload_date.chars().take(4).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_fields_and_ignores_the_rest() {
        let info = SidecarInfo::parse(
            r#"{
                "id": "abc",
                "title": "Song",
                "description": "line1\nline2",
                "thumbnail": "https://i.ytimg.com/vi/abc/maxresdefault.webp",
                "uploader": "Someone",
                "upload_date": "20210304",
                "duration": 215
            }"#,
        )
        .unwrap();
        assert_eq!(info.title, "Song");
        assert_eq!(info.uploader, "Someone");
        assert_eq!(info.default_year(), "2021");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let info = SidecarInfo::parse("{}").unwrap();
        assert!(info.thumbnail.is_empty());
        assert_eq!(info.default_year(), "");
    }

    #[test]
    fn short_upload_date_is_used_as_is() {
        let info = SidecarInfo {
            upload_date: "20".to_string(),
            ..Default::default()
        };
        assert_eq!(info.default_year(), "20");
    }

    #[test]
    fn unreadable_file_is_sidecar_error() {
        let err = SidecarInfo::read(Path::new("/nonexistent/x.info.json")).unwrap_err();
        assert!(matches!(err, Error::Sidecar { .. }));
    }
}
