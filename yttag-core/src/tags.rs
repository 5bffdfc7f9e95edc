use std::path::Path;

use id3::frame::{Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};
use tracing::debug;

use crate::error::{Error, Result};
use crate::sidecar::SidecarInfo;

/// 封面图片，写入时固定为 front cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub data: Vec<u8>,
    pub mime: String,
}

/// 表单最终要写回文件的标签内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub year: String,
    pub cover: Option<Cover>,
}

/// 从已有标签读出的内容，外加第一条注释（用于在表单旁展示）
#[derive(Debug, Clone, Default)]
pub struct ExistingTag {
    pub fields: TagFields,
    pub comment: String,
}

impl TagFields {
    /// 下载流程的默认值：专辑默认同标题，年份取上传日期前 4 位
    pub fn from_sidecar(info: &SidecarInfo) -> Self {
        Self {
            title: info.title.clone(),
            artist: info.uploader.clone(),
            album: info.title.clone(),
            genre: String::new(),
            year: info.default_year(),
            cover: None,
        }
    }

    pub fn from_tag(tag: &Tag) -> Self {
        let cover = tag
            .pictures()
            .find(|p| p.picture_type == PictureType::CoverFront)
            .or_else(|| tag.pictures().next())
            .map(|p| Cover {
                data: p.data.clone(),
                mime: p.mime_type.clone(),
            });

        Self {
            title: tag.title().unwrap_or_default().to_string(),
            artist: tag.artist().unwrap_or_default().to_string(),
            album: tag.album().unwrap_or_default().to_string(),
            genre: tag.genre().unwrap_or_default().to_string(),
            year: raw_year(tag),
            cover,
        }
    }

    /// 生成全新标签（等价于先删除全部帧再写入）
    pub fn to_tag(&self) -> Tag {
        let mut tag = Tag::new();
        tag.set_title(self.title.as_str());
        tag.set_artist(self.artist.as_str());
        tag.set_album(self.album.as_str());
        if !self.genre.is_empty() {
            tag.set_genre(self.genre.as_str());
        }
        // 年份按原文写入 TYER，不要求是数字
        if !self.year.trim().is_empty() {
            tag.set_text("TYER", self.year.trim());
        }
        if let Some(cover) = &self.cover {
            tag.add_frame(Picture {
                mime_type: cover.mime.clone(),
                picture_type: PictureType::CoverFront,
                description: String::new(),
                data: cover.data.clone(),
            });
        }
        tag
    }
}

/// 优先取 TYER/TDRC 的原始文本，`year()` 只认纯数字
fn raw_year(tag: &Tag) -> String {
    ["TYER", "TDRC"]
        .iter()
        .filter_map(|id| tag.get(id).and_then(|f| f.content().text()))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .or_else(|| {
            tag.year()
                .or_else(|| tag.date_recorded().map(|d| d.year))
                .map(|y| y.to_string())
        })
        .unwrap_or_default()
}

/// 读取文件已有标签；文件没有 ID3 标签时视为空标签
pub fn read_existing(path: &Path) -> Result<ExistingTag> {
    let tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
            debug!(path = %path.display(), "文件没有 ID3 标签");
            Tag::new()
        }
        Err(e) => return Err(Error::Persist(e)),
    };
    let comment = tag
        .comments()
        .next()
        .map(|c| c.text.clone())
        .unwrap_or_default();
    Ok(ExistingTag {
        fields: TagFields::from_tag(&tag),
        comment,
    })
}

/// 覆盖写入标签
pub fn write_fields(path: &Path, fields: &TagFields) -> Result<()> {
    fields.to_tag().write_to_path(path, Version::Id3v23)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_defaults() {
        let info = SidecarInfo {
            title: "Song".to_string(),
            description: "desc".to_string(),
            thumbnail: "https://x/t.jpg".to_string(),
            uploader: "Uploader".to_string(),
            upload_date: "20210304".to_string(),
        };
        let fields = TagFields::from_sidecar(&info);
        assert_eq!(fields.title, "Song");
        assert_eq!(fields.album, "Song");
        assert_eq!(fields.artist, "Uploader");
        assert_eq!(fields.year, "2021");
        assert!(fields.cover.is_none());
    }

    #[test]
    fn fresh_tag_has_only_given_frames() {
        let fields = TagFields {
            title: "T".to_string(),
            artist: "A".to_string(),
            album: "Al".to_string(),
            genre: String::new(),
            year: "not a year".to_string(),
            cover: Some(Cover {
                data: vec![1, 2, 3],
                mime: "image/png".to_string(),
            }),
        };
        let tag = fields.to_tag();
        assert_eq!(tag.title(), Some("T"));
        assert_eq!(tag.genre(), None);
        assert_eq!(
            tag.get("TYER").and_then(|f| f.content().text()),
            Some("not a year")
        );
        let pics: Vec<_> = tag.pictures().collect();
        assert_eq!(pics.len(), 1);
        assert_eq!(pics[0].picture_type, PictureType::CoverFront);
    }

    #[test]
    fn fields_survive_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.mp3");
        std::fs::write(&path, b"").unwrap();

        let fields = TagFields {
            title: "Title".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            genre: "Rock".to_string(),
            year: "1999".to_string(),
            cover: Some(Cover {
                data: vec![0x89, b'P', b'N', b'G'],
                mime: "image/png".to_string(),
            }),
        };
        write_fields(&path, &fields).unwrap();

        let existing = read_existing(&path).unwrap();
        assert_eq!(existing.fields, fields);
    }

    #[test]
    fn free_form_year_survives_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.mp3");
        std::fs::write(&path, b"").unwrap();

        let fields = TagFields {
            title: "Title".to_string(),
            year: "2021-03".to_string(),
            ..Default::default()
        };
        write_fields(&path, &fields).unwrap();
        assert_eq!(read_existing(&path).unwrap().fields.year, "2021-03");
    }

    #[test]
    fn non_numeric_year_from_other_taggers_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.mp3");
        std::fs::write(&path, b"").unwrap();

        let mut tag = Tag::new();
        tag.set_title("Old");
        tag.set_text("TYER", "1970s");
        tag.write_to_path(&path, Version::Id3v23).unwrap();

        let existing = read_existing(&path).unwrap();
        assert_eq!(existing.fields.year, "1970s");

        // 不做修改直接保存，年份原样保留
        write_fields(&path, &existing.fields).unwrap();
        assert_eq!(read_existing(&path).unwrap().fields.year, "1970s");
    }

    #[test]
    fn untagged_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.mp3");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let existing = read_existing(&path).unwrap();
        assert_eq!(existing.fields, TagFields::default());
        assert!(existing.comment.is_empty());
    }
}
