use std::sync::Arc;

use image::DynamicImage;
use tracing::warn;

use crate::crop::{OUTPUT_MIME, encode_png};
use crate::error::Result;
use crate::preview::{PreviewSlot, RawPreview};
use crate::tags::{Cover, TagFields};

/// 表单中的文本输入项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Artist,
    Album,
    Genre,
    Year,
    CoverSource,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Artist,
        Field::Album,
        Field::Genre,
        Field::Year,
        Field::CoverSource,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Genre => "genre",
            Field::Year => "year",
            Field::CoverSource => "cover (filename/url)",
        }
    }
}

/// 表单状态：文本字段归控制线程独占，预览部分放在共享的 [`PreviewSlot`] 中
pub struct FormState {
    title: String,
    artist: String,
    album: String,
    genre: String,
    year: String,
    cover_source: String,
    /// 没有任何预览时沿用的封面（编辑本地文件时为原封面）
    seeded_cover: Option<Cover>,
    /// 由原封面解码出的预览；仍原样显示时直接写回原封面字节
    seeded_image: Option<Arc<DynamicImage>>,
    preview: PreviewSlot,
}

impl FormState {
    pub fn new(
        fields: TagFields,
        cover_source: String,
        preview: Option<RawPreview>,
        crop_enabled: bool,
    ) -> Self {
        let seeded_image = preview.as_ref().map(|p| p.image.clone());
        Self {
            title: fields.title,
            artist: fields.artist,
            album: fields.album,
            genre: fields.genre,
            year: fields.year,
            cover_source,
            seeded_cover: fields.cover,
            seeded_image,
            preview: PreviewSlot::new(preview, crop_enabled),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Artist => &self.artist,
            Field::Album => &self.album,
            Field::Genre => &self.genre,
            Field::Year => &self.year,
            Field::CoverSource => &self.cover_source,
        }
    }

    pub fn set_field(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Artist => &mut self.artist,
            Field::Album => &mut self.album,
            Field::Genre => &mut self.genre,
            Field::Year => &mut self.year,
            Field::CoverSource => &mut self.cover_source,
        };
        *slot = value;
    }

    pub fn preview(&self) -> &PreviewSlot {
        &self.preview
    }

    /// 切换裁剪并返回应显示的图片。关闭裁剪时保留缓存，再次开启无需重算。
    pub async fn toggle_crop(&self, enabled: bool) -> Option<Arc<DynamicImage>> {
        self.preview.set_crop(enabled).await
    }

    pub async fn displayed(&self) -> Option<Arc<DynamicImage>> {
        self.preview.displayed().await
    }

    /// 冻结当前字段，并把裁剪开关选中的预览编码为 PNG 作为封面。
    /// 预览仍是未裁剪的原封面时不重新编码。编码失败返回错误。
    pub async fn try_finalize(&self) -> Result<TagFields> {
        let cover = match self.preview.displayed().await {
            Some(img) if self.is_seeded(&img) => self.seeded_cover.clone(),
            Some(img) => Some(Cover {
                data: encode_png(&img)?,
                mime: OUTPUT_MIME.to_string(),
            }),
            None => self.seeded_cover.clone(),
        };
        Ok(self.freeze(cover))
    }

    /// 同 [`try_finalize`](Self::try_finalize)，编码失败时沿用原封面
    pub async fn finalize(&self) -> TagFields {
        match self.try_finalize().await {
            Ok(fields) => fields,
            Err(e) => {
                warn!("封面编码失败，沿用原封面：{e}");
                self.seeded_fields()
            }
        }
    }

    /// 当前字段加上原封面
    pub fn seeded_fields(&self) -> TagFields {
        self.freeze(self.seeded_cover.clone())
    }

    fn is_seeded(&self, img: &Arc<DynamicImage>) -> bool {
        self.seeded_cover.is_some()
            && self
                .seeded_image
                .as_ref()
                .is_some_and(|seeded| Arc::ptr_eq(seeded, img))
    }

    fn freeze(&self, cover: Option<Cover>) -> TagFields {
        TagFields {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album: self.album.clone(),
            genre: self.genre.clone(),
            year: self.year.clone(),
            cover,
        }
    }
}
