use std::future::Future;

use tracing::debug;

use crate::error::{Error, FetchError, Result};
use crate::source::is_url;

/// 原始封面数据及嗅探出的 MIME 类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverBytes {
    pub data: Vec<u8>,
    pub mime: String,
}

/// 把封面来源解析为图片字节。预览防抖器通过它发起请求，测试中可替换。
pub trait CoverFetcher: Send + Sync + 'static {
    fn fetch(&self, source: &str) -> impl Future<Output = Result<CoverBytes>> + Send;
}

#[derive(Clone)]
pub struct HttpCoverFetcher {
    http: reqwest::Client,
}

impl HttpCoverFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl CoverFetcher for HttpCoverFetcher {
    fn fetch(&self, source: &str) -> impl Future<Output = Result<CoverBytes>> + Send {
        let http = self.http.clone();
        let source = source.to_string();
        async move { fetch_cover(&http, &source).await }
    }
}

/// 读取 URL 或本地文件的全部内容，并按内容（而非扩展名或响应头）判断是否为图片
pub async fn fetch_cover(http: &reqwest::Client, source: &str) -> Result<CoverBytes> {
    let data = if is_url(source) {
        debug!(url = source, "下载封面");
        let resp = http.get(source).send().await?.error_for_status()?;
        resp.bytes().await?.to_vec()
    } else {
        debug!(path = source, "读取本地封面");
        tokio::fs::read(source).await.map_err(FetchError::from)?
    };

    let mime = sniff_mime(&data);
    if !mime.starts_with("image/") {
        return Err(Error::InvalidFormat(mime));
    }
    Ok(CoverBytes { data, mime })
}

/// 根据文件头嗅探 MIME 类型
pub fn sniff_mime(data: &[u8]) -> String {
    match image::guess_format(data) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) if std::str::from_utf8(data).is_ok() => "text/plain; charset=utf-8".to_string(),
        Err(_) => "application/octet-stream".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat};

    use super::*;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(w, h)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn sniffs_png_from_content() {
        assert_eq!(sniff_mime(&png_bytes(2, 2)), "image/png");
    }

    #[test]
    fn sniffs_non_images() {
        assert_eq!(sniff_mime(b"<html></html>"), "text/plain; charset=utf-8");
        assert_eq!(sniff_mime(&[0xff, 0x00, 0xfe, 0x01]), "application/octet-stream");
    }

    #[tokio::test]
    async fn local_png_is_accepted_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.txt");
        std::fs::write(&path, png_bytes(4, 3)).unwrap();

        let http = reqwest::Client::new();
        let cover = fetch_cover(&http, path.to_str().unwrap()).await.unwrap();
        assert_eq!(cover.mime, "image/png");
        assert_eq!(cover.data, png_bytes(4, 3));
    }

    #[tokio::test]
    async fn local_text_file_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, "definitely not an image").unwrap();

        let http = reqwest::Client::new();
        let err = fetch_cover(&http, path.to_str().unwrap()).await.unwrap_err();
        match err {
            Error::InvalidFormat(mime) => assert!(mime.starts_with("text/plain")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_fetch_error() {
        let http = reqwest::Client::new();
        let err = fetch_cover(&http, "/nonexistent/dir/cover.png").await.unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Io(_))));
    }
}
