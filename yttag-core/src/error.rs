//! 错误类型，按处理阶段划分。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// 网络或文件读取失败
    #[error("封面获取失败：{0}")]
    Fetch(#[from] FetchError),

    /// 嗅探到的内容不是图片
    #[error("无效的图片格式：{0}")]
    InvalidFormat(String),

    /// 字节无法解码为图片，或无法重新编码
    #[error("图片编解码失败：{0}")]
    Decode(#[source] image::ImageError),

    /// 裁剪几何无效（如零尺寸图片）
    #[error("裁剪失败：{0}")]
    Crop(String),

    /// 标签写入或保存失败
    #[error("标签保存失败：{0}")]
    Persist(#[from] id3::Error),

    /// 命令行调用错误
    #[error("{0}")]
    Config(String),

    /// 外部下载进程失败
    #[error("下载失败：{0}")]
    Extract(String),

    /// info.json 读取或解析失败
    #[error("读取 {path} 失败：{reason}")]
    Sidecar { path: String, reason: String },
}

/// 封面来源读取阶段的底层错误
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// reqwest::Error → FetchError → Error
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Fetch(FetchError::Http(e))
    }
}
