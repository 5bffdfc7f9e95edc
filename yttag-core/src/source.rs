/// 封面来源是否为 http(s) URL；否则按本地路径处理
pub fn is_url(source: &str) -> bool {
    let lower = source.get(..8).unwrap_or(source).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_http_and_https() {
        assert!(is_url("http://x/img.png"));
        assert!(is_url("https://i.ytimg.com/vi/abc/maxresdefault.jpg"));
        assert!(is_url("HTTPS://EXAMPLE.COM/a.png"));
    }

    #[test]
    fn paths_are_not_urls() {
        assert!(!is_url("cover.png"));
        assert!(!is_url("/home/me/https://weird.png"));
        assert!(!is_url("ftp://example.com/a.png"));
        assert!(!is_url(""));
        assert!(!is_url("http:/"));
    }
}
