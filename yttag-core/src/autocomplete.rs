use std::path::{Path, PathBuf, is_separator};

/// 列出输入路径所在目录的全部条目，作为封面输入框的候选项。
/// 读取失败时返回空列表。
pub fn complete_directory(input: &str) -> Vec<String> {
    let dir = parent_dir(input);
    let Ok(entries) = std::fs::read_dir(dir.as_deref().unwrap_or(Path::new("."))) else {
        return Vec::new();
    };
    let mut out: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| match &dir {
            Some(d) => d.join(e.file_name()).to_string_lossy().into_owned(),
            None => e.file_name().to_string_lossy().into_owned(),
        })
        .collect();
    out.sort();
    out
}

/// 输入所在目录；当前目录返回 None，候选项保持相对写法
fn parent_dir(input: &str) -> Option<PathBuf> {
    if input.ends_with(is_separator) {
        let trimmed = input.trim_end_matches(is_separator);
        return Some(if trimmed.is_empty() {
            PathBuf::from(&input[..1])
        } else {
            PathBuf::from(trimmed)
        });
    }
    match Path::new(input).parent() {
        Some(p) if p.as_os_str().is_empty() => None,
        Some(p) => Some(p.to_path_buf()),
        // 根目录
        None if !input.is_empty() => Some(PathBuf::from(input)),
        None => None,
    }
}
