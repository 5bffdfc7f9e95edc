use std::fs::OpenOptions;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing_subscriber::{EnvFilter, filter::filter_fn, fmt, prelude::*};

use crate::config::paths;

/// 表单占用终端期间为 true，此时 stderr 输出会打乱画面
static TUI_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_tui_active(active: bool) {
    TUI_ACTIVE.store(active, Ordering::Relaxed);
}

fn tui_active() -> bool {
    TUI_ACTIVE.load(Ordering::Relaxed)
}

/// 安装全局订阅者：日志文件 + 表单外的 stderr
pub fn init() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("yttag=info".parse()?)
        .add_directive("yttag_core=info".parse()?);

    // 日志文件打不开不影响使用，只是少了文件层
    let file_layer = paths::log_file()
        .and_then(|path| {
            Ok(OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?)
        })
        .ok()
        .map(|file| {
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
        });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(filter_fn(|_| !tui_active()));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_round_trips() {
        set_tui_active(true);
        assert!(tui_active());
        set_tui_active(false);
        assert!(!tui_active());
    }
}
