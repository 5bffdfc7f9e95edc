mod app;
mod config;
mod flow;
mod logging;
mod ui;

use std::path::Path;

use anyhow::Result;
use yttag_core::source::is_url;

use crate::config::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "yttag".to_string());
    let Some(target) = args.next() else {
        eprintln!("usage:\n  {program} YOUTUBE_LINK | AUDIO_FILE");
        return Err(yttag_core::Error::Config("缺少参数".to_string()).into());
    };

    let settings = Settings::load()?;
    if is_url(&target) {
        flow::download_and_tag(&settings, &target).await
    } else {
        flow::edit_file(&settings, Path::new(&target)).await
    }
}
