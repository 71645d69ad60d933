use subtitle_extractor::gui::ExtractorApp;
use subtitle_extractor::logging;
use subtitle_extractor::media::FfmpegSource;
use subtitle_extractor::remote::HttpRemote;
use subtitle_extractor::settings::{Settings, DEFAULT_SETTINGS_FILE};

use anyhow::Context;
use eframe::egui;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("failed to load settings from {settings_path}"))?;
    logging::init(settings.debug_logging, settings.log_file.as_deref());
    tracing::info!(api = %settings.api_url, settings = %settings_path, "starting");

    let remote = HttpRemote::new(&settings.api_url, settings.request_timeout())?;
    let source = FfmpegSource::new(settings.ffprobe_path.clone(), settings.ffmpeg_path.clone());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Subtitle Extractor",
        native_options,
        Box::new(move |_cc| {
            Box::new(ExtractorApp::new(
                settings,
                Arc::new(remote),
                Arc::new(source),
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}
