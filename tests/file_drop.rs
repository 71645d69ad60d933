use eframe::egui;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtitle_extractor::gui::{ExtractorApp, PointerEvent};
use subtitle_extractor::media::{FrameSource, MediaDescriptor};
use subtitle_extractor::remote::{
    ExtractRequest, ExtractionResult, RemoteError, RemoteService, UploadHandle, UploadReceipt,
};
use subtitle_extractor::roi::SurfaceSize;
use subtitle_extractor::settings::Settings;
use subtitle_extractor::workflow::{SelectedFile, WorkflowState};
use tempfile::tempdir;

struct StillSource;

impl FrameSource for StillSource {
    fn probe(&self, _path: &Path) -> anyhow::Result<MediaDescriptor> {
        Ok(MediaDescriptor::new(8.0, 64, 36).unwrap())
    }

    fn frame_at(&self, _path: &Path, _at: f64) -> anyhow::Result<RgbaImage> {
        Ok(RgbaImage::from_pixel(64, 36, Rgba([10, 20, 30, 255])))
    }
}

struct InstantRemote {
    payload: Option<&'static str>,
}

const SRT: &str = "1\n00:00:00,000 --> 00:00:01,000\nhi\n\n";

impl RemoteService for InstantRemote {
    fn upload(&self, file: &SelectedFile) -> Result<UploadReceipt, RemoteError> {
        Ok(UploadReceipt {
            handle: UploadHandle::new(format!("srv-{}", file.name)),
            media: MediaDescriptor::new(8.0, 64, 36).unwrap(),
        })
    }

    fn extract(&self, _request: &ExtractRequest) -> Result<ExtractionResult, RemoteError> {
        Ok(ExtractionResult {
            succeeded: true,
            text_payload: self.payload.map(str::to_string),
            elapsed_seconds: Some(0.4),
            failure_reason: None,
        })
    }
}

fn new_app(export_dir: Option<PathBuf>) -> ExtractorApp {
    app_with_payload(export_dir, Some(SRT))
}

fn app_with_payload(export_dir: Option<PathBuf>, payload: Option<&'static str>) -> ExtractorApp {
    let settings = Settings {
        enable_toasts: false,
        export_dir,
        ..Default::default()
    };
    let remote = InstantRemote { payload };
    ExtractorApp::new(settings, Arc::new(remote), Arc::new(StillSource))
}

fn extract_with_area(app: &mut ExtractorApp) {
    app.select_path(Path::new("talk.mp4"));
    app.upload();
    pump_until(app, |app| app.controller().state() == WorkflowState::Uploaded);

    let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(32.0, 18.0));
    let native = SurfaceSize::from_pixels(64, 36);
    let video = app.video_mut();
    video.handle_pointer(PointerEvent::Down(egui::pos2(2.0, 10.0)), rect, native);
    video.handle_pointer(PointerEvent::Move(egui::pos2(30.0, 16.0)), rect, native);
    video.handle_pointer(PointerEvent::Up, rect, native);
    assert_eq!(app.video().selection().unwrap().rounded(), (4, 20, 56, 12));

    app.extract();
    pump_until(app, |app| app.controller().state() == WorkflowState::Result);
}

fn pump_until(app: &mut ExtractorApp, done: impl Fn(&ExtractorApp) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(app) {
        assert!(Instant::now() < deadline, "background work did not finish");
        std::thread::sleep(Duration::from_millis(5));
        app.poll_background();
    }
}

#[test]
fn dropping_video_selects_it_and_loads_preview() {
    let mut app = new_app(None);
    let dropped = egui::DroppedFile {
        path: Some(std::env::temp_dir().join("movie.mkv")),
        ..Default::default()
    };
    app.handle_dropped_files(vec![dropped]);
    assert_eq!(app.controller().state(), WorkflowState::FileSelected);
    assert_eq!(app.controller().file().unwrap().name, "movie.mkv");

    pump_until(&mut app, |app| app.session().is_ready() && app.video().has_frame());
    assert_eq!(app.session().duration(), Some(8.0));
}

#[test]
fn dropping_non_video_is_rejected() {
    let mut app = new_app(None);
    let dropped = egui::DroppedFile {
        path: Some(std::env::temp_dir().join("notes.txt")),
        ..Default::default()
    };
    app.handle_dropped_files(vec![dropped]);
    assert_eq!(app.controller().state(), WorkflowState::NoFile);
    assert_eq!(app.error.as_deref(), Some(
        "Please select a video file ('notes.txt' is not a recognised video)"
    ));
}

#[test]
fn full_session_exports_result() {
    let dir = tempdir().unwrap();
    let mut app = new_app(Some(dir.path().to_path_buf()));
    extract_with_area(&mut app);

    let path = app.download_result().unwrap();
    assert_eq!(path, dir.path().join("srv-talk.srt"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), SRT);
}

#[test]
fn empty_result_is_not_exported() {
    for payload in [None, Some("")] {
        let dir = tempdir().unwrap();
        let mut app = app_with_payload(Some(dir.path().to_path_buf()), payload);
        extract_with_area(&mut app);

        assert_eq!(app.download_result(), None);
        assert!(!dir.path().join("srv-talk.srt").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(app.last_export.is_none());
    }
}

#[test]
fn headless_frame_renders_without_panicking() {
    let ctx = egui::Context::default();
    let mut app = new_app(None);
    let _ = ctx.run(Default::default(), |ctx| app.ui(ctx));

    app.select_path(Path::new("clip.mov"));
    pump_until(&mut app, |app| app.session().is_ready());
    for _ in 0..3 {
        let _ = ctx.run(Default::default(), |ctx| app.ui(ctx));
    }
    assert_eq!(app.controller().state(), WorkflowState::FileSelected);
}
