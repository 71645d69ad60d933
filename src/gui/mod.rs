mod params_panel;
mod result_panel;
mod video_panel;

pub use params_panel::WorkflowAction;
pub use result_panel::ResultAction;
pub use video_panel::{PointerEvent, VideoCommand, VideoPanel};

use crate::export::{self, ExportError, SystemClipboard};
use crate::media::{FrameFetcher, FrameSource, MediaEvent, MediaSession};
use crate::remote::RemoteService;
use crate::settings::Settings;
use crate::toast_log::append_toast_log;
use crate::workflow::{
    Completion, SamplingInterval, WorkflowController, WorkflowError, WorkflowRunner,
    WorkflowUpdate,
};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimum playback distance between two preview decodes.
const FRAME_STEP_SECS: f64 = 0.1;
const ERROR_DISPLAY_SECS: f32 = 5.0;

fn push_toast(toasts: &mut Toasts, toast: Toast, log: Option<&Path>) {
    if let Some(path) = log {
        append_toast_log(path, toast.text.text());
    }
    toasts.add(toast);
}

pub struct ExtractorApp {
    settings: Settings,
    runner: WorkflowRunner,
    fetcher: FrameFetcher,
    session: MediaSession,
    video: VideoPanel,
    last_frame_request: Option<f64>,
    toasts: Toasts,
    enable_toasts: bool,
    toast_duration: f32,
    pub error: Option<String>,
    error_time: Option<Instant>,
    /// Where the last export landed.
    pub last_export: Option<PathBuf>,
}

impl ExtractorApp {
    pub fn new(
        settings: Settings,
        service: Arc<dyn RemoteService>,
        source: Arc<dyn FrameSource>,
    ) -> Self {
        let controller = WorkflowController::new(
            settings.max_initial_window_secs,
            SamplingInterval::new(settings.default_interval),
        );
        Self {
            runner: WorkflowRunner::new(controller, service),
            fetcher: FrameFetcher::spawn(source),
            session: MediaSession::new(),
            video: VideoPanel::default(),
            last_frame_request: None,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
            error: None,
            error_time: None,
            last_export: None,
            settings,
        }
    }

    pub fn controller(&self) -> &WorkflowController {
        self.runner.controller()
    }

    pub fn session(&self) -> &MediaSession {
        &self.session
    }

    pub fn video(&self) -> &VideoPanel {
        &self.video
    }

    pub fn video_mut(&mut self) -> &mut VideoPanel {
        &mut self.video
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some(msg);
        self.error_time = Some(Instant::now());
    }

    fn notify(&mut self, kind: ToastKind, text: impl Into<String>) {
        let text = text.into();
        if !self.enable_toasts {
            if let Some(path) = &self.settings.notice_log {
                append_toast_log(path, &text);
            }
            return;
        }
        push_toast(
            &mut self.toasts,
            Toast {
                text: text.into(),
                kind,
                options: ToastOptions::default().duration_in_seconds(self.toast_duration as f64),
            },
            self.settings.notice_log.as_deref(),
        );
    }

    fn report(&mut self, err: WorkflowError) {
        let msg = err.to_string();
        tracing::info!(error = %msg, "request refused");
        self.notify(ToastKind::Warning, msg.clone());
        self.set_error(msg);
    }

    /// Make `path` the current video. Anything derived from the previous one
    /// is discarded.
    pub fn select_path(&mut self, path: &Path) {
        let selected = self
            .runner
            .controller_mut()
            .select_file(path)
            .map(|file| (file.id, file.path.clone()));
        let (id, path) = match selected {
            Ok(sel) => sel,
            Err(e) => {
                self.report(e);
                return;
            }
        };
        self.session.unload();
        self.video.reset();
        self.error = None;
        self.error_time = None;
        self.last_frame_request = None;
        self.fetcher.probe(id, path);
        self.request_frame(0.0);
    }

    pub fn handle_dropped_files(&mut self, files: Vec<egui::DroppedFile>) {
        if let Some(path) = files.into_iter().find_map(|f| f.path) {
            tracing::debug!(path = %path.display(), "file dropped");
            self.select_path(&path);
        }
    }

    fn open_dialog(&mut self) {
        let exts = crate::media::video_extensions();
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Video", &exts)
            .pick_file()
        {
            self.select_path(&path);
        }
    }

    fn request_frame(&mut self, at: f64) {
        if let Some(file) = self.runner.controller().file() {
            self.fetcher.request_frame(file.id, file.path.clone(), at);
            self.last_frame_request = Some(at);
        }
    }

    pub fn upload(&mut self) {
        if let Err(e) = self.runner.upload() {
            self.report(e);
        }
    }

    pub fn extract(&mut self) {
        let window = self.runner.controller().time_window();
        let interval = self.runner.controller().interval();
        let selection = self.video.selection();
        if let Err(e) = self.runner.extract(window, interval, selection) {
            self.report(e);
        }
    }

    /// Save the current result into the export directory. Does nothing when
    /// there is no result or it carries no subtitle text.
    pub fn download_result(&mut self) -> Option<PathBuf> {
        let text = self.result_text()?;
        let base = export::export_base_name(self.runner.controller().upload_handle());
        let dir = self.settings.export_dir();
        let outcome = export::export_as_file(&text, &base, &dir);
        self.finish_export(outcome)
    }

    fn save_result_as(&mut self) {
        let Some(text) = self.result_text() else {
            return;
        };
        let base = export::export_base_name(self.runner.controller().upload_handle());
        let Some(path) = rfd::FileDialog::new()
            .set_directory(self.settings.export_dir())
            .set_file_name(export::export_file_name(&base))
            .add_filter("SubRip", &[export::EXPORT_EXTENSION])
            .save_file()
        else {
            return;
        };
        let outcome = export::write_export(&text, &path).map(|_| path);
        self.finish_export(outcome);
    }

    fn finish_export(&mut self, outcome: Result<PathBuf, ExportError>) -> Option<PathBuf> {
        match outcome {
            Ok(path) => {
                self.notify(ToastKind::Success, format!("Saved {}", path.display()));
                self.last_export = Some(path.clone());
                Some(path)
            }
            Err(e) => {
                self.notify(ToastKind::Error, format!("Could not save subtitles: {e}"));
                None
            }
        }
    }

    fn copy_result(&mut self) {
        let Some(text) = self.result_text() else {
            return;
        };
        match export::copy_to_clipboard(&text, &mut SystemClipboard) {
            Ok(()) => self.notify(ToastKind::Success, "Copied to clipboard"),
            Err(e) => self.notify(ToastKind::Warning, format!("Could not copy: {e}")),
        }
    }

    fn result_text(&self) -> Option<String> {
        let result = self.runner.controller().result()?;
        result.subtitles().map(str::to_string)
    }

    fn poll_media(&mut self) {
        while let Some(event) = self.fetcher.try_next() {
            let current = self.runner.controller().file().map(|f| f.id);
            if Some(event.generation()) != current {
                continue;
            }
            match event {
                MediaEvent::Probed {
                    generation,
                    result: Ok(media),
                } => {
                    // an upload response, when already in, wins over the local probe
                    if self.runner.controller().media().is_some() {
                        continue;
                    }
                    if self.runner.controller_mut().media_loaded(generation, media)
                        == Completion::Applied
                    {
                        self.session.load(media);
                        self.video.invalidate();
                    }
                }
                MediaEvent::Probed {
                    result: Err(reason),
                    ..
                } => {
                    self.notify(
                        ToastKind::Warning,
                        format!("Could not read video locally: {reason}"),
                    );
                }
                MediaEvent::Frame { image, .. } => self.video.set_frame(image),
                MediaEvent::FrameFailed { at, reason, .. } => {
                    tracing::debug!(at, %reason, "preview frame unavailable");
                }
            }
        }
    }

    fn poll_workflow(&mut self) {
        for update in self.runner.poll() {
            match update {
                WorkflowUpdate::Uploaded => {
                    if let Some(media) = self.runner.controller().media() {
                        if self.session.descriptor() != Some(media) {
                            self.session.load(media);
                            self.video.invalidate();
                            self.request_frame(0.0);
                        }
                    }
                    self.notify(ToastKind::Success, "Video uploaded");
                }
                WorkflowUpdate::Extracted => {
                    self.notify(ToastKind::Success, "Subtitles extracted");
                }
                WorkflowUpdate::Failed(err) => {
                    self.notify(ToastKind::Error, err.reason.clone());
                    self.set_error(err.reason);
                }
                WorkflowUpdate::Stale(op) => {
                    tracing::debug!(%op, "ignored response for a replaced video");
                }
            }
        }
    }

    /// Drain background results. Called once per frame by [`eframe::App::update`].
    pub fn poll_background(&mut self) {
        self.poll_media();
        self.poll_workflow();
    }

    fn advance_playback(&mut self, now: Instant) {
        if !self.session.is_playing() {
            return;
        }
        let pos = self.session.tick(now);
        let due = self
            .last_frame_request
            .map_or(true, |last| (pos - last).abs() >= FRAME_STEP_SECS);
        if due && !self.fetcher.frame_pending() {
            self.request_frame(pos);
        }
    }

    fn apply_video_command(&mut self, command: VideoCommand, now: Instant) {
        match command {
            VideoCommand::TogglePlayback => self.session.toggle(now),
            VideoCommand::Seek(at) => {
                self.session.seek(at, now);
                self.request_frame(self.session.position());
            }
        }
    }

    /// Lay out the whole window.
    pub fn ui(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if self.enable_toasts {
            self.toasts.show(ctx);
        }
        if let (Some(t), Some(_)) = (self.error_time, self.error.as_ref()) {
            if t.elapsed().as_secs_f32() >= ERROR_DISPLAY_SECS {
                self.error = None;
                self.error_time = None;
            }
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            self.handle_dropped_files(dropped);
        }
        self.poll_background();
        self.advance_playback(now);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open video…").clicked() {
                        ui.close_menu();
                        self.open_dialog();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::SidePanel::right("workflow_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                match params_panel::params_ui(ui, self.runner.controller_mut()) {
                    Some(WorkflowAction::Upload) => self.upload(),
                    Some(WorkflowAction::Extract) => self.extract(),
                    None => {}
                }
                let action = self
                    .runner
                    .controller()
                    .result()
                    .and_then(|result| {
                        ui.separator();
                        result_panel::result_ui(ui, result)
                    });
                match action {
                    Some(ResultAction::Download) => {
                        self.download_result();
                    }
                    Some(ResultAction::SaveAs) => self.save_result_as(),
                    Some(ResultAction::Copy) => self.copy_result(),
                    None => {}
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.error {
                ui.colored_label(ui.visuals().error_fg_color, err.as_str());
            }
            if let Some(command) = self.video.ui(ui, &self.session) {
                self.apply_video_command(command, now);
            }
        });

        if self.session.is_playing()
            || self.runner.controller().state().is_busy()
            || self.fetcher.frame_pending()
        {
            ctx.request_repaint_after(Duration::from_millis(33));
        }
    }
}

impl eframe::App for ExtractorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}
