use crate::media::format_time;
use crate::workflow::params::{INTERVAL_STEP_SECS, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};
use crate::workflow::{Operation, SamplingInterval, WorkflowController, WorkflowState};
use eframe::egui;

/// Button pressed in the workflow panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Upload,
    Extract,
}

fn state_label(state: WorkflowState) -> &'static str {
    match state {
        WorkflowState::NoFile => "No video selected",
        WorkflowState::FileSelected => "Ready to upload",
        WorkflowState::Uploading => "Uploading…",
        WorkflowState::Uploaded => "Uploaded",
        WorkflowState::Extracting => "Extracting subtitles…",
        WorkflowState::Result => "Done",
        WorkflowState::Error {
            failed: Operation::Upload,
        } => "Upload failed",
        WorkflowState::Error {
            failed: Operation::Extract,
        } => "Extraction failed",
    }
}

/// Time window, sampling interval and the upload/extract buttons.
pub fn params_ui(ui: &mut egui::Ui, wf: &mut WorkflowController) -> Option<WorkflowAction> {
    let mut action = None;
    let state = wf.state();

    ui.heading("Video");
    match wf.file() {
        Some(file) => ui.label(file.name.as_str()),
        None => ui.weak("none"),
    };
    ui.horizontal(|ui| {
        if state.is_busy() {
            ui.spinner();
        }
        ui.label(state_label(state));
    });
    if let Some(failure) = wf.failure() {
        ui.colored_label(ui.visuals().error_fg_color, failure.reason.as_str());
    }

    ui.separator();
    let upload_label = if matches!(
        state,
        WorkflowState::Error {
            failed: Operation::Upload
        }
    ) {
        "Retry upload"
    } else {
        "Upload"
    };
    let can_upload = state.can_upload() && !wf.in_flight(Operation::Upload);
    if ui
        .add_enabled(can_upload, egui::Button::new(upload_label))
        .clicked()
    {
        action = Some(WorkflowAction::Upload);
    }

    ui.separator();
    ui.heading("Extraction");
    let duration = wf.media().map(|m| m.duration_seconds);
    let max = duration.unwrap_or(f64::MAX);
    let mut window = wf.time_window();
    egui::Grid::new("extract_params")
        .num_columns(3)
        .show(ui, |ui| {
            ui.label("Start");
            ui.add(
                egui::DragValue::new(&mut window.start)
                    .clamp_range(0.0..=max)
                    .speed(0.1)
                    .suffix(" s"),
            );
            ui.monospace(format_time(window.start));
            ui.end_row();

            ui.label("End");
            ui.add(
                egui::DragValue::new(&mut window.end)
                    .clamp_range(0.0..=max)
                    .speed(0.1)
                    .suffix(" s"),
            );
            ui.monospace(format_time(window.end));
            ui.end_row();
        });
    if window != wf.time_window() {
        wf.set_time_window(window);
    }

    let mut interval = wf.interval().seconds();
    let slider = egui::Slider::new(&mut interval, MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS)
        .step_by(INTERVAL_STEP_SECS)
        .suffix(" s")
        .text("Frame interval");
    if ui.add(slider).changed() {
        wf.set_interval(SamplingInterval::new(interval));
    }

    let can_extract = state.can_extract() && !wf.in_flight(Operation::Extract);
    let extract_label = if matches!(state, WorkflowState::Result) {
        "Extract again"
    } else {
        "Extract subtitles"
    };
    if ui
        .add_enabled(can_extract, egui::Button::new(extract_label))
        .clicked()
    {
        action = Some(WorkflowAction::Extract);
    }
    action
}
