use crate::remote::ExtractionResult;
use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    /// Save into the configured export directory.
    Download,
    /// Save through a file dialog.
    SaveAs,
    Copy,
}

pub fn result_ui(ui: &mut egui::Ui, result: &ExtractionResult) -> Option<ResultAction> {
    let mut action = None;
    ui.heading("Subtitles");
    if let Some(elapsed) = result.elapsed_seconds {
        ui.label(format!("Processing time: {elapsed:.1}s"));
    }

    let text = result.subtitles();
    if let Some(text) = text {
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .show(ui, |ui| {
                let mut view = text;
                ui.add(
                    egui::TextEdit::multiline(&mut view)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(f32::INFINITY),
                );
            });
    } else {
        ui.weak("No subtitles extracted");
    }

    // nothing to save or copy without subtitle text
    ui.add_enabled_ui(text.is_some(), |ui| {
        ui.horizontal(|ui| {
            if ui.button("Download").clicked() {
                action = Some(ResultAction::Download);
            }
            if ui.button("Save as…").clicked() {
                action = Some(ResultAction::SaveAs);
            }
            if ui.button("Copy").clicked() {
                action = Some(ResultAction::Copy);
            }
        });
    });
    action
}
