use crate::media::{format_time, MediaDescriptor, MediaSession};
use crate::render::{OverlayStyle, RenderSurface};
use crate::roi::{map_to_native, Point, Rectangle, RoiSelector, SurfaceSize};
use eframe::egui::{
    self, Color32, PointerButton, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2,
};
use image::RgbaImage;

/// Pointer input on the video surface, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up,
    /// The pointer left the surface while the button was held.
    Leave(Pos2),
}

/// Playback request raised by the panel controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoCommand {
    TogglePlayback,
    Seek(f64),
}

/// The video surface: current frame, ROI overlay and playback controls.
pub struct VideoPanel {
    selector: RoiSelector,
    surface: RenderSurface,
    texture: Option<TextureHandle>,
    frame: Option<RgbaImage>,
    dirty: bool,
}

impl Default for VideoPanel {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

impl VideoPanel {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            selector: RoiSelector::new(),
            surface: RenderSurface::new(style),
            texture: None,
            frame: None,
            dirty: true,
        }
    }

    /// Forget everything tied to the previous source.
    pub fn reset(&mut self) {
        self.selector.clear();
        self.frame = None;
        self.texture = None;
        self.dirty = true;
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn set_frame(&mut self, frame: RgbaImage) {
        self.frame = Some(frame);
        self.dirty = true;
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn selector(&self) -> &RoiSelector {
        &self.selector
    }

    /// Committed selection in native pixels.
    pub fn selection(&self) -> Option<Rectangle> {
        self.selector.committed()
    }

    pub fn clear_selection(&mut self) {
        self.selector.clear();
        self.dirty = true;
    }

    /// Feed one pointer event. `rect` is where the surface is laid out on
    /// screen this frame and `native` the media's pixel size.
    pub fn handle_pointer(&mut self, event: PointerEvent, rect: Rect, native: SurfaceSize) {
        let displayed = SurfaceSize::new(rect.width(), rect.height());
        let to_native = |pos: Pos2| {
            let local = rect.clamp(pos) - rect.min;
            map_to_native(Point::new(local.x, local.y), displayed, native)
        };
        match event {
            PointerEvent::Down(pos) => {
                if let Some(p) = to_native(pos) {
                    self.selector.begin_drag(p);
                }
            }
            PointerEvent::Move(pos) => {
                if let Some(p) = to_native(pos) {
                    self.selector.update_drag(p);
                }
            }
            PointerEvent::Up => {
                self.selector.end_drag();
            }
            PointerEvent::Leave(pos) => {
                if self.selector.is_dragging() {
                    self.selector.cancel_drag(to_native(pos));
                }
            }
        }
        self.dirty = true;
    }

    fn refresh_texture(&mut self, ctx: &egui::Context, media: &MediaDescriptor) {
        if !self.dirty && self.texture.is_some() {
            return;
        }
        let pixels = self
            .surface
            .redraw(media, self.frame.as_ref(), self.selector.visible());
        let size = [pixels.width() as usize, pixels.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_raw());
        match &mut self.texture {
            Some(tex) => tex.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("video-surface", image, TextureOptions::LINEAR))
            }
        }
        self.dirty = false;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, session: &MediaSession) -> Option<VideoCommand> {
        let Some(media) = session.descriptor() else {
            ui.centered_and_justified(|ui| {
                ui.label("Drop a video here or use File → Open video…");
            });
            return None;
        };

        let native = SurfaceSize::from_pixels(media.native_width, media.native_height);
        let avail = ui.available_size();
        let max_h = (avail.y - 90.0).max(120.0);
        let scale = (avail.x / native.width).min(max_h / native.height).max(0.01);
        let display = Vec2::new(native.width * scale, native.height * scale);

        let (response, painter) = ui.allocate_painter(display, Sense::drag());
        let rect = response.rect;
        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.handle_pointer(PointerEvent::Down(pos), rect, native);
            }
        }
        if response.dragged_by(PointerButton::Primary) && self.selector.is_dragging() {
            if let Some(pos) = response.interact_pointer_pos() {
                let event = if rect.contains(pos) {
                    PointerEvent::Move(pos)
                } else {
                    PointerEvent::Leave(pos)
                };
                self.handle_pointer(event, rect, native);
            }
        }
        if response.drag_stopped_by(PointerButton::Primary) {
            self.handle_pointer(PointerEvent::Up, rect, native);
        }

        self.refresh_texture(ui.ctx(), &media);
        if let Some(tex) = &self.texture {
            painter.image(
                tex.id(),
                rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        let mut command = None;
        ui.horizontal(|ui| {
            let label = if session.is_playing() { "Pause" } else { "Play" };
            if ui.button(label).clicked() {
                command = Some(VideoCommand::TogglePlayback);
            }
            let mut pos = session.position();
            let slider = egui::Slider::new(&mut pos, 0.0..=media.duration_seconds).show_value(false);
            if ui.add(slider).changed() {
                command = Some(VideoCommand::Seek(pos));
            }
            ui.monospace(format!(
                "{} / {}",
                format_time(session.position()),
                format_time(media.duration_seconds)
            ));
        });

        ui.horizontal(|ui| match self.selector.committed() {
            Some(roi) => {
                let (x, y, w, h) = roi.rounded();
                ui.label(format!("Selected area: X {x}, Y {y}, W {w}, H {h}"));
                if ui.button("Clear selection").clicked() {
                    self.clear_selection();
                }
            }
            None => {
                ui.weak("Drag on the video to select the subtitle area");
            }
        });
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Rect {
        Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(320.0, 180.0))
    }

    const NATIVE: SurfaceSize = SurfaceSize::new(1280.0, 720.0);

    #[test]
    fn drag_is_recorded_in_native_pixels() {
        let mut panel = VideoPanel::default();
        panel.handle_pointer(PointerEvent::Down(Pos2::new(110.0, 60.0)), surface(), NATIVE);
        panel.handle_pointer(PointerEvent::Move(Pos2::new(210.0, 110.0)), surface(), NATIVE);
        assert!(panel.selection().is_none());
        panel.handle_pointer(PointerEvent::Up, surface(), NATIVE);
        let roi = panel.selection().unwrap();
        assert_eq!(roi.rounded(), (40, 40, 400, 200));
    }

    #[test]
    fn leaving_the_surface_commits_up_to_the_edge() {
        let mut panel = VideoPanel::default();
        panel.handle_pointer(PointerEvent::Down(Pos2::new(260.0, 140.0)), surface(), NATIVE);
        panel.handle_pointer(PointerEvent::Leave(Pos2::new(900.0, 400.0)), surface(), NATIVE);
        assert!(!panel.selector().is_dragging());
        let roi = panel.selection().unwrap();
        assert_eq!(roi.rounded(), (640, 360, 640, 360));
        // the release that follows has nothing left to do
        panel.handle_pointer(PointerEvent::Up, surface(), NATIVE);
        assert_eq!(panel.selection().unwrap().rounded(), (640, 360, 640, 360));
    }

    #[test]
    fn reset_drops_selection_and_frame() {
        let mut panel = VideoPanel::default();
        panel.set_frame(RgbaImage::new(4, 4));
        panel.handle_pointer(PointerEvent::Down(Pos2::new(110.0, 60.0)), surface(), NATIVE);
        panel.handle_pointer(PointerEvent::Move(Pos2::new(150.0, 90.0)), surface(), NATIVE);
        panel.handle_pointer(PointerEvent::Up, surface(), NATIVE);
        assert!(panel.selection().is_some());
        panel.reset();
        assert!(panel.selection().is_none());
        assert!(!panel.has_frame());
    }
}
