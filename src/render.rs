//! Composites the current video frame and the ROI overlay into a buffer at
//! native resolution. The GUI uploads the buffer as a texture and lets egui
//! scale it to the laid-out size.

use crate::media::MediaDescriptor;
use crate::roi::Rectangle;
use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    pub stroke: Rgba<u8>,
    pub stroke_width: u32,
    /// On/off lengths of the dashed outline, in native pixels.
    pub dash: (u32, u32),
    pub fill: Rgba<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke: Rgba([0, 255, 0, 255]),
            stroke_width: 3,
            dash: (5, 5),
            fill: Rgba([0, 255, 0, 26]),
        }
    }
}

#[derive(Debug, Default)]
pub struct RenderSurface {
    pixels: RgbaImage,
    style: OverlayStyle,
    #[cfg(test)]
    allocation_count: usize,
}

impl RenderSurface {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            style,
            #[cfg(test)]
            allocation_count: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn ensure_size(&mut self, size: (u32, u32)) -> bool {
        if self.pixels.dimensions() == size {
            return false;
        }
        self.pixels = RgbaImage::new(size.0, size.1);
        #[cfg(test)]
        {
            self.allocation_count += 1;
        }
        true
    }

    /// Redraw `frame` plus the selection overlay.
    ///
    /// The surface is resized to the media's native size first. A frame whose
    /// size does not match (e.g. a late decode from a previous source) is
    /// skipped and the surface is left black under the overlay.
    pub fn redraw(
        &mut self,
        media: &MediaDescriptor,
        frame: Option<&RgbaImage>,
        selection: Option<Rectangle>,
    ) -> &RgbaImage {
        let size = (media.native_width, media.native_height);
        self.ensure_size(size);

        match frame {
            Some(frame) if frame.dimensions() == size => {
                self.pixels.copy_from_slice(frame.as_raw());
            }
            Some(frame) => {
                tracing::debug!(
                    frame_w = frame.width(),
                    frame_h = frame.height(),
                    "frame size does not match surface, skipping"
                );
                clear(&mut self.pixels);
            }
            None => clear(&mut self.pixels),
        }

        if let Some(rect) = selection {
            draw_rect_fill(&mut self.pixels, rect, self.style.fill);
            draw_dashed_outline(&mut self.pixels, rect, self.style);
        }
        &self.pixels
    }
}

fn clear(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        *px = Rgba([0, 0, 0, 255]);
    }
}

fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    let [r, g, b, a] = color.0;
    if a == 0 {
        return;
    }
    let dst = img.get_pixel(x, y).0;
    let src_a = a as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    let blend = |src: u8, dst: u8| {
        let src_f = src as f32 / 255.0;
        let dst_f = dst as f32 / 255.0;
        ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    img.put_pixel(
        x,
        y,
        Rgba([
            blend(r, dst[0]),
            blend(g, dst[1]),
            blend(b, dst[2]),
            (out_a * 255.0).round() as u8,
        ]),
    );
}

/// Pixel span `[start, end)` of `rect` clipped to the image, or `None` if
/// nothing is visible.
fn pixel_bounds(img: &RgbaImage, rect: Rectangle) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = (rect.max_x().ceil().max(0.0) as u32).min(img.width());
    let y1 = (rect.max_y().ceil().max(0.0) as u32).min(img.height());
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, x1, y1))
}

fn draw_rect_fill(img: &mut RgbaImage, rect: Rectangle, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = pixel_bounds(img, rect) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(img, x, y, color);
        }
    }
}

fn draw_dashed_outline(img: &mut RgbaImage, rect: Rectangle, style: OverlayStyle) {
    let Some((x0, y0, x1, y1)) = pixel_bounds(img, rect) else {
        return;
    };
    let (on, off) = style.dash;
    let period = (on + off).max(1);
    let half = style.stroke_width / 2;
    // The dash pattern runs continuously around the perimeter.
    let w = x1 - x0;
    let h = y1 - y0;
    let perimeter = 2 * (w + h);
    for step in 0..perimeter {
        if step % period >= on {
            continue;
        }
        let (cx, cy) = if step < w {
            (x0 + step, y0)
        } else if step < w + h {
            (x1 - 1, y0 + (step - w))
        } else if step < 2 * w + h {
            (x1 - 1 - (step - w - h), y1 - 1)
        } else {
            (x0, y1 - 1 - (step - 2 * w - h))
        };
        let sx0 = cx.saturating_sub(half);
        let sy0 = cy.saturating_sub(half);
        let sx1 = (cx + half + 1).min(img.width());
        let sy1 = (cy + half + 1).min(img.height());
        for y in sy0..sy1 {
            for x in sx0..sx1 {
                img.put_pixel(x, y, style.stroke);
            }
        }
    }
}
