use std::fs;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;

use crate::shared::error::{LandmarkError, Result};
use crate::shared::geometry::{BoundingBox, Point};

use super::canvas::Canvas;

const DEFAULT_LABEL_SCALE: f32 = 12.0;

/// Loads a TrueType/OpenType font for landmark labels.
pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = fs::read(path)?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| LandmarkError::InvalidConfig(format!("font {}: {e}", path.display())))
}

/// [`Canvas`] backed by an in-memory RGB image.
///
/// Labels need a font; without one they are skipped and a single warning
/// is logged.
pub struct ImageCanvas<'a> {
    image: &'a mut RgbImage,
    font: Option<&'a FontArc>,
    label_scale: PxScale,
    warned_no_font: bool,
}

impl<'a> ImageCanvas<'a> {
    pub fn new(image: &'a mut RgbImage) -> Self {
        Self {
            image,
            font: None,
            label_scale: PxScale::from(DEFAULT_LABEL_SCALE),
            warned_no_font: false,
        }
    }

    pub fn with_font(mut self, font: &'a FontArc, size: f32) -> Self {
        self.font = Some(font);
        self.label_scale = PxScale::from(size.max(1.0));
        self
    }
}

impl Canvas for ImageCanvas<'_> {
    fn draw_rect(&mut self, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
        // inset one rectangle per pixel of thickness
        for i in 0..thickness.max(1) as i32 {
            let w = bbox.width - 2 * i;
            let h = bbox.height - 2 * i;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(bbox.x + i, bbox.y + i).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut *self.image, rect, color);
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb<u8>, thickness: u32) {
        let t = thickness.max(1) as i32;
        let lo = -(t - 1) / 2;
        let hi = t / 2;
        let (a, b) = ((from.x as f32, from.y as f32), (to.x as f32, to.y as f32));
        for d in lo..=hi {
            let d = d as f32;
            draw_line_segment_mut(&mut *self.image, (a.0 + d, a.1), (b.0 + d, b.1), color);
            if d != 0.0 {
                draw_line_segment_mut(&mut *self.image, (a.0, a.1 + d), (b.0, b.1 + d), color);
            }
        }
    }

    fn draw_marker(&mut self, center: Point, radius: u32, color: Rgb<u8>) {
        draw_filled_circle_mut(&mut *self.image, (center.x, center.y), radius as i32, color);
    }

    fn draw_label(&mut self, text: &str, at: Point, color: Rgb<u8>) {
        match self.font {
            Some(font) => {
                draw_text_mut(&mut *self.image, color, at.x, at.y, self.label_scale, font, text);
            }
            None if !self.warned_no_font => {
                log::warn!("No label font loaded, skipping landmark labels");
                self.warned_no_font = true;
            }
            None => {}
        }
    }
}
