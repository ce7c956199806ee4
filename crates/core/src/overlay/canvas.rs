use image::Rgb;

use crate::shared::geometry::{BoundingBox, Point};

/// Drawing surface for annotation overlays.
///
/// Implementations mutate their backing buffer in place and clip anything
/// that falls outside it.
pub trait Canvas {
    fn draw_rect(&mut self, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32);

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb<u8>, thickness: u32);

    /// Filled disc centered on `center`.
    fn draw_marker(&mut self, center: Point, radius: u32, color: Rgb<u8>);

    fn draw_label(&mut self, text: &str, at: Point, color: Rgb<u8>);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    pub bbox_color: Rgb<u8>,
    pub landmark_color: Rgb<u8>,
    pub thickness: u32,
    /// Draw each landmark's zero-based index next to it.
    pub draw_labels: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            bbox_color: Rgb([0, 255, 0]),
            landmark_color: Rgb([255, 0, 0]),
            thickness: 1,
            draw_labels: false,
        }
    }
}
