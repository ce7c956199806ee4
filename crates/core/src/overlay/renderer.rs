//! Read-only rendering of detection results onto a [`Canvas`].

use image::Rgb;

use crate::sequence::frame::{Face, Frame};
use crate::shared::constants::FACE_68_LANDMARK_COUNT;
use crate::shared::geometry::{BoundingBox, Point};

use super::canvas::{Canvas, RenderStyle};
use super::topology::face_68_segments;

/// Empty boxes are skipped.
pub fn render_bbox(canvas: &mut dyn Canvas, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    if bbox.is_empty() {
        return;
    }
    canvas.draw_rect(bbox, color, thickness);
}

/// Draws the 68-point connectivity graph when there are exactly 68
/// landmarks; any other count gets one unconnected marker per point.
pub fn render_landmarks(canvas: &mut dyn Canvas, landmarks: &[Point], style: &RenderStyle) {
    let color = style.landmark_color;
    if landmarks.len() == FACE_68_LANDMARK_COUNT {
        for (a, b) in face_68_segments() {
            canvas.draw_line(landmarks[a], landmarks[b], color, style.thickness);
        }
    } else {
        for &p in landmarks {
            canvas.draw_marker(p, style.thickness.max(1), color);
        }
    }

    if style.draw_labels {
        for (i, &p) in landmarks.iter().enumerate() {
            canvas.draw_label(&i.to_string(), p, color);
        }
    }
}

pub fn render_face(canvas: &mut dyn Canvas, face: &Face, style: &RenderStyle) {
    render_bbox(canvas, &face.bbox, style.bbox_color, style.thickness);
    render_landmarks(canvas, &face.landmarks, style);
}

pub fn render_frame(canvas: &mut dyn Canvas, frame: &Frame, style: &RenderStyle) {
    for face in &frame.faces {
        render_face(canvas, face, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Op {
        Rect(BoundingBox),
        Line(Point, Point),
        Marker(Point, u32),
        Label(String, Point),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        ops: Vec<Op>,
    }

    impl RecordingCanvas {
        fn lines(&self) -> Vec<(Point, Point)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Line(a, b) => Some((*a, *b)),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    impl Canvas for RecordingCanvas {
        fn draw_rect(&mut self, bbox: &BoundingBox, _color: Rgb<u8>, _thickness: u32) {
            self.ops.push(Op::Rect(*bbox));
        }

        fn draw_line(&mut self, from: Point, to: Point, _color: Rgb<u8>, _thickness: u32) {
            self.ops.push(Op::Line(from, to));
        }

        fn draw_marker(&mut self, center: Point, radius: u32, _color: Rgb<u8>) {
            self.ops.push(Op::Marker(center, radius));
        }

        fn draw_label(&mut self, text: &str, at: Point, _color: Rgb<u8>) {
            self.ops.push(Op::Label(text.to_string(), at));
        }
    }

    /// Point `i` sits at x = i so drawn segments map back to indices.
    fn indexed_landmarks(n: usize) -> Vec<Point> {
        (0..n as i32).map(|i| Point::new(i, 100 + i)).collect()
    }

    fn face(n: usize) -> Face {
        Face::new(BoundingBox::new(5, 5, 50, 60), indexed_landmarks(n))
    }

    #[test]
    fn test_68_landmarks_draw_full_topology() {
        let mut canvas = RecordingCanvas::default();
        render_landmarks(&mut canvas, &indexed_landmarks(68), &RenderStyle::default());

        assert_eq!(canvas.lines().len(), 65);
        assert_eq!(canvas.count(|op| matches!(op, Op::Marker(..))), 0);
    }

    #[test]
    fn test_jaw_has_sixteen_segments() {
        let mut canvas = RecordingCanvas::default();
        render_landmarks(&mut canvas, &indexed_landmarks(68), &RenderStyle::default());

        let jaw = canvas
            .lines()
            .into_iter()
            .filter(|(a, b)| a.x <= 16 && b.x <= 16)
            .count();
        assert_eq!(jaw, 16);
    }

    #[test]
    fn test_each_eye_is_closed_six_point_loop() {
        let mut canvas = RecordingCanvas::default();
        render_landmarks(&mut canvas, &indexed_landmarks(68), &RenderStyle::default());

        for (start, end) in [(36, 41), (42, 47)] {
            let eye: Vec<_> = canvas
                .lines()
                .into_iter()
                .filter(|(a, b)| (start..=end).contains(&a.x) && (start..=end).contains(&b.x))
                .collect();
            assert_eq!(eye.len(), 6);
            // every vertex touched exactly twice in a closed loop
            for i in start..=end {
                let degree = eye.iter().filter(|(a, b)| a.x == i || b.x == i).count();
                assert_eq!(degree, 2, "eye vertex {i}");
            }
        }
    }

    #[test]
    fn test_other_count_draws_unconnected_markers() {
        let mut canvas = RecordingCanvas::default();
        let style = RenderStyle {
            thickness: 3,
            ..RenderStyle::default()
        };
        render_landmarks(&mut canvas, &indexed_landmarks(5), &style);

        assert!(canvas.lines().is_empty());
        assert_eq!(canvas.count(|op| matches!(op, Op::Marker(_, 3))), 5);
    }

    #[test]
    fn test_67_landmarks_do_not_get_topology() {
        let mut canvas = RecordingCanvas::default();
        render_landmarks(&mut canvas, &indexed_landmarks(67), &RenderStyle::default());

        assert!(canvas.lines().is_empty());
        assert_eq!(canvas.count(|op| matches!(op, Op::Marker(..))), 67);
    }

    #[test]
    fn test_labels_are_zero_based_indices() {
        let mut canvas = RecordingCanvas::default();
        let style = RenderStyle {
            draw_labels: true,
            ..RenderStyle::default()
        };
        render_landmarks(&mut canvas, &indexed_landmarks(3), &style);

        let labels: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Label(text, at) => Some((text.as_str(), at.x)),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec![("0", 0), ("1", 1), ("2", 2)]);
    }

    #[test]
    fn test_no_labels_by_default() {
        let mut canvas = RecordingCanvas::default();
        render_landmarks(&mut canvas, &indexed_landmarks(68), &RenderStyle::default());
        assert_eq!(canvas.count(|op| matches!(op, Op::Label(..))), 0);
    }

    #[test]
    fn test_render_frame_draws_box_per_face() {
        let mut canvas = RecordingCanvas::default();
        let frame = Frame::new(640, 480, vec![face(68), face(5), face(0)]);

        render_frame(&mut canvas, &frame, &RenderStyle::default());

        assert_eq!(canvas.count(|op| matches!(op, Op::Rect(_))), 3);
        assert_eq!(canvas.lines().len(), 65);
        assert_eq!(canvas.count(|op| matches!(op, Op::Marker(..))), 5);
    }

    #[test]
    fn test_empty_bbox_is_not_drawn() {
        let mut canvas = RecordingCanvas::default();
        let face = Face::new(BoundingBox::default(), indexed_landmarks(5));

        render_face(&mut canvas, &face, &RenderStyle::default());

        assert_eq!(canvas.count(|op| matches!(op, Op::Rect(_))), 0);
        assert_eq!(canvas.count(|op| matches!(op, Op::Marker(..))), 5);
    }

    #[test]
    fn test_render_does_not_touch_frame() {
        let mut canvas = RecordingCanvas::default();
        let frame = Frame::new(10, 10, vec![face(68)]);
        let before = frame.clone();

        render_frame(&mut canvas, &frame, &RenderStyle::default());

        assert_eq!(frame, before);
    }
}
