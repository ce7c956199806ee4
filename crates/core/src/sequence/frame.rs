use crate::shared::geometry::{BoundingBox, Point};

/// One detected face: its region and landmark points, both in
/// original-resolution image coordinates.
///
/// Landmark order is the predictor's order and is kept verbatim; overlay
/// topology depends on fixed index ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
    pub bbox: BoundingBox,
    pub landmarks: Vec<Point>,
}

impl Face {
    pub fn new(bbox: BoundingBox, landmarks: Vec<Point>) -> Self {
        Self { bbox, landmarks }
    }
}

/// Detection results for a single captured frame.
///
/// `width` and `height` are the dimensions of the image handed to the
/// pipeline, regardless of the internal detection scale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub faces: Vec<Face>,
}

impl Frame {
    pub fn new(width: u32, height: u32, faces: Vec<Face>) -> Self {
        Self {
            width,
            height,
            faces,
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Total landmark points across all faces.
    pub fn landmark_count(&self) -> usize {
        self.faces.iter().map(|f| f.landmarks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(n: usize) -> Face {
        let landmarks = (0..n as i32).map(|i| Point::new(i, i * 2)).collect();
        Face::new(BoundingBox::new(0, 0, 10, 10), landmarks)
    }

    #[test]
    fn test_empty_frame_counts() {
        let frame = Frame::new(640, 480, Vec::new());
        assert_eq!(frame.face_count(), 0);
        assert_eq!(frame.landmark_count(), 0);
    }

    #[test]
    fn test_counts_across_faces() {
        let frame = Frame::new(640, 480, vec![face(68), face(5), face(0)]);
        assert_eq!(frame.face_count(), 3);
        assert_eq!(frame.landmark_count(), 73);
    }

    #[test]
    fn test_landmark_order_preserved() {
        let f = Face::new(
            BoundingBox::default(),
            vec![Point::new(5, 5), Point::new(1, 1), Point::new(5, 5)],
        );
        assert_eq!(
            f.landmarks,
            vec![Point::new(5, 5), Point::new(1, 1), Point::new(5, 5)]
        );
    }
}
