use crate::shared::geometry::{BoundingBox, Point, RawRegion};

/// Maps coordinates from the scaled detection image back to the original
/// frame.
///
/// Every coordinate becomes `round(v / scale)` using `f64::round`: nearest
/// integer, ties away from zero. Width and height are mapped independently
/// of the origin so they stay non-negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleMapping {
    scale: f64,
}

impl ScaleMapping {
    /// `scale` must already be validated as finite and > 0.
    pub fn new(scale: f32) -> Self {
        Self {
            scale: scale as f64,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0
    }

    pub fn to_original(&self, v: f64) -> i32 {
        (v / self.scale).round() as i32
    }

    pub fn point(&self, (x, y): (f64, f64)) -> Point {
        Point::new(self.to_original(x), self.to_original(y))
    }

    pub fn region(&self, r: &RawRegion) -> BoundingBox {
        BoundingBox::new(
            self.to_original(r.left),
            self.to_original(r.top),
            self.to_original(r.width).max(0),
            self.to_original(r.height).max(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_identity_rounds_fractional_output() {
        let m = ScaleMapping::new(1.0);
        assert!(m.is_identity());
        assert_eq!(m.point((10.4, 10.6)), Point::new(10, 11));
    }

    #[rstest]
    #[case::half(0.5, 3.0, 6)]
    #[case::third(0.3, 10.0, 33)]
    #[case::quarter(0.25, 7.0, 28)]
    #[case::upscale(2.0, 9.0, 5)] // 4.5 rounds away from zero
    fn test_to_original(#[case] scale: f32, #[case] raw: f64, #[case] expected: i32) {
        assert_eq!(ScaleMapping::new(scale).to_original(raw), expected);
    }

    #[rstest]
    #[case::positive_tie(1.25, 3)]
    #[case::negative_tie(-1.25, -3)]
    #[case::below_tie(1.2, 2)]
    fn test_ties_round_away_from_zero(#[case] raw: f64, #[case] expected: i32) {
        // 1.25 / 0.5 = 2.5 exactly
        assert_eq!(ScaleMapping::new(0.5).to_original(raw), expected);
    }

    #[test]
    fn test_region_maps_each_field() {
        let m = ScaleMapping::new(0.5);
        let bbox = m.region(&RawRegion::new(3.0, 5.0, 7.0, 9.0));
        assert_eq!(bbox, BoundingBox::new(6, 10, 14, 18));
    }

    #[test]
    fn test_region_partially_outside_frame_keeps_negative_origin() {
        let m = ScaleMapping::new(0.5);
        let bbox = m.region(&RawRegion::new(-4.0, -1.0, 20.0, 20.0));
        assert_eq!(bbox, BoundingBox::new(-8, -2, 40, 40));
    }

    #[test]
    fn test_region_negative_extent_clamped() {
        let m = ScaleMapping::new(1.0);
        let bbox = m.region(&RawRegion::new(0.0, 0.0, -3.0, 2.0));
        assert_eq!(bbox.width, 0);
        assert_eq!(bbox.height, 2);
    }
}
