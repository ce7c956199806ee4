/// Integer pixel coordinate in original-resolution image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned face rectangle, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True for the zero box a face gets when its rectangle was not stored.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Face region as reported by a detector, in the coordinate space of the
/// image the detector ran on (possibly downscaled).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawRegion {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RawRegion {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Maps a point from the unit square onto this region.
    pub fn unnormalize(&self, (u, v): (f64, f64)) -> (f64, f64) {
        (self.left + u * self.width, self.top + v * self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_bbox_with_area_is_not_empty() {
        assert!(!BoundingBox::new(10, 20, 30, 40).is_empty());
    }

    #[rstest]
    #[case::zero_width(BoundingBox::new(0, 0, 0, 10))]
    #[case::zero_height(BoundingBox::new(0, 0, 10, 0))]
    #[case::default(BoundingBox::default())]
    fn test_bbox_empty(#[case] b: BoundingBox) {
        assert!(b.is_empty());
    }

    #[test]
    fn test_raw_region_unnormalize_corners() {
        let r = RawRegion::new(100.0, 50.0, 80.0, 40.0);
        let (x0, y0) = r.unnormalize((0.0, 0.0));
        let (x1, y1) = r.unnormalize((1.0, 1.0));
        assert_relative_eq!(x0, 100.0);
        assert_relative_eq!(y0, 50.0);
        assert_relative_eq!(x1, 180.0);
        assert_relative_eq!(y1, 90.0);
    }
}
