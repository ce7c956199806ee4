use crate::shared::error::BoxError;
use crate::shared::geometry::RawRegion;
use crate::shared::image::Image;

/// Domain interface for face-region detection.
///
/// Receives the working image (already scaled and normalized to a 1- or
/// 3-channel layout) and reports regions in that image's coordinates, in
/// the detector's own order. Implementations may keep internal state,
/// hence `&mut self`.
pub trait FaceRegionDetector: Send {
    fn detect(&mut self, image: &Image) -> Result<Vec<RawRegion>, BoxError>;
}
