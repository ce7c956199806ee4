use crate::shared::error::BoxError;
use crate::shared::geometry::RawRegion;
use crate::shared::image::Image;

/// Domain interface for landmark prediction inside a detected region.
///
/// Returns ordered points in the coordinate space of `image`. The point
/// count is model dependent and the order is part of the model's contract.
pub trait LandmarkPredictor: Send {
    fn predict(&self, image: &Image, region: &RawRegion) -> Result<Vec<(f64, f64)>, BoxError>;
}
