use crate::shared::error::BoxError;
use crate::shared::image::Image;

/// A decoded input frame with its position in the source.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    pub index: usize,
    /// Short name for derived outputs, e.g. the file stem.
    pub label: String,
    pub image: Image,
}

/// Supplies frames in capture order.
///
/// Implementations own decoding; the pipeline only sees [`Image`] buffers.
pub trait FrameSource: Send {
    /// Prepares the source and returns the number of frames it will yield.
    fn open(&mut self) -> Result<usize, BoxError>;

    /// Frames in capture order. Yields nothing before `open`.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<SourceFrame, BoxError>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
