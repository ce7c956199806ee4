//! Binary persistence of landmark sequences.
//!
//! Available only with the `persistence` feature. Without it every
//! operation fails with [`LandmarkError::UnsupportedOperation`] before any
//! I/O happens; [`is_supported`] reports the capability up front.

pub mod sequence_codec;
pub mod sequence_file;

use crate::shared::error::{LandmarkError, Result};

pub fn is_supported() -> bool {
    cfg!(feature = "persistence")
}

pub(crate) fn ensure_supported(operation: &'static str) -> Result<()> {
    if is_supported() {
        Ok(())
    } else {
        Err(LandmarkError::UnsupportedOperation(operation))
    }
}
