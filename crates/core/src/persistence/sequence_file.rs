use std::fs;
use std::path::Path;

use crate::sequence::frame_sequence::Sequence;
use crate::shared::error::Result;

use super::{ensure_supported, sequence_codec};

/// Writes `sequence` to `path`, truncating any existing file.
pub fn save_sequence(path: &Path, sequence: &Sequence) -> Result<()> {
    ensure_supported("saving a sequence")?;
    let bytes = sequence_codec::encode(sequence)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    log::info!(
        "Saved {} frames to {}",
        sequence.len(),
        path.display()
    );
    Ok(())
}

pub fn load_sequence(path: &Path) -> Result<Sequence> {
    ensure_supported("loading a sequence")?;
    let bytes = fs::read(path)?;
    let sequence = sequence_codec::decode(&bytes)?;
    log::info!(
        "Loaded {} frames from {}",
        sequence.len(),
        path.display()
    );
    Ok(sequence)
}
