use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::error::BoxError;
use crate::shared::image::Image;
use crate::video::domain::frame_source::{FrameSource, SourceFrame};

/// Treats an ordered list of image files as a frame sequence.
///
/// Directories among the inputs expand to the image files they contain,
/// sorted by file name. Decoding is lazy: each file is read when its frame
/// is pulled.
pub struct ImageFileSource {
    inputs: Vec<PathBuf>,
    paths: Vec<PathBuf>,
    opened: bool,
}

impl ImageFileSource {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            paths: Vec::new(),
            opened: false,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self) -> Result<usize, BoxError> {
        let paths = collect_image_paths(&self.inputs)?;
        if paths.is_empty() {
            return Err("no image files found in inputs".into());
        }
        self.paths = paths;
        self.opened = true;
        Ok(self.paths.len())
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<SourceFrame, BoxError>> + '_> {
        if !self.opened {
            return Box::new(std::iter::once(Err("ImageFileSource: not opened".into())));
        }
        Box::new(self.paths.iter().enumerate().map(|(index, path)| {
            let image = read_image(path)?;
            Ok(SourceFrame {
                index,
                label: file_label(path, index),
                image,
            })
        }))
    }

    fn close(&mut self) {
        self.paths.clear();
        self.opened = false;
    }
}

/// Expands directories into their image files (sorted by name) and keeps
/// plain file inputs in the order given.
pub fn collect_image_paths(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image_path(p))
                .collect();
            entries.sort();
            paths.extend(entries);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decodes an image file into an [`Image`], keeping 8-bit grayscale as one
/// channel.
pub fn read_image(path: &Path) -> Result<Image, BoxError> {
    let decoded =
        image::open(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(Image::from_dynamic(decoded))
}

fn file_label(path: &Path, index: usize) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("frame_{index:05}"))
}
