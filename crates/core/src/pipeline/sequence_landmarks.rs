use std::borrow::Cow;
use std::ops::Index;
use std::path::{Path, PathBuf};

use crate::detection::domain::face_region_detector::FaceRegionDetector;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::detection::domain::model_loader::{LoadedModels, ModelLoader};
use crate::detection::domain::scale_mapping::ScaleMapping;
use crate::persistence::{sequence_codec, sequence_file};
use crate::sequence::frame::{Face, Frame};
use crate::sequence::frame_sequence::Sequence;
use crate::shared::config::validate_frame_scale;
use crate::shared::error::{LandmarkError, Result};
use crate::shared::image::Image;

struct ActiveModels {
    path: Option<PathBuf>,
    detector: Box<dyn FaceRegionDetector>,
    predictor: Box<dyn LandmarkPredictor>,
}

/// Per-frame face landmark extraction into an owned [`Sequence`].
///
/// Each frame is optionally downscaled by `frame_scale` before detection,
/// and every region and landmark is mapped back to original-resolution
/// integer coordinates before the frame is appended.
///
/// The adapter starts unconfigured unless built with a model; extraction
/// fails with [`LandmarkError::Configuration`] until one is set.
pub struct SequenceLandmarks {
    loader: Option<ModelLoader>,
    models: Option<ActiveModels>,
    mapping: ScaleMapping,
    frame_scale: f32,
    sequence: Sequence,
    warned_layout: bool,
}

impl SequenceLandmarks {
    pub fn new(loader: ModelLoader, frame_scale: f32) -> Result<Self> {
        validate_frame_scale(frame_scale)?;
        Ok(Self {
            loader: Some(loader),
            models: None,
            mapping: ScaleMapping::new(frame_scale),
            frame_scale,
            sequence: Sequence::new(),
            warned_layout: false,
        })
    }

    pub fn with_model(loader: ModelLoader, model_path: &Path, frame_scale: f32) -> Result<Self> {
        let mut landmarks = Self::new(loader, frame_scale)?;
        landmarks.set_model(model_path)?;
        Ok(landmarks)
    }

    /// Configured adapter over capabilities the caller already owns.
    ///
    /// There is no loader behind it, so [`set_model`](Self::set_model) with a
    /// non-empty path fails with [`LandmarkError::InvalidConfig`].
    pub fn with_components(
        detector: Box<dyn FaceRegionDetector>,
        predictor: Box<dyn LandmarkPredictor>,
        frame_scale: f32,
    ) -> Result<Self> {
        validate_frame_scale(frame_scale)?;
        Ok(Self {
            loader: None,
            models: Some(ActiveModels {
                path: None,
                detector,
                predictor,
            }),
            mapping: ScaleMapping::new(frame_scale),
            frame_scale,
            sequence: Sequence::new(),
            warned_layout: false,
        })
    }

    /// Loads the detector and the landmark model at `path`.
    ///
    /// An empty path is ignored. On failure the adapter keeps whatever
    /// models it had before, including none.
    pub fn set_model(&mut self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        let loader = self.loader.as_ref().ok_or_else(|| {
            LandmarkError::InvalidConfig("no model loader attached to this pipeline".into())
        })?;
        let LoadedModels {
            detector,
            predictor,
        } = loader.load(path)?;

        log::info!("Loaded landmarks model from {}", path.display());
        self.models = Some(ActiveModels {
            path: Some(path.to_path_buf()),
            detector,
            predictor,
        });
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.models.is_some()
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.models.as_ref().and_then(|m| m.path.as_deref())
    }

    pub fn frame_scale(&self) -> f32 {
        self.frame_scale
    }

    pub fn set_frame_scale(&mut self, frame_scale: f32) -> Result<()> {
        validate_frame_scale(frame_scale)?;
        self.frame_scale = frame_scale;
        self.mapping = ScaleMapping::new(frame_scale);
        Ok(())
    }

    /// Detects faces in `image`, predicts their landmarks and appends the
    /// result as a new frame.
    ///
    /// Any failure leaves the sequence unchanged.
    pub fn add_frame(&mut self, image: &Image) -> Result<&Frame> {
        let models = self.models.as_mut().ok_or(LandmarkError::Configuration)?;

        let normalized = image.normalized();
        if matches!(normalized, Cow::Owned(_)) && !self.warned_layout {
            log::warn!(
                "Treating {}-channel input as grayscale (first channel)",
                image.channels()
            );
            self.warned_layout = true;
        }

        let working = if self.mapping.is_identity() {
            normalized
        } else {
            Cow::Owned(normalized.resized(self.mapping.scale()))
        };

        let regions = models
            .detector
            .detect(&working)
            .map_err(LandmarkError::Detection)?;

        let mut faces = Vec::with_capacity(regions.len());
        for region in &regions {
            let points = models
                .predictor
                .predict(&working, region)
                .map_err(LandmarkError::Prediction)?;
            let landmarks = points.into_iter().map(|p| self.mapping.point(p)).collect();
            faces.push(Face::new(self.mapping.region(region), landmarks));
        }

        log::debug!(
            "Frame {}: {} faces at scale {}",
            self.sequence.len(),
            faces.len(),
            self.frame_scale
        );

        Ok(self
            .sequence
            .push(Frame::new(image.width(), image.height(), faces)))
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.sequence.get(index)
    }

    pub fn clear(&mut self) {
        self.sequence.clear();
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        sequence_file::save_sequence(path, &self.sequence)
    }

    /// Replaces the sequence with the one stored at `path`.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.sequence = sequence_file::load_sequence(path)?;
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        sequence_codec::encode(&self.sequence)
    }

    /// Replaces the sequence with the one decoded from `bytes`.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<()> {
        self.sequence = sequence_codec::decode(bytes)?;
        Ok(())
    }
}

impl Index<usize> for SequenceLandmarks {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        &self.sequence[index]
    }
}
