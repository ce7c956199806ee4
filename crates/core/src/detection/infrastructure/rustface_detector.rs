use std::fs;
use std::path::Path;

use crate::detection::domain::face_region_detector::FaceRegionDetector;
use crate::shared::config::DetectorSettings;
use crate::shared::error::BoxError;
use crate::shared::geometry::RawRegion;
use crate::shared::image::Image;

/// Face-region detector backed by the `rustface` crate (SeetaFace cascade).
///
/// Runs on the grayscale view of the working image, so color and
/// grayscale inputs reach the same cascade.
pub struct RustfaceDetector {
    model: rustface::Model,
    settings: DetectorSettings,
}

impl RustfaceDetector {
    /// Fails when a tuning value is outside what the cascade accepts.
    pub fn new(model: rustface::Model, settings: DetectorSettings) -> Result<Self, BoxError> {
        settings.validate()?;
        Ok(Self { model, settings })
    }

    /// Loads the SeetaFace model named by `settings.model_path`.
    pub fn from_settings(settings: &DetectorSettings) -> Result<Self, BoxError> {
        settings.validate()?;
        let path = settings
            .model_path
            .as_deref()
            .ok_or("detector model path is not set")?;
        let model = read_model(path)?;
        Self::new(model, settings.clone())
    }
}

fn read_model(path: &Path) -> Result<rustface::Model, BoxError> {
    let bytes = fs::read(path)?;
    check_model_layout(&bytes)
        .map_err(|e| format!("{}: malformed detector model: {e}", path.display()))?;
    Ok(rustface::read_model(bytes.as_slice())?)
}

const LAB_BOOSTED_KIND: i32 = 0;
const SURF_MLP_KIND: i32 = 1;

/// Walks the SeetaFace model layout (little-endian `i32` counts, `f32`
/// payloads) without building anything.
///
/// `rustface::read_model` panics on unknown classifier kinds and negative
/// counts, so those are turned into errors here first.
fn check_model_layout(bytes: &[u8]) -> Result<(), String> {
    let mut scan = LayoutScan { bytes, pos: 0 };
    let hierarchies = scan.count("hierarchy")?;
    for _ in 0..hierarchies {
        let hierarchy_size = scan.count("hierarchy size")?;
        for _ in 0..hierarchy_size {
            let stages = scan.count("stage")?;
            for _ in 0..stages {
                match scan.word()? {
                    LAB_BOOSTED_KIND => scan.lab_boosted()?,
                    SURF_MLP_KIND => scan.surf_mlp()?,
                    kind => return Err(format!("unknown classifier kind {kind}")),
                }
            }
            let windows = scan.word()?;
            if windows > 0 {
                scan.skip(windows as usize)?;
            }
        }
    }
    Ok(())
}

struct LayoutScan<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl LayoutScan<'_> {
    fn word(&mut self) -> Result<i32, String> {
        let end = self.pos + 4;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| format!("truncated at byte {}", self.pos))?;
        self.pos = end;
        Ok(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }

    fn count(&mut self, what: &str) -> Result<usize, String> {
        let n = self.word()?;
        usize::try_from(n).map_err(|_| format!("negative {what} count {n}"))
    }

    /// Skips `words` 4-byte values.
    fn skip(&mut self, words: usize) -> Result<(), String> {
        let end = words
            .checked_mul(4)
            .and_then(|len| len.checked_add(self.pos))
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| format!("truncated at byte {}", self.pos))?;
        self.pos = end;
        Ok(())
    }

    fn product(a: usize, b: usize) -> Result<usize, String> {
        a.checked_mul(b).ok_or_else(|| "classifier size overflows".to_string())
    }

    fn lab_boosted(&mut self) -> Result<(), String> {
        let bases = self.count("feature")?;
        let bins = self.count("bin")?;
        self.skip(Self::product(bases, 2)?)?;
        self.skip(bases)?;
        self.skip(Self::product(bases, bins + 1)?)
    }

    fn surf_mlp(&mut self) -> Result<(), String> {
        let layers = self.word()?;
        if layers < 2 {
            return Err(format!("MLP needs at least 2 layers, got {layers}"));
        }
        let features = self.count("feature")?;
        self.skip(features)?;
        self.skip(1)?;
        let mut input_dim = self.count("input dimension")?;
        for _ in 1..layers {
            let output_dim = self.count("output dimension")?;
            self.skip(Self::product(input_dim, output_dim)?)?;
            self.skip(output_dim)?;
            input_dim = output_dim;
        }
        Ok(())
    }
}

impl FaceRegionDetector for RustfaceDetector {
    fn detect(&mut self, image: &Image) -> Result<Vec<RawRegion>, BoxError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }
        let gray = image.to_luma();

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.settings.min_face_size);
        detector.set_score_thresh(self.settings.score_threshold);
        detector.set_pyramid_scale_factor(self.settings.pyramid_scale_factor);
        detector.set_slide_window_step(
            self.settings.slide_window_step,
            self.settings.slide_window_step,
        );

        let faces = detector.detect(&rustface::ImageData::new(
            gray.as_raw(),
            image.width(),
            image.height(),
        ));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                RawRegion::new(
                    bbox.x() as f64,
                    bbox.y() as f64,
                    bbox.width() as f64,
                    bbox.height() as f64,
                )
            })
            .collect())
    }
}
