use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_FRAME_SCALE, DEFAULT_MIN_FACE_SIZE, DEFAULT_PYRAMID_SCALE_FACTOR,
    DEFAULT_SCORE_THRESHOLD, DEFAULT_SLIDE_WINDOW_STEP, SEETA_MAX_PYRAMID_SCALE_FACTOR,
    SEETA_MIN_FACE_SIZE, SEETA_MIN_PYRAMID_SCALE_FACTOR,
};
use super::error::{LandmarkError, Result};

/// Tuning for the SeetaFace region detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// SeetaFace frontal model file.
    pub model_path: Option<PathBuf>,
    pub min_face_size: u32,
    pub score_threshold: f64,
    pub pyramid_scale_factor: f32,
    pub slide_window_step: u32,
}

impl DetectorSettings {
    /// Checks every tuning value against the limits the cascade accepts.
    pub fn validate(&self) -> Result<()> {
        if self.min_face_size < SEETA_MIN_FACE_SIZE {
            return Err(LandmarkError::InvalidConfig(format!(
                "min_face_size must be >= {SEETA_MIN_FACE_SIZE}, got {}",
                self.min_face_size
            )));
        }
        if !(self.score_threshold > 0.0) {
            return Err(LandmarkError::InvalidConfig(format!(
                "score_threshold must be > 0, got {}",
                self.score_threshold
            )));
        }
        let factor = self.pyramid_scale_factor;
        if !(SEETA_MIN_PYRAMID_SCALE_FACTOR..=SEETA_MAX_PYRAMID_SCALE_FACTOR).contains(&factor) {
            return Err(LandmarkError::InvalidConfig(format!(
                "pyramid_scale_factor must be in \
                 [{SEETA_MIN_PYRAMID_SCALE_FACTOR}, {SEETA_MAX_PYRAMID_SCALE_FACTOR}], got {factor}"
            )));
        }
        if self.slide_window_step == 0 {
            return Err(LandmarkError::InvalidConfig(
                "slide_window_step must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            pyramid_scale_factor: DEFAULT_PYRAMID_SCALE_FACTOR,
            slide_window_step: DEFAULT_SLIDE_WINDOW_STEP,
        }
    }
}

/// Caller-facing configuration of a landmark pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Downscale factor applied before detection. Must be finite and > 0.
    pub frame_scale: f32,
    /// Landmark predictor model. `None` leaves the pipeline unconfigured.
    pub model_path: Option<PathBuf>,
    pub detector: DetectorSettings,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            frame_scale: DEFAULT_FRAME_SCALE,
            model_path: None,
            detector: DetectorSettings::default(),
        }
    }
}

impl LandmarkConfig {
    /// Reads a JSON settings file; absent fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| LandmarkError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_frame_scale(self.frame_scale)?;
        self.detector.validate()
    }
}

pub fn validate_frame_scale(scale: f32) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(LandmarkError::InvalidScale(scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = LandmarkConfig::default();
        assert_eq!(config.frame_scale, 1.0);
        assert!(config.model_path.is_none());
        assert_eq!(config.detector.min_face_size, 20);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    #[case::nan(f32::NAN)]
    #[case::infinite(f32::INFINITY)]
    fn test_invalid_frame_scale(#[case] scale: f32) {
        assert!(matches!(
            validate_frame_scale(scale),
            Err(LandmarkError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"frame_scale": 0.5, "detector": {"min_face_size": 40}}"#,
        )
        .unwrap();

        let config = LandmarkConfig::load(&path).unwrap();

        assert_eq!(config.frame_scale, 0.5);
        assert_eq!(config.detector.min_face_size, 40);
        assert_eq!(config.detector.slide_window_step, 4);
    }

    #[test]
    fn test_load_rejects_bad_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"frame_scale": 0.0}"#).unwrap();

        assert!(matches!(
            LandmarkConfig::load(&path),
            Err(LandmarkError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            LandmarkConfig::load(&path),
            Err(LandmarkError::InvalidConfig(_))
        ));
    }

    fn detector(edit: impl FnOnce(&mut DetectorSettings)) -> DetectorSettings {
        let mut settings = DetectorSettings::default();
        edit(&mut settings);
        settings
    }

    #[rstest]
    #[case::face_below_window(detector(|d| d.min_face_size = 10))]
    #[case::face_just_below_window(detector(|d| d.min_face_size = 19))]
    #[case::zero_threshold(detector(|d| d.score_threshold = 0.0))]
    #[case::negative_threshold(detector(|d| d.score_threshold = -1.0))]
    #[case::nan_threshold(detector(|d| d.score_threshold = f64::NAN))]
    #[case::pyramid_too_small(detector(|d| d.pyramid_scale_factor = 0.005))]
    #[case::pyramid_too_large(detector(|d| d.pyramid_scale_factor = 0.995))]
    #[case::pyramid_above_one(detector(|d| d.pyramid_scale_factor = 1.5))]
    #[case::zero_window_step(detector(|d| d.slide_window_step = 0))]
    fn test_rejects_detector_settings_outside_cascade_limits(#[case] settings: DetectorSettings) {
        assert!(matches!(
            settings.validate(),
            Err(LandmarkError::InvalidConfig(_))
        ));

        let config = LandmarkConfig {
            detector: settings,
            ..LandmarkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LandmarkError::InvalidConfig(_))
        ));
    }

    #[rstest]
    #[case::minimum_face(detector(|d| d.min_face_size = 20))]
    #[case::pyramid_low_edge(detector(|d| d.pyramid_scale_factor = 0.01))]
    #[case::pyramid_high_edge(detector(|d| d.pyramid_scale_factor = 0.99))]
    #[case::small_threshold(detector(|d| d.score_threshold = 0.1))]
    fn test_accepts_detector_settings_at_limits(#[case] settings: DetectorSettings) {
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_small_min_face_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"detector": {"min_face_size": 10}}"#).unwrap();

        assert!(matches!(
            LandmarkConfig::load(&path),
            Err(LandmarkError::InvalidConfig(_))
        ));
    }
}
