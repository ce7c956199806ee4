use std::path::Path;

use crate::shared::error::{BoxError, LandmarkError, Result};

use super::face_region_detector::FaceRegionDetector;
use super::landmark_predictor::LandmarkPredictor;

type DetectorFactory = Box<dyn Fn() -> Result<Box<dyn FaceRegionDetector>, BoxError> + Send>;
type PredictorLoader =
    Box<dyn Fn(&Path) -> Result<Box<dyn LandmarkPredictor>, BoxError> + Send>;

/// Detector and predictor built together from one model path.
pub struct LoadedModels {
    pub detector: Box<dyn FaceRegionDetector>,
    pub predictor: Box<dyn LandmarkPredictor>,
}

/// Builds the detection capabilities a pipeline needs.
///
/// The detector comes from a zero-argument factory; the predictor is
/// deserialized from the landmark model path. Both are produced eagerly
/// by [`ModelLoader::load`], and nothing is returned unless both succeed.
pub struct ModelLoader {
    detector: DetectorFactory,
    predictor: PredictorLoader,
}

impl ModelLoader {
    pub fn new<D, P>(detector: D, predictor: P) -> Self
    where
        D: Fn() -> Result<Box<dyn FaceRegionDetector>, BoxError> + Send + 'static,
        P: Fn(&Path) -> Result<Box<dyn LandmarkPredictor>, BoxError> + Send + 'static,
    {
        Self {
            detector: Box::new(detector),
            predictor: Box::new(predictor),
        }
    }

    pub fn load(&self, model_path: &Path) -> Result<LoadedModels> {
        let model_load = |source| LandmarkError::ModelLoad {
            path: model_path.to_path_buf(),
            source,
        };
        let detector = (self.detector)().map_err(model_load)?;
        let predictor = (self.predictor)(model_path).map_err(model_load)?;
        Ok(LoadedModels {
            detector,
            predictor,
        })
    }
}
