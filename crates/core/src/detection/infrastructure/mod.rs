pub mod ert_shape_predictor;
pub mod rustface_detector;

use std::path::Path;

use crate::detection::domain::face_region_detector::FaceRegionDetector;
use crate::detection::domain::landmark_predictor::LandmarkPredictor;
use crate::detection::domain::model_loader::ModelLoader;
use crate::shared::config::DetectorSettings;

use ert_shape_predictor::ErtShapePredictor;
use rustface_detector::RustfaceDetector;

/// Loader wiring the SeetaFace region detector to the regression-tree
/// landmark predictor.
pub fn rustface_ert_loader(settings: DetectorSettings) -> ModelLoader {
    ModelLoader::new(
        move || {
            let detector = RustfaceDetector::from_settings(&settings)?;
            Ok(Box::new(detector) as Box<dyn FaceRegionDetector>)
        },
        |path: &Path| {
            let predictor = ErtShapePredictor::from_path(path)?;
            Ok(Box::new(predictor) as Box<dyn LandmarkPredictor>)
        },
    )
}
