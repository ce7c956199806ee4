pub mod face_region_detector;
pub mod landmark_predictor;
pub mod model_loader;
pub mod scale_mapping;
