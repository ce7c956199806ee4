pub mod extract_sequence_use_case;
pub mod pipeline_logger;
pub mod sequence_landmarks;
