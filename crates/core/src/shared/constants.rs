/// Landmark count of the standard 68-point facial topology.
pub const FACE_68_LANDMARK_COUNT: usize = 68;

pub const DEFAULT_FRAME_SCALE: f32 = 1.0;

/// Current binary sequence format version.
pub const SEQUENCE_FORMAT_VERSION: u32 = 1;

/// Version reported by payloads written before the format carried a tag.
pub const LEGACY_FORMAT_VERSION: u32 = 0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// SeetaFace cascade limits; settings outside them are rejected.
pub const SEETA_MIN_FACE_SIZE: u32 = 20;
pub const SEETA_MIN_PYRAMID_SCALE_FACTOR: f32 = 0.01;
pub const SEETA_MAX_PYRAMID_SCALE_FACTOR: f32 = 0.99;

/// SeetaFace cascade defaults.
pub const DEFAULT_MIN_FACE_SIZE: u32 = 20;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 2.0;
pub const DEFAULT_PYRAMID_SCALE_FACTOR: f32 = 0.8;
pub const DEFAULT_SLIDE_WINDOW_STEP: u32 = 4;
