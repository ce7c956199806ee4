//! Facial landmark extraction over frame sequences.
//!
//! [`pipeline::sequence_landmarks::SequenceLandmarks`] detects faces in each
//! frame, predicts their landmarks and records the results, in
//! original-resolution coordinates, into a [`sequence::frame_sequence::Sequence`]
//! that can be persisted with [`persistence`] and drawn with [`overlay`].

pub mod detection;
pub mod overlay;
pub mod persistence;
pub mod pipeline;
pub mod sequence;
pub mod shared;
pub mod video;
