//! Protobuf encoding of a [`Sequence`].
//!
//! Layout: `Sequence{frames=1, format_version=15}`,
//! `Frame{width=1, height=2, faces=3}`, `Face{bbox=1, landmarks=2}`,
//! `BoundingBox{left=1, top=2, width=3, height=4}`, `Point{x=1, y=2}`.
//!
//! Payloads without a version tag decode as the legacy layout, which shares
//! this schema. Newer versions are rejected rather than guessed at.

use crate::sequence::frame_sequence::Sequence;
#[cfg(not(feature = "persistence"))]
use crate::shared::error::LandmarkError;
use crate::shared::error::Result;

#[cfg(feature = "persistence")]
mod wire {
    use prost::Message;

    use crate::sequence::frame::{Face, Frame};
    use crate::sequence::frame_sequence::Sequence;
    use crate::shared::constants::SEQUENCE_FORMAT_VERSION;
    use crate::shared::error::{LandmarkError, Result};
    use crate::shared::geometry::{BoundingBox, Point};

    #[derive(Clone, PartialEq, Message)]
    pub struct SequenceMessage {
        #[prost(message, repeated, tag = "1")]
        pub frames: Vec<FrameMessage>,
        #[prost(uint32, tag = "15")]
        pub format_version: u32,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FrameMessage {
        #[prost(uint32, tag = "1")]
        pub width: u32,
        #[prost(uint32, tag = "2")]
        pub height: u32,
        #[prost(message, repeated, tag = "3")]
        pub faces: Vec<FaceMessage>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FaceMessage {
        #[prost(message, optional, tag = "1")]
        pub bbox: Option<BoundingBoxMessage>,
        #[prost(message, repeated, tag = "2")]
        pub landmarks: Vec<PointMessage>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct BoundingBoxMessage {
        #[prost(int32, tag = "1")]
        pub left: i32,
        #[prost(int32, tag = "2")]
        pub top: i32,
        #[prost(int32, tag = "3")]
        pub width: i32,
        #[prost(int32, tag = "4")]
        pub height: i32,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct PointMessage {
        #[prost(int32, tag = "1")]
        pub x: i32,
        #[prost(int32, tag = "2")]
        pub y: i32,
    }

    impl From<&Sequence> for SequenceMessage {
        fn from(sequence: &Sequence) -> Self {
            Self {
                frames: sequence.iter().map(FrameMessage::from).collect(),
                format_version: SEQUENCE_FORMAT_VERSION,
            }
        }
    }

    impl From<&Frame> for FrameMessage {
        fn from(frame: &Frame) -> Self {
            Self {
                width: frame.width,
                height: frame.height,
                faces: frame.faces.iter().map(FaceMessage::from).collect(),
            }
        }
    }

    impl From<&Face> for FaceMessage {
        fn from(face: &Face) -> Self {
            Self {
                bbox: Some(BoundingBoxMessage {
                    left: face.bbox.x,
                    top: face.bbox.y,
                    width: face.bbox.width,
                    height: face.bbox.height,
                }),
                landmarks: face
                    .landmarks
                    .iter()
                    .map(|p| PointMessage { x: p.x, y: p.y })
                    .collect(),
            }
        }
    }

    impl From<FaceMessage> for Face {
        fn from(msg: FaceMessage) -> Self {
            let bbox = msg
                .bbox
                .map(|b| BoundingBox::new(b.left, b.top, b.width, b.height))
                .unwrap_or_default();
            let landmarks = msg
                .landmarks
                .into_iter()
                .map(|p| Point::new(p.x, p.y))
                .collect();
            Face::new(bbox, landmarks)
        }
    }

    impl From<FrameMessage> for Frame {
        fn from(msg: FrameMessage) -> Self {
            Frame::new(
                msg.width,
                msg.height,
                msg.faces.into_iter().map(Face::from).collect(),
            )
        }
    }

    pub fn encode(sequence: &Sequence) -> Vec<u8> {
        SequenceMessage::from(sequence).encode_to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Sequence> {
        let msg = SequenceMessage::decode(bytes)
            .map_err(|e| LandmarkError::MalformedSequence(e.to_string()))?;
        if msg.format_version > SEQUENCE_FORMAT_VERSION {
            return Err(LandmarkError::UnsupportedVersion {
                found: msg.format_version,
                supported: SEQUENCE_FORMAT_VERSION,
            });
        }
        let mut sequence = Sequence::with_capacity(msg.frames.len());
        for frame in msg.frames {
            sequence.push(Frame::from(frame));
        }
        Ok(sequence)
    }
}

/// Serializes a sequence. Coordinates are stored exactly as held in memory.
#[cfg(feature = "persistence")]
pub fn encode(sequence: &Sequence) -> Result<Vec<u8>> {
    Ok(wire::encode(sequence))
}

#[cfg(not(feature = "persistence"))]
pub fn encode(_sequence: &Sequence) -> Result<Vec<u8>> {
    Err(LandmarkError::UnsupportedOperation("sequence encoding"))
}

/// Deserializes a complete sequence.
#[cfg(feature = "persistence")]
pub fn decode(bytes: &[u8]) -> Result<Sequence> {
    wire::decode(bytes)
}

#[cfg(not(feature = "persistence"))]
pub fn decode(_bytes: &[u8]) -> Result<Sequence> {
    Err(LandmarkError::UnsupportedOperation("sequence decoding"))
}
