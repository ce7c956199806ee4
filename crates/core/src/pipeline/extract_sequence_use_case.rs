use std::path::Path;
use std::time::Instant;

use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::sequence_landmarks::SequenceLandmarks;
use crate::sequence::frame::Frame;
use crate::sequence::frame_sequence::Sequence;
use crate::shared::error::BoxError;
use crate::video::domain::frame_source::{FrameSource, SourceFrame};

type FrameObserver = Box<dyn FnMut(&SourceFrame, &Frame) -> Result<(), BoxError> + Send>;

/// Extraction pipeline: read -> landmarks -> (observe) -> optional save.
pub struct ExtractSequenceUseCase {
    source: Box<dyn FrameSource>,
    landmarks: SequenceLandmarks,
    logger: Box<dyn PipelineLogger>,
    observer: Option<FrameObserver>,
}

impl ExtractSequenceUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        landmarks: SequenceLandmarks,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            landmarks,
            logger,
            observer: None,
        }
    }

    /// Called with every input frame and its recorded result, e.g. to
    /// write an annotated copy.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&SourceFrame, &Frame) -> Result<(), BoxError> + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Runs every source frame through the landmark pipeline and, when
    /// `output` is given, writes the resulting sequence there.
    ///
    /// Stops at the first failing frame; frames recorded before it stay in
    /// the sequence.
    pub fn execute(&mut self, output: Option<&Path>) -> Result<&Sequence, BoxError> {
        let total = self.source.open()?;
        self.logger
            .info(&format!("Extracting landmarks from {total} frames"));

        let result = self.run(total);
        self.source.close();
        result?;

        if let Some(path) = output {
            self.landmarks.save(path)?;
            self.logger.info(&format!(
                "Wrote {} frames to {}",
                self.landmarks.len(),
                path.display()
            ));
        }
        self.logger.summary();
        Ok(self.landmarks.sequence())
    }

    pub fn landmarks(&self) -> &SequenceLandmarks {
        &self.landmarks
    }

    pub fn into_landmarks(self) -> SequenceLandmarks {
        self.landmarks
    }

    fn run(&mut self, total: usize) -> Result<(), BoxError> {
        let mut frames = self.source.frames();
        let mut current = 0;
        loop {
            let t0 = Instant::now();
            let Some(next) = frames.next() else {
                break;
            };
            let source_frame = next?;
            self.logger
                .timing("decode", t0.elapsed().as_secs_f64() * 1000.0);

            let t1 = Instant::now();
            let frame = self.landmarks.add_frame(&source_frame.image)?;
            self.logger
                .timing("landmarks", t1.elapsed().as_secs_f64() * 1000.0);
            self.logger.metric("faces", frame.face_count() as f64);

            if let Some(observer) = self.observer.as_mut() {
                observer(&source_frame, frame)?;
            }

            current += 1;
            self.logger.progress(current, total);
        }
        Ok(())
    }
}
