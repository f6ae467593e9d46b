// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch orchestration: decode and classify every frame on a bounded
//! blocking pool, then aggregate behind a join barrier.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Semaphore;

use empath_core::error::EmpathError;
use empath_core::types::UserId;

use crate::aggregate::{AggregatedEmotion, FrameResult, aggregate};
use crate::classifier::EmotionClassifier;
use crate::detector::FaceDetector;
use crate::latest::LatestEmotions;
use crate::preprocess::{FramePreprocessor, Preprocessed};

/// Number of frames a client batch must contain.
pub const BATCH_SIZE: usize = 10;

/// The multi-frame emotion inference pipeline.
pub struct EmotionPipeline {
    preprocessor: Arc<FramePreprocessor>,
    classifier: Arc<dyn EmotionClassifier>,
    permits: Arc<Semaphore>,
    latest: LatestEmotions,
}

impl EmotionPipeline {
    /// `workers` bounds how many frames are processed at once (minimum 1).
    pub fn new(
        detector: Arc<dyn FaceDetector>,
        classifier: Arc<dyn EmotionClassifier>,
        face_margin: f32,
        workers: usize,
    ) -> Self {
        Self {
            preprocessor: Arc::new(FramePreprocessor::new(detector, face_margin)),
            classifier,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            latest: LatestEmotions::new(),
        }
    }

    /// Processes a client batch of exactly [`BATCH_SIZE`] frames for `user`.
    ///
    /// On success the result becomes the user's latest emotion. Any error
    /// leaves the latest emotion untouched.
    pub async fn submit(
        &self,
        user: &UserId,
        frames: Vec<Bytes>,
    ) -> Result<AggregatedEmotion, EmpathError> {
        if frames.len() != BATCH_SIZE {
            return Err(EmpathError::InvalidBatchSize {
                expected: BATCH_SIZE,
                actual: frames.len(),
            });
        }

        let aggregated = self.aggregate_frames(frames).await?;
        self.latest.record(user, aggregated.clone());

        tracing::info!(
            user = %user,
            emotion = %aggregated.emotion,
            faces = aggregated.labels().len(),
            "emotion batch accepted"
        );

        Ok(aggregated)
    }

    /// Classifies and aggregates any number of frames without recording them.
    pub async fn aggregate_frames(
        &self,
        frames: Vec<Bytes>,
    ) -> Result<AggregatedEmotion, EmpathError> {
        let count = frames.len();
        let results = self.classify_frames(frames).await?;

        match aggregate(results) {
            Some(aggregated) => {
                empath_prometheus::record_batch(true);
                Ok(aggregated)
            }
            None => {
                empath_prometheus::record_batch(false);
                tracing::warn!(frames = count, "no faces detected in batch");
                Err(EmpathError::BatchRejected { frames: count })
            }
        }
    }

    /// Runs every frame through preprocessing and classification.
    ///
    /// Results come back in frame order. If any frame fails, the error of
    /// the lowest-indexed failing frame is returned.
    pub async fn classify_frames(
        &self,
        frames: Vec<Bytes>,
    ) -> Result<Vec<FrameResult>, EmpathError> {
        let tasks = frames.into_iter().enumerate().map(|(index, bytes)| {
            let permits = Arc::clone(&self.permits);
            let preprocessor = Arc::clone(&self.preprocessor);
            let classifier = Arc::clone(&self.classifier);
            async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| EmpathError::Internal(format!("frame pool closed: {e}")))?;
                tokio::task::spawn_blocking(move || {
                    process_frame(&preprocessor, classifier.as_ref(), index, &bytes)
                })
                .await
                .map_err(|e| EmpathError::Internal(format!("frame worker failed: {e}")))?
            }
        });

        futures::future::join_all(tasks)
            .await
            .into_iter()
            .collect()
    }

    /// The user's most recent accepted batch.
    pub fn latest(&self) -> &LatestEmotions {
        &self.latest
    }
}

fn process_frame(
    preprocessor: &FramePreprocessor,
    classifier: &dyn EmotionClassifier,
    index: usize,
    bytes: &[u8],
) -> Result<FrameResult, EmpathError> {
    let preprocessed = match preprocessor.process(index, bytes) {
        Ok(p) => p,
        Err(e) => {
            if matches!(e, EmpathError::Decode { .. }) {
                empath_prometheus::record_frame("decode_error");
            }
            return Err(e);
        }
    };

    match preprocessed {
        Preprocessed::NoFace => {
            empath_prometheus::record_frame("no_face");
            Ok(FrameResult::NoFace)
        }
        Preprocessed::Face(crop) => {
            let verdict = classifier.classify(&crop)?;
            empath_prometheus::record_frame("face");
            tracing::debug!(
                index,
                emotion = %verdict.label,
                confidence = verdict.confidence,
                "frame classified"
            );
            Ok(FrameResult::Labelled {
                emotion: verdict.label,
                confidence: verdict.confidence,
                face: crop.bbox(),
            })
        }
    }
}
