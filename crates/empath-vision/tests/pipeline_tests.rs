// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch-level behavior of the emotion pipeline with deterministic
//! detector and classifier doubles.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};

use empath_core::traits::adapter::PluginAdapter;
use empath_core::types::{AdapterType, EmotionLabel, HealthStatus, UserId};
use empath_core::EmpathError;
use empath_vision::{
    BATCH_SIZE, Classification, EmotionClassifier, EmotionPipeline, FaceBox, FaceCrop,
    FaceDetector, FrameResult,
};

/// Finds a face in any frame whose first pixel is not black.
struct BrightnessDetector;

#[async_trait]
impl PluginAdapter for BrightnessDetector {
    fn name(&self) -> &str {
        "brightness-detector"
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::FaceDetector
    }
    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        Ok(HealthStatus::Healthy)
    }
}

impl FaceDetector for BrightnessDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<FaceBox>, EmpathError> {
        if image.get_pixel(0, 0).0 == [0, 0, 0] {
            return Ok(Vec::new());
        }
        Ok(vec![FaceBox {
            x: 0,
            y: 0,
            width: image.width(),
            height: image.height(),
            score: 0.99,
        }])
    }
}

/// Labels crops by brightness: dark is sad, bright is happy.
#[derive(Default)]
struct BrightnessClassifier {
    calls: AtomicUsize,
}

#[async_trait]
impl PluginAdapter for BrightnessClassifier {
    fn name(&self) -> &str {
        "brightness-classifier"
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }
    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        Ok(HealthStatus::Healthy)
    }
}

impl EmotionClassifier for BrightnessClassifier {
    fn classify(&self, crop: &FaceCrop) -> Result<Classification, EmpathError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mean = crop.pixels().iter().sum::<f32>() / crop.pixels().len() as f32;
        let label = if mean < 0.5 {
            EmotionLabel::Sad
        } else {
            EmotionLabel::Happy
        };
        Ok(Classification {
            label,
            confidence: 0.8,
        })
    }
}

fn frame(gray: u8) -> Bytes {
    let img = RgbImage::from_pixel(32, 32, Rgb([gray, gray, gray]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    Bytes::from(buf.into_inner())
}

fn pipeline() -> (EmotionPipeline, Arc<BrightnessClassifier>) {
    let classifier = Arc::new(BrightnessClassifier::default());
    let pipeline = EmotionPipeline::new(
        Arc::new(BrightnessDetector),
        classifier.clone(),
        0.0,
        3,
    );
    (pipeline, classifier)
}

#[tokio::test]
async fn nine_sad_frames_and_one_without_face() {
    let (pipeline, _) = pipeline();
    let user = UserId::from("ana");

    let mut frames = vec![frame(40); 9];
    frames.push(frame(0));

    let agg = pipeline.submit(&user, frames).await.unwrap();
    assert_eq!(agg.emotion, EmotionLabel::Sad);
    assert_eq!(agg.frames.len(), BATCH_SIZE);
    assert_eq!(agg.frames[9], FrameResult::NoFace);
    assert_eq!(pipeline.latest().label_or_default(&user), EmotionLabel::Sad);
}

#[tokio::test]
async fn results_keep_frame_order() {
    let (pipeline, _) = pipeline();
    let frames: Vec<Bytes> = (0..BATCH_SIZE)
        .map(|i| if i % 2 == 0 { frame(250) } else { frame(0) })
        .collect();

    let results = pipeline.classify_frames(frames).await.unwrap();
    for (i, result) in results.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(result.label(), Some(EmotionLabel::Happy));
        } else {
            assert_eq!(*result, FrameResult::NoFace);
        }
    }
}

#[tokio::test]
async fn wrong_batch_size_is_rejected_before_inference() {
    let (pipeline, classifier) = pipeline();
    let user = UserId::from("ana");

    let err = pipeline.submit(&user, vec![frame(40); 3]).await.unwrap_err();
    assert!(matches!(
        err,
        EmpathError::InvalidBatchSize {
            expected: 10,
            actual: 3
        }
    ));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    assert!(pipeline.latest().get(&user).is_none());
}

#[tokio::test]
async fn batch_without_faces_changes_nothing() {
    let (pipeline, _) = pipeline();
    let user = UserId::from("ana");

    pipeline
        .submit(&user, vec![frame(250); BATCH_SIZE])
        .await
        .unwrap();

    let err = pipeline
        .submit(&user, vec![frame(0); BATCH_SIZE])
        .await
        .unwrap_err();
    assert!(matches!(err, EmpathError::BatchRejected { frames: 10 }));
    assert_eq!(pipeline.latest().label_or_default(&user), EmotionLabel::Happy);
}

#[tokio::test]
async fn corrupt_frame_fails_whole_batch() {
    let (pipeline, _) = pipeline();
    let user = UserId::from("ana");

    let mut frames = vec![frame(40); BATCH_SIZE];
    frames[4] = Bytes::from_static(b"not a png");
    frames[7] = Bytes::new();

    let err = pipeline.submit(&user, frames).await.unwrap_err();
    assert!(matches!(err, EmpathError::Decode { index: 4, .. }));
    assert!(err.is_client_error());
    assert!(pipeline.latest().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_users_are_tracked_independently() {
    let (pipeline, _) = pipeline();
    let pipeline = Arc::new(pipeline);

    let sad = {
        let p = Arc::clone(&pipeline);
        tokio::spawn(async move {
            p.submit(&UserId::from("ana"), vec![frame(40); BATCH_SIZE])
                .await
        })
    };
    let happy = {
        let p = Arc::clone(&pipeline);
        tokio::spawn(async move {
            p.submit(&UserId::from("ben"), vec![frame(250); BATCH_SIZE])
                .await
        })
    };

    sad.await.unwrap().unwrap();
    happy.await.unwrap().unwrap();

    let latest = pipeline.latest();
    assert_eq!(latest.label_or_default(&UserId::from("ana")), EmotionLabel::Sad);
    assert_eq!(latest.label_or_default(&UserId::from("ben")), EmotionLabel::Happy);
}
