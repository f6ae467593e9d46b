// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-frame emotion inference for Empath.
//!
//! A batch of raw frames flows through [`FramePreprocessor`] (decode, face
//! localization, 48x48 grayscale crop), an [`EmotionClassifier`], and the
//! plurality [`aggregate`] step. [`EmotionPipeline`] runs the per-frame work
//! on a bounded blocking pool and remembers each user's latest result.

pub mod aggregate;
pub mod classifier;
pub mod detector;
pub mod latest;
pub mod pipeline;
pub mod preprocess;

pub use aggregate::{AggregatedEmotion, FrameResult, aggregate, select_emotion};
pub use classifier::{Classification, EmotionClassifier, OnnxEmotionClassifier};
pub use detector::{FaceBox, FaceDetector, OnnxFaceDetector};
pub use latest::LatestEmotions;
pub use pipeline::{BATCH_SIZE, EmotionPipeline};
pub use preprocess::{FACE_SIZE, FaceCrop, FramePreprocessor, Preprocessed};
