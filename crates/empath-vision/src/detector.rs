// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Face localization.
//!
//! [`OnnxFaceDetector`] runs the UltraFace RFB-320 model: a 320x240 RGB
//! input normalized as `(x - 127) / 128`, producing per-anchor class scores
//! `[1, N, 2]` and corner boxes `[1, N, 4]` in normalized coordinates.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use serde::Serialize;

use empath_core::error::EmpathError;
use empath_core::traits::adapter::PluginAdapter;
use empath_core::types::{AdapterType, HealthStatus};

const INPUT_WIDTH: u32 = 320;
const INPUT_HEIGHT: u32 = 240;

/// A face bounding box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Detector confidence in [0, 1].
    pub score: f32,
}

impl FaceBox {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Grows the box by `margin` of its size on every side and clamps it to
    /// an `image_width` x `image_height` frame.
    ///
    /// Returns `None` when nothing of the box lies inside the frame.
    pub fn padded(&self, margin: f32, image_width: u32, image_height: u32) -> Option<FaceBox> {
        let pad_x = (self.width as f32 * margin).round() as u32;
        let pad_y = (self.height as f32 * margin).round() as u32;

        let x0 = self.x.saturating_sub(pad_x);
        let y0 = self.y.saturating_sub(pad_y);
        let x1 = self
            .x
            .saturating_add(self.width)
            .saturating_add(pad_x)
            .min(image_width);
        let y1 = self
            .y
            .saturating_add(self.height)
            .saturating_add(pad_y)
            .min(image_height);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(FaceBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
            score: self.score,
        })
    }
}

/// Locates faces in a decoded frame.
///
/// Implementations are called from blocking worker threads and must be
/// safe to share across them.
pub trait FaceDetector: PluginAdapter {
    /// Returns every face found, in no particular order. An empty vector
    /// means no face; it is not an error.
    fn detect(&self, image: &RgbImage) -> Result<Vec<FaceBox>, EmpathError>;
}

/// Picks the face that wins when several are found: highest detector
/// confidence, then largest area.
pub fn select_face(faces: &[FaceBox]) -> Option<FaceBox> {
    faces.iter().copied().max_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.area().cmp(&b.area()))
    })
}

/// ONNX-based face detector.
pub struct OnnxFaceDetector {
    session: Mutex<Session>,
    threshold: f32,
}

impl OnnxFaceDetector {
    /// Loads the detector model from disk.
    ///
    /// `threshold` is the minimum face-class probability for a detection.
    pub fn new(model_path: &Path, threshold: f32) -> Result<Self, EmpathError> {
        let session = load_session(model_path)?;
        Ok(Self {
            session: Mutex::new(session),
            threshold,
        })
    }

    fn preprocess(image: &RgbImage) -> Array4<f32> {
        let resized = imageops::resize(image, INPUT_WIDTH, INPUT_HEIGHT, FilterType::Triangle);
        Array4::from_shape_fn(
            (1, 3, INPUT_HEIGHT as usize, INPUT_WIDTH as usize),
            |(_, c, y, x)| {
                let value = resized.get_pixel(x as u32, y as u32).0[c];
                (f32::from(value) - 127.0) / 128.0
            },
        )
    }
}

/// Builds an ONNX session the way every Empath model is loaded.
pub(crate) fn load_session(model_path: &Path) -> Result<Session, EmpathError> {
    Session::builder()
        .map_err(|e| EmpathError::Config(format!("failed to create ONNX session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| EmpathError::Config(format!("failed to set optimization level: {e}")))?
        .with_intra_threads(1)
        .map_err(|e| EmpathError::Config(format!("failed to set thread count: {e}")))?
        .commit_from_file(model_path)
        .map_err(|e| {
            EmpathError::Config(format!(
                "failed to load ONNX model from {}: {e}",
                model_path.display()
            ))
        })
}

/// Converts raw detector outputs into pixel-space boxes above `threshold`.
///
/// `scores` holds `[background, face]` pairs and `boxes` holds
/// `[x0, y0, x1, y1]` quadruples, both in anchor order.
pub(crate) fn decode_detections(
    scores: &[f32],
    boxes: &[f32],
    threshold: f32,
    image_width: u32,
    image_height: u32,
) -> Vec<FaceBox> {
    let w = image_width as f32;
    let h = image_height as f32;

    scores
        .chunks_exact(2)
        .zip(boxes.chunks_exact(4))
        .filter(|(score, _)| score[1] >= threshold)
        .filter_map(|(score, corners)| {
            let x0 = (corners[0].clamp(0.0, 1.0) * w).round();
            let y0 = (corners[1].clamp(0.0, 1.0) * h).round();
            let x1 = (corners[2].clamp(0.0, 1.0) * w).round();
            let y1 = (corners[3].clamp(0.0, 1.0) * h).round();
            if x1 <= x0 || y1 <= y0 {
                return None;
            }
            Some(FaceBox {
                x: x0 as u32,
                y: y0 as u32,
                width: (x1 - x0) as u32,
                height: (y1 - y0) as u32,
                score: score[1],
            })
        })
        .collect()
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<FaceBox>, EmpathError> {
        let input = Self::preprocess(image);

        let mut session = self
            .session
            .lock()
            .map_err(|e| EmpathError::Inference(format!("failed to lock detector session: {e}")))?;

        let tensor = TensorRef::from_array_view(&input)
            .map_err(|e| EmpathError::Inference(format!("failed to create input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| EmpathError::Inference(format!("face detection failed: {e}")))?;

        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmpathError::Inference(format!("failed to extract scores: {e}")))?;
        let (_, boxes) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmpathError::Inference(format!("failed to extract boxes: {e}")))?;

        Ok(decode_detections(
            scores,
            boxes,
            self.threshold,
            image.width(),
            image.height(),
        ))
    }
}

#[async_trait]
impl PluginAdapter for OnnxFaceDetector {
    fn name(&self) -> &str {
        "onnx-face-detector"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::FaceDetector
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(_) => Ok(HealthStatus::Unhealthy(
                "detector session mutex poisoned".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: u32, y: u32, w: u32, h: u32, score: f32) -> FaceBox {
        FaceBox {
            x,
            y,
            width: w,
            height: h,
            score,
        }
    }

    #[test]
    fn select_prefers_confidence_then_area() {
        let faces = [
            face(0, 0, 10, 10, 0.8),
            face(0, 0, 50, 50, 0.9),
            face(0, 0, 80, 80, 0.9),
        ];
        let best = select_face(&faces).unwrap();
        assert_eq!(best.width, 80);
        assert!(select_face(&[]).is_none());
    }

    #[test]
    fn padding_clamps_to_image() {
        let b = face(5, 5, 20, 20, 0.9);
        let padded = b.padded(0.5, 30, 100).unwrap();
        assert_eq!((padded.x, padded.y), (0, 0));
        assert_eq!(padded.width, 30);
        assert_eq!(padded.height, 35);
    }

    #[test]
    fn padding_outside_image_yields_none() {
        let b = face(200, 200, 10, 10, 0.9);
        assert!(b.padded(0.1, 100, 100).is_none());
    }

    #[test]
    fn decode_filters_by_threshold_and_scales() {
        let scores = [0.9, 0.1, 0.2, 0.8];
        let boxes = [0.0, 0.0, 0.5, 0.5, 0.25, 0.25, 0.75, 0.75];
        let faces = decode_detections(&scores, &boxes, 0.7, 200, 100);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0], face(50, 25, 100, 50, 0.8));
    }

    #[test]
    fn decode_drops_degenerate_boxes() {
        let scores = [0.0, 0.99];
        let boxes = [0.6, 0.6, 0.4, 0.8];
        assert!(decode_detections(&scores, &boxes, 0.5, 100, 100).is_empty());
    }
}
