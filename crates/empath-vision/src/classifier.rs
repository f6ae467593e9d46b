// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion classification over normalized face crops.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ort::session::Session;
use ort::value::TensorRef;
use serde::Serialize;

use empath_core::error::EmpathError;
use empath_core::traits::adapter::PluginAdapter;
use empath_core::types::{AdapterType, EmotionLabel, HealthStatus};

use crate::preprocess::{FACE_SIZE, FaceCrop};

/// One classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: EmotionLabel,
    /// Softmax probability of `label`.
    pub confidence: f32,
}

/// Maps a face crop to a single emotion label.
///
/// The model is loaded once and read-only afterwards; `classify` may be
/// called from many worker threads at once.
pub trait EmotionClassifier: PluginAdapter {
    fn classify(&self, crop: &FaceCrop) -> Result<Classification, EmpathError>;
}

/// ONNX-based classifier for 48x48 grayscale FER-2013 style models.
pub struct OnnxEmotionClassifier {
    session: Mutex<Session>,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, EmpathError> {
        let session = crate::detector::load_session(model_path)?;
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&self, crop: &FaceCrop) -> Result<Classification, EmpathError> {
        let input = crop.to_input_array();

        let mut session = self.session.lock().map_err(|e| {
            EmpathError::Inference(format!("failed to lock classifier session: {e}"))
        })?;

        let tensor = TensorRef::from_array_view(&input)
            .map_err(|e| EmpathError::Inference(format!("failed to create input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| EmpathError::Inference(format!("emotion inference failed: {e}")))?;

        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmpathError::Inference(format!("failed to extract logits: {e}")))?;

        classify_logits(logits)
    }
}

#[async_trait]
impl PluginAdapter for OnnxEmotionClassifier {
    fn name(&self) -> &str {
        "onnx-emotion-classifier"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(_) => Ok(HealthStatus::Unhealthy(
                "classifier session mutex poisoned".to_string(),
            )),
        }
    }
}

/// Turns raw class logits into the most probable label.
///
/// Fails unless exactly one logit per vocabulary label is present.
pub fn classify_logits(logits: &[f32]) -> Result<Classification, EmpathError> {
    if logits.len() != EmotionLabel::ALL.len() {
        return Err(EmpathError::Inference(format!(
            "classifier produced {} logits, expected {} for a {}x{} crop",
            logits.len(),
            EmotionLabel::ALL.len(),
            FACE_SIZE,
            FACE_SIZE
        )));
    }

    let probabilities = softmax(logits);
    let (index, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| EmpathError::Inference("empty classifier output".to_string()))?;

    let label = EmotionLabel::from_class_index(index)
        .ok_or_else(|| EmpathError::Inference(format!("class index {index} out of range")))?;

    Ok(Classification { label, confidence })
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_maps_to_label() {
        let logits = [0.1, 0.0, 0.2, 0.3, 5.0, 0.0, 1.0];
        let c = classify_logits(&logits).unwrap();
        assert_eq!(c.label, EmotionLabel::Sad);
        assert!(c.confidence > 0.9 && c.confidence <= 1.0);
    }

    #[test]
    fn softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let sum: f32 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn wrong_logit_count_is_inference_error() {
        let err = classify_logits(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EmpathError::Inference(_)));
    }
}
