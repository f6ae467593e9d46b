// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detector and classifier doubles for the frames in [`crate::frames`].

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use empath_core::traits::adapter::PluginAdapter;
use empath_core::types::{AdapterType, HealthStatus};
use empath_core::EmpathError;
use empath_vision::{Classification, EmotionClassifier, FaceBox, FaceCrop, FaceDetector};
use image::RgbImage;

use crate::frames::label_for_shade;

/// Reports one full-frame face unless the top-left pixel is black.
#[derive(Debug, Default)]
pub struct ShadeDetector;

#[async_trait]
impl PluginAdapter for ShadeDetector {
    fn name(&self) -> &str {
        "shade-detector"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::FaceDetector
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        Ok(HealthStatus::Healthy)
    }
}

impl FaceDetector for ShadeDetector {
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

/// Labels a crop by its mean gray level and counts invocations.
#[derive(Debug, Default)]
pub struct ShadeClassifier {
    calls: AtomicUsize,
}

impl ShadeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for ShadeClassifier {
    fn name(&self) -> &str {
        "shade-classifier"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        Ok(HealthStatus::Healthy)
    }
}

impl EmotionClassifier for ShadeClassifier {
    fn classify(&self, crop: &FaceCrop) -> Result<Classification, EmpathError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pixels = crop.pixels();
        let mean = pixels.iter().sum::<f32>() / pixels.len() as f32;
        let label = label_for_shade(mean * 255.0)
            .ok_or_else(|| EmpathError::Inference(format!("unexpected shade {mean}")))?;
        Ok(Classification {
            label,
            confidence: 1.0,
        })
    }
}
