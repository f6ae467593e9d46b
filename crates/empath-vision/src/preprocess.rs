// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frame decoding and face-crop normalization.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use ndarray::Array4;

use empath_core::error::EmpathError;

use crate::detector::{FaceBox, FaceDetector, select_face};

/// Side length of the square classifier input.
pub const FACE_SIZE: u32 = 48;

/// A 48x48 grayscale face crop with intensities in [0, 1], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceCrop {
    pixels: Vec<f32>,
    bbox: FaceBox,
}

impl FaceCrop {
    /// Builds a crop from exactly `FACE_SIZE * FACE_SIZE` row-major pixels.
    pub fn new(pixels: Vec<f32>, bbox: FaceBox) -> Result<Self, EmpathError> {
        let expected = (FACE_SIZE * FACE_SIZE) as usize;
        if pixels.len() != expected {
            return Err(EmpathError::Internal(format!(
                "face crop has {} pixels, expected {expected}",
                pixels.len()
            )));
        }
        Ok(Self { pixels, bbox })
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Bounding box of the crop in the source frame, margin included.
    pub fn bbox(&self) -> FaceBox {
        self.bbox
    }

    /// The crop as an NCHW `[1, 1, 48, 48]` tensor.
    pub fn to_input_array(&self) -> Array4<f32> {
        let side = FACE_SIZE as usize;
        Array4::from_shape_fn((1, 1, side, side), |(_, _, y, x)| self.pixels[y * side + x])
    }
}

/// Outcome of preprocessing one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Preprocessed {
    Face(FaceCrop),
    NoFace,
}

/// Decodes raw frames and extracts the winning face crop.
pub struct FramePreprocessor {
    detector: Arc<dyn FaceDetector>,
    margin: f32,
}

impl FramePreprocessor {
    /// `margin` is the fraction of the face box added on every side.
    pub fn new(detector: Arc<dyn FaceDetector>, margin: f32) -> Self {
        Self { detector, margin }
    }

    /// Decodes `bytes` (frame number `index` in its batch) and crops the face.
    ///
    /// Empty or undecodable payloads fail with [`EmpathError::Decode`]; a
    /// frame without a face is `Ok(Preprocessed::NoFace)`.
    pub fn process(&self, index: usize, bytes: &[u8]) -> Result<Preprocessed, EmpathError> {
        if bytes.is_empty() {
            return Err(EmpathError::Decode {
                index,
                reason: "empty payload".to_string(),
            });
        }

        let image = image::load_from_memory(bytes).map_err(|e| EmpathError::Decode {
            index,
            reason: e.to_string(),
        })?;

        let rgb = image.to_rgb8();
        let faces = self.detector.detect(&rgb)?;

        let Some(best) = select_face(&faces) else {
            tracing::debug!(index, "no face detected");
            return Ok(Preprocessed::NoFace);
        };

        let Some(bbox) = best.padded(self.margin, rgb.width(), rgb.height()) else {
            tracing::debug!(index, "face box fell outside the frame");
            return Ok(Preprocessed::NoFace);
        };

        let gray = image.to_luma8();
        let face = imageops::crop_imm(&gray, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
        let resized = imageops::resize(&face, FACE_SIZE, FACE_SIZE, FilterType::Triangle);
        let pixels = resized
            .pixels()
            .map(|p| f32::from(p.0[0]) / 255.0)
            .collect();

        Ok(Preprocessed::Face(FaceCrop::new(pixels, bbox)?))
    }
}
