// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encoded test frames understood by the vision stubs.
//!
//! A labelled frame is a uniform gray PNG whose shade encodes the label's
//! class index; a black frame has no face.

use std::io::Cursor;

use bytes::Bytes;
use empath_core::EmotionLabel;
use image::{ImageFormat, Rgb, RgbImage};

const FRAME_SIZE: u32 = 64;
const BASE_SHADE: u8 = 40;
const SHADE_STEP: u8 = 30;

/// Gray level used for frames showing `label`.
pub fn shade_for(label: EmotionLabel) -> u8 {
    BASE_SHADE + SHADE_STEP * label as u8
}

/// Maps a gray level back to the nearest label.
pub fn label_for_shade(shade: f32) -> Option<EmotionLabel> {
    let index = ((shade - BASE_SHADE as f32) / SHADE_STEP as f32).round();
    if index < 0.0 {
        return None;
    }
    EmotionLabel::from_class_index(index as usize)
}

fn png(shade: u8) -> Bytes {
    let img = RgbImage::from_pixel(FRAME_SIZE, FRAME_SIZE, Rgb([shade, shade, shade]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    Bytes::from(out.into_inner())
}

/// A frame the stubs classify as `label`.
pub fn face_frame(label: EmotionLabel) -> Bytes {
    png(shade_for(label))
}

/// A valid image with no face in it.
pub fn no_face_frame() -> Bytes {
    png(0)
}

/// Bytes that are not an image.
pub fn corrupt_frame() -> Bytes {
    Bytes::from_static(b"definitely not a png")
}

/// A batch where `None` entries are faceless frames.
pub fn batch(labels: &[Option<EmotionLabel>]) -> Vec<Bytes> {
    labels
        .iter()
        .map(|l| l.map(face_frame).unwrap_or_else(no_face_frame))
        .collect()
}

/// A batch of `count` frames all showing `label`.
pub fn uniform_batch(label: EmotionLabel, count: usize) -> Vec<Bytes> {
    (0..count).map(|_| face_frame(label)).collect()
}
