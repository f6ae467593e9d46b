// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `empath classify`: run the vision pipeline over local image files.

use std::path::PathBuf;

use bytes::Bytes;
use empath_config::EmpathConfig;
use empath_core::EmpathError;
use empath_vision::{AggregatedEmotion, FrameResult};

/// Classifies `files` as one batch of any size and prints the result.
pub async fn run_classify(config: &EmpathConfig, files: &[PathBuf]) -> Result<(), EmpathError> {
    crate::init_tracing(&config.agent.log_level);

    let mut frames = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            EmpathError::InvalidInput(format!("cannot read {}: {e}", path.display()))
        })?;
        frames.push(Bytes::from(bytes));
    }

    let pipeline = crate::serve::build_pipeline(config)?;
    let aggregated = pipeline.aggregate_frames(frames).await?;
    print!("{}", render_report(files, &aggregated));
    Ok(())
}

fn render_report(files: &[PathBuf], aggregated: &AggregatedEmotion) -> String {
    let mut out = String::new();
    for (path, frame) in files.iter().zip(&aggregated.frames) {
        let verdict = match frame {
            FrameResult::Labelled {
                emotion,
                confidence,
                ..
            } => format!("{emotion} ({confidence:.2})"),
            FrameResult::NoFace => "no face".to_string(),
        };
        out.push_str(&format!("{}: {verdict}\n", path.display()));
    }
    out.push_str(&format!("aggregated: {}\n", aggregated.emotion));
    out
}

#[cfg(test)]
mod tests {
    use empath_core::EmotionLabel;
    use empath_vision::FaceBox;

    use super::*;

    #[test]
    fn report_lists_frames_then_aggregate() {
        let face = FaceBox {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
            score: 0.9,
        };
        let aggregated = AggregatedEmotion {
            emotion: EmotionLabel::Happy,
            frames: vec![
                FrameResult::Labelled {
                    emotion: EmotionLabel::Happy,
                    confidence: 0.9,
                    face,
                },
                FrameResult::NoFace,
            ],
        };
        let files = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
        assert_eq!(
            render_report(&files, &aggregated),
            "a.png: happy (0.90)\nb.png: no face\naggregated: happy\n"
        );
    }
}
