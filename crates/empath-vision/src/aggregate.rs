// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reduction of per-frame verdicts to one committed label.

use serde::Serialize;

use empath_core::types::EmotionLabel;

use crate::detector::FaceBox;

/// Per-frame outcome within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameResult {
    Labelled {
        emotion: EmotionLabel,
        confidence: f32,
        face: FaceBox,
    },
    NoFace,
}

impl FrameResult {
    pub fn label(&self) -> Option<EmotionLabel> {
        match self {
            FrameResult::Labelled { emotion, .. } => Some(*emotion),
            FrameResult::NoFace => None,
        }
    }
}

/// The committed label for one batch plus every frame that fed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEmotion {
    pub emotion: EmotionLabel,
    pub frames: Vec<FrameResult>,
}

impl AggregatedEmotion {
    /// Labels of frames that had a face, in frame order.
    pub fn labels(&self) -> Vec<EmotionLabel> {
        self.frames.iter().filter_map(FrameResult::label).collect()
    }
}

/// Plurality vote over labelled frames.
///
/// Ties go to the label earliest in [`EmotionLabel::TIE_BREAK_ORDER`].
/// Returns `None` when no frame carries a label.
pub fn select_emotion(frames: &[FrameResult]) -> Option<EmotionLabel> {
    let mut counts = [0usize; EmotionLabel::ALL.len()];
    for label in frames.iter().filter_map(FrameResult::label) {
        counts[label as usize] += 1;
    }

    EmotionLabel::TIE_BREAK_ORDER
        .iter()
        .copied()
        .filter(|label| counts[*label as usize] > 0)
        .fold(None, |best: Option<EmotionLabel>, label| match best {
            Some(b) if counts[b as usize] >= counts[label as usize] => Some(b),
            _ => Some(label),
        })
}

/// Aggregates a batch, or `None` if it has no labelled frame.
pub fn aggregate(frames: Vec<FrameResult>) -> Option<AggregatedEmotion> {
    let emotion = select_emotion(&frames)?;
    Some(AggregatedEmotion { emotion, frames })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn labelled(emotion: EmotionLabel) -> FrameResult {
        FrameResult::Labelled {
            emotion,
            confidence: 0.9,
            face: FaceBox {
                x: 0,
                y: 0,
                width: 10,
                height: 10,
                score: 0.9,
            },
        }
    }

    #[test]
    fn nine_sad_one_no_face_is_sad() {
        let mut frames = vec![labelled(EmotionLabel::Sad); 9];
        frames.push(FrameResult::NoFace);
        let agg = aggregate(frames).unwrap();
        assert_eq!(agg.emotion, EmotionLabel::Sad);
        assert_eq!(agg.labels().len(), 9);
        assert_eq!(agg.frames.len(), 10);
    }

    #[test]
    fn plurality_wins() {
        let frames = vec![
            labelled(EmotionLabel::Happy),
            labelled(EmotionLabel::Happy),
            labelled(EmotionLabel::Sad),
            FrameResult::NoFace,
        ];
        assert_eq!(select_emotion(&frames), Some(EmotionLabel::Happy));
    }

    #[test]
    fn ties_prefer_distress() {
        let frames = vec![
            labelled(EmotionLabel::Happy),
            labelled(EmotionLabel::Angry),
            labelled(EmotionLabel::Happy),
            labelled(EmotionLabel::Angry),
        ];
        assert_eq!(select_emotion(&frames), Some(EmotionLabel::Angry));

        let frames = vec![
            labelled(EmotionLabel::Neutral),
            labelled(EmotionLabel::Surprise),
        ];
        assert_eq!(select_emotion(&frames), Some(EmotionLabel::Surprise));
    }

    #[test]
    fn all_no_face_is_rejected() {
        assert!(aggregate(vec![FrameResult::NoFace; 10]).is_none());
        assert!(aggregate(Vec::new()).is_none());
    }

    #[test]
    fn frame_result_serializes_tagged() {
        let json = serde_json::to_value(FrameResult::NoFace).unwrap();
        assert_eq!(json["status"], "no_face");
        let json = serde_json::to_value(labelled(EmotionLabel::Fear)).unwrap();
        assert_eq!(json["status"], "labelled");
        assert_eq!(json["emotion"], "fear");
    }

    fn frame_strategy() -> impl Strategy<Value = FrameResult> {
        prop_oneof![
            Just(FrameResult::NoFace),
            (0usize..7).prop_map(|i| labelled(EmotionLabel::ALL[i])),
        ]
    }

    proptest! {
        #[test]
        fn winner_has_maximal_count(frames in prop::collection::vec(frame_strategy(), 0..=10)) {
            let labels: Vec<_> = frames.iter().filter_map(FrameResult::label).collect();
            match select_emotion(&frames) {
                None => prop_assert!(labels.is_empty()),
                Some(winner) => {
                    let count = |l: EmotionLabel| labels.iter().filter(|x| **x == l).count();
                    let max = EmotionLabel::ALL.iter().map(|l| count(*l)).max().unwrap_or(0);
                    prop_assert_eq!(count(winner), max);
                    for other in EmotionLabel::ALL {
                        if count(other) == max {
                            prop_assert!(winner.tie_break_rank() <= other.tie_break_rank());
                        }
                    }
                }
            }
        }
    }
}
