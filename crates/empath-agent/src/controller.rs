// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn conversation state machine.
//!
//! A turn moves ACTIVE -> (CLEAR_REQUESTED | FAREWELL -> SUMMARIZING) -> ACTIVE.
//! Collaborator calls run without any per-user lock held; the memory store
//! re-locks only to apply the resulting transition. A failure anywhere
//! before that point commits nothing.

use std::sync::Arc;

use chrono::Utc;
use empath_core::traits::TextCompletionService;
use empath_core::{EmotionLabel, EmpathError, Turn, UserId};
use empath_memory::{FarewellCommit, FarewellOutcome, MemorySnapshot, SessionMemoryStore};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::farewell::is_farewell;
use crate::generation::Generation;
use crate::prompt;
use crate::summarizer::Summarizer;

/// Returned when the generator asks for the conversation to be forgotten.
pub const CLEAR_ACK: &str = "Okay, I've cleared our current conversation from memory.";

/// Returned when the user says goodbye.
pub const FAREWELL_ACK: &str = "Take care! Remember, you are not alone.";

/// Which transition a turn took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    Reply,
    Clear,
    Farewell,
}

impl TurnKind {
    fn as_metric(self) -> &'static str {
        match self {
            TurnKind::Reply => "reply",
            TurnKind::Clear => "clear",
            TurnKind::Farewell => "farewell",
        }
    }
}

/// What the caller sees after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    #[serde(skip)]
    pub kind: TurnKind,
    pub message: String,
    /// Summary texts, oldest first.
    pub chat_history: Vec<String>,
}

/// Orchestrates chat turns against the memory store and the generator.
pub struct ConversationController {
    memory: Arc<SessionMemoryStore>,
    completion: Arc<dyn TextCompletionService>,
    summarizer: Summarizer,
    context_summaries: usize,
}

impl ConversationController {
    /// `context_summaries` bounds how many recent summaries each reply prompt carries.
    pub fn new(
        memory: Arc<SessionMemoryStore>,
        completion: Arc<dyn TextCompletionService>,
        context_summaries: usize,
    ) -> Self {
        let summarizer = Summarizer::new(Arc::clone(&completion));
        Self {
            memory,
            completion,
            summarizer,
            context_summaries,
        }
    }

    pub fn memory(&self) -> &Arc<SessionMemoryStore> {
        &self.memory
    }

    /// Runs one chat turn for `user`.
    pub async fn handle_turn(
        &self,
        user: &UserId,
        user_input: &str,
        emotion: EmotionLabel,
    ) -> Result<TurnOutcome, EmpathError> {
        let result = self.run_turn(user, user_input, emotion).await;
        match &result {
            Ok(outcome) => empath_prometheus::record_turn(outcome.kind.as_metric()),
            Err(e) => {
                empath_prometheus::record_turn("failed");
                warn!(user = %user, error = %e, "chat turn failed, nothing committed");
            }
        }
        result
    }

    async fn run_turn(
        &self,
        user: &UserId,
        user_input: &str,
        emotion: EmotionLabel,
    ) -> Result<TurnOutcome, EmpathError> {
        let snapshot = self.memory.snapshot(user).await?;

        let recent_from = snapshot
            .summaries
            .len()
            .saturating_sub(self.context_summaries);
        let prompt = prompt::reply_prompt(
            snapshot.transcript.turns(),
            &snapshot.summaries[recent_from..],
            user_input,
            emotion,
        );

        let raw = self.completion.complete(&prompt).await.inspect_err(|_| {
            empath_prometheus::record_collaborator_failure("generation");
        })?;

        match Generation::classify(&raw)? {
            Generation::ClearRequest => {
                self.memory.clear_transcript(user).await?;
                info!(user = %user, "clear requested, transcript reset");
                Ok(TurnOutcome {
                    kind: TurnKind::Clear,
                    message: CLEAR_ACK.to_string(),
                    chat_history: snapshot.summary_texts(),
                })
            }
            Generation::Reply(reply) => {
                let turn = Turn::new(user_input, reply, emotion);
                if is_farewell(user_input) {
                    return self.farewell(user, snapshot, turn).await;
                }

                let message = turn.bot_response.clone();
                self.memory.append_turn(user, turn).await?;
                debug!(user = %user, emotion = %emotion, "turn appended");
                Ok(TurnOutcome {
                    kind: TurnKind::Reply,
                    message,
                    chat_history: self.memory.get_summaries(user).await?,
                })
            }
        }
    }

    /// Summarizes the snapshot plus the farewell turn, then commits.
    ///
    /// The farewell turn is summarized but never stored on its own, so a
    /// summarizer failure leaves the transcript exactly as it was.
    async fn farewell(
        &self,
        user: &UserId,
        snapshot: MemorySnapshot,
        turn: Turn,
    ) -> Result<TurnOutcome, EmpathError> {
        let mut covered = snapshot.transcript.turns().to_vec();
        covered.push(turn.clone());

        let record = self
            .summarizer
            .summarize(&covered, Utc::now())
            .await
            .inspect_err(|_| {
                empath_prometheus::record_collaborator_failure("summarization");
            })?;

        let commit = FarewellCommit {
            epoch: snapshot.epoch,
            summarized_turns: snapshot.transcript.len(),
            turn,
            record,
        };
        if self.memory.commit_farewell(user, commit).await? == FarewellOutcome::Superseded {
            info!(user = %user, "farewell overtaken by a clear, no summary stored");
        }

        Ok(TurnOutcome {
            kind: TurnKind::Farewell,
            message: FAREWELL_ACK.to_string(),
            chat_history: snapshot.summary_texts(),
        })
    }
}
