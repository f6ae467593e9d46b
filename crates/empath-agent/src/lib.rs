// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation control for Empath.
//!
//! The [`ConversationController`] drives one chat turn end to end:
//! - Snapshots the user's transcript and summaries
//! - Composes the reply prompt and calls the text-generation collaborator
//! - Classifies the output as a reply or a clear request
//! - Appends the turn, or on farewell summarizes and resets the transcript

pub mod controller;
pub mod farewell;
pub mod generation;
pub mod prompt;
pub mod summarizer;

pub use controller::{ConversationController, TurnKind, TurnOutcome, CLEAR_ACK, FAREWELL_ACK};
pub use farewell::is_farewell;
pub use generation::Generation;
pub use summarizer::Summarizer;
