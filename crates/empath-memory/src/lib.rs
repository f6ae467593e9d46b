// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational memory for Empath.
//!
//! [`SessionMemoryStore`] owns every user's current transcript and summary
//! list. Mutations for one user are serialized; different users never
//! contend. Each mutation is written through to a
//! [`PersistentStore`](empath_core::PersistentStore) before it becomes visible.

pub mod store;

pub use store::{FarewellCommit, FarewellOutcome, MemorySnapshot, SessionMemoryStore};
