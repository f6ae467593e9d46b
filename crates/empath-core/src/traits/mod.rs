// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! All collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod completion;
pub mod directory;
pub mod storage;

pub use adapter::PluginAdapter;
pub use completion::TextCompletionService;
pub use directory::UserDirectory;
pub use storage::PersistentStore;
