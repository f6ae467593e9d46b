// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Empath integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic,
//! CI-runnable tests without model files or network access.
//!
//! # Components
//!
//! - [`MockCompletion`] - Scripted text-generation service
//! - [`MemoryPersistentStore`] - In-memory persistent store with failure injection
//! - [`ShadeDetector`] / [`ShadeClassifier`] - Vision doubles driven by frame shade
//! - [`TestHarness`] - Controller and pipeline wired to the doubles above

pub mod frames;
pub mod harness;
pub mod memory_store;
pub mod mock_completion;
pub mod vision_stubs;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::MemoryPersistentStore;
pub use mock_completion::MockCompletion;
pub use vision_stubs::{ShadeClassifier, ShadeDetector};
