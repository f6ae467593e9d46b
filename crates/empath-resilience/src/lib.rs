// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for Empath's outbound collaborator calls.
//!
//! [`ResilientCompletion`] wraps any [`TextCompletionService`] so that every
//! attempt is bounded by a timeout and transient failures are retried with
//! linear backoff.

pub mod retry;

pub use retry::{ResilientCompletion, RetryPolicy};

pub use empath_core::traits::TextCompletionService;
