// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous row mapping for the memory tables.
//!
//! Every function runs inside a `tokio-rusqlite` call closure, usually on a
//! transaction (which derefs to `Connection`).

pub mod summaries;
pub mod turns;
