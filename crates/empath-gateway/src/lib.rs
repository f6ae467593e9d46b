// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin HTTP gateway for Empath.
//!
//! Exposes the emotion pipeline and the conversation controller over a
//! small REST surface. Handlers only parse, resolve the caller, and map
//! errors; all behavior lives in the core crates.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod users;

pub use auth::{AuthConfig, USER_HEADER};
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, HealthState, ServerConfig, router, start_server};
pub use users::StaticUserDirectory;
