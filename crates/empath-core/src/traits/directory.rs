// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory collaborator.

use async_trait::async_trait;

use crate::error::EmpathError;
use crate::traits::adapter::PluginAdapter;
use crate::types::UserId;

/// Resolves usernames to user handles. Account management lives elsewhere.
#[async_trait]
pub trait UserDirectory: PluginAdapter {
    /// Returns the user handle, or `None` when the username is unknown.
    async fn lookup(&self, username: &str) -> Result<Option<UserId>, EmpathError>;
}
