// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configured allow-list acting as the user directory.

use std::collections::HashSet;

use async_trait::async_trait;

use empath_core::traits::{PluginAdapter, UserDirectory};
use empath_core::types::{AdapterType, HealthStatus, UserId};
use empath_core::EmpathError;

/// A [`UserDirectory`] over a fixed set of usernames.
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: HashSet<String>,
}

impl StaticUserDirectory {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl PluginAdapter for StaticUserDirectory {
    fn name(&self) -> &str {
        "static-users"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        if self.users.is_empty() {
            Ok(HealthStatus::Degraded("no users configured".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn lookup(&self, username: &str) -> Result<Option<UserId>, EmpathError> {
        Ok(self
            .users
            .contains(username)
            .then(|| UserId::from(username)))
    }
}
