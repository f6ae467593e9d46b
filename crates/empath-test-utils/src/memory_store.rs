// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `PersistentStore` with save-failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use empath_core::traits::adapter::PluginAdapter;
use empath_core::traits::storage::PersistentStore;
use empath_core::types::{AdapterType, HealthStatus, UserId, UserMemory};
use empath_core::EmpathError;

/// A `PersistentStore` backed by a `HashMap`.
///
/// Clones share state, so a test can keep a handle while the store under
/// test owns another.
#[derive(Clone, Default)]
pub struct MemoryPersistentStore {
    records: Arc<Mutex<HashMap<UserId, UserMemory>>>,
    fail_saves: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
    loads: Arc<AtomicUsize>,
}

impl MemoryPersistentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user's stored memory directly.
    pub fn insert(&self, user: &UserId, memory: UserMemory) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(user.clone(), memory);
        }
    }

    /// What is currently persisted for `user`.
    pub fn stored(&self, user: &UserId) -> Option<UserMemory> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(user).cloned())
    }

    /// While set, every `save` fails with a storage error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

fn poisoned() -> EmpathError {
    EmpathError::Internal("memory store mutex poisoned".to_string())
}

#[async_trait]
impl PluginAdapter for MemoryPersistentStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PersistentStore for MemoryPersistentStore {
    async fn load(&self, user: &UserId) -> Result<UserMemory, EmpathError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let records = self.records.lock().map_err(|_| poisoned())?;
        Ok(records.get(user).cloned().unwrap_or_default())
    }

    async fn save(&self, user: &UserId, memory: &UserMemory) -> Result<(), EmpathError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(EmpathError::Storage {
                source: "injected save failure".into(),
            });
        }
        let mut records = self.records.lock().map_err(|_| poisoned())?;
        records.insert(user.clone(), memory.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
