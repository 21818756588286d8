// crates/id-bridge-core/src/runtime/store.rs
// ============================================================================
// Module: IdBridge In-Memory Store
// Description: Simple in-memory mapping store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`MappingStore`] for tests and local demos, plus a fixed-set
//! [`AuthIdentitySource`] standing in for the sign-up recipe that mints
//! genuine identities. Transactions run against a working copy of the row
//! map; a body error discards the copy, so rollback is exact. Not intended
//! for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::UserId;
use crate::core::UserIdentityMapping;
use crate::interfaces::AuthIdentitySource;
use crate::interfaces::IdentityLookupError;
use crate::interfaces::MappingStore;
use crate::interfaces::MappingTransaction;
use crate::interfaces::StoreCapabilities;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory mapping store for tests and examples.
#[derive(Debug, Clone)]
pub struct InMemoryMappingStore {
    /// Mapping rows keyed by internal id, protected by a mutex.
    rows: Arc<Mutex<BTreeMap<String, UserIdentityMapping>>>,
    /// Capabilities advertised to the engine.
    capabilities: StoreCapabilities,
}

impl Default for InMemoryMappingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMappingStore {
    /// Creates a new in-memory mapping store with full capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(BTreeMap::new())),
            capabilities: StoreCapabilities::full(),
        }
    }

    /// Creates a store that does not advertise identity-mapping capability.
    ///
    /// Used to exercise the engine's construction-time capability check.
    #[must_use]
    pub fn without_identity_mapping() -> Self {
        Self {
            rows: Arc::new(Mutex::new(BTreeMap::new())),
            capabilities: StoreCapabilities {
                identity_mapping: false,
            },
        }
    }
}

/// Transaction view over a working copy of the row map.
struct InMemoryTransaction<'a> {
    /// Working copy of the rows; written back only on commit.
    rows: &'a mut BTreeMap<String, UserIdentityMapping>,
}

impl MappingTransaction for InMemoryTransaction<'_> {
    fn insert(&mut self, row: &UserIdentityMapping) -> Result<(), StoreError> {
        let internal_collision = self.rows.contains_key(row.internal_id.as_str());
        let external_collision =
            self.rows.values().any(|existing| existing.external_id == row.external_id);
        if internal_collision || external_collision {
            return Err(StoreError::Duplicate {
                internal_collision,
                external_collision,
            });
        }
        self.rows.insert(row.internal_id.as_str().to_string(), row.clone());
        Ok(())
    }

    fn find_by_internal(&self, id: &UserId) -> Result<Option<UserIdentityMapping>, StoreError> {
        Ok(self.rows.get(id.as_str()).cloned())
    }

    fn find_by_external(&self, id: &UserId) -> Result<Option<UserIdentityMapping>, StoreError> {
        Ok(self.rows.values().find(|row| &row.external_id == id).cloned())
    }

    fn rows_touching(&self, id: &UserId) -> Result<Vec<UserIdentityMapping>, StoreError> {
        let mut touching = Vec::new();
        if let Some(row) = self.rows.get(id.as_str()) {
            touching.push(row.clone());
        }
        if let Some(row) = self.rows.values().find(|row| {
            &row.external_id == id && row.internal_id.as_str() != id.as_str()
        }) {
            touching.push(row.clone());
        }
        Ok(touching)
    }

    fn delete(&mut self, internal_id: &UserId) -> Result<bool, StoreError> {
        Ok(self.rows.remove(internal_id.as_str()).is_some())
    }

    fn update_info(&mut self, internal_id: &UserId, info: Option<&str>) -> Result<bool, StoreError> {
        match self.rows.get_mut(internal_id.as_str()) {
            Some(row) => {
                row.external_info = info.map(ToString::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl MappingStore for InMemoryMappingStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    fn with_transaction<T, E>(
        &self,
        body: impl FnOnce(&mut dyn MappingTransaction) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self
            .rows
            .lock()
            .map_err(|_| StoreError::Store("mapping store mutex poisoned".to_string()))?;
        let mut working = guard.clone();
        let mut tx = InMemoryTransaction {
            rows: &mut working,
        };
        let value = body(&mut tx)?;
        *guard = working;
        drop(guard);
        Ok(value)
    }
}

// ============================================================================
// SECTION: Static Identity Source
// ============================================================================

/// Fixed-set identity source for tests and examples.
///
/// Stands in for the auth recipes that mint genuine identities.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentitySource {
    /// Known genuine identity ids.
    ids: BTreeSet<String>,
}

impl StaticIdentitySource {
    /// Creates an identity source with no known identities.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    /// Creates an identity source from a fixed set of ids.
    #[must_use]
    pub fn with_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a genuine identity id.
    pub fn add(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }
}

impl AuthIdentitySource for StaticIdentitySource {
    fn identity_exists(&self, id: &UserId) -> Result<bool, IdentityLookupError> {
        Ok(self.ids.contains(id.as_str()))
    }
}
