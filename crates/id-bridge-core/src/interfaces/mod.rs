// crates/id-bridge-core/src/interfaces/mod.rs
// ============================================================================
// Module: IdBridge Interfaces
// Description: Backend-agnostic contracts for identity, recipes, and storage.
// Purpose: Define the collaborator surfaces consumed by the mapping engine.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the identity-mapping core integrates with the rest
//! of an authentication backend without embedding backend-specific details.
//! Three contracts are consumed: an auth-identity check, per-recipe storage
//! probes, and the transactional mapping store. Implementations must be
//! deterministic within a transaction and fail closed on I/O errors.
//!
//! Invariants:
//! - Not-found is a normal outcome for lookups, never an error.
//! - Collaborator I/O failures are fatal to the current call; no retries
//!   happen inside this core.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::UserId;
use crate::core::UserIdentityMapping;

// ============================================================================
// SECTION: Auth Identity Source
// ============================================================================

/// Identity lookup errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum IdentityLookupError {
    /// Identity source reported an error.
    #[error("identity lookup error: {0}")]
    Lookup(String),
}

/// Auth-identity collaborator answering whether an id was genuinely issued.
pub trait AuthIdentitySource {
    /// Returns true when the id denotes a genuine identity issued by an auth
    /// recipe.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityLookupError`] when the identity source cannot be
    /// queried.
    fn identity_exists(&self, id: &UserId) -> Result<bool, IdentityLookupError>;
}

// ============================================================================
// SECTION: Recipe Storage
// ============================================================================

/// Recipe storage errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RecipeStorageError {
    /// Recipe storage reported an error.
    #[error("recipe storage error: {0}")]
    Storage(String),
}

/// Non-auth recipe storage keyed by user id.
///
/// One instance exists per registered recipe. The probe is a side-effect-free
/// read; the referential-integrity guard may issue probes in any order and
/// stops at the first positive answer.
pub trait RecipeStorage {
    /// Returns true when the recipe holds any data keyed by the given id.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeStorageError`] when the recipe storage cannot be
    /// queried.
    fn has_any_data_for_user_id(&self, id: &UserId) -> Result<bool, RecipeStorageError>;

    /// Returns the stable recipe name used in error reporting.
    fn recipe_name(&self) -> &str;
}

// ============================================================================
// SECTION: Mapping Store
// ============================================================================

/// Mapping store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Duplicate` reports both collision flags independently so callers can
///   tell which column(s) collided.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// Store I/O error.
    #[error("mapping store io error: {0}")]
    Io(String),
    /// Store data or configuration is invalid.
    #[error("mapping store invalid data: {0}")]
    Invalid(String),
    /// Insert violated a uniqueness constraint.
    #[error(
        "duplicate mapping row (internal collision: {internal_collision}, external collision: {external_collision})"
    )]
    Duplicate {
        /// True when the internal id column collided.
        internal_collision: bool,
        /// True when the external id column collided.
        external_collision: bool,
    },
    /// Store reported an error.
    #[error("mapping store error: {0}")]
    Store(String),
}

/// Capabilities advertised by a mapping store.
///
/// # Invariants
/// - Capabilities are fixed for the lifetime of a store handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// True when the store supports identity-mapping rows.
    pub identity_mapping: bool,
}

impl StoreCapabilities {
    /// Returns capabilities with every feature supported.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            identity_mapping: true,
        }
    }
}

/// Operations available inside a single mapping-store transaction.
///
/// Each method sees the transaction's own snapshot with at least
/// read-committed isolation. Writes become visible only on commit.
pub trait MappingTransaction {
    /// Inserts a new mapping row.
    ///
    /// The store's own uniqueness constraints are the final race-closer
    /// against a concurrent create of the same id pair; an application-level
    /// pre-check is an optimization, not the guarantee.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when either uniqueness constraint is
    /// violated, with both collision flags reported independently.
    fn insert(&mut self, row: &UserIdentityMapping) -> Result<(), StoreError>;

    /// Returns the row whose internal id equals `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_by_internal(&self, id: &UserId) -> Result<Option<UserIdentityMapping>, StoreError>;

    /// Returns the row whose external id equals `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_by_external(&self, id: &UserId) -> Result<Option<UserIdentityMapping>, StoreError>;

    /// Returns every row where `id` appears in either column (0, 1, or 2
    /// rows), internal-column match first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn rows_touching(&self, id: &UserId) -> Result<Vec<UserIdentityMapping>, StoreError>;

    /// Deletes the row keyed by `internal_id`, returning whether a row was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the deletion fails.
    fn delete(&mut self, internal_id: &UserId) -> Result<bool, StoreError>;

    /// Sets the external info of the row keyed by `internal_id`, returning
    /// whether a row was present. `None` clears the field. Setting the
    /// current value is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_info(&mut self, internal_id: &UserId, info: Option<&str>) -> Result<bool, StoreError>;
}

/// Transactional mapping store contract.
///
/// # Invariants
/// - Every engine operation runs inside exactly one transaction.
/// - The body's `Ok` commits; any `Err` rolls back with no partial state.
pub trait MappingStore {
    /// Returns the capabilities advertised by this store.
    fn capabilities(&self) -> StoreCapabilities;

    /// Runs `body` inside a single transaction, committing on `Ok` and
    /// rolling back on `Err`.
    ///
    /// # Errors
    ///
    /// Returns the body's error, or a [`StoreError`] converted into `E` when
    /// the transaction itself cannot be opened or committed.
    fn with_transaction<T, E>(
        &self,
        body: impl FnOnce(&mut dyn MappingTransaction) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>;
}
