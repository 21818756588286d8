// crates/id-bridge-core/src/runtime/engine.rs
// ============================================================================
// Module: IdBridge Mapping Engine
// Description: Transactional create/get/delete/update operations for mappings.
// Purpose: Compose the resolver and guards under one transaction per call.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The mapping engine is the single canonical execution path for identity
//! mappings. All outer surfaces (HTTP APIs, admin tooling) must call into
//! these methods to preserve the uniqueness and referential-integrity
//! invariants. Each public operation runs inside exactly one store
//! transaction: existence checks, guard queries, and the write commit or
//! roll back together.
//!
//! Invariants:
//! - A miss resolves to `Ok(None)` or `Ok(false)`, never an error.
//! - Guards fail fast; a failed guard aborts the whole transaction.
//! - The store's uniqueness constraints close the create race; the guard's
//!   pre-check only improves error reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::UserId;
use crate::core::UserIdKind;
use crate::core::UserIdentityMapping;
use crate::interfaces::AuthIdentitySource;
use crate::interfaces::IdentityLookupError;
use crate::interfaces::MappingStore;
use crate::interfaces::RecipeStorageError;
use crate::interfaces::StoreError;
use crate::runtime::guards::check_create;
use crate::runtime::guards::check_delete;
use crate::runtime::registry::RecipeRegistry;
use crate::runtime::resolver;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Mapping engine errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `MappingAlreadyExists` reports both collision flags independently.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Create referenced an id with no genuine identity.
    #[error("unknown internal identity: {0}")]
    UnknownInternalIdentity(String),
    /// Create collided with an existing row.
    #[error(
        "mapping already exists (internal collision: {internal_collision}, external collision: {external_collision})"
    )]
    MappingAlreadyExists {
        /// True when the internal id column collided.
        internal_collision: bool,
        /// True when the external id column collided.
        external_collision: bool,
    },
    /// Create without force would let the external id double as another
    /// genuine internal identity.
    #[error("cannot create a mapping where the external id is also a genuine internal identity")]
    AmbiguousChain,
    /// Delete without force while a recipe still owns data under the alias.
    #[error("user id is already in use by recipe: {recipe}")]
    UserIdInUse {
        /// Name of the first offending recipe.
        recipe: String,
    },
    /// The configured store does not support identity mapping.
    #[error("configured store does not support identity mapping")]
    MappingUnsupported,
    /// Mapping store error.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Identity source error.
    #[error(transparent)]
    Identity(#[from] IdentityLookupError),
    /// Recipe storage error.
    #[error(transparent)]
    Recipe(#[from] RecipeStorageError),
}

// ============================================================================
// SECTION: Mapping Engine
// ============================================================================

/// Mapping engine composing the resolver and guards over explicit handles.
///
/// # Invariants
/// - Handles are passed at construction; there is no ambient storage access.
/// - The store advertised identity-mapping capability at construction.
pub struct MappingEngine<A, S> {
    /// Auth-identity collaborator.
    auth: A,
    /// Transactional mapping store.
    store: S,
    /// Registered non-auth recipe storages.
    registry: RecipeRegistry,
}

impl<A, S> MappingEngine<A, S>
where
    A: AuthIdentitySource,
    S: MappingStore,
{
    /// Creates a new mapping engine over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::MappingUnsupported`] when the store does not
    /// advertise identity-mapping capability.
    pub fn new(auth: A, store: S, registry: RecipeRegistry) -> Result<Self, MappingError> {
        if !store.capabilities().identity_mapping {
            return Err(MappingError::MappingUnsupported);
        }
        Ok(Self {
            auth,
            store,
            registry,
        })
    }

    /// Creates a new mapping row after running the ambiguity guard.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UnknownInternalIdentity`],
    /// [`MappingError::MappingAlreadyExists`], or
    /// [`MappingError::AmbiguousChain`] per the guard's validation order, and
    /// maps a uniqueness violation raced in by a concurrent create back to
    /// [`MappingError::MappingAlreadyExists`].
    pub fn create_mapping(
        &self,
        internal_id: &UserId,
        external_id: &UserId,
        external_info: Option<&str>,
        force: bool,
    ) -> Result<UserIdentityMapping, MappingError> {
        self.store.with_transaction(|tx| {
            check_create(&self.auth, tx, internal_id, external_id, force)?;
            let row = UserIdentityMapping::new(
                internal_id.clone(),
                external_id.clone(),
                external_info.map(ToString::to_string),
            );
            match tx.insert(&row) {
                Ok(()) => Ok(row),
                Err(StoreError::Duplicate {
                    internal_collision,
                    external_collision,
                }) => Err(MappingError::MappingAlreadyExists {
                    internal_collision,
                    external_collision,
                }),
                Err(err) => Err(MappingError::from(err)),
            }
        })
    }

    /// Resolves `id` under the given role hint.
    ///
    /// A miss returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] when the lookup fails.
    pub fn get_mapping(
        &self,
        id: &UserId,
        kind: UserIdKind,
    ) -> Result<Option<UserIdentityMapping>, MappingError> {
        self.store
            .with_transaction(|tx| resolver::resolve(tx, id, kind).map_err(MappingError::from))
    }

    /// Deletes the mapping resolved from `id`, returning whether a row was
    /// removed.
    ///
    /// Resolution applies the internal-first tie-break, so deleting via
    /// [`UserIdKind::Any`] removes the internal-column match when both
    /// columns carry the value. An absent mapping is `Ok(false)`, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UserIdInUse`] when `force` is false and a
    /// registered recipe still holds data keyed by the row's external id.
    pub fn delete_mapping(
        &self,
        id: &UserId,
        kind: UserIdKind,
        force: bool,
    ) -> Result<bool, MappingError> {
        self.store.with_transaction(|tx| {
            let Some(row) = resolver::resolve(tx, id, kind)? else {
                return Ok(false);
            };
            check_delete(&self.registry, &row, force)?;
            Ok(tx.delete(&row.internal_id)?)
        })
    }

    /// Sets or clears the external info of the mapping resolved from `id`,
    /// returning whether a row was present.
    ///
    /// `None` clears the field. Setting the current value is an idempotent
    /// success. An absent mapping is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] when the resolution or update fails.
    pub fn update_or_delete_external_info(
        &self,
        id: &UserId,
        kind: UserIdKind,
        new_info: Option<&str>,
    ) -> Result<bool, MappingError> {
        self.store.with_transaction(|tx| {
            let Some(row) = resolver::resolve(tx, id, kind)? else {
                return Ok(false);
            };
            Ok(tx.update_info(&row.internal_id, new_info)?)
        })
    }

    /// Returns every row where `id` appears in either column (0, 1, or 2
    /// rows), for audits and tests.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Store`] when the lookup fails.
    pub fn rows_touching(&self, id: &UserId) -> Result<Vec<UserIdentityMapping>, MappingError> {
        self.store
            .with_transaction(|tx| resolver::rows_touching(tx, id).map_err(MappingError::from))
    }

    /// Returns the recipe registry consulted by the integrity guard.
    #[must_use]
    pub const fn registry(&self) -> &RecipeRegistry {
        &self.registry
    }
}
