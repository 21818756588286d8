// crates/id-bridge-core/src/runtime/guards.rs
// ============================================================================
// Module: IdBridge Mapping Guards
// Description: Ambiguity and referential-integrity validation for mappings.
// Purpose: Reject creations and deletions that would make resolution ambiguous
//          or orphan recipe data.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Two guards protect the mapping table. The ambiguity guard validates a
//! proposed creation against existing genuine identities and existing rows,
//! in a fixed order where the first failure wins. The referential-integrity
//! guard validates a deletion against every registered non-exempt recipe,
//! short-circuiting on the first recipe that still holds data keyed by the
//! alias. Both guards fail fast and abort the enclosing transaction; no
//! partial mapping state is ever persisted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::UserId;
use crate::core::UserIdentityMapping;
use crate::interfaces::AuthIdentitySource;
use crate::interfaces::MappingTransaction;
use crate::runtime::engine::MappingError;
use crate::runtime::registry::RecipeRegistry;

// ============================================================================
// SECTION: Ambiguity Guard
// ============================================================================

/// Validates a proposed creation, first failure wins.
///
/// Order: genuine-identity check, collision check with independent flags,
/// then the chain check (skipped under `force`). The chain check exempts the
/// row's own identity: mapping an identity onto itself is not a chain.
///
/// # Errors
///
/// Returns [`MappingError::UnknownInternalIdentity`] when `internal_id` was
/// never issued by an auth recipe, [`MappingError::MappingAlreadyExists`]
/// when either column collides with an existing row, and
/// [`MappingError::AmbiguousChain`] when `external_id` doubles as another
/// genuine internal identity and `force` is false.
pub fn check_create<A: AuthIdentitySource>(
    auth: &A,
    tx: &dyn MappingTransaction,
    internal_id: &UserId,
    external_id: &UserId,
    force: bool,
) -> Result<(), MappingError> {
    if !auth.identity_exists(internal_id)? {
        return Err(MappingError::UnknownInternalIdentity(internal_id.to_string()));
    }

    let internal_collision = tx.find_by_internal(internal_id)?.is_some();
    let external_collision = tx.find_by_external(external_id)?.is_some();
    if internal_collision || external_collision {
        return Err(MappingError::MappingAlreadyExists {
            internal_collision,
            external_collision,
        });
    }

    if !force && external_id != internal_id && auth.identity_exists(external_id)? {
        return Err(MappingError::AmbiguousChain);
    }

    Ok(())
}

// ============================================================================
// SECTION: Referential Integrity Guard
// ============================================================================

/// Validates a deletion against the registered recipes.
///
/// The alias is the id other recipes use to address the user; once the
/// mapping is gone, data keyed by it can no longer resolve back to the
/// genuine identity. The guard only inspects the alias, never the internal
/// id's own data, and stops at the first recipe that reports data.
///
/// # Errors
///
/// Returns [`MappingError::UserIdInUse`] naming the first offending recipe
/// when `force` is false and a non-exempt recipe still holds data keyed by
/// the row's external id.
pub fn check_delete(
    registry: &RecipeRegistry,
    row: &UserIdentityMapping,
    force: bool,
) -> Result<(), MappingError> {
    if force {
        return Ok(());
    }
    for recipe in registry.checked_recipes() {
        if recipe.has_any_data_for_user_id(&row.external_id)? {
            return Err(MappingError::UserIdInUse {
                recipe: recipe.recipe_name().to_string(),
            });
        }
    }
    Ok(())
}
