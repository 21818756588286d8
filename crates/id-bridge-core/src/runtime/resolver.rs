// crates/id-bridge-core/src/runtime/resolver.rs
// ============================================================================
// Module: IdBridge Identity Resolver
// Description: Bidirectional (id, role) resolution with internal-first tie-break.
// Purpose: Answer which single mapping an identifier denotes.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The resolver maps an `(id, kind)` pair to zero or one mapping row. For
//! [`UserIdKind::Any`] the internal column is consulted first and an internal
//! match wins without checking the external column: a value is
//! preferentially interpreted as a genuine internal identity over an alias.
//! A miss is a normal outcome, never an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::UserId;
use crate::core::UserIdKind;
use crate::core::UserIdentityMapping;
use crate::interfaces::MappingTransaction;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves `id` under the given role hint to at most one mapping row.
///
/// # Errors
///
/// Returns [`StoreError`] when the underlying lookup fails.
pub fn resolve(
    tx: &dyn MappingTransaction,
    id: &UserId,
    kind: UserIdKind,
) -> Result<Option<UserIdentityMapping>, StoreError> {
    match kind {
        UserIdKind::Internal => tx.find_by_internal(id),
        UserIdKind::External => tx.find_by_external(id),
        UserIdKind::Any => {
            // Internal match wins; the external column is not consulted.
            if let Some(row) = tx.find_by_internal(id)? {
                return Ok(Some(row));
            }
            tx.find_by_external(id)
        }
    }
}

/// Returns every row where `id` appears in either column.
///
/// This diagnostic query is the only place two rows may legitimately be
/// returned for one value: one row matching on the internal column and a
/// different row matching on the external column.
///
/// # Errors
///
/// Returns [`StoreError`] when the underlying lookup fails.
pub fn rows_touching(
    tx: &dyn MappingTransaction,
    id: &UserId,
) -> Result<Vec<UserIdentityMapping>, StoreError> {
    tx.rows_touching(id)
}
