// crates/id-bridge-core/src/core/mapping.rs
// ============================================================================
// Module: IdBridge Mapping Model
// Description: Canonical identity-mapping row and identifier types.
// Purpose: Provide the persisted mapping entity and its resolution role hints.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the sole persisted entity of the identity-mapping core,
//! [`UserIdentityMapping`], together with the opaque [`UserId`] identifier and
//! the [`UserIdKind`] role hint used during resolution. A single identifier
//! newtype serves both mapping columns because one value may legitimately
//! appear as a genuine internal identity in one row and as an alias in
//! another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Opaque user identifier.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Role Hint
// ============================================================================

/// Resolution role hint for an identifier.
///
/// # Invariants
/// - Variants are stable and exhaustive for resolution modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserIdKind {
    /// Interpret the identifier as a genuine internal identity.
    Internal,
    /// Interpret the identifier as an operator-supplied alias.
    External,
    /// Try internal first, then external (internal-preferred tie-break).
    Any,
}

// ============================================================================
// SECTION: Mapping Row
// ============================================================================

/// A single identity-mapping row linking an internal identity to an alias.
///
/// # Invariants
/// - `internal_id` and `external_id` are immutable once the row is created.
/// - `external_info` is the only mutable field.
/// - At most one row exists per `internal_id` and per `external_id`; the
///   store enforces both as uniqueness constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentityMapping {
    /// Genuine identity id assigned by an auth recipe.
    pub internal_id: UserId,
    /// Operator-supplied alias.
    pub external_id: UserId,
    /// Optional opaque metadata attached to the alias.
    pub external_info: Option<String>,
}

impl UserIdentityMapping {
    /// Creates a new mapping row.
    #[must_use]
    pub const fn new(internal_id: UserId, external_id: UserId, external_info: Option<String>) -> Self {
        Self {
            internal_id,
            external_id,
            external_info,
        }
    }
}
