// crates/id-bridge-core/src/lib.rs
// ============================================================================
// Module: IdBridge Core Library
// Description: Public API surface for the identity-mapping core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! IdBridge core attaches operator-supplied external identifiers to
//! internally generated user identities and resolves either identifier back
//! to a single canonical mapping. It is backend-agnostic and integrates
//! through explicit interfaces rather than embedding into any particular
//! storage engine or API layer. The hard parts live in the guards: ambiguity
//! prevention at creation and cross-recipe referential integrity at deletion.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::UserId;
pub use crate::core::UserIdKind;
pub use crate::core::UserIdentityMapping;

pub use interfaces::AuthIdentitySource;
pub use interfaces::IdentityLookupError;
pub use interfaces::MappingStore;
pub use interfaces::MappingTransaction;
pub use interfaces::RecipeStorage;
pub use interfaces::RecipeStorageError;
pub use interfaces::StoreCapabilities;
pub use interfaces::StoreError;
pub use runtime::InMemoryMappingStore;
pub use runtime::MappingEngine;
pub use runtime::MappingError;
pub use runtime::RecipeRegistry;
pub use runtime::RegistryError;
pub use runtime::StaticIdentitySource;
