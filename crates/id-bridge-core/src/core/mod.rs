// crates/id-bridge-core/src/core/mod.rs
// ============================================================================
// Module: IdBridge Core Types
// Description: Data model for identity mappings.
// Purpose: Group the persisted entity and identifier types.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types shared by the resolver, guards, engine, and store
//! implementations.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod mapping;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use mapping::UserId;
pub use mapping::UserIdKind;
pub use mapping::UserIdentityMapping;
