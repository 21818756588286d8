// crates/id-bridge-core/src/runtime/mod.rs
// ============================================================================
// Module: IdBridge Runtime
// Description: Resolver, guards, recipe registry, and mapping engine.
// Purpose: Execute mapping operations against collaborator interfaces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement identifier resolution, the ambiguity and
//! referential-integrity guards, the recipe registration table, and the
//! mapping engine that composes them under one transaction per operation.
//! All external surfaces must call into the same engine logic to preserve
//! the mapping invariants.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod guards;
pub mod registry;
pub mod resolver;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::MappingEngine;
pub use engine::MappingError;
pub use registry::RecipeRegistry;
pub use registry::RegistryError;
pub use store::InMemoryMappingStore;
pub use store::StaticIdentitySource;
