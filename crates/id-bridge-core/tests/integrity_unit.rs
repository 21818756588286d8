// crates/id-bridge-core/tests/integrity_unit.rs
// ============================================================================
// Module: Referential Integrity Unit Tests
// Description: Tests for the cross-recipe deletion guard.
// ============================================================================
//! ## Overview
//! Validates that deletion without force is blocked while any registered
//! non-exempt recipe still holds data keyed by the alias, that the first
//! offending recipe is named and later recipes are never probed, that exempt
//! recipes are skipped, and that force bypasses the guard entirely.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use id_bridge_core::InMemoryMappingStore;
use id_bridge_core::MappingEngine;
use id_bridge_core::MappingError;
use id_bridge_core::RecipeRegistry;
use id_bridge_core::RecipeStorage;
use id_bridge_core::RecipeStorageError;
use id_bridge_core::StaticIdentitySource;
use id_bridge_core::UserId;
use id_bridge_core::UserIdKind;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Recipe storage with a fixed set of ids that own data.
struct StaticRecipe {
    /// Recipe name reported in errors.
    name: &'static str,
    /// Ids that own data in this recipe.
    ids: Vec<String>,
}

impl StaticRecipe {
    /// Creates a recipe owning data for the given ids.
    fn with_data(name: &'static str, ids: &[&str]) -> Self {
        Self {
            name,
            ids: ids.iter().map(ToString::to_string).collect(),
        }
    }
}

impl RecipeStorage for StaticRecipe {
    fn has_any_data_for_user_id(&self, id: &UserId) -> Result<bool, RecipeStorageError> {
        Ok(self.ids.iter().any(|owned| owned == id.as_str()))
    }

    fn recipe_name(&self) -> &str {
        self.name
    }
}

/// Recipe storage that counts probes, for short-circuit assertions.
struct CountingRecipe {
    /// Recipe name reported in errors.
    name: &'static str,
    /// Number of probes received.
    probes: Arc<AtomicUsize>,
}

impl RecipeStorage for CountingRecipe {
    fn has_any_data_for_user_id(&self, _id: &UserId) -> Result<bool, RecipeStorageError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    fn recipe_name(&self) -> &str {
        self.name
    }
}

/// Recipe storage whose probe always fails.
struct FailingRecipe;

impl RecipeStorage for FailingRecipe {
    fn has_any_data_for_user_id(&self, _id: &UserId) -> Result<bool, RecipeStorageError> {
        Err(RecipeStorageError::Storage("recipe backend unreachable".to_string()))
    }

    fn recipe_name(&self) -> &str {
        "broken"
    }
}

/// Builds an engine with one mapping (user-1 -> ext-1) and the given registry.
fn engine_with_mapping(
    registry: RecipeRegistry,
) -> MappingEngine<StaticIdentitySource, InMemoryMappingStore> {
    let auth = StaticIdentitySource::with_ids(["user-1"]);
    let engine = MappingEngine::new(auth, InMemoryMappingStore::new(), registry)
        .expect("in-memory store supports identity mapping");
    engine
        .create_mapping(&UserId::new("user-1"), &UserId::new("ext-1"), None, false)
        .expect("create mapping");
    engine
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn delete_is_blocked_while_a_recipe_owns_alias_data() {
    let mut registry = RecipeRegistry::new();
    registry
        .register(StaticRecipe::with_data("sessions", &["ext-1"]))
        .expect("register");
    let engine = engine_with_mapping(registry);

    let err = engine
        .delete_mapping(&UserId::new("user-1"), UserIdKind::Internal, false)
        .expect_err("blocked delete");
    assert!(matches!(err, MappingError::UserIdInUse { recipe } if recipe == "sessions"));

    // The failed guard aborted the transaction; the row is still there.
    assert!(
        engine
            .get_mapping(&UserId::new("user-1"), UserIdKind::Internal)
            .expect("lookup")
            .is_some()
    );
}

#[test]
fn guard_only_inspects_the_alias_never_the_internal_id() {
    let mut registry = RecipeRegistry::new();
    // Data keyed by the internal id must not block deletion.
    registry
        .register(StaticRecipe::with_data("sessions", &["user-1"]))
        .expect("register");
    let engine = engine_with_mapping(registry);

    assert!(
        engine
            .delete_mapping(&UserId::new("user-1"), UserIdKind::Internal, false)
            .expect("delete")
    );
}

#[test]
fn first_offending_recipe_is_named_and_later_recipes_are_not_probed() {
    let probes = Arc::new(AtomicUsize::new(0));
    let mut registry = RecipeRegistry::new();
    registry
        .register(StaticRecipe::with_data("roles", &["ext-1"]))
        .expect("register");
    registry
        .register(CountingRecipe {
            name: "metadata",
            probes: Arc::clone(&probes),
        })
        .expect("register");
    let engine = engine_with_mapping(registry);

    let err = engine
        .delete_mapping(&UserId::new("user-1"), UserIdKind::Internal, false)
        .expect_err("blocked delete");
    assert!(matches!(err, MappingError::UserIdInUse { recipe } if recipe == "roles"));
    assert_eq!(probes.load(Ordering::SeqCst), 0);
}

#[test]
fn exempt_recipes_never_block_deletion() {
    let mut registry = RecipeRegistry::new();
    registry
        .register_exempt(StaticRecipe::with_data("token-signing", &["ext-1"]))
        .expect("register");
    let engine = engine_with_mapping(registry);

    assert!(
        engine
            .delete_mapping(&UserId::new("user-1"), UserIdKind::Internal, false)
            .expect("delete")
    );
}

#[test]
fn force_bypasses_the_integrity_guard() {
    let probes = Arc::new(AtomicUsize::new(0));
    let mut registry = RecipeRegistry::new();
    registry
        .register(StaticRecipe::with_data("sessions", &["ext-1"]))
        .expect("register");
    registry
        .register(CountingRecipe {
            name: "metadata",
            probes: Arc::clone(&probes),
        })
        .expect("register");
    let engine = engine_with_mapping(registry);

    assert!(
        engine
            .delete_mapping(&UserId::new("user-1"), UserIdKind::Internal, true)
            .expect("forced delete")
    );
    // Force skips every probe, not just the offending one.
    assert_eq!(probes.load(Ordering::SeqCst), 0);
}

#[test]
fn recipe_probe_failures_are_fatal_to_the_call() {
    let mut registry = RecipeRegistry::new();
    registry.register(FailingRecipe).expect("register");
    let engine = engine_with_mapping(registry);

    let err = engine
        .delete_mapping(&UserId::new("user-1"), UserIdKind::Internal, false)
        .expect_err("collaborator failure");
    assert!(matches!(err, MappingError::Recipe(_)));

    // The transaction rolled back; the row survives the failed call.
    assert!(
        engine
            .get_mapping(&UserId::new("user-1"), UserIdKind::Internal)
            .expect("lookup")
            .is_some()
    );
}
