// crates/id-bridge-core/tests/update_info_unit.rs
// ============================================================================
// Module: External Info Update Unit Tests
// Description: Tests for the update-or-delete external info operation.
// ============================================================================
//! ## Overview
//! Validates the external-info round trip across all three role hints, the
//! clear-on-absent semantics, idempotent re-sets, and the no-op result for
//! unknown mappings.

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

use id_bridge_core::InMemoryMappingStore;
use id_bridge_core::MappingEngine;
use id_bridge_core::RecipeRegistry;
use id_bridge_core::StaticIdentitySource;
use id_bridge_core::UserId;
use id_bridge_core::UserIdKind;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds an engine with one mapping (user-1 -> ext-1) carrying no info.
fn engine_with_mapping() -> MappingEngine<StaticIdentitySource, InMemoryMappingStore> {
    let auth = StaticIdentitySource::with_ids(["user-1"]);
    let engine = MappingEngine::new(auth, InMemoryMappingStore::new(), RecipeRegistry::new())
        .expect("in-memory store supports identity mapping");
    engine
        .create_mapping(&UserId::new("user-1"), &UserId::new("ext-1"), None, false)
        .expect("create mapping");
    engine
}

/// Reads the info field back via the given id and role hint.
fn info_via(
    engine: &MappingEngine<StaticIdentitySource, InMemoryMappingStore>,
    id: &str,
    kind: UserIdKind,
) -> Option<String> {
    engine
        .get_mapping(&UserId::new(id), kind)
        .expect("lookup")
        .expect("row")
        .external_info
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn update_of_an_absent_mapping_is_a_noop() {
    let auth = StaticIdentitySource::new();
    let engine = MappingEngine::new(auth, InMemoryMappingStore::new(), RecipeRegistry::new())
        .expect("engine");
    let unknown = UserId::new("unknown-user");
    for kind in [UserIdKind::Internal, UserIdKind::External, UserIdKind::Any] {
        assert!(!engine.update_or_delete_external_info(&unknown, kind, None).expect("noop"));
    }
    assert!(engine.get_mapping(&unknown, UserIdKind::Any).expect("lookup").is_none());
}

#[test]
fn info_round_trips_across_all_role_hints() {
    let engine = engine_with_mapping();

    assert!(
        engine
            .update_or_delete_external_info(&UserId::new("user-1"), UserIdKind::Internal, Some("info-v1"))
            .expect("update")
    );
    assert_eq!(info_via(&engine, "user-1", UserIdKind::Internal).as_deref(), Some("info-v1"));
    assert_eq!(info_via(&engine, "ext-1", UserIdKind::External).as_deref(), Some("info-v1"));
    assert_eq!(info_via(&engine, "user-1", UserIdKind::Any).as_deref(), Some("info-v1"));

    // Updating through the alias is equivalent.
    assert!(
        engine
            .update_or_delete_external_info(&UserId::new("ext-1"), UserIdKind::External, Some("info-v2"))
            .expect("update")
    );
    assert_eq!(info_via(&engine, "user-1", UserIdKind::Internal).as_deref(), Some("info-v2"));
}

#[test]
fn absent_value_clears_the_info_field() {
    let engine = engine_with_mapping();
    engine
        .update_or_delete_external_info(&UserId::new("user-1"), UserIdKind::Internal, Some("info"))
        .expect("update");

    assert!(
        engine
            .update_or_delete_external_info(&UserId::new("user-1"), UserIdKind::Any, None)
            .expect("clear")
    );
    assert_eq!(info_via(&engine, "user-1", UserIdKind::Internal), None);
}

#[test]
fn resetting_the_same_value_is_idempotent() {
    let engine = engine_with_mapping();

    // Clearing an already-clear field still reports success.
    assert!(
        engine
            .update_or_delete_external_info(&UserId::new("user-1"), UserIdKind::Internal, None)
            .expect("noop clear")
    );

    engine
        .update_or_delete_external_info(&UserId::new("user-1"), UserIdKind::Internal, Some("info"))
        .expect("update");
    assert!(
        engine
            .update_or_delete_external_info(&UserId::new("user-1"), UserIdKind::Internal, Some("info"))
            .expect("idempotent update")
    );
    assert_eq!(info_via(&engine, "user-1", UserIdKind::Internal).as_deref(), Some("info"));
}
