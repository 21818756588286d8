// crates/id-bridge-core/tests/proptest_resolver.rs
// ============================================================================
// Module: Resolver Property-Based Tests
// Description: Property tests for the internal-first resolution tie-break.
// Purpose: Detect tie-break violations across wide identifier ranges.
// ============================================================================

//! Property-based tests for resolution invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use id_bridge_core::InMemoryMappingStore;
use id_bridge_core::MappingStore;
use id_bridge_core::StoreError;
use id_bridge_core::UserId;
use id_bridge_core::UserIdKind;
use id_bridge_core::UserIdentityMapping;
use id_bridge_core::runtime::resolver;
use proptest::prelude::*;

/// Inserts a raw row directly through the store, bypassing the guards.
fn raw_insert(store: &InMemoryMappingStore, internal: &str, external: &str) {
    store
        .with_transaction(|tx| -> Result<(), StoreError> {
            tx.insert(&UserIdentityMapping::new(
                UserId::new(internal),
                UserId::new(external),
                None,
            ))
        })
        .expect("raw insert");
}

proptest! {
    #[test]
    fn any_resolution_prefers_internal_over_external(
        shared in "[a-z0-9]{1,16}",
        other_internal in "[a-z0-9]{1,16}",
        other_external in "[a-z0-9]{1,16}",
    ) {
        prop_assume!(shared != other_internal);
        prop_assume!(shared != other_external);
        prop_assume!(other_internal != other_external);

        let store = InMemoryMappingStore::new();
        // `shared` is the internal id of one row and the external id of another.
        raw_insert(&store, &shared, &other_external);
        raw_insert(&store, &other_internal, &shared);

        let resolved = store.with_transaction(|tx| -> Result<_, StoreError> {
            resolver::resolve(tx, &UserId::new(shared.as_str()), UserIdKind::Any)
        }).expect("resolve");
        let row = resolved.expect("internal match exists");
        prop_assert_eq!(row.internal_id.as_str(), shared.as_str());
        prop_assert_eq!(row.external_id.as_str(), other_external.as_str());

        let touching = store.with_transaction(|tx| -> Result<_, StoreError> {
            resolver::rows_touching(tx, &UserId::new(shared.as_str()))
        }).expect("rows");
        prop_assert_eq!(touching.len(), 2);
    }

    #[test]
    fn explicit_role_hints_never_cross_columns(
        internal in "[a-z0-9]{1,16}",
        external in "[A-Z0-9]{1,16}",
    ) {
        prop_assume!(internal != external);

        let store = InMemoryMappingStore::new();
        raw_insert(&store, &internal, &external);

        let by_internal = store.with_transaction(|tx| -> Result<_, StoreError> {
            resolver::resolve(tx, &UserId::new(external.as_str()), UserIdKind::Internal)
        }).expect("resolve");
        prop_assert!(by_internal.is_none());

        let by_external = store.with_transaction(|tx| -> Result<_, StoreError> {
            resolver::resolve(tx, &UserId::new(internal.as_str()), UserIdKind::External)
        }).expect("resolve");
        prop_assert!(by_external.is_none());
    }
}
