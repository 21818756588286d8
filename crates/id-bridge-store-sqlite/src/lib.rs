// crates/id-bridge-store-sqlite/src/lib.rs
// ============================================================================
// Module: IdBridge SQLite Store Library
// Description: Durable MappingStore implementation backed by SQLite.
// Purpose: Persist identity mappings with database-enforced uniqueness.
// Dependencies: id-bridge-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate implements the [`id_bridge_core::MappingStore`] contract over
//! `SQLite`. Both mapping uniqueness constraints live in the database schema,
//! closing the check-then-act race that application-level pre-checks alone
//! would leave open.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteMappingStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
