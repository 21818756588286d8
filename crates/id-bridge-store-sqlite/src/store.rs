// crates/id-bridge-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Mapping Store
// Description: Durable MappingStore backed by SQLite.
// Purpose: Persist mapping rows with both uniqueness constraints in the schema.
// Dependencies: id-bridge-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`MappingStore`] using `SQLite`. The
//! mapping table declares the internal id as primary key and the external id
//! as unique, so a concurrent create of the same id pair is rejected by the
//! database itself; the engine's pre-check only improves error reporting.
//! Constraint violations are mapped to [`StoreError::Duplicate`] with the
//! offending column(s) identified from the `SQLite` error detail. Opening a
//! database written by a newer schema version fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use id_bridge_core::MappingStore;
use id_bridge_core::MappingTransaction;
use id_bridge_core::StoreCapabilities;
use id_bridge_core::StoreError;
use id_bridge_core::UserId;
use id_bridge_core::UserIdentityMapping;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` mapping store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Returns a configuration with defaults for the given database path.
    #[must_use]
    pub fn for_path(path: PathBuf) -> Self {
        Self {
            path,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store configuration or data is invalid.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store schema version is incompatible.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Invalid(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Invalid(message)
            }
            SqliteStoreError::Db(message) => Self::Store(message),
        }
    }
}

// ============================================================================
// SECTION: SQLite Mapping Store
// ============================================================================

/// Durable mapping store backed by a single `SQLite` database file.
///
/// # Invariants
/// - Both uniqueness constraints are enforced by the database schema.
/// - One writer connection, serialized behind a mutex; transactions commit
///   on body success and roll back otherwise.
pub struct SqliteMappingStore {
    /// Database connection protected by a mutex.
    conn: Mutex<Connection>,
}

impl SqliteMappingStore {
    /// Opens or creates the mapping database at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] for unusable paths,
    /// [`SqliteStoreError::VersionMismatch`] for databases written by a newer
    /// schema, and [`SqliteStoreError::Db`] for `SQLite` failures.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            conn: Mutex::new(connection),
        })
    }
}

impl MappingStore for SqliteMappingStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::full()
    }

    fn with_transaction<T, E>(
        &self,
        body: impl FnOnce(&mut dyn MappingTransaction) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::Store("sqlite connection mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(|err| db_error(&err))?;
        let mut wrapper = SqliteMappingTransaction {
            tx: &tx,
        };
        let value = body(&mut wrapper)?;
        tx.commit().map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(value)
    }
}

// ============================================================================
// SECTION: Transaction Wrapper
// ============================================================================

/// Mapping transaction over a live `SQLite` transaction.
struct SqliteMappingTransaction<'a> {
    /// Borrowed `SQLite` transaction; dropping without commit rolls back.
    tx: &'a Transaction<'a>,
}

impl MappingTransaction for SqliteMappingTransaction<'_> {
    fn insert(&mut self, row: &UserIdentityMapping) -> Result<(), StoreError> {
        self.tx
            .execute(
                "INSERT INTO userid_mapping \
                 (internal_user_id, external_user_id, external_user_id_info) \
                 VALUES (?1, ?2, ?3)",
                params![
                    row.internal_id.as_str(),
                    row.external_id.as_str(),
                    row.external_info.as_deref()
                ],
            )
            .map_err(duplicate_or_db_error)?;
        Ok(())
    }

    fn find_by_internal(&self, id: &UserId) -> Result<Option<UserIdentityMapping>, StoreError> {
        self.tx
            .query_row(
                "SELECT internal_user_id, external_user_id, external_user_id_info \
                 FROM userid_mapping WHERE internal_user_id = ?1",
                params![id.as_str()],
                row_to_mapping,
            )
            .optional()
            .map_err(|err| db_error(&err))
    }

    fn find_by_external(&self, id: &UserId) -> Result<Option<UserIdentityMapping>, StoreError> {
        self.tx
            .query_row(
                "SELECT internal_user_id, external_user_id, external_user_id_info \
                 FROM userid_mapping WHERE external_user_id = ?1",
                params![id.as_str()],
                row_to_mapping,
            )
            .optional()
            .map_err(|err| db_error(&err))
    }

    fn rows_touching(&self, id: &UserId) -> Result<Vec<UserIdentityMapping>, StoreError> {
        let mut statement = self
            .tx
            .prepare(
                "SELECT internal_user_id, external_user_id, external_user_id_info \
                 FROM userid_mapping \
                 WHERE internal_user_id = ?1 OR external_user_id = ?1 \
                 ORDER BY (internal_user_id = ?1) DESC",
            )
            .map_err(|err| db_error(&err))?;
        let rows = statement
            .query_map(params![id.as_str()], row_to_mapping)
            .map_err(|err| db_error(&err))?;
        let mut touching = Vec::new();
        for row in rows {
            touching.push(row.map_err(|err| db_error(&err))?);
        }
        Ok(touching)
    }

    fn delete(&mut self, internal_id: &UserId) -> Result<bool, StoreError> {
        let affected = self
            .tx
            .execute(
                "DELETE FROM userid_mapping WHERE internal_user_id = ?1",
                params![internal_id.as_str()],
            )
            .map_err(|err| db_error(&err))?;
        Ok(affected > 0)
    }

    fn update_info(&mut self, internal_id: &UserId, info: Option<&str>) -> Result<bool, StoreError> {
        let affected = self
            .tx
            .execute(
                "UPDATE userid_mapping SET external_user_id_info = ?2 \
                 WHERE internal_user_id = ?1",
                params![internal_id.as_str(), info],
            )
            .map_err(|err| db_error(&err))?;
        Ok(affected > 0)
    }
}

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

/// Maps a database row onto a mapping value.
fn row_to_mapping(row: &Row<'_>) -> rusqlite::Result<UserIdentityMapping> {
    let internal_id: String = row.get(0)?;
    let external_id: String = row.get(1)?;
    let external_info: Option<String> = row.get(2)?;
    Ok(UserIdentityMapping::new(
        UserId::new(internal_id),
        UserId::new(external_id),
        external_info,
    ))
}

/// Converts a `SQLite` error into a generic store error.
fn db_error(err: &rusqlite::Error) -> StoreError {
    StoreError::Store(err.to_string())
}

/// Converts a `SQLite` insert error, identifying uniqueness violations.
///
/// The constraint detail names the offending column(s); both flags are
/// derived independently so callers can tell which id collided.
fn duplicate_or_db_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err
        && failure.code == ErrorCode::ConstraintViolation
    {
        let detail = message.as_deref().unwrap_or_default();
        return StoreError::Duplicate {
            internal_collision: detail.contains("internal_user_id"),
            external_collision: detail.contains("external_user_id"),
        };
    }
    db_error(&err)
}

/// Validates the configured database path.
fn validate_store_path(path: &std::path::Path) -> Result<(), SqliteStoreError> {
    let path_string = path.to_string_lossy();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS userid_mapping (
                    internal_user_id TEXT NOT NULL PRIMARY KEY,
                    external_user_id TEXT NOT NULL UNIQUE,
                    external_user_id_info TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_userid_mapping_external
                    ON userid_mapping (external_user_id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
