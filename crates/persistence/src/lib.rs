// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for enrollment status timelines.
//!
//! This crate stores enrollment status histories, student location
//! memberships and student activation state with Diesel, and exposes them
//! to the enrollment core through [`SqliteStore`].
//!
//! ## Transactions
//!
//! The core never manages transactions. Every request runs inside
//! [`Persistence::transaction`], which commits when the closure returns
//! `Ok` and rolls back otherwise.
//!
//! ## Timestamps
//!
//! Instants are stored as UTC text with microsecond precision (see
//! [`data_models::encode_timestamp`]), so range filters compare strings.
//!
//! ## Testing
//!
//! Tests run against isolated shared-cache in-memory databases created by
//! [`Persistence::new_in_memory`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::{Connection, SqliteConnection};
use enrollment::{StudentActivation, UserAccessPath};
use enrollment_domain::EnrollmentStatusHistory;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

pub mod backend;
pub mod data_models;
mod diesel_schema;
mod error;
pub mod mutations;
pub mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use store::SqliteStore;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Carries either the closure's own error or a failure of the transaction
/// machinery (begin, commit, rollback).
enum TransactionError<E> {
    Inner(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TransactionError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

/// Persistence adapter owning one `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_enrollment_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        backend::sqlite::enable_wal_mode(&mut conn)?;

        Ok(Self { conn })
    }

    /// Runs `f` against a store inside one database transaction.
    ///
    /// The transaction commits if `f` returns `Ok` and rolls back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a `PersistenceError` converted
    /// into `E` if the transaction cannot begin or commit.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut SqliteStore<'_>) -> Result<T, E>,
    {
        let result: Result<T, TransactionError<E>> = self.conn.transaction(|conn| {
            let mut store: SqliteStore<'_> = SqliteStore::new(conn);
            f(&mut store).map_err(TransactionError::Inner)
        });

        match result {
            Ok(value) => Ok(value),
            Err(TransactionError::Inner(err)) => Err(err),
            Err(TransactionError::Database(err)) => {
                warn!(error = %err, "Transaction failed");
                Err(E::from(PersistenceError::from(err)))
            }
        }
    }

    /// Live records of a student, optionally limited to one location,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn timeline(
        &mut self,
        student_id: &str,
        location_id: Option<&str>,
    ) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
        match location_id {
            Some(location_id) => queries::enrollment::get_by_student_and_location(
                &mut self.conn,
                student_id,
                location_id,
                None,
            ),
            None => queries::enrollment::get_by_student_id(&mut self.conn, student_id),
        }
    }

    /// Live location memberships of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn access_paths(&mut self, user_id: &str) -> Result<Vec<UserAccessPath>, PersistenceError> {
        queries::students::get_access_paths(&mut self.conn, user_id)
    }

    /// The stored activation state of a student.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn activation(
        &mut self,
        student_id: &str,
    ) -> Result<Option<StudentActivation>, PersistenceError> {
        queries::students::get_activation(&mut self.conn, student_id)
    }
}
