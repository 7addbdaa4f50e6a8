// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use enrollment::{StudentActivation, UserAccessPath};

use crate::data_models::{StudentActivationRow, UserAccessPathRow};
use crate::diesel_schema::{student_activations, user_access_paths};
use crate::error::PersistenceError;

/// Live location memberships of a user, ordered by location.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_access_paths(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<UserAccessPath>, PersistenceError> {
    let rows: Vec<UserAccessPathRow> = user_access_paths::table
        .filter(user_access_paths::user_id.eq(user_id))
        .filter(user_access_paths::deleted_at.is_null())
        .order(user_access_paths::location_id.asc())
        .select(UserAccessPathRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(UserAccessPath::from).collect())
}

/// The stored activation state of a student, if one was ever written.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_activation(
    conn: &mut SqliteConnection,
    student_id: &str,
) -> Result<Option<StudentActivation>, PersistenceError> {
    student_activations::table
        .filter(student_activations::student_id.eq(student_id))
        .select(StudentActivationRow::as_select())
        .first(conn)
        .optional()?
        .map(StudentActivationRow::into_domain)
        .transpose()
}
