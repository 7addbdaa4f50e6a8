// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use enrollment::UserAccessPath;
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::encode_timestamp;
use crate::diesel_schema::user_access_paths;
use crate::error::PersistenceError;

/// Marks a user's memberships of the given locations deleted.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn soft_delete_by_user_and_locations(
    conn: &mut SqliteConnection,
    user_id: &str,
    location_ids: &[String],
    deleted_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    if location_ids.is_empty() {
        return Ok(());
    }
    let at: String = encode_timestamp(deleted_at)?;

    let deleted: usize = diesel::update(user_access_paths::table)
        .filter(user_access_paths::user_id.eq(user_id))
        .filter(user_access_paths::location_id.eq_any(location_ids))
        .filter(user_access_paths::deleted_at.is_null())
        .set((
            user_access_paths::deleted_at.eq(&at),
            user_access_paths::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    debug!(user_id, deleted, "Soft-deleted access paths");
    Ok(())
}

/// Inserts memberships, reviving soft-deleted ones in place.
///
/// # Errors
///
/// Returns an error if a write fails.
pub fn upsert_multiple(
    conn: &mut SqliteConnection,
    paths: &[UserAccessPath],
) -> Result<(), PersistenceError> {
    for path in paths {
        diesel::insert_into(user_access_paths::table)
            .values((
                user_access_paths::user_id.eq(&path.user_id),
                user_access_paths::location_id.eq(&path.location_id),
                user_access_paths::organization_id.eq(&path.organization_id),
            ))
            .on_conflict((user_access_paths::user_id, user_access_paths::location_id))
            .do_update()
            .set((
                user_access_paths::organization_id.eq(&path.organization_id),
                user_access_paths::deleted_at.eq(None::<String>),
                user_access_paths::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;
    }

    debug!(count = paths.len(), "Upserted access paths");
    Ok(())
}
