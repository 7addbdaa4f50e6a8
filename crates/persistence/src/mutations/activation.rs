// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use enrollment::StudentActivation;
use tracing::debug;

use crate::data_models::encode_timestamp;
use crate::diesel_schema::student_activations;
use crate::error::PersistenceError;

/// Writes the activation state of each student, replacing any prior state.
///
/// # Errors
///
/// Returns an error if a write fails.
pub fn update_activation(
    conn: &mut SqliteConnection,
    activations: &[StudentActivation],
) -> Result<(), PersistenceError> {
    for activation in activations {
        let deactivated_at: Option<String> =
            activation.deactivated_at.map(encode_timestamp).transpose()?;

        diesel::insert_into(student_activations::table)
            .values((
                student_activations::student_id.eq(&activation.student_id),
                student_activations::deactivated_at.eq(deactivated_at.as_deref()),
            ))
            .on_conflict(student_activations::student_id)
            .do_update()
            .set((
                student_activations::deactivated_at.eq(deactivated_at.as_deref()),
                student_activations::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;

        debug!(
            student_id = %activation.student_id,
            deactivated = deactivated_at.is_some(),
            "Stored activation state"
        );
    }
    Ok(())
}
