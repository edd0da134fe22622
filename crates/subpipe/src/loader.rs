//! Diff the freshly transformed wide relation against the stored
//! snapshot and load the changes.
//!
//! Comparisons are keyed by student uuid: a uuid absent from the
//! snapshot is inserted, a present uuid whose row differs in any field
//! is updated in place, and identical rows are skipped. Snapshot rows
//! for uuids no longer in the source are left untouched. This replaces
//! an earlier full-row append-only diff that duplicated edited records.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::db::{Database, DatabaseError};
use crate::records::WideRow;
use crate::snapshot;

const INSERT_SQL: &str = "
    INSERT INTO students_analysis (uuid, name, dob, sex, contact_info, job_id,
        num_course_taken, current_career_path_id, time_spent_hrs,
        career_path_name, hours_to_complete)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const UPDATE_SQL: &str = "
    UPDATE students_analysis SET name = ?2, dob = ?3, sex = ?4, contact_info = ?5,
        job_id = ?6, num_course_taken = ?7, current_career_path_id = ?8,
        time_spent_hrs = ?9, career_path_name = ?10, hours_to_complete = ?11
    WHERE uuid = ?1";

/// Upserts the rows that differ from the snapshot and returns them.
pub fn diff_and_load(wide: &[WideRow], output: &Database) -> Result<Vec<WideRow>, DatabaseError> {
    output.with_conn(|conn| {
        let existing = snapshot::read_snapshot(conn)?;
        let by_uuid: HashMap<i64, &WideRow> = existing.iter().map(|r| (r.uuid, r)).collect();

        let mut inserts: Vec<&WideRow> = Vec::new();
        let mut updates: Vec<&WideRow> = Vec::new();
        for row in wide {
            match by_uuid.get(&row.uuid) {
                None => inserts.push(row),
                Some(stored) if **stored != *row => updates.push(row),
                Some(_) => {}
            }
        }
        info!(
            "Diff against snapshot: {} new, {} changed, {} unchanged",
            inserts.len(),
            updates.len(),
            wide.len() - inserts.len() - updates.len()
        );

        let tx = conn.unchecked_transaction()?;
        {
            let mut insert_stmt = tx.prepare(INSERT_SQL)?;
            for row in &inserts {
                insert_stmt.execute(&row_params(row))?;
            }
            let mut update_stmt = tx.prepare(UPDATE_SQL)?;
            for row in &updates {
                update_stmt.execute(&row_params(row))?;
            }
        }
        tx.commit()?;

        let changed: Vec<WideRow> = inserts
            .into_iter()
            .chain(updates)
            .cloned()
            .collect();
        if changed.is_empty() {
            info!("No changes detected, output database already current");
        } else {
            warn!("Pushed {} rows to output database", changed.len());
        }
        Ok(changed)
    })
}

/// Positional parameters for a wide row; order matches both
/// `INSERT_SQL` and `UPDATE_SQL`.
fn row_params(row: &WideRow) -> [&dyn rusqlite::ToSql; 11] {
    [
        &row.uuid,
        &row.name,
        &row.dob,
        &row.sex,
        &row.contact_info,
        &row.job_id,
        &row.num_course_taken,
        &row.current_career_path_id,
        &row.time_spent_hrs,
        &row.career_path_name,
        &row.hours_to_complete,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::initialize_output;

    fn wide_row(uuid: i64) -> WideRow {
        WideRow {
            uuid,
            name: format!("Student {uuid}"),
            dob: "1990-01-01".to_string(),
            sex: "F".to_string(),
            contact_info: "{\"email\": \"s@example.com\"}".to_string(),
            job_id: 5,
            num_course_taken: Some(6.0),
            current_career_path_id: Some(1.0),
            time_spent_hrs: Some(5.5),
            career_path_name: Some("data scientist".to_string()),
            hours_to_complete: Some(20.0),
        }
    }

    fn output_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        initialize_output(&db).unwrap();
        db
    }

    fn count_rows(db: &Database) -> i64 {
        db.with_conn::<_, _, DatabaseError>(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM students_analysis", [], |r| r.get(0))?)
        })
        .unwrap()
    }

    #[test]
    fn test_empty_snapshot_inserts_all_rows() {
        let db = output_db();
        let wide = vec![wide_row(1), wide_row(2), wide_row(3)];

        let changed = diff_and_load(&wide, &db).unwrap();
        assert_eq!(changed.len(), 3);
        assert_eq!(count_rows(&db), 3);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let db = output_db();
        let wide = vec![wide_row(1), wide_row(2)];

        diff_and_load(&wide, &db).unwrap();
        let changed = diff_and_load(&wide, &db).unwrap();
        assert!(changed.is_empty());
        assert_eq!(count_rows(&db), 2);
    }

    #[test]
    fn test_changed_row_updates_in_place() {
        let db = output_db();
        diff_and_load(&[wide_row(1), wide_row(2)], &db).unwrap();

        let mut edited = wide_row(1);
        edited.time_spent_hrs = Some(9.0);
        let changed = diff_and_load(&[edited.clone(), wide_row(2)], &db).unwrap();

        assert_eq!(changed, vec![edited]);
        // Update, not append: row count must not grow.
        assert_eq!(count_rows(&db), 2);
        let stored: f64 = db
            .with_conn::<_, _, DatabaseError>(|conn| {
                Ok(conn.query_row(
                    "SELECT time_spent_hrs FROM students_analysis WHERE uuid = 1",
                    [],
                    |r| r.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(stored, 9.0);
    }

    #[test]
    fn test_stale_snapshot_rows_are_kept() {
        let db = output_db();
        diff_and_load(&[wide_row(1), wide_row(2)], &db).unwrap();

        // Student 2 disappears from the source; its snapshot row stays.
        let changed = diff_and_load(&[wide_row(1)], &db).unwrap();
        assert!(changed.is_empty());
        assert_eq!(count_rows(&db), 2);
    }

    #[test]
    fn test_null_fields_round_trip() {
        let db = output_db();
        let mut row = wide_row(1);
        row.career_path_name = None;
        row.hours_to_complete = None;
        row.current_career_path_id = None;

        diff_and_load(&[row.clone()], &db).unwrap();
        let changed = diff_and_load(&[row], &db).unwrap();
        // Nulls must compare equal to themselves across the round trip.
        assert!(changed.is_empty());
    }
}
