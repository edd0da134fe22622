//! Output store initialization and snapshot reads.
//!
//! The output relation `students_analysis` holds the wide rows written
//! by previous runs. If the table is missing it is created with the
//! fixed 11-column schema; any other read failure is fatal for the run.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{self, Database, DatabaseError};
use crate::records::WideRow;

/// Fixed schema of the output relation. Column order matches
/// `records::WIDE_COLUMNS`.
const CREATE_STUDENTS_ANALYSIS: &str = "
    CREATE TABLE students_analysis (
        uuid INTEGER,
        name TEXT,
        dob TEXT,
        sex TEXT,
        contact_info TEXT,
        job_id INTEGER,
        num_course_taken REAL,
        current_career_path_id REAL,
        time_spent_hrs REAL,
        career_path_name TEXT,
        hours_to_complete REAL
    )";

/// Ensures the output relation exists and returns its current contents.
pub fn initialize_output(output: &Database) -> Result<Vec<WideRow>, DatabaseError> {
    output.with_conn(|conn| match read_snapshot(conn) {
        Ok(rows) => {
            info!("Output table exists, found {} existing rows", rows.len());
            Ok(rows)
        }
        Err(e) if db::is_missing_table(&e) => {
            warn!("Output table missing, creating students_analysis");
            conn.execute_batch(CREATE_STUDENTS_ANALYSIS)?;
            Ok(Vec::new())
        }
        Err(e) => Err(DatabaseError::Sqlite(e)),
    })
}

/// Reads the full snapshot of previously written wide rows.
pub(crate) fn read_snapshot(conn: &Connection) -> Result<Vec<WideRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT uuid, name, dob, sex, contact_info, job_id, num_course_taken,
         current_career_path_id, time_spent_hrs, career_path_name, hours_to_complete
         FROM students_analysis",
    )?;
    let rows = stmt.query_map([], WideRow::from_row)?.collect();
    rows
}
