//! Row types for the source relations and the derived wide relation.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::Row;
use serde::Serialize;

/// Placeholder job id used when a student has no job reference, so the
/// job lookup never fails on a missing foreign key.
pub const SENTINEL_JOB_ID: i64 = 99;

/// Column names of the wide relation, in output order.
pub const WIDE_COLUMNS: [&str; 11] = [
    "uuid",
    "name",
    "dob",
    "sex",
    "contact_info",
    "job_id",
    "num_course_taken",
    "current_career_path_id",
    "time_spent_hrs",
    "career_path_name",
    "hours_to_complete",
];

/// Numeric source field that may arrive as NULL, INTEGER, REAL, or
/// numeric TEXT. Anything else is a conversion failure.
pub(crate) struct Numeric(pub Option<f64>);

impl FromSql for Numeric {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Numeric(None)),
            ValueRef::Integer(i) => Ok(Numeric(Some(i as f64))),
            ValueRef::Real(f) => Ok(Numeric(Some(f))),
            ValueRef::Text(bytes) => {
                let text =
                    std::str::from_utf8(bytes).map_err(|e| FromSqlError::Other(Box::new(e)))?;
                text.trim()
                    .parse::<f64>()
                    .map(|f| Numeric(Some(f)))
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// Text field that may also arrive as a number (salary columns mix
/// both). NULL becomes `None`.
pub(crate) struct Textual(pub Option<String>);

impl FromSql for Textual {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(Textual(match value {
            ValueRef::Null => None,
            ValueRef::Integer(i) => Some(i.to_string()),
            ValueRef::Real(f) => Some(f.to_string()),
            ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(_) => return Err(FromSqlError::InvalidType),
        }))
    }
}

/// A raw row from `cademycode_students`. Numeric-ish fields stay
/// `Option<f64>` until the transform step fills and coerces them.
#[derive(Debug, Clone)]
pub struct StudentRow {
    pub uuid: i64,
    pub name: String,
    pub dob: String,
    pub sex: String,
    pub contact_info: String,
    pub job_id: Option<f64>,
    pub num_course_taken: Option<f64>,
    pub current_career_path_id: Option<f64>,
    pub time_spent_hrs: Option<f64>,
}

impl StudentRow {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            uuid: row.get("uuid")?,
            name: row.get("name")?,
            dob: row.get("dob")?,
            sex: row.get("sex")?,
            contact_info: row.get("contact_info")?,
            job_id: row.get::<_, Numeric>("job_id")?.0,
            num_course_taken: row.get::<_, Numeric>("num_course_taken")?.0,
            current_career_path_id: row.get::<_, Numeric>("current_career_path_id")?.0,
            time_spent_hrs: row.get::<_, Numeric>("time_spent_hrs")?.0,
        })
    }
}

/// A row from `cademycode_student_jobs`. Salary is carried as text so
/// the sentinel "N/A" row types uniformly with real rows.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub job_id: i64,
    pub job_category: String,
    pub avg_salary: String,
}

impl JobRow {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            job_id: row.get("job_id")?,
            job_category: row.get("job_category")?,
            avg_salary: row
                .get::<_, Textual>("avg_salary")?
                .0
                .unwrap_or_else(|| "N/A".to_string()),
        })
    }

    /// The synthetic job row backing the sentinel id.
    pub fn sentinel() -> Self {
        Self {
            job_id: SENTINEL_JOB_ID,
            job_category: "N/A".to_string(),
            avg_salary: "N/A".to_string(),
        }
    }
}

/// A row from `cademycode_courses`.
#[derive(Debug, Clone)]
pub struct CourseRow {
    pub career_path_id: i64,
    pub career_path_name: String,
    pub hours_to_complete: Option<f64>,
}

impl CourseRow {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            career_path_id: row.get("career_path_id")?,
            career_path_name: row.get("career_path_name")?,
            hours_to_complete: row.get::<_, Numeric>("hours_to_complete")?.0,
        })
    }
}

/// Denormalized student record: student fields left-joined with course
/// fields. Field declaration order is the column order everywhere the
/// relation is written (output table, CSV).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRow {
    pub uuid: i64,
    pub name: String,
    pub dob: String,
    pub sex: String,
    pub contact_info: String,
    pub job_id: i64,
    pub num_course_taken: Option<f64>,
    pub current_career_path_id: Option<f64>,
    pub time_spent_hrs: Option<f64>,
    pub career_path_name: Option<String>,
    pub hours_to_complete: Option<f64>,
}

impl WideRow {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            uuid: row.get("uuid")?,
            name: row.get("name")?,
            dob: row.get("dob")?,
            sex: row.get("sex")?,
            contact_info: row.get("contact_info")?,
            job_id: row.get("job_id")?,
            num_course_taken: row.get("num_course_taken")?,
            current_career_path_id: row.get("current_career_path_id")?,
            time_spent_hrs: row.get("time_spent_hrs")?,
            career_path_name: row.get("career_path_name")?,
            hours_to_complete: row.get("hours_to_complete")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_job_row() {
        let job = JobRow::sentinel();
        assert_eq!(job.job_id, SENTINEL_JOB_ID);
        assert_eq!(job.job_category, "N/A");
        assert_eq!(job.avg_salary, "N/A");
    }

    #[test]
    fn test_wide_columns_match_serialized_fields() {
        let row = WideRow {
            uuid: 1,
            name: "Alice".to_string(),
            dob: "1990-01-01".to_string(),
            sex: "F".to_string(),
            contact_info: "{}".to_string(),
            job_id: 5,
            num_course_taken: Some(6.0),
            current_career_path_id: Some(1.0),
            time_spent_hrs: Some(5.5),
            career_path_name: Some("data scientist".to_string()),
            hours_to_complete: Some(20.0),
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&row).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let header = data.lines().next().unwrap();
        assert_eq!(header, WIDE_COLUMNS.join(","));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(
            Numeric::column_result(ValueRef::Null).unwrap().0,
            None
        );
        assert_eq!(
            Numeric::column_result(ValueRef::Integer(7)).unwrap().0,
            Some(7.0)
        );
        assert_eq!(
            Numeric::column_result(ValueRef::Real(2.5)).unwrap().0,
            Some(2.5)
        );
        assert_eq!(
            Numeric::column_result(ValueRef::Text(b"3.5")).unwrap().0,
            Some(3.5)
        );
        assert!(Numeric::column_result(ValueRef::Text(b"not a number")).is_err());
        assert!(Numeric::column_result(ValueRef::Blob(&[1, 2])).is_err());
    }
}
