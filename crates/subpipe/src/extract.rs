//! Extract the three source relations and transform them into the wide
//! view: sentinel-fill missing job references, coerce numeric fields,
//! left-join students with courses on the career-path reference.

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{self, Database};
use crate::error::ExtractError;
use crate::records::{CourseRow, JobRow, StudentRow, WideRow, SENTINEL_JOB_ID};

/// Reads all source rows and produces one wide row per student.
pub fn extract_and_transform(source: &Database) -> Result<Vec<WideRow>, ExtractError> {
    let (students, mut jobs, courses) = source.with_conn(|conn| {
        Ok::<_, ExtractError>((read_students(conn)?, read_jobs(conn)?, read_courses(conn)?))
    })?;

    // Students without a job reference point at the sentinel row instead,
    // so the job lookup below never misses on a null foreign key.
    let missing_refs = students.iter().filter(|s| s.job_id.is_none()).count();
    jobs.push(JobRow::sentinel());
    info!(
        "Cleaned {} null job references from {} student records",
        missing_refs,
        students.len()
    );

    let jobs_by_id: HashMap<i64, &JobRow> = jobs.iter().map(|j| (j.job_id, j)).collect();
    let courses_by_id: HashMap<i64, &CourseRow> =
        courses.iter().map(|c| (c.career_path_id, c)).collect();

    let wide: Vec<WideRow> = students
        .iter()
        .map(|student| {
            let job_id = student
                .job_id
                .map(|v| v as i64)
                .unwrap_or(SENTINEL_JOB_ID);
            // Left join: a career-path reference with no matching course
            // leaves the course fields null.
            let course = student
                .current_career_path_id
                .and_then(|id| courses_by_id.get(&(id as i64)));
            WideRow {
                uuid: student.uuid,
                name: student.name.clone(),
                dob: student.dob.clone(),
                sex: student.sex.clone(),
                contact_info: student.contact_info.clone(),
                job_id,
                num_course_taken: student.num_course_taken,
                current_career_path_id: student.current_career_path_id,
                time_spent_hrs: student.time_spent_hrs,
                career_path_name: course.map(|c| c.career_path_name.clone()),
                hours_to_complete: course.and_then(|c| c.hours_to_complete),
            }
        })
        .collect();

    // Job fields are looked up but intentionally not projected into the
    // wide relation.
    let resolved = wide
        .iter()
        .filter(|w| jobs_by_id.contains_key(&w.job_id))
        .count();
    debug!(
        "Job references resolved for {} of {} students",
        resolved,
        wide.len()
    );

    info!("Wide relation prepared: {} rows", wide.len());
    Ok(wide)
}

fn read_students(conn: &Connection) -> Result<Vec<StudentRow>, ExtractError> {
    let mut stmt = conn
        .prepare(
            "SELECT uuid, name, dob, sex, contact_info, job_id, num_course_taken,
             current_career_path_id, time_spent_hrs FROM cademycode_students",
        )
        .map_err(|e| missing_or_sqlite(e, "cademycode_students"))?;
    let rows = stmt
        .query_map([], StudentRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn read_jobs(conn: &Connection) -> Result<Vec<JobRow>, ExtractError> {
    let mut stmt = conn
        .prepare("SELECT job_id, job_category, avg_salary FROM cademycode_student_jobs")
        .map_err(|e| missing_or_sqlite(e, "cademycode_student_jobs"))?;
    let rows = stmt
        .query_map([], JobRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn read_courses(conn: &Connection) -> Result<Vec<CourseRow>, ExtractError> {
    let mut stmt = conn
        .prepare(
            "SELECT career_path_id, career_path_name, hours_to_complete FROM cademycode_courses",
        )
        .map_err(|e| missing_or_sqlite(e, "cademycode_courses"))?;
    let rows = stmt
        .query_map([], CourseRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn missing_or_sqlite(err: rusqlite::Error, table: &'static str) -> ExtractError {
    if db::is_missing_table(&err) {
        ExtractError::MissingTable(table)
    } else {
        ExtractError::Sqlite(err)
    }
}
