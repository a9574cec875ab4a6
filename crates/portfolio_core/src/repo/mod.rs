//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Isolate SQL details from services and the reconciliation engine.
//! - Translate rows into validated domain records.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

use crate::db::DbError;
use crate::model::duration::{YearWithSemester, YearWithSemesterDuration};
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod entity_repo;
pub mod project_member_repo;
pub mod team_member_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Referenced row does not exist. `entity` is the table-level name.
    NotFound { entity: &'static str, id: Uuid },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn row_uuid(row: &Row<'_>, column: &'static str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    parse_uuid(&text, column)
}

/// Reads the `since_year/since_semester/until_year/until_semester` columns,
/// each name prefixed with `prefix` (empty for a table's own span).
///
/// `table` only feeds error messages.
pub(crate) fn row_duration(
    row: &Row<'_>,
    prefix: &str,
    table: &'static str,
) -> RepoResult<YearWithSemesterDuration> {
    let column = |name: &str| format!("{prefix}{name}");
    let since = YearWithSemester::new(
        row.get(column("since_year").as_str())?,
        row.get(column("since_semester").as_str())?,
    );
    let until_year: Option<i32> = row.get(column("until_year").as_str())?;
    let until_semester: Option<i32> = row.get(column("until_semester").as_str())?;
    let until = match (until_year, until_semester) {
        (Some(year), Some(semester)) => Some(YearWithSemester::new(year, semester)),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "half-populated {prefix}until columns in {table}"
            )));
        }
    };

    let duration = YearWithSemesterDuration::new(since, until);
    if !duration.is_valid() {
        return Err(RepoError::InvalidData(format!(
            "invalid duration `{duration}` in {table}"
        )));
    }
    Ok(duration)
}

pub(crate) fn row_exists(conn: &Connection, sql: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id.to_string()], |row| row.get(0))?;
    Ok(exists == 1)
}
