//! Schema history for the portfolio database.
//!
//! # Invariants
//! - Steps are numbered `1..=n` without gaps, in file order.
//! - `PRAGMA user_version` equals the last step applied.
//! - Pending steps commit together; a failing step leaves the previous
//!   version in place and names itself in the error.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "users_projects",
        sql: include_str!("0001_users_projects.sql"),
    },
    SchemaStep {
        version: 2,
        name: "contests",
        sql: include_str!("0002_contests.sql"),
    },
];

/// Schema version this binary writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to `latest_version()`.
///
/// Returns how many steps ran; zero for an up-to-date database.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    run_steps(conn, SCHEMA_STEPS)
}

fn run_steps(conn: &mut Connection, steps: &[SchemaStep]) -> DbResult<u32> {
    let on_disk: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let target = steps.last().map_or(0, |step| step.version);

    if on_disk > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: on_disk,
            latest_supported: target,
        });
    }

    let pending: Vec<&SchemaStep> = steps.iter().filter(|step| step.version > on_disk).collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::Migration {
                version: step.version,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    Ok(pending.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::{run_steps, SchemaStep, SCHEMA_STEPS};
    use crate::db::DbError;
    use rusqlite::Connection;

    fn user_version(conn: &Connection) -> u32 {
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn steps_are_numbered_without_gaps() {
        for (idx, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, idx + 1, "step {}", step.name);
        }
    }

    #[test]
    fn failing_step_names_its_version_and_keeps_previous_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        let steps = [
            SchemaStep {
                version: 1,
                name: "ok",
                sql: "CREATE TABLE kept (id INTEGER);",
            },
            SchemaStep {
                version: 2,
                name: "broken",
                sql: "CREATE TABLE kept (id INTEGER);",
            },
        ];

        match run_steps(&mut conn, &steps[..1]) {
            Ok(applied) => assert_eq!(applied, 1),
            Err(err) => panic!("unexpected error: {err}"),
        }
        match run_steps(&mut conn, &steps).unwrap_err() {
            DbError::Migration { version, .. } => assert_eq!(version, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(user_version(&conn), 1);
        assert_eq!(run_steps(&mut conn, &steps[..1]).unwrap(), 0);
    }
}
