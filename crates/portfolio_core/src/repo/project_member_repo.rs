//! Project membership persistence.
//!
//! # Responsibility
//! - Provide the SQLite storage collaborator for project memberships.
//! - Write only changed span columns on update.
//!
//! # Invariants
//! - All reconciliation reads and writes go through one `IMMEDIATE`
//!   transaction, so the member set cannot change between diff and apply.
//! - `updated_at` moves only for rows that were actually updated.

use crate::membership::{
    DurationChanges, MemberId, MembershipRecord, MembershipRepository, MembershipStore,
    MembershipUnitOfWork, ParentId,
};
use crate::model::duration::YearWithSemesterDuration;
use crate::repo::{row_duration, row_exists, row_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Transaction, TransactionBehavior};

const RELATION: &str = "project_members";

const PROJECT_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM projects WHERE uuid = ?1);";

const MEMBER_SELECT_SQL: &str = "SELECT
    project_uuid,
    user_uuid,
    since_year,
    since_semester,
    until_year,
    until_semester
FROM project_members";

/// Project membership record: the member's span inside the project.
pub type ProjectMembership = MembershipRecord<YearWithSemesterDuration>;

/// SQLite-backed project membership repository.
pub struct SqliteProjectMemberRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProjectMemberRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl MembershipRepository for SqliteProjectMemberRepository<'_> {
    type Attrs = YearWithSemesterDuration;
    type UnitOfWork<'a>
        = SqliteProjectMemberTx<'a>
    where
        Self: 'a;

    fn begin(&mut self) -> RepoResult<SqliteProjectMemberTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteProjectMemberTx { tx })
    }

    fn parent_exists(&self, parent_id: ParentId) -> RepoResult<bool> {
        row_exists(&*self.conn, PROJECT_EXISTS_SQL, parent_id)
    }

    fn list_members(&self, parent_id: ParentId) -> RepoResult<Vec<ProjectMembership>> {
        load_members(&*self.conn, parent_id)
    }
}

/// Unit of work over `project_members`. Rolls back when dropped uncommitted.
pub struct SqliteProjectMemberTx<'conn> {
    tx: Transaction<'conn>,
}

impl MembershipStore for SqliteProjectMemberTx<'_> {
    type Attrs = YearWithSemesterDuration;

    fn relation(&self) -> &'static str {
        RELATION
    }

    fn parent_exists(&self, parent_id: ParentId) -> RepoResult<bool> {
        row_exists(&self.tx, PROJECT_EXISTS_SQL, parent_id)
    }

    fn parent_scope(&self, parent_id: ParentId) -> RepoResult<YearWithSemesterDuration> {
        let mut stmt = self.tx.prepare(
            "SELECT since_year, since_semester, until_year, until_semester
             FROM projects
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([parent_id.to_string()])?;
        match rows.next()? {
            Some(row) => row_duration(row, "", "projects"),
            None => Err(RepoError::NotFound {
                entity: "project",
                id: parent_id,
            }),
        }
    }

    fn find_current_members(&self, parent_id: ParentId) -> RepoResult<Vec<ProjectMembership>> {
        load_members(&self.tx, parent_id)
    }

    fn insert_members(&self, rows: &[ProjectMembership]) -> RepoResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO project_members (
                project_uuid,
                user_uuid,
                since_year,
                since_semester,
                until_year,
                until_semester
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        )?;
        for row in rows {
            let duration = &row.attributes;
            stmt.execute(params![
                row.parent_id.to_string(),
                row.member_id.to_string(),
                duration.since.year,
                duration.since.semester,
                duration.until.map(|until| until.year),
                duration.until.map(|until| until.semester),
            ])?;
        }
        Ok(())
    }

    fn update_member_fields(
        &self,
        parent_id: ParentId,
        member_id: MemberId,
        changes: &DurationChanges,
    ) -> RepoResult<()> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(year) = changes.since_year {
            assignments.push("since_year = ?");
            bind_values.push(Value::Integer(i64::from(year)));
        }
        if let Some(semester) = changes.since_semester {
            assignments.push("since_semester = ?");
            bind_values.push(Value::Integer(i64::from(semester)));
        }
        if let Some(year) = changes.until_year {
            assignments.push("until_year = ?");
            bind_values.push(optional_integer(year));
        }
        if let Some(semester) = changes.until_semester {
            assignments.push("until_semester = ?");
            bind_values.push(optional_integer(semester));
        }

        if assignments.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE project_members
             SET {},
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE project_uuid = ? AND user_uuid = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Text(parent_id.to_string()));
        bind_values.push(Value::Text(member_id.to_string()));

        let changed = self.tx.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project member",
                id: member_id,
            });
        }
        Ok(())
    }

    fn delete_members(&self, parent_id: ParentId, member_ids: &[MemberId]) -> RepoResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "DELETE FROM project_members
             WHERE project_uuid = ?1 AND user_uuid = ?2;",
        )?;
        for member_id in member_ids {
            stmt.execute(params![parent_id.to_string(), member_id.to_string()])?;
        }
        Ok(())
    }
}

impl MembershipUnitOfWork for SqliteProjectMemberTx<'_> {
    fn commit(self) -> RepoResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn load_members(conn: &Connection, project_id: ParentId) -> RepoResult<Vec<ProjectMembership>> {
    let mut stmt = conn.prepare(&format!(
        "{MEMBER_SELECT_SQL}
         WHERE project_uuid = ?1
         ORDER BY user_uuid ASC;"
    ))?;
    let mut rows = stmt.query([project_id.to_string()])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        members.push(MembershipRecord {
            parent_id: row_uuid(row, "project_uuid")?,
            member_id: row_uuid(row, "user_uuid")?,
            attributes: row_duration(row, "", RELATION)?,
        });
    }
    Ok(members)
}

fn optional_integer(value: Option<i32>) -> Value {
    value.map_or(Value::Null, |value| Value::Integer(i64::from(value)))
}
