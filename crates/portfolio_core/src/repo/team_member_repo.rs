//! Contest team membership persistence.
//!
//! Team membership is bare presence: rows are only inserted or deleted.

use crate::membership::{
    MemberId, MembershipRecord, MembershipRepository, MembershipStore, MembershipUnitOfWork,
    ParentId,
};
use crate::repo::{row_exists, row_uuid, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::convert::Infallible;

const RELATION: &str = "contest_team_members";

const TEAM_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM contest_teams WHERE uuid = ?1);";

/// Contest team membership record.
pub type TeamMembership = MembershipRecord<()>;

/// SQLite-backed contest team membership repository.
pub struct SqliteTeamMemberRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTeamMemberRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl MembershipRepository for SqliteTeamMemberRepository<'_> {
    type Attrs = ();
    type UnitOfWork<'a>
        = SqliteTeamMemberTx<'a>
    where
        Self: 'a;

    fn begin(&mut self) -> RepoResult<SqliteTeamMemberTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTeamMemberTx { tx })
    }

    fn parent_exists(&self, parent_id: ParentId) -> RepoResult<bool> {
        row_exists(&*self.conn, TEAM_EXISTS_SQL, parent_id)
    }

    fn list_members(&self, parent_id: ParentId) -> RepoResult<Vec<TeamMembership>> {
        load_members(&*self.conn, parent_id)
    }
}

/// Unit of work over `contest_team_members`.
pub struct SqliteTeamMemberTx<'conn> {
    tx: Transaction<'conn>,
}

impl MembershipStore for SqliteTeamMemberTx<'_> {
    type Attrs = ();

    fn relation(&self) -> &'static str {
        RELATION
    }

    fn parent_exists(&self, parent_id: ParentId) -> RepoResult<bool> {
        row_exists(&self.tx, TEAM_EXISTS_SQL, parent_id)
    }

    fn parent_scope(&self, _parent_id: ParentId) -> RepoResult<()> {
        Ok(())
    }

    fn find_current_members(&self, parent_id: ParentId) -> RepoResult<Vec<TeamMembership>> {
        load_members(&self.tx, parent_id)
    }

    fn insert_members(&self, rows: &[TeamMembership]) -> RepoResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO contest_team_members (team_uuid, user_uuid)
             VALUES (?1, ?2);",
        )?;
        for row in rows {
            stmt.execute(params![row.parent_id.to_string(), row.member_id.to_string()])?;
        }
        Ok(())
    }

    fn update_member_fields(
        &self,
        _parent_id: ParentId,
        _member_id: MemberId,
        changes: &Infallible,
    ) -> RepoResult<()> {
        match *changes {}
    }

    fn delete_members(&self, parent_id: ParentId, member_ids: &[MemberId]) -> RepoResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "DELETE FROM contest_team_members
             WHERE team_uuid = ?1 AND user_uuid = ?2;",
        )?;
        for member_id in member_ids {
            stmt.execute(params![parent_id.to_string(), member_id.to_string()])?;
        }
        Ok(())
    }
}

impl MembershipUnitOfWork for SqliteTeamMemberTx<'_> {
    fn commit(self) -> RepoResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn load_members(conn: &Connection, team_id: ParentId) -> RepoResult<Vec<TeamMembership>> {
    let mut stmt = conn.prepare(
        "SELECT team_uuid, user_uuid
         FROM contest_team_members
         WHERE team_uuid = ?1
         ORDER BY user_uuid ASC;",
    )?;
    let mut rows = stmt.query([team_id.to_string()])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        members.push(MembershipRecord {
            parent_id: row_uuid(row, "team_uuid")?,
            member_id: row_uuid(row, "user_uuid")?,
            attributes: (),
        });
    }
    Ok(members)
}
