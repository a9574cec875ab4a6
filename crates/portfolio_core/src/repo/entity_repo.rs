//! Parent/member entity repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist users, projects, contests and contest teams.
//! - Serve the per-user portfolio views (projects and teams a user is in).
//!
//! # Invariants
//! - Lists are deterministic: ordered by display text, then uuid.
//! - A project span update never leaves a member span outside the project.

use crate::model::duration::{YearWithSemester, YearWithSemesterDuration};
use crate::model::entity::{
    Contest, ContestId, ContestTeam, ContestTeamId, Project, ProjectId, User, UserId,
};
use crate::repo::{row_duration, row_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const USER_SELECT_SQL: &str = "SELECT uuid, display_name FROM users";

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    since_year,
    since_semester,
    until_year,
    until_semester
FROM projects";

const CONTEST_SELECT_SQL: &str = "SELECT uuid, title, held_year, held_semester FROM contests";

const TEAM_SELECT_SQL: &str = "SELECT uuid, contest_uuid, name FROM contest_teams";

/// A project a user belongs to, with the user's own span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProjectMembership {
    pub project: Project,
    pub duration: YearWithSemesterDuration,
}

/// Repository interface for entity records.
pub trait EntityRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;

    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Replaces the project span.
    ///
    /// Returns the members whose span would fall outside `duration`; when that
    /// list is non-empty nothing is written.
    fn update_project_duration(
        &self,
        id: ProjectId,
        duration: &YearWithSemesterDuration,
    ) -> RepoResult<Vec<UserId>>;

    fn create_contest(&self, contest: &Contest) -> RepoResult<ContestId>;
    fn get_contest(&self, id: ContestId) -> RepoResult<Option<Contest>>;
    fn list_contests(&self) -> RepoResult<Vec<Contest>>;

    fn create_team(&self, team: &ContestTeam) -> RepoResult<ContestTeamId>;
    fn get_team(&self, id: ContestTeamId) -> RepoResult<Option<ContestTeam>>;
    fn list_teams(&self, contest_id: ContestId) -> RepoResult<Vec<ContestTeam>>;

    fn list_projects_of_user(&self, user_id: UserId) -> RepoResult<Vec<UserProjectMembership>>;
    fn list_teams_of_user(&self, user_id: UserId) -> RepoResult<Vec<ContestTeam>>;
}

/// SQLite-backed entity repository.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (uuid, display_name) VALUES (?1, ?2);",
            params![user.user_id.to_string(), user.display_name.as_str()],
        )?;
        Ok(user.user_id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        query_one(
            self.conn,
            &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
            id,
            parse_user_row,
        )
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        query_all(
            self.conn,
            &format!("{USER_SELECT_SQL} ORDER BY display_name ASC, uuid ASC;"),
            None,
            parse_user_row,
        )
    }

    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        let duration = &project.duration;
        self.conn.execute(
            "INSERT INTO projects (
                uuid,
                title,
                since_year,
                since_semester,
                until_year,
                until_semester
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                project.project_id.to_string(),
                project.title.as_str(),
                duration.since.year,
                duration.since.semester,
                duration.until.map(|until| until.year),
                duration.until.map(|until| until.semester),
            ],
        )?;
        Ok(project.project_id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        query_one(
            self.conn,
            &format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"),
            id,
            parse_project_row,
        )
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        query_all(
            self.conn,
            &format!("{PROJECT_SELECT_SQL} ORDER BY title ASC, uuid ASC;"),
            None,
            parse_project_row,
        )
    }

    fn update_project_duration(
        &self,
        id: ProjectId,
        duration: &YearWithSemesterDuration,
    ) -> RepoResult<Vec<UserId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let mut outside = Vec::new();
        {
            let mut stmt = tx.prepare(
                "SELECT user_uuid, since_year, since_semester, until_year, until_semester
                 FROM project_members
                 WHERE project_uuid = ?1
                 ORDER BY user_uuid ASC;",
            )?;
            let mut rows = stmt.query([id.to_string()])?;
            while let Some(row) = rows.next()? {
                let member_span = row_duration(row, "", "project_members")?;
                if !duration.includes(&member_span) {
                    outside.push(row_uuid(row, "user_uuid")?);
                }
            }
        }
        if !outside.is_empty() {
            return Ok(outside);
        }

        let changed = tx.execute(
            "UPDATE projects
             SET since_year = ?2,
                 since_semester = ?3,
                 until_year = ?4,
                 until_semester = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                duration.since.year,
                duration.since.semester,
                duration.until.map(|until| until.year),
                duration.until.map(|until| until.semester),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }

        tx.commit()?;
        Ok(outside)
    }

    fn create_contest(&self, contest: &Contest) -> RepoResult<ContestId> {
        self.conn.execute(
            "INSERT INTO contests (uuid, title, held_year, held_semester)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                contest.contest_id.to_string(),
                contest.title.as_str(),
                contest.held_in.year,
                contest.held_in.semester,
            ],
        )?;
        Ok(contest.contest_id)
    }

    fn get_contest(&self, id: ContestId) -> RepoResult<Option<Contest>> {
        query_one(
            self.conn,
            &format!("{CONTEST_SELECT_SQL} WHERE uuid = ?1;"),
            id,
            parse_contest_row,
        )
    }

    fn list_contests(&self) -> RepoResult<Vec<Contest>> {
        query_all(
            self.conn,
            &format!("{CONTEST_SELECT_SQL} ORDER BY held_year DESC, held_semester DESC, uuid ASC;"),
            None,
            parse_contest_row,
        )
    }

    fn create_team(&self, team: &ContestTeam) -> RepoResult<ContestTeamId> {
        self.conn.execute(
            "INSERT INTO contest_teams (uuid, contest_uuid, name) VALUES (?1, ?2, ?3);",
            params![
                team.team_id.to_string(),
                team.contest_id.to_string(),
                team.name.as_str(),
            ],
        )?;
        Ok(team.team_id)
    }

    fn get_team(&self, id: ContestTeamId) -> RepoResult<Option<ContestTeam>> {
        query_one(
            self.conn,
            &format!("{TEAM_SELECT_SQL} WHERE uuid = ?1;"),
            id,
            parse_team_row,
        )
    }

    fn list_teams(&self, contest_id: ContestId) -> RepoResult<Vec<ContestTeam>> {
        query_all(
            self.conn,
            &format!("{TEAM_SELECT_SQL} WHERE contest_uuid = ?1 ORDER BY name ASC, uuid ASC;"),
            Some(contest_id),
            parse_team_row,
        )
    }

    fn list_projects_of_user(&self, user_id: UserId) -> RepoResult<Vec<UserProjectMembership>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.uuid AS uuid,
                p.title AS title,
                p.since_year AS since_year,
                p.since_semester AS since_semester,
                p.until_year AS until_year,
                p.until_semester AS until_semester,
                m.since_year AS member_since_year,
                m.since_semester AS member_since_semester,
                m.until_year AS member_until_year,
                m.until_semester AS member_until_semester
             FROM project_members m
             INNER JOIN projects p ON p.uuid = m.project_uuid
             WHERE m.user_uuid = ?1
             ORDER BY m.since_year ASC, m.since_semester ASC, p.uuid ASC;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let project = parse_project_row(row)?;
            let duration = row_duration(row, "member_", "project_members")?;
            items.push(UserProjectMembership { project, duration });
        }
        Ok(items)
    }

    fn list_teams_of_user(&self, user_id: UserId) -> RepoResult<Vec<ContestTeam>> {
        query_all(
            self.conn,
            "SELECT t.uuid AS uuid, t.contest_uuid AS contest_uuid, t.name AS name
             FROM contest_team_members m
             INNER JOIN contest_teams t ON t.uuid = m.team_uuid
             WHERE m.user_uuid = ?1
             ORDER BY t.name ASC, t.uuid ASC;",
            Some(user_id),
            parse_team_row,
        )
    }
}

fn query_one<T>(
    conn: &Connection,
    sql: &str,
    id: uuid::Uuid,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse(row)?)),
        None => Ok(None),
    }
}

fn query_all<T>(
    conn: &Connection,
    sql: &str,
    filter: Option<uuid::Uuid>,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match filter {
        Some(id) => stmt.query([id.to_string()])?,
        None => stmt.query([])?,
    };
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        user_id: row_uuid(row, "uuid")?,
        display_name: row.get("display_name")?,
    })
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        project_id: row_uuid(row, "uuid")?,
        title: row.get("title")?,
        duration: row_duration(row, "", "projects")?,
    })
}

fn parse_contest_row(row: &Row<'_>) -> RepoResult<Contest> {
    let held_in = YearWithSemester::new(row.get("held_year")?, row.get("held_semester")?);
    if !held_in.is_valid() {
        return Err(RepoError::InvalidData(format!(
            "invalid half-year `{held_in}` in contests"
        )));
    }
    Ok(Contest {
        contest_id: row_uuid(row, "uuid")?,
        title: row.get("title")?,
        held_in,
    })
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<ContestTeam> {
    Ok(ContestTeam {
        team_id: row_uuid(row, "uuid")?,
        contest_id: row_uuid(row, "contest_uuid")?,
        name: row.get("name")?,
    })
}
