//! Entity use-case service.
//!
//! # Responsibility
//! - Validate names and spans before entities reach storage.
//! - Assemble the per-user portfolio view.
//!
//! # Invariants
//! - Names are trimmed and never blank.
//! - Persisted project spans and contest half-years are valid.
//! - Shrinking a project span never strands a member outside it.

use crate::model::duration::{YearWithSemester, YearWithSemesterDuration};
use crate::model::entity::{
    Contest, ContestId, ContestTeam, ContestTeamId, Project, ProjectId, User, UserId,
};
use crate::repo::entity_repo::{EntityRepository, UserProjectMembership};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from entity service operations.
#[derive(Debug)]
pub enum EntityServiceError {
    /// Name-like field is blank after trim.
    BlankName(&'static str),
    InvalidDuration(YearWithSemesterDuration),
    InvalidHalfYear(YearWithSemester),
    UserNotFound(UserId),
    ProjectNotFound(ProjectId),
    ContestNotFound(ContestId),
    TeamNotFound(ContestTeamId),
    /// The new project span would not contain these members' spans.
    MembersOutsideDuration {
        project_id: ProjectId,
        members: Vec<UserId>,
    },
    Repo(RepoError),
}

impl Display for EntityServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(field) => write!(f, "{field} must not be blank"),
            Self::InvalidDuration(duration) => write!(f, "invalid duration `{duration}`"),
            Self::InvalidHalfYear(value) => write!(f, "invalid half-year `{value}`"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::ContestNotFound(id) => write!(f, "contest not found: {id}"),
            Self::TeamNotFound(id) => write!(f, "contest team not found: {id}"),
            Self::MembersOutsideDuration {
                project_id,
                members,
            } => write!(
                f,
                "project {project_id} has {} member(s) outside the new duration",
                members.len()
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntityServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EntityServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Everything one user takes part in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPortfolio {
    pub user: User,
    /// Ordered by the user's own start half-year.
    pub projects: Vec<UserProjectMembership>,
    pub teams: Vec<ContestTeam>,
}

/// Entity service facade over repository implementations.
pub struct EntityService<R: EntityRepository> {
    repo: R,
}

impl<R: EntityRepository> EntityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_user(&self, display_name: &str) -> Result<User, EntityServiceError> {
        let user = User::new(normalize_name(display_name, "display name")?);
        self.repo.create_user(&user)?;
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> Result<User, EntityServiceError> {
        self.repo
            .get_user(id)?
            .ok_or(EntityServiceError::UserNotFound(id))
    }

    pub fn list_users(&self) -> Result<Vec<User>, EntityServiceError> {
        Ok(self.repo.list_users()?)
    }

    /// Creates a project after checking its span is valid.
    pub fn create_project(
        &self,
        title: &str,
        duration: YearWithSemesterDuration,
    ) -> Result<Project, EntityServiceError> {
        let title = normalize_name(title, "project title")?;
        if !duration.is_valid() {
            return Err(EntityServiceError::InvalidDuration(duration));
        }
        let project = Project::new(title, duration);
        self.repo.create_project(&project)?;
        Ok(project)
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Project, EntityServiceError> {
        self.repo
            .get_project(id)?
            .ok_or(EntityServiceError::ProjectNotFound(id))
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, EntityServiceError> {
        Ok(self.repo.list_projects()?)
    }

    /// Replaces a project span.
    ///
    /// # Contract
    /// - Rejects invalid spans.
    /// - Rejects spans that no longer contain every current member span;
    ///   nothing is written in that case.
    pub fn update_project_duration(
        &self,
        id: ProjectId,
        duration: YearWithSemesterDuration,
    ) -> Result<Project, EntityServiceError> {
        if !duration.is_valid() {
            return Err(EntityServiceError::InvalidDuration(duration));
        }
        let mut project = self.get_project(id)?;

        let outside = self.repo.update_project_duration(id, &duration)?;
        if !outside.is_empty() {
            return Err(EntityServiceError::MembersOutsideDuration {
                project_id: id,
                members: outside,
            });
        }

        project.duration = duration;
        Ok(project)
    }

    pub fn create_contest(
        &self,
        title: &str,
        held_in: YearWithSemester,
    ) -> Result<Contest, EntityServiceError> {
        let title = normalize_name(title, "contest title")?;
        if !held_in.is_valid() {
            return Err(EntityServiceError::InvalidHalfYear(held_in));
        }
        let contest = Contest::new(title, held_in);
        self.repo.create_contest(&contest)?;
        Ok(contest)
    }

    pub fn list_contests(&self) -> Result<Vec<Contest>, EntityServiceError> {
        Ok(self.repo.list_contests()?)
    }

    /// Creates a team under an existing contest.
    pub fn create_team(
        &self,
        contest_id: ContestId,
        name: &str,
    ) -> Result<ContestTeam, EntityServiceError> {
        let name = normalize_name(name, "team name")?;
        if self.repo.get_contest(contest_id)?.is_none() {
            return Err(EntityServiceError::ContestNotFound(contest_id));
        }
        let team = ContestTeam::new(contest_id, name);
        self.repo.create_team(&team)?;
        Ok(team)
    }

    pub fn get_team(&self, id: ContestTeamId) -> Result<ContestTeam, EntityServiceError> {
        self.repo
            .get_team(id)?
            .ok_or(EntityServiceError::TeamNotFound(id))
    }

    pub fn list_teams(&self, contest_id: ContestId) -> Result<Vec<ContestTeam>, EntityServiceError> {
        if self.repo.get_contest(contest_id)?.is_none() {
            return Err(EntityServiceError::ContestNotFound(contest_id));
        }
        Ok(self.repo.list_teams(contest_id)?)
    }

    /// Loads the projects and teams one user belongs to.
    pub fn user_portfolio(&self, user_id: UserId) -> Result<UserPortfolio, EntityServiceError> {
        let user = self.get_user(user_id)?;
        Ok(UserPortfolio {
            user,
            projects: self.repo.list_projects_of_user(user_id)?,
            teams: self.repo.list_teams_of_user(user_id)?,
        })
    }
}

fn normalize_name(value: &str, field: &'static str) -> Result<String, EntityServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EntityServiceError::BlankName(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, EntityServiceError};

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Ada  ", "display name").unwrap(), "Ada");
        assert!(matches!(
            normalize_name(" \t ", "display name"),
            Err(EntityServiceError::BlankName("display name"))
        ));
    }
}
