//! Parent and member entities.
//!
//! # Responsibility
//! - Define the records a membership relation points at.
//!
//! # Invariants
//! - IDs are stable and never reused for another entity.
//! - A `Project` owns its own span; member spans must stay inside it.

use crate::model::duration::{YearWithSemester, YearWithSemesterDuration};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a person.
pub type UserId = Uuid;
/// Stable identifier of a project.
pub type ProjectId = Uuid;
/// Stable identifier of a contest.
pub type ContestId = Uuid;
/// Stable identifier of a team entered in a contest.
pub type ContestTeamId = Uuid;

/// A person that can join projects and contest teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub display_name: String,
}

impl User {
    /// Creates a user with a generated stable ID.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            display_name: display_name.into(),
        }
    }
}

/// A project running over an academic span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub title: String,
    /// Outer bound for every member span of this project.
    pub duration: YearWithSemesterDuration,
}

impl Project {
    /// Creates a project with a generated stable ID.
    ///
    /// Does not validate `duration`; see `EntityService::create_project`.
    pub fn new(title: impl Into<String>, duration: YearWithSemesterDuration) -> Self {
        Self {
            project_id: Uuid::new_v4(),
            title: title.into(),
            duration,
        }
    }
}

/// A contest held in one half-year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub contest_id: ContestId,
    pub title: String,
    pub held_in: YearWithSemester,
}

impl Contest {
    pub fn new(title: impl Into<String>, held_in: YearWithSemester) -> Self {
        Self {
            contest_id: Uuid::new_v4(),
            title: title.into(),
            held_in,
        }
    }
}

/// A team entered in one contest. Team membership carries no span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestTeam {
    pub team_id: ContestTeamId,
    pub contest_id: ContestId,
    pub name: String,
}

impl ContestTeam {
    pub fn new(contest_id: ContestId, name: impl Into<String>) -> Self {
        Self {
            team_id: Uuid::new_v4(),
            contest_id,
            name: name.into(),
        }
    }
}
