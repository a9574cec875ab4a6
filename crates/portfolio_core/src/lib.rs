//! Core domain logic for the portfolio tracker.
//! This crate owns the membership invariants: half-year span containment and
//! atomic reconciliation of project and contest team members.

pub mod config;
pub mod db;
pub mod logging;
pub mod membership;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use membership::{
    DurationChanges, MemberId, MemberSpec, MembershipRecord, MembershipRepository,
    ReconcileError, ReconcileErrorKind, ReconcileSummary,
};
pub use model::duration::{YearWithSemester, YearWithSemesterDuration};
pub use model::entity::{
    Contest, ContestId, ContestTeam, ContestTeamId, Project, ProjectId, User, UserId,
};
pub use repo::entity_repo::{EntityRepository, SqliteEntityRepository, UserProjectMembership};
pub use repo::project_member_repo::{ProjectMembership, SqliteProjectMemberRepository};
pub use repo::team_member_repo::{SqliteTeamMemberRepository, TeamMembership};
pub use repo::{RepoError, RepoResult};
pub use service::entity_service::{EntityService, EntityServiceError, UserPortfolio};
pub use service::project_member_service::{ProjectMemberService, ProjectMemberSpec};
pub use service::team_member_service::ContestTeamMemberService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
