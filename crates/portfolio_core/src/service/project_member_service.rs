//! Project membership use-case service.
//!
//! # Responsibility
//! - Bind the reconciliation engine to "user is a member of project for a
//!   span".
//!
//! # Invariants
//! - Every persisted member span is valid and contained in the project span.
//! - Only changed span columns are rewritten.

use crate::membership::{
    reconcile, MemberSpec, MembershipRecord, MembershipRepository, ReconcileError,
    ReconcileSummary,
};
use crate::model::duration::YearWithSemesterDuration;
use crate::model::entity::ProjectId;

/// Desired entry for one project member.
pub type ProjectMemberSpec = MemberSpec<YearWithSemesterDuration>;

/// Project membership facade over a repository implementation.
pub struct ProjectMemberService<R>
where
    R: MembershipRepository<Attrs = YearWithSemesterDuration>,
{
    repo: R,
}

impl<R> ProjectMemberService<R>
where
    R: MembershipRepository<Attrs = YearWithSemesterDuration>,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Converges the project's members to `desired` in one transaction.
    ///
    /// # Errors
    /// - `ParentNotFound` when the project does not exist.
    /// - `DuplicateMember` when a user appears twice.
    /// - `InvalidMember` when a span is invalid or leaves the project span.
    /// - `Storage` for any persistence failure; nothing is written.
    pub fn reconcile(
        &mut self,
        project_id: ProjectId,
        desired: &[ProjectMemberSpec],
    ) -> Result<ReconcileSummary, ReconcileError> {
        let uow = self.repo.begin()?;
        reconcile(uow, project_id, desired)
    }

    /// Lists the project's members ordered by user id.
    pub fn list_members(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<MembershipRecord<YearWithSemesterDuration>>, ReconcileError> {
        if !self.repo.parent_exists(project_id)? {
            return Err(ReconcileError::ParentNotFound(project_id));
        }
        Ok(self.repo.list_members(project_id)?)
    }
}
