//! Contest team membership use-case service.
//!
//! Team membership is a bare set, so reconciliation only ever adds or removes
//! rows and never checks spans.

use crate::membership::{
    reconcile, MemberId, MemberSpec, MembershipRepository, ReconcileError, ReconcileSummary,
};
use crate::model::entity::ContestTeamId;

/// Contest team membership facade over a repository implementation.
pub struct ContestTeamMemberService<R>
where
    R: MembershipRepository<Attrs = ()>,
{
    repo: R,
}

impl<R> ContestTeamMemberService<R>
where
    R: MembershipRepository<Attrs = ()>,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Converges the team's members to exactly `member_ids`.
    ///
    /// Fails with `ParentNotFound` for an unknown team and `DuplicateMember`
    /// when an id repeats.
    pub fn reconcile(
        &mut self,
        team_id: ContestTeamId,
        member_ids: &[MemberId],
    ) -> Result<ReconcileSummary, ReconcileError> {
        let desired: Vec<MemberSpec<()>> = member_ids.iter().copied().map(MemberSpec::bare).collect();
        let uow = self.repo.begin()?;
        reconcile(uow, team_id, &desired)
    }

    /// Lists member ids ordered ascending.
    pub fn list_members(&self, team_id: ContestTeamId) -> Result<Vec<MemberId>, ReconcileError> {
        if !self.repo.parent_exists(team_id)? {
            return Err(ReconcileError::ParentNotFound(team_id));
        }
        let members = self.repo.list_members(team_id)?;
        Ok(members.into_iter().map(|record| record.member_id).collect())
    }
}
