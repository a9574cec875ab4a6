//! Storage collaborator contracts used by the reconciliation engine.
//!
//! # Invariants
//! - Every `MembershipStore` call made through one `MembershipUnitOfWork`
//!   observes and mutates the same transaction.
//! - Dropping a unit of work without `commit` discards all of its writes.

use crate::membership::attributes::MembershipAttributes;
use crate::membership::record::{MemberId, MembershipRecord, ParentId};
use crate::repo::RepoResult;

/// Scope type of a relation's attributes.
pub type ScopeOf<A> = <A as MembershipAttributes>::Scope;
/// Change type of a relation's attributes.
pub type ChangesOf<A> = <A as MembershipAttributes>::Changes;

/// Reads and writes one membership relation.
pub trait MembershipStore {
    type Attrs: MembershipAttributes;

    /// Stable relation name used in log events.
    fn relation(&self) -> &'static str;

    fn parent_exists(&self, parent_id: ParentId) -> RepoResult<bool>;

    /// Loads the bound the parent imposes on member attributes.
    ///
    /// Only called after `parent_exists` returned `true`.
    fn parent_scope(&self, parent_id: ParentId) -> RepoResult<ScopeOf<Self::Attrs>>;

    fn find_current_members(
        &self,
        parent_id: ParentId,
    ) -> RepoResult<Vec<MembershipRecord<Self::Attrs>>>;

    fn insert_members(&self, rows: &[MembershipRecord<Self::Attrs>]) -> RepoResult<()>;

    /// Writes only the columns present in `changes`.
    fn update_member_fields(
        &self,
        parent_id: ParentId,
        member_id: MemberId,
        changes: &ChangesOf<Self::Attrs>,
    ) -> RepoResult<()>;

    fn delete_members(&self, parent_id: ParentId, member_ids: &[MemberId]) -> RepoResult<()>;
}

/// A store bound to one atomic transaction.
pub trait MembershipUnitOfWork: MembershipStore {
    /// Makes every write performed through this unit visible.
    fn commit(self) -> RepoResult<()>;
}

/// Entry point that hands out units of work for one relation.
pub trait MembershipRepository {
    type Attrs: MembershipAttributes;
    type UnitOfWork<'a>: MembershipUnitOfWork<Attrs = Self::Attrs>
    where
        Self: 'a;

    /// Starts a write transaction. The write lock is held until the unit is
    /// committed or dropped.
    fn begin(&mut self) -> RepoResult<Self::UnitOfWork<'_>>;

    fn parent_exists(&self, parent_id: ParentId) -> RepoResult<bool>;

    /// Lists persisted memberships ordered by member id.
    fn list_members(&self, parent_id: ParentId) -> RepoResult<Vec<MembershipRecord<Self::Attrs>>>;
}
