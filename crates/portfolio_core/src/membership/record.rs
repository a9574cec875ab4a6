//! Membership rows and caller-supplied member entries.

use crate::model::duration::YearWithSemesterDuration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner side of a relation (project or contest team).
pub type ParentId = Uuid;
/// Member side of a relation (always a user).
pub type MemberId = Uuid;

/// One persisted membership. Identity is `(parent_id, member_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord<A> {
    pub parent_id: ParentId,
    pub member_id: MemberId,
    /// Relation-specific payload: a span for projects, `()` for teams.
    pub attributes: A,
}

/// One entry of the desired member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSpec<A> {
    pub member_id: MemberId,
    pub attributes: A,
}

impl MemberSpec<()> {
    /// Entry for relations whose membership is bare presence.
    pub fn bare(member_id: MemberId) -> Self {
        Self {
            member_id,
            attributes: (),
        }
    }
}

impl MemberSpec<YearWithSemesterDuration> {
    pub fn with_duration(member_id: MemberId, duration: YearWithSemesterDuration) -> Self {
        Self {
            member_id,
            attributes: duration,
        }
    }
}

/// Column-level change for one existing membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberUpdate<C> {
    pub member_id: MemberId,
    pub changes: C,
}
