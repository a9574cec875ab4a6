//! Diff-based membership reconciliation.
//!
//! # Responsibility
//! - Validate a desired member list against the parent.
//! - Compute the minimal add/update/remove sets against persisted state.
//! - Apply them through one unit of work and commit only on full success.
//!
//! # Invariants
//! - Validation runs before the first write.
//! - Inputs are never mutated; diff collections are freshly built.
//! - Any error drops the unit of work uncommitted, so no partial effect is
//!   observable.

use crate::membership::attributes::MembershipAttributes;
use crate::membership::error::ReconcileError;
use crate::membership::record::{MemberId, MemberSpec, MemberUpdate, MembershipRecord, ParentId};
use crate::membership::store::{MembershipStore, MembershipUnitOfWork};
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Writes needed to converge one parent's member set.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipDiff<A: MembershipAttributes> {
    /// New memberships, in desired-list order.
    pub to_add: Vec<MembershipRecord<A>>,
    /// Existing memberships whose attributes differ, in desired-list order.
    pub to_update: Vec<MemberUpdate<A::Changes>>,
    /// Members to drop, in persisted order.
    pub to_remove: Vec<MemberId>,
}

impl<A: MembershipAttributes> MembershipDiff<A> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    pub fn summary(&self) -> ReconcileSummary {
        ReconcileSummary {
            added: self.to_add.len(),
            updated: self.to_update.len(),
            removed: self.to_remove.len(),
        }
    }
}

/// Counts of rows touched by one successful reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

impl ReconcileSummary {
    /// Returns whether the call wrote nothing.
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}

/// Returns the first member id that repeats an earlier entry.
pub fn find_duplicate_member<A>(desired: &[MemberSpec<A>]) -> Option<MemberId> {
    let mut seen = HashSet::with_capacity(desired.len());
    desired
        .iter()
        .map(|spec| spec.member_id)
        .find(|member_id| !seen.insert(*member_id))
}

/// Computes the diff that turns `current` into `desired`, keyed by member id.
///
/// `desired` must be free of duplicate member ids.
pub fn compute_diff<A: MembershipAttributes>(
    parent_id: ParentId,
    current: &[MembershipRecord<A>],
    desired: &[MemberSpec<A>],
) -> MembershipDiff<A> {
    let current_by_member: HashMap<MemberId, &MembershipRecord<A>> = current
        .iter()
        .map(|record| (record.member_id, record))
        .collect();
    let desired_members: HashSet<MemberId> = desired.iter().map(|spec| spec.member_id).collect();

    let mut to_add = Vec::new();
    let mut to_update = Vec::new();
    for spec in desired {
        match current_by_member.get(&spec.member_id) {
            None => to_add.push(MembershipRecord {
                parent_id,
                member_id: spec.member_id,
                attributes: spec.attributes.clone(),
            }),
            Some(existing) => {
                if let Some(changes) = spec.attributes.changes_from(&existing.attributes) {
                    to_update.push(MemberUpdate {
                        member_id: spec.member_id,
                        changes,
                    });
                }
            }
        }
    }

    let to_remove = current
        .iter()
        .filter(|record| !desired_members.contains(&record.member_id))
        .map(|record| record.member_id)
        .collect();

    MembershipDiff {
        to_add,
        to_update,
        to_remove,
    }
}

/// Converges `parent_id`'s memberships to `desired` inside `uow`.
///
/// # Contract
/// - Fails with `ParentNotFound` when the parent is missing.
/// - Fails with `DuplicateMember` on the first repeated member id.
/// - Fails with `InvalidMember` when a payload violates the parent's bound.
/// - Commits `uow` only after every write succeeded; on any error `uow` is
///   dropped and its transaction rolls back.
/// - A converged `desired` list produces no writes.
pub fn reconcile<U: MembershipUnitOfWork>(
    uow: U,
    parent_id: ParentId,
    desired: &[MemberSpec<U::Attrs>],
) -> Result<ReconcileSummary, ReconcileError> {
    let started_at = Instant::now();
    let relation = uow.relation();

    let result = match converge(&uow, parent_id, desired) {
        Ok(summary) => uow
            .commit()
            .map(|()| summary)
            .map_err(ReconcileError::from),
        Err(err) => {
            drop(uow);
            Err(err)
        }
    };

    match &result {
        Ok(summary) => info!(
            "event=membership_reconcile module=membership status=ok relation={relation} parent_id={parent_id} desired={} added={} updated={} removed={} duration_ms={}",
            desired.len(),
            summary.added,
            summary.updated,
            summary.removed,
            started_at.elapsed().as_millis()
        ),
        Err(err @ ReconcileError::Storage(_)) => error!(
            "event=membership_reconcile module=membership status=error relation={relation} parent_id={parent_id} duration_ms={} error_code={} error={}",
            started_at.elapsed().as_millis(),
            err.error_code(),
            err
        ),
        Err(err) => warn!(
            "event=membership_reconcile module=membership status=rejected relation={relation} parent_id={parent_id} duration_ms={} error_code={} error={}",
            started_at.elapsed().as_millis(),
            err.error_code(),
            err
        ),
    }

    result
}

fn converge<S: MembershipStore>(
    store: &S,
    parent_id: ParentId,
    desired: &[MemberSpec<S::Attrs>],
) -> Result<ReconcileSummary, ReconcileError> {
    if !store.parent_exists(parent_id)? {
        return Err(ReconcileError::ParentNotFound(parent_id));
    }
    if let Some(member_id) = find_duplicate_member(desired) {
        return Err(ReconcileError::DuplicateMember(member_id));
    }

    let scope = store.parent_scope(parent_id)?;
    for spec in desired {
        spec.attributes
            .check_within(&scope)
            .map_err(|violation| ReconcileError::InvalidMember {
                member_id: spec.member_id,
                violation,
            })?;
    }

    let current = store.find_current_members(parent_id)?;
    let diff = compute_diff(parent_id, &current, desired);
    debug!(
        "event=membership_diff module=membership relation={} parent_id={parent_id} current={} add={} update={} remove={}",
        store.relation(),
        current.len(),
        diff.to_add.len(),
        diff.to_update.len(),
        diff.to_remove.len()
    );

    if !diff.to_add.is_empty() {
        store.insert_members(&diff.to_add)?;
    }
    for update in &diff.to_update {
        store.update_member_fields(parent_id, update.member_id, &update.changes)?;
    }
    if !diff.to_remove.is_empty() {
        store.delete_members(parent_id, &diff.to_remove)?;
    }

    Ok(diff.summary())
}
