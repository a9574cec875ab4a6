//! Membership reconciliation for n-to-n parent/member relations.
//!
//! # Responsibility
//! - Converge a parent's persisted member set to a caller-supplied list.
//! - Reject invalid input before any write.
//! - Apply inserts, field updates and deletes as one unit of work.
//!
//! # Invariants
//! - At most one record per `(parent_id, member_id)`.
//! - Re-submitting a converged list produces no writes.
//! - Attribute bounds imposed by the parent (project span) hold for every
//!   persisted record.

pub mod attributes;
pub mod engine;
pub mod error;
pub mod record;
pub mod store;

pub use attributes::{AttributeViolation, DurationChanges, MembershipAttributes};
pub use engine::{compute_diff, find_duplicate_member, reconcile, MembershipDiff, ReconcileSummary};
pub use error::{ReconcileError, ReconcileErrorKind};
pub use record::{MemberId, MemberSpec, MemberUpdate, MembershipRecord, ParentId};
pub use store::{MembershipRepository, MembershipStore, MembershipUnitOfWork};
