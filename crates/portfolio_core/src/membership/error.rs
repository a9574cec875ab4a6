//! Reconciliation error taxonomy.

use crate::membership::attributes::AttributeViolation;
use crate::membership::record::{MemberId, ParentId};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse error class used by transport layers to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileErrorKind {
    NotFound,
    InvalidArg,
    Storage,
}

/// Failure of one reconciliation call. Nothing was written in any case.
#[derive(Debug)]
pub enum ReconcileError {
    /// Parent entity does not exist.
    ParentNotFound(ParentId),
    /// The desired list names the same member twice (first repeat reported).
    DuplicateMember(MemberId),
    /// A member payload is malformed or exceeds the parent's bound.
    InvalidMember {
        member_id: MemberId,
        violation: AttributeViolation,
    },
    /// Read or write failure from the storage collaborator.
    Storage(RepoError),
}

impl ReconcileError {
    pub fn kind(&self) -> ReconcileErrorKind {
        match self {
            Self::ParentNotFound(_) => ReconcileErrorKind::NotFound,
            Self::DuplicateMember(_) | Self::InvalidMember { .. } => ReconcileErrorKind::InvalidArg,
            Self::Storage(_) => ReconcileErrorKind::Storage,
        }
    }

    /// Stable code for log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ParentNotFound(_) => "parent_not_found",
            Self::DuplicateMember(_) => "duplicate_member",
            Self::InvalidMember {
                violation: AttributeViolation::Invalid { .. },
                ..
            } => "invalid_duration",
            Self::InvalidMember {
                violation: AttributeViolation::OutOfScope { .. },
                ..
            } => "duration_out_of_scope",
            Self::Storage(_) => "storage_failed",
        }
    }
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParentNotFound(id) => write!(f, "parent not found: {id}"),
            Self::DuplicateMember(id) => write!(f, "duplicate member in request: {id}"),
            Self::InvalidMember {
                member_id,
                violation,
            } => write!(f, "invalid member {member_id}: {violation}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReconcileError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}
