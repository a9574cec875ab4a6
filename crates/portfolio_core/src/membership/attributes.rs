//! Per-relation membership payloads.
//!
//! # Responsibility
//! - Describe what a relation stores per member and how the parent bounds it.
//! - Compute the minimal column delta between a persisted and desired value.
//!
//! # Invariants
//! - `changes_from` returns `None` exactly when nothing would be written.

use crate::model::duration::{YearWithSemester, YearWithSemesterDuration};
use std::convert::Infallible;
use std::fmt::{Debug, Display, Formatter};

/// Payload carried by each membership of one relation.
pub trait MembershipAttributes: Clone + PartialEq + Debug {
    /// Bound the parent entity imposes on member payloads.
    type Scope: Debug;
    /// Delta written by an update. Only changed fields are populated.
    type Changes: Clone + PartialEq + Debug;

    /// Validates this payload against the parent's bound.
    fn check_within(&self, scope: &Self::Scope) -> Result<(), AttributeViolation>;

    /// Returns the fields of `self` that differ from `current`, if any.
    fn changes_from(&self, current: &Self) -> Option<Self::Changes>;

    /// Applies a delta produced by `changes_from`.
    fn apply(&mut self, changes: &Self::Changes);
}

/// Why a member payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeViolation {
    /// The value is malformed on its own.
    Invalid { value: String },
    /// The value is well-formed but exceeds the parent's bound.
    OutOfScope { value: String, scope: String },
}

impl Display for AttributeViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { value } => write!(f, "duration `{value}` is invalid"),
            Self::OutOfScope { value, scope } => {
                write!(f, "duration `{value}` is not within parent duration `{scope}`")
            }
        }
    }
}

/// Bare presence: nothing to bound, nothing to update.
impl MembershipAttributes for () {
    type Scope = ();
    type Changes = Infallible;

    fn check_within(&self, _scope: &()) -> Result<(), AttributeViolation> {
        Ok(())
    }

    fn changes_from(&self, _current: &()) -> Option<Infallible> {
        None
    }

    fn apply(&mut self, changes: &Infallible) {
        match *changes {}
    }
}

impl MembershipAttributes for YearWithSemesterDuration {
    type Scope = YearWithSemesterDuration;
    type Changes = DurationChanges;

    fn check_within(&self, scope: &YearWithSemesterDuration) -> Result<(), AttributeViolation> {
        if !self.is_valid() {
            return Err(AttributeViolation::Invalid {
                value: self.to_string(),
            });
        }
        if !scope.includes(self) {
            return Err(AttributeViolation::OutOfScope {
                value: self.to_string(),
                scope: scope.to_string(),
            });
        }
        Ok(())
    }

    fn changes_from(&self, current: &YearWithSemesterDuration) -> Option<DurationChanges> {
        let changes = DurationChanges::between(current, self);
        if changes.is_empty() {
            None
        } else {
            Some(changes)
        }
    }

    fn apply(&mut self, changes: &DurationChanges) {
        if let Some(year) = changes.since_year {
            self.since.year = year;
        }
        if let Some(semester) = changes.since_semester {
            self.since.semester = semester;
        }
        let until_year = changes
            .until_year
            .unwrap_or(self.until.map(|until| until.year));
        let until_semester = changes
            .until_semester
            .unwrap_or(self.until.map(|until| until.semester));
        self.until = match (until_year, until_semester) {
            (Some(year), Some(semester)) => Some(YearWithSemester::new(year, semester)),
            _ => None,
        };
    }
}

/// Changed span columns of one project membership.
///
/// Outer `None` means "leave column as is"; `Some(None)` clears an `until`
/// column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationChanges {
    pub since_year: Option<i32>,
    pub since_semester: Option<i32>,
    pub until_year: Option<Option<i32>>,
    pub until_semester: Option<Option<i32>>,
}

impl DurationChanges {
    /// Computes the columns that must be written to turn `current` into
    /// `desired`.
    ///
    /// `until` fields are compared one by one only when both sides are
    /// bounded; adding or removing `until` rewrites both columns.
    pub fn between(current: &YearWithSemesterDuration, desired: &YearWithSemesterDuration) -> Self {
        let since_year = changed(current.since.year, desired.since.year);
        let since_semester = changed(current.since.semester, desired.since.semester);

        let (until_year, until_semester) = match (current.until, desired.until) {
            (Some(current_until), Some(desired_until)) => (
                changed(current_until.year, desired_until.year).map(Some),
                changed(current_until.semester, desired_until.semester).map(Some),
            ),
            (None, None) => (None, None),
            (_, desired_until) => (
                Some(desired_until.map(|until| until.year)),
                Some(desired_until.map(|until| until.semester)),
            ),
        };

        Self {
            since_year,
            since_semester,
            until_year,
            until_semester,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.since_year.is_none()
            && self.since_semester.is_none()
            && self.until_year.is_none()
            && self.until_semester.is_none()
    }
}

fn changed(current: i32, desired: i32) -> Option<i32> {
    (current != desired).then_some(desired)
}

#[cfg(test)]
mod tests {
    use super::{AttributeViolation, DurationChanges, MembershipAttributes};
    use crate::model::duration::{YearWithSemester, YearWithSemesterDuration};

    fn span(since: (i32, i32), until: Option<(i32, i32)>) -> YearWithSemesterDuration {
        YearWithSemesterDuration::new(
            YearWithSemester::new(since.0, since.1),
            until.map(|(year, semester)| YearWithSemester::new(year, semester)),
        )
    }

    #[test]
    fn identical_spans_produce_no_changes() {
        let value = span((2021, 0), Some((2022, 1)));
        assert_eq!(value.changes_from(&value), None);
        let open = span((2021, 0), None);
        assert_eq!(open.changes_from(&open), None);
    }

    #[test]
    fn only_changed_columns_are_populated() {
        let current = span((2021, 0), Some((2022, 1)));
        let desired = span((2021, 1), Some((2022, 1)));
        let changes = desired.changes_from(&current).expect("semester changed");
        assert_eq!(
            changes,
            DurationChanges {
                since_semester: Some(1),
                ..DurationChanges::default()
            }
        );
    }

    #[test]
    fn removing_until_clears_both_columns() {
        let current = span((2021, 0), Some((2022, 1)));
        let desired = span((2021, 0), None);
        let changes = desired.changes_from(&current).expect("until removed");
        assert_eq!(changes.until_year, Some(None));
        assert_eq!(changes.until_semester, Some(None));
        assert_eq!(changes.since_year, None);
    }

    #[test]
    fn adding_until_writes_both_columns() {
        let current = span((2021, 0), None);
        let desired = span((2021, 0), Some((2021, 0)));
        let changes = desired.changes_from(&current).expect("until added");
        assert_eq!(changes.until_year, Some(Some(2021)));
        assert_eq!(changes.until_semester, Some(Some(0)));
    }

    #[test]
    fn applying_changes_reaches_desired_span() {
        let cases = [
            (span((2021, 0), Some((2022, 1))), span((2020, 1), Some((2023, 0)))),
            (span((2021, 0), Some((2022, 1))), span((2021, 0), None)),
            (span((2021, 0), None), span((2021, 1), Some((2024, 1)))),
        ];
        for (current, desired) in cases {
            let changes = desired.changes_from(&current).expect("spans differ");
            let mut patched = current;
            patched.apply(&changes);
            assert_eq!(patched, desired);
        }
    }

    #[test]
    fn check_within_distinguishes_invalid_from_out_of_scope() {
        let scope = span((2020, 0), Some((2022, 1)));
        assert!(span((2021, 0), Some((2021, 1))).check_within(&scope).is_ok());
        assert!(matches!(
            span((2021, 1), Some((2021, 0))).check_within(&scope),
            Err(AttributeViolation::Invalid { .. })
        ));
        assert!(matches!(
            span((2021, 0), None).check_within(&scope),
            Err(AttributeViolation::OutOfScope { .. })
        ));
    }

    #[test]
    fn bare_membership_never_changes() {
        assert_eq!(().changes_from(&()), None);
        assert!(().check_within(&()).is_ok());
    }
}
