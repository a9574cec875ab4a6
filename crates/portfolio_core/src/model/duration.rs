//! Academic half-year points and spans.
//!
//! # Responsibility
//! - Define the `(year, semester)` value used by projects and memberships.
//! - Provide validity, ordering and containment predicates.
//!
//! # Invariants
//! - A valid half-year has `year >= 1970` and `semester` in `{0, 1}`.
//! - A valid span has `since <= until` when `until` is present.
//! - `until = None` means open-ended, never "zero date".

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Earliest year accepted by `YearWithSemester::is_valid`.
pub const MIN_YEAR: i32 = 1970;

/// One academic half-year. Semester `0` is the first half of `year`,
/// semester `1` the second half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearWithSemester {
    pub year: i32,
    pub semester: i32,
}

impl YearWithSemester {
    pub fn new(year: i32, semester: i32) -> Self {
        Self { year, semester }
    }

    pub fn is_valid(&self) -> bool {
        self.year >= MIN_YEAR && (self.semester == 0 || self.semester == 1)
    }

    /// Strict ordering over `(year, semester)`. Equal values are never after
    /// each other.
    pub fn is_after(&self, other: &YearWithSemester) -> bool {
        self.year > other.year || (self.year == other.year && self.semester > other.semester)
    }
}

impl Display for YearWithSemester {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.year, self.semester)
    }
}

/// Span of half-years, open-ended when `until` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearWithSemesterDuration {
    pub since: YearWithSemester,
    #[serde(default)]
    pub until: Option<YearWithSemester>,
}

impl YearWithSemesterDuration {
    pub fn new(since: YearWithSemester, until: Option<YearWithSemester>) -> Self {
        Self { since, until }
    }

    /// Bounded span `since..=until`.
    pub fn bounded(since: YearWithSemester, until: YearWithSemester) -> Self {
        Self::new(since, Some(until))
    }

    /// Span with no known end.
    pub fn open(since: YearWithSemester) -> Self {
        Self::new(since, None)
    }

    /// Returns whether both endpoints are valid and `since <= until`.
    ///
    /// An absent `until` never invalidates the span.
    pub fn is_valid(&self) -> bool {
        if !self.since.is_valid() {
            return false;
        }
        match self.until {
            Some(until) => until.is_valid() && !self.since.is_after(&until),
            None => true,
        }
    }

    /// Returns whether `inner` lies entirely within `self`.
    ///
    /// # Contract
    /// - Invalid spans on either side are never contained.
    /// - An open-ended outer span contains every valid inner span that does
    ///   not start earlier.
    /// - An open-ended inner span is never contained by a bounded outer span.
    pub fn includes(&self, inner: &YearWithSemesterDuration) -> bool {
        if !self.is_valid() || !inner.is_valid() {
            return false;
        }
        if self.since.is_after(&inner.since) {
            return false;
        }
        match (self.until, inner.until) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(outer_until), Some(inner_until)) => !inner_until.is_after(&outer_until),
        }
    }
}

impl Display for YearWithSemesterDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.until {
            Some(until) => write!(f, "{}..{}", self.since, until),
            None => write!(f, "{}..", self.since),
        }
    }
}
