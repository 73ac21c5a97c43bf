//! Calendar-date windows for claims and evidence (PRD-07).
//!
//! A window is either a single represented date or a closed start/end
//! range. All arithmetic operates on whole calendar days; any incoming
//! timestamp must be reduced to a `NaiveDate` at the data-model edge
//! before it reaches this module.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single date or a closed date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateWindow {
    /// A single represented date, treated as a one-day window.
    On { date: NaiveDate },
    /// A closed range; both endpoints are included.
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateWindow {
    /// Window covering a single date.
    pub fn single(date: NaiveDate) -> Self {
        Self::On { date }
    }

    /// Window covering a closed range. Rejects `start > end`.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidWindow(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self::Between { start, end })
    }

    /// Build a window from the nullable column triple stored on claim and
    /// evidence rows. Exactly one representation must be present: either a
    /// represented date, or both range endpoints.
    ///
    /// This is the single row-to-domain conversion point; nothing past it
    /// ever sees a half-populated window.
    pub fn from_parts(
        date: Option<NaiveDate>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, CoreError> {
        match (date, start, end) {
            (Some(d), None, None) => Ok(Self::single(d)),
            (None, Some(s), Some(e)) => Self::range(s, e),
            (None, None, None) => Err(CoreError::InvalidWindow(
                "neither a represented date nor a date range is present".into(),
            )),
            _ => Err(CoreError::InvalidWindow(
                "a window must be a single date or a start/end range, not a mixture".into(),
            )),
        }
    }

    /// First day covered by the window.
    pub fn start(&self) -> NaiveDate {
        match *self {
            Self::On { date } => date,
            Self::Between { start, .. } => start,
        }
    }

    /// Last day covered by the window.
    pub fn end(&self) -> NaiveDate {
        match *self {
            Self::On { date } => date,
            Self::Between { end, .. } => end,
        }
    }

    /// Number of whole days covered (`end - start + 1`; 1 for a single date).
    pub fn duration_days(&self) -> i64 {
        (self.end() - self.start()).num_days() + 1
    }

    /// The date used for chronological ordering and chart placement: the
    /// range's end date if ranged, else the single date. Never used for
    /// overlap math, which always works on the full window.
    pub fn effective_date(&self) -> NaiveDate {
        self.end()
    }

    /// Whether `other` falls entirely within this window.
    pub fn contains(&self, other: &DateWindow) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }

    /// Number of whole days common to both windows; zero if disjoint.
    pub fn overlap_days(&self, other: &DateWindow) -> i64 {
        let start = self.start().max(other.start());
        let end = self.end().min(other.end());
        if start > end {
            0
        } else {
            (end - start).num_days() + 1
        }
    }
}

/// Fraction of `claim`'s duration attested by `evidence`, in `[0, 1]`.
///
/// Not commutative: the denominator is always the claim's duration,
/// because the question is "how much of the claim does this evidence
/// prove", never the reverse.
pub fn coverage_fraction(evidence: &DateWindow, claim: &DateWindow) -> f64 {
    let overlap = evidence.overlap_days(claim) as f64;
    (overlap / claim.duration_days() as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // -- construction --

    #[test]
    fn range_rejects_inverted_endpoints() {
        assert_matches!(
            DateWindow::range(d(2024, 3, 10), d(2024, 3, 1)),
            Err(CoreError::InvalidWindow(_))
        );
    }

    #[test]
    fn range_accepts_equal_endpoints() {
        let w = DateWindow::range(d(2024, 3, 1), d(2024, 3, 1)).unwrap();
        assert_eq!(w.duration_days(), 1);
    }

    #[test]
    fn from_parts_single_date() {
        let w = DateWindow::from_parts(Some(d(2024, 3, 1)), None, None).unwrap();
        assert_eq!(w, DateWindow::single(d(2024, 3, 1)));
    }

    #[test]
    fn from_parts_range() {
        let w = DateWindow::from_parts(None, Some(d(2024, 3, 1)), Some(d(2024, 3, 5))).unwrap();
        assert_eq!(w.duration_days(), 5);
    }

    #[test]
    fn from_parts_rejects_all_absent() {
        assert_matches!(
            DateWindow::from_parts(None, None, None),
            Err(CoreError::InvalidWindow(_))
        );
    }

    #[test]
    fn from_parts_rejects_mixture() {
        assert_matches!(
            DateWindow::from_parts(Some(d(2024, 3, 1)), Some(d(2024, 3, 2)), None),
            Err(CoreError::InvalidWindow(_))
        );
        assert_matches!(
            DateWindow::from_parts(None, Some(d(2024, 3, 1)), None),
            Err(CoreError::InvalidWindow(_))
        );
    }

    // -- duration / effective date --

    #[test]
    fn single_date_is_one_day() {
        let w = DateWindow::single(d(2024, 3, 1));
        assert_eq!(w.duration_days(), 1);
        assert_eq!(w.effective_date(), d(2024, 3, 1));
    }

    #[test]
    fn range_duration_is_inclusive() {
        let w = DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap();
        assert_eq!(w.duration_days(), 6);
        assert_eq!(w.effective_date(), d(2024, 3, 15));
    }

    // -- overlap --

    #[test]
    fn overlap_disjoint_is_zero() {
        let a = DateWindow::range(d(2024, 3, 1), d(2024, 3, 5)).unwrap();
        let b = DateWindow::range(d(2024, 3, 6), d(2024, 3, 10)).unwrap();
        assert_eq!(a.overlap_days(&b), 0);
    }

    #[test]
    fn overlap_shared_boundary_day_counts() {
        let a = DateWindow::range(d(2024, 3, 1), d(2024, 3, 5)).unwrap();
        let b = DateWindow::range(d(2024, 3, 5), d(2024, 3, 10)).unwrap();
        assert_eq!(a.overlap_days(&b), 1);
    }

    #[test]
    fn overlap_contained_is_inner_duration() {
        let outer = DateWindow::range(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
        let inner = DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap();
        assert_eq!(outer.overlap_days(&inner), 6);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn overlap_single_date_inside_range() {
        let range = DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap();
        let day = DateWindow::single(d(2024, 3, 12));
        assert_eq!(range.overlap_days(&day), 1);
    }

    // -- coverage fraction --

    #[test]
    fn coverage_partial_overlap() {
        // Evidence 2024-03-12..13 against a claim of 2024-03-10..15:
        // 2 overlapping days out of a 6-day claim.
        let evidence = DateWindow::range(d(2024, 3, 12), d(2024, 3, 13)).unwrap();
        let claim = DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap();
        let f = coverage_fraction(&evidence, &claim);
        assert!((f - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn coverage_is_not_commutative() {
        let evidence = DateWindow::range(d(2024, 3, 12), d(2024, 3, 13)).unwrap();
        let claim = DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap();
        // Swapping the roles changes the denominator: 2/2 vs 2/6.
        assert!((coverage_fraction(&claim, &evidence) - 1.0).abs() < 1e-12);
        assert!(coverage_fraction(&evidence, &claim) < 1.0);
    }

    #[test]
    fn coverage_full_containment_is_one() {
        let evidence = DateWindow::range(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
        let claim = DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap();
        assert!((coverage_fraction(&evidence, &claim) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn coverage_identical_single_dates_is_one() {
        let day = DateWindow::single(d(2024, 3, 1));
        assert!((coverage_fraction(&day, &day) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn coverage_disjoint_is_zero() {
        let evidence = DateWindow::single(d(2024, 4, 1));
        let claim = DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap();
        assert_eq!(coverage_fraction(&evidence, &claim), 0.0);
    }
}
