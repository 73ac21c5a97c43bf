//! Evidence coverage assessment (PRD-10).
//!
//! For an evidence item's window and a set of candidate claims, computes
//! how much of each claim's date span the evidence attests to and whether
//! the claim should be pre-selected for linking. Zero-coverage claims are
//! still reported so the user can see the mismatch; each result carries
//! the claim's own window so the caller can offer "widen evidence to
//! match this claim".

use serde::{Deserialize, Serialize};

use crate::claim::ClaimObservation;
use crate::types::DbId;
use crate::window::{coverage_fraction, DateWindow};

/// Which coverage levels are pre-selected in the default link set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Suggest any claim with at least partial overlap.
    AnyOverlap,
    /// Suggest only fully covered claims.
    FullOnly,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::AnyOverlap
    }
}

/// Coverage of one candidate claim by a piece of evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimCoverage {
    pub claim_id: DbId,
    /// Whole-percent coverage: 100 for full containment, 0 for no
    /// overlap, otherwise clamped into 1..=99 so a partial overlap never
    /// rounds to either extreme.
    pub percent: u8,
    pub fully_covered: bool,
    /// The claim's own window, for remediation ("widen evidence to match").
    pub claim_window: DateWindow,
    /// Whether this claim belongs in the default link selection.
    pub suggested: bool,
}

/// Assess how well `evidence_window` covers each candidate claim.
///
/// Candidates with invalid stored windows are omitted: there is no span
/// to compare against. Results keep the candidates' order.
pub fn assess(
    evidence_window: DateWindow,
    candidates: &[ClaimObservation],
    policy: SelectionPolicy,
) -> Vec<ClaimCoverage> {
    candidates
        .iter()
        .filter_map(|claim| {
            let claim_window = claim.window?;
            let fully_covered = evidence_window.contains(&claim_window);
            let percent = if fully_covered {
                100
            } else if evidence_window.overlap_days(&claim_window) == 0 {
                0
            } else {
                let raw = (coverage_fraction(&evidence_window, &claim_window) * 100.0).round();
                (raw as u8).clamp(1, 99)
            };
            let suggested = match policy {
                SelectionPolicy::AnyOverlap => percent > 0,
                SelectionPolicy::FullOnly => fully_covered,
            };
            Some(ClaimCoverage {
                claim_id: claim.id,
                percent,
                fully_covered,
                claim_window,
                suggested,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn claim(id: DbId, window: DateWindow) -> ClaimObservation {
        ClaimObservation {
            id,
            metric_id: 1,
            value: 30.0,
            window: Some(window),
        }
    }

    #[test]
    fn partial_overlap_reports_fraction_of_claim() {
        // Evidence 03-12..13 vs claim 03-10..15 (6 days): 2/6 = 33%.
        let evidence = DateWindow::range(d(2024, 3, 12), d(2024, 3, 13)).unwrap();
        let candidate = claim(5, DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap());

        let result = assess(evidence, &[candidate], SelectionPolicy::AnyOverlap);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].percent, 33);
        assert!(!result[0].fully_covered);
        assert!(result[0].suggested);
    }

    #[test]
    fn containment_is_full_coverage() {
        let evidence = DateWindow::range(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
        let candidate = claim(5, DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap());

        let result = assess(evidence, &[candidate], SelectionPolicy::AnyOverlap);
        assert_eq!(result[0].percent, 100);
        assert!(result[0].fully_covered);
    }

    #[test]
    fn identical_single_dates_are_full_coverage() {
        let evidence = DateWindow::single(d(2024, 3, 1));
        let candidate = claim(5, DateWindow::single(d(2024, 3, 1)));

        let result = assess(evidence, &[candidate], SelectionPolicy::AnyOverlap);
        assert_eq!(result[0].percent, 100);
        assert!(result[0].fully_covered);
        assert!(result[0].suggested);
    }

    #[test]
    fn disjoint_claim_reported_but_not_suggested() {
        let evidence = DateWindow::single(d(2024, 4, 1));
        let candidate = claim(5, DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap());

        let result = assess(evidence, &[candidate], SelectionPolicy::AnyOverlap);
        assert_eq!(result[0].percent, 0);
        assert!(!result[0].suggested);
        // The claim's window is still exposed for remediation.
        assert_eq!(
            result[0].claim_window,
            DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap()
        );
    }

    #[test]
    fn tiny_overlap_never_rounds_to_zero() {
        // One day out of a 365-day claim rounds to 0%, but partial
        // coverage must stay distinguishable from none.
        let evidence = DateWindow::single(d(2024, 1, 1));
        let candidate = claim(5, DateWindow::range(d(2024, 1, 1), d(2024, 12, 30)).unwrap());

        let result = assess(evidence, &[candidate], SelectionPolicy::AnyOverlap);
        assert_eq!(result[0].percent, 1);
        assert!(result[0].suggested);
    }

    #[test]
    fn near_total_overlap_never_rounds_to_hundred() {
        // 364 of 365 days rounds to 100% but is not full containment.
        let evidence = DateWindow::range(d(2024, 1, 2), d(2024, 12, 30)).unwrap();
        let candidate = claim(5, DateWindow::range(d(2024, 1, 1), d(2024, 12, 30)).unwrap());

        let result = assess(evidence, &[candidate], SelectionPolicy::AnyOverlap);
        assert_eq!(result[0].percent, 99);
        assert!(!result[0].fully_covered);
    }

    #[test]
    fn full_only_policy_excludes_partials_from_suggestion() {
        let evidence = DateWindow::range(d(2024, 3, 12), d(2024, 3, 13)).unwrap();
        let partial = claim(5, DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap());
        let full = claim(6, DateWindow::single(d(2024, 3, 12)));

        let result = assess(evidence, &[partial, full], SelectionPolicy::FullOnly);
        assert!(!result[0].suggested);
        assert!(result[1].suggested);
    }

    #[test]
    fn invalid_claim_windows_are_omitted() {
        let evidence = DateWindow::single(d(2024, 3, 1));
        let broken = ClaimObservation {
            id: 9,
            metric_id: 1,
            value: 10.0,
            window: None,
        };
        let result = assess(evidence, &[broken], SelectionPolicy::AnyOverlap);
        assert!(result.is_empty());
    }
}
