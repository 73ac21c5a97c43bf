//! Claim aggregation: per-metric totals and daily cumulative series (PRD-09).
//!
//! Input claims are already scoped (initiative, metric, location) by the
//! storage layer; this module resolves the display window, drops claims
//! outside it, and derives totals and the chart series as two independent
//! passes over the same filtered list. The anchor date for lookback
//! periods and future-day truncation is an explicit parameter, never an
//! ambient clock read.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::claim::ClaimObservation;
use crate::types::DbId;
use crate::window::DateWindow;

// ---------------------------------------------------------------------------
// Lookback periods
// ---------------------------------------------------------------------------

/// Named lookback period used when no explicit date filter is supplied.
/// Windows end at the anchor date ("today") inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookbackPeriod {
    Last7Days,
    Last30Days,
    Last90Days,
    LastYear,
    AllTime,
}

impl LookbackPeriod {
    /// Window length in days; `None` for [`LookbackPeriod::AllTime`].
    pub fn days(self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::LastYear => Some(365),
            Self::AllTime => None,
        }
    }
}

impl Default for LookbackPeriod {
    fn default() -> Self {
        Self::Last30Days
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One day of the cumulative series: the running total per metric as of
/// the end of `date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub values: BTreeMap<DbId, f64>,
}

/// Result of aggregating a set of claims over a display window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    /// The resolved display window; `None` only for an all-time request
    /// over a claim set with no valid windows.
    pub window: Option<DateWindow>,
    /// Total surviving claim value per metric. Every requested metric is
    /// present, with 0 when nothing survived the window.
    pub totals: BTreeMap<DbId, f64>,
    /// Daily cumulative series, one point per display-window day up to and
    /// including the anchor date. Future days are never emitted.
    pub series: Vec<DailyPoint>,
    /// Ids of claims excluded because their stored window was invalid.
    pub skipped: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate `claims` into per-metric totals and a daily cumulative series.
///
/// * `metric_ids` — metrics that must appear in `totals` even with no
///   surviving claims.
/// * `explicit_window` — caller-supplied date filter; wins over `period`.
/// * `period` — lookback anchored at `today` when no explicit filter.
/// * `today` — the injected anchor date; the series never extends past it.
///
/// A claim with a multi-day range counts fully at its effective (end)
/// date; the series is cumulative-to-date, not a daily delta.
pub fn aggregate(
    claims: &[ClaimObservation],
    metric_ids: &[DbId],
    explicit_window: Option<DateWindow>,
    period: LookbackPeriod,
    today: NaiveDate,
) -> Aggregation {
    let skipped: Vec<DbId> = claims
        .iter()
        .filter(|c| c.window.is_none())
        .map(|c| c.id)
        .collect();

    let window = resolve_display_window(explicit_window, period, claims, today);

    // Pass 1: the filtered claim list both totals and series derive from.
    let surviving: Vec<&ClaimObservation> = match window {
        Some(w) => claims
            .iter()
            .filter(|c| {
                c.window
                    .map(|cw| {
                        let eff = cw.effective_date();
                        w.start() <= eff && eff <= w.end()
                    })
                    .unwrap_or(false)
            })
            .collect(),
        None => Vec::new(),
    };

    let totals = totals_of(&surviving, metric_ids);
    let series = match window {
        Some(w) => series_of(&surviving, &totals, w, today),
        None => Vec::new(),
    };

    Aggregation {
        window,
        totals,
        series,
        skipped,
    }
}

/// Resolve the display window: an explicit filter wins; otherwise the
/// lookback period is anchored at `today`. All-time derives its start
/// from the earliest valid claim window.
fn resolve_display_window(
    explicit: Option<DateWindow>,
    period: LookbackPeriod,
    claims: &[ClaimObservation],
    today: NaiveDate,
) -> Option<DateWindow> {
    if let Some(w) = explicit {
        return Some(w);
    }
    match period.days() {
        Some(days) => {
            let start = today - Duration::days(days - 1);
            Some(DateWindow::Between { start, end: today })
        }
        None => {
            let earliest = claims
                .iter()
                .filter_map(|c| c.window)
                .map(|w| w.start())
                .min()?;
            Some(DateWindow::Between {
                start: earliest.min(today),
                end: today,
            })
        }
    }
}

/// Per-metric sum of surviving claim values. Requested metrics always
/// appear; metrics only present through surviving claims are added.
fn totals_of(surviving: &[&ClaimObservation], metric_ids: &[DbId]) -> BTreeMap<DbId, f64> {
    let mut totals: BTreeMap<DbId, f64> = metric_ids.iter().map(|&id| (id, 0.0)).collect();
    for claim in surviving {
        *totals.entry(claim.metric_id).or_insert(0.0) += claim.value;
    }
    totals
}

/// Walk the display window day by day, carrying a running per-metric
/// cumulative total. Days after `today` are not emitted.
fn series_of(
    surviving: &[&ClaimObservation],
    totals: &BTreeMap<DbId, f64>,
    window: DateWindow,
    today: NaiveDate,
) -> Vec<DailyPoint> {
    let last_day = window.end().min(today);
    if window.start() > last_day {
        return Vec::new();
    }

    let mut ordered: Vec<&ClaimObservation> = surviving.to_vec();
    ordered.sort_by_key(|c| c.window.map(|w| w.effective_date()));

    // Chart lines start at zero for every metric in the totals map.
    let mut running: BTreeMap<DbId, f64> = totals.keys().map(|&id| (id, 0.0)).collect();
    let mut next = 0;

    let mut series = Vec::new();
    for date in window.start().iter_days().take_while(|d| *d <= last_day) {
        while next < ordered.len() {
            let claim = ordered[next];
            let eff = claim
                .window
                .map(|w| w.effective_date())
                .unwrap_or(NaiveDate::MAX);
            if eff > date {
                break;
            }
            *running.entry(claim.metric_id).or_insert(0.0) += claim.value;
            next += 1;
        }
        series.push(DailyPoint {
            date,
            values: running.clone(),
        });
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn claim(id: DbId, metric_id: DbId, value: f64, window: DateWindow) -> ClaimObservation {
        ClaimObservation {
            id,
            metric_id,
            value,
            window: Some(window),
        }
    }

    /// "People Trained": 50 on 2024-03-01, 30 over 2024-03-10..15.
    fn people_trained() -> Vec<ClaimObservation> {
        vec![
            claim(1, 7, 50.0, DateWindow::single(d(2024, 3, 1))),
            claim(2, 7, 30.0, DateWindow::range(d(2024, 3, 10), d(2024, 3, 15)).unwrap()),
        ]
    }

    #[test]
    fn explicit_window_totals_and_series() {
        let window = DateWindow::range(d(2024, 3, 1), d(2024, 3, 15)).unwrap();
        let agg = aggregate(
            &people_trained(),
            &[7],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 31),
        );

        assert_eq!(agg.totals[&7], 80.0);
        assert_eq!(agg.series.len(), 15);

        // The ranged claim counts fully at its end date, not before.
        let on_9th = &agg.series[8];
        assert_eq!(on_9th.date, d(2024, 3, 9));
        assert_eq!(on_9th.values[&7], 50.0);

        let on_15th = &agg.series[14];
        assert_eq!(on_15th.date, d(2024, 3, 15));
        assert_eq!(on_15th.values[&7], 80.0);
    }

    #[test]
    fn one_day_window_yields_one_point() {
        let claims = vec![
            claim(1, 7, 50.0, DateWindow::single(d(2024, 3, 1))),
            claim(2, 7, 30.0, DateWindow::single(d(2024, 3, 2))),
        ];
        let agg = aggregate(
            &claims,
            &[7],
            Some(DateWindow::single(d(2024, 3, 1))),
            LookbackPeriod::Last30Days,
            d(2024, 3, 31),
        );

        assert_eq!(agg.series.len(), 1);
        assert_eq!(agg.series[0].values[&7], 50.0);
        // Only claims effective inside the window survive.
        assert_eq!(agg.totals[&7], 50.0);
    }

    #[test]
    fn metric_with_no_surviving_claims_reports_zero() {
        let window = DateWindow::range(d(2024, 3, 1), d(2024, 3, 2)).unwrap();
        let agg = aggregate(
            &[],
            &[7, 8],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 31),
        );

        assert_eq!(agg.totals[&7], 0.0);
        assert_eq!(agg.totals[&8], 0.0);
        assert_eq!(agg.series.len(), 2);
        assert_eq!(agg.series[0].values[&7], 0.0);
    }

    #[test]
    fn series_never_extends_past_today() {
        let window = DateWindow::range(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
        let agg = aggregate(
            &people_trained(),
            &[7],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 10),
        );

        assert_eq!(agg.series.last().unwrap().date, d(2024, 3, 10));
        // The 30-value claim ends on the 15th, after today: absent from
        // the series but still in the total (it survived the window).
        assert_eq!(agg.series.last().unwrap().values[&7], 50.0);
        assert_eq!(agg.totals[&7], 80.0);
    }

    #[test]
    fn window_entirely_in_future_yields_empty_series() {
        let window = DateWindow::range(d(2024, 4, 1), d(2024, 4, 10)).unwrap();
        let agg = aggregate(
            &people_trained(),
            &[7],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 10),
        );
        assert!(agg.series.is_empty());
        assert_eq!(agg.totals[&7], 0.0);
    }

    #[test]
    fn lookback_window_is_anchored_at_today() {
        let agg = aggregate(&[], &[7], None, LookbackPeriod::Last30Days, d(2024, 3, 31));
        let w = agg.window.unwrap();
        assert_eq!(w.start(), d(2024, 3, 2));
        assert_eq!(w.end(), d(2024, 3, 31));
        assert_eq!(w.duration_days(), 30);
    }

    #[test]
    fn all_time_derives_start_from_earliest_claim() {
        let agg = aggregate(
            &people_trained(),
            &[7],
            None,
            LookbackPeriod::AllTime,
            d(2024, 3, 31),
        );
        let w = agg.window.unwrap();
        assert_eq!(w.start(), d(2024, 3, 1));
        assert_eq!(w.end(), d(2024, 3, 31));
        assert_eq!(agg.totals[&7], 80.0);
    }

    #[test]
    fn all_time_with_no_valid_claims_is_empty() {
        let agg = aggregate(&[], &[7], None, LookbackPeriod::AllTime, d(2024, 3, 31));
        assert!(agg.window.is_none());
        assert!(agg.series.is_empty());
        assert_eq!(agg.totals[&7], 0.0);
    }

    #[test]
    fn invalid_windows_are_skipped_and_reported() {
        let mut claims = people_trained();
        claims.push(ClaimObservation {
            id: 99,
            metric_id: 7,
            value: 1000.0,
            window: None,
        });
        let window = DateWindow::range(d(2024, 3, 1), d(2024, 3, 15)).unwrap();
        let agg = aggregate(
            &claims,
            &[7],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 31),
        );

        assert_eq!(agg.skipped, vec![99]);
        // The malformed claim contributes nothing.
        assert_eq!(agg.totals[&7], 80.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let claims = people_trained();
        let window = DateWindow::range(d(2024, 3, 1), d(2024, 3, 15)).unwrap();
        let first = aggregate(
            &claims,
            &[7],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 31),
        );
        let second = aggregate(
            &claims,
            &[7],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 31),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn claims_partition_by_metric() {
        let claims = vec![
            claim(1, 7, 50.0, DateWindow::single(d(2024, 3, 1))),
            claim(2, 8, 10.0, DateWindow::single(d(2024, 3, 2))),
        ];
        let window = DateWindow::range(d(2024, 3, 1), d(2024, 3, 5)).unwrap();
        let agg = aggregate(
            &claims,
            &[7, 8],
            Some(window),
            LookbackPeriod::Last30Days,
            d(2024, 3, 31),
        );

        assert_eq!(agg.totals[&7], 50.0);
        assert_eq!(agg.totals[&8], 10.0);
        let last = agg.series.last().unwrap();
        assert_eq!(last.values[&7], 50.0);
        assert_eq!(last.values[&8], 10.0);
    }
}
