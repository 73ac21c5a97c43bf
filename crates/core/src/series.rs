//! Chart axis derivation for cumulative series (PRD-12).
//!
//! Pure numeric-formatting layer: given the aggregated series and the set
//! of metrics currently visible on the chart, derives the axis ceiling
//! (with magnitude-proportional headroom) and a small set of tick values
//! that always includes the true maximum.

use serde::Serialize;

use crate::aggregate::DailyPoint;
use crate::types::DbId;

/// Number of evenly spaced base ticks (including zero and the ceiling).
const BASE_TICKS: usize = 5;

/// The true maximum merges into an existing tick when it lies within
/// this fraction of a tick step; otherwise it is inserted as its own tick.
const MERGE_FRACTION: f64 = 0.1;

/// Axis ceiling and tick values for chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisBounds {
    pub ceiling: f64,
    pub ticks: Vec<f64>,
}

/// Compute axis bounds for the series values of the visible metrics.
///
/// Headroom above the maximum is proportional to its magnitude: 20%
/// below 100, 15% below 1,000, 12% below 10,000, 10% at or above.
pub fn axis_bounds(series: &[DailyPoint], visible_metric_ids: &[DbId]) -> AxisBounds {
    let max = series
        .iter()
        .flat_map(|point| {
            visible_metric_ids
                .iter()
                .filter_map(|id| point.values.get(id).copied())
        })
        .fold(0.0_f64, f64::max);
    bounds_for_max(max)
}

/// Axis bounds for a known series maximum.
pub fn bounds_for_max(max: f64) -> AxisBounds {
    if max <= 0.0 {
        // Empty chart: a unit axis keeps the renderer from dividing by zero.
        return AxisBounds {
            ceiling: 1.0,
            ticks: vec![0.0, 0.25, 0.5, 0.75, 1.0],
        };
    }

    let headroom = if max < 100.0 {
        1.20
    } else if max < 1_000.0 {
        1.15
    } else if max < 10_000.0 {
        1.12
    } else {
        1.10
    };
    let ceiling = max * headroom;

    let step = ceiling / (BASE_TICKS - 1) as f64;
    let mut ticks: Vec<f64> = (0..BASE_TICKS).map(|i| i as f64 * step).collect();

    // The true maximum is always present: merged into the nearest tick
    // when close enough, inserted otherwise.
    let nearest = ticks
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - max).abs().partial_cmp(&(*b - max).abs()).unwrap()
        })
        .map(|(i, _)| i)
        .unwrap();
    if (ticks[nearest] - max).abs() <= MERGE_FRACTION * step {
        ticks[nearest] = max;
    } else {
        ticks.push(max);
        ticks.sort_by(|a, b| a.partial_cmp(b).unwrap());
    }
    ticks.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON * 4.0);

    AxisBounds { ceiling, ticks }
}
