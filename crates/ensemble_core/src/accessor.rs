//! Per-case scalar extraction at a chosen instant
//!
//! Correlations compare one scalar per case. That scalar is the sample whose
//! time step lies closest to the requested instant; no interpolation is done.

use jiff::{SignedDuration, Timestamp};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::model::{CaseFilter, Ensemble, ResultAddress, SummaryCase};

/// Absolute time distance between two instants
#[inline]
pub fn time_distance(a: Timestamp, b: Timestamp) -> SignedDuration {
    a.duration_since(b).abs()
}

/// Value of the sample closest in time to `target`.
///
/// The first sample wins ties: a later sample replaces the current pick only if
/// it is strictly closer. Returns `None` for an empty series. Only indices
/// present in both slices are considered.
pub fn nearest_value(time_steps: &[Timestamp], values: &[f64], target: Timestamp) -> Option<f64> {
    let mut closest: Option<(SignedDuration, f64)> = None;

    for (&time_step, &value) in time_steps.iter().zip(values) {
        let distance = time_distance(time_step, target);
        match closest {
            Some((best, _)) if distance >= best => {}
            _ => closest = Some((distance, value)),
        }
    }

    closest.map(|(_, value)| value)
}

/// Value of `address` for `case` at the time step closest to `target`.
///
/// `None` when the case cannot supply the series or the series is empty.
pub fn case_value_at<C: SummaryCase + ?Sized>(
    case: &C,
    address: &ResultAddress,
    target: Timestamp,
) -> Option<f64> {
    let values = case.values(address)?;
    nearest_value(case.time_steps(address), values, target)
}

/// A case paired with its sampled result value
#[derive(Debug)]
pub struct CaseSample<'a, C> {
    pub case: &'a C,
    pub value: f64,
}

/// Sample `address` at `target` for every case passing `filter`.
///
/// Cases without a finite value are skipped. Samples keep the ensemble's case
/// order regardless of how extraction is scheduled.
pub fn sample_ensemble<'a, C: SummaryCase>(
    ensemble: &'a Ensemble<C>,
    address: &ResultAddress,
    target: Timestamp,
    filter: Option<&CaseFilter>,
) -> Vec<CaseSample<'a, C>> {
    let cases: Vec<&'a C> = ensemble.filtered_cases(filter).map(|(_, case)| case).collect();

    let sample = |case: &'a C| {
        case_value_at(case, address, target)
            .filter(|value| value.is_finite())
            .map(|value| CaseSample { case, value })
    };

    #[cfg(feature = "parallel")]
    let samples: Vec<CaseSample<'a, C>> = cases.into_par_iter().filter_map(sample).collect();

    #[cfg(not(feature = "parallel"))]
    let samples: Vec<CaseSample<'a, C>> = cases.into_iter().filter_map(sample).collect();

    samples
}
