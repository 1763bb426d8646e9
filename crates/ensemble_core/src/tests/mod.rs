//! Scenario tests across the correlation and layout modules
//!
//! Tests are organized by topic:
//! - `correlation_matrix` - Matrix assembly from one or more ensembles
//! - `tornado_plot` - Tornado correlations through to bar positions
//! - `variation` - Variation classification feeding grouped layouts


use jiff::Timestamp;

use crate::model::{Ensemble, MemoryCase};

pub(crate) fn ts(second: i64) -> Timestamp {
    Timestamp::from_second(second).unwrap()
}

/// Build an ensemble where each case has one parameter value per name and one
/// two-step series per address. The first step is always zero.
pub(crate) fn ensemble_from_columns(
    name: &str,
    parameters: &[(&str, &[f64])],
    results: &[(&str, &[f64])],
) -> Ensemble {
    let case_count = parameters
        .iter()
        .map(|(_, values)| values.len())
        .chain(results.iter().map(|(_, values)| values.len()))
        .max()
        .unwrap_or(0);

    let cases = (0..case_count)
        .map(|i| {
            let mut case = MemoryCase::new(format!("{name}-{i}"));
            for (parameter, values) in parameters {
                case = case.with_parameter(*parameter, values[i]);
            }
            for (address, values) in results {
                case = case.with_series(*address, vec![ts(0), ts(100)], vec![0.0, values[i]]);
            }
            case
        })
        .collect();
    Ensemble::new(name, cases)
}
