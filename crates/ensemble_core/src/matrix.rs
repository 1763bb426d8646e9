//! Parameter × result-vector correlation matrix
//!
//! The matrix is assembled column-wise (one column per ensemble parameter),
//! filtered and sorted, then transposed into rows (one per result vector) and
//! filtered and sorted again. Each pass works on [`CorrelationMatrixEntry`]
//! values, whose cached `sum`/`abs_sum` drive both invalid-entry removal and
//! ordering.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::accessor::sample_ensemble;
use crate::config::CorrelationMatrixConfig;
use crate::error::MatrixError;
use crate::model::{Ensemble, EnsembleParameter, ResultAddress, ResultVectorKey, SummaryCase};
use crate::statistics::{INVALID, correlation, is_valid};

/// One row or column of a correlation matrix.
///
/// `correlations[i]` is the correlation between `key` and `paired_keys[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrixEntry<K, P> {
    pub key: K,
    pub correlations: Vec<f64>,
    pub paired_keys: Vec<P>,
    /// Sum of the valid correlations; `+inf` if there are none
    pub sum: f64,
    /// Sum of the absolute valid correlations; `+inf` if there are none
    pub abs_sum: f64,
}

impl<K, P> CorrelationMatrixEntry<K, P> {
    /// # Panics
    ///
    /// Panics if `correlations` and `paired_keys` differ in length.
    pub fn new(key: K, correlations: Vec<f64>, paired_keys: Vec<P>) -> Self {
        assert_eq!(
            correlations.len(),
            paired_keys.len(),
            "each correlation needs exactly one paired key"
        );

        let mut sum = 0.0;
        let mut abs_sum = 0.0;
        let mut any_valid = false;
        for &value in &correlations {
            if is_valid(value) {
                sum += value;
                abs_sum += value.abs();
                any_valid = true;
            }
        }
        if !any_valid {
            sum = INVALID;
            abs_sum = INVALID;
        }

        Self {
            key,
            correlations,
            paired_keys,
            sum,
            abs_sum,
        }
    }

    pub fn len(&self) -> usize {
        self.correlations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correlations.is_empty()
    }
}

/// Column of the matrix: one parameter against every result vector
pub type CorrelationMatrixColumn = CorrelationMatrixEntry<String, ResultVectorKey>;

/// Row of the matrix: one result vector against every parameter
pub type CorrelationMatrixRow = CorrelationMatrixEntry<ResultVectorKey, String>;

/// Drop entries without any valid correlation
pub fn erase_invalid_entries<K, P>(entries: &mut Vec<CorrelationMatrixEntry<K, P>>) {
    entries.retain(|entry| is_valid(entry.sum));
}

/// Stable sort, strongest first, by `abs_sum` or `sum`
pub fn sort_entries<K, P>(entries: &mut [CorrelationMatrixEntry<K, P>], by_absolute: bool) {
    if by_absolute {
        entries.sort_by(|a, b| b.abs_sum.total_cmp(&a.abs_sum));
    } else {
        entries.sort_by(|a, b| b.sum.total_cmp(&a.sum));
    }
}

/// Swap the roles of keys and paired keys.
///
/// Entry `r` of the result holds `matrix[i].correlations[r]` for every `i`, keyed
/// by the paired key shared at position `r`. All entries must have the same
/// length; an empty matrix transposes to an empty matrix.
pub fn transpose<K: Clone, P: Clone>(
    matrix: &[CorrelationMatrixEntry<K, P>],
) -> Result<Vec<CorrelationMatrixEntry<P, K>>, MatrixError> {
    if let Some(first) = matrix.first() {
        let expected = first.len();
        if let Some((column, entry)) = matrix
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.len() != expected)
        {
            return Err(MatrixError::RaggedMatrix {
                expected,
                found: entry.len(),
                column,
            });
        }
    }
    Ok(transpose_rectangular(matrix))
}

fn transpose_rectangular<K: Clone, P: Clone>(
    matrix: &[CorrelationMatrixEntry<K, P>],
) -> Vec<CorrelationMatrixEntry<P, K>> {
    let Some(first) = matrix.first() else {
        return Vec::new();
    };

    (0..first.len())
        .map(|row_idx| {
            let key = first.paired_keys[row_idx].clone();
            let correlations = matrix.iter().map(|col| col.correlations[row_idx]).collect();
            let paired_keys = matrix.iter().map(|col| col.key.clone()).collect();
            CorrelationMatrixEntry::new(key, correlations, paired_keys)
        })
        .collect()
}

/// Remove invalid entries, then optionally sort and truncate
fn filter_and_sort<K, P>(
    entries: &mut Vec<CorrelationMatrixEntry<K, P>>,
    sort: bool,
    by_absolute: bool,
    top_n: Option<usize>,
) {
    erase_invalid_entries(entries);
    if sort {
        sort_entries(entries, by_absolute);
        if let Some(n) = top_n {
            entries.truncate(n);
        }
    }
}

/// A result address bound to the ensemble whose cases supply it
#[derive(Debug)]
pub struct ResultVector<'a, C> {
    pub key: ResultVectorKey,
    pub ensemble: &'a Ensemble<C>,
}

impl<C> Clone for ResultVector<'_, C> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            ensemble: self.ensemble,
        }
    }
}

impl<'a, C: SummaryCase> ResultVector<'a, C> {
    pub fn new(ensemble: &'a Ensemble<C>, address: impl Into<ResultAddress>) -> Self {
        Self {
            key: ResultVectorKey::new(ensemble.name(), address),
            ensemble,
        }
    }

    pub fn address(&self) -> &ResultAddress {
        &self.key.address
    }
}

/// Final, filtered and sorted correlation matrix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    /// One row per result vector; columns follow each row's `paired_keys`
    pub rows: Vec<CorrelationMatrixRow>,
    /// Column index to parameter name
    pub parameter_labels: BTreeMap<usize, String>,
    /// Row index to result vector label
    pub result_labels: BTreeMap<usize, String>,
}

impl CorrelationMatrix {
    fn from_rows(rows: Vec<CorrelationMatrixRow>) -> Self {
        let mut parameter_labels = BTreeMap::new();
        let mut result_labels = BTreeMap::new();
        for (row_idx, row) in rows.iter().enumerate() {
            result_labels.insert(row_idx, row.key.label());
            for (col_idx, parameter) in row.paired_keys.iter().enumerate() {
                parameter_labels
                    .entry(col_idx)
                    .or_insert_with(|| parameter.clone());
            }
        }
        Self {
            rows,
            parameter_labels,
            result_labels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.parameter_labels.len()
    }

    /// Valid cells as `(row, column, correlation)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row_idx, row)| {
            row.correlations
                .iter()
                .enumerate()
                .filter(|(_, value)| is_valid(**value))
                .map(move |(col_idx, value)| (row_idx, col_idx, *value))
        })
    }

    /// Smallest and largest valid cell value
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells().fold(None, |range, (_, _, value)| match range {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
    }

    /// Tab-separated table: header of parameter names, one line per result vector
    pub fn as_text(&self) -> String {
        let mut text = String::new();
        for label in self.parameter_labels.values() {
            text.push('\t');
            text.push_str(label);
        }
        text.push('\n');

        for (row_idx, row) in self.rows.iter().enumerate() {
            text.push_str(self.result_labels.get(&row_idx).map_or("", String::as_str));
            for value in &row.correlations {
                text.push('\t');
                if is_valid(*value) {
                    let _ = write!(text, "{value:.3}");
                }
            }
            text.push('\n');
        }
        text
    }
}

/// Correlate every numeric parameter with every result vector.
///
/// Each case contributes one `(parameter value, result value)` pair per result
/// vector when both are available; the result value is sampled at the time step
/// closest to `config.time_step`. Columns without any valid correlation are
/// discarded, rows and columns are sorted and truncated per `config`, and no
/// all-invalid row or column survives.
pub fn build_correlation_matrix<C: SummaryCase>(
    result_vectors: &[ResultVector<'_, C>],
    parameters: &[EnsembleParameter],
    config: &CorrelationMatrixConfig,
) -> CorrelationMatrix {
    let filter = config.case_filter.as_ref();
    let samples: Vec<_> = result_vectors
        .iter()
        .map(|vector| sample_ensemble(vector.ensemble, vector.address(), config.time_step, filter))
        .collect();

    let mut columns: Vec<CorrelationMatrixColumn> = Vec::new();
    for parameter in parameters.iter().filter(|p| p.is_numeric() && p.is_valid()) {
        let mut correlations = Vec::with_capacity(result_vectors.len());
        let mut paired_keys = Vec::with_capacity(result_vectors.len());
        let mut any_valid = false;

        for (vector, vector_samples) in result_vectors.iter().zip(&samples) {
            let (parameter_values, result_values): (Vec<f64>, Vec<f64>) = vector_samples
                .iter()
                .filter_map(|sample| {
                    sample
                        .case
                        .numeric_parameter(&parameter.name)
                        .map(|p| (p, sample.value))
                })
                .unzip();

            let mut value = INVALID;
            if !parameter_values.is_empty() {
                value = correlation(config.kind, &parameter_values, &result_values);
                if is_valid(value) {
                    if config.use_absolute_values {
                        value = value.abs();
                    }
                    any_valid = true;
                }
            }
            correlations.push(value);
            paired_keys.push(vector.key.clone());
        }

        if any_valid {
            columns.push(CorrelationMatrixEntry::new(
                parameter.name.clone(),
                correlations,
                paired_keys,
            ));
        } else {
            tracing::trace!(parameter = %parameter.name, "no valid correlations, dropping column");
        }
    }

    let by_absolute = config.sorts_by_absolute();
    filter_and_sort(
        &mut columns,
        config.sort_mode.sorts_columns(),
        by_absolute,
        config.top_n,
    );

    let mut rows = transpose_rectangular(&columns);
    filter_and_sort(
        &mut rows,
        config.sort_mode.sorts_rows(),
        by_absolute,
        config.top_n,
    );

    let matrix = CorrelationMatrix::from_rows(rows);
    tracing::debug!(
        rows = matrix.row_count(),
        columns = matrix.column_count(),
        kind = ?config.kind,
        "built correlation matrix"
    );
    matrix
}
