//! Plot configuration types
//!
//! Each plot kind gets a plain, serde-friendly settings struct. The ensemble,
//! time step and filters are passed explicitly to the builders; nothing is
//! looked up from a surrounding object tree.

use std::collections::BTreeSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::model::{CaseFilter, Ensemble, SummaryCase};
use crate::statistics::CorrelationKind;

/// Which matrix axes are sorted by correlation strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixSortMode {
    None,
    Rows,
    Columns,
    #[default]
    Both,
}

impl MatrixSortMode {
    pub fn sorts_rows(&self) -> bool {
        matches!(self, MatrixSortMode::Rows | MatrixSortMode::Both)
    }

    pub fn sorts_columns(&self) -> bool {
        matches!(self, MatrixSortMode::Columns | MatrixSortMode::Both)
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MatrixSortMode::None => "No Sorting",
            MatrixSortMode::Rows => "Sort Rows",
            MatrixSortMode::Columns => "Sort Columns",
            MatrixSortMode::Both => "Sort Rows and Columns",
        }
    }
}

/// Settings for a parameter × result-vector correlation matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationMatrixConfig {
    pub kind: CorrelationKind,
    /// Instant at which each case's result value is sampled
    pub time_step: Timestamp,
    pub use_absolute_values: bool,
    pub sort_mode: MatrixSortMode,
    pub sort_by_absolute_values: bool,
    /// Keep only this many rows/columns along sorted axes
    pub top_n: Option<usize>,
    pub case_filter: Option<CaseFilter>,
}

impl Default for CorrelationMatrixConfig {
    fn default() -> Self {
        Self {
            kind: CorrelationKind::Pearson,
            time_step: Timestamp::UNIX_EPOCH,
            use_absolute_values: false,
            sort_mode: MatrixSortMode::Both,
            sort_by_absolute_values: true,
            top_n: None,
            case_filter: None,
        }
    }
}

impl CorrelationMatrixConfig {
    pub fn at(time_step: Timestamp) -> Self {
        Self {
            time_step,
            ..Default::default()
        }
    }

    /// Whether sorting uses `abs_sum` rather than `sum`
    pub fn sorts_by_absolute(&self) -> bool {
        self.sort_by_absolute_values || self.use_absolute_values
    }
}

/// Settings for a single-vector tornado plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TornadoConfig {
    pub kind: CorrelationKind,
    pub time_step: Timestamp,
    pub use_absolute_values: bool,
    pub sort_by_absolute_values: bool,
    /// Restrict to these parameter names; empty means all
    pub selected_parameters: Vec<String>,
    pub case_filter: Option<CaseFilter>,
    /// Show only the N bars with the largest magnitude
    pub show_only_top_n: Option<usize>,
    /// Order groups by the largest value they contain
    pub sort_groups_by_max: bool,
    /// Group bars under the variation bin of their parameter
    pub group_by_variation: bool,
}

impl Default for TornadoConfig {
    fn default() -> Self {
        Self {
            kind: CorrelationKind::Pearson,
            time_step: Timestamp::UNIX_EPOCH,
            use_absolute_values: false,
            sort_by_absolute_values: true,
            selected_parameters: Vec::new(),
            case_filter: None,
            show_only_top_n: None,
            sort_groups_by_max: false,
            group_by_variation: false,
        }
    }
}

impl TornadoConfig {
    pub fn at(time_step: Timestamp) -> Self {
        Self {
            time_step,
            ..Default::default()
        }
    }

    /// Whether a parameter passes the name selection
    pub fn is_selected(&self, parameter_name: &str) -> bool {
        self.selected_parameters.is_empty()
            || self.selected_parameters.iter().any(|p| p == parameter_name)
    }
}

/// A change to plot settings, as reported by a settings editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotSettingsChange {
    TimeStep,
    Parameters,
    Filter,
    Sorting,
    /// Titles, fonts and other presentation-only settings
    Display,
}

impl PlotSettingsChange {
    /// Whether the correlation data must be rebuilt after this change
    pub fn requires_recompute(&self) -> bool {
        !matches!(self, PlotSettingsChange::Display)
    }
}

/// Union of time steps across ensembles
pub fn available_time_steps<C: SummaryCase>(ensembles: &[&Ensemble<C>]) -> BTreeSet<Timestamp> {
    let mut union = BTreeSet::new();
    for ensemble in ensembles {
        union.extend(ensemble.time_steps());
    }
    union
}

/// Initial time step selection: the last available time step
pub fn default_time_step<C: SummaryCase>(ensembles: &[&Ensemble<C>]) -> Option<Timestamp> {
    available_time_steps(ensembles).last().copied()
}
