//! Ensemble parameter correlation library
//!
//! This crate correlates the input parameters of an ensemble of simulation
//! cases with the result vectors those cases produce, and lays the results out
//! for plotting. It supports:
//! - Per-case value extraction at the time step nearest a chosen instant
//! - Pearson and Spearman correlation with degenerate-input detection
//! - Parameter × result-vector correlation matrices with filtering, sorting and top-N
//! - Tornado (single result vector) correlations, optionally averaged over time
//! - Variation classification of ensemble parameters
//! - Grouped bar layout with major/mid/minor group ticks and legend series
//!
//! # Example
//!
//! ```ignore
//! use ensemble_core::{Ensemble, MemoryCase, ResultVector, CorrelationMatrixConfig};
//!
//! let ensemble = Ensemble::new("pred", cases);
//! let parameters = ensemble.alphabetic_parameters();
//! let vectors = [ResultVector::new(&ensemble, "FOPT")];
//! let config = CorrelationMatrixConfig::at(time_step);
//! let matrix = ensemble_core::build_correlation_matrix(&vectors, &parameters, &config);
//! println!("{}", matrix.as_text());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod accessor;
pub mod error;
pub mod layout;
pub mod matrix;
pub mod statistics;
pub mod tornado;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{CorrelationMatrixConfig, MatrixSortMode, PlotSettingsChange, TornadoConfig};
pub use error::{EnsembleError, MatrixError};
pub use layout::{BarEntry, GroupedAxisLayout, GroupedBarChartBuilder, layout_grouped_bars};
pub use matrix::{CorrelationMatrix, ResultVector, build_correlation_matrix};
pub use model::{
    CaseFilter, Ensemble, EnsembleParameter, MemoryCase, ResultAddress, ResultVectorKey,
    SummaryCase,
};
pub use statistics::CorrelationKind;
pub use tornado::{build_tornado_bars, parameter_correlations};
