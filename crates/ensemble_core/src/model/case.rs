//! Case (realization) access
//!
//! `SummaryCase` is the read-only capability the correlation engine needs from a
//! single simulation run: its result series and its input parameter values.
//! `MemoryCase` is the in-memory implementation used by the CLI, tests and benches.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::address::ResultAddress;

/// Value of one input parameter for one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Numeric(f64),
    Text(String),
}

impl ParameterValue {
    /// Numeric value, if this is a finite number
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            ParameterValue::Numeric(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

/// Read-only access to one simulation case
pub trait SummaryCase: Send + Sync {
    /// Case name, unique within its ensemble
    fn name(&self) -> &str;

    /// All result addresses this case can supply
    fn addresses(&self) -> Vec<ResultAddress>;

    /// Values of a result series. `None` when the case has no reader for it.
    fn values(&self, address: &ResultAddress) -> Option<&[f64]>;

    /// Time steps of a result series; empty if unknown
    fn time_steps(&self, address: &ResultAddress) -> &[Timestamp];

    /// Names of the input parameters this case defines
    fn parameter_names(&self) -> Vec<String>;

    /// Value of an input parameter; `None` when the case does not define it
    fn parameter_value(&self, name: &str) -> Option<ParameterValue>;

    /// Convenience accessor for finite numeric parameter values
    fn numeric_parameter(&self, name: &str) -> Option<f64> {
        self.parameter_value(name)
            .and_then(|value| value.as_numeric())
    }
}

/// One result series: time steps and index-aligned values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarySeries {
    pub time_steps: Vec<Timestamp>,
    pub values: Vec<f64>,
}

impl SummarySeries {
    pub fn new(time_steps: Vec<Timestamp>, values: Vec<f64>) -> Self {
        Self { time_steps, values }
    }
}

/// A case held fully in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCase {
    pub name: String,
    #[serde(default)]
    pub series: BTreeMap<ResultAddress, SummarySeries>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

impl MemoryCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to attach a result series
    #[must_use]
    pub fn with_series(
        mut self,
        address: impl Into<ResultAddress>,
        time_steps: Vec<Timestamp>,
        values: Vec<f64>,
    ) -> Self {
        self.series
            .insert(address.into(), SummarySeries::new(time_steps, values));
        self
    }

    /// Builder-style helper to attach a numeric parameter
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters
            .insert(name.into(), ParameterValue::Numeric(value));
        self
    }

    /// Builder-style helper to attach a text parameter
    #[must_use]
    pub fn with_text_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.parameters
            .insert(name.into(), ParameterValue::Text(value.into()));
        self
    }
}

impl SummaryCase for MemoryCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn addresses(&self) -> Vec<ResultAddress> {
        self.series.keys().cloned().collect()
    }

    fn values(&self, address: &ResultAddress) -> Option<&[f64]> {
        self.series.get(address).map(|s| s.values.as_slice())
    }

    fn time_steps(&self, address: &ResultAddress) -> &[Timestamp] {
        self.series
            .get(address)
            .map(|s| s.time_steps.as_slice())
            .unwrap_or(&[])
    }

    fn parameter_names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    fn parameter_value(&self, name: &str) -> Option<ParameterValue> {
        self.parameters.get(name).cloned()
    }
}
