//! Identifiers for result time series
//!
//! A `ResultAddress` names one series inside a case (e.g. `FOPT` or
//! `WOPR:OP_1`); a `ResultVectorKey` binds that address to an ensemble.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a result time series within a case
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultAddress(pub String);

impl ResultAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResultAddress {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

/// A result vector bound to the ensemble that produced it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultVectorKey {
    pub ensemble: String,
    pub address: ResultAddress,
}

impl ResultVectorKey {
    pub fn new(ensemble: impl Into<String>, address: impl Into<ResultAddress>) -> Self {
        Self {
            ensemble: ensemble.into(),
            address: address.into(),
        }
    }

    /// Display label used on matrix axes
    #[must_use]
    pub fn label(&self) -> String {
        if self.ensemble.is_empty() {
            self.address.to_string()
        } else {
            format!("{} ({})", self.address, self.ensemble)
        }
    }
}

impl fmt::Display for ResultVectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
