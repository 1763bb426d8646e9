//! Ensembles: ordered collections of simulation cases

use std::collections::BTreeSet;

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{EnsembleError, Result};

use super::address::ResultAddress;
use super::case::{MemoryCase, SummaryCase};
use super::parameter::{EnsembleParameter, NO_VARIATION_EPSILON, classify_variation};

/// Restricts a computation to a subset of an ensemble's cases, by case name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseFilter(pub FxHashSet<String>);

impl CaseFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, case_name: &str) -> bool {
        self.0.contains(case_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named collection of cases sharing result vectors and parameter names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ensemble<C = MemoryCase> {
    pub name: String,
    #[serde(default)]
    pub cases: Vec<C>,
}

impl<C: SummaryCase> Ensemble<C> {
    pub fn new(name: impl Into<String>, cases: Vec<C>) -> Self {
        Self {
            name: name.into(),
            cases,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[C] {
        &self.cases
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases passing the optional filter, paired with their index in `cases()`
    pub fn filtered_cases<'a, 'f>(
        &'a self,
        filter: Option<&'f CaseFilter>,
    ) -> impl Iterator<Item = (usize, &'a C)> + use<'a, 'f, C> {
        self.cases
            .iter()
            .enumerate()
            .filter(move |(_, case)| filter.is_none_or(|f| f.contains(case.name())))
    }

    /// Union of parameter names over all cases, in name order
    pub fn parameter_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for case in &self.cases {
            names.extend(case.parameter_names());
        }
        names
    }

    /// Snapshot of a single parameter. `None` if no case defines it.
    pub fn parameter(&self, name: &str) -> Option<EnsembleParameter> {
        let parameter = EnsembleParameter::from_cases(name, &self.cases);
        parameter.is_valid().then_some(parameter)
    }

    /// Like [`Ensemble::parameter`], but an unknown name is an error
    pub fn require_parameter(&self, name: &str) -> Result<EnsembleParameter> {
        self.parameter(name)
            .ok_or_else(|| EnsembleError::UnknownParameter(name.to_string()))
    }

    /// Check that at least one case can supply `address`
    pub fn require_address(&self, address: &ResultAddress) -> Result<()> {
        if self.cases.is_empty() {
            return Err(EnsembleError::EmptyEnsemble(self.name.clone()));
        }
        if self.cases.iter().any(|case| case.values(address).is_some()) {
            Ok(())
        } else {
            Err(EnsembleError::UnknownAddress(address.clone()))
        }
    }

    /// Union of result addresses over all cases
    pub fn addresses(&self) -> BTreeSet<ResultAddress> {
        self.cases.iter().flat_map(|case| case.addresses()).collect()
    }

    /// All parameters in alphabetic order
    pub fn alphabetic_parameters(&self) -> Vec<EnsembleParameter> {
        self.parameter_names()
            .iter()
            .map(|name| EnsembleParameter::from_cases(name, &self.cases))
            .collect()
    }

    /// All parameters, highest variation first, alphabetic within a variation bin
    pub fn variation_sorted_parameters(
        &self,
        exclude_no_variation: bool,
    ) -> Vec<EnsembleParameter> {
        let mut parameters = self.alphabetic_parameters();
        classify_variation(&mut parameters);

        if exclude_no_variation {
            parameters.retain(|p| p.normalized_std_deviation().abs() > NO_VARIATION_EPSILON);
        }
        parameters
    }

    /// Time steps of the ensemble.
    ///
    /// Taken from the case exposing the most result addresses, using the first
    /// of its addresses that has any time steps.
    pub fn time_steps(&self) -> BTreeSet<Timestamp> {
        let mut best: Option<(&C, Vec<_>)> = None;
        for case in &self.cases {
            let addresses = case.addresses();
            let more = best
                .as_ref()
                .is_none_or(|(_, best_addresses)| addresses.len() > best_addresses.len());
            if more && !addresses.is_empty() {
                best = Some((case, addresses));
            }
        }

        let Some((case, addresses)) = best else {
            return BTreeSet::new();
        };

        addresses
            .iter()
            .map(|address| case.time_steps(address))
            .find(|steps| !steps.is_empty())
            .map(|steps| steps.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    fn sample_ensemble() -> Ensemble {
        Ensemble::new(
            "Base",
            vec![
                MemoryCase::new("r0")
                    .with_series("FOPT", vec![ts(0), ts(10)], vec![1.0, 2.0])
                    .with_parameter("PERM", 100.0)
                    .with_parameter("PORO", 0.2),
                MemoryCase::new("r1")
                    .with_series("FOPT", vec![ts(0), ts(10), ts(20)], vec![1.0, 2.0, 3.0])
                    .with_series("FWPT", vec![ts(5)], vec![0.5])
                    .with_parameter("PERM", 200.0)
                    .with_parameter("PORO", 0.2)
                    .with_text_parameter("FACIES", "channel"),
            ],
        )
    }

    #[test]
    fn test_parameter_names_union() {
        let ensemble = sample_ensemble();
        let names: Vec<String> = ensemble.parameter_names().into_iter().collect();
        assert_eq!(names, vec!["FACIES", "PERM", "PORO"]);
    }

    #[test]
    fn test_parameter_lookup() {
        let ensemble = sample_ensemble();
        let perm = ensemble.parameter("PERM").unwrap();
        assert_eq!(perm.values, vec![100.0, 200.0]);
        assert!(ensemble.parameter("SWL").is_none());
    }

    #[test]
    fn test_require_lookups() {
        let ensemble = sample_ensemble();
        assert!(ensemble.require_parameter("PERM").is_ok());
        assert_eq!(
            ensemble.require_parameter("SWL"),
            Err(EnsembleError::UnknownParameter("SWL".to_string()))
        );
        assert!(ensemble.require_address(&ResultAddress::from("FWPT")).is_ok());
        assert!(matches!(
            ensemble.require_address(&ResultAddress::from("FGPT")),
            Err(EnsembleError::UnknownAddress(_))
        ));

        let empty: Ensemble = Ensemble::new("Empty", vec![]);
        assert!(matches!(
            empty.require_address(&ResultAddress::from("FOPT")),
            Err(EnsembleError::EmptyEnsemble(_))
        ));
        assert_eq!(ensemble.addresses().len(), 2);
    }

    #[test]
    fn test_variation_sorted_excludes_constant() {
        let ensemble = sample_ensemble();
        let all = ensemble.variation_sorted_parameters(false);
        assert_eq!(all.len(), 3);

        let varying = ensemble.variation_sorted_parameters(true);
        let names: Vec<&str> = varying.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["PERM"]);
    }

    #[test]
    fn test_filtered_cases() {
        let ensemble = sample_ensemble();
        assert_eq!(ensemble.filtered_cases(None).count(), 2);

        let filter = CaseFilter::new(["r1"]);
        let picked: Vec<(usize, &str)> = ensemble
            .filtered_cases(Some(&filter))
            .map(|(idx, case)| (idx, case.name()))
            .collect();
        assert_eq!(picked, vec![(1, "r1")]);
    }

    #[test]
    fn test_time_steps_from_richest_case() {
        let ensemble = sample_ensemble();
        let steps: Vec<Timestamp> = ensemble.time_steps().into_iter().collect();
        assert_eq!(steps, vec![ts(0), ts(10), ts(20)]);

        let empty: Ensemble = Ensemble::new("Empty", vec![MemoryCase::new("r0")]);
        assert!(empty.time_steps().is_empty());
    }
}
