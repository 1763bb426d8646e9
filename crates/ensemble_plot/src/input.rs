//! Ensemble input files
//!
//! An ensemble file is YAML of the form:
//!
//! ```yaml
//! name: pred
//! cases:
//!   - name: realization-0
//!     parameters:
//!       PERM: 120.0
//!       FACIES: sand
//!     series:
//!       FOPT:
//!         time_steps: ["2020-01-01T00:00:00Z", "2021-01-01T00:00:00Z"]
//!         values: [0.0, 1.5e6]
//! ```

use std::path::Path;

use color_eyre::eyre::{WrapErr, eyre};
use ensemble_core::Ensemble;

/// Parse an ensemble from YAML text.
///
/// Series whose time steps and values differ in length are rejected.
pub fn parse_ensemble(yaml: &str) -> color_eyre::Result<Ensemble> {
    let ensemble: Ensemble =
        serde_saphyr::from_str(yaml).wrap_err("failed to parse ensemble YAML")?;

    for case in ensemble.cases() {
        for (address, series) in &case.series {
            if series.time_steps.len() != series.values.len() {
                return Err(eyre!(
                    "case '{}': series '{}' has {} time steps but {} values",
                    case.name,
                    address,
                    series.time_steps.len(),
                    series.values.len()
                ));
            }
        }
    }

    tracing::debug!(
        ensemble = ensemble.name(),
        cases = ensemble.cases().len(),
        "parsed ensemble"
    );
    Ok(ensemble)
}

/// Read and parse an ensemble file
pub fn load_ensemble(path: &Path) -> color_eyre::Result<Ensemble> {
    let yaml = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    parse_ensemble(&yaml).wrap_err_with(|| format!("invalid ensemble file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_core::model::{ParameterValue, ResultAddress, SummaryCase};
    use tempfile::tempdir;

    const YAML: &str = r#"
name: pred
cases:
  - name: r0
    parameters:
      PERM: 100.0
      FACIES: sand
    series:
      FOPT:
        time_steps: ["2020-01-01T00:00:00Z", "2021-01-01T00:00:00Z"]
        values: [0.0, 10.0]
  - name: r1
    parameters:
      PERM: 200.0
    series:
      FOPT:
        time_steps: ["2020-01-01T00:00:00Z", "2021-01-01T00:00:00Z"]
        values: [0.0, 20.0]
"#;

    #[test]
    fn test_parse_ensemble() {
        let ensemble = parse_ensemble(YAML).unwrap();
        assert_eq!(ensemble.name(), "pred");
        assert_eq!(ensemble.cases().len(), 2);

        let r0 = &ensemble.cases()[0];
        assert_eq!(r0.numeric_parameter("PERM"), Some(100.0));
        assert_eq!(
            r0.parameter_value("FACIES"),
            Some(ParameterValue::Text("sand".to_string()))
        );
        assert_eq!(r0.values(&ResultAddress::from("FOPT")), Some(&[0.0, 10.0][..]));
        assert_eq!(ensemble.time_steps().len(), 2);
    }

    #[test]
    fn test_mismatched_series_rejected() {
        let yaml = r#"
name: bad
cases:
  - name: r0
    series:
      FOPT:
        time_steps: ["2020-01-01T00:00:00Z"]
        values: [0.0, 1.0]
"#;
        let err = parse_ensemble(yaml).unwrap_err();
        assert!(err.to_string().contains("FOPT"));
    }

    #[test]
    fn test_load_ensemble_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ensemble.yaml");
        std::fs::write(&path, YAML).unwrap();

        let ensemble = load_ensemble(&path).unwrap();
        assert_eq!(ensemble.parameter_names().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_ensemble(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
