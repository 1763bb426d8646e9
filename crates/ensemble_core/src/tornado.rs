//! Per-parameter correlations against a single result vector
//!
//! A tornado plot shows one bar per ensemble parameter, with the bar length
//! being that parameter's correlation with the chosen result at the chosen
//! time step.

use jiff::Timestamp;
use rustc_hash::FxHashMap;

use crate::accessor::sample_ensemble;
use crate::config::TornadoConfig;
use crate::layout::BarEntry;
use crate::model::{Ensemble, EnsembleParameter, ResultAddress, SummaryCase};
use crate::statistics::{correlation, is_valid};

/// Paired samples collected for one parameter
#[derive(Debug, Default)]
struct PairedSamples {
    parameter_values: Vec<f64>,
    result_values: Vec<f64>,
}

/// Correlation of each parameter with `address` at `config.time_step`.
///
/// Only numeric, valid parameters passing `config.selected_parameters` are
/// considered. Parameters without any case supplying both a parameter value and
/// a result value are left out; an undefined correlation is reported as `0.0`.
/// Output follows the order of `parameters`.
pub fn parameter_correlations<C: SummaryCase>(
    ensemble: &Ensemble<C>,
    address: &ResultAddress,
    parameters: &[EnsembleParameter],
    config: &TornadoConfig,
) -> Vec<(EnsembleParameter, f64)> {
    let candidates: Vec<&EnsembleParameter> = parameters
        .iter()
        .filter(|p| p.is_numeric() && p.is_valid() && config.is_selected(&p.name))
        .collect();

    let samples = sample_ensemble(
        ensemble,
        address,
        config.time_step,
        config.case_filter.as_ref(),
    );

    let mut paired: Vec<PairedSamples> = candidates
        .iter()
        .map(|_| PairedSamples::default())
        .collect();
    for sample in &samples {
        for (parameter, pairs) in candidates.iter().zip(paired.iter_mut()) {
            if let Some(value) = sample.case.numeric_parameter(&parameter.name) {
                pairs.parameter_values.push(value);
                pairs.result_values.push(sample.value);
            }
        }
    }

    let correlations: Vec<(EnsembleParameter, f64)> = candidates
        .into_iter()
        .zip(paired)
        .filter(|(_, pairs)| !pairs.parameter_values.is_empty())
        .map(|(parameter, pairs)| {
            let value = correlation(
                config.kind,
                &pairs.parameter_values,
                &pairs.result_values,
            );
            let value = if is_valid(value) { value } else { 0.0 };
            (parameter.clone(), value)
        })
        .collect();

    tracing::debug!(
        address = %address,
        cases = samples.len(),
        parameters = correlations.len(),
        "computed parameter correlations"
    );
    correlations
}

/// [`parameter_correlations`] ordered by magnitude, strongest first
pub fn correlation_sorted_parameters<C: SummaryCase>(
    ensemble: &Ensemble<C>,
    address: &ResultAddress,
    parameters: &[EnsembleParameter],
    config: &TornadoConfig,
) -> Vec<(EnsembleParameter, f64)> {
    let mut correlations = parameter_correlations(ensemble, address, parameters, config);
    correlations.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    correlations
}

/// Time steps used to average correlations over the whole simulation.
///
/// Picks every `max(1, n / 10)`-th time step, starting at that stride.
pub fn sampled_time_steps<C: SummaryCase>(ensemble: &Ensemble<C>) -> Vec<Timestamp> {
    let time_steps: Vec<Timestamp> = ensemble.time_steps().into_iter().collect();
    let stride = (time_steps.len() / 10).max(1);
    time_steps.into_iter().skip(stride).step_by(stride).collect()
}

/// Parameter correlations averaged over [`sampled_time_steps`]
pub fn parameter_correlations_all_time_steps<C: SummaryCase>(
    ensemble: &Ensemble<C>,
    address: &ResultAddress,
    parameters: &[EnsembleParameter],
    config: &TornadoConfig,
) -> Vec<(EnsembleParameter, f64)> {
    let time_steps = sampled_time_steps(ensemble);

    let mut totals: FxHashMap<String, (f64, usize)> = FxHashMap::default();
    for time_step in &time_steps {
        let step_config = TornadoConfig {
            time_step: *time_step,
            ..config.clone()
        };
        for (parameter, value) in
            parameter_correlations(ensemble, address, parameters, &step_config)
        {
            let total = totals.entry(parameter.name).or_insert((0.0, 0));
            total.0 += value;
            total.1 += 1;
        }
    }

    tracing::debug!(
        time_steps = time_steps.len(),
        parameters = totals.len(),
        "averaged correlations over time steps"
    );

    parameters
        .iter()
        .filter_map(|parameter| {
            let (sum, count) = totals.get(&parameter.name)?;
            Some((parameter.clone(), sum / *count as f64))
        })
        .collect()
}

/// Turn parameter correlations into tornado bars
pub fn bars_from_correlations(
    correlations: &[(EnsembleParameter, f64)],
    config: &TornadoConfig,
) -> Vec<BarEntry> {
    correlations
        .iter()
        .map(|(parameter, correlation)| {
            let value = if config.use_absolute_values {
                correlation.abs()
            } else {
                *correlation
            };
            let sort_value = if config.sort_by_absolute_values {
                value.abs()
            } else {
                value
            };
            let major_key = if config.group_by_variation {
                parameter.variation.label()
            } else {
                ""
            };
            BarEntry::new(
                major_key,
                "",
                "",
                sort_value,
                parameter.name.clone(),
                parameter.name.clone(),
                value,
            )
        })
        .collect()
}

/// One bar per parameter correlated with `address`
pub fn build_tornado_bars<C: SummaryCase>(
    ensemble: &Ensemble<C>,
    address: &ResultAddress,
    parameters: &[EnsembleParameter],
    config: &TornadoConfig,
) -> Vec<BarEntry> {
    let correlations = parameter_correlations(ensemble, address, parameters, config);
    bars_from_correlations(&correlations, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaseFilter, MemoryCase, VariationBin};
    use crate::statistics::CorrelationKind;

    fn ts(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    /// FOPT = 10·PERM at t=100, PORO = PERM², CONST has no spread
    fn ensemble() -> Ensemble {
        let cases = (0..5)
            .map(|i| {
                let perm = i as f64;
                let poro = (i * i) as f64;
                MemoryCase::new(format!("real-{i}"))
                    .with_series("FOPT", vec![ts(0), ts(100)], vec![0.0, 10.0 * perm])
                    .with_parameter("PERM", perm)
                    .with_parameter("PORO", poro)
                    .with_parameter("CONST", 1.0)
            })
            .collect();
        Ensemble::new("E", cases)
    }

    fn config() -> TornadoConfig {
        TornadoConfig::at(ts(100))
    }

    #[test]
    fn test_correlations_per_parameter() {
        let ensemble = ensemble();
        let parameters = ensemble.alphabetic_parameters();
        let result = parameter_correlations(&ensemble, &"FOPT".into(), &parameters, &config());

        let names: Vec<&str> = result.iter().map(|(p, _)| p.name.as_str()).collect();
        assert_eq!(names, vec!["CONST", "PERM", "PORO"]);
        // Constant parameter has no defined correlation
        assert_eq!(result[0].1, 0.0);
        assert!((result[1].1 - 1.0).abs() < 1e-12);
        assert!(result[2].1 > 0.9 && result[2].1 < 1.0);
    }

    #[test]
    fn test_selected_parameters_and_filter() {
        let ensemble = ensemble();
        let parameters = ensemble.alphabetic_parameters();
        let config = TornadoConfig {
            selected_parameters: vec!["PERM".to_string()],
            case_filter: Some(CaseFilter::new(["real-0", "real-4"])),
            ..config()
        };
        let result = parameter_correlations(&ensemble, &"FOPT".into(), &parameters, &config);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0.name, "PERM");
        assert!((result[0].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_address_gives_no_bars() {
        let ensemble = ensemble();
        let parameters = ensemble.alphabetic_parameters();
        assert!(build_tornado_bars(&ensemble, &"NOPE".into(), &parameters, &config()).is_empty());
    }

    #[test]
    fn test_text_parameters_are_skipped() {
        let cases = vec![
            MemoryCase::new("a")
                .with_series("FOPT", vec![ts(0)], vec![1.0])
                .with_text_parameter("FACIES", "sand"),
            MemoryCase::new("b")
                .with_series("FOPT", vec![ts(0)], vec![2.0])
                .with_text_parameter("FACIES", "shale"),
        ];
        let ensemble = Ensemble::new("E", cases);
        let parameters = ensemble.alphabetic_parameters();
        let config = TornadoConfig::at(ts(0));
        let result = parameter_correlations(&ensemble, &"FOPT".into(), &parameters, &config);
        assert!(result.is_empty());
    }

    #[test]
    fn test_bars_absolute_values() {
        let cases = [MemoryCase::new("a").with_parameter("PERM", 1.0)];
        let mut parameter = EnsembleParameter::from_cases("PERM", &cases);
        parameter.variation = VariationBin::HighVariation;
        let correlations = vec![(parameter, -0.6)];

        let bars = bars_from_correlations(&correlations, &config());
        assert_eq!(bars[0].value, -0.6);
        assert_eq!(bars[0].sort_value, 0.6);
        assert_eq!(bars[0].legend_key, "PERM");
        assert_eq!(bars[0].bar_label, "PERM");
        assert_eq!(bars[0].major_key, "");

        let absolute = TornadoConfig {
            use_absolute_values: true,
            sort_by_absolute_values: false,
            group_by_variation: true,
            ..config()
        };
        let bars = bars_from_correlations(&correlations, &absolute);
        assert_eq!(bars[0].value, 0.6);
        assert_eq!(bars[0].sort_value, 0.6);
        assert_eq!(bars[0].major_key, "High Variation");

        let signed = TornadoConfig {
            sort_by_absolute_values: false,
            ..config()
        };
        assert_eq!(bars_from_correlations(&correlations, &signed)[0].sort_value, -0.6);
    }

    #[test]
    fn test_correlation_sorted_parameters() {
        let ensemble = ensemble();
        let parameters = ensemble.alphabetic_parameters();
        let sorted =
            correlation_sorted_parameters(&ensemble, &"FOPT".into(), &parameters, &config());
        let names: Vec<&str> = sorted.iter().map(|(p, _)| p.name.as_str()).collect();
        assert_eq!(names, vec!["PERM", "PORO", "CONST"]);
    }

    #[test]
    fn test_sampled_time_steps_stride() {
        let steps: Vec<Timestamp> = (0..25).map(|i| ts(i * 10)).collect();
        let values = vec![0.0; 25];
        let case = MemoryCase::new("a").with_series("FOPT", steps.clone(), values);
        let ensemble = Ensemble::new("E", vec![case]);

        // stride 2: indices 2, 4, .., 24
        let sampled = sampled_time_steps(&ensemble);
        assert_eq!(sampled.len(), 12);
        assert_eq!(sampled[0], steps[2]);
        assert_eq!(sampled[11], steps[24]);

        let case = MemoryCase::new("a").with_series("FOPT", vec![ts(0)], vec![0.0]);
        let single = Ensemble::new("E", vec![case]);
        assert!(sampled_time_steps(&single).is_empty());

        let empty: Ensemble = Ensemble::new("E", vec![]);
        assert!(sampled_time_steps(&empty).is_empty());
    }

    #[test]
    fn test_all_time_steps_average_of_constant_correlation() {
        let steps: Vec<Timestamp> = (0..6).map(|i| ts(i * 10)).collect();
        let cases = (0..4)
            .map(|i| {
                let perm = i as f64;
                let values = (0..steps.len()).map(|t| (t as f64 + 1.0) * perm).collect();
                MemoryCase::new(format!("r{i}"))
                    .with_series("FOPT", steps.clone(), values)
                    .with_parameter("PERM", perm)
            })
            .collect();
        let ensemble = Ensemble::new("E", cases);
        let parameters = ensemble.alphabetic_parameters();

        let averaged = parameter_correlations_all_time_steps(
            &ensemble,
            &"FOPT".into(),
            &parameters,
            &TornadoConfig::default(),
        );
        assert_eq!(averaged.len(), 1);
        assert!((averaged[0].1 - 1.0).abs() < 1e-12);

        let empty: Ensemble = Ensemble::new("E", vec![]);
        let none = parameter_correlations_all_time_steps(
            &empty,
            &"FOPT".into(),
            &parameters,
            &TornadoConfig::default(),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_spearman_kind() {
        let ensemble = ensemble();
        let parameters = ensemble.alphabetic_parameters();
        let config = TornadoConfig {
            kind: CorrelationKind::Spearman,
            ..config()
        };
        let result = parameter_correlations(&ensemble, &"FOPT".into(), &parameters, &config);
        let poro = result.iter().find(|(p, _)| p.name == "PORO").unwrap();
        assert!((poro.1 - 1.0).abs() < 1e-12);
    }
}
