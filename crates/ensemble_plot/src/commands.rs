//! Subcommand implementations
//!
//! Each command takes a loaded ensemble plus its options and returns the text to
//! print, so commands can be exercised without touching stdout.

use std::fmt::Write as _;

use color_eyre::eyre::eyre;
use ensemble_core::config::{
    CorrelationMatrixConfig, MatrixSortMode, TornadoConfig, default_time_step,
};
use ensemble_core::layout::{GroupLevel, GroupedBarChartBuilder};
use ensemble_core::matrix::{ResultVector, build_correlation_matrix};
use ensemble_core::model::{Ensemble, EnsembleParameter, ResultAddress};
use ensemble_core::statistics::CorrelationKind;
use ensemble_core::tornado::{
    bars_from_correlations, parameter_correlations, parameter_correlations_all_time_steps,
};
use jiff::Timestamp;

#[derive(Debug, Clone, Default)]
pub struct MatrixOptions {
    pub addresses: Vec<String>,
    pub parameters: Vec<String>,
    pub time: Option<Timestamp>,
    pub kind: CorrelationKind,
    pub absolute: bool,
    pub sort: MatrixSortMode,
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct TornadoOptions {
    pub address: String,
    pub time: Option<Timestamp>,
    pub kind: CorrelationKind,
    pub absolute: bool,
    pub top_n: Option<usize>,
    pub all_time_steps: bool,
    pub group_by_variation: bool,
}

/// Requested time step, or the last one the ensemble has
fn resolve_time_step(
    ensemble: &Ensemble,
    requested: Option<Timestamp>,
) -> color_eyre::Result<Timestamp> {
    match requested {
        Some(time) => Ok(time),
        None => default_time_step(&[ensemble])
            .ok_or_else(|| eyre!("ensemble '{}' has no time steps", ensemble.name())),
    }
}

/// Named parameters, or every parameter when none are named
fn resolve_parameters(
    ensemble: &Ensemble,
    names: &[String],
) -> color_eyre::Result<Vec<EnsembleParameter>> {
    if names.is_empty() {
        return Ok(ensemble.alphabetic_parameters());
    }
    let parameters = names
        .iter()
        .map(|name| ensemble.require_parameter(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parameters)
}

pub fn run_matrix(ensemble: &Ensemble, options: &MatrixOptions) -> color_eyre::Result<String> {
    let time_step = resolve_time_step(ensemble, options.time)?;
    let parameters = resolve_parameters(ensemble, &options.parameters)?;

    let addresses: Vec<ResultAddress> = if options.addresses.is_empty() {
        ensemble.addresses().into_iter().collect()
    } else {
        let addresses: Vec<ResultAddress> = options
            .addresses
            .iter()
            .map(|a| ResultAddress::from(a.as_str()))
            .collect();
        for address in &addresses {
            ensemble.require_address(address)?;
        }
        addresses
    };

    let vectors: Vec<ResultVector<'_, _>> = addresses
        .into_iter()
        .map(|address| ResultVector::new(ensemble, address))
        .collect();

    let config = CorrelationMatrixConfig {
        kind: options.kind,
        use_absolute_values: options.absolute,
        sort_mode: options.sort,
        top_n: options.top_n,
        ..CorrelationMatrixConfig::at(time_step)
    };

    tracing::info!(
        vectors = vectors.len(),
        parameters = parameters.len(),
        time_step = %time_step,
        "building correlation matrix"
    );
    let matrix = build_correlation_matrix(&vectors, &parameters, &config);

    let mut text = format!("# {} at {}\n", options.kind.label(), time_step);
    if matrix.is_empty() {
        text.push_str("# no valid correlations\n");
        return Ok(text);
    }
    text.push_str(&matrix.as_text());
    Ok(text)
}

pub fn run_tornado(ensemble: &Ensemble, options: &TornadoOptions) -> color_eyre::Result<String> {
    let address = ResultAddress::from(options.address.as_str());
    ensemble.require_address(&address)?;

    // Parameters without variation cannot correlate and would only add empty bars
    let parameters = ensemble.variation_sorted_parameters(true);

    let mut config = TornadoConfig {
        kind: options.kind,
        use_absolute_values: options.absolute,
        show_only_top_n: options.top_n,
        sort_groups_by_max: options.group_by_variation,
        group_by_variation: options.group_by_variation,
        ..TornadoConfig::default()
    };

    let mut text = String::new();
    let correlations = if options.all_time_steps {
        let _ = writeln!(text, "# {} averaged over time", options.kind.label());
        parameter_correlations_all_time_steps(ensemble, &address, &parameters, &config)
    } else {
        config.time_step = resolve_time_step(ensemble, options.time)?;
        let _ = writeln!(text, "# {} at {}", options.kind.label(), config.time_step);
        parameter_correlations(ensemble, &address, &parameters, &config)
    };

    let mut builder = GroupedBarChartBuilder::new(config.sort_groups_by_max);
    for bar in bars_from_correlations(&correlations, &config) {
        builder.push(bar);
    }
    let layout = builder.layout(config.show_only_top_n);

    tracing::info!(
        address = %address,
        bars = layout.bars.len(),
        "built tornado layout"
    );

    text.push_str(&builder.plot_content_as_text());
    text.push_str("\nPosition\tSeries\tValue\n");
    for bar in &layout.bars {
        let _ = writeln!(
            text,
            "{:.2}\t{}\t{:.4}",
            bar.position, layout.series[bar.series].legend_key, bar.value
        );
    }
    let groups: Vec<_> = layout.ticks_at(GroupLevel::Major).collect();
    if !groups.is_empty() {
        text.push_str("\nGroup\tPosition\n");
        for tick in groups {
            let _ = writeln!(text, "{}\t{:.2}", tick.label, tick.position);
        }
    }
    Ok(text)
}

pub fn run_time_steps(ensemble: &Ensemble) -> String {
    let mut text = String::new();
    for time_step in ensemble.time_steps() {
        let _ = writeln!(text, "{time_step}");
    }
    text
}
