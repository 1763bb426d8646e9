mod commands;
mod input;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ensemble_core::config::MatrixSortMode;
use ensemble_core::statistics::CorrelationKind;
use jiff::Timestamp;

use crate::commands::{MatrixOptions, TornadoOptions, run_matrix, run_time_steps, run_tornado};
use crate::input::load_ensemble;
use crate::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "ensemble-plot")]
#[command(about = "Correlate ensemble parameters with simulation results")]
struct Args {
    /// Ensemble description (YAML)
    #[arg(short, long)]
    ensemble: PathBuf,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Directory for the log file (default: ~/.ensemble_plot/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parameter × result-vector correlation matrix
    Matrix {
        /// Result vectors to include (default: all)
        #[arg(short, long = "address")]
        addresses: Vec<String>,

        /// Parameters to include (default: all)
        #[arg(short, long = "parameter")]
        parameters: Vec<String>,

        /// Time step, RFC 3339 (default: last)
        #[arg(short, long)]
        time: Option<Timestamp>,

        #[arg(short, long, value_enum, default_value_t = KindArg::Pearson)]
        kind: KindArg,

        /// Report absolute correlations
        #[arg(long)]
        abs: bool,

        #[arg(long, value_enum, default_value_t = SortArg::Both)]
        sort: SortArg,

        /// Keep only the strongest rows and columns
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Correlation of every parameter with one result vector
    Tornado {
        #[arg(short, long)]
        address: String,

        /// Time step, RFC 3339 (default: last)
        #[arg(short, long, conflicts_with = "all_time_steps")]
        time: Option<Timestamp>,

        #[arg(short, long, value_enum, default_value_t = KindArg::Pearson)]
        kind: KindArg,

        #[arg(long)]
        abs: bool,

        /// Show only the strongest bars
        #[arg(long)]
        top_n: Option<usize>,

        /// Average correlations over the whole simulation period
        #[arg(long)]
        all_time_steps: bool,

        /// Group bars by parameter variation
        #[arg(long)]
        group_by_variation: bool,
    },

    /// List the ensemble's time steps
    TimeSteps,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Pearson,
    Spearman,
}

impl From<KindArg> for CorrelationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pearson => CorrelationKind::Pearson,
            KindArg::Spearman => CorrelationKind::Spearman,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    None,
    Rows,
    Columns,
    Both,
}

impl From<SortArg> for MatrixSortMode {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::None => MatrixSortMode::None,
            SortArg::Rows => MatrixSortMode::Rows,
            SortArg::Columns => MatrixSortMode::Columns,
            SortArg::Both => MatrixSortMode::Both,
        }
    }
}

fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ensemble_plot")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let log_dir = args.log_dir.unwrap_or_else(default_log_dir);

    init_logging(&log_dir, &args.log_level)?;

    let ensemble = load_ensemble(&args.ensemble)?;
    tracing::info!(
        ensemble = ensemble.name(),
        cases = ensemble.cases().len(),
        path = %args.ensemble.display(),
        "loaded ensemble"
    );

    let output = match args.command {
        Command::Matrix {
            addresses,
            parameters,
            time,
            kind,
            abs,
            sort,
            top_n,
        } => run_matrix(
            &ensemble,
            &MatrixOptions {
                addresses,
                parameters,
                time,
                kind: kind.into(),
                absolute: abs,
                sort: sort.into(),
                top_n,
            },
        )?,
        Command::Tornado {
            address,
            time,
            kind,
            abs,
            top_n,
            all_time_steps,
            group_by_variation,
        } => run_tornado(
            &ensemble,
            &TornadoOptions {
                address,
                time,
                kind: kind.into(),
                absolute: abs,
                top_n,
                all_time_steps,
                group_by_variation,
            },
        )?,
        Command::TimeSteps => run_time_steps(&ensemble),
    };

    print!("{output}");
    tracing::info!("done");
    Ok(())
}
