//! tsmom CLI binary.
//!
//! Runs time-series momentum horizon sweeps from the command line.

mod chart;
mod cmd;
mod config;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::cmd::estimators::list_estimators;
use crate::cmd::portfolio::{PortfolioArgs, run_portfolio};
use crate::cmd::simulate::run_simulate;
use crate::cmd::sweep::run_sweep;
use crate::config::ConfigArgs;
use crate::data::SyntheticSpec;

#[derive(Parser)]
#[command(name = "tsmom")]
#[command(about = "Time-series momentum across lookback horizons", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Report format on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Tables and charts
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List available volatility estimators
    Estimators {
        /// Describe one estimator
        name: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a synthetic price file
    Simulate {
        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Instruments per asset class
        #[arg(short, long, default_value = "6")]
        instruments: usize,

        /// Trading days per instrument
        #[arg(short, long, default_value = "5040")]
        days: usize,

        /// First trading day (YYYY-MM-DD)
        #[arg(long, default_value = "2000-01-03")]
        start: String,

        /// Daily persistence of instrument drift
        #[arg(long, default_value = "0.995")]
        persistence: f64,

        /// Drift size relative to daily volatility
        #[arg(long, default_value = "0.08")]
        trend: f64,

        /// Probability of a missing price
        #[arg(long, default_value = "0.0")]
        gap_rate: f64,

        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Regress scaled forward returns on scaled lagged returns for every horizon
    Sweep {
        #[command(flatten)]
        config: ConfigArgs,

        /// Long-format price CSV (date,asset_class,instrument,price); synthetic if omitted
        #[arg(short, long)]
        prices: Option<PathBuf>,

        /// Seed of the synthetic data
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Directory for per-group CSV and JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// |t| above which a horizon counts as significant
        #[arg(short, long, default_value = "2.0")]
        threshold: f64,

        /// Skip the t-statistic chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Run the equal-weighted momentum portfolio per asset class
    Portfolio {
        #[command(flatten)]
        config: ConfigArgs,

        /// Long-format price CSV; synthetic if omitted
        #[arg(short, long)]
        prices: Option<PathBuf>,

        /// Seed of the synthetic data
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Lookback in periods
        #[arg(short, long, default_value = "12")]
        lookback: usize,

        /// Annualized volatility target per position
        #[arg(long, default_value = "0.40")]
        target_vol: f64,

        /// Cost in basis points of turnover
        #[arg(long, default_value = "0.0")]
        cost_bps: f64,

        /// Only this asset class
        #[arg(long)]
        class: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Estimators { name, verbose } => {
            list_estimators(name, verbose)?;
        }
        Commands::Simulate {
            output,
            instruments,
            days,
            start,
            persistence,
            trend,
            gap_rate,
            seed,
        } => {
            let spec = SyntheticSpec {
                instruments_per_class: instruments,
                n_days: days,
                start: data::parse_date(&start)?,
                persistence,
                trend_strength: trend,
                gap_rate,
                seed,
            };
            run_simulate(&output, &spec)?;
        }
        Commands::Sweep {
            config,
            prices,
            seed,
            format,
            output,
            threshold,
            no_chart,
        } => {
            run_sweep(
                &config,
                prices.as_deref(),
                seed,
                format,
                output.as_deref(),
                threshold,
                !no_chart,
            )?;
        }
        Commands::Portfolio {
            config,
            prices,
            seed,
            lookback,
            target_vol,
            cost_bps,
            class,
            format,
        } => {
            let args = PortfolioArgs {
                lookback,
                target_vol,
                cost_bps,
                class,
            };
            run_portfolio(&config, prices.as_deref(), seed, &args, format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tsmom_traits::VolatilityKind;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sweep() {
        let cli = Cli::try_parse_from([
            "tsmom",
            "sweep",
            "--prices",
            "prices.csv",
            "--estimator",
            "rolling-std",
            "-H",
            "24",
            "--format",
            "json",
            "--no-chart",
        ])
        .unwrap();

        let Commands::Sweep {
            config,
            prices,
            format,
            no_chart,
            threshold,
            ..
        } = cli.command
        else {
            panic!("expected sweep");
        };
        assert_eq!(prices, Some(PathBuf::from("prices.csv")));
        assert_eq!(config.estimator, Some(VolatilityKind::RollingStd));
        assert_eq!(config.max_horizon, Some(24));
        assert_eq!(format, OutputFormat::Json);
        assert!(no_chart);
        assert!((threshold - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_unknown_estimator() {
        let result = Cli::try_parse_from(["tsmom", "sweep", "--estimator", "garch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_portfolio_defaults() {
        let cli = Cli::try_parse_from(["tsmom", "portfolio", "--class", "equity"]).unwrap();
        let Commands::Portfolio {
            lookback,
            class,
            prices,
            seed,
            ..
        } = cli.command
        else {
            panic!("expected portfolio");
        };
        assert_eq!(lookback, 12);
        assert_eq!(class.as_deref(), Some("equity"));
        assert!(prices.is_none());
        assert_eq!(seed, 42);
    }

    #[test]
    fn test_parse_simulate_requires_output() {
        assert!(Cli::try_parse_from(["tsmom", "simulate"]).is_err());
        assert!(Cli::try_parse_from(["tsmom", "simulate", "-o", "prices.csv"]).is_ok());
    }
}
