//! Horizon sweep command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use tsmom_eval::{HorizonProfile, HorizonSweepRunner, RegressionResult, ResultsTable};
use tsmom_traits::{AssetClassDataset, SweepConfig};

use crate::config::ConfigArgs;
use crate::{OutputFormat, chart, data};

/// Run the horizon sweep and report every group.
pub(crate) fn run_sweep(
    config_args: &ConfigArgs,
    prices: Option<&Path>,
    seed: u64,
    format: OutputFormat,
    output: Option<&Path>,
    threshold: f64,
    show_chart: bool,
) -> Result<()> {
    let config = config_args.resolve()?;
    let dataset = data::load_or_synthesize(prices, seed)?;
    let runner = HorizonSweepRunner::new(config)?;
    let table = runner.run(&dataset)?;

    if let Some(dir) = output {
        export(&table, dir)?;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        OutputFormat::Text => {
            print_header(runner.config(), &dataset);
            for label in table.labels() {
                print_group(&table, label, threshold, show_chart);
            }
            for (label, message) in table.errors() {
                println!("Group {} aborted: {}", label, message);
            }
            println!();
        }
    }

    Ok(())
}

fn print_header(config: &SweepConfig, dataset: &AssetClassDataset) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                Time-Series Momentum Horizon Sweep            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Asset classes:  {}", dataset.labels().join(", "));
    println!("Instruments:    {}", dataset.n_instruments());
    println!(
        "Estimator:      {} (window {}, lag {})",
        config.vol_estimator_kind, config.vol_window, config.vol_lag
    );
    println!("Forward window: {} days", config.forward_window);
    println!(
        "Horizons:       1..={} x {} days",
        config.max_horizon, config.period_length
    );
    println!();
}

fn print_group(table: &ResultsTable, label: &str, threshold: f64, show_chart: bool) {
    let Some(results) = table.group(label) else {
        return;
    };

    println!("{}", label);
    println!("{}", "=".repeat(72));
    println!(
        "{:>4} {:>10} {:>10} {:>8} {:>8} {:>8} {:>8}",
        "h", "beta", "std_err", "t", "p", "n_obs", "dates"
    );
    println!("{}", "-".repeat(72));
    for r in results {
        println!("{}", format_row(r));
    }
    println!();

    if show_chart {
        println!("{}", chart::render_t_stats(label, results));
    }

    let profile = HorizonProfile::analyze(results, threshold);
    println!("Defined horizons:  {}/{}", profile.n_defined, results.len());
    println!("Momentum (t > {:.1}): {:?}", threshold, profile.momentum_horizons);
    println!("Reversal (t < -{:.1}): {:?}", threshold, profile.reversal_horizons);
    if let Some((h, t)) = profile.strongest {
        println!("Strongest:         h={} t={:+.2}", h, t);
    }
    match profile.crossover {
        Some(h) => println!("Beta turns negative at horizon {}", h),
        None => println!("Beta does not turn negative"),
    }
    println!();
}

fn format_row(r: &RegressionResult) -> String {
    let cell = |v: Option<f64>, precision: usize| match v {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    };
    format!(
        "{:>4} {:>10} {:>10} {:>8} {:>8} {:>8} {:>8}",
        r.horizon,
        cell(r.beta, 4),
        cell(r.std_error, 4),
        cell(r.t_stat, 2),
        cell(r.p_value, 3),
        r.n_obs,
        r.n_clusters
    )
}

/// Write `<group>.csv` for every group and the whole table as `results.json`.
fn export(table: &ResultsTable, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    for label in table.labels() {
        if let Some(mut frame) = table.to_frame(label)? {
            let path = dir.join(format!("{label}.csv"));
            data::write_csv(&mut frame, &path)?;
            tracing::info!(group = label, path = %path.display(), "wrote results");
        }
    }

    let path = dir.join("results.json");
    std::fs::write(&path, serde_json::to_string_pretty(table)?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
