//! Portfolio command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tsmom_eval::{PerformanceSummary, PortfolioConfig, PortfolioResult, TsmomPortfolio};
use tsmom_signals::create_estimator;

use crate::config::ConfigArgs;
use crate::{OutputFormat, data};

/// Options of the illustrative portfolio.
#[derive(Debug, Clone)]
pub(crate) struct PortfolioArgs {
    /// Lookback in periods.
    pub(crate) lookback: usize,
    /// Annualized volatility target per position.
    pub(crate) target_vol: f64,
    /// One-way cost in basis points of turnover.
    pub(crate) cost_bps: f64,
    /// Restrict to one asset class.
    pub(crate) class: Option<String>,
}

/// Run the equal-weighted momentum portfolio on each asset class.
pub(crate) fn run_portfolio(
    config_args: &ConfigArgs,
    prices: Option<&Path>,
    seed: u64,
    args: &PortfolioArgs,
    format: OutputFormat,
) -> Result<()> {
    let sweep_config = config_args.resolve()?;
    let dataset = data::load_or_synthesize(prices, seed)?;

    let config = PortfolioConfig {
        target_vol: args.target_vol,
        transaction_cost_bps: args.cost_bps,
        ..PortfolioConfig::from_sweep(&sweep_config, args.lookback)
    };
    let portfolio = TsmomPortfolio::new(config);
    let estimator = create_estimator(&sweep_config, 0);

    let mut results: BTreeMap<&str, PortfolioResult> = BTreeMap::new();
    for (label, class) in dataset.classes() {
        if args.class.as_deref().is_some_and(|c| c != label.as_str()) {
            continue;
        }
        tracing::debug!(class = %label, "running portfolio");
        results.insert(label.as_str(), portfolio.run(class, estimator.as_ref()));
    }

    if results.is_empty() {
        anyhow::bail!(
            "No asset class matches '{}'. Available: {}",
            args.class.as_deref().unwrap_or_default(),
            dataset.labels().join(", ")
        );
    }

    match format {
        OutputFormat::Json => {
            let summaries: BTreeMap<&str, &PerformanceSummary> =
                results.iter().map(|(k, v)| (*k, &v.summary)).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Text => {
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║               Time-Series Momentum Portfolio                 ║");
            println!("╚══════════════════════════════════════════════════════════════╝\n");

            let config = portfolio.config();
            println!(
                "Lookback:    {} periods of {} days",
                config.lookback_periods, config.period_length
            );
            println!("Target vol:  {:.1}%", config.target_vol * 100.0);
            println!("Cost:        {} bps", config.transaction_cost_bps);
            println!("Estimator:   {}", estimator.name());
            println!();

            println!(
                "{:<12} {:>10} {:>10} {:>8} {:>10} {:>9} {:>6}",
                "class", "ann_ret", "ann_vol", "sharpe", "max_dd", "turnover", "rebal"
            );
            println!("{}", "-".repeat(71));
            for (label, result) in &results {
                println!("{}", format_summary(label, &result.summary));
            }
            println!();
        }
    }

    Ok(())
}

fn format_summary(label: &str, s: &PerformanceSummary) -> String {
    let pct = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v * 100.0));
    let num = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    format!(
        "{:<12} {:>10} {:>10} {:>8} {:>10} {:>9} {:>6}",
        label,
        pct(s.annualized_return),
        pct(s.annualized_volatility),
        num(s.sharpe_ratio),
        pct(s.max_drawdown),
        num(s.avg_turnover),
        s.n_rebalances
    )
}
