//! Estimator listing command implementation.

use anyhow::Result;
use tsmom_signals::registry::{available_estimators, get_estimator_info};
use tsmom_traits::SweepConfig;

/// List available volatility estimators, or describe one by name.
pub(crate) fn list_estimators(name: Option<String>, verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                Available Volatility Estimators               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let estimators = match name {
        Some(name) => match get_estimator_info(&name) {
            Some(info) => vec![info],
            None => anyhow::bail!("Unknown estimator '{}'. Expected rolling-std or ewma.", name),
        },
        None => available_estimators(),
    };

    let defaults = SweepConfig::default();
    for info in estimators {
        if verbose {
            println!(
                "  {:12} - {} (typical window: {} days)",
                info.name, info.description, info.typical_window
            );
        } else {
            println!("  {}", info.name);
        }
        if info.kind == defaults.vol_estimator_kind {
            println!("  {:12}   (default)", "");
        }
    }
    println!();

    if !verbose {
        println!("Use --verbose for detailed estimator descriptions.\n");
    }

    println!("Select one with --estimator or vol_estimator_kind in the config file.");
    println!();

    Ok(())
}
