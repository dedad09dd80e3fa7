//! Synthetic data command implementation.

use std::path::Path;

use anyhow::Result;

use crate::data::{self, SyntheticSpec};

/// Generate a synthetic long-format price file.
pub(crate) fn run_simulate(output: &Path, spec: &SyntheticSpec) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Synthetic Price Generator                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Instruments per class: {}", spec.instruments_per_class);
    println!("Trading days:          {}", spec.n_days);
    println!("Start date:            {}", spec.start);
    println!("Drift persistence:     {}", spec.persistence);
    println!("Trend strength:        {}", spec.trend_strength);
    println!("Gap rate:              {}", spec.gap_rate);
    println!("Seed:                  {}", spec.seed);
    println!();

    let mut frame = data::synthetic_frame(spec)?;
    data::write_csv(&mut frame, output)?;

    println!("Wrote {} rows to {}", frame.height(), output.display());
    println!();

    Ok(())
}
