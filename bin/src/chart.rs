//! Text bar chart of t-statistics across horizons.

use std::fmt::Write;

use tsmom_eval::RegressionResult;

/// Half-width of the bar area in characters.
const HALF_WIDTH: usize = 30;

/// Reference level drawn on both sides of zero.
const REFERENCE_T: f64 = 2.0;

/// Column of `t` on a `2 * HALF_WIDTH + 1` axis scaled to `t_max`.
fn column(t: f64, t_max: f64) -> usize {
    let offset = (t / t_max * HALF_WIDTH as f64).round();
    let offset = offset.clamp(-(HALF_WIDTH as f64), HALF_WIDTH as f64) as isize;
    (HALF_WIDTH as isize + offset) as usize
}

/// Render one horizontal bar per horizon, zero in the middle and dotted
/// lines at t = ±2.
///
/// Undefined horizons get an empty row marked `n/a`.
pub(crate) fn render_t_stats(label: &str, results: &[RegressionResult]) -> String {
    let t_max = results
        .iter()
        .filter_map(|r| r.t_stat)
        .fold(REFERENCE_T + 1.0, |acc, t| acc.max(t.abs()));

    let width = 2 * HALF_WIDTH + 1;
    let centre = HALF_WIDTH;
    let lower = column(-REFERENCE_T, t_max);
    let upper = column(REFERENCE_T, t_max);

    let mut out = String::new();
    let _ = writeln!(out, "t-statistic by horizon: {label}");
    let _ = writeln!(out, "{}", "-".repeat(width + 16));

    for result in results {
        let mut cells = vec![' '; width];
        cells[lower] = ':';
        cells[upper] = ':';

        let value = match result.t_stat {
            Some(t) => {
                let end = column(t, t_max);
                let (from, to) = if end < centre { (end, centre) } else { (centre + 1, end + 1) };
                for cell in &mut cells[from..to] {
                    *cell = '█';
                }
                format!("{t:>+7.2}")
            }
            None => format!("{:>7}", "n/a"),
        };
        cells[centre] = '│';

        let bar: String = cells.into_iter().collect();
        let _ = writeln!(out, "{:>4} {value} {bar}", result.horizon);
    }

    let mut axis = vec![' '; width];
    axis[lower] = '-';
    axis[centre] = '0';
    axis[upper] = '+';
    let axis: String = axis.into_iter().collect();
    let _ = writeln!(out, "{:>4} {:>7} {axis}", "h", "t");
    let _ = writeln!(out, "scale: ±{t_max:.2}, dotted lines at t = ±{REFERENCE_T}");

    out
}
