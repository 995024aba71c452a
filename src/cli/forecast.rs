use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_transactions;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::load_settings;

pub fn run(days: Option<u32>) -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let rows = get_transactions(&conn)?;

    if rows.len() < super::MIN_FORECAST_HISTORY {
        println!(
            "{}",
            format!(
                "Need at least {} transactions to forecast (have {}).",
                super::MIN_FORECAST_HISTORY,
                rows.len()
            )
            .yellow()
        );
        return Ok(());
    }

    let horizon = days.unwrap_or(settings.forecast_days);
    let ai = super::open_ai(&settings);
    let points = ai.forecast_balance(&rows, horizon);
    tracing::debug!(horizon, points = points.len(), "forecast computed");

    let mut table = Table::new();
    table.set_header(vec!["Date", "Predicted balance"]);
    for p in &points {
        table.add_row(vec![Cell::new(p.date), Cell::new(money(p.predicted_balance))]);
    }
    println!("Balance forecast ({horizon} days)\n{table}");
    super::guide(&settings, "The forecast learns from your day-by-day running balance; more history gives steadier projections.");
    Ok(())
}
