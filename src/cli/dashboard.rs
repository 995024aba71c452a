use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_transactions;
use crate::error::Result;
use crate::fmt::{money, money_colored, truncate};
use crate::models::Transaction;
use crate::reports::{balance_history, get_summary, spending_by_category};
use crate::settings::load_settings;

const HISTORY_DAYS: usize = 14;
const TOP_ANOMALIES: usize = 5;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let rows = get_transactions(&conn)?;

    if rows.is_empty() {
        println!("No transactions yet. Import a bank CSV with `wealthpath import <file>` or try `wealthpath demo`.");
        return Ok(());
    }

    let summary = get_summary(&rows);
    println!("{}", "Financial Health".bold());
    println!("  Net balance:     {}", money_colored(summary.net_balance));
    println!("  Total spending:  {}", money_colored(summary.total_spending));
    println!("  Transactions:    {} ({} auto-categorized)", summary.count, summary.predicted);
    println!();

    print_spending(&rows);
    print_history(&rows);

    let ai = super::open_ai(&settings);
    if rows.len() >= super::MIN_FORECAST_HISTORY {
        let points = ai.forecast_balance(&rows, settings.forecast_days);
        if let Some(last) = points.last() {
            println!(
                "{} {} by {}",
                "Forecast:".bold(),
                money_colored(last.predicted_balance),
                last.date
            );
            println!();
        }
    } else {
        super::guide(&settings, "Forecasts appear once you have at least 10 transactions.");
    }

    let anomalies = ai.detect_anomalies(&rows);
    if anomalies.is_empty() {
        println!("{}", "No unusual spending detected.".green());
    } else {
        println!("{}", format!("{} unusual transactions", anomalies.len()).red().bold());
        for a in anomalies.iter().take(TOP_ANOMALIES) {
            let t = &a.transaction;
            println!(
                "  {}  {:<32} {:>12}  (typical {})",
                t.date,
                truncate(&t.description, 32),
                money(t.amount),
                money(a.category_mean)
            );
        }
        if anomalies.len() > TOP_ANOMALIES {
            println!("  \u{2026} see `wealthpath anomalies` for all");
        }
    }
    Ok(())
}

fn print_spending(rows: &[Transaction]) {
    let items = spending_by_category(rows);
    if items.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Spent", "%", "Count"]);
    for item in &items {
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(money(item.total)),
            Cell::new(format!("{:.1}", item.pct)),
            Cell::new(item.count),
        ]);
    }
    println!("Spending by category\n{table}");
    println!();
}

fn print_history(rows: &[Transaction]) {
    let history = balance_history(rows, HISTORY_DAYS);
    if history.is_empty() {
        return;
    }
    println!("{}", "Recent balance".bold());
    for (date, balance) in &history {
        println!("  {date}  {:>14}", money(*balance));
    }
    println!();
}
