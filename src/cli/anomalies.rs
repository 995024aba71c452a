use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_transactions;
use crate::error::Result;
use crate::fmt::{money, truncate};
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let rows = get_transactions(&conn)?;
    let anomalies = super::open_ai(&settings).detect_anomalies(&rows);

    if anomalies.is_empty() {
        println!("{}", "No unusual spending detected.".green());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category", "Typical", "Z-score"]);
    for a in &anomalies {
        let t = &a.transaction;
        table.add_row(vec![
            Cell::new(t.date),
            Cell::new(truncate(&t.description, 40)),
            Cell::new(money(t.amount)),
            Cell::new(t.category.as_deref().unwrap_or("")),
            Cell::new(money(a.category_mean)),
            Cell::new(format!("{:.2}", a.z_score)),
        ]);
    }
    println!("{}\n{table}", format!("{} unusual transactions", anomalies.len()).red().bold());
    super::guide(&settings, "Flagged rows are outflows far larger than usual for their category.");
    Ok(())
}
