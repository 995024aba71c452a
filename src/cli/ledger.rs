use comfy_table::{Cell, Table};

use crate::db::{category_exists, get_transactions, replace_transactions};
use crate::error::{Result, WealthError};
use crate::fmt::{money, truncate};
use crate::settings::load_settings;

pub fn list(limit: Option<usize>, predicted_only: bool) -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let rows = get_transactions(&conn)?;

    let mut numbered: Vec<(usize, &crate::models::Transaction)> = rows
        .iter()
        .enumerate()
        .map(|(i, t)| (i + 1, t))
        .filter(|(_, t)| !predicted_only || t.is_predicted)
        .collect();
    if let Some(n) = limit {
        let skip = numbered.len().saturating_sub(n);
        numbered.drain(..skip);
    }

    if numbered.is_empty() {
        println!("No transactions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Description", "Amount", "Category", "Predicted"]);
    for (n, t) in &numbered {
        table.add_row(vec![
            Cell::new(n),
            Cell::new(t.date),
            Cell::new(truncate(&t.description, 40)),
            Cell::new(money(t.amount)),
            Cell::new(t.category.as_deref().unwrap_or("")),
            Cell::new(if t.is_predicted { "*" } else { "" }),
        ]);
    }
    println!("Transactions\n{table}");
    super::guide(&settings, "Fix a category with `wealthpath ledger set <#> <category>`; the categorizer retrains on your corrections.");
    Ok(())
}

/// Edits one row, then saves the whole ledger back and retrains.
pub fn set(row: usize, category: &str, no_train: bool) -> Result<()> {
    let settings = load_settings();
    let mut conn = super::open_db(&settings)?;

    if !category_exists(&conn, category)? {
        return Err(WealthError::UnknownCategory(category.to_string()));
    }

    let mut rows = get_transactions(&conn)?;
    let total = rows.len();
    let target = row
        .checked_sub(1)
        .and_then(|i| rows.get_mut(i))
        .ok_or_else(|| WealthError::Other(format!("No row {row} (ledger has {total} rows)")))?;
    let previous = target.category.replace(category.to_string());
    target.is_predicted = false;
    let description = target.description.clone();

    replace_transactions(&mut conn, &rows)?;
    println!(
        "Row {row} '{description}': {} \u{2192} {category}",
        previous.as_deref().unwrap_or("(none)")
    );

    if !no_train {
        let mut ai = super::open_ai(&settings);
        let outcome = ai.train_categorizer(&rows)?;
        println!("Saved! {outcome}");
    }
    Ok(())
}
