use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::Select;

use crate::error::{Result, WealthError};
use crate::importer::{no_chooser, read_csv, standardize, ColumnMapping, Field};
use crate::settings::load_settings;

/// Lets the user pick a column the header guesser could not place.
fn prompt_column(field: Field, headers: &[String]) -> Result<usize> {
    Select::new()
        .with_prompt(format!("Which column is {}?", field.label()))
        .items(headers)
        .default(0)
        .interact()
        .map_err(|e| WealthError::Other(format!("Column selection cancelled: {e}")))
}

pub fn run(
    file: &str,
    date_col: Option<String>,
    desc_col: Option<String>,
    amount_col: Option<String>,
) -> Result<()> {
    let settings = load_settings();
    let mut conn = super::open_db(&settings)?;

    super::guide(&settings, "Columns are matched to Date, Description and Amount; pass --date-col/--desc-col/--amount-col to choose them yourself.");

    let table = read_csv(&PathBuf::from(file))?;
    let mapping = ColumnMapping {
        date: date_col,
        description: desc_col,
        amount: amount_col,
    };
    let cols = if std::io::stdin().is_terminal() {
        mapping.resolve(&table.headers, prompt_column)?
    } else {
        mapping.resolve(&table.headers, no_chooser)?
    };
    println!(
        "Mapping: Date \u{2190} '{}', Description \u{2190} '{}', Amount \u{2190} '{}'",
        table.headers[cols.date], table.headers[cols.description], table.headers[cols.amount]
    );

    let mut rows = standardize(&table, cols)?;

    super::guide(&settings, "The categorizer is guessing categories from descriptions (if it has been trained).");
    let mut ai = super::open_ai(&settings);
    let predicted = ai.predict_categories(&mut rows);

    let imported = crate::db::append_transactions(&mut conn, &rows)?;
    tracing::info!(imported, predicted, file, "import finished");

    println!("Imported {imported} transactions ({predicted} auto-categorized).");
    Ok(())
}
