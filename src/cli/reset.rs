use dialoguer::Confirm;

use crate::db::clear_transactions;
use crate::error::{Result, WealthError};
use crate::settings::load_settings;

pub fn run(yes: bool) -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete ALL transactions? This cannot be undone")
            .default(false)
            .interact()
            .map_err(|e| WealthError::Other(format!("Confirmation failed: {e}")))?;
        if !confirmed {
            println!("Nothing deleted.");
            return Ok(());
        }
    }

    let deleted = clear_transactions(&conn)?;
    tracing::info!(deleted, "transactions cleared");
    println!("Database cleared ({deleted} transactions deleted).");
    Ok(())
}
