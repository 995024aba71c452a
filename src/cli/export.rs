use std::path::PathBuf;

use chrono::Local;

use crate::db::get_transactions;
use crate::error::Result;
use crate::export::{export_transactions, ExportFormat};
use crate::settings::{load_settings, shellexpand_path};

pub fn run(output: Option<String>, format: &str) -> Result<()> {
    let format = ExportFormat::parse(format)?;
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let rows = get_transactions(&conn)?;

    let path = match output {
        Some(p) => PathBuf::from(shellexpand_path(&p)),
        None => settings.data_path().join("exports").join(format!(
            "wealthpath_data-{}.{}",
            Local::now().format("%Y-%m-%d"),
            format.extension()
        )),
    };

    export_transactions(&rows, &path, format)?;
    tracing::info!(rows = rows.len(), path = %path.display(), "exported");
    println!("Wrote {} transactions to {}", rows.len(), path.display());
    Ok(())
}
