use std::path::Path;

use crate::error::{Result, WealthError};
use crate::models::Transaction;

const HEADERS: [&str; 5] = ["date", "description", "amount", "category", "is_predicted"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(WealthError::Other(format!("Unknown export format: {other}"))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

pub fn export_transactions(rows: &[Transaction], path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match format {
        ExportFormat::Csv => write_csv(rows, path),
        ExportFormat::Xlsx => write_xlsx(rows, path),
    }
}

fn write_csv(rows: &[Transaction], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(HEADERS)?;
    for t in rows {
        wtr.write_record([
            t.date.format("%Y-%m-%d").to_string(),
            t.description.clone(),
            format!("{:.2}", t.amount),
            t.category.clone().unwrap_or_default(),
            u8::from(t.is_predicted).to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(feature = "xlsx")]
fn write_xlsx(rows: &[Transaction], path: &Path) -> Result<()> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");
    let sheet = workbook.add_worksheet();
    sheet.set_name("Data")?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, t) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, t.date.format("%Y-%m-%d").to_string())?;
        sheet.write_string(r, 1, t.description.as_str())?;
        sheet.write_number_with_format(r, 2, t.amount, &money)?;
        sheet.write_string(r, 3, t.category.as_deref().unwrap_or(""))?;
        sheet.write_boolean(r, 4, t.is_predicted)?;
    }
    workbook.save(path)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn write_xlsx(_rows: &[Transaction], _path: &Path) -> Result<()> {
    Err(WealthError::Other(
        "Spreadsheet export needs the `xlsx` feature; use --format csv".to_string(),
    ))
}
