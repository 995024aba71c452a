use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::{Result, WealthError};
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| -v);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// Two-digit years first: "%Y" would happily read "25" as year 25.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Offset timestamps keep the date as written, not the UTC date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
        .or_else(|| DATE_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(raw, f).ok()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| chrono::NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Which source columns hold the date, description and amount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnIndices {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Date,
    Description,
    Amount,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Description => "Description",
            Self::Amount => "Amount",
        }
    }

    fn hints(&self) -> &'static [&'static str] {
        match self {
            Self::Date => &["date", "posted", "posting"],
            Self::Description => &["description", "desc", "payee", "memo", "narrative", "details", "merchant"],
            Self::Amount => &["amount", "amt", "value"],
        }
    }

    /// Best header for this field: exact match on a hint, then substring.
    pub fn guess(&self, headers: &[String]) -> Option<usize> {
        let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let hints = self.hints();
        lower
            .iter()
            .position(|h| hints.contains(&h.as_str()))
            .or_else(|| lower.iter().position(|h| hints.iter().any(|hint| h.contains(hint))))
    }
}

fn find_header(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name.trim())
        .or_else(|| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name.trim())))
        .ok_or_else(|| WealthError::MissingColumn(name.to_string()))
}

impl ColumnMapping {
    /// Resolves named columns, guessing the rest; `choose` is asked for any
    /// field that cannot be guessed.
    pub fn resolve<F>(&self, headers: &[String], mut choose: F) -> Result<ColumnIndices>
    where
        F: FnMut(Field, &[String]) -> Result<usize>,
    {
        let mut pick = |field: Field, named: &Option<String>| -> Result<usize> {
            match named {
                Some(name) => find_header(headers, name),
                None => match field.guess(headers) {
                    Some(i) => Ok(i),
                    None => choose(field, headers),
                },
            }
        };
        Ok(ColumnIndices {
            date: pick(Field::Date, &self.date)?,
            description: pick(Field::Description, &self.description)?,
            amount: pick(Field::Amount, &self.amount)?,
        })
    }
}

/// Fails for any field that would need a human to pick it.
pub fn no_chooser(field: Field, _headers: &[String]) -> Result<usize> {
    Err(WealthError::MissingColumn(field.label().to_string()))
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
}

/// Reads the whole CSV up front; malformed CSV fails here.
pub fn read_csv(file_path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(RawTable { headers, records })
}

/// Turns raw records into standardized transactions. Any unparseable date or
/// amount rejects the whole table.
pub fn standardize(table: &RawTable, cols: ColumnIndices) -> Result<Vec<Transaction>> {
    let mut rows = Vec::with_capacity(table.records.len());
    for record in &table.records {
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        // Header is line 1.
        let line = record.position().map_or(0, |p| p.line());
        let field = |i: usize| record.get(i).unwrap_or("");

        let date = parse_date(field(cols.date)).ok_or_else(|| WealthError::InvalidRow {
            line,
            reason: format!("unrecognized date '{}'", field(cols.date)),
        })?;
        let amount = parse_amount(field(cols.amount)).ok_or_else(|| WealthError::InvalidRow {
            line,
            reason: format!("unrecognized amount '{}'", field(cols.amount)),
        })?;
        rows.push(Transaction::imported(date, field(cols.description).trim(), amount));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn write_csv(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("bank.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("\"500.00\""), Some(500.0));
        assert_eq!(parse_amount("  -42.50  "), Some(-42.5));
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("-$50.00"), Some(-50.0));
        assert_eq!(parse_amount("(1,234.56)"), Some(-1234.56));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("nan"), None);
        assert_eq!(parse_amount("(nan)"), None);
        assert_eq!(parse_amount("(inf)"), None);
        assert_eq!(parse_amount("(-infinity)"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let jan15 = NaiveDate::from_ymd_opt(2025, 1, 15);
        assert_eq!(parse_date("2025-01-15"), jan15);
        assert_eq!(parse_date("01/15/2025"), jan15);
        assert_eq!(parse_date("01/15/25"), jan15);
        assert_eq!(parse_date("2025/01/15"), jan15);
        assert_eq!(parse_date("15.01.2025"), jan15);
        assert_eq!(parse_date("2025-01-15 08:30:00"), jan15);
        assert_eq!(parse_date("2025-01-15T08:30:00"), jan15);
        assert_eq!(parse_date("2025-01-15T08:30:00Z"), jan15);
        assert_eq!(parse_date("2025-01-15T08:30:00.123"), jan15);
        assert_eq!(parse_date("2025-01-15 08:30:00.5"), jan15);
        assert_eq!(parse_date("2025-01-15T23:30:00-05:00"), jan15);
        assert_eq!(parse_date("2025-01-15T08:30:00+01:00"), jan15);
        assert_eq!(parse_date("2025-01-15 08:30"), jan15);
        assert_eq!(parse_date("01/15/2025 08:30"), jan15);
        assert_eq!(parse_date("02/30/2025"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_guess_columns() {
        let h = headers(&["Posting Date", "Payee", "Amount", "Balance"]);
        assert_eq!(Field::Date.guess(&h), Some(0));
        assert_eq!(Field::Description.guess(&h), Some(1));
        assert_eq!(Field::Amount.guess(&h), Some(2));
        assert_eq!(Field::Amount.guess(&headers(&["When", "What"])), None);
    }

    #[test]
    fn test_resolve_prefers_explicit_names() {
        let h = headers(&["Date", "Memo", "Debit", "Amount"]);
        let mapping = ColumnMapping {
            amount: Some("debit".to_string()),
            ..ColumnMapping::default()
        };
        let cols = mapping.resolve(&h, no_chooser).unwrap();
        assert_eq!(cols, ColumnIndices { date: 0, description: 1, amount: 2 });
    }

    #[test]
    fn test_resolve_unknown_name_fails() {
        let h = headers(&["Date", "Memo", "Amount"]);
        let mapping = ColumnMapping {
            date: Some("Transaction Date".to_string()),
            ..ColumnMapping::default()
        };
        let err = mapping.resolve(&h, no_chooser).unwrap_err();
        assert!(matches!(err, WealthError::MissingColumn(ref c) if c == "Transaction Date"));
    }

    #[test]
    fn test_resolve_asks_chooser_when_guess_fails() {
        let h = headers(&["When", "What", "HowMuch"]);
        let mut asked = Vec::new();
        let cols = ColumnMapping::default()
            .resolve(&h, |field, _| {
                asked.push(field);
                Ok(match field {
                    Field::Date => 0,
                    Field::Description => 1,
                    Field::Amount => 2,
                })
            })
            .unwrap();
        assert_eq!(asked, vec![Field::Date, Field::Description, Field::Amount]);
        assert_eq!(cols.amount, 2);
    }

    #[test]
    fn test_read_and_standardize() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "Date,Description,Amount\n2024-03-01,STARBUCKS,-4.50\n\n03/02/2024,\"PAYROLL, ACME\",\"2,000.00\"\n",
        );
        let table = read_csv(&path).unwrap();
        let cols = ColumnMapping::default().resolve(&table.headers, no_chooser).unwrap();
        let rows = standardize(&table, cols).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "STARBUCKS");
        assert_eq!(rows[0].amount, -4.5);
        assert_eq!(rows[0].category.as_deref(), Some("Misc"));
        assert!(!rows[0].is_predicted);
        assert_eq!(rows[1].description, "PAYROLL, ACME");
        assert_eq!(rows[1].amount, 2000.0);
    }

    #[test]
    fn test_bad_amount_rejects_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "Date,Description,Amount\n2024-03-01,A,-1\n2024-03-02,B,lots\n");
        let table = read_csv(&path).unwrap();
        let cols = ColumnMapping::default().resolve(&table.headers, no_chooser).unwrap();
        let err = standardize(&table, cols).unwrap_err();
        assert!(matches!(err, WealthError::InvalidRow { line: 3, .. }));
    }

    #[test]
    fn test_ragged_csv_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "Date,Description,Amount\n2024-03-01,A\n");
        assert!(matches!(read_csv(&path), Err(WealthError::Csv(_))));
    }
}
