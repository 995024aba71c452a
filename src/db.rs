use std::path::Path;

use rusqlite::{Connection, Row};
use tracing::debug;

use crate::error::{Result, WealthError};
use crate::models::Transaction;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT,
    is_predicted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS categories (
    name TEXT PRIMARY KEY
);
";

const DEFAULT_CATEGORIES: &[&str] = &[
    "Food & Drink",
    "Groceries",
    "Transport",
    "Utilities",
    "Rent",
    "Income",
    "Shopping",
    "Entertainment",
    "Health",
    "Misc",
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for name in DEFAULT_CATEGORIES {
            conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
        }
        debug!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

fn insert_all(conn: &Connection, rows: &[Transaction]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions (date, description, amount, category, is_predicted) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for row in rows {
        stmt.execute(rusqlite::params![
            row.date,
            row.description,
            row.amount,
            row.category,
            row.is_predicted,
        ])?;
    }
    Ok(())
}

pub fn append_transactions(conn: &mut Connection, rows: &[Transaction]) -> Result<usize> {
    let tx = conn.transaction()?;
    insert_all(&tx, rows)?;
    tx.commit()?;
    debug!(rows = rows.len(), "appended transactions");
    Ok(rows.len())
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        date: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        is_predicted: row.get(4)?,
    })
}

/// All stored transactions in insertion order.
pub fn get_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT date, description, amount, category, is_predicted FROM transactions ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], row_to_transaction)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?)
}

pub fn clear_transactions(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM transactions", [])?;
    debug!(deleted, "cleared transactions");
    Ok(deleted)
}

/// Ledger save: stored rows are replaced wholesale by `rows`.
pub fn replace_transactions(conn: &mut Connection, rows: &[Transaction]) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM transactions", [])?;
    insert_all(&tx, rows)?;
    tx.commit()?;
    debug!(rows = rows.len(), "replaced transactions");
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub fn get_categories(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM categories ORDER BY rowid")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

pub fn add_category(conn: &Connection, name: &str) -> Result<bool> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WealthError::Other("Category name cannot be empty".to_string()));
    }
    let inserted = conn.execute("INSERT OR IGNORE INTO categories (name) VALUES (?1)", [name])?;
    Ok(inserted > 0)
}

pub fn category_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM categories WHERE name = ?1")?;
    Ok(stmt.exists([name])?)
}
