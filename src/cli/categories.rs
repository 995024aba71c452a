use comfy_table::{Cell, Table};

use crate::db::{add_category, get_categories};
use crate::error::Result;
use crate::settings::load_settings;

pub fn list() -> Result<()> {
    let conn = super::open_db(&load_settings())?;
    let mut table = Table::new();
    table.set_header(vec!["Category"]);
    for name in get_categories(&conn)? {
        table.add_row(vec![Cell::new(name)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(name: &str) -> Result<()> {
    let conn = super::open_db(&load_settings())?;
    if add_category(&conn, name)? {
        println!("Added category: {}", name.trim());
    } else {
        println!("Category already exists: {}", name.trim());
    }
    Ok(())
}
