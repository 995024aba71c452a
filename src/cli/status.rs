use crate::db::{count_transactions, get_categories, get_connection};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();
    let mut ai = super::open_ai(&settings);

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Model file: {}", ai.store().path().display());
    println!("Guided:     {}", if settings.guided_mode { "on" } else { "off" });
    println!("Forecast:   {} days", settings.forecast_days);

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let transactions = count_transactions(&conn)?;
        let predicted: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE is_predicted = 1",
            [],
            |r| r.get(0),
        )?;
        let categories = get_categories(&conn)?.len();

        println!();
        println!("Transactions:  {transactions}");
        println!("Predicted:     {predicted}");
        println!("Categories:    {categories}");
        println!("Model:         {}", if ai.is_trained() { "trained" } else { "not trained" });
    } else {
        println!();
        println!("Database not found. Run `wealthpath init` to set up.");
    }

    Ok(())
}
