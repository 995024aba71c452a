use crate::db::get_transactions;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let conn = super::open_db(&settings)?;
    let rows = get_transactions(&conn)?;

    let mut ai = super::open_ai(&settings);
    let outcome = ai.train_categorizer(&rows)?;
    println!("{outcome}");
    if let crate::ai::TrainOutcome::Trained { samples, classes } = outcome {
        println!("Learned {classes} categories from {samples} transactions.");
    }
    Ok(())
}
