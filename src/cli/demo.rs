use chrono::{Datelike, Local, Months, NaiveDate};

use crate::db::{append_transactions, count_transactions, init_db};
use crate::error::Result;
use crate::models::Transaction;
use crate::settings::load_settings;

const MONTHS: u32 = 6;

/// Bills that land on the same day every month.
struct RecurringTxn {
    day: u32,
    description: &'static str,
    amount: f64,
    category: &'static str,
}

const RECURRING: &[RecurringTxn] = &[
    RecurringTxn { day: 1, description: "MAPLE STREET APARTMENTS RENT", amount: -1450.00, category: "Rent" },
    RecurringTxn { day: 1, description: "ACME CORP PAYROLL", amount: 2600.00, category: "Income" },
    RecurringTxn { day: 15, description: "ACME CORP PAYROLL", amount: 2600.00, category: "Income" },
    RecurringTxn { day: 9, description: "CITY POWER & LIGHT", amount: -84.20, category: "Utilities" },
    RecurringTxn { day: 11, description: "FIBERNET INTERNET", amount: -59.99, category: "Utilities" },
    RecurringTxn { day: 18, description: "NETFLIX.COM", amount: -15.49, category: "Entertainment" },
    RecurringTxn { day: 21, description: "CITY GYM MEMBERSHIP", amount: -35.00, category: "Health" },
];

/// Everyday spending; each month cycles through vendors and amounts.
const GROCERS: &[&str] = &["WHOLE FOODS MARKET", "TRADER JOES", "SAFEWAY STORE"];
const COFFEE: &[&str] = &["STARBUCKS COFFEE", "BLUE BOTTLE COFFEE"];
const RIDES: &[&str] = &["UBER TRIP", "LYFT RIDE", "METRO TRANSIT FARE"];
const SHOPS: &[&str] = &["AMAZON MARKETPLACE", "TARGET STORE"];

const GROCERY_DAYS: &[u32] = &[3, 10, 17, 24];
const COFFEE_DAYS: &[u32] = &[2, 6, 13, 20, 27];
const RIDE_DAYS: &[u32] = &[5, 19];

/// Clamp a day to the last valid day of the given year/month.
fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| day.min(d.day()))
        .unwrap_or(day.min(28))
}

fn make_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, clamp_day(year, month, day))
}

/// Small deterministic wobble so amounts are not identical month to month.
fn vary(base: f64, seed: usize) -> f64 {
    let factor = 1.0 + ((seed % 7) as f64 - 3.0) * 0.04;
    (base * factor * 100.0).round() / 100.0
}

/// Labeled sample ledger covering the last `MONTHS` months up to `today`.
fn generate_transactions(today: NaiveDate) -> Vec<Transaction> {
    let mut txns = Vec::new();

    for i in 0..MONTHS {
        let Some(target) = today.checked_sub_months(Months::new(MONTHS - 1 - i)) else {
            continue;
        };
        let (year, month) = (target.year(), target.month());
        let idx = i as usize;
        let mut push = |day: u32, description: &str, amount: f64, category: &str| {
            if let Some(date) = make_date(year, month, day) {
                txns.push(Transaction::imported(date, description, amount).with_category(category));
            }
        };

        for r in RECURRING {
            let amount = if r.category == "Utilities" { vary(r.amount, idx + r.day as usize) } else { r.amount };
            push(r.day, r.description, amount, r.category);
        }
        for (j, day) in GROCERY_DAYS.iter().enumerate() {
            push(*day, GROCERS[(idx + j) % GROCERS.len()], vary(-92.40, idx * 4 + j), "Groceries");
        }
        for (j, day) in COFFEE_DAYS.iter().enumerate() {
            push(*day, COFFEE[(idx + j) % COFFEE.len()], vary(-5.75, idx + j), "Food & Drink");
        }
        for (j, day) in RIDE_DAYS.iter().enumerate() {
            push(*day, RIDES[(idx + j) % RIDES.len()], vary(-18.30, idx * 2 + j), "Transport");
        }
        push(12, SHOPS[idx % SHOPS.len()], vary(-47.99, idx), "Shopping");
        push(23, SHOPS[(idx + 1) % SHOPS.len()], vary(-31.25, idx + 5), "Shopping");
        push(26, "CORNER BISTRO", vary(-38.50, idx + 3), "Food & Drink");
    }

    // One splurge so the anomaly report has something to show.
    txns.push(Transaction::imported(today, "BEST BUY ELECTRONICS", -1299.00).with_category("Shopping"));

    txns.retain(|t| t.date <= today);
    txns.sort_by_key(|t| t.date);
    txns
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let mut conn = super::open_db(&settings)?;
    init_db(&conn)?;

    let existing = count_transactions(&conn)?;
    if existing > 0 {
        println!("Ledger already has {existing} transactions; run `wealthpath reset` first to load the demo.");
        return Ok(());
    }

    let txns = generate_transactions(Local::now().date_naive());
    let inserted = append_transactions(&mut conn, &txns)?;
    let outcome = super::open_ai(&settings).train_categorizer(&txns)?;
    tracing::info!(inserted, trained = outcome.is_trained(), "demo data loaded");

    println!("Demo data loaded!");
    println!("  Transactions: {inserted}");
    println!("  Categorizer:  {outcome}");
    println!();
    println!("Try these next:");
    println!("  wealthpath dashboard");
    println!("  wealthpath ledger list --limit 20");
    println!("  wealthpath forecast --days 14");
    println!("  wealthpath anomalies");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::anomaly::detect_anomalies;
    use crate::ai::classifier::labeled_rows;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    #[test]
    fn test_generate_transactions_count() {
        let txns = generate_transactions(today());
        // 7 recurring + 4 grocery + 5 coffee + 2 rides + 2 shops + 1 bistro, plus the splurge
        assert_eq!(txns.len(), MONTHS as usize * 21 + 1);
    }

    #[test]
    fn test_generate_transactions_span_months() {
        let txns = generate_transactions(today());
        assert_eq!(txns.first().unwrap().date, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
        assert!(txns.iter().all(|t| t.date <= today()));
        assert!(txns.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_clamp_day_short_months() {
        assert_eq!(clamp_day(2024, 2, 31), 29);
        assert_eq!(clamp_day(2023, 2, 30), 28);
        assert_eq!(clamp_day(2024, 12, 31), 31);
        assert_eq!(clamp_day(2024, 4, 31), 30);
    }

    #[test]
    fn test_all_rows_labeled_and_not_predicted() {
        let txns = generate_transactions(today());
        assert_eq!(labeled_rows(&txns).len(), txns.len());
        assert!(txns.iter().all(|t| !t.is_predicted));
    }

    #[test]
    fn test_splurge_is_flagged() {
        let txns = generate_transactions(today());
        let anomalies = detect_anomalies(&txns);
        assert!(anomalies
            .iter()
            .any(|a| a.transaction.description == "BEST BUY ELECTRONICS"));
    }
}
