use std::collections::HashMap;

use chrono::NaiveDate;

use crate::ai::forecast::daily_balances;
use crate::models::Transaction;

pub const UNCATEGORIZED: &str = "Uncategorized";

pub struct Summary {
    pub net_balance: f64,
    pub total_spending: f64,
    pub count: usize,
    pub predicted: usize,
}

pub fn get_summary(rows: &[Transaction]) -> Summary {
    Summary {
        net_balance: rows.iter().map(|t| t.amount).sum(),
        total_spending: rows.iter().filter(|t| t.is_outflow()).map(|t| t.amount).sum(),
        count: rows.len(),
        predicted: rows.iter().filter(|t| t.is_predicted).count(),
    }
}

pub struct CategorySpend {
    pub name: String,
    pub total: f64,
    pub pct: f64,
    pub count: usize,
}

/// Outflow totals per category (as positive amounts), largest first.
pub fn spending_by_category(rows: &[Transaction]) -> Vec<CategorySpend> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for t in rows.iter().filter(|t| t.is_outflow()) {
        let name = match t.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => UNCATEGORIZED,
        };
        let entry = totals.entry(name).or_default();
        entry.0 += t.amount.abs();
        entry.1 += 1;
    }
    let grand: f64 = totals.values().map(|(v, _)| v).sum();

    let mut items: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(name, (total, count))| CategorySpend {
            name: name.to_string(),
            total,
            pct: if grand > 0.0 { total / grand * 100.0 } else { 0.0 },
            count,
        })
        .collect();
    items.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    items
}

/// The most recent `days` points of the running daily balance.
pub fn balance_history(rows: &[Transaction], days: usize) -> Vec<(NaiveDate, f64)> {
    let all = daily_balances(rows);
    let skip = all.len().saturating_sub(days);
    all.into_iter().skip(skip).collect()
}
