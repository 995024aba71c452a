use std::collections::HashMap;

use crate::models::Transaction;

pub const Z_THRESHOLD: f64 = 2.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub transaction: Transaction,
    pub z_score: f64,
    pub category_mean: f64,
}

/// Running mean/variance (Welford), so identical amounts give exactly zero spread.
#[derive(Debug, Default, Clone, Copy)]
struct Spread {
    n: usize,
    mean: f64,
    m2: f64,
}

impl Spread {
    fn add(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Sample standard deviation; undefined below two observations.
    fn std_dev(&self) -> Option<f64> {
        (self.n >= 2).then(|| (self.m2 / (self.n - 1) as f64).sqrt())
    }
}

fn category_spreads(rows: &[Transaction]) -> HashMap<&str, Spread> {
    let mut spreads: HashMap<&str, Spread> = HashMap::new();
    for t in rows {
        if let Some(cat) = t.category.as_deref() {
            spreads.entry(cat).or_default().add(t.amount);
        }
    }
    spreads
}

/// Outflows more than 2.5 sample standard deviations from their category mean.
///
/// Categories need internal spread first: a single row, or identical amounts,
/// never yields an anomaly. Uncategorized rows are never flagged.
pub fn detect_anomalies(rows: &[Transaction]) -> Vec<Anomaly> {
    let spreads = category_spreads(rows);
    rows.iter()
        .filter(|t| t.is_outflow())
        .filter_map(|t| {
            let spread = spreads.get(t.category.as_deref()?)?;
            let std = spread.std_dev().filter(|s| *s > 0.0)?;
            let z_score = (t.amount - spread.mean).abs() / std;
            (z_score > Z_THRESHOLD).then(|| Anomaly {
                transaction: t.clone(),
                z_score,
                category_mean: spread.mean,
            })
        })
        .collect()
}
