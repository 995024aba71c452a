//! Categorization, balance forecasting and spending anomaly detection.
//!
//! [`FinanceAi`] owns the classifier state. Forecasting and anomaly detection
//! are recomputed from scratch on every call.

pub mod anomaly;
pub mod classifier;
pub mod forecast;
pub mod forest;
pub mod store;
pub mod text;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::{ForecastPoint, Transaction};

pub use anomaly::Anomaly;
pub use classifier::{CategoryModel, TrainOutcome};
pub use store::{FileModelStore, ModelStore};

/// Handle around the (lazily loaded) category model and its store.
pub struct FinanceAi<S: ModelStore> {
    store: S,
    model: Option<CategoryModel>,
}

impl<S: ModelStore> FinanceAi<S> {
    pub fn new(store: S) -> Self {
        Self { store, model: None }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fits a new model on every row with a non-empty category.
    ///
    /// With fewer than ten such rows nothing changes, in memory or on disk.
    pub fn train_categorizer(&mut self, rows: &[Transaction]) -> Result<TrainOutcome> {
        if rows.is_empty() {
            return Ok(TrainOutcome::NoData);
        }
        let labeled = classifier::labeled_rows(rows);
        if labeled.len() < classifier::MIN_TRAINING_ROWS {
            info!(labeled = labeled.len(), "skipping training");
            return Ok(TrainOutcome::InsufficientData {
                labeled: labeled.len(),
            });
        }

        let descriptions: Vec<&str> = labeled.iter().map(|(d, _)| *d).collect();
        let labels: Vec<String> = labeled.iter().map(|(_, c)| c.to_string()).collect();
        let model = CategoryModel::fit(&descriptions, &labels);
        let classes = model.classes().len();
        let vocabulary = model.vocabulary_size();

        self.store.save(&model)?;
        self.model = Some(model);
        info!(samples = labeled.len(), classes, vocabulary, "trained categorizer");
        Ok(TrainOutcome::Trained {
            samples: labeled.len(),
            classes,
        })
    }

    /// The in-memory model, loading it from the store on first use.
    fn model(&mut self) -> Option<&CategoryModel> {
        if self.model.is_none() {
            match self.store.load() {
                Ok(loaded) => self.model = loaded,
                Err(e) => warn!(error = %e, "could not load classifier, skipping prediction"),
            }
        }
        self.model.as_ref()
    }

    pub fn is_trained(&mut self) -> bool {
        self.model().is_some()
    }

    /// Fills in categories for rows that are missing one or still carry the
    /// placeholder. Returns how many rows were changed; without a model this is
    /// always zero and the rows are left alone.
    pub fn predict_categories(&mut self, rows: &mut [Transaction]) -> usize {
        if !rows.iter().any(Transaction::needs_category) {
            return 0;
        }
        let Some(model) = self.model() else {
            return 0;
        };

        let mut predicted = 0;
        for row in rows.iter_mut().filter(|r| r.needs_category()) {
            if let Some(category) = model.predict(&row.description) {
                row.category = Some(category.to_string());
                row.is_predicted = true;
                predicted += 1;
            }
        }
        info!(predicted, "predicted categories");
        predicted
    }

    pub fn forecast_balance(&self, rows: &[Transaction], horizon_days: u32) -> Vec<ForecastPoint> {
        forecast::forecast_balance(rows, horizon_days)
    }

    pub fn detect_anomalies(&self, rows: &[Transaction]) -> Vec<Anomaly> {
        let found = anomaly::detect_anomalies(rows);
        info!(anomalies = found.len(), "scanned for anomalies");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::store::MemoryModelStore;
    use super::*;
    use chrono::NaiveDate;

    fn txn(desc: &str, category: Option<&str>) -> Transaction {
        let mut t = Transaction::imported(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(), desc, -12.0);
        t.category = category.map(str::to_string);
        t
    }

    fn labeled_history() -> Vec<Transaction> {
        let mut rows = Vec::new();
        for desc in ["UBER TRIP", "UBER RIDE", "LYFT RIDE", "SHELL GAS", "UBER TRIP AIRPORT", "CITY BUS PASS"] {
            rows.push(txn(desc, Some("Transport")));
        }
        for desc in ["WHOLE FOODS MARKET", "TRADER JOES", "SAFEWAY GROCERY", "WHOLE FOODS", "KROGER GROCERY", "ALDI MARKET"] {
            rows.push(txn(desc, Some("Groceries")));
        }
        rows
    }

    #[test]
    fn test_train_requires_ten_labeled_rows() {
        let store = MemoryModelStore::default();
        let mut ai = FinanceAi::new(store);
        let rows = vec![
            txn("Uber", Some("Transport")),
            txn("Starbucks", Some("Food")),
            txn("Shell", Some("Transport")),
        ];
        let outcome = ai.train_categorizer(&rows).unwrap();
        assert_eq!(outcome, TrainOutcome::InsufficientData { labeled: 3 });
        assert_eq!(outcome.to_string(), "Need at least 10 categorized transactions to train.");
        assert!(ai.store().is_empty());
        assert!(!ai.is_trained());
    }

    #[test]
    fn test_trained_model_vocabulary_excludes_stop_words() {
        let mut ai = FinanceAi::new(MemoryModelStore::default());
        ai.train_categorizer(&labeled_history()).unwrap();
        let saved = ai.store().load().unwrap().unwrap();
        // 19 distinct words in the history, minus "whole".
        assert_eq!(saved.vocabulary_size(), 18);
    }

    #[test]
    fn test_unlabeled_rows_do_not_count() {
        let mut ai = FinanceAi::new(MemoryModelStore::default());
        let mut rows: Vec<Transaction> = (0..9).map(|i| txn(&format!("SHOP {i}"), Some("Shopping"))).collect();
        rows.extend((0..5).map(|_| txn("UNKNOWN", None)));
        rows.push(txn("BLANK", Some("")));
        assert!(!ai.train_categorizer(&rows).unwrap().is_trained());
    }

    #[test]
    fn test_empty_training_set() {
        let mut ai = FinanceAi::new(MemoryModelStore::default());
        assert_eq!(ai.train_categorizer(&[]).unwrap(), TrainOutcome::NoData);
    }

    #[test]
    fn test_failed_training_keeps_previous_model() {
        let mut ai = FinanceAi::new(MemoryModelStore::default());
        assert!(ai.train_categorizer(&labeled_history()).unwrap().is_trained());

        let few = vec![txn("RENT", Some("Rent")); 4];
        assert!(!ai.train_categorizer(&few).unwrap().is_trained());

        let mut rows = vec![txn("UBER TRIP", None)];
        ai.predict_categories(&mut rows);
        assert_eq!(rows[0].category.as_deref(), Some("Transport"));
    }

    #[test]
    fn test_predict_without_model_is_noop() {
        let mut ai = FinanceAi::new(MemoryModelStore::default());
        let mut rows = vec![txn("UBER TRIP", Some("Misc")), txn("RENT", None)];
        let before = rows.clone();
        assert_eq!(ai.predict_categories(&mut rows), 0);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_predict_fills_only_placeholder_rows() {
        let mut ai = FinanceAi::new(MemoryModelStore::default());
        ai.train_categorizer(&labeled_history()).unwrap();

        let mut rows = vec![
            txn("UBER TRIP HOME", Some("Misc")),
            txn("WHOLE FOODS", Some("Entertainment")),
            txn("LYFT RIDE", None),
            txn("TRADER JOES", Some("")),
        ];
        let changed = ai.predict_categories(&mut rows);
        assert_eq!(changed, 3);
        assert_eq!(rows[0].category.as_deref(), Some("Transport"));
        assert!(rows[0].is_predicted);
        assert_eq!(rows[1].category.as_deref(), Some("Entertainment"));
        assert!(!rows[1].is_predicted);
        assert_eq!(rows[2].category.as_deref(), Some("Transport"));
        assert_eq!(rows[3].category.as_deref(), Some("Groceries"));
    }

    #[test]
    fn test_predict_empty_input() {
        let mut ai = FinanceAi::new(MemoryModelStore::default());
        ai.train_categorizer(&labeled_history()).unwrap();
        let mut rows: Vec<Transaction> = Vec::new();
        assert_eq!(ai.predict_categories(&mut rows), 0);
    }

    #[test]
    fn test_model_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transaction_classifier.json");
        let samples = ["UBER TRIP", "WHOLE FOODS MARKET", "LYFT", "ALDI", "something else entirely"];

        let mut first = FinanceAi::new(FileModelStore::new(&path));
        first.train_categorizer(&labeled_history()).unwrap();
        let mut a: Vec<Transaction> = samples.iter().map(|d| txn(d, None)).collect();
        first.predict_categories(&mut a);

        let mut second = FinanceAi::new(FileModelStore::new(&path));
        assert!(second.is_trained());
        let mut b: Vec<Transaction> = samples.iter().map(|d| txn(d, None)).collect();
        second.predict_categories(&mut b);

        assert_eq!(a, b);
    }

    #[test]
    fn test_corrupt_model_file_is_treated_as_untrained() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{broken").unwrap();
        let mut ai = FinanceAi::new(FileModelStore::new(&path));
        let mut rows = vec![txn("UBER", None)];
        assert_eq!(ai.predict_categories(&mut rows), 0);
        assert!(rows[0].category.is_none());
    }
}
