use std::fmt;

use serde::{Deserialize, Serialize};

use super::forest::{ForestParams, RandomForestClassifier};
use super::text::TfidfVectorizer;
use crate::models::Transaction;

pub const MIN_TRAINING_ROWS: usize = 10;
pub const MAX_VOCABULARY: usize = 500;

/// Fitted description-to-category model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryModel {
    vectorizer: TfidfVectorizer,
    forest: RandomForestClassifier,
}

impl CategoryModel {
    pub fn fit<S: AsRef<str>>(descriptions: &[S], labels: &[String]) -> Self {
        let vectorizer = TfidfVectorizer::fit(descriptions, MAX_VOCABULARY);
        let x: Vec<Vec<f64>> = descriptions
            .iter()
            .map(|d| vectorizer.transform(d.as_ref()))
            .collect();
        let forest = RandomForestClassifier::fit(&x, labels, ForestParams::default());
        Self { vectorizer, forest }
    }

    pub fn predict(&self, description: &str) -> Option<&str> {
        self.forest.predict(&self.vectorizer.transform(description))
    }

    pub fn classes(&self) -> &[String] {
        self.forest.classes()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.n_features()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    Trained { samples: usize, classes: usize },
    NoData,
    InsufficientData { labeled: usize },
}

impl TrainOutcome {
    pub fn is_trained(&self) -> bool {
        matches!(self, Self::Trained { .. })
    }
}

impl fmt::Display for TrainOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trained { .. } => write!(f, "Model trained successfully."),
            Self::NoData => write!(f, "Not enough data to train."),
            Self::InsufficientData { .. } => write!(
                f,
                "Need at least {MIN_TRAINING_ROWS} categorized transactions to train."
            ),
        }
    }
}

/// Rows usable as training labels: category present and non-empty.
pub fn labeled_rows(rows: &[Transaction]) -> Vec<(&str, &str)> {
    rows.iter()
        .filter_map(|t| match t.category.as_deref() {
            Some(c) if !c.is_empty() => Some((t.description.as_str(), c)),
            _ => None,
        })
        .collect()
}
