use chrono::NaiveDate;

/// Placeholder category given to freshly imported rows.
pub const DEFAULT_CATEGORY: &str = "Misc";

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub is_predicted: bool,
}

impl Transaction {
    /// A standardized import row: default category, not predicted.
    pub fn imported(date: NaiveDate, description: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            category: Some(DEFAULT_CATEGORY.to_string()),
            is_predicted: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True when the category is missing, empty, or still the placeholder.
    pub fn needs_category(&self) -> bool {
        match self.category.as_deref() {
            None => true,
            Some(c) => c.is_empty() || c == DEFAULT_CATEGORY,
        }
    }

    pub fn is_outflow(&self) -> bool {
        self.amount < 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_balance: f64,
}
