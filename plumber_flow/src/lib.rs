pub mod approval;
pub mod broadcast;
pub mod config;
pub mod details;
pub mod error;
pub mod history;
pub mod ledger;
pub mod navigation;
pub mod notify;
pub mod records;
pub mod tracker;

pub use error::{FlowError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a single extra-cost line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostId(pub Uuid);

impl CostId {
    pub fn new() -> Self {
        CostId(Uuid::new_v4())
    }
}

impl Default for CostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    #[default]
    Parts,
    Labor,
    Other,
}

impl CostCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CostCategory::Parts => "Parts",
            CostCategory::Labor => "Labor",
            CostCategory::Other => "Other",
        }
    }
}

/// One discretionary line item on top of the base fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraCost {
    pub id: CostId,
    pub description: String,
    pub amount: f64,
    pub category: CostCategory,
}

impl ExtraCost {
    pub fn new(description: impl Into<String>, amount: f64, category: CostCategory) -> Self {
        Self {
            id: CostId::new(),
            description: description.into(),
            amount,
            category,
        }
    }
}

/// Base fee, extras and their sum. Always built fresh from the cost list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutBreakdown {
    pub base_fee: f64,
    pub extras: f64,
    pub total: f64,
}

impl PayoutBreakdown {
    pub fn compute<'a>(base_fee: f64, costs: impl IntoIterator<Item = &'a ExtraCost>) -> Self {
        let extras: f64 = costs.into_iter().map(|c| c.amount).sum();
        Self {
            base_fee,
            extras,
            total: base_fee + extras,
        }
    }
}

/// Formats an amount the way receipts and notifications show it: `$108.00`.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_sums_extras_onto_base() {
        let costs = vec![
            ExtraCost::new("Replacement flapper valve", 15.0, CostCategory::Parts),
            ExtraCost::new("Additional labor - pipe adjustment", 25.0, CostCategory::Labor),
        ];
        let breakdown = PayoutBreakdown::compute(68.0, &costs);
        assert_eq!(breakdown.extras, 40.0);
        assert_eq!(breakdown.total, 108.0);
        assert_eq!(format_usd(breakdown.total), "$108.00");
    }

    #[test]
    fn cost_category_uses_lowercase_names() {
        let json = serde_json::to_string(&CostCategory::Labor).unwrap();
        assert_eq!(json, "\"labor\"");
    }
}
