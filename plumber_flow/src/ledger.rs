//! Extra-cost ledger kept by a job tracking session.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{FlowError, Result};
use crate::{CostCategory, CostId, ExtraCost};

/// Ordered list of extra costs. Entries keep their position across edits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtraCostLedger {
    entries: Vec<ExtraCost>,
}

fn validate(description: &str, amount: f64) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        warn!("rejected extra cost with empty description");
        return Err(FlowError::EmptyDescription);
    }
    // NaN fails this comparison too
    if !(amount.is_finite() && amount > 0.0) {
        warn!(amount, "rejected extra cost with non-positive amount");
        return Err(FlowError::InvalidAmount(amount));
    }
    Ok(description.to_string())
}

impl ExtraCostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, description: &str, amount: f64, category: CostCategory) -> Result<CostId> {
        let description = validate(description, amount)?;
        let cost = ExtraCost::new(description, amount, category);
        let id = cost.id;
        debug!(%id, amount, ?category, "extra cost added");
        self.entries.push(cost);
        Ok(id)
    }

    pub fn edit(
        &mut self,
        id: CostId,
        description: &str,
        amount: f64,
        category: CostCategory,
    ) -> Result<()> {
        let description = validate(description, amount)?;
        let entry = self
            .entries
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| FlowError::CostNotFound(id.to_string()))?;
        entry.description = description;
        entry.amount = amount;
        entry.category = category;
        debug!(%id, amount, ?category, "extra cost edited");
        Ok(())
    }

    /// Removing an id that is not present is a no-op.
    pub fn remove(&mut self, id: CostId) -> Option<ExtraCost> {
        let pos = self.entries.iter().position(|c| c.id == id)?;
        debug!(%id, "extra cost removed");
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, id: CostId) -> Option<&ExtraCost> {
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtraCost> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ExtraCost] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|c| c.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_with_fresh_ids() {
        let mut ledger = ExtraCostLedger::new();
        let a = ledger.add("Flapper valve", 15.0, CostCategory::Parts).unwrap();
        let b = ledger.add("Pipe adjustment", 25.0, CostCategory::Labor).unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].id, a);
        assert_eq!(ledger.entries()[1].id, b);
        assert_eq!(ledger.total(), 40.0);
    }

    #[test]
    fn add_trims_description() {
        let mut ledger = ExtraCostLedger::new();
        let id = ledger.add("  P-trap  ", 40.0, CostCategory::Parts).unwrap();
        assert_eq!(ledger.get(id).unwrap().description, "P-trap");
    }

    #[test]
    fn add_rejects_bad_input_without_mutation() {
        let mut ledger = ExtraCostLedger::new();
        assert_eq!(
            ledger.add("", 10.0, CostCategory::Parts),
            Err(FlowError::EmptyDescription)
        );
        assert_eq!(
            ledger.add("   ", 10.0, CostCategory::Parts),
            Err(FlowError::EmptyDescription)
        );
        assert_eq!(
            ledger.add("Valve", 0.0, CostCategory::Parts),
            Err(FlowError::InvalidAmount(0.0))
        );
        assert_eq!(
            ledger.add("Valve", -5.0, CostCategory::Other),
            Err(FlowError::InvalidAmount(-5.0))
        );
        assert!(ledger.add("Valve", f64::NAN, CostCategory::Other).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn edit_keeps_id_and_position() {
        let mut ledger = ExtraCostLedger::new();
        let a = ledger.add("Valve", 15.0, CostCategory::Parts).unwrap();
        let b = ledger.add("Labor", 25.0, CostCategory::Labor).unwrap();
        let c = ledger.add("Disposal fee", 5.0, CostCategory::Other).unwrap();

        ledger.edit(b, "Extra labor", 30.0, CostCategory::Other).unwrap();

        let ids: Vec<_> = ledger.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        let edited = ledger.get(b).unwrap();
        assert_eq!(edited.description, "Extra labor");
        assert_eq!(edited.amount, 30.0);
        assert_eq!(edited.category, CostCategory::Other);
        assert_eq!(ledger.total(), 50.0);
    }

    #[test]
    fn edit_rejects_bad_input_without_mutation() {
        let mut ledger = ExtraCostLedger::new();
        let id = ledger.add("Valve", 15.0, CostCategory::Parts).unwrap();
        assert!(ledger.edit(id, " ", 20.0, CostCategory::Parts).is_err());
        assert!(ledger.edit(id, "Valve", -1.0, CostCategory::Parts).is_err());
        let entry = ledger.get(id).unwrap();
        assert_eq!(entry.description, "Valve");
        assert_eq!(entry.amount, 15.0);
    }

    #[test]
    fn edit_unknown_id_is_an_error() {
        let mut ledger = ExtraCostLedger::new();
        ledger.add("Valve", 15.0, CostCategory::Parts).unwrap();
        let missing = CostId::new();
        assert_eq!(
            ledger.edit(missing, "Other", 1.0, CostCategory::Other),
            Err(FlowError::CostNotFound(missing.to_string()))
        );
        assert_eq!(ledger.total(), 15.0);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut ledger = ExtraCostLedger::new();
        ledger.add("Valve", 15.0, CostCategory::Parts).unwrap();
        assert!(ledger.remove(CostId::new()).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn total_tracks_every_mutation() {
        let mut ledger = ExtraCostLedger::new();
        let mut expected = Vec::new();
        for (i, amount) in [12.5, 3.0, 40.0, 7.25].into_iter().enumerate() {
            let id = ledger
                .add(&format!("item {i}"), amount, CostCategory::Parts)
                .unwrap();
            expected.push((id, amount));
            let sum: f64 = expected.iter().map(|(_, a)| a).sum();
            assert_eq!(ledger.total(), sum);
        }

        let (second, _) = expected[1];
        ledger.edit(second, "item 1", 9.0, CostCategory::Labor).unwrap();
        expected[1].1 = 9.0;
        assert_eq!(ledger.total(), expected.iter().map(|(_, a)| a).sum::<f64>());

        let (first, _) = expected.remove(0);
        ledger.remove(first);
        assert_eq!(ledger.total(), expected.iter().map(|(_, a)| a).sum::<f64>());
    }
}
