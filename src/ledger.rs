//! The item ledger: the ordered collection of line items backing a quote.
//!
//! Items are validated once, on admission, and are immutable afterwards.
//! Every mutation bumps [`LedgerStore::revision`], which the session uses as
//! its recompute notification.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable reference to an admitted line item.
///
/// Ids are never reused within one ledger, so a stale reference held by the
/// form surface can only miss, never hit the wrong row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One validated row of the quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    pub description: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl LineItem {
    /// `unit_price × quantity`.
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Derived totals. Never stored; always computed from the current ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub grand_total: f64,
}

/// Owns the line items of one quote, in display order.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    items: Vec<LineItem>,
    next_id: u64,
    revision: u64,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate raw form input and append the resulting item.
    ///
    /// Constraints are checked in field order (description, price, quantity)
    /// and the first violation is returned. On error the ledger is untouched.
    ///
    /// An empty price field counts as `0` and an empty quantity field as `1`,
    /// matching the defaults the entry form shows.
    pub fn add_item(
        &mut self,
        description: &str,
        unit_price_raw: &str,
        quantity_raw: &str,
    ) -> Result<LineItem, ValidationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let unit_price = parse_unit_price(unit_price_raw)?;
        let quantity = parse_quantity(quantity_raw)?;

        let item = LineItem {
            id: ItemId(self.next_id),
            description: description.to_string(),
            unit_price,
            quantity,
        };
        self.next_id += 1;
        self.items.push(item.clone());
        self.revision += 1;
        Ok(item)
    }

    /// Remove the item with the given id, returning it.
    ///
    /// Confirmation is the caller's responsibility; see
    /// [`crate::form::FormBinding::remove_item`].
    pub fn remove_item(&mut self, id: ItemId) -> Option<LineItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        let removed = self.items.remove(pos);
        self.revision += 1;
        Some(removed)
    }

    /// Pure totals over the current items.
    pub fn compute_totals(&self, labor_cost: f64) -> Totals {
        let subtotal: f64 = self.items.iter().map(LineItem::subtotal).sum();
        Totals {
            subtotal,
            grand_total: subtotal + labor_cost,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Incremented on every successful add or remove.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn parse_unit_price(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ValidationError::InvalidPrice),
    }
}

fn parse_quantity(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(1);
    }
    match raw.parse::<u32>() {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(ValidationError::InvalidQuantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn scenario_screen_and_battery() {
        let mut ledger = LedgerStore::new();
        ledger.add_item("Screen replacement", "150.00", "1").unwrap();
        ledger.add_item("Battery", "80.50", "2").unwrap();

        let totals = ledger.compute_totals(50.0);
        assert!((totals.subtotal - 311.0).abs() < EPS);
        assert!((totals.grand_total - 361.0).abs() < EPS);
    }

    #[test]
    fn valid_items_sum_exactly() {
        let cases = [("a", "0", "1"), ("b", "19.99", "3"), ("c", "1e2", "7"), ("d", " 2.5 ", " 4 ")];
        let mut ledger = LedgerStore::new();
        let mut expected = 0.0;
        for (d, p, q) in cases {
            let item = ledger.add_item(d, p, q).unwrap();
            expected += item.unit_price * f64::from(item.quantity);
        }
        assert_eq!(ledger.len(), 4);
        assert!((ledger.compute_totals(0.0).subtotal - expected).abs() < EPS);
    }

    #[test]
    fn invalid_inputs_leave_ledger_unchanged() {
        let mut ledger = LedgerStore::new();
        ledger.add_item("Keep", "10", "1").unwrap();
        let before = ledger.items().to_vec();
        let rev = ledger.revision();

        let cases = [
            ("", "10", "1", ValidationError::EmptyDescription),
            ("   ", "10", "1", ValidationError::EmptyDescription),
            ("x", "-1", "1", ValidationError::InvalidPrice),
            ("x", "inf", "1", ValidationError::InvalidPrice),
            ("x", "NaN", "1", ValidationError::InvalidPrice),
            ("x", "12abc", "1", ValidationError::InvalidPrice),
            ("x", "10", "0", ValidationError::InvalidQuantity),
            ("x", "10", "-3", ValidationError::InvalidQuantity),
            ("x", "10", "2.5", ValidationError::InvalidQuantity),
            ("x", "10", "two", ValidationError::InvalidQuantity),
        ];
        for (d, p, q, want) in cases {
            assert_eq!(ledger.add_item(d, p, q), Err(want), "input {d:?} {p:?} {q:?}");
        }

        assert_eq!(ledger.items(), before.as_slice());
        assert_eq!(ledger.revision(), rev);
    }

    #[test]
    fn first_violation_wins() {
        let mut ledger = LedgerStore::new();
        assert_eq!(
            ledger.add_item("", "-1", "0"),
            Err(ValidationError::EmptyDescription)
        );
        assert_eq!(
            ledger.add_item("x", "-1", "0"),
            Err(ValidationError::InvalidPrice)
        );
    }

    #[test]
    fn empty_price_and_quantity_use_form_defaults() {
        let mut ledger = LedgerStore::new();
        let item = ledger.add_item("Diagnostics", "", "").unwrap();
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn description_is_trimmed() {
        let mut ledger = LedgerStore::new();
        let item = ledger.add_item("  Battery  ", "1", "1").unwrap();
        assert_eq!(item.description, "Battery");
    }

    #[test]
    fn remove_targets_exactly_one_item() {
        let mut ledger = LedgerStore::new();
        let a = ledger.add_item("a", "1", "1").unwrap();
        let b = ledger.add_item("b", "2", "1").unwrap();
        let c = ledger.add_item("c", "3", "1").unwrap();

        let removed = ledger.remove_item(b.id).unwrap();
        assert_eq!(removed.description, "b");
        let ids: Vec<_> = ledger.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
        assert!(ledger.remove_item(b.id).is_none());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut ledger = LedgerStore::new();
        let a = ledger.add_item("a", "1", "1").unwrap();
        ledger.remove_item(a.id);
        let b = ledger.add_item("b", "1", "1").unwrap();
        assert_ne!(a.id, b.id);
    }
}
