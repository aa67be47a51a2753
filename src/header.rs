//! Quote header fields: who the quote is for and how it is paid.
//!
//! Header fields are written on every keystroke and are never rejected.
//! The only processing is [`coerce_amount`] for the labor cost.

use serde::{Deserialize, Serialize};

/// Free-form header of a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteHeader {
    pub client_name: String,
    pub device: String,
    pub date: String,
    /// Always finite and ≥ 0 (see [`coerce_amount`]).
    pub labor_cost: f64,
    pub notes: String,
    pub payment_method: String,
}

impl Default for QuoteHeader {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            device: String::new(),
            date: today(),
            labor_cost: 0.0,
            notes: String::new(),
            payment_method: String::new(),
        }
    }
}

impl QuoteHeader {
    /// Set the labor cost from raw input, coercing anything invalid to 0.
    pub fn set_labor_cost(&mut self, raw: &str) {
        self.labor_cost = coerce_amount(raw);
    }
}

/// Lenient numeric coercion for header amounts.
///
/// Empty, unparsable, non-finite and negative input all become `0.0`.
pub fn coerce_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Today's local date as `dd/mm/yyyy`, the form's initial date value.
pub fn today() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_amount_accepts_plain_numbers() {
        assert_eq!(coerce_amount("50"), 50.0);
        assert_eq!(coerce_amount(" 12.75 "), 12.75);
    }

    #[test]
    fn coerce_amount_zeroes_garbage() {
        for raw in ["", "abc", "-5", "NaN", "inf", "1,5"] {
            assert_eq!(coerce_amount(raw), 0.0, "raw={raw:?}");
        }
    }

    #[test]
    fn default_date_is_day_month_year() {
        let date = QuoteHeader::default().date;
        let parts: Vec<&str> = date.split('/').collect();
        assert_eq!(parts.len(), 3, "got {date}");
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 4);
    }
}
