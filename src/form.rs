//! Form binding: raw, untyped user input → typed quote model.
//!
//! Header fields are lenient (labor cost coerces to 0), line items are strict
//! (rejected with a prompt). Every handled event ends with a preview
//! recompute through [`QuoteSession`].
//!
//! The visual form is an external collaborator. Hosts route input events to
//! [`FormBinding::on_input`] and implement [`Prompter`] for alerts and
//! confirmations.

use crate::error::ValidationError;
use crate::ledger::{ItemId, LineItem};
use crate::session::QuoteSession;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// User-facing alerts and confirmations.
pub trait Prompter: Send + Sync {
    /// Show a message that needs no answer.
    fn alert(&self, message: &str);

    /// Ask a yes/no question. `true` means the user accepted.
    fn confirm(&self, message: &str) -> bool;
}

/// Header fields bound to input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    ClientName,
    Device,
    Date,
    LaborCost,
    Notes,
    PaymentMethod,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::ClientName,
        FormField::Device,
        FormField::Date,
        FormField::LaborCost,
        FormField::Notes,
        FormField::PaymentMethod,
    ];

    /// The field's name on the form surface.
    pub fn name(self) -> &'static str {
        match self {
            FormField::ClientName => "client_name",
            FormField::Device => "device",
            FormField::Date => "date",
            FormField::LaborCost => "labor_cost",
            FormField::Notes => "notes",
            FormField::PaymentMethod => "payment_method",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown form field '{s}'"))
    }
}

/// The line-item entry sub-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            description: String::new(),
            unit_price: String::new(),
            quantity: "1".to_string(),
        }
    }
}

/// Result of a remove action.
#[derive(Debug, Clone, PartialEq)]
pub enum RemovalOutcome {
    Removed(LineItem),
    /// The user declined; nothing changed.
    Declined,
    /// The item was already gone.
    NotFound,
}

/// Routes form events into a [`QuoteSession`].
pub struct FormBinding {
    prompter: Arc<dyn Prompter>,
    entry: EntryForm,
}

impl fmt::Debug for FormBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBinding")
            .field("prompter", &"<dyn Prompter>")
            .field("entry", &self.entry)
            .finish()
    }
}

impl FormBinding {
    pub fn new(prompter: Arc<dyn Prompter>) -> Self {
        Self {
            prompter,
            entry: EntryForm::default(),
        }
    }

    /// Handle a change on a header field.
    pub fn on_input(&self, session: &mut QuoteSession, field: FormField, raw: &str) {
        debug!(%field, "Form input");
        session.update_header(|h| match field {
            FormField::ClientName => h.client_name = raw.to_string(),
            FormField::Device => h.device = raw.to_string(),
            FormField::Date => h.date = raw.to_string(),
            FormField::LaborCost => h.set_labor_cost(raw),
            FormField::Notes => h.notes = raw.to_string(),
            FormField::PaymentMethod => h.payment_method = raw.to_string(),
        });
    }

    pub fn entry(&self) -> &EntryForm {
        &self.entry
    }

    pub fn entry_mut(&mut self) -> &mut EntryForm {
        &mut self.entry
    }

    /// Handle the "add item" action using the entry sub-form's values.
    ///
    /// On success the sub-form is reset. On failure the user is alerted with
    /// the violated constraint and the sub-form keeps its values.
    pub fn add_item(&mut self, session: &mut QuoteSession) -> Result<LineItem, ValidationError> {
        let result = session.add_item(
            &self.entry.description,
            &self.entry.unit_price,
            &self.entry.quantity,
        );
        match &result {
            Ok(item) => {
                debug!(id = %item.id, "Line item added");
                self.entry = EntryForm::default();
            }
            Err(e) => self.prompter.alert(&e.to_string()),
        }
        result
    }

    /// Handle a click on an item row: confirm, then remove.
    pub fn remove_item(&self, session: &mut QuoteSession, id: ItemId) -> RemovalOutcome {
        let Some(item) = session.ledger().get(id) else {
            return RemovalOutcome::NotFound;
        };
        let question = format!("Remove \"{}\"?", item.description);
        if !self.prompter.confirm(&question) {
            debug!(%id, "Removal declined");
            return RemovalOutcome::Declined;
        }
        match session.remove_item(id) {
            Some(removed) => RemovalOutcome::Removed(removed),
            None => RemovalOutcome::NotFound,
        }
    }
}
