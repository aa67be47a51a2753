//! The explicit, owned store for one quote.
//!
//! A [`QuoteSession`] bundles the ledger, the header, the optional logo and
//! the preview. Every mutation goes through a session method that recomputes
//! the preview exactly once afterwards, so the preview can never show stale
//! totals.

use crate::error::ValidationError;
use crate::header::QuoteHeader;
use crate::ledger::{ItemId, LedgerStore, LineItem, Totals};
use crate::preview::PreviewRenderer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The preview's logo image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoAsset {
    /// URL, local path or `data:` URI.
    pub src: String,
    /// Set when the logo could not be made render-safe.
    pub hidden: bool,
}

impl LogoAsset {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            hidden: false,
        }
    }
}

/// A session shared between the form's event handlers and the exporter.
pub type SharedSession = Arc<Mutex<QuoteSession>>;

/// Ledger, header, logo and preview of one quote.
#[derive(Debug, Clone)]
pub struct QuoteSession {
    ledger: LedgerStore,
    header: QuoteHeader,
    logo: Option<LogoAsset>,
    preview: PreviewRenderer,
}

impl Default for QuoteSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteSession {
    /// An empty quote dated today, with its initial preview computed.
    pub fn new() -> Self {
        Self::with_header(QuoteHeader::default())
    }

    pub fn with_header(header: QuoteHeader) -> Self {
        let mut session = Self {
            ledger: LedgerStore::new(),
            header,
            logo: None,
            preview: PreviewRenderer::new(),
        };
        session.recompute();
        session
    }

    /// Attach a logo by source reference.
    pub fn with_logo(mut self, src: impl Into<String>) -> Self {
        self.logo = Some(LogoAsset::new(src));
        self.recompute();
        self
    }

    /// Wrap into a [`SharedSession`].
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Re-project the preview from the current state. Idempotent.
    pub fn recompute(&mut self) {
        self.preview
            .recompute(&self.header, &self.ledger, self.logo.as_ref());
    }

    /// Apply a header edit, then recompute.
    pub fn update_header(&mut self, edit: impl FnOnce(&mut QuoteHeader)) {
        edit(&mut self.header);
        self.recompute();
    }

    /// Validate and append a line item. Recomputes only on success.
    pub fn add_item(
        &mut self,
        description: &str,
        unit_price_raw: &str,
        quantity_raw: &str,
    ) -> Result<LineItem, ValidationError> {
        let item = self
            .ledger
            .add_item(description, unit_price_raw, quantity_raw)?;
        self.recompute();
        Ok(item)
    }

    /// Remove an item without asking. Recomputes only if something was removed.
    ///
    /// User-facing removal goes through [`crate::form::FormBinding::remove_item`],
    /// which asks for confirmation first.
    pub fn remove_item(&mut self, id: ItemId) -> Option<LineItem> {
        let removed = self.ledger.remove_item(id)?;
        self.recompute();
        Some(removed)
    }

    pub fn totals(&self) -> Totals {
        self.ledger.compute_totals(self.header.labor_cost)
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn header(&self) -> &QuoteHeader {
        &self.header
    }

    pub fn logo(&self) -> Option<&LogoAsset> {
        self.logo.as_ref()
    }

    pub(crate) fn logo_mut(&mut self) -> Option<&mut LogoAsset> {
        self.logo.as_mut()
    }

    pub fn preview(&self) -> &PreviewRenderer {
        &self.preview
    }

    /// Layout-only access (container fitting, export mode).
    pub fn preview_mut(&mut self) -> &mut PreviewRenderer {
        &mut self.preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_initial_preview() {
        let session = QuoteSession::new();
        assert_eq!(session.preview().recompute_count(), 1);
        assert_eq!(session.preview().document().grand_total_text, "0.00");
    }

    #[test]
    fn every_mutation_recomputes_once() {
        let mut session = QuoteSession::new();
        let start = session.preview().recompute_count();

        let item = session.add_item("Battery", "80.50", "2").unwrap();
        assert_eq!(session.preview().recompute_count(), start + 1);

        session.update_header(|h| h.set_labor_cost("50"));
        assert_eq!(session.preview().recompute_count(), start + 2);
        assert_eq!(session.preview().document().grand_total_text, "211.00");

        session.remove_item(item.id).unwrap();
        assert_eq!(session.preview().recompute_count(), start + 3);
        assert_eq!(session.preview().document().grand_total_text, "50.00");
    }

    #[test]
    fn rejected_item_does_not_recompute() {
        let mut session = QuoteSession::new();
        let start = session.preview().recompute_count();
        assert!(session.add_item("", "1", "1").is_err());
        assert_eq!(session.preview().recompute_count(), start);
    }

    #[test]
    fn logo_flows_into_preview() {
        let session = QuoteSession::new().with_logo("https://cdn.example/logo.png");
        let logo = session.preview().document().logo.clone().unwrap();
        assert_eq!(logo.src, "https://cdn.example/logo.png");
        assert!(!logo.hidden);
    }
}
