use crate::error::FormError;
use common::PortfolioEntry;
use log::{debug, trace};

/// One editable row of the portfolio form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    pub id: usize,
    pub ticker: String,
    pub quantity: String,
}

impl FormRow {
    fn empty(id: usize) -> Self {
        Self {
            id,
            ticker: String::new(),
            quantity: String::new(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.ticker.trim().is_empty() && !self.quantity.trim().is_empty()
    }
}

/// Holdings being typed in by the user, before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioForm {
    rows: Vec<FormRow>,
}

impl Default for PortfolioForm {
    fn default() -> Self {
        Self {
            rows: vec![FormRow::empty(0)],
        }
    }
}

impl PortfolioForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }

    /// Append an empty row and return its id.
    pub fn add_row(&mut self) -> usize {
        let id = self.rows.iter().map(|row| row.id + 1).max().unwrap_or(0);
        trace!("Adding portfolio row {}", id);
        self.rows.push(FormRow::empty(id));
        id
    }

    pub fn remove_row(&mut self, id: usize) {
        trace!("Removing portfolio row {}", id);
        self.rows.retain(|row| row.id != id);
    }

    pub fn set_ticker(&mut self, id: usize, ticker: impl Into<String>) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            row.ticker = ticker.into();
        }
    }

    pub fn set_quantity(&mut self, id: usize, quantity: impl Into<String>) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            row.quantity = quantity.into();
        }
    }

    /// Reset to a single empty row.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Entries ready to post: incomplete rows dropped, values trimmed and
    /// tickers upper-cased.
    pub fn submission(&self) -> Result<Vec<PortfolioEntry>, FormError> {
        let entries: Vec<PortfolioEntry> = self
            .rows
            .iter()
            .filter(|row| row.is_complete())
            .map(|row| PortfolioEntry::new(row.ticker.trim().to_uppercase(), row.quantity.trim()))
            .collect();

        if entries.is_empty() {
            return Err(FormError::NoValidEntries);
        }
        debug!("Portfolio form produced {} entries", entries.len());
        Ok(entries)
    }
}
