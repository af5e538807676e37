//! Book records as seen by the pricing core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::BookId;

/// A book in the inventory.
///
/// Only `title` and `cost_usd` feed into pricing; the remaining fields are
/// carried so catalog listings stay useful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    /// Purchase cost in US dollars.
    pub cost_usd: Decimal,
    #[serde(default)]
    pub stock_quantity: u32,
}

impl Book {
    /// Create a new book with no stock.
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        cost_usd: Decimal,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            cost_usd,
            stock_quantity: 0,
        }
    }

    /// Set the stock quantity.
    pub fn with_stock(mut self, quantity: u32) -> Self {
        self.stock_quantity = quantity;
        self
    }

    /// Check if the book is at or below the given stock threshold.
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock_quantity <= threshold
    }
}
