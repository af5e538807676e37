//! In-memory book catalog.

use std::path::Path;

use async_trait::async_trait;
use bookstore_common::{Book, BookId};
use bookstore_fx::BookLookup;
use dashmap::DashMap;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::{debug, info};

/// Errors loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate book ID {0} in catalog")]
    DuplicateId(BookId),
}

/// Thread-safe book store keyed by ID.
#[derive(Default)]
pub struct BookCatalog {
    books: DashMap<BookId, Book>,
}

impl BookCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from a list of books. IDs must be unique.
    pub fn from_books(books: Vec<Book>) -> Result<Self, CatalogError> {
        let catalog = Self::new();
        for book in books {
            let id = book.id;
            if catalog.books.insert(id, book).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(catalog)
    }

    /// Load a catalog from a JSON array of books.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        let books: Vec<Book> = serde_json::from_str(&contents)?;
        let catalog = Self::from_books(books)?;

        info!(path = %path.display(), books = catalog.len(), "Loaded book catalog");
        Ok(catalog)
    }

    /// A small catalog for demos and local runs.
    pub fn sample() -> Self {
        let books = [
            (1, "El Quijote", "Miguel de Cervantes", "978-84-376-0494-7", dec!(15.99), 25),
            (2, "Cien años de soledad", "Gabriel García Márquez", "978-03-073-8949-5", dec!(18.50), 12),
            (3, "Ficciones", "Jorge Luis Borges", "978-03-071-0927-7", dec!(12.75), 4),
            (4, "Rayuela", "Julio Cortázar", "978-84-376-0474-9", dec!(45.00), 2),
        ];

        let catalog = Self::new();
        for (id, title, author, isbn, cost_usd, stock) in books {
            let book = Book::new(BookId::new(id), title, author, isbn, cost_usd).with_stock(stock);
            catalog.books.insert(book.id, book);
        }
        catalog
    }

    /// Insert or replace a book.
    pub fn upsert(&self, book: Book) {
        debug!(book_id = %book.id, "Upserting book");
        self.books.insert(book.id, book);
    }

    /// Get a book by ID.
    pub fn get(&self, id: BookId) -> Option<Book> {
        self.books.get(&id).map(|b| b.clone())
    }

    /// All books ordered by ID.
    pub fn list(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self.books.iter().map(|b| b.clone()).collect();
        books.sort_by_key(|b| b.id);
        books
    }

    /// Books at or below the stock threshold, ordered by ID.
    pub fn low_stock(&self, threshold: u32) -> Vec<Book> {
        self.list()
            .into_iter()
            .filter(|b| b.is_low_stock(threshold))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[async_trait]
impl BookLookup for BookCatalog {
    async fn find_book(&self, id: BookId) -> Option<Book> {
        self.get(id)
    }
}
