//! Book catalog aggregate
use crate::book::Book;
use crate::error::CatalogError;
use std::collections::BTreeMap;

/// Which field a catalog search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Isbn,
}

/// Owns every book in the library, keyed by ISBN.
///
/// The catalog enforces ISBN uniqueness and nothing else; referential checks
/// against open loans belong to the service layer, which consults the ledger
/// before removals and re-keying updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Catalog {
    #[n(0)]
    books: BTreeMap<String, Book>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new book. Fails if the ISBN is already taken.
    pub fn add(&mut self, book: Book) -> Result<(), CatalogError> {
        if self.books.contains_key(book.isbn()) {
            return Err(CatalogError::DuplicateIsbn(book.isbn().to_string()));
        }

        self.books.insert(book.isbn().to_string(), book);
        Ok(())
    }

    /// Removes a book, returning the evicted record.
    pub fn remove(&mut self, isbn: &str) -> Result<Book, CatalogError> {
        self.books
            .remove(isbn)
            .ok_or_else(|| CatalogError::UnknownIsbn(isbn.to_string()))
    }

    /// Replaces the record stored under `old_isbn` with `book`.
    ///
    /// When the new record carries a different ISBN the entry is re-keyed,
    /// which fails if that ISBN already belongs to another book.
    pub fn update(&mut self, old_isbn: &str, book: Book) -> Result<(), CatalogError> {
        if !self.books.contains_key(old_isbn) {
            return Err(CatalogError::UnknownIsbn(old_isbn.to_string()));
        }

        if old_isbn != book.isbn() {
            if self.books.contains_key(book.isbn()) {
                return Err(CatalogError::DuplicateIsbn(book.isbn().to_string()));
            }
            self.books.remove(old_isbn);
        }

        self.books.insert(book.isbn().to_string(), book);
        Ok(())
    }

    pub fn get(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    pub(crate) fn get_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        self.books.get_mut(isbn)
    }

    /// Case-insensitive substring search over the chosen field. For authors
    /// a book matches if ANY of its authors contains the query.
    pub fn search(&self, query: &str, field: BookField) -> Vec<&Book> {
        let needle = query.to_lowercase();

        self.books
            .values()
            .filter(|book| match field {
                BookField::Title => book.title().to_lowercase().contains(&needle),
                BookField::Isbn => book.isbn().to_lowercase().contains(&needle),
                BookField::Author => book
                    .authors()
                    .iter()
                    .any(|author| author.to_lowercase().contains(&needle)),
            })
            .collect()
    }

    /// All books ordered by title, case-insensitive.
    pub fn list_sorted(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by_key(|book| book.title().to_lowercase());
        books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
