//! Book entity and its availability counter
//!
//! The ISBN is the primary key and is immutable on the instance; re-keying a
//! book happens through the catalog, which owns the map. The availability
//! counter only ever moves by one through [`Book::checkout_copy`] and
//! [`Book::return_copy`] so it can never leave `0..=total_copies`.

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Book {
    #[n(0)]
    isbn: String,
    #[n(1)]
    title: String,
    #[n(2)]
    authors: Vec<String>,
    #[n(3)]
    year: i32,
    #[n(4)]
    total_copies: u32,
    #[n(5)]
    available_copies: u32,
}

impl Book {
    /// A newly acquired title starts with every copy on the shelf.
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        authors: Vec<String>,
        year: i32,
        total_copies: u32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            authors,
            year,
            total_copies,
            available_copies: total_copies,
        }
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Takes one copy off the shelf. Saturates at zero rather than wrapping;
    /// the ledger checks availability before calling this.
    pub(crate) fn checkout_copy(&mut self) {
        if self.available_copies > 0 {
            self.available_copies -= 1;
        }
    }

    /// Puts one copy back on the shelf, never past the total.
    pub(crate) fn return_copy(&mut self) {
        if self.available_copies < self.total_copies {
            self.available_copies += 1;
        }
    }
}
