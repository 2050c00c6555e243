use crate::loan::Day;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{0}' is not a valid ISBN (13-17 digits/hyphens)")]
    InvalidIsbn(String),
    #[error("'{0}' is not a valid patron id (exactly 10 digits)")]
    InvalidPatronId(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("{0} is not a valid publication year")]
    InvalidYear(i32),
    #[error("a book needs at least one copy")]
    NoCopiesAcquired,
    #[error("'{0}' is not a valid name")]
    InvalidName(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("ISBN {0} is already in the catalog")]
    DuplicateIsbn(String),
    #[error("no book in the catalog with ISBN {0}")]
    UnknownIsbn(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("patron id {0} is already registered")]
    DuplicateId(String),
    #[error("no patron registered with id {0}")]
    UnknownId(String),
}

/// Failures of the loan state machine, one variant per refusal cause so a
/// caller can tell an unknown book from an exhausted shelf from a patron at
/// the cap.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LendError {
    #[error("no book in the catalog with ISBN {0}")]
    UnknownBook(String),
    #[error("no patron registered with id {0}")]
    UnknownPatron(String),
    #[error("no copies of {0} are currently available")]
    NoCopies(String),
    #[error("patron {0} has reached the loan cap")]
    CapReached(String),
    #[error("due date {due} precedes the loan start date {start}")]
    DueBeforeStart { start: Day, due: Day },
    #[error("no loan with id {0}")]
    UnknownLoan(u64),
    #[error("loan {0} is already closed")]
    AlreadyClosed(u64),
    #[error("return date {returned} precedes the loan start date {start}")]
    ReturnBeforeStart { start: Day, returned: Day },
}

/// Umbrella error surfaced by the service layer to the UI.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Lend(#[from] LendError),
    #[error("book {0} has open loans and cannot be removed or re-keyed")]
    BookOnLoan(String),
    #[error("patron {0} has open loans and cannot be removed or re-keyed")]
    PatronHasLoans(String),
}
