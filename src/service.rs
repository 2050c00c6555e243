//! Service layer API for circulation desk operations
//!
//! [`CirculationService`] is the single entry point a UI layer calls. Every
//! mutating operation runs a format-validation pre-pass, enforces the
//! referential-integrity rules that span aggregates (no removal or re-keying
//! of an entity with open loans), delegates to the owning aggregate and then
//! records the outcome in the audit trail, success or failure alike.
use crate::archive::{self, Archive};
use crate::audit::AuditTrail;
use crate::auth::Credentials;
use crate::book::Book;
use crate::catalog::{BookField, Catalog};
use crate::error::{DeskError, ValidationError};
use crate::ledger::{Ledger, DEFAULT_LOAN_CAP};
use crate::loan::{Day, Loan};
use crate::patron::Patron;
use crate::registry::{PatronField, Registry};
use crate::validate;
use tracing::{info, warn};

/// Desk-wide tunables, passed in explicitly so tests can vary them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub loan_cap: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self { loan_cap: DEFAULT_LOAN_CAP }
    }
}

pub struct CirculationService {
    archive: Archive,
    policy: Policy,
    catalog: Catalog,
    registry: Registry,
    ledger: Ledger,
    audit: AuditTrail,
    credentials: Option<Credentials>,
}

impl CirculationService {
    pub fn new(archive: Archive, policy: Policy) -> Self {
        Self {
            archive,
            policy,
            catalog: Catalog::new(),
            registry: Registry::new(),
            ledger: Ledger::new(policy.loan_cap),
            audit: AuditTrail::new(),
            credentials: None,
        }
    }

    // LIFECYCLE

    /// Loads whichever aggregates exist in the archive. Aggregates without a
    /// stored snapshot start empty; the configured loan cap always wins over
    /// the one found in a stored ledger.
    pub fn load_state(&mut self) -> anyhow::Result<()> {
        if let Some(records) = self.archive.load::<Vec<String>>(archive::AUDIT_KEY)? {
            self.audit = AuditTrail::from_records(records);
        }
        if let Some(catalog) = self.archive.load(archive::CATALOG_KEY)? {
            self.catalog = catalog;
        }
        if let Some(registry) = self.archive.load(archive::PATRONS_KEY)? {
            self.registry = registry;
        }
        if let Some(ledger) = self.archive.load::<Ledger>(archive::LEDGER_KEY)? {
            self.ledger = ledger;
            self.ledger.set_loan_cap(self.policy.loan_cap);
        }
        self.credentials = self.archive.load(archive::CREDENTIALS_KEY)?;

        info!(
            books = self.catalog.len(),
            patrons = self.registry.len(),
            loans = self.ledger.loans().len(),
            "state loaded"
        );
        self.audit.record("system started, state loaded");
        Ok(())
    }

    /// Persists the whole state as one atomic snapshot.
    pub fn save_state(&mut self) -> anyhow::Result<()> {
        self.audit.record("system shutdown, state saved");
        self.archive
            .save_snapshot(&self.catalog, &self.registry, &self.ledger, &self.audit)?;
        if let Some(credentials) = &self.credentials {
            self.archive.save(archive::CREDENTIALS_KEY, credentials)?;
        }
        info!("snapshot saved");
        Ok(())
    }

    // BOOKS

    pub fn add_book(&mut self, book: Book) -> Result<(), DeskError> {
        let isbn = book.isbn().to_string();
        let res = check_book(&book).and_then(|()| Ok(self.catalog.add(book)?));
        self.record_outcome(format!("add book {isbn}"), &res);
        res
    }

    pub fn update_book(&mut self, old_isbn: &str, book: Book) -> Result<(), DeskError> {
        let isbn = book.isbn().to_string();
        let res = check_book(&book).and_then(|()| {
            // re-keying a book that is out on loan would strand the loan
            if old_isbn != book.isbn() && self.ledger.is_book_on_loan(old_isbn) {
                return Err(DeskError::BookOnLoan(old_isbn.to_string()));
            }
            Ok(self.catalog.update(old_isbn, book)?)
        });
        self.record_outcome(format!("update book {old_isbn} -> {isbn}"), &res);
        res
    }

    pub fn remove_book(&mut self, isbn: &str) -> Result<(), DeskError> {
        let res = check_isbn(isbn).and_then(|()| {
            if self.ledger.is_book_on_loan(isbn) {
                return Err(DeskError::BookOnLoan(isbn.to_string()));
            }
            self.catalog.remove(isbn)?;
            Ok(())
        });
        self.record_outcome(format!("remove book {isbn}"), &res);
        res
    }

    pub fn find_books(&self, query: &str, field: BookField) -> Vec<&Book> {
        self.catalog.search(query, field)
    }

    pub fn list_books(&self) -> Vec<&Book> {
        self.catalog.list_sorted()
    }

    // PATRONS

    pub fn add_patron(&mut self, patron: Patron) -> Result<(), DeskError> {
        let id = patron.id().to_string();
        let res = check_patron(&patron).and_then(|()| Ok(self.registry.add(patron)?));
        self.record_outcome(format!("add patron {id}"), &res);
        res
    }

    pub fn update_patron(&mut self, old_id: &str, patron: Patron) -> Result<(), DeskError> {
        let id = patron.id().to_string();
        let res = check_patron(&patron).and_then(|()| {
            if old_id != patron.id() && self.ledger.has_open_loans(&self.registry, old_id) {
                return Err(DeskError::PatronHasLoans(old_id.to_string()));
            }
            Ok(self.registry.update(old_id, patron)?)
        });
        self.record_outcome(format!("update patron {old_id} -> {id}"), &res);
        res
    }

    pub fn remove_patron(&mut self, patron_id: &str) -> Result<(), DeskError> {
        let res = check_patron_id(patron_id).and_then(|()| {
            if self.ledger.has_open_loans(&self.registry, patron_id) {
                return Err(DeskError::PatronHasLoans(patron_id.to_string()));
            }
            self.registry.remove(patron_id)?;
            Ok(())
        });
        self.record_outcome(format!("remove patron {patron_id}"), &res);
        res
    }

    pub fn find_patrons(&self, query: &str, field: PatronField) -> Vec<&Patron> {
        self.registry.search(query, field)
    }

    pub fn list_patrons(&self) -> Vec<&Patron> {
        self.registry.list_sorted()
    }

    // LOANS

    /// Opens a loan and returns a copy of the created record.
    pub fn borrow_book(
        &mut self,
        isbn: &str,
        patron_id: &str,
        due_date: Day,
    ) -> Result<Loan, DeskError> {
        let res = check_isbn(isbn)
            .and_then(|()| check_patron_id(patron_id))
            .and_then(|()| {
                let loan = self.ledger.borrow(
                    &mut self.catalog,
                    &mut self.registry,
                    isbn,
                    patron_id,
                    due_date,
                )?;
                Ok(loan.clone())
            });
        match &res {
            Ok(loan) => self.audit.record(format!(
                "loan {} opened: book {isbn} to patron {patron_id}, due {due_date}",
                loan.id()
            )),
            Err(err) => {
                warn!(%err, isbn, patron_id, "borrow refused");
                self.audit
                    .record(format!("loan refused: book {isbn} to patron {patron_id} ({err})"));
            }
        }
        res
    }

    /// Closes a loan and returns a copy of the closed record.
    pub fn return_book(&mut self, loan_id: u64, returned_on: Day) -> Result<Loan, DeskError> {
        let res = self
            .ledger
            .return_loan(&mut self.catalog, &mut self.registry, loan_id, returned_on)
            .map(Loan::clone)
            .map_err(DeskError::from);
        match &res {
            Ok(loan) if loan.overdue_flagged() => self
                .audit
                .record(format!("loan {loan_id} returned LATE on {returned_on}")),
            Ok(_) => self
                .audit
                .record(format!("loan {loan_id} returned on {returned_on}")),
            Err(err) => {
                warn!(%err, loan_id, "return refused");
                self.audit.record(format!("return refused for loan {loan_id} ({err})"));
            }
        }
        res
    }

    pub fn active_loans(&self) -> Vec<&Loan> {
        self.ledger.active_loans()
    }

    pub fn overdue_loans(&self) -> Vec<&Loan> {
        self.ledger.overdue_loans()
    }

    /// The open loans of one patron; empty for unknown patrons.
    pub fn patron_loans(&self, patron_id: &str) -> Vec<&Loan> {
        self.registry
            .get(patron_id)
            .map(|patron| self.ledger.loans_for(patron))
            .unwrap_or_default()
    }

    pub fn find_loan(&self, loan_id: u64) -> Option<&Loan> {
        self.ledger.find_loan(loan_id)
    }

    // AUTH & AUDIT

    /// Installs the single operator account.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Verifies the operator credentials. Always false until an account has
    /// been installed.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        let ok = self
            .credentials
            .as_ref()
            .is_some_and(|c| c.verify(username, password));
        if ok {
            self.audit.record(format!("login ok: {username}"));
        } else {
            self.audit.record(format!("login failed: {username}"));
        }
        ok
    }

    /// Read-only audit history for display, oldest first.
    pub fn audit_history(&self) -> &[String] {
        self.audit.history()
    }

    // read-only views over the aggregates
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn record_outcome<T>(&mut self, action: String, res: &Result<T, DeskError>) {
        match res {
            Ok(_) => self.audit.record(format!("{action}: ok")),
            Err(err) => {
                warn!(%err, "{action} refused");
                self.audit.record(format!("{action}: refused ({err})"));
            }
        }
    }
}

fn check_book(book: &Book) -> Result<(), DeskError> {
    check_isbn(book.isbn())?;
    if !validate::is_valid_year(book.year()) {
        return Err(ValidationError::InvalidYear(book.year()).into());
    }
    if book.total_copies() == 0 {
        return Err(ValidationError::NoCopiesAcquired.into());
    }
    Ok(())
}

fn check_isbn(isbn: &str) -> Result<(), DeskError> {
    if !validate::is_valid_isbn(isbn) {
        return Err(ValidationError::InvalidIsbn(isbn.to_string()).into());
    }
    Ok(())
}

fn check_patron_id(patron_id: &str) -> Result<(), DeskError> {
    if !validate::is_valid_patron_id(patron_id) {
        return Err(ValidationError::InvalidPatronId(patron_id.to_string()).into());
    }
    Ok(())
}

fn check_patron(patron: &Patron) -> Result<(), DeskError> {
    check_patron_id(patron.id())?;
    if !validate::is_valid_name(patron.first_name()) {
        return Err(ValidationError::InvalidName(patron.first_name().to_string()).into());
    }
    if !validate::is_valid_name(patron.last_name()) {
        return Err(ValidationError::InvalidName(patron.last_name().to_string()).into());
    }
    if !validate::is_valid_email(patron.email()) {
        return Err(ValidationError::InvalidEmail(patron.email().to_string()).into());
    }
    Ok(())
}
