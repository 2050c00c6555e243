//! Loan ledger: the borrow/return state machine
//!
//! The ledger owns the full loan history and orchestrates the cross-entity
//! transaction rules: copy availability on the book side and the loan cap on
//! the patron side. It holds no references to the catalog or the registry;
//! both are passed into each transaction, and every entity touched during a
//! transaction is re-resolved by id through its owning aggregate. That keeps
//! a reloaded snapshot safe by construction - there is no embedded reference
//! that could go stale.
use crate::catalog::Catalog;
use crate::error::LendError;
use crate::loan::{Day, Loan};
use crate::patron::Patron;
use crate::registry::Registry;
use tracing::debug;

pub const DEFAULT_LOAN_CAP: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Ledger {
    #[n(0)]
    loans: Vec<Loan>,
    /// Monotonic id source. Deliberately not derived from `loans.len()`:
    /// loans are never removed today, but a counter stays correct even if
    /// deletion is ever added.
    #[n(1)]
    next_id: u64,
    #[n(2)]
    loan_cap: u64,
}

impl Ledger {
    pub fn new(loan_cap: usize) -> Self {
        Self {
            loans: Vec::new(),
            next_id: 1,
            loan_cap: loan_cap as u64,
        }
    }

    pub fn loan_cap(&self) -> usize {
        self.loan_cap as usize
    }

    /// Re-applies the configured cap, e.g. over a deserialized snapshot.
    pub fn set_loan_cap(&mut self, loan_cap: usize) {
        self.loan_cap = loan_cap as u64;
    }

    /// Opens a new loan for `patron_id` on one copy of `isbn`, due back on
    /// `due_date`.
    ///
    /// The transaction checks, in order: the book exists, the patron exists,
    /// a copy is available, the patron is under the loan cap, and the due
    /// date is not before today. On success the book's availability is
    /// decremented, the loan id is appended to the patron's open list and the
    /// record is appended to the history. On failure nothing changes.
    pub fn borrow(
        &mut self,
        catalog: &mut Catalog,
        registry: &mut Registry,
        isbn: &str,
        patron_id: &str,
        due_date: Day,
    ) -> Result<&Loan, LendError> {
        let start_date = Day::today();

        let book = catalog
            .get_mut(isbn)
            .ok_or_else(|| LendError::UnknownBook(isbn.to_string()))?;
        let patron = registry
            .get_mut(patron_id)
            .ok_or_else(|| LendError::UnknownPatron(patron_id.to_string()))?;

        // every check runs before any mutation, so a failed borrow is a no-op
        if !book.is_available() {
            return Err(LendError::NoCopies(isbn.to_string()));
        }
        if !patron.under_cap(self.loan_cap as usize) {
            return Err(LendError::CapReached(patron_id.to_string()));
        }
        if due_date < start_date {
            return Err(LendError::DueBeforeStart {
                start: start_date,
                due: due_date,
            });
        }

        let id = self.next_id;
        self.next_id += 1;

        book.checkout_copy();
        patron.attach_loan(id, self.loan_cap as usize);

        let loan = Loan::new(id, isbn.to_string(), patron_id.to_string(), start_date, due_date);
        debug!(loan_id = id, isbn, patron_id, "loan opened");
        self.loans.push(loan);

        Ok(self.loans.last().expect("just pushed"))
    }

    /// Closes the loan and restores one copy to the shelf.
    ///
    /// The book is resolved by ISBN through the catalog at return time, never
    /// through anything captured when the loan was opened; the same goes for
    /// the patron. If the referenced entity has meanwhile vanished from its
    /// aggregate (which the service-layer integrity gate prevents) the close
    /// still succeeds and only the side effect on that entity is skipped.
    pub fn return_loan(
        &mut self,
        catalog: &mut Catalog,
        registry: &mut Registry,
        loan_id: u64,
        returned_on: Day,
    ) -> Result<&Loan, LendError> {
        let loan = self
            .loans
            .iter_mut()
            .find(|loan| loan.id() == loan_id)
            .ok_or(LendError::UnknownLoan(loan_id))?;

        loan.close(returned_on)?;

        if let Some(book) = catalog.get_mut(loan.isbn()) {
            book.return_copy();
        }
        if let Some(patron) = registry.get_mut(loan.patron_id()) {
            patron.detach_loan(loan_id);
        }

        debug!(loan_id, overdue = loan.overdue_flagged(), "loan closed");
        Ok(&*loan)
    }

    /// All open loans, earliest due date first.
    pub fn active_loans(&self) -> Vec<&Loan> {
        let mut active: Vec<&Loan> = self.loans.iter().filter(|l| l.is_open()).collect();
        active.sort_by_key(|l| l.due_date());
        active
    }

    /// The patron's own open loans, resolved from its back-reference list
    /// rather than a ledger-wide scan. Order is insertion order.
    pub fn loans_for(&self, patron: &Patron) -> Vec<&Loan> {
        patron
            .open_loans()
            .iter()
            .filter_map(|&id| self.find_loan(id))
            .collect()
    }

    /// Open loans already past their due date as of `today`.
    pub fn overdue_loans_as_of(&self, today: Day) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.is_open() && l.is_overdue_as_of(today))
            .collect()
    }

    pub fn overdue_loans(&self) -> Vec<&Loan> {
        self.overdue_loans_as_of(Day::today())
    }

    /// Whether the patron currently holds any open loan. Unknown patrons
    /// trivially hold none.
    pub fn has_open_loans(&self, registry: &Registry, patron_id: &str) -> bool {
        registry
            .get(patron_id)
            .is_some_and(|patron| patron.has_open_loans())
    }

    /// Whether any open loan references the given ISBN. Consulted by the
    /// service layer before book removal or re-keying.
    pub fn is_book_on_loan(&self, isbn: &str) -> bool {
        self.loans.iter().any(|l| l.is_open() && l.isbn() == isbn)
    }

    pub fn find_loan(&self, loan_id: u64) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id() == loan_id)
    }

    /// The complete history, open and closed, in creation order.
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_LOAN_CAP)
    }
}
