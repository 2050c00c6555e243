//! Property-based tests for the loan ledger invariants
//!
//! Random interleavings of borrow and return attempts across several patrons
//! must never drive a book's availability outside `[0, total]`, never push a
//! patron past the loan cap, and must keep the conservation equation
//! `available == total - open_loans` true at every step.

use circulation_desk::book::Book;
use circulation_desk::catalog::Catalog;
use circulation_desk::error::LendError;
use circulation_desk::ledger::Ledger;
use circulation_desk::loan::Day;
use circulation_desk::patron::Patron;
use circulation_desk::registry::Registry;
use proptest::prelude::*;

const ISBN: &str = "978-0201633610";
const LOAN_CAP: usize = 3;
const PATRONS: usize = 5;

fn patron_id(index: usize) -> String {
    format!("{index:010}")
}

fn fixture(total_copies: u32) -> (Catalog, Registry, Ledger) {
    let mut catalog = Catalog::new();
    catalog
        .add(Book::new(ISBN, "Design Patterns", vec!["Gamma".into(), "Helm".into()], 1994, total_copies))
        .unwrap();

    let mut registry = Registry::new();
    for index in 0..PATRONS {
        registry
            .add(Patron::new(patron_id(index), "Test", "Patron", "patron@example.org"))
            .unwrap();
    }

    (catalog, registry, Ledger::new(LOAN_CAP))
}

/// One step of a random circulation history: a borrow attempt by some
/// patron, or a return of the oldest still-open loan.
fn op_strategy() -> impl Strategy<Value = (bool, usize)> {
    (prop::bool::ANY, 0usize..PATRONS)
}

proptest! {
    /// Property: availability conservation and the loan cap hold across any
    /// interleaving of borrows and returns.
    #[test]
    fn prop_conservation_and_cap_hold(
        total_copies in 1u32..=4,
        ops in prop::collection::vec(op_strategy(), 1..50),
    ) {
        let (mut catalog, mut registry, mut ledger) = fixture(total_copies);
        let due = Day::today().plus_days(14);
        let mut open: Vec<u64> = Vec::new();

        for (is_borrow, patron_index) in ops {
            if is_borrow {
                let id = patron_id(patron_index);
                let expect_ok = catalog.get(ISBN).unwrap().is_available()
                    && registry.get(&id).unwrap().open_loan_count() < LOAN_CAP;

                match ledger.borrow(&mut catalog, &mut registry, ISBN, &id, due) {
                    Ok(loan) => {
                        prop_assert!(expect_ok, "borrow succeeded against a violated precondition");
                        open.push(loan.id());
                    }
                    Err(err) => {
                        prop_assert!(!expect_ok, "borrow failed with free copies and cap room: {err}");
                        prop_assert!(matches!(err, LendError::NoCopies(_) | LendError::CapReached(_)));
                    }
                }
            } else if let Some(id) = open.first().copied() {
                ledger.return_loan(&mut catalog, &mut registry, id, Day::today()).unwrap();
                open.remove(0);
            }

            // invariants checked after every step, not just at the end
            let available = catalog.get(ISBN).unwrap().available_copies();
            prop_assert!(available <= total_copies);
            prop_assert_eq!(available, total_copies - open.len() as u32);
            for index in 0..PATRONS {
                prop_assert!(registry.get(&patron_id(index)).unwrap().open_loan_count() <= LOAN_CAP);
            }
        }
    }

    /// Property: loan ids are unique and strictly increasing in creation
    /// order, regardless of how many borrows fail in between.
    #[test]
    fn prop_loan_ids_strictly_increase(
        ops in prop::collection::vec(op_strategy(), 1..50),
    ) {
        let (mut catalog, mut registry, mut ledger) = fixture(2);
        let due = Day::today().plus_days(14);
        let mut open: Vec<u64> = Vec::new();

        for (is_borrow, patron_index) in ops {
            if is_borrow {
                if let Ok(loan) = ledger.borrow(&mut catalog, &mut registry, ISBN, &patron_id(patron_index), due) {
                    open.push(loan.id());
                }
            } else if let Some(id) = open.pop() {
                ledger.return_loan(&mut catalog, &mut registry, id, Day::today()).unwrap();
            }
        }

        let ids: Vec<u64> = ledger.loans().iter().map(|l| l.id()).collect();
        for pair in ids.windows(2) {
            prop_assert!(pair[0] < pair[1], "ids not strictly increasing: {ids:?}");
        }
    }

    /// Property: closing is one-way. Whatever loan we pick from a random
    /// history, a second return always fails and changes nothing.
    #[test]
    fn prop_second_return_is_always_refused(
        borrows in 1usize..=3,
    ) {
        let (mut catalog, mut registry, mut ledger) = fixture(3);
        let due = Day::today().plus_days(14);

        let mut ids = Vec::new();
        for _ in 0..borrows {
            ids.push(ledger.borrow(&mut catalog, &mut registry, ISBN, &patron_id(0), due).unwrap().id());
        }

        for id in ids {
            ledger.return_loan(&mut catalog, &mut registry, id, Day::today()).unwrap();
            let before = catalog.get(ISBN).unwrap().available_copies();

            let second = ledger.return_loan(&mut catalog, &mut registry, id, Day::today());
            prop_assert_eq!(second.unwrap_err(), LendError::AlreadyClosed(id));
            prop_assert_eq!(catalog.get(ISBN).unwrap().available_copies(), before);
        }
    }
}
