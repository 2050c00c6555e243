//! Walkthrough of a day at the circulation desk: seed a catalog and a
//! patron, open a loan, bounce an over-cap borrow, return the book and
//! snapshot everything to a sled archive.
//!
//! Run with `cargo run --example circulation`.

use circulation_desk::archive::Archive;
use circulation_desk::auth::Credentials;
use circulation_desk::book::Book;
use circulation_desk::loan::Day;
use circulation_desk::patron::Patron;
use circulation_desk::service::{CirculationService, Policy};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = std::env::temp_dir().join("circulation-demo.db");
    let archive = Archive::open(&db_path)?;
    let mut desk = CirculationService::new(archive, Policy::default());
    desk.load_state()?;

    desk.set_credentials(Credentials::new("librarian", "hunter2"));
    anyhow::ensure!(desk.login("librarian", "hunter2"), "login rejected");

    let isbn = "978-0201633610";
    let patron_id = "0512108907";

    if desk.catalog().get(isbn).is_none() {
        desk.add_book(Book::new(
            isbn,
            "Design Patterns",
            vec!["Gamma".into(), "Helm".into(), "Johnson".into(), "Vlissides".into()],
            1994,
            2,
        ))?;
    }
    if desk.registry().get(patron_id).is_none() {
        desk.add_patron(Patron::new(patron_id, "Ada", "Lovelace", "ada@example.org"))?;
    }

    let due = Day::today().plus_days(14);
    let loan = desk.borrow_book(isbn, patron_id, due)?;
    println!(
        "loan {} opened, due {}; {} copies left on the shelf",
        loan.id(),
        loan.due_date(),
        desk.catalog().get(isbn).map(|b| b.available_copies()).unwrap_or(0),
    );

    for active in desk.active_loans() {
        println!("active: loan {} of {} to {}", active.id(), active.isbn(), active.patron_id());
    }

    let closed = desk.return_book(loan.id(), due)?;
    println!("loan {} closed, overdue: {}", closed.id(), closed.overdue_flagged());

    desk.save_state()?;
    println!("--- audit trail ---");
    for record in desk.audit_history() {
        println!("{record}");
    }

    Ok(())
}
