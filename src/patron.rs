//! Patron entity and its open-loan bookkeeping
//!
//! Each patron carries the ids of its currently open loans in insertion
//! order. The list is a back-reference maintained by the ledger for fast
//! cap-checking; the loan records themselves live in the ledger's history.

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Patron {
    #[n(0)]
    id: String,
    #[n(1)]
    first_name: String,
    #[n(2)]
    last_name: String,
    #[n(3)]
    email: String,
    #[n(4)]
    open_loans: Vec<u64>,
}

impl Patron {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            open_loans: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Ids of the patron's open loans, oldest first.
    pub fn open_loans(&self) -> &[u64] {
        &self.open_loans
    }

    pub fn open_loan_count(&self) -> usize {
        self.open_loans.len()
    }

    pub fn has_open_loans(&self) -> bool {
        !self.open_loans.is_empty()
    }

    /// Whether the patron may take another loan under the given cap.
    pub fn under_cap(&self, cap: usize) -> bool {
        self.open_loans.len() < cap
    }

    /// Records a newly opened loan. The cap is re-checked here so the list
    /// cannot grow past it even on a misuse of the ledger API.
    pub(crate) fn attach_loan(&mut self, loan_id: u64, cap: usize) {
        if self.under_cap(cap) && !self.open_loans.contains(&loan_id) {
            self.open_loans.push(loan_id);
        }
    }

    /// Drops a closed loan from the open list.
    pub(crate) fn detach_loan(&mut self, loan_id: u64) {
        self.open_loans.retain(|&id| id != loan_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Patron {
        Patron::new("0512108907", "Ada", "Lovelace", "ada@example.org")
    }

    #[test]
    fn attach_respects_cap() {
        let mut patron = sample();

        patron.attach_loan(1, 3);
        patron.attach_loan(2, 3);
        patron.attach_loan(3, 3);
        assert_eq!(patron.open_loan_count(), 3);
        assert!(!patron.under_cap(3));

        // a fourth attach is refused outright
        patron.attach_loan(4, 3);
        assert_eq!(patron.open_loans(), &[1, 2, 3]);
    }

    #[test]
    fn attach_ignores_duplicates() {
        let mut patron = sample();
        patron.attach_loan(7, 3);
        patron.attach_loan(7, 3);
        assert_eq!(patron.open_loans(), &[7]);
    }

    #[test]
    fn detach_preserves_insertion_order() {
        let mut patron = sample();
        patron.attach_loan(1, 3);
        patron.attach_loan(2, 3);
        patron.attach_loan(3, 3);

        patron.detach_loan(2);
        assert_eq!(patron.open_loans(), &[1, 3]);
        assert!(patron.has_open_loans());

        patron.detach_loan(1);
        patron.detach_loan(3);
        assert!(!patron.has_open_loans());
    }

    #[test]
    fn patron_encoding() {
        let mut original = sample();
        original.attach_loan(42, 3);

        let encoding = minicbor::to_vec(&original).unwrap();
        let decoded: Patron = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decoded);
    }
}
