//! Patron registry aggregate
use crate::error::RegistryError;
use crate::patron::Patron;
use std::collections::BTreeMap;

/// Which field a registry search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatronField {
    LastName,
    PatronId,
}

/// Owns every registered patron, keyed by patron id.
///
/// Like the catalog, the registry only enforces key uniqueness; the open-loan
/// gate for removals lives in the service layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Registry {
    #[n(0)]
    patrons: BTreeMap<String, Patron>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, patron: Patron) -> Result<(), RegistryError> {
        if self.patrons.contains_key(patron.id()) {
            return Err(RegistryError::DuplicateId(patron.id().to_string()));
        }

        self.patrons.insert(patron.id().to_string(), patron);
        Ok(())
    }

    pub fn remove(&mut self, patron_id: &str) -> Result<Patron, RegistryError> {
        self.patrons
            .remove(patron_id)
            .ok_or_else(|| RegistryError::UnknownId(patron_id.to_string()))
    }

    /// Replaces the record stored under `old_id`, re-keying when the new
    /// record carries a different id. Re-keying onto an id held by another
    /// patron fails.
    pub fn update(&mut self, old_id: &str, patron: Patron) -> Result<(), RegistryError> {
        if !self.patrons.contains_key(old_id) {
            return Err(RegistryError::UnknownId(old_id.to_string()));
        }

        if old_id != patron.id() {
            if self.patrons.contains_key(patron.id()) {
                return Err(RegistryError::DuplicateId(patron.id().to_string()));
            }
            self.patrons.remove(old_id);
        }

        self.patrons.insert(patron.id().to_string(), patron);
        Ok(())
    }

    pub fn get(&self, patron_id: &str) -> Option<&Patron> {
        self.patrons.get(patron_id)
    }

    pub(crate) fn get_mut(&mut self, patron_id: &str) -> Option<&mut Patron> {
        self.patrons.get_mut(patron_id)
    }

    /// Case-insensitive substring search. Patron ids are matched as
    /// substrings too, not exactly.
    pub fn search(&self, query: &str, field: PatronField) -> Vec<&Patron> {
        let needle = query.to_lowercase();

        self.patrons
            .values()
            .filter(|patron| match field {
                PatronField::LastName => patron.last_name().to_lowercase().contains(&needle),
                PatronField::PatronId => patron.id().contains(&needle),
            })
            .collect()
    }

    /// All patrons ordered by last name then first name, case-insensitive.
    pub fn list_sorted(&self) -> Vec<&Patron> {
        let mut patrons: Vec<&Patron> = self.patrons.values().collect();
        patrons.sort_by_key(|p| (p.last_name().to_lowercase(), p.first_name().to_lowercase()));
        patrons
    }

    pub fn len(&self) -> usize {
        self.patrons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patrons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patron(id: &str, first: &str, last: &str) -> Patron {
        Patron::new(id, first, last, format!("{first}@example.org").to_lowercase())
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = Registry::new();
        registry.add(patron("0512108907", "Ada", "Lovelace")).unwrap();

        let res = registry.add(patron("0512108907", "Grace", "Hopper"));
        assert_eq!(res, Err(RegistryError::DuplicateId("0512108907".into())));
        assert_eq!(registry.get("0512108907").unwrap().first_name(), "Ada");
    }

    #[test]
    fn update_rekeys_the_entry() {
        let mut registry = Registry::new();
        registry.add(patron("0512108907", "Ada", "Lovelace")).unwrap();

        registry
            .update("0512108907", patron("0512108999", "Ada", "Lovelace"))
            .unwrap();

        assert!(registry.get("0512108907").is_none());
        assert!(registry.get("0512108999").is_some());
    }

    #[test]
    fn id_search_is_substring() {
        let mut registry = Registry::new();
        registry.add(patron("0512108907", "Ada", "Lovelace")).unwrap();
        registry.add(patron("0612108908", "Grace", "Hopper")).unwrap();

        assert_eq!(registry.search("0512", PatronField::PatronId).len(), 1);
        assert_eq!(registry.search("1210890", PatronField::PatronId).len(), 2);
    }

    #[test]
    fn listing_sorts_by_last_then_first_name() {
        let mut registry = Registry::new();
        registry.add(patron("0000000001", "Grace", "hopper")).unwrap();
        registry.add(patron("0000000002", "Ada", "Lovelace")).unwrap();
        registry.add(patron("0000000003", "Alan", "Hopper")).unwrap();

        let names: Vec<(&str, &str)> = registry
            .list_sorted()
            .iter()
            .map(|p| (p.last_name(), p.first_name()))
            .collect();
        assert_eq!(
            names,
            vec![("Hopper", "Alan"), ("hopper", "Grace"), ("Lovelace", "Ada")]
        );
    }
}
