//! Insertion-ordered name tables backing every allocator namespace.
//!
//! Tables are read-only outside the crate: entries only enter through the
//! validated `add` paths of the owning allocator, and are never removed.

/// Insertion-ordered mapping from unique names to values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for NameTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NameTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Looks up the value registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates values in registration order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Finds the first entry whose value satisfies `predicate`.
    pub(crate) fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<(&str, &T)> {
        self.iter().find(|(_, value)| predicate(value))
    }

    /// Appends an entry. Callers validate name uniqueness first.
    pub(crate) fn insert(&mut self, name: String, value: T) {
        debug_assert!(!self.contains(&name), "duplicate table entry {name}");
        self.entries.push((name, value));
    }
}

impl<T> IntoIterator for NameTable<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::NameTable;

    #[test]
    fn empty_table() {
        let table: NameTable<u32> = NameTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.get("ctrl").is_none());
    }

    #[test]
    fn preserves_registration_order() {
        let mut table = NameTable::new();
        table.insert("uart".to_string(), 1);
        table.insert("ctrl".to_string(), 0);
        table.insert("timer".to_string(), 2);

        assert_eq!(table.names().collect::<Vec<_>>(), ["uart", "ctrl", "timer"]);
        assert_eq!(table.values().copied().collect::<Vec<_>>(), [1, 0, 2]);
        assert_eq!(table.get("ctrl"), Some(&0));
        assert!(table.contains("timer"));
    }

    #[test]
    fn find_returns_first_match() {
        let mut table = NameTable::new();
        table.insert("a".to_string(), 4);
        table.insert("b".to_string(), 8);
        table.insert("c".to_string(), 8);

        assert_eq!(table.find(|value| *value == 8), Some(("b", &8)));
        assert_eq!(table.find(|value| *value == 3), None);
    }

    #[test]
    fn into_iter_yields_owned_entries() {
        let mut table = NameTable::new();
        table.insert("rom".to_string(), 'r');
        let entries: Vec<_> = table.into_iter().collect();
        assert_eq!(entries, vec![("rom".to_string(), 'r')]);
    }
}
