//! Resource type validation.
//!
//! Handlers only ever ask one question about a resource type: is it
//! accepted? [`ResourceTypeValidator`] is that question. The server builds a
//! [`ResourceTypeList`] from its configured allow-list; tests and embedders
//! can pass any `Fn(&str) -> bool` instead.

use std::collections::HashSet;

/// Case-insensitive predicate over accepted resource type names.
pub trait ResourceTypeValidator: Send + Sync {
    /// Returns true if `name` is an accepted resource type.
    fn is_valid_resource_type(&self, name: &str) -> bool;
}

impl<F> ResourceTypeValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid_resource_type(&self, name: &str) -> bool {
        self(name)
    }
}

/// Allow-list of resource type names, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ResourceTypeList {
    names: HashSet<String>,
}

impl ResourceTypeList {
    /// Builds the list, lowercasing and trimming every entry. Blank entries are dropped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Accepted names in sorted order, for logging.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort();
        names
    }
}

impl ResourceTypeValidator for ResourceTypeList {
    fn is_valid_resource_type(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_case_insensitive() {
        let list = ResourceTypeList::new(["coins", "Rolls"]);
        assert!(list.is_valid_resource_type("coins"));
        assert!(list.is_valid_resource_type("COINS"));
        assert!(list.is_valid_resource_type("rolls"));
        assert!(!list.is_valid_resource_type("unobtainium"));
        assert!(!list.is_valid_resource_type(""));
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let list = ResourceTypeList::new(vec![" coins ", "", "   "]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.names(), vec!["coins".to_string()]);
    }

    #[test]
    fn test_closure_validator() {
        let only_gems = |name: &str| name.eq_ignore_ascii_case("gems");
        assert!(only_gems.is_valid_resource_type("Gems"));
        assert!(!only_gems.is_valid_resource_type("coins"));
    }
}
