//! Ordered closure chains.
//!
//! A [`ClosureChain`] is an insertion-ordered collection of named callables.
//! The same structure backs before-filters, after-filters and helpers; the
//! owner decides what the stored callable looks like and how it is invoked.

use crate::{ZephyrError, ZephyrResult};
use indexmap::IndexMap;

/// A single registered callable.
#[derive(Debug, Clone)]
pub struct ChainEntry<H> {
    name: String,
    handler: H,
    label: Option<String>,
}

impl<H> ChainEntry<H> {
    /// Returns the entry name (given or generated).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stored callable.
    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the optional descriptive label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// An insertion-ordered chain of named callables.
///
/// Every `add` appends a fresh entry, even when the name is already taken;
/// keeping names unique is up to the caller. Lookups by name resolve to the
/// most recent entry with that name.
///
/// # Example
///
/// ```
/// use zephyr_core::ClosureChain;
///
/// let mut chain: ClosureChain<fn(&mut String)> = ClosureChain::new("filter");
/// chain.add(Some("f1"), |out| out.push_str("test1"), None).unwrap();
/// chain.add(Some("f2"), |out| out.push_str("test2"), None).unwrap();
///
/// let mut out = String::new();
/// chain.run_all(|entry| {
///     (entry.handler())(&mut out);
///     Ok(())
/// }).unwrap();
/// assert_eq!(out, "test1test2");
/// ```
#[derive(Debug, Clone)]
pub struct ClosureChain<H> {
    kind: &'static str,
    entries: Vec<ChainEntry<H>>,
}

impl<H> ClosureChain<H> {
    /// Creates an empty chain. `kind` names the chain in errors and in
    /// generated entry names (e.g. `"filter"` → `filter_0`).
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Appends a callable and returns the name it was stored under.
    ///
    /// A missing name is generated from the chain kind and position, skipping
    /// names already in the chain; an empty name is rejected with [`ZephyrError::InvalidName`].
    pub fn add(&mut self, name: Option<&str>, handler: H, label: Option<&str>) -> ZephyrResult<&str> {
        let name = match name {
            Some("") => return Err(ZephyrError::invalid_name(self.kind)),
            Some(name) => name.to_string(),
            None => self.generate_name(),
        };

        tracing::debug!(chain = self.kind, name = %name, "closure registered");
        self.entries.push(ChainEntry {
            name,
            handler,
            label: label.map(ToString::to_string),
        });

        Ok(self.entries[self.entries.len() - 1].name())
    }

    /// Appends an anonymous callable.
    pub fn push(&mut self, handler: H) -> &str {
        let name = self.generate_name();
        self.entries.push(ChainEntry {
            name,
            handler,
            label: None,
        });
        self.entries[self.entries.len() - 1].name()
    }

    fn generate_name(&self) -> String {
        (self.entries.len()..)
            .map(|position| format!("{}_{position}", self.kind))
            .find(|name| !self.has(name))
            .unwrap_or_default()
    }

    /// Returns `true` if an entry with this name exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Returns the most recent callable registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&H> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| &e.handler)
    }

    /// Returns the chain as an ordered name → callable mapping.
    ///
    /// A repeated name keeps its first position and its latest callable.
    #[must_use]
    pub fn all(&self) -> IndexMap<&str, &H> {
        let mut all = IndexMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            all.insert(entry.name.as_str(), &entry.handler);
        }
        all
    }

    /// Returns the entry names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainEntry<H>> {
        self.entries.iter()
    }

    /// Invokes every entry in insertion order.
    ///
    /// Entries share whatever the invoker captures (typically the output
    /// buffer). The first error stops the run and is returned.
    pub fn run_all<F>(&self, mut invoke: F) -> ZephyrResult<()>
    where
        F: FnMut(&ChainEntry<H>) -> ZephyrResult<()>,
    {
        for entry in &self.entries {
            tracing::trace!(chain = self.kind, name = %entry.name, "running closure");
            invoke(entry)?;
        }
        Ok(())
    }

    /// Returns the chain kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Emit = fn(&mut String);

    fn chain() -> ClosureChain<Emit> {
        ClosureChain::new("filter")
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut chain = chain();
        let err = chain.add(Some(""), |_| {}, None).unwrap_err();
        assert!(matches!(err, ZephyrError::InvalidName { registry: "filter" }));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_generated_names() {
        let mut chain = chain();
        assert_eq!(chain.add(None, |_| {}, None).unwrap(), "filter_0");
        assert_eq!(chain.push(|_| {}), "filter_1");
        assert_eq!(chain.names().collect::<Vec<_>>(), ["filter_0", "filter_1"]);
    }

    #[test]
    fn test_generated_names_skip_taken_names() {
        let mut chain = chain();
        chain.add(Some("filter_1"), |out| out.push_str("named"), None).unwrap();
        assert_eq!(chain.add(None, |out| out.push_str("anonymous"), None).unwrap(), "filter_2");
        assert_eq!(chain.push(|_| {}), "filter_3");
        assert_eq!(chain.all().len(), 3);

        let mut out = String::new();
        (chain.get("filter_1").unwrap())(&mut out);
        assert_eq!(out, "named");
    }

    #[test]
    fn test_has_and_get() {
        let mut chain = chain();
        chain.add(Some("greet"), |out| out.push_str("hi"), Some("helper")).unwrap();

        assert!(chain.has("greet"));
        assert!(!chain.has("missing"));
        assert!(chain.get("missing").is_none());

        let mut out = String::new();
        (chain.get("greet").unwrap())(&mut out);
        assert_eq!(out, "hi");
        assert_eq!(chain.iter().next().unwrap().label(), Some("helper"));
    }

    #[test]
    fn test_run_all_preserves_insertion_order() {
        let mut chain = chain();
        chain.add(Some("test1"), |out| out.push_str("test1"), None).unwrap();
        chain.add(Some("test2"), |out| out.push_str("test2"), None).unwrap();

        let mut out = String::new();
        chain
            .run_all(|entry| {
                (entry.handler())(&mut out);
                Ok(())
            })
            .unwrap();
        assert_eq!(out, "test1test2");
    }

    #[test]
    fn test_duplicate_names_append() {
        let mut chain = chain();
        chain.add(Some("same"), |out| out.push('a'), None).unwrap();
        chain.add(Some("same"), |out| out.push('b'), None).unwrap();
        assert_eq!(chain.len(), 2);

        let mut out = String::new();
        chain
            .run_all(|entry| {
                (entry.handler())(&mut out);
                Ok(())
            })
            .unwrap();
        assert_eq!(out, "ab");

        let mut latest = String::new();
        (chain.get("same").unwrap())(&mut latest);
        assert_eq!(latest, "b");
        assert_eq!(chain.all().len(), 1);
    }

    #[test]
    fn test_run_all_stops_on_error() {
        let mut chain = chain();
        chain.push(|out| out.push('1'));
        chain.push(|out| out.push('2'));

        let mut out = String::new();
        let result = chain.run_all(|entry| {
            (entry.handler())(&mut out);
            Err(ZephyrError::invalid_payload("boom"))
        });
        assert!(result.is_err());
        assert_eq!(out, "1");
    }

    proptest! {
        #[test]
        fn run_all_visits_every_entry_in_order(named in proptest::collection::vec(any::<bool>(), 0..16)) {
            let mut chain = chain();
            for (i, is_named) in named.iter().enumerate() {
                let name = format!("entry{i}");
                chain.add(is_named.then_some(name.as_str()), |_| {}, None).unwrap();
            }

            let mut visited = Vec::new();
            chain.run_all(|entry| {
                visited.push(entry.name().to_string());
                Ok(())
            }).unwrap();

            let expected: Vec<String> = named
                .iter()
                .enumerate()
                .map(|(i, is_named)| if *is_named { format!("entry{i}") } else { format!("filter_{i}") })
                .collect();
            prop_assert_eq!(visited, expected);
        }
    }
}
