//! Definition registries and the bibliography.

use std::collections::BTreeMap;
use std::collections::hash_map::{Entry, HashMap};

use tracing::debug;

use crate::node::{AnnotatedImage, CitationDefinition, LabelBlock, Node, NodeKind};
use crate::walk::enumerate;

/// Key → definition map where the first registration wins.
#[derive(Debug, Clone)]
pub struct DefinitionRegistry<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for DefinitionRegistry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> DefinitionRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `key`. Returns `false` (and drops `value`)
    /// when the key is already taken.
    pub fn register(&mut self, key: impl Into<String>, value: T) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(entry) => {
                debug!(key = %entry.key(), "duplicate definition ignored");
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Registries for every custom block kind that defines a key.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub images: DefinitionRegistry<AnnotatedImage>,
    pub citations: DefinitionRegistry<CitationDefinition>,
    pub labels: DefinitionRegistry<LabelBlock>,
}

impl Definitions {
    pub fn image(&self, key: &str) -> Option<&AnnotatedImage> {
        self.images.get(key)
    }

    pub fn citation(&self, key: &str) -> Option<&CitationDefinition> {
        self.citations.get(key)
    }

    pub fn label(&self, label: &str) -> Option<&LabelBlock> {
        self.labels.get(label)
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.citations.clear();
        self.labels.clear();
    }
}

/// Citation key → bibliography text, ordered by key.
///
/// Unlike [`DefinitionRegistry`], a repeated key overwrites the earlier text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bibliography {
    entries: BTreeMap<String, String>,
}

impl Bibliography {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every citation definition of `document`, trimmed.
    pub fn collect(&mut self, document: &Node) {
        enumerate(document, |node| {
            if let NodeKind::CitationDefinition(citation) = &node.kind {
                self.insert(citation.key.trim(), citation.text.trim());
            }
        });
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_first_registration_wins() {
        let mut registry = DefinitionRegistry::new();
        assert!(registry.register("k", 1));
        assert!(!registry.register("k", 2));
        assert_eq!(registry.get("k"), Some(&1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_bibliography_last_write_wins() {
        let mut biblio = Bibliography::new();
        biblio.insert("smith99", "first");
        biblio.insert("smith99", "second");
        biblio.insert("adams01", "other");
        assert_eq!(biblio.get("smith99"), Some("second"));
        let keys: Vec<_> = biblio.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["adams01", "smith99"]);
    }

    #[test]
    fn test_collect_from_tree() {
        let cite = |key: &str, text: &str| {
            Node::new(NodeKind::CitationDefinition(CitationDefinition {
                key: key.into(),
                text: text.into(),
            }))
        };
        let document = Node::with_children(
            NodeKind::Document,
            vec![
                cite("a", "first"),
                Node::with_children(NodeKind::BlockQuote, vec![cite("a", "nested")]),
                cite("b", "other"),
            ],
        );
        let mut biblio = Bibliography::new();
        biblio.collect(&document);
        assert_eq!(biblio.get("a"), Some("nested"));
        assert_eq!(biblio.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut defs = Definitions::default();
        defs.labels.register(
            "Note",
            LabelBlock {
                label: "Note".into(),
            },
        );
        assert!(defs.label("Note").is_some());
        defs.clear();
        assert!(defs.label("Note").is_none());
    }
}
