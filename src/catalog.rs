//! Catalog of labels the detector can recognize
//!
//! Built once at startup from the detector's label set, read-only afterward.
//! Spoken input is matched case-insensitively against this set.

use std::collections::HashMap;

/// Immutable, case-insensitive set of recognizable labels
///
/// Maps the lowercased form of each label to its canonical spelling as
/// reported by the detector.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    by_lower: HashMap<String, String>,
}

impl ItemCatalog {
    /// Build a catalog from the detector's label set
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_lower = HashMap::new();
        for label in labels {
            let canonical: String = label.into();
            by_lower.insert(canonical.to_lowercase(), canonical);
        }
        Self { by_lower }
    }

    /// Resolve spoken input to a canonical label
    ///
    /// Input is trimmed and case-folded before lookup, so `"DOG "` resolves
    /// the same as `"dog"`. Returns `None` when the label is not in the
    /// detector's vocabulary.
    #[must_use]
    pub fn resolve(&self, spoken: &str) -> Option<&str> {
        self.by_lower
            .get(&spoken.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Whether a canonical or spoken form of `label` is in the catalog
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.resolve(label).is_some()
    }

    /// Iterate over canonical labels (unordered)
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_lower.values().map(String::as_str)
    }

    /// Number of labels in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_lower.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_lower.is_empty()
    }

    /// Canonical labels sorted for display
    #[must_use]
    pub fn sorted_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.labels().collect();
        labels.sort_unstable();
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ItemCatalog {
        ItemCatalog::new(["person", "dog", "traffic light"])
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let c = catalog();
        assert_eq!(c.resolve("DOG"), Some("dog"));
        assert_eq!(c.resolve("Traffic Light"), Some("traffic light"));
    }

    #[test]
    fn resolve_trims_whitespace() {
        let c = catalog();
        assert_eq!(c.resolve("  dog \n"), Some("dog"));
    }

    #[test]
    fn resolve_misses_unknown_label() {
        let c = catalog();
        assert_eq!(c.resolve("elephant"), None);
        assert!(!c.contains("elephant"));
    }

    #[test]
    fn canonical_spelling_is_preserved() {
        let c = ItemCatalog::new(["Person"]);
        assert_eq!(c.resolve("person"), Some("Person"));
    }

    #[test]
    fn len_counts_unique_labels() {
        let c = catalog();
        assert_eq!(c.len(), 3);
        assert!(!c.is_empty());
    }

    #[test]
    fn sorted_labels_are_ordered() {
        let c = catalog();
        assert_eq!(c.sorted_labels(), vec!["dog", "person", "traffic light"]);
    }
}
