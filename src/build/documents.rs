//! Document types and the per-run document index.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{FormatTable, OutputFormat};

/// Maps each staged document's base name to the type directory it came from.
///
/// Built fresh while staging and discarded at the end of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentIndex {
    types_by_name: BTreeMap<String, String>,
    types: BTreeSet<String>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that document `name` belongs to `doc_type`.
    ///
    /// Returns the previous type when the base name was already taken.
    pub fn insert(&mut self, name: &str, doc_type: &str) -> Option<String> {
        self.types.insert(doc_type.to_string());
        self.types_by_name
            .insert(name.to_string(), doc_type.to_string())
    }

    /// Record a type directory even when it holds no documents.
    pub fn add_type(&mut self, doc_type: &str) {
        self.types.insert(doc_type.to_string());
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.types_by_name.get(name).map(String::as_str)
    }

    /// All discovered type names, sorted.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    /// Document names in sorted order, with their types.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types_by_name
            .iter()
            .map(|(name, doc_type)| (name.as_str(), doc_type.as_str()))
    }

    pub fn len(&self) -> usize {
        self.types_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types_by_name.is_empty()
    }
}

/// Whether documents of `doc_type` are rendered into `format`.
///
/// Types missing from the table request nothing.
pub fn wants(formats: &FormatTable, doc_type: &str, format: OutputFormat) -> bool {
    formats
        .get(doc_type)
        .is_some_and(|set| set.contains(&format))
}

/// Documents from `index` whose type requests `format`, in name order.
pub fn selected<'a>(
    index: &'a DocumentIndex,
    formats: &'a FormatTable,
    format: OutputFormat,
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    index.documents().filter(move |(name, doc_type)| {
        let keep = wants(formats, doc_type, format);
        if !keep && !formats.contains_key(*doc_type) {
            tracing::debug!(document = name, doc_type, %format, "skipping document of unknown type");
        }
        keep
    })
}
