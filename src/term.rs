//! Language-keyed term lists.
//!
//! Lemmas, form representations and sense glosses are all term lists: at most
//! one text per language. Term lists are ordered by language code, so two
//! lists compare equal exactly when they hold the same language/text pairs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A set of texts keyed by language code.
///
/// Deserialising goes through [`TermList::set`] for every entry, so stored
/// data with blank languages or texts is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct TermList(BTreeMap<String, String>);

impl TryFrom<BTreeMap<String, String>> for TermList {
    type Error = ValidationError;

    fn try_from(terms: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_pairs(terms)
    }
}

impl From<TermList> for BTreeMap<String, String> {
    fn from(list: TermList) -> Self {
        list.0
    }
}

impl TermList {
    /// Creates an empty term list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a term list from language/text pairs. Later pairs for the same
    /// language replace earlier ones.
    pub fn from_pairs<L, T>(pairs: impl IntoIterator<Item = (L, T)>) -> Result<Self, ValidationError>
    where
        L: Into<String>,
        T: Into<String>,
    {
        let mut list = Self::new();
        for (language, text) in pairs {
            list.set(language, text)?;
        }
        Ok(list)
    }

    /// Sets the text for a language, replacing any previous text.
    pub fn set(
        &mut self,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let language = language.into();
        let text = text.into();
        if language.trim().is_empty() {
            return Err(ValidationError::EmptyLanguageCode);
        }
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyTermText { language });
        }
        self.0.insert(language, text);
        Ok(())
    }

    /// Removes the text for a language, returning it if present.
    pub fn remove(&mut self, language: &str) -> Option<String> {
        self.0.remove(language)
    }

    /// The text for `language`.
    #[must_use]
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// Whether `language` has a text.
    #[must_use]
    pub fn has_language(&self, language: &str) -> bool {
        self.0.contains_key(language)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(language, text)` pairs in language order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = TermList::from_pairs([("en", "color"), ("en-gb", "colour")]).unwrap();
        let b = TermList::from_pairs([("en-gb", "colour"), ("en", "color")]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_subset_is_not_equal() {
        let a = TermList::from_pairs([("en", "color")]).unwrap();
        let b = TermList::from_pairs([("en", "color"), ("en-gb", "colour")]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_set_replaces_text() {
        let mut list = TermList::from_pairs([("en", "colour")]).unwrap();
        list.set("en", "color").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("en"), Some("color"));
    }

    #[test]
    fn test_rejects_empty_parts() {
        let mut list = TermList::new();
        assert_eq!(list.set("", "x"), Err(ValidationError::EmptyLanguageCode));
        assert!(matches!(
            list.set("en", "  "),
            Err(ValidationError::EmptyTermText { .. })
        ));
        assert!(list.is_empty());
    }

    #[test]
    fn test_serializes_as_map() {
        let list = TermList::from_pairs([("en", "foo")]).unwrap();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"{"en":"foo"}"#);
        let back: TermList = serde_json::from_str(r#"{"en":"foo"}"#).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn test_deserialize_rejects_empty_parts() {
        assert!(serde_json::from_str::<TermList>(r#"{"en":""}"#).is_err());
        assert!(serde_json::from_str::<TermList>(r#"{"":"   "}"#).is_err());
        assert!(serde_json::from_str::<TermList>(r#"{" ":"foo"}"#).is_err());
    }
}
