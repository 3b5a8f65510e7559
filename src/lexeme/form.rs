//! Forms: inflected or variant spellings of a lexeme.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{EntityIdValue, FormId, ItemId};
use crate::statement::{StatementList, StatementListProvider};
use crate::term::TermList;

/// A written representation of a lexeme plus its grammatical features.
///
/// A form always has at least one representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    id: FormId,
    representations: TermList,
    #[serde(default)]
    grammatical_features: BTreeSet<ItemId>,
    #[serde(default)]
    statements: StatementList,
}

impl Form {
    /// Creates a form. Duplicate grammatical features collapse.
    pub fn new(
        id: FormId,
        representations: TermList,
        grammatical_features: impl IntoIterator<Item = ItemId>,
    ) -> Result<Self, ValidationError> {
        if representations.is_empty() {
            return Err(ValidationError::EmptyRepresentations);
        }
        Ok(Self {
            id,
            representations,
            grammatical_features: grammatical_features.into_iter().collect(),
            statements: StatementList::new(),
        })
    }

    /// Replaces the statements.
    #[must_use]
    pub fn with_statements(mut self, statements: StatementList) -> Self {
        self.statements = statements;
        self
    }

    /// The form id.
    #[must_use]
    pub const fn id(&self) -> FormId {
        self.id
    }

    /// Representations by language.
    #[must_use]
    pub const fn representations(&self) -> &TermList {
        &self.representations
    }

    /// Grammatical feature items.
    #[must_use]
    pub const fn grammatical_features(&self) -> &BTreeSet<ItemId> {
        &self.grammatical_features
    }

    /// Sets the representation for a language.
    pub fn set_representation(
        &mut self,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.representations.set(language, text)
    }

    /// Removes a representation. Refuses to remove the last one.
    pub fn remove_representation(&mut self, language: &str) -> Result<Option<String>, ValidationError> {
        if self.representations.len() == 1 && self.representations.has_language(language) {
            return Err(ValidationError::LastRepresentation { form_id: self.id });
        }
        Ok(self.representations.remove(language))
    }

    /// Replaces the grammatical features.
    pub fn set_grammatical_features(&mut self, features: impl IntoIterator<Item = ItemId>) {
        self.grammatical_features = features.into_iter().collect();
    }

    /// Two forms are equivalent when their representation sets are identical.
    /// Ids, grammatical features and statements are ignored.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.representations == other.representations
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.representations.is_empty() {
            return Err(ValidationError::EmptyRepresentations);
        }
        Ok(())
    }
}

impl StatementListProvider for Form {
    fn statement_owner(&self) -> Option<EntityIdValue> {
        Some(EntityIdValue::Form(self.id))
    }

    fn statements(&self) -> &StatementList {
        &self.statements
    }

    fn statements_mut(&mut self) -> &mut StatementList {
        &mut self.statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(id: &str, reps: &[(&str, &str)]) -> Form {
        Form::new(
            id.parse().unwrap(),
            TermList::from_pairs(reps.iter().copied()).unwrap(),
            [],
        )
        .unwrap()
    }

    #[test]
    fn test_requires_representation() {
        let err = Form::new("L1-F1".parse().unwrap(), TermList::new(), []).unwrap_err();
        assert_eq!(err, ValidationError::EmptyRepresentations);
    }

    #[test]
    fn test_features_collapse_duplicates() {
        let q1: ItemId = "Q1".parse().unwrap();
        let q2: ItemId = "Q2".parse().unwrap();
        let mut f = form("L1-F1", &[("en", "goes")]);
        f.set_grammatical_features([q2, q1, q2]);
        assert_eq!(f.grammatical_features().iter().copied().collect::<Vec<_>>(), vec![q1, q2]);
    }

    #[test]
    fn test_cannot_remove_last_representation() {
        let mut f = form("L1-F1", &[("en", "goes")]);
        let err = f.remove_representation("en").unwrap_err();
        assert!(matches!(err, ValidationError::LastRepresentation { .. }));
        assert_eq!(f.representations().get("en"), Some("goes"));
    }

    #[test]
    fn test_remove_representation() {
        let mut f = form("L1-F1", &[("en", "color"), ("en-gb", "colour")]);
        assert_eq!(f.remove_representation("en-gb").unwrap(), Some("colour".to_string()));
        assert_eq!(f.remove_representation("de").unwrap(), None);
        assert_eq!(f.representations().len(), 1);
    }

    #[test]
    fn test_equivalence_ignores_id_and_features() {
        let a = form("L1-F1", &[("en", "goes")]);
        let mut b = form("L2-F9", &[("en", "goes")]);
        b.set_grammatical_features(["Q3".parse().unwrap()]);
        assert!(a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&form("L1-F2", &[("en", "went")])));
    }
}
