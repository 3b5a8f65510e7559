//! Senses: meanings of a lexeme described by glosses.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{EntityIdValue, SenseId};
use crate::statement::{StatementList, StatementListProvider};
use crate::term::TermList;

/// A meaning of a lexeme. A sense always has at least one gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    id: SenseId,
    glosses: TermList,
    #[serde(default)]
    statements: StatementList,
}

impl Sense {
    /// Creates a sense. At least one gloss is required.
    pub fn new(id: SenseId, glosses: TermList) -> Result<Self, ValidationError> {
        if glosses.is_empty() {
            return Err(ValidationError::EmptyGlosses);
        }
        Ok(Self {
            id,
            glosses,
            statements: StatementList::new(),
        })
    }

    /// Replaces the statements.
    #[must_use]
    pub fn with_statements(mut self, statements: StatementList) -> Self {
        self.statements = statements;
        self
    }

    /// The sense id.
    #[must_use]
    pub const fn id(&self) -> SenseId {
        self.id
    }

    /// Glosses by language.
    #[must_use]
    pub const fn glosses(&self) -> &TermList {
        &self.glosses
    }

    /// Sets the gloss for a language.
    pub fn set_gloss(
        &mut self,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.glosses.set(language, text)
    }

    /// Removes a gloss. Refuses to remove the last one.
    pub fn remove_gloss(&mut self, language: &str) -> Result<Option<String>, ValidationError> {
        if self.glosses.len() == 1 && self.glosses.has_language(language) {
            return Err(ValidationError::LastGloss { sense_id: self.id });
        }
        Ok(self.glosses.remove(language))
    }

    /// Two senses are equivalent when their gloss sets are identical.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.glosses == other.glosses
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.glosses.is_empty() {
            return Err(ValidationError::EmptyGlosses);
        }
        Ok(())
    }
}

impl StatementListProvider for Sense {
    fn statement_owner(&self) -> Option<EntityIdValue> {
        Some(EntityIdValue::Sense(self.id))
    }

    fn statements(&self) -> &StatementList {
        &self.statements
    }

    fn statements_mut(&mut self) -> &mut StatementList {
        &mut self.statements
    }
}
