//! Re-targeting statement values from source ids to target ids.
//!
//! After a merge the source lexeme becomes a redirect and its forms and senses
//! stop resolving. Statement values on the target that still point at them
//! are rewritten to the entity that now carries their content.

use std::collections::HashMap;

use crate::ids::{EntityIdValue, FormId, LexemeId, SenseId};
use crate::lexeme::Lexeme;
use crate::merge::outcome::SubEntityMerge;

/// Source ids mapped to the target ids that replace them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    replacements: HashMap<EntityIdValue, EntityIdValue>,
}

impl ReferenceMap {
    /// Builds the map for a merge of `source` into `target`.
    #[must_use]
    pub fn new(
        source: LexemeId,
        target: LexemeId,
        forms: &SubEntityMerge<FormId>,
        senses: &SubEntityMerge<SenseId>,
    ) -> Self {
        let mut replacements = HashMap::new();
        replacements.insert(EntityIdValue::Lexeme(source), EntityIdValue::Lexeme(target));
        for (from, to) in forms.mappings() {
            replacements.insert(EntityIdValue::Form(from), EntityIdValue::Form(to));
        }
        for (from, to) in senses.mappings() {
            replacements.insert(EntityIdValue::Sense(from), EntityIdValue::Sense(to));
        }
        Self { replacements }
    }

    /// The replacement for `id`, if it was moved.
    #[must_use]
    pub fn get(&self, id: &EntityIdValue) -> Option<EntityIdValue> {
        self.replacements.get(id).copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Rewrites every mapped value in the statements of `lexeme`, its forms
    /// and senses. Returns the number of rewritten values.
    pub fn apply(&self, lexeme: &mut Lexeme) -> usize {
        lexeme
            .all_statements_mut()
            .map(|statement| statement.retarget_references(|id| self.get(id)))
            .sum()
    }
}
