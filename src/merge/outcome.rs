//! What a merge changed.

use crate::ids::{FormId, SenseId};
use crate::merge::references::ReferenceMap;

/// How the source's forms (or senses) landed on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubEntityMerge<I> {
    /// `(source id, new target id)` for sub-entities copied as new ones.
    pub copied: Vec<(I, I)>,
    /// `(source id, target id)` for sub-entities whose statements were
    /// attached to an equivalent existing one.
    pub matched: Vec<(I, I)>,
    /// Statements copied onto target sub-entities.
    pub statements_copied: usize,
}

impl<I> Default for SubEntityMerge<I> {
    fn default() -> Self {
        Self {
            copied: Vec::new(),
            matched: Vec::new(),
            statements_copied: 0,
        }
    }
}

impl<I: Copy> SubEntityMerge<I> {
    /// Every `(source id, target id)` pair, copied and matched.
    pub fn mappings(&self) -> impl Iterator<Item = (I, I)> + '_ {
        self.copied.iter().chain(self.matched.iter()).copied()
    }
}

/// Auditable description of a completed [`LexemeMerger`](super::LexemeMerger) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Top-level statements copied onto the target lexeme.
    pub statements_copied: usize,
    /// Form mapping.
    pub forms: SubEntityMerge<FormId>,
    /// Sense mapping.
    pub senses: SubEntityMerge<SenseId>,
    /// Source ids and the target ids that now carry their content.
    pub references: ReferenceMap,
    /// Statement values rewritten from source ids to target ids.
    pub references_retargeted: usize,
}

impl MergeOutcome {
    /// Total statements added to the target, at any level.
    #[must_use]
    pub fn total_statements_copied(&self) -> usize {
        self.statements_copied + self.forms.statements_copied + self.senses.statements_copied
    }
}
