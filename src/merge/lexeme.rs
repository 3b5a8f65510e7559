//! The lexeme merge orchestrator.

use std::sync::Arc;

use crate::error::MergeError;
use crate::lexeme::Lexeme;
use crate::merge::forms::FormsMerger;
use crate::merge::outcome::MergeOutcome;
use crate::merge::references::ReferenceMap;
use crate::merge::senses::SensesMerger;
use crate::merge::statements::StatementsMerger;
use crate::statement::{GuidGenerator, RandomGuidGenerator};

/// Merges one lexeme into another, in memory.
///
/// Statements are merged first, then forms, then senses. Afterwards every
/// statement on the target that still points at the source lexeme or at one
/// of its moved forms or senses is re-targeted. Lemmas, language and lexical
/// category of the source are not carried over.
///
/// Running a merge twice on the same pair duplicates statements; call it once
/// per logical merge.
#[derive(Clone)]
pub struct LexemeMerger {
    statements: StatementsMerger,
    forms: FormsMerger,
    senses: SensesMerger,
}

impl LexemeMerger {
    /// Creates a merger that assigns GUIDs from `guids`.
    #[must_use]
    pub fn new(guids: Arc<dyn GuidGenerator>) -> Self {
        let statements = StatementsMerger::new(guids);
        Self {
            forms: FormsMerger::new(statements.clone()),
            senses: SensesMerger::new(statements.clone()),
            statements,
        }
    }

    /// Merges `source` into `target`. `source` is never modified.
    ///
    /// # Errors
    ///
    /// `ReferenceSameLexeme` if both carry the same id. Anything else is an
    /// invariant violation of the inputs.
    pub fn merge(&self, source: &Lexeme, target: &mut Lexeme) -> Result<MergeOutcome, MergeError> {
        let (Some(source_id), Some(target_id)) = (source.id(), target.id()) else {
            return Err(MergeError::invariant("cannot merge a lexeme without an id"));
        };
        if source_id == target_id {
            return Err(MergeError::ReferenceSameLexeme { id: source_id });
        }

        let statements_copied = self.statements.merge(source, target)?;
        let forms = self.forms.merge(source, target)?;
        let senses = self.senses.merge(source, target)?;

        let references = ReferenceMap::new(source_id, target_id, &forms, &senses);
        let references_retargeted = references.apply(target);

        Ok(MergeOutcome {
            statements_copied,
            forms,
            senses,
            references,
            references_retargeted,
        })
    }
}

impl Default for LexemeMerger {
    fn default() -> Self {
        Self::new(Arc::new(RandomGuidGenerator))
    }
}
