//! Sense merging.

use crate::error::MergeError;
use crate::ids::SenseId;
use crate::lexeme::{Lexeme, Sense};
use crate::merge::outcome::SubEntityMerge;
use crate::merge::statements::StatementsMerger;

/// Moves the source's senses onto the target, keyed on gloss equality.
///
/// Senses are never removed. Redundant senses already on the target stay,
/// and redundant senses on the source are each copied unless the target had
/// an equivalent before the merge.
#[derive(Clone)]
pub struct SensesMerger {
    statements: StatementsMerger,
}

impl SensesMerger {
    /// Creates a merger that delegates statements to `statements`.
    #[must_use]
    pub fn new(statements: StatementsMerger) -> Self {
        Self { statements }
    }

    /// Merges the senses of `source` into `target`, matching against the senses `target` had before the call.
    pub fn merge(
        &self,
        source: &Lexeme,
        target: &mut Lexeme,
    ) -> Result<SubEntityMerge<SenseId>, MergeError> {
        let mut result = SubEntityMerge::default();
        let existing = target.senses().len();

        for sense in source.senses() {
            let equivalent = target.senses()[..existing]
                .iter()
                .find(|candidate| candidate.is_equivalent_to(sense))
                .map(Sense::id);

            if let Some(id) = equivalent {
                let into = target
                    .sense_mut(id)
                    .ok_or_else(|| MergeError::invariant(format!("sense {id} vanished")))?;
                result.statements_copied += self.statements.merge(sense, into)?;
                result.matched.push((sense.id(), id));
                continue;
            }

            let id = target.allocate_sense_id()?;
            let mut copy = Sense::new(id, sense.glosses().clone())?;
            result.statements_copied += self.statements.merge(sense, &mut copy)?;
            target.attach_sense(copy)?;
            result.copied.push((sense.id(), id));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::statement::{SequentialGuidGenerator, Snak, Statement, StatementList, StatementListProvider};
    use crate::term::TermList;

    fn sense(id: &str, pairs: &[(&str, &str)]) -> Sense {
        Sense::new(id.parse().unwrap(), TermList::from_pairs(pairs.iter().copied()).unwrap()).unwrap()
    }

    fn lexeme(id: &str, senses: Vec<Sense>) -> Lexeme {
        senses
            .into_iter()
            .fold(
                Lexeme::builder()
                    .id(id.parse().unwrap())
                    .lemma("en", "foo")
                    .language("Q7".parse().unwrap())
                    .lexical_category("Q55".parse().unwrap()),
                |builder, sense| builder.sense(sense),
            )
            .build()
            .unwrap()
    }

    fn merger() -> SensesMerger {
        SensesMerger::new(StatementsMerger::new(Arc::new(SequentialGuidGenerator::starting_at(1))))
    }

    #[test]
    fn test_equivalent_sense_not_duplicated() {
        let source = lexeme("L1", vec![sense("L1-S1", &[("en", "color")])]);
        let mut target = lexeme("L2", vec![sense("L2-S1", &[("en", "color")])]);

        let result = merger().merge(&source, &mut target).unwrap();

        assert_eq!(target.senses().len(), 1);
        assert!(result.copied.is_empty());
        assert_eq!(result.matched.len(), 1);
    }

    #[test]
    fn test_new_sense_added() {
        let source = lexeme("L1", vec![sense("L1-S1", &[("en", "hue")])]);
        let mut target = lexeme("L2", vec![sense("L2-S1", &[("en", "color")])]);

        merger().merge(&source, &mut target).unwrap();

        assert_eq!(target.senses().len(), 2);
        assert_eq!(target.senses()[1].id().to_string(), "L2-S2");
        assert_eq!(target.senses()[1].glosses().get("en"), Some("hue"));
        assert_eq!(target.next_sense_id(), 3);
    }

    #[test]
    fn test_partial_gloss_overlap_is_not_equivalent() {
        let source = lexeme("L1", vec![sense("L1-S1", &[("en", "color"), ("en-gb", "colour")])]);
        let mut target = lexeme("L2", vec![sense("L2-S1", &[("en", "color")])]);

        merger().merge(&source, &mut target).unwrap();
        assert_eq!(target.senses().len(), 2);
    }

    #[test]
    fn test_redundant_target_senses_kept() {
        let source = lexeme(
            "L1",
            vec![sense("L1-S1", &[("en", "color")]), sense("L1-S2", &[("en", "color")])],
        );
        let mut target = lexeme(
            "L2",
            vec![sense("L2-S1", &[("en", "color")]), sense("L2-S2", &[("en", "color")])],
        );

        let result = merger().merge(&source, &mut target).unwrap();

        assert_eq!(target.senses().len(), 2);
        // both land on the first equivalent
        assert!(result.matched.iter().all(|(_, to)| to.to_string() == "L2-S1"));
    }

    #[test]
    fn test_matched_sense_receives_statements() {
        let p = "P4711".parse().unwrap();
        let source_sense = sense("L1-S1", &[("en", "color")])
            .with_statements(StatementList::from_iter([Statement::new(Snak::some_value(p))]));
        let target_sense = sense("L2-S1", &[("en", "color")])
            .with_statements(StatementList::from_iter([Statement::new(Snak::no_value(p))]));
        let source = lexeme("L1", vec![source_sense]);
        let mut target = lexeme("L2", vec![target_sense]);

        let result = merger().merge(&source, &mut target).unwrap();

        assert_eq!(result.statements_copied, 1);
        let statements = target.senses()[0].statements();
        assert_eq!(statements.len(), 2);
        let copied = statements.iter().last().unwrap();
        assert_eq!(copied.guid.unwrap().to_string(), "L2-S1$00000000-0000-0000-0000-000000000001");
        assert_eq!(copied.main_snak, Snak::some_value(p));
    }
}
