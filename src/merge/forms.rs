//! Form merging.

use crate::error::MergeError;
use crate::ids::FormId;
use crate::lexeme::{Form, Lexeme};
use crate::merge::outcome::SubEntityMerge;
use crate::merge::statements::StatementsMerger;

/// Moves the source's forms onto the target.
///
/// A source form whose representations equal those of a target form only
/// contributes its statements; its grammatical features are dropped. Any
/// other source form is copied under an id allocated from the target.
#[derive(Clone)]
pub struct FormsMerger {
    statements: StatementsMerger,
}

impl FormsMerger {
    /// Creates a merger that delegates statements to `statements`.
    #[must_use]
    pub fn new(statements: StatementsMerger) -> Self {
        Self { statements }
    }

    /// Merges the forms of `source` into `target`, matching against the forms `target` had before the call.
    pub fn merge(
        &self,
        source: &Lexeme,
        target: &mut Lexeme,
    ) -> Result<SubEntityMerge<FormId>, MergeError> {
        let mut result = SubEntityMerge::default();
        // only forms present before the merge are candidates for matching
        let existing = target.forms().len();

        for form in source.forms() {
            let equivalent = target.forms()[..existing]
                .iter()
                .find(|candidate| candidate.is_equivalent_to(form))
                .map(Form::id);

            match equivalent {
                Some(id) => {
                    let into = target
                        .form_mut(id)
                        .ok_or_else(|| MergeError::invariant(format!("form {id} vanished")))?;
                    result.statements_copied += self.statements.merge(form, into)?;
                    result.matched.push((form.id(), id));
                }
                None => {
                    let id = target.allocate_form_id()?;
                    let mut copy = Form::new(
                        id,
                        form.representations().clone(),
                        form.grammatical_features().iter().copied(),
                    )?;
                    result.statements_copied += self.statements.merge(form, &mut copy)?;
                    target.attach_form(copy)?;
                    result.copied.push((form.id(), id));
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ids::ItemId;
    use crate::statement::{SequentialGuidGenerator, Snak, Statement, StatementList, StatementListProvider};
    use crate::term::TermList;

    fn q(s: &str) -> ItemId {
        s.parse().unwrap()
    }

    fn form(id: &str, pairs: &[(&str, &str)], features: &[&str]) -> Form {
        Form::new(
            id.parse().unwrap(),
            TermList::from_pairs(pairs.iter().copied()).unwrap(),
            features.iter().map(|f| q(f)),
        )
        .unwrap()
    }

    fn lexeme(id: &str, forms: Vec<Form>) -> Lexeme {
        forms
            .into_iter()
            .fold(
                Lexeme::builder()
                    .id(id.parse().unwrap())
                    .lemma("en", "foo")
                    .language(q("Q7"))
                    .lexical_category(q("Q55")),
                |builder, form| builder.form(form),
            )
            .build()
            .unwrap()
    }

    fn merger() -> FormsMerger {
        FormsMerger::new(StatementsMerger::new(Arc::new(SequentialGuidGenerator::starting_at(1))))
    }

    #[test]
    fn test_new_form_is_copied_with_target_id() {
        let source = lexeme("L1", vec![form("L1-F1", &[("en", "colors")], &["Q146786"])]);
        let mut target = lexeme("L2", vec![form("L2-F1", &[("en", "color")], &[])]);

        let result = merger().merge(&source, &mut target).unwrap();

        assert_eq!(result.copied, vec![("L1-F1".parse().unwrap(), "L2-F2".parse().unwrap())]);
        assert!(result.matched.is_empty());
        assert_eq!(target.forms().len(), 2);
        let copied = &target.forms()[1];
        assert_eq!(copied.representations().get("en"), Some("colors"));
        assert!(copied.grammatical_features().contains(&q("Q146786")));
        assert_eq!(target.next_form_id(), 3);
    }

    #[test]
    fn test_equivalent_form_keeps_target_features() {
        let source_form = form("L1-F1", &[("en", "color")], &["Q1"])
            .with_statements(StatementList::from_iter([Statement::new(Snak::no_value(
                "P4711".parse().unwrap(),
            ))]));
        let source = lexeme("L1", vec![source_form]);
        let mut target = lexeme("L2", vec![form("L2-F1", &[("en", "color")], &["Q2"])]);

        let result = merger().merge(&source, &mut target).unwrap();

        assert_eq!(result.matched, vec![("L1-F1".parse().unwrap(), "L2-F1".parse().unwrap())]);
        assert_eq!(result.statements_copied, 1);
        assert_eq!(target.forms().len(), 1);
        let merged = &target.forms()[0];
        assert_eq!(merged.grammatical_features().iter().copied().collect::<Vec<_>>(), vec![q("Q2")]);
        let guid = merged.statements().iter().next().unwrap().guid.unwrap();
        assert_eq!(guid.to_string(), "L2-F1$00000000-0000-0000-0000-000000000001");
        // counter untouched when nothing is copied
        assert_eq!(target.next_form_id(), 2);
    }

    #[test]
    fn test_redundant_source_forms_are_both_copied() {
        let source = lexeme(
            "L1",
            vec![
                form("L1-F1", &[("en", "hue")], &[]),
                form("L1-F2", &[("en", "hue")], &[]),
            ],
        );
        let mut target = lexeme("L2", vec![]);

        let result = merger().merge(&source, &mut target).unwrap();

        assert_eq!(result.copied.len(), 2);
        assert_eq!(
            target.forms().iter().map(|f| f.id().to_string()).collect::<Vec<_>>(),
            vec!["L2-F1", "L2-F2"]
        );
    }

    #[test]
    fn test_counter_skips_deleted_ids() {
        let source = lexeme("L1", vec![form("L1-F1", &[("en", "a")], &[])]);
        let mut target = Lexeme::builder()
            .id("L2".parse().unwrap())
            .lemma("en", "foo")
            .language(q("Q7"))
            .lexical_category(q("Q55"))
            .next_form_id(7)
            .build()
            .unwrap();

        merger().merge(&source, &mut target).unwrap();
        assert_eq!(target.forms()[0].id().to_string(), "L2-F7");
        assert_eq!(target.next_form_id(), 8);
    }
}
