//! The Lexeme aggregate.
//!
//! A lexeme owns its forms and senses and hands out their ids. Every
//! mutation goes through methods here so that sub-entity ids stay unique
//! and the `nextFormId`/`nextSenseId` counters never move backwards.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{EntityIdValue, FormId, ItemId, LexemeId, SenseId};
use crate::lexeme::allocator::LocalIdCounter;
use crate::lexeme::form::Form;
use crate::lexeme::sense::Sense;
use crate::statement::{Statement, StatementList, StatementListProvider};
use crate::term::TermList;

/// A word or phrase: lemmas, forms, senses and statements.
///
/// # Examples
///
/// ```
/// use kyrolex::{Lexeme, TermList};
///
/// let mut lexeme = Lexeme::builder()
///     .id("L1".parse()?)
///     .lemma("en", "color")
///     .language("Q1860".parse()?)
///     .lexical_category("Q1084".parse()?)
///     .build()?;
///
/// let sense_id = lexeme.add_sense(TermList::from_pairs([("en", "hue")])?)?;
/// assert_eq!(sense_id.to_string(), "L1-S1");
/// assert_eq!(lexeme.next_sense_id(), 2);
/// # Ok::<(), kyrolex::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LexemeRecord")]
pub struct Lexeme {
    id: Option<LexemeId>,
    lemmas: TermList,
    lexical_category: ItemId,
    language: ItemId,
    statements: StatementList,
    forms: Vec<Form>,
    senses: Vec<Sense>,
    next_form_id: LocalIdCounter,
    next_sense_id: LocalIdCounter,
}

/// Unvalidated wire shape of a [`Lexeme`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
pub struct LexemeRecord {
    #[serde(default)]
    pub id: Option<LexemeId>,
    #[serde(default)]
    pub lemmas: TermList,
    pub lexical_category: ItemId,
    pub language: ItemId,
    #[serde(default)]
    pub statements: StatementList,
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub senses: Vec<Sense>,
    #[serde(default)]
    pub next_form_id: LocalIdCounter,
    #[serde(default)]
    pub next_sense_id: LocalIdCounter,
}

impl TryFrom<LexemeRecord> for Lexeme {
    type Error = ValidationError;

    fn try_from(record: LexemeRecord) -> Result<Self, Self::Error> {
        Self::restore(record)
    }
}

impl Lexeme {
    /// Creates a lexeme without forms, senses or statements.
    #[must_use]
    pub fn new(
        id: Option<LexemeId>,
        lemmas: TermList,
        lexical_category: ItemId,
        language: ItemId,
    ) -> Self {
        Self {
            id,
            lemmas,
            lexical_category,
            language,
            statements: StatementList::new(),
            forms: Vec::new(),
            senses: Vec::new(),
            next_form_id: LocalIdCounter::new(),
            next_sense_id: LocalIdCounter::new(),
        }
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> LexemeBuilder {
        LexemeBuilder::default()
    }

    /// Rebuilds a stored lexeme, checking every invariant.
    pub fn restore(record: LexemeRecord) -> Result<Self, ValidationError> {
        let lexeme = Self {
            id: record.id,
            lemmas: record.lemmas,
            lexical_category: record.lexical_category,
            language: record.language,
            statements: record.statements,
            forms: record.forms,
            senses: record.senses,
            next_form_id: record.next_form_id,
            next_sense_id: record.next_sense_id,
        };
        lexeme.validate()?;
        Ok(lexeme)
    }

    /// Checks the aggregate invariants.
    ///
    /// Sub-entities must belong to this lexeme with unique ids below the
    /// counters, every form and sense must have terms, and an identified
    /// (persisted) lexeme must have at least one lemma.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_some() && self.lemmas.is_empty() {
            return Err(ValidationError::EmptyLemmas);
        }
        if self.id.is_none() && !(self.forms.is_empty() && self.senses.is_empty()) {
            return Err(ValidationError::UnidentifiedLexeme);
        }

        let mut highest_form = 0;
        for (i, form) in self.forms.iter().enumerate() {
            form.validate()?;
            self.check_owned(form.id().lexeme_id(), &form.id())?;
            if self.forms[..i].iter().any(|f| f.id() == form.id()) {
                return Err(ValidationError::DuplicateSubEntity {
                    id: form.id().to_string(),
                });
            }
            highest_form = highest_form.max(form.id().local());
        }
        if !self.next_form_id.has_issued(highest_form) {
            return Err(ValidationError::CounterTooLow {
                counter: "nextFormId",
                value: self.next_form_id.peek(),
                highest: highest_form,
            });
        }

        let mut highest_sense = 0;
        for (i, sense) in self.senses.iter().enumerate() {
            sense.validate()?;
            self.check_owned(sense.id().lexeme_id(), &sense.id())?;
            if self.senses[..i].iter().any(|s| s.id() == sense.id()) {
                return Err(ValidationError::DuplicateSubEntity {
                    id: sense.id().to_string(),
                });
            }
            highest_sense = highest_sense.max(sense.id().local());
        }
        if !self.next_sense_id.has_issued(highest_sense) {
            return Err(ValidationError::CounterTooLow {
                counter: "nextSenseId",
                value: self.next_sense_id.peek(),
                highest: highest_sense,
            });
        }
        Ok(())
    }

    fn check_owned(&self, owner: LexemeId, id: &impl ToString) -> Result<(), ValidationError> {
        let lexeme = self.require_id()?;
        if owner == lexeme {
            Ok(())
        } else {
            Err(ValidationError::ForeignSubEntity {
                id: id.to_string(),
                lexeme,
            })
        }
    }

    fn require_id(&self) -> Result<LexemeId, ValidationError> {
        self.id.ok_or(ValidationError::UnidentifiedLexeme)
    }

    /// `None` until the lexeme is first saved.
    #[must_use]
    pub const fn id(&self) -> Option<LexemeId> {
        self.id
    }

    /// Lemmas by language.
    #[must_use]
    pub const fn lemmas(&self) -> &TermList {
        &self.lemmas
    }

    /// Lexical category item.
    #[must_use]
    pub const fn lexical_category(&self) -> ItemId {
        self.lexical_category
    }

    /// Language item.
    #[must_use]
    pub const fn language(&self) -> ItemId {
        self.language
    }

    /// Forms in insertion order.
    #[must_use]
    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    /// Senses in insertion order.
    #[must_use]
    pub fn senses(&self) -> &[Sense] {
        &self.senses
    }

    /// Finds a form by id.
    #[must_use]
    pub fn form(&self, id: FormId) -> Option<&Form> {
        self.forms.iter().find(|f| f.id() == id)
    }

    /// Finds a sense by id.
    #[must_use]
    pub fn sense(&self, id: SenseId) -> Option<&Sense> {
        self.senses.iter().find(|s| s.id() == id)
    }

    /// Mutable access to a form.
    pub fn form_mut(&mut self, id: FormId) -> Option<&mut Form> {
        self.forms.iter_mut().find(|f| f.id() == id)
    }

    /// Mutable access to a sense.
    pub fn sense_mut(&mut self, id: SenseId) -> Option<&mut Sense> {
        self.senses.iter_mut().find(|s| s.id() == id)
    }

    /// The local id the next added form will receive.
    #[must_use]
    pub const fn next_form_id(&self) -> u32 {
        self.next_form_id.peek()
    }

    /// The local id the next added sense will receive.
    #[must_use]
    pub const fn next_sense_id(&self) -> u32 {
        self.next_sense_id.peek()
    }

    /// Sets the lemma for a language.
    pub fn set_lemma(
        &mut self,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.lemmas.set(language, text)
    }

    /// Removes a lemma. An identified lexeme keeps at least one.
    pub fn remove_lemma(&mut self, language: &str) -> Result<Option<String>, ValidationError> {
        if self.id.is_some() && self.lemmas.len() == 1 && self.lemmas.has_language(language) {
            return Err(ValidationError::EmptyLemmas);
        }
        Ok(self.lemmas.remove(language))
    }

    /// Replaces the lexical category.
    pub fn set_lexical_category(&mut self, lexical_category: ItemId) {
        self.lexical_category = lexical_category;
    }

    /// Replaces the language.
    pub fn set_language(&mut self, language: ItemId) {
        self.language = language;
    }

    /// Reserves the next form id, advancing `nextFormId` by one.
    pub fn allocate_form_id(&mut self) -> Result<FormId, ValidationError> {
        let lexeme = self.require_id()?;
        Ok(FormId::new(lexeme, self.next_form_id.allocate()?))
    }

    /// Reserves the next sense id, advancing `nextSenseId` by one.
    pub fn allocate_sense_id(&mut self) -> Result<SenseId, ValidationError> {
        let lexeme = self.require_id()?;
        Ok(SenseId::new(lexeme, self.next_sense_id.allocate()?))
    }

    /// Adds a new form with a freshly allocated id.
    pub fn add_form(
        &mut self,
        representations: TermList,
        grammatical_features: impl IntoIterator<Item = ItemId>,
    ) -> Result<FormId, ValidationError> {
        if representations.is_empty() {
            return Err(ValidationError::EmptyRepresentations);
        }
        let id = self.allocate_form_id()?;
        self.forms.push(Form::new(id, representations, grammatical_features)?);
        Ok(id)
    }

    /// Adds a new sense with a freshly allocated id.
    pub fn add_sense(&mut self, glosses: TermList) -> Result<SenseId, ValidationError> {
        if glosses.is_empty() {
            return Err(ValidationError::EmptyGlosses);
        }
        let id = self.allocate_sense_id()?;
        self.senses.push(Sense::new(id, glosses)?);
        Ok(id)
    }

    /// Appends a form whose id was allocated from this lexeme.
    pub fn attach_form(&mut self, form: Form) -> Result<(), ValidationError> {
        let id = form.id();
        self.check_owned(id.lexeme_id(), &id)?;
        if !self.next_form_id.has_issued(id.local()) {
            return Err(ValidationError::CounterTooLow {
                counter: "nextFormId",
                value: self.next_form_id.peek(),
                highest: id.local(),
            });
        }
        if self.form(id).is_some() {
            return Err(ValidationError::DuplicateSubEntity { id: id.to_string() });
        }
        self.forms.push(form);
        Ok(())
    }

    /// Appends a sense whose id was allocated from this lexeme.
    pub fn attach_sense(&mut self, sense: Sense) -> Result<(), ValidationError> {
        let id = sense.id();
        self.check_owned(id.lexeme_id(), &id)?;
        if !self.next_sense_id.has_issued(id.local()) {
            return Err(ValidationError::CounterTooLow {
                counter: "nextSenseId",
                value: self.next_sense_id.peek(),
                highest: id.local(),
            });
        }
        if self.sense(id).is_some() {
            return Err(ValidationError::DuplicateSubEntity { id: id.to_string() });
        }
        self.senses.push(sense);
        Ok(())
    }

    /// Removes a form. Its id is never reused.
    pub fn remove_form(&mut self, id: FormId) -> Result<Form, ValidationError> {
        let index = self
            .forms
            .iter()
            .position(|f| f.id() == id)
            .ok_or(ValidationError::FormNotFound { id })?;
        Ok(self.forms.remove(index))
    }

    /// Removes a sense. Its id is never reused.
    pub fn remove_sense(&mut self, id: SenseId) -> Result<Sense, ValidationError> {
        let index = self
            .senses
            .iter()
            .position(|s| s.id() == id)
            .ok_or(ValidationError::SenseNotFound { id })?;
        Ok(self.senses.remove(index))
    }

    /// Every statement on the lexeme, its forms and its senses.
    pub fn all_statements_mut(&mut self) -> impl Iterator<Item = &mut Statement> {
        self.statements
            .iter_mut()
            .chain(self.forms.iter_mut().flat_map(|f| f.statements_mut().iter_mut()))
            .chain(self.senses.iter_mut().flat_map(|s| s.statements_mut().iter_mut()))
    }
}

impl StatementListProvider for Lexeme {
    fn statement_owner(&self) -> Option<EntityIdValue> {
        self.id.map(EntityIdValue::Lexeme)
    }

    fn statements(&self) -> &StatementList {
        &self.statements
    }

    fn statements_mut(&mut self) -> &mut StatementList {
        &mut self.statements
    }
}

/// Builder for [`Lexeme`], mostly used to assemble fixtures and imports.
///
/// Counters default to one past the highest sub-entity id supplied.
#[derive(Debug, Clone, Default)]
pub struct LexemeBuilder {
    id: Option<LexemeId>,
    lemmas: Vec<(String, String)>,
    lexical_category: Option<ItemId>,
    language: Option<ItemId>,
    statements: Vec<Statement>,
    forms: Vec<Form>,
    senses: Vec<Sense>,
    next_form_id: Option<u32>,
    next_sense_id: Option<u32>,
}

impl LexemeBuilder {
    /// Sets the lexeme id.
    #[must_use]
    pub fn id(mut self, id: LexemeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds or replaces a lemma.
    #[must_use]
    pub fn lemma(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.lemmas.push((language.into(), text.into()));
        self
    }

    /// Sets the lexical category.
    #[must_use]
    pub fn lexical_category(mut self, id: ItemId) -> Self {
        self.lexical_category = Some(id);
        self
    }

    /// Sets the language.
    #[must_use]
    pub fn language(mut self, id: ItemId) -> Self {
        self.language = Some(id);
        self
    }

    /// Appends a lexeme-level statement.
    #[must_use]
    pub fn statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Attaches a form with an already assigned id.
    #[must_use]
    pub fn form(mut self, form: Form) -> Self {
        self.forms.push(form);
        self
    }

    /// Attaches a sense with an already assigned id.
    #[must_use]
    pub fn sense(mut self, sense: Sense) -> Self {
        self.senses.push(sense);
        self
    }

    /// Overrides the next form number. Defaults to one past the highest attached form.
    #[must_use]
    pub fn next_form_id(mut self, next: u32) -> Self {
        self.next_form_id = Some(next);
        self
    }

    /// Overrides the next sense number.
    #[must_use]
    pub fn next_sense_id(mut self, next: u32) -> Self {
        self.next_sense_id = Some(next);
        self
    }

    /// Builds and validates the lexeme.
    pub fn build(self) -> Result<Lexeme, ValidationError> {
        let lexical_category = self
            .lexical_category
            .ok_or_else(|| ValidationError::MissingField {
                field: "lexical_category".to_string(),
            })?;
        let language = self.language.ok_or_else(|| ValidationError::MissingField {
            field: "language".to_string(),
        })?;

        let next_form_id = self.next_form_id.unwrap_or_else(|| {
            self.forms.iter().map(Form::id).map(|id| id.local()).max().unwrap_or(0) + 1
        });
        let next_sense_id = self.next_sense_id.unwrap_or_else(|| {
            self.senses.iter().map(Sense::id).map(|id| id.local()).max().unwrap_or(0) + 1
        });

        Lexeme::restore(LexemeRecord {
            id: self.id,
            lemmas: TermList::from_pairs(self.lemmas)?,
            lexical_category,
            language,
            statements: self.statements.into_iter().collect(),
            forms: self.forms,
            senses: self.senses,
            next_form_id: LocalIdCounter::starting_at(next_form_id)?,
            next_sense_id: LocalIdCounter::starting_at(next_sense_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(pairs: &[(&str, &str)]) -> TermList {
        TermList::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn minimal(id: &str) -> LexemeBuilder {
        Lexeme::builder()
            .id(id.parse().unwrap())
            .lemma("en", "foo")
            .language("Q7".parse().unwrap())
            .lexical_category("Q55".parse().unwrap())
    }

    #[test]
    fn test_builder_defaults_counters() {
        let lexeme = minimal("L1")
            .sense(Sense::new("L1-S3".parse().unwrap(), terms(&[("en", "a")])).unwrap())
            .build()
            .unwrap();
        assert_eq!(lexeme.next_sense_id(), 4);
        assert_eq!(lexeme.next_form_id(), 1);
    }

    #[test]
    fn test_builder_missing_language() {
        let err = Lexeme::builder()
            .id("L1".parse().unwrap())
            .lemma("en", "foo")
            .lexical_category("Q55".parse().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { .. }));
    }

    #[test]
    fn test_restore_rejects_low_counter() {
        let err = minimal("L1")
            .form(Form::new("L1-F2".parse().unwrap(), terms(&[("en", "x")]), []).unwrap())
            .next_form_id(2)
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::CounterTooLow { highest: 2, .. }));
    }

    #[test]
    fn test_restore_rejects_foreign_sense() {
        let err = minimal("L1")
            .sense(Sense::new("L9-S1".parse().unwrap(), terms(&[("en", "x")])).unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::ForeignSubEntity { .. }));
    }

    #[test]
    fn test_restore_rejects_duplicate_ids() {
        let sense = Sense::new("L1-S1".parse().unwrap(), terms(&[("en", "x")])).unwrap();
        let err = minimal("L1").sense(sense.clone()).sense(sense).build().unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateSubEntity { .. }));
    }

    #[test]
    fn test_persisted_lexeme_requires_lemma() {
        let err = Lexeme::builder()
            .id("L1".parse().unwrap())
            .language("Q7".parse().unwrap())
            .lexical_category("Q55".parse().unwrap())
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyLemmas);
    }

    #[test]
    fn test_add_form_allocates_ids() {
        let mut lexeme = minimal("L5").build().unwrap();
        let f1 = lexeme.add_form(terms(&[("en", "goes")]), []).unwrap();
        let f2 = lexeme.add_form(terms(&[("en", "went")]), []).unwrap();
        assert_eq!(f1.to_string(), "L5-F1");
        assert_eq!(f2.to_string(), "L5-F2");
        assert_eq!(lexeme.next_form_id(), 3);
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut lexeme = minimal("L5").build().unwrap();
        let s1 = lexeme.add_sense(terms(&[("en", "a")])).unwrap();
        lexeme.remove_sense(s1).unwrap();
        let s2 = lexeme.add_sense(terms(&[("en", "b")])).unwrap();
        assert_eq!(s2.local(), 2);
        assert_eq!(lexeme.senses().len(), 1);
    }

    #[test]
    fn test_add_rejected_before_allocation() {
        let mut lexeme = minimal("L5").build().unwrap();
        assert!(lexeme.add_sense(TermList::new()).is_err());
        assert!(lexeme.add_form(TermList::new(), []).is_err());
        assert_eq!(lexeme.next_sense_id(), 1);
        assert_eq!(lexeme.next_form_id(), 1);
    }

    #[test]
    fn test_unidentified_lexeme_cannot_allocate() {
        let mut lexeme = Lexeme::new(
            None,
            terms(&[("en", "foo")]),
            "Q55".parse().unwrap(),
            "Q7".parse().unwrap(),
        );
        assert_eq!(
            lexeme.add_sense(terms(&[("en", "a")])),
            Err(ValidationError::UnidentifiedLexeme)
        );
    }

    #[test]
    fn test_attach_requires_allocated_id() {
        let mut lexeme = minimal("L1").build().unwrap();
        let sense = Sense::new("L1-S1".parse().unwrap(), terms(&[("en", "a")])).unwrap();
        assert!(matches!(
            lexeme.attach_sense(sense.clone()),
            Err(ValidationError::CounterTooLow { .. })
        ));
        let id = lexeme.allocate_sense_id().unwrap();
        assert_eq!(id, sense.id());
        lexeme.attach_sense(sense.clone()).unwrap();
        assert!(matches!(
            lexeme.attach_sense(sense),
            Err(ValidationError::DuplicateSubEntity { .. })
        ));
    }

    #[test]
    fn test_remove_last_lemma_rejected() {
        let mut lexeme = minimal("L1").build().unwrap();
        assert_eq!(lexeme.remove_lemma("en"), Err(ValidationError::EmptyLemmas));
    }

    #[test]
    fn test_json_round_trip_validates() {
        let mut lexeme = minimal("L3").build().unwrap();
        lexeme.add_form(terms(&[("en", "foos")]), ["Q1".parse().unwrap()]).unwrap();
        let json = serde_json::to_value(&lexeme).unwrap();
        assert_eq!(json["next_form_id"], 2);
        assert_eq!(json["forms"][0]["id"], "L3-F1");

        let back: Lexeme = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, lexeme);

        let mut broken = json;
        broken["next_form_id"] = serde_json::json!(1);
        assert!(serde_json::from_value::<Lexeme>(broken).is_err());
    }

    #[test]
    fn test_json_rejects_blank_terms() {
        let lexeme = minimal("L3")
            .sense(Sense::new("L3-S1".parse().unwrap(), terms(&[("en", "a")])).unwrap())
            .build()
            .unwrap();
        let json = serde_json::to_value(&lexeme).unwrap();

        let mut blank_lemma = json.clone();
        blank_lemma["lemmas"] = serde_json::json!({"en": ""});
        assert!(serde_json::from_value::<Lexeme>(blank_lemma).is_err());

        let mut blank_gloss = json;
        blank_gloss["senses"][0]["glosses"] = serde_json::json!({"": "   "});
        assert!(serde_json::from_value::<Lexeme>(blank_gloss).is_err());
    }
}
