//! Statements attached to lexemes, forms and senses.
//!
//! A statement is a claim (property + value) with optional qualifiers and a
//! rank. Its GUID encodes the entity that owns it: `L2-S1$<uuid>`.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::ids::{EntityIdValue, ItemId, PropertyId};

/// A concrete value a snak can carry.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DataValue {
    EntityId(EntityIdValue),
    String(String),
    MonolingualText {
        language: String,
        text: String,
    },
    Quantity {
        amount: String,
        unit: Option<ItemId>,
    },
}

impl DataValue {
    /// The entity id held by this value, if it is one.
    pub const fn as_entity_id(&self) -> Option<&EntityIdValue> {
        match self {
            Self::EntityId(id) => Some(id),
            _ => None,
        }
    }
}

impl From<EntityIdValue> for DataValue {
    fn from(id: EntityIdValue) -> Self {
        Self::EntityId(id)
    }
}

/// What a snak says about its property.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "snaktype", content = "datavalue", rename_all = "lowercase")]
pub enum SnakValue {
    Value(DataValue),
    SomeValue,
    NoValue,
}

/// A property paired with a value.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snak {
    pub property: PropertyId,
    pub value: SnakValue,
}

impl Snak {
    /// A snak with a concrete value.
    #[must_use]
    pub fn value(property: PropertyId, value: impl Into<DataValue>) -> Self {
        Self {
            property,
            value: SnakValue::Value(value.into()),
        }
    }

    /// A snak for an unknown value.
    #[must_use]
    pub const fn some_value(property: PropertyId) -> Self {
        Self {
            property,
            value: SnakValue::SomeValue,
        }
    }

    /// A snak asserting there is no value.
    #[must_use]
    pub const fn no_value(property: PropertyId) -> Self {
        Self {
            property,
            value: SnakValue::NoValue,
        }
    }

    /// The entity id this snak points at, if it holds an entity value.
    #[must_use]
    pub const fn entity_value(&self) -> Option<&EntityIdValue> {
        match &self.value {
            SnakValue::Value(v) => v.as_entity_id(),
            _ => None,
        }
    }

    fn retarget(&mut self, map: &impl Fn(&EntityIdValue) -> Option<EntityIdValue>) -> bool {
        if let SnakValue::Value(DataValue::EntityId(id)) = &mut self.value {
            if let Some(replacement) = map(id) {
                *id = replacement;
                return true;
            }
        }
        false
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Preferred,
    #[default]
    Normal,
    Deprecated,
}

/// Globally unique statement identifier: `<owning entity id>$<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatementGuid {
    owner: EntityIdValue,
    uuid: Uuid,
}

impl StatementGuid {
    /// Builds a GUID from its owner and uuid.
    #[must_use]
    pub const fn new(owner: EntityIdValue, uuid: Uuid) -> Self {
        Self { owner, uuid }
    }

    /// The entity this statement belongs to.
    #[must_use]
    pub const fn owner(&self) -> EntityIdValue {
        self.owner
    }

    /// The random part.
    #[must_use]
    pub const fn uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl fmt::Display for StatementGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}${}", self.owner, self.uuid.hyphenated())
    }
}

impl FromStr for StatementGuid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidStatementGuid {
            value: s.to_string(),
        };
        let (owner, uuid) = s.split_once('$').ok_or_else(invalid)?;
        let owner = owner.parse::<EntityIdValue>().map_err(|_| invalid())?;
        let uuid = Uuid::parse_str(uuid).map_err(|_| invalid())?;
        Ok(Self { owner, uuid })
    }
}

impl TryFrom<String> for StatementGuid {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatementGuid> for String {
    fn from(guid: StatementGuid) -> Self {
        guid.to_string()
    }
}

/// A structured claim attachable to a lexeme, form or sense.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub guid: Option<StatementGuid>,
    pub main_snak: Snak,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<Snak>,
    #[serde(default)]
    pub rank: Rank,
}

impl Statement {
    /// Creates a normal-rank statement without GUID or qualifiers.
    #[must_use]
    pub const fn new(main_snak: Snak) -> Self {
        Self {
            guid: None,
            main_snak,
            qualifiers: Vec::new(),
            rank: Rank::Normal,
        }
    }

    /// Sets the GUID.
    #[must_use]
    pub fn with_guid(mut self, guid: StatementGuid) -> Self {
        self.guid = Some(guid);
        self
    }

    /// Appends a qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Snak) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Sets the rank.
    #[must_use]
    pub const fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    /// The property of the main snak.
    #[must_use]
    pub const fn property(&self) -> PropertyId {
        self.main_snak.property
    }

    /// Entity ids referenced by the main snak and qualifiers.
    pub fn referenced_entities(&self) -> impl Iterator<Item = &EntityIdValue> {
        std::iter::once(&self.main_snak)
            .chain(self.qualifiers.iter())
            .filter_map(Snak::entity_value)
    }

    /// Replaces every referenced entity id for which `map` returns a
    /// replacement. Returns the number of replaced values.
    pub fn retarget_references(
        &mut self,
        map: impl Fn(&EntityIdValue) -> Option<EntityIdValue>,
    ) -> usize {
        let mut replaced = usize::from(self.main_snak.retarget(&map));
        for qualifier in &mut self.qualifiers {
            replaced += usize::from(qualifier.retarget(&map));
        }
        replaced
    }
}

/// An ordered list of statements. Appending never deduplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementList(Vec<Statement>);

impl StatementList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Statement) {
        self.0.push(statement);
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

    /// Iterates in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.0.iter()
    }

    /// Iterates mutably in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Statement> {
        self.0.iter_mut()
    }

    /// Finds a statement by GUID.
    #[must_use]
    pub fn get_by_guid(&self, guid: &StatementGuid) -> Option<&Statement> {
        self.0.iter().find(|s| s.guid.as_ref() == Some(guid))
    }
}

impl FromIterator<Statement> for StatementList {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a StatementList {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Anything that owns a statement list.
pub trait StatementListProvider {
    /// The entity that owns the statements, used for GUIDs.
    /// `None` for a lexeme that has not been assigned an id yet.
    fn statement_owner(&self) -> Option<EntityIdValue>;

    /// Statements attached to this entity.
    fn statements(&self) -> &StatementList;

    /// Mutable access to the statements.
    fn statements_mut(&mut self) -> &mut StatementList;
}

/// Produces statement GUIDs for an owning entity.
pub trait GuidGenerator: Send + Sync {
    /// A fresh GUID owned by `owner`.
    fn new_guid(&self, owner: EntityIdValue) -> StatementGuid;
}

/// Random (v4) GUIDs. The production generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGuidGenerator;

impl GuidGenerator for RandomGuidGenerator {
    fn new_guid(&self, owner: EntityIdValue) -> StatementGuid {
        StatementGuid::new(owner, Uuid::new_v4())
    }
}

/// GUIDs numbered from a counter, for reproducible runs.
#[derive(Debug, Default)]
pub struct SequentialGuidGenerator {
    next: AtomicU64,
}

impl SequentialGuidGenerator {
    /// Generator whose first GUID carries uuid number `first`.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl GuidGenerator for SequentialGuidGenerator {
    fn new_guid(&self, owner: EntityIdValue) -> StatementGuid {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        StatementGuid::new(owner, Uuid::from_u128(u128::from(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PropertyId {
        s.parse().unwrap()
    }

    fn e(s: &str) -> EntityIdValue {
        s.parse().unwrap()
    }

    #[test]
    fn test_guid_display_and_parse() {
        let guid: StatementGuid = "L2-S2$00000000-0000-0000-0000-000000000000".parse().unwrap();
        assert_eq!(guid.owner(), e("L2-S2"));
        assert!(guid.uuid().is_nil());
        assert_eq!(guid.to_string(), "L2-S2$00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_guid_rejects_garbage() {
        assert!("L2-S2".parse::<StatementGuid>().is_err());
        assert!("X$00000000-0000-0000-0000-000000000000".parse::<StatementGuid>().is_err());
        assert!("L1$not-a-uuid".parse::<StatementGuid>().is_err());
    }

    #[test]
    fn test_sequential_generator() {
        let generator = SequentialGuidGenerator::starting_at(1);
        let a = generator.new_guid(e("L1"));
        let b = generator.new_guid(e("L1"));
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "L1$00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_random_generator_uses_owner() {
        let guid = RandomGuidGenerator.new_guid(e("L5-F1"));
        assert_eq!(guid.owner(), e("L5-F1"));
        assert!(!guid.uuid().is_nil());
    }

    #[test]
    fn test_referenced_entities() {
        let statement = Statement::new(Snak::value(p("P1"), e("L1-S1")))
            .with_qualifier(Snak::value(p("P2"), DataValue::String("x".to_string())))
            .with_qualifier(Snak::value(p("P3"), e("Q5")))
            .with_qualifier(Snak::no_value(p("P4")));
        let refs: Vec<_> = statement.referenced_entities().copied().collect();
        assert_eq!(refs, vec![e("L1-S1"), e("Q5")]);
    }

    #[test]
    fn test_retarget_references() {
        let mut statement = Statement::new(Snak::value(p("P1"), e("L1-S1")))
            .with_qualifier(Snak::value(p("P2"), e("L1")))
            .with_qualifier(Snak::value(p("P3"), e("Q5")));
        let replaced = statement.retarget_references(|id| {
            (id.lexeme_id() == Some("L1".parse().unwrap())).then(|| e("L2"))
        });
        assert_eq!(replaced, 2);
        assert_eq!(statement.main_snak.entity_value(), Some(&e("L2")));
        assert_eq!(statement.qualifiers[1].entity_value(), Some(&e("Q5")));
    }

    #[test]
    fn test_statement_json_shape() {
        let statement = Statement::new(Snak::value(p("P4711"), e("L42")));
        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["main_snak"]["property"], "P4711");
        assert_eq!(json["main_snak"]["value"]["snaktype"], "value");
        assert_eq!(json["main_snak"]["value"]["datavalue"]["value"], "L42");
        assert_eq!(json["rank"], "normal");
    }
}
