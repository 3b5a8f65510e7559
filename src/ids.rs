//! Entity identifiers.
//!
//! Lexemes are identified as `L<n>`, their forms as `L<n>-F<m>` and their
//! senses as `L<n>-S<m>`. Items (`Q<n>`) and properties (`P<n>`) are external
//! entities referenced from lexemes and statements.
//!
//! Identifiers serialize as their string form.

use std::fmt;
use std::num::{NonZeroU32, NonZeroU64};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const ENTITY_ID_PATTERN: &str = r"^(?:([QPL])([1-9][0-9]{0,18})|L([1-9][0-9]{0,18})-([FS])([1-9][0-9]{0,9}))$";

static ENTITY_ID_REGEX: OnceLock<Result<Regex, String>> = OnceLock::new();

fn entity_id_regex() -> Result<&'static Regex, ValidationError> {
    ENTITY_ID_REGEX
        .get_or_init(|| Regex::new(ENTITY_ID_PATTERN).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|reason| ValidationError::InvalidEntityId {
            kind: "entity",
            value: format!("id pattern failed to compile: {reason}"),
        })
}

fn invalid(kind: &'static str, value: &str) -> ValidationError {
    ValidationError::InvalidEntityId {
        kind,
        value: value.to_string(),
    }
}

fn parse_number(kind: &'static str, value: &str, digits: &str) -> Result<NonZeroU64, ValidationError> {
    digits
        .parse::<u64>()
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| invalid(kind, value))
}

fn parse_local(kind: &'static str, value: &str, digits: &str) -> Result<NonZeroU32, ValidationError> {
    digits
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| invalid(kind, value))
}

/// Implements `FromStr`, string conversion and serde-as-string for an id type
/// that can be extracted from [`EntityIdValue`].
macro_rules! string_id {
    ($ty:ident, $variant:ident, $kind:literal) => {
        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match EntityIdValue::from_str(s) {
                    Ok(EntityIdValue::$variant(id)) => Ok(id),
                    _ => Err(invalid($kind, s)),
                }
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.to_string()
            }
        }

        impl From<$ty> for EntityIdValue {
            fn from(id: $ty) -> Self {
                Self::$variant(id)
            }
        }
    };
}

/// Identifier of a Lexeme (`L<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LexemeId(NonZeroU64);

impl LexemeId {
    /// Creates a lexeme id from its numeric part.
    #[must_use]
    pub const fn new(number: NonZeroU64) -> Self {
        Self(number)
    }

    /// Returns the numeric part of the id.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for LexemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

string_id!(LexemeId, Lexeme, "lexeme");

/// Identifier of a Form, scoped to its parent Lexeme (`L<n>-F<m>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormId {
    lexeme: LexemeId,
    local: NonZeroU32,
}

impl FormId {
    /// Combines a lexeme id with a local form number.
    #[must_use]
    pub const fn new(lexeme: LexemeId, local: NonZeroU32) -> Self {
        Self { lexeme, local }
    }

    /// The lexeme this form belongs to.
    #[must_use]
    pub const fn lexeme_id(&self) -> LexemeId {
        self.lexeme
    }

    /// The lexeme-local numeric suffix.
    #[must_use]
    pub const fn local(&self) -> u32 {
        self.local.get()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-F{}", self.lexeme, self.local)
    }
}

string_id!(FormId, Form, "form");

/// Identifier of a Sense, scoped to its parent Lexeme (`L<n>-S<m>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SenseId {
    lexeme: LexemeId,
    local: NonZeroU32,
}

impl SenseId {
    /// Combines a lexeme id with a local sense number.
    #[must_use]
    pub const fn new(lexeme: LexemeId, local: NonZeroU32) -> Self {
        Self { lexeme, local }
    }

    /// The lexeme this sense belongs to.
    #[must_use]
    pub const fn lexeme_id(&self) -> LexemeId {
        self.lexeme
    }

    /// The lexeme-local numeric suffix.
    #[must_use]
    pub const fn local(&self) -> u32 {
        self.local.get()
    }
}

impl fmt::Display for SenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-S{}", self.lexeme, self.local)
    }
}

string_id!(SenseId, Sense, "sense");

/// Identifier of an Item (`Q<n>`), e.g. a language or grammatical feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(NonZeroU64);

impl ItemId {
    /// Wraps a numeric id.
    #[must_use]
    pub const fn new(number: NonZeroU64) -> Self {
        Self(number)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

string_id!(ItemId, Item, "item");

/// Identifier of a Property (`P<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyId(NonZeroU64);

impl PropertyId {
    /// Wraps a numeric id.
    #[must_use]
    pub const fn new(number: NonZeroU64) -> Self {
        Self(number)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

string_id!(PropertyId, Property, "property");

/// Any entity id: used as a statement value and as the owner of a statement GUID.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityIdValue {
    Item(ItemId),
    Property(PropertyId),
    Lexeme(LexemeId),
    Form(FormId),
    Sense(SenseId),
}

impl EntityIdValue {
    /// The lexeme this id belongs to, if it is a lexeme or one of its sub-entities.
    #[must_use]
    pub const fn lexeme_id(&self) -> Option<LexemeId> {
        match self {
            Self::Lexeme(id) => Some(*id),
            Self::Form(id) => Some(id.lexeme_id()),
            Self::Sense(id) => Some(id.lexeme_id()),
            Self::Item(_) | Self::Property(_) => None,
        }
    }
}

impl fmt::Display for EntityIdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(id) => fmt::Display::fmt(id, f),
            Self::Property(id) => fmt::Display::fmt(id, f),
            Self::Lexeme(id) => fmt::Display::fmt(id, f),
            Self::Form(id) => fmt::Display::fmt(id, f),
            Self::Sense(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl FromStr for EntityIdValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = entity_id_regex()?
            .captures(s)
            .ok_or_else(|| invalid("entity", s))?;

        if let (Some(prefix), Some(digits)) = (caps.get(1), caps.get(2)) {
            let number = parse_number("entity", s, digits.as_str())?;
            return Ok(match prefix.as_str() {
                "Q" => Self::Item(ItemId(number)),
                "P" => Self::Property(PropertyId(number)),
                _ => Self::Lexeme(LexemeId(number)),
            });
        }

        match (caps.get(3), caps.get(4), caps.get(5)) {
            (Some(lexeme), Some(kind), Some(local)) => {
                let lexeme = LexemeId(parse_number("entity", s, lexeme.as_str())?);
                let local = parse_local("entity", s, local.as_str())?;
                Ok(if kind.as_str() == "F" {
                    Self::Form(FormId::new(lexeme, local))
                } else {
                    Self::Sense(SenseId::new(lexeme, local))
                })
            }
            _ => Err(invalid("entity", s)),
        }
    }
}

impl TryFrom<String> for EntityIdValue {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityIdValue> for String {
    fn from(id: EntityIdValue) -> Self {
        id.to_string()
    }
}
