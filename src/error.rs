//! Error types for KyroLex.
//!
//! All errors in KyroLex are strongly typed using thiserror.
//! Validation errors cover malformed input and aggregate invariants,
//! merge errors form the public taxonomy of the merge interactor.

use thiserror::Error;

use crate::ids::{FormId, LexemeId, SenseId};
use crate::merge::MergeStep;
use crate::storage::{RevisionId, StorageError};

/// Validation errors that occur during input validation or when an edit
/// would break a Lexeme invariant.
#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {kind} id: '{value}'")]
    InvalidEntityId {
        kind: &'static str,
        value: String,
    },

    #[error("Invalid statement GUID: '{value}'")]
    InvalidStatementGuid {
        value: String,
    },

    #[error("Language code cannot be empty")]
    EmptyLanguageCode,

    #[error("Term text for language '{language}' cannot be empty")]
    EmptyTermText {
        language: String,
    },

    #[error("A lexeme must have at least one lemma")]
    EmptyLemmas,

    #[error("A form must have at least one representation")]
    EmptyRepresentations,

    #[error("A sense must have at least one gloss")]
    EmptyGlosses,

    #[error("Cannot remove the last representation of form {form_id}")]
    LastRepresentation {
        form_id: FormId,
    },

    #[error("Cannot remove the last gloss of sense {sense_id}")]
    LastGloss {
        sense_id: SenseId,
    },

    #[error("Form not found: {id}")]
    FormNotFound {
        id: FormId,
    },

    #[error("Sense not found: {id}")]
    SenseNotFound {
        id: SenseId,
    },

    #[error("Lexeme has no id; sub-entities cannot be identified")]
    UnidentifiedLexeme,

    #[error("Sub-entity {id} does not belong to lexeme {lexeme}")]
    ForeignSubEntity {
        id: String,
        lexeme: LexemeId,
    },

    #[error("Duplicate sub-entity id: {id}")]
    DuplicateSubEntity {
        id: String,
    },

    #[error("Counter '{counter}' is {value} but must be greater than {highest}")]
    CounterTooLow {
        counter: &'static str,
        value: u32,
        highest: u32,
    },

    #[error("Local id counter exhausted")]
    CounterExhausted,

    #[error("Missing required field: {field}")]
    MissingField {
        field: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Errors reported by the merge interactor.
///
/// Every variant aborts the remaining merge steps. `failed_step` reports where.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Cannot merge lexeme {id} into itself")]
    ReferenceSameLexeme {
        id: LexemeId,
    },

    #[error("Permission denied to merge {id}")]
    PermissionDenied {
        id: LexemeId,
        reason: Option<String>,
    },

    #[error("Lexeme not found: {id}")]
    LexemeNotFound {
        id: LexemeId,
    },

    /// The store returned a redirect or unreadable content. The cause is
    /// deliberately not carried so storage internals do not reach callers.
    #[error("Failed to load lexeme {id}")]
    LexemeLoading {
        id: LexemeId,
    },

    #[error("Failed to save lexeme {id}: {source}")]
    SaveFailed {
        id: LexemeId,
        step: MergeStep,
        #[source]
        source: StorageError,
    },

    /// Both lexemes were saved but the redirect could not be created.
    /// The merged data is durable; re-run only the redirect step.
    #[error("Merged {source_id} into {target_id} but failed to create the redirect: {source}")]
    RedirectFailed {
        source_id: LexemeId,
        target_id: LexemeId,
        source_revision: RevisionId,
        target_revision: RevisionId,
        #[source]
        source: StorageError,
    },

    #[error("Merge invariant violated: {message}")]
    Invariant {
        message: String,
    },
}

impl MergeError {
    /// Creates an invariant violation error.
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    /// The step of the merge state machine that produced this error.
    #[must_use]
    pub const fn failed_step(&self) -> MergeStep {
        match self {
            Self::ReferenceSameLexeme { .. } => MergeStep::Validate,
            Self::PermissionDenied { .. } => MergeStep::PermissionCheck,
            Self::LexemeNotFound { .. } | Self::LexemeLoading { .. } => MergeStep::Load,
            Self::SaveFailed { step, .. } => *step,
            Self::RedirectFailed { .. } => MergeStep::Redirect,
            Self::Invariant { .. } => MergeStep::Merge,
        }
    }

    /// Stable error code used by API layers when reporting the failure.
    #[must_use]
    pub const fn api_error_code(&self) -> &'static str {
        match self {
            Self::ReferenceSameLexeme { .. } => "cant-merge-self",
            Self::PermissionDenied { .. } => "permissiondenied",
            Self::LexemeNotFound { .. } => "no-such-entity",
            Self::LexemeLoading { .. } => "cant-load-entity-content",
            Self::SaveFailed { .. } => "failed-save",
            Self::RedirectFailed { .. } => "cant-redirect",
            Self::Invariant { .. } => "failed-modify",
        }
    }

    /// Returns true if the whole merge may succeed when retried from the top.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::SaveFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if durable, user-visible changes were made before failing.
    #[must_use]
    pub const fn has_committed_changes(&self) -> bool {
        matches!(self, Self::RedirectFailed { .. })
    }
}

/// A validation failure inside the pure merge step means the inputs broke an
/// invariant the load and validate steps should have caught.
impl From<ValidationError> for MergeError {
    fn from(err: ValidationError) -> Self {
        Self::invariant(err.to_string())
    }
}
#[allow(missing_docs)]

/// Top-level error type for KyroLex.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl LexError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a merge error.
    #[must_use]
    pub const fn is_merge(&self) -> bool {
        matches!(self, Self::Merge(_))
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Internal { .. } => false,
            Self::Merge(e) => e.is_retryable(),
            Self::Storage(e) => e.is_retryable(),
        }
    }
}

/// Result type alias for KyroLex operations.
pub type LexResult<T> = Result<T, LexError>;
