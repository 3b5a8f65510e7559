//! Abstract collaborator traits for KyroLex.
//!
//! The merge engine never talks to a concrete store. It consumes these
//! contracts, so the same interactor runs against the in-memory backend in
//! tests and embedded use, and against a wiki's storage engine in production.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::ids::LexemeId;
use crate::lexeme::Lexeme;

/// Errors that can occur during storage operations.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum StorageError {
    /// Entity not found.
    #[error("Entity not found: {0}")]
    EntityNotFound(LexemeId),

    /// The entity changed since the caller loaded it.
    #[error("Edit conflict on {id}: base revision {base:?}, latest revision {latest}")]
    EditConflict {
        id: LexemeId,
        base: Option<RevisionId>,
        latest: RevisionId,
    },

    /// A redirect was found where a concrete entity was expected.
    #[error("{id} is a redirect to {target}")]
    UnresolvedRedirect { id: LexemeId, target: LexemeId },

    /// Stored or submitted content breaks an entity invariant.
    #[error("Invalid entity content: {0}")]
    InvalidContent(#[from] ValidationError),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StorageError {
    /// Returns true for optimistic-concurrency failures.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::EditConflict { .. })
    }

    /// Returns true if the same request may succeed later. Invalid content
    /// and redirects fail again on every retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::EditConflict { .. } | Self::BackendError(_))
    }
}

/// Identifier of one stored revision of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(u64);

impl RevisionId {
    /// Wraps a raw revision number.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw revision number.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lexeme as stored at one revision.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRevision {
    pub lexeme: Lexeme,
    pub revision_id: RevisionId,
    pub timestamp: DateTime<Utc>,
}

/// Where a lookup may read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// A possibly lagging replica.
    LatestFromReplica,
    /// The authoritative primary.
    #[default]
    LatestFromMaster,
}

/// The user (or bot) performing an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    name: String,
    rights: BTreeSet<String>,
}

impl Actor {
    /// An actor without any rights.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rights: BTreeSet::new(),
        }
    }

    /// Grants `right`.
    #[must_use]
    pub fn with_right(mut self, right: impl Into<String>) -> Self {
        self.rights.insert(right.into());
        self
    }

    /// User name recorded on edits.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the actor holds `right`.
    #[must_use]
    pub fn has_right(&self, right: &str) -> bool {
        self.rights.contains(right)
    }
}

/// Flags attached to a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditFlags {
    /// The entity must already exist.
    pub update: bool,
    /// Skip soft constraint checks (merges produce intermediate states).
    pub ignore_constraints: bool,
    /// Mark the edit as a bot edit.
    pub bot: bool,
}

/// Actions subject to permission checks.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityAction {
    Edit,
    Merge,
}

impl fmt::Display for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionStatus {
    Allowed,
    Denied { reason: String },
}

impl PermissionStatus {
    /// Whether the action may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Reference to the wiki page holding an entity.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageRef {
    pub namespace: String,
    pub title: String,
}

impl PageRef {
    /// The page a lexeme lives on.
    #[must_use]
    pub fn for_lexeme(id: LexemeId) -> Self {
        Self {
            namespace: "Lexeme".to_string(),
            title: id.to_string(),
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.title)
    }
}

/// Read access to the latest stored revision of a lexeme.
pub trait EntityRevisionLookup: Send + Sync {
    /// Returns `Ok(None)` when the lexeme does not exist and
    /// `Err(UnresolvedRedirect)` when the id has been redirected.
    fn latest_revision(
        &self,
        id: LexemeId,
        mode: LookupMode,
    ) -> Result<Option<EntityRevision>, StorageError>;
}

/// Write access to lexemes.
pub trait EntityStore: Send + Sync {
    /// Save a new revision.
    ///
    /// # Errors
    /// - `EditConflict`: the latest revision is not `base_revision`
    /// - `EntityNotFound`: `flags.update` is set and the lexeme does not exist
    fn save_lexeme(
        &self,
        lexeme: &Lexeme,
        summary: &str,
        actor: &Actor,
        flags: EditFlags,
        base_revision: Option<RevisionId>,
    ) -> Result<EntityRevision, StorageError>;
}

/// Decides whether an actor may perform an action on an entity.
pub trait PermissionChecker: Send + Sync {
    /// Checks whether `actor` may perform `action` on `id`.
    fn check_permission(&self, actor: &Actor, action: EntityAction, id: LexemeId) -> PermissionStatus;
}

/// Turns one entity id into a permanent redirect to another.
pub trait RedirectCreator: Send + Sync {
    /// Makes `from` a redirect to `to`. Both must exist and neither may already be a redirect.
    fn create_redirect(&self, from: LexemeId, to: LexemeId, is_bot_edit: bool) -> Result<(), StorageError>;
}

/// Watch-list subscriptions.
pub trait WatchlistStore: Send + Sync {
    /// Copies every subscription on `from` onto `to`.
    fn duplicate_all_associated_entries(&self, from: &PageRef, to: &PageRef) -> Result<(), StorageError>;
}
