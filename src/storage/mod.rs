//! Storage collaborators for KyroLex.
//!
//! The traits define what the merge engine needs from its surroundings;
//! `memory` provides the in-memory reference backend.

mod memory;
mod traits;

pub use memory::{InMemoryLexemeStore, InMemoryWatchlist, RevisionRecord, StaticPermissionChecker};
pub use traits::{
    Actor, EditFlags, EntityAction, EntityRevision, EntityRevisionLookup, EntityStore,
    LookupMode, PageRef, PermissionChecker, PermissionStatus, RedirectCreator, RevisionId,
    StorageError, WatchlistStore,
};
