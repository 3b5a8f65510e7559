//! In-memory storage backend.
//!
//! This module provides thread-safe in-memory implementations of the
//! collaborator traits. It is intended for embedded usage, tests, and as a
//! reference implementation of the optimistic-concurrency contract.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use crate::error::ValidationError;
use crate::ids::LexemeId;
use crate::lexeme::Lexeme;
use crate::storage::traits::{
    Actor, EditFlags, EntityAction, EntityRevision, EntityRevisionLookup, EntityStore,
    LookupMode, PageRef, PermissionChecker, PermissionStatus, RedirectCreator, RevisionId,
    StorageError, WatchlistStore,
};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Metadata recorded with every stored revision.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRecord {
    pub revision_id: RevisionId,
    pub summary: String,
    pub actor: String,
    pub flags: EditFlags,
}

#[derive(Debug, Default)]
struct LexemeState {
    latest: HashMap<LexemeId, EntityRevision>,
    log: HashMap<LexemeId, Vec<RevisionRecord>>,
    redirects: HashMap<LexemeId, LexemeId>,
    last_revision: u64,
}

impl LexemeState {
    fn next_revision(&mut self) -> RevisionId {
        self.last_revision += 1;
        RevisionId::new(self.last_revision)
    }

    fn store(&mut self, id: LexemeId, lexeme: Lexeme, record: RevisionRecord) -> EntityRevision {
        let revision = EntityRevision {
            lexeme,
            revision_id: record.revision_id,
            timestamp: Utc::now(),
        };
        self.latest.insert(id, revision.clone());
        self.log.entry(id).or_default().push(record);
        revision
    }
}

/// Thread-safe in-memory lexeme store with revision tracking and redirects.
///
/// Implements [`EntityRevisionLookup`], [`EntityStore`] and [`RedirectCreator`].
#[derive(Debug, Default)]
pub struct InMemoryLexemeStore {
    state: RwLock<LexemeState>,
}

impl InMemoryLexemeStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new lexeme as its first revision.
    pub fn insert(&self, lexeme: Lexeme) -> Result<EntityRevision, StorageError> {
        lexeme.validate()?;
        let id = lexeme.id().ok_or(ValidationError::UnidentifiedLexeme)?;

        let mut state = self.state.write().map_err(|_| lock_err("lexeme.insert"))?;
        if state.latest.contains_key(&id) || state.redirects.contains_key(&id) {
            return Err(StorageError::BackendError(format!("{id} already exists")));
        }
        let revision_id = state.next_revision();
        Ok(state.store(
            id,
            lexeme,
            RevisionRecord {
                revision_id,
                summary: String::new(),
                actor: String::new(),
                flags: EditFlags::default(),
            },
        ))
    }

    /// The redirect target of `id`, if it has been redirected.
    pub fn redirect_target(&self, id: LexemeId) -> Result<Option<LexemeId>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("lexeme.redirect_target"))?;
        Ok(state.redirects.get(&id).copied())
    }

    /// Revision metadata for `id`, oldest first.
    pub fn revision_log(&self, id: LexemeId) -> Result<Vec<RevisionRecord>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("lexeme.revision_log"))?;
        Ok(state.log.get(&id).cloned().unwrap_or_default())
    }
}

impl EntityRevisionLookup for InMemoryLexemeStore {
    fn latest_revision(
        &self,
        id: LexemeId,
        _mode: LookupMode,
    ) -> Result<Option<EntityRevision>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("lexeme.latest_revision"))?;
        if let Some(target) = state.redirects.get(&id) {
            return Err(StorageError::UnresolvedRedirect { id, target: *target });
        }
        Ok(state.latest.get(&id).cloned())
    }
}

impl EntityStore for InMemoryLexemeStore {
    fn save_lexeme(
        &self,
        lexeme: &Lexeme,
        summary: &str,
        actor: &Actor,
        flags: EditFlags,
        base_revision: Option<RevisionId>,
    ) -> Result<EntityRevision, StorageError> {
        lexeme.validate()?;
        let id = lexeme.id().ok_or(ValidationError::UnidentifiedLexeme)?;

        let mut state = self.state.write().map_err(|_| lock_err("lexeme.save"))?;
        if let Some(target) = state.redirects.get(&id) {
            return Err(StorageError::UnresolvedRedirect { id, target: *target });
        }

        match state.latest.get(&id).map(|r| r.revision_id) {
            None if flags.update => return Err(StorageError::EntityNotFound(id)),
            Some(latest) if base_revision != Some(latest) => {
                return Err(StorageError::EditConflict {
                    id,
                    base: base_revision,
                    latest,
                });
            }
            _ => {}
        }

        let revision_id = state.next_revision();
        Ok(state.store(
            id,
            lexeme.clone(),
            RevisionRecord {
                revision_id,
                summary: summary.to_string(),
                actor: actor.name().to_string(),
                flags,
            },
        ))
    }
}

impl RedirectCreator for InMemoryLexemeStore {
    fn create_redirect(&self, from: LexemeId, to: LexemeId, _is_bot_edit: bool) -> Result<(), StorageError> {
        if from == to {
            return Err(StorageError::BackendError(
                "cannot redirect an entity to itself".to_string(),
            ));
        }

        let mut state = self.state.write().map_err(|_| lock_err("lexeme.create_redirect"))?;
        for id in [from, to] {
            if let Some(target) = state.redirects.get(&id) {
                return Err(StorageError::UnresolvedRedirect { id, target: *target });
            }
            if !state.latest.contains_key(&id) {
                return Err(StorageError::EntityNotFound(id));
            }
        }

        state.latest.remove(&from);
        state.redirects.insert(from, to);
        Ok(())
    }
}

/// Thread-safe in-memory watch-list.
#[derive(Debug, Default)]
pub struct InMemoryWatchlist {
    watchers: RwLock<HashMap<PageRef, BTreeSet<String>>>,
}

impl InMemoryWatchlist {
    /// Creates an empty watch-list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `user` to `page`.
    pub fn watch(&self, user: impl Into<String>, page: PageRef) -> Result<(), StorageError> {
        let mut watchers = self.watchers.write().map_err(|_| lock_err("watchlist.watch"))?;
        watchers.entry(page).or_default().insert(user.into());
        Ok(())
    }

    /// Users subscribed to `page`, sorted by name.
    pub fn watchers(&self, page: &PageRef) -> Result<Vec<String>, StorageError> {
        let watchers = self.watchers.read().map_err(|_| lock_err("watchlist.watchers"))?;
        Ok(watchers
            .get(page)
            .map(|users| users.iter().cloned().collect())
            .unwrap_or_default())
    }
}

impl WatchlistStore for InMemoryWatchlist {
    fn duplicate_all_associated_entries(&self, from: &PageRef, to: &PageRef) -> Result<(), StorageError> {
        let mut watchers = self.watchers.write().map_err(|_| lock_err("watchlist.duplicate"))?;
        let Some(users) = watchers.get(from).cloned() else {
            return Ok(());
        };
        watchers.entry(to.clone()).or_default().extend(users);
        Ok(())
    }
}

/// Permission checker driven by a fixed policy: an optional required right
/// plus an explicit deny list.
#[derive(Debug, Default)]
pub struct StaticPermissionChecker {
    required_right: Option<String>,
    denied: HashSet<LexemeId>,
}

impl StaticPermissionChecker {
    /// Allows every action on every entity.
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Require actors to hold `right` for merges.
    #[must_use]
    pub fn require_right(mut self, right: impl Into<String>) -> Self {
        self.required_right = Some(right.into());
        self
    }

    /// Deny every action on `id` (e.g. a protected page).
    #[must_use]
    pub fn deny(mut self, id: LexemeId) -> Self {
        self.denied.insert(id);
        self
    }
}

impl PermissionChecker for StaticPermissionChecker {
    fn check_permission(&self, actor: &Actor, action: EntityAction, id: LexemeId) -> PermissionStatus {
        if self.denied.contains(&id) {
            return PermissionStatus::Denied {
                reason: format!("{id} is protected"),
            };
        }
        if action == EntityAction::Merge {
            if let Some(right) = &self.required_right {
                if !actor.has_right(right) {
                    return PermissionStatus::Denied {
                        reason: format!("{} lacks the '{right}' right", actor.name()),
                    };
                }
            }
        }
        PermissionStatus::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TermList;

    fn lexeme(id: &str) -> Lexeme {
        Lexeme::builder()
            .id(id.parse().unwrap())
            .lemma("en", "foo")
            .language("Q7".parse().unwrap())
            .lexical_category("Q55".parse().unwrap())
            .build()
            .unwrap()
    }

    fn flags() -> EditFlags {
        EditFlags {
            update: true,
            ..EditFlags::default()
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = InMemoryLexemeStore::new();
        let rev = store.insert(lexeme("L1")).unwrap();
        let latest = store
            .latest_revision("L1".parse().unwrap(), LookupMode::LatestFromMaster)
            .unwrap()
            .unwrap();
        assert_eq!(latest.revision_id, rev.revision_id);
        assert!(store
            .latest_revision("L2".parse().unwrap(), LookupMode::LatestFromMaster)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let store = InMemoryLexemeStore::new();
        store.insert(lexeme("L1")).unwrap();
        assert!(store.insert(lexeme("L1")).is_err());
    }

    #[test]
    fn test_save_requires_latest_base() {
        let store = InMemoryLexemeStore::new();
        let actor = Actor::new("Alice");
        let first = store.insert(lexeme("L1")).unwrap();

        let mut edited = first.lexeme.clone();
        edited.add_sense(TermList::from_pairs([("en", "a")]).unwrap()).unwrap();
        let second = store
            .save_lexeme(&edited, "edit", &actor, flags(), Some(first.revision_id))
            .unwrap();
        assert!(second.revision_id > first.revision_id);

        let err = store
            .save_lexeme(&edited, "stale", &actor, flags(), Some(first.revision_id))
            .unwrap_err();
        assert!(err.is_conflict());

        let log = store.revision_log("L1".parse().unwrap()).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].summary, "edit");
        assert_eq!(log[1].actor, "Alice");
    }

    #[test]
    fn test_update_flag_requires_existing() {
        let store = InMemoryLexemeStore::new();
        let err = store
            .save_lexeme(&lexeme("L3"), "", &Actor::new("A"), flags(), None)
            .unwrap_err();
        assert!(matches!(err, StorageError::EntityNotFound(_)));
    }

    #[test]
    fn test_redirect_hides_source() {
        let store = InMemoryLexemeStore::new();
        store.insert(lexeme("L1")).unwrap();
        store.insert(lexeme("L2")).unwrap();
        let l1 = "L1".parse().unwrap();
        let l2 = "L2".parse().unwrap();

        store.create_redirect(l1, l2, false).unwrap();
        assert_eq!(store.redirect_target(l1).unwrap(), Some(l2));
        let err = store.latest_revision(l1, LookupMode::LatestFromMaster).unwrap_err();
        assert!(matches!(err, StorageError::UnresolvedRedirect { .. }));

        // already redirected
        assert!(store.create_redirect(l1, l2, false).is_err());
    }

    #[test]
    fn test_redirect_requires_both_entities() {
        let store = InMemoryLexemeStore::new();
        store.insert(lexeme("L1")).unwrap();
        let err = store
            .create_redirect("L1".parse().unwrap(), "L9".parse().unwrap(), false)
            .unwrap_err();
        assert!(matches!(err, StorageError::EntityNotFound(_)));
    }

    #[test]
    fn test_watchlist_duplicate() {
        let watchlist = InMemoryWatchlist::new();
        let from = PageRef::for_lexeme("L1".parse().unwrap());
        let to = PageRef::for_lexeme("L2".parse().unwrap());
        watchlist.watch("alice", from.clone()).unwrap();
        watchlist.watch("bob", to.clone()).unwrap();

        watchlist.duplicate_all_associated_entries(&from, &to).unwrap();
        assert_eq!(watchlist.watchers(&to).unwrap(), vec!["alice", "bob"]);
        assert_eq!(watchlist.watchers(&from).unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_static_permissions() {
        let l1 = "L1".parse().unwrap();
        let l2 = "L2".parse().unwrap();
        let checker = StaticPermissionChecker::allow_all()
            .require_right("item-merge")
            .deny(l2);

        let merger = Actor::new("m").with_right("item-merge");
        assert!(checker.check_permission(&merger, EntityAction::Merge, l1).is_allowed());
        assert!(!checker.check_permission(&merger, EntityAction::Merge, l2).is_allowed());
        assert!(!checker
            .check_permission(&Actor::new("anon"), EntityAction::Merge, l1)
            .is_allowed());
        assert!(checker
            .check_permission(&Actor::new("anon"), EntityAction::Edit, l1)
            .is_allowed());
    }
}
