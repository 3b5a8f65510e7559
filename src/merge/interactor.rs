//! The merge request state machine.
//!
//! One call to [`MergeInteractor::merge_lexemes`] walks
//! `PermissionCheck → Load → Validate → Merge → SaveSource → SaveTarget →
//! WatchlistPropagate → Redirect → Done`. Every failing step aborts the rest,
//! except watch-list propagation whose failures are only logged.
//!
//! There is no cross-entity transaction. Source is saved before target, and
//! if the redirect fails after both saves the merged data stays committed;
//! [`MergeInteractor::create_redirect`] re-runs just that step.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::MergeConfig;
use crate::error::{LexResult, MergeError};
use crate::ids::LexemeId;
use crate::merge::lexeme::LexemeMerger;
use crate::merge::outcome::MergeOutcome;
use crate::storage::{
    Actor, EditFlags, EntityAction, EntityRevision, EntityRevisionLookup, EntityStore,
    InMemoryLexemeStore, InMemoryWatchlist, PageRef, PermissionChecker, PermissionStatus,
    RedirectCreator, StorageError, WatchlistStore,
};
use crate::summary::{AutoCommentFormatter, Summary, SummaryFormatter};

/// A state of the merge state machine.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeStep {
    PermissionCheck,
    Load,
    Validate,
    Merge,
    SaveSource,
    SaveTarget,
    WatchlistPropagate,
    Redirect,
    Done,
}

impl fmt::Display for MergeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PermissionCheck => "permission_check",
            Self::Load => "load",
            Self::Validate => "validate",
            Self::Merge => "merge",
            Self::SaveSource => "save_source",
            Self::SaveTarget => "save_target",
            Self::WatchlistPropagate => "watchlist_propagate",
            Self::Redirect => "redirect",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// The services a merge talks to.
#[allow(missing_docs)]
#[derive(Clone)]
pub struct MergeCollaborators {
    pub lookup: Arc<dyn EntityRevisionLookup>,
    pub store: Arc<dyn EntityStore>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub summaries: Arc<dyn SummaryFormatter>,
    pub redirects: Arc<dyn RedirectCreator>,
    pub watchlist: Arc<dyn WatchlistStore>,
}

impl MergeCollaborators {
    /// Wires the in-memory backend: one store for lookup, saves and redirects.
    #[must_use]
    pub fn in_memory(
        store: Arc<InMemoryLexemeStore>,
        watchlist: Arc<InMemoryWatchlist>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            lookup: store.clone(),
            store: store.clone(),
            permissions,
            summaries: Arc::new(AutoCommentFormatter),
            redirects: store,
            watchlist,
        }
    }
}

/// Revisions written by a successful merge.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub source: EntityRevision,
    pub target: EntityRevision,
    pub outcome: MergeOutcome,
}

/// Runs merge requests on behalf of one actor.
pub struct MergeInteractor {
    merger: LexemeMerger,
    collaborators: MergeCollaborators,
    actor: Actor,
    config: MergeConfig,
}

impl MergeInteractor {
    /// Creates an interactor with the default configuration.
    #[must_use]
    pub fn new(merger: LexemeMerger, collaborators: MergeCollaborators, actor: Actor) -> Self {
        Self {
            merger,
            collaborators,
            actor,
            config: MergeConfig::default(),
        }
    }

    /// Replaces the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `config` is rejected by
    /// [`MergeConfig::validate`].
    pub fn with_config(mut self, config: MergeConfig) -> LexResult<Self> {
        self.config = config.validate()?;
        Ok(self)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merges `source_id` into `target_id` and redirects the source.
    ///
    /// # Errors
    ///
    /// See [`MergeError`]; [`MergeError::failed_step`] names the step that
    /// failed. Equal ids fail before any collaborator is called.
    #[tracing::instrument(skip(self, summary), fields(actor = %self.actor.name()))]
    pub fn merge_lexemes(
        &self,
        source_id: LexemeId,
        target_id: LexemeId,
        summary: Option<&str>,
        is_bot_edit: bool,
    ) -> Result<MergeResult, MergeError> {
        info!("merge started");
        if source_id == target_id {
            return Err(MergeError::ReferenceSameLexeme { id: source_id });
        }

        enter(MergeStep::PermissionCheck);
        self.check_permission(source_id)?;
        self.check_permission(target_id)?;

        enter(MergeStep::Load);
        let (resolved_source, source) = self.load(source_id)?;
        let (resolved_target, target) = self.load(target_id)?;

        enter(MergeStep::Validate);
        if resolved_source == resolved_target {
            return Err(MergeError::ReferenceSameLexeme { id: resolved_target });
        }
        if (resolved_source, resolved_target) != (source_id, target_id) {
            debug!(%resolved_source, %resolved_target, "lookup followed redirects");
        }
        let (source_id, target_id) = (resolved_source, resolved_target);

        enter(MergeStep::Merge);
        let mut merged = target.lexeme.clone();
        let outcome = self.merger.merge(&source.lexeme, &mut merged)?;
        debug!(
            statements = outcome.total_statements_copied(),
            forms_copied = outcome.forms.copied.len(),
            forms_matched = outcome.forms.matched.len(),
            senses_copied = outcome.senses.copied.len(),
            senses_matched = outcome.senses.matched.len(),
            references = outcome.references_retargeted,
            "lexemes merged in memory"
        );

        let flags = self.edit_flags(is_bot_edit);
        let user_summary = summary.map(|text| self.truncate(text));

        enter(MergeStep::SaveSource);
        let source_text = self.summary_text("to", target_id, user_summary.as_deref());
        let saved_source = self
            .collaborators
            .store
            .save_lexeme(&source.lexeme, &source_text, &self.actor, flags, Some(source.revision_id))
            .map_err(|err| MergeError::SaveFailed {
                id: source_id,
                step: MergeStep::SaveSource,
                source: err,
            })?;

        enter(MergeStep::SaveTarget);
        let target_text = self.summary_text("from", source_id, user_summary.as_deref());
        let saved_target = self
            .collaborators
            .store
            .save_lexeme(&merged, &target_text, &self.actor, flags, Some(target.revision_id))
            .map_err(|err| MergeError::SaveFailed {
                id: target_id,
                step: MergeStep::SaveTarget,
                source: err,
            })?;

        if self.config.propagate_watchlist {
            enter(MergeStep::WatchlistPropagate);
            if let Err(err) = self.collaborators.watchlist.duplicate_all_associated_entries(
                &PageRef::for_lexeme(source_id),
                &PageRef::for_lexeme(target_id),
            ) {
                warn!(error = %err, "failed to copy watch-list entries, continuing");
            }
        }

        enter(MergeStep::Redirect);
        if let Err(err) = self.redirect(source_id, target_id, is_bot_edit) {
            warn!(error = %err, "merged data committed but redirect failed");
            return Err(MergeError::RedirectFailed {
                source_id,
                target_id,
                source_revision: saved_source.revision_id,
                target_revision: saved_target.revision_id,
                source: err,
            });
        }

        enter(MergeStep::Done);
        info!(
            source_revision = %saved_source.revision_id,
            target_revision = %saved_target.revision_id,
            "merge finished"
        );
        Ok(MergeResult {
            source: saved_source,
            target: saved_target,
            outcome,
        })
    }

    /// Re-runs only the redirect step, after a merge returned
    /// [`MergeError::RedirectFailed`].
    ///
    /// # Errors
    ///
    /// Whatever the redirect collaborator reports.
    pub fn create_redirect(
        &self,
        source_id: LexemeId,
        target_id: LexemeId,
        is_bot_edit: bool,
    ) -> Result<(), StorageError> {
        info!(source = %source_id, target = %target_id, "re-running redirect");
        self.redirect(source_id, target_id, is_bot_edit)
    }

    fn redirect(&self, source_id: LexemeId, target_id: LexemeId, is_bot_edit: bool) -> Result<(), StorageError> {
        let bot = self.edit_flags(is_bot_edit).bot;
        self.collaborators.redirects.create_redirect(source_id, target_id, bot)
    }

    fn check_permission(&self, id: LexemeId) -> Result<(), MergeError> {
        match self
            .collaborators
            .permissions
            .check_permission(&self.actor, EntityAction::Merge, id)
        {
            PermissionStatus::Allowed => Ok(()),
            PermissionStatus::Denied { reason } => {
                debug!(%id, %reason, "merge permission denied");
                Err(MergeError::PermissionDenied {
                    id,
                    reason: Some(reason),
                })
            }
        }
    }

    /// Loads `id` and returns the id the lookup resolved it to, which
    /// differs from `id` when the lookup follows redirects.
    ///
    /// Storage causes are logged here and never surface in the error.
    fn load(&self, id: LexemeId) -> Result<(LexemeId, EntityRevision), MergeError> {
        match self.collaborators.lookup.latest_revision(id, self.config.lookup_mode) {
            Ok(Some(revision)) => match revision.lexeme.id() {
                Some(resolved) => Ok((resolved, revision)),
                None => {
                    warn!(%id, "lookup returned a lexeme without an id");
                    Err(MergeError::LexemeLoading { id })
                }
            },
            Ok(None) | Err(StorageError::EntityNotFound(_)) => Err(MergeError::LexemeNotFound { id }),
            Err(err) => {
                warn!(%id, error = %err, "failed to load lexeme");
                Err(MergeError::LexemeLoading { id })
            }
        }
    }

    fn edit_flags(&self, is_bot_edit: bool) -> EditFlags {
        EditFlags {
            update: true,
            ignore_constraints: true,
            bot: is_bot_edit && self.actor.has_right(&self.config.bot_right),
        }
    }

    fn summary_text(&self, direction: &str, other: LexemeId, user: Option<&str>) -> String {
        let summary = Summary::new(self.config.summary_module.as_str())
            .action(direction)
            .comment_arg(other.to_string())
            .user_summary(user);
        self.collaborators.summaries.format_summary(&summary)
    }

    fn truncate(&self, text: &str) -> String {
        text.chars().take(self.config.max_user_summary_length).collect()
    }
}

fn enter(step: MergeStep) {
    debug!(%step, "entering merge step");
}
