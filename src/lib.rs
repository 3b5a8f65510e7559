//! # KyroLex - Lexeme entities and their merge engine
//!
//! KyroLex models dictionary entries for structured-knowledge stores and
//! merges duplicate entries into one, keeping every statement, form and
//! sense of the merged-away lexeme.
//!
//! ## Core Concepts
//!
//! - **Lexeme**: A word or phrase with lemmas, a language and a lexical category
//! - **Form**: A spelling of the lexeme (representations plus grammatical features)
//! - **Sense**: A meaning of the lexeme (glosses)
//! - **Statement**: A structured claim with a GUID owned by its entity
//! - **MergeInteractor**: The permission, load, save and redirect sequence around a merge
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kyrolex::{
//!     Actor, InMemoryLexemeStore, InMemoryWatchlist, Lexeme, LexemeMerger, MergeCollaborators,
//!     MergeInteractor, StaticPermissionChecker, TermList,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryLexemeStore::new());
//! for (id, lemma) in [("L1", "colour"), ("L2", "color")] {
//!     let mut lexeme = Lexeme::builder()
//!         .id(id.parse()?)
//!         .lemma("en", lemma)
//!         .language("Q1860".parse()?)
//!         .lexical_category("Q1084".parse()?)
//!         .build()?;
//!     lexeme.add_sense(TermList::from_pairs([("en", "hue")])?)?;
//!     store.insert(lexeme)?;
//! }
//!
//! let interactor = MergeInteractor::new(
//!     LexemeMerger::default(),
//!     MergeCollaborators::in_memory(
//!         store.clone(),
//!         Arc::new(InMemoryWatchlist::new()),
//!         Arc::new(StaticPermissionChecker::allow_all()),
//!     ),
//!     Actor::new("Editor"),
//! );
//!
//! let result = interactor.merge_lexemes("L1".parse()?, "L2".parse()?, Some("duplicate"), false)?;
//! assert_eq!(result.target.lexeme.senses().len(), 1);
//! assert_eq!(store.redirect_target("L1".parse()?)?, Some("L2".parse()?));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod error;
pub mod ids;
pub mod lexeme;
pub mod statement;
pub mod summary;
pub mod term;

// Merge engine and collaborators
pub mod merge;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use config::MergeConfig;
pub use error::{LexError, LexResult, MergeError, ValidationError};
pub use ids::{EntityIdValue, FormId, ItemId, LexemeId, PropertyId, SenseId};
pub use lexeme::{Form, Lexeme, LexemeBuilder, LocalIdCounter, Sense};
pub use statement::{
    DataValue, GuidGenerator, RandomGuidGenerator, Rank, SequentialGuidGenerator, Snak, SnakValue,
    Statement, StatementGuid, StatementList, StatementListProvider,
};
pub use summary::{AutoCommentFormatter, Summary, SummaryFormatter};
pub use term::TermList;

pub use merge::{
    FormsMerger, LexemeMerger, MergeCollaborators, MergeInteractor, MergeOutcome, MergeResult,
    MergeStep, ReferenceMap, SensesMerger, StatementsMerger, SubEntityMerge,
};
pub use storage::{
    Actor, EditFlags, EntityAction, EntityRevision, EntityRevisionLookup, EntityStore,
    InMemoryLexemeStore, InMemoryWatchlist, LookupMode, PageRef, PermissionChecker,
    PermissionStatus, RedirectCreator, RevisionId, StaticPermissionChecker, StorageError,
    WatchlistStore,
};
