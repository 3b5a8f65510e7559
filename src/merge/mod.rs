//! The lexeme merge engine.
//!
//! The mergers operate on in-memory lexemes only and never touch storage.
//! [`MergeInteractor`] drives them through load, save and redirect.

pub mod forms;
pub mod interactor;
pub mod lexeme;
pub mod outcome;
pub mod references;
pub mod senses;
pub mod statements;

pub use forms::FormsMerger;
pub use interactor::{MergeCollaborators, MergeInteractor, MergeResult, MergeStep};
pub use lexeme::LexemeMerger;
pub use outcome::{MergeOutcome, SubEntityMerge};
pub use references::ReferenceMap;
pub use senses::SensesMerger;
pub use statements::StatementsMerger;
