//! Statement copying across entities.

use std::sync::Arc;

use crate::error::MergeError;
use crate::statement::{GuidGenerator, StatementListProvider};

/// Appends a source entity's statements onto a target entity.
///
/// Each copy keeps its snaks and rank but receives a fresh GUID owned by the
/// target. Duplicates are kept: two equal claims after a merge are a
/// legitimate outcome.
#[derive(Clone)]
pub struct StatementsMerger {
    guids: Arc<dyn GuidGenerator>,
}

impl StatementsMerger {
    /// Creates a merger that assigns GUIDs from `guids`.
    #[must_use]
    pub fn new(guids: Arc<dyn GuidGenerator>) -> Self {
        Self { guids }
    }

    /// Copies every statement of `source` onto `target`. Returns the number copied.
    pub fn merge<S, T>(&self, source: &S, target: &mut T) -> Result<usize, MergeError>
    where
        S: StatementListProvider + ?Sized,
        T: StatementListProvider + ?Sized,
    {
        let owner = target
            .statement_owner()
            .ok_or_else(|| MergeError::invariant("statement target has no id"))?;

        let into = target.statements_mut();
        for statement in source.statements() {
            let mut copy = statement.clone();
            copy.guid = Some(self.guids.new_guid(owner));
            into.push(copy);
        }
        Ok(source.statements().len())
    }
}
