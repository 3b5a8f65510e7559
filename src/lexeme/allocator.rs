//! Local identifier allocation for forms and senses.
//!
//! Each lexeme carries one counter per sub-entity kind. A counter only moves
//! forward: ids of removed forms or senses are never handed out again, and a
//! merge that copies N sub-entities advances the target's counter by N.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The next free lexeme-local id for one sub-entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LocalIdCounter(NonZeroU32);

impl LocalIdCounter {
    /// A fresh counter; the first allocated id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self(NonZeroU32::MIN)
    }

    /// A counter whose next allocated id is `next`.
    pub fn starting_at(next: u32) -> Result<Self, ValidationError> {
        NonZeroU32::new(next)
            .map(Self)
            .ok_or(ValidationError::CounterTooLow {
                counter: "local id",
                value: 0,
                highest: 0,
            })
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub const fn peek(&self) -> u32 {
        self.0.get()
    }

    /// Hands out the next id and advances the counter by exactly one.
    pub fn allocate(&mut self) -> Result<NonZeroU32, ValidationError> {
        let id = self.0;
        self.0 = id
            .checked_add(1)
            .ok_or(ValidationError::CounterExhausted)?;
        Ok(id)
    }

    /// Returns true if `local` could have been allocated by this counter.
    #[must_use]
    pub const fn has_issued(&self, local: u32) -> bool {
        local < self.0.get()
    }
}

impl Default for LocalIdCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<u32> for LocalIdCounter {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::starting_at(value)
    }
}

impl From<LocalIdCounter> for u32 {
    fn from(counter: LocalIdCounter) -> Self {
        counter.peek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_sequentially() {
        let mut counter = LocalIdCounter::new();
        assert_eq!(counter.allocate().unwrap().get(), 1);
        assert_eq!(counter.allocate().unwrap().get(), 2);
        assert_eq!(counter.peek(), 3);
    }

    #[test]
    fn test_starting_at() {
        let mut counter = LocalIdCounter::starting_at(7).unwrap();
        assert!(counter.has_issued(6));
        assert!(!counter.has_issued(7));
        assert_eq!(counter.allocate().unwrap().get(), 7);
        assert!(LocalIdCounter::starting_at(0).is_err());
    }

    #[test]
    fn test_exhaustion_does_not_reuse() {
        let mut counter = LocalIdCounter::starting_at(u32::MAX).unwrap();
        assert_eq!(counter.allocate(), Err(ValidationError::CounterExhausted));
        assert_eq!(counter.peek(), u32::MAX);
    }
}
