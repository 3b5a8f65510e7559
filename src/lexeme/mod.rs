//! Lexeme layer modules.
//!
//! This module groups the lexeme aggregate, its forms and senses, and the
//! local id allocator they share.

pub mod allocator;
#[allow(clippy::module_inception)]
pub mod lexeme;
pub mod form;
pub mod sense;

pub use allocator::LocalIdCounter;
pub use form::Form;
pub use lexeme::{Lexeme, LexemeBuilder, LexemeRecord};
pub use sense::Sense;
