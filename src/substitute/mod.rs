//! Placeholder substitution
//!
//! `classify` holds the pure rules for telling exact, embedded and
//! native-interop matches apart; `engine` applies them line by line.

pub mod classify;
mod engine;

pub(crate) use engine::push_line;
pub use engine::{Specific, Substituter};
