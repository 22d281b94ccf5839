//! Scanner for Go template sources

pub mod lexer;
mod template;

pub use template::{GenericDecl, Template};
