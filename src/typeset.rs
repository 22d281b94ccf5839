//! TypeSets and the typeset expression parser
//!
//! A typeset expression names every placeholder with one or more concrete
//! types, e.g. `"Key=string,int Value=BUILTINS"`. Each combination of
//! choices becomes one TypeSet, and each TypeSet yields one variant of the
//! generated output.

use std::collections::BTreeMap;

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::prelude::*;
use thiserror::Error;

use crate::error::Span;

/// Go's predeclared types, substituted for the `BUILTINS` wildcard
pub const BUILTINS: &[&str] = &[
    "bool",
    "byte",
    "complex128",
    "complex64",
    "error",
    "float32",
    "float64",
    "int",
    "int16",
    "int32",
    "int64",
    "int8",
    "rune",
    "string",
    "uint",
    "uint16",
    "uint32",
    "uint64",
    "uint8",
    "uintptr",
];

/// Go's numeric types, substituted for the `NUMBERS` wildcard
pub const NUMBERS: &[&str] = &[
    "float32", "float64", "int", "int16", "int32", "int64", "int8", "uint", "uint16", "uint32",
    "uint64", "uint8",
];

/// Errors from parsing a typeset expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeSetError {
    #[error("invalid typeset at {span:?}: {message}")]
    Syntax { span: Span, message: String },

    #[error("type name '{name}' given more than once")]
    Duplicate { name: String },

    #[error("no typesets given")]
    Empty,
}

impl TypeSetError {
    /// Format the error against the expression it came from
    pub fn format(&self, expr: &str) -> String {
        let TypeSetError::Syntax { span, message } = self else {
            return self.to_string();
        };
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, "typeset", span.start)
            .with_message("invalid typeset")
            .with_label(
                Label::new(("typeset", span.clone()))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write(("typeset", Source::from(expr)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Mapping from placeholder name to the concrete type that replaces it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSet {
    types: BTreeMap<String, String>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping, builder style
    pub fn with(mut self, placeholder: impl Into<String>, concrete: impl Into<String>) -> Self {
        self.insert(placeholder, concrete);
        self
    }

    pub fn insert(&mut self, placeholder: impl Into<String>, concrete: impl Into<String>) {
        self.types.insert(placeholder.into(), concrete.into());
    }

    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.types.get(placeholder).map(|s| s.as_str())
    }

    pub fn contains(&self, placeholder: &str) -> bool {
        self.types.contains_key(placeholder)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether a declared placeholder name is satisfied by this set
    ///
    /// `CName` is satisfied by `Name` when `C` is the native prefix.
    pub fn covers(&self, name: &str, native_prefix: char) -> bool {
        self.contains(name)
            || name
                .strip_prefix(native_prefix)
                .is_some_and(|rest| !rest.is_empty() && self.contains(rest))
    }

    /// Mappings in substitution order: longest placeholder first, then by name
    ///
    /// A placeholder that is a substring of another (`Key` in `KeyType`) must
    /// not rewrite the longer one's occurrences first.
    pub fn by_precedence(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self.iter().filter(|(k, _)| !k.is_empty()).collect();
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TypeSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            types: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for TypeSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Parse a typeset expression into the cartesian product of its choices
///
/// The first named placeholder varies slowest.
pub fn parse_typesets(expr: &str) -> Result<Vec<TypeSet>, TypeSetError> {
    if expr.trim().is_empty() {
        return Err(TypeSetError::Empty);
    }

    let pairs = typeset_parser()
        .parse(expr)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(err) => TypeSetError::Syntax {
                span: err.span().into_range(),
                message: err.to_string(),
            },
            None => TypeSetError::Empty,
        })?;

    let mut seen: Vec<&str> = Vec::new();
    for (name, _) in &pairs {
        if seen.contains(&name.as_str()) {
            return Err(TypeSetError::Duplicate { name: name.clone() });
        }
        seen.push(name);
    }

    let mut sets = vec![TypeSet::new()];
    for (name, choices) in &pairs {
        let choices = expand_wildcards(choices);
        let mut next = Vec::with_capacity(sets.len() * choices.len());
        for set in &sets {
            for concrete in &choices {
                next.push(set.clone().with(name.as_str(), concrete.as_str()));
            }
        }
        sets = next;
    }
    log::debug!("typeset expression expanded to {} typeset(s)", sets.len());
    Ok(sets)
}

/// Replace `BUILTINS` and `NUMBERS`, keeping first occurrences only
fn expand_wildcards(choices: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::new();
    for choice in choices {
        let group: Vec<&str> = match choice.as_str() {
            "BUILTINS" => BUILTINS.to_vec(),
            "NUMBERS" => NUMBERS.to_vec(),
            other => vec![other],
        };
        for concrete in group {
            if !expanded.iter().any(|e| e == concrete) {
                expanded.push(concrete.to_string());
            }
        }
    }
    expanded
}

fn typeset_parser<'a>(
) -> impl Parser<'a, &'a str, Vec<(String, Vec<String>)>, extra::Err<Rich<'a, char>>> {
    let name = any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .collect::<String>()
        .labelled("type name");

    let concrete = any()
        .filter(|c: &char| !c.is_whitespace() && *c != ',' && *c != '=')
        .repeated()
        .at_least(1)
        .collect::<String>()
        .labelled("specific type");

    let pair = name.then_ignore(just('=')).then(
        concrete
            .separated_by(just(','))
            .at_least(1)
            .collect::<Vec<_>>(),
    );

    pair.padded()
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(end())
}
