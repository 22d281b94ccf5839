//! Structural scan of a template source
//!
//! Finds the top-level declarations that alias a marker from the generic
//! package (`type Item generic.Type`, or the same inside a `type ( ... )`
//! group) and answers which of them a TypeSet leaves uncovered.

use crate::catalog::Catalog;
use crate::error::SourceError;
use crate::parser::lexer::{check_balance, lex_checked, Span, Token};
use crate::typeset::TypeSet;

/// A placeholder declaration found in the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericDecl {
    /// Declared placeholder name (`Item`)
    pub name: String,
    /// Marker it aliases (`Type`)
    pub marker: String,
    pub span: Span,
}

/// A template source that passed the structural checks
#[derive(Debug, Clone)]
pub struct Template {
    package: String,
    decls: Vec<GenericDecl>,
}

impl Template {
    /// Lex and scan the source, collecting generic declarations
    pub fn parse(source: &str, catalog: &Catalog) -> Result<Self, SourceError> {
        let tokens = lex_checked(source)?;
        check_balance(&tokens)?;

        let package = match tokens.as_slice() {
            [(Token::Package, _), (Token::Ident(name), _), ..] => name.clone(),
            [(Token::Package, span), ..] => {
                return Err(SourceError::expected(
                    span.clone(),
                    "package clause has no name",
                    &["identifier"],
                ))
            }
            [(_, span), ..] => {
                return Err(SourceError::expected(
                    span.clone(),
                    "source must begin with a package clause",
                    &["keyword 'package'"],
                ))
            }
            [] => {
                return Err(SourceError::expected(
                    0..source.len(),
                    "source is empty",
                    &["keyword 'package'"],
                ))
            }
        };

        let scanner = DeclScanner {
            source,
            tokens: &tokens,
            generic_package: &catalog.generic_package,
        };
        let decls = scanner.scan();
        log::debug!(
            "package {}: {} generic declaration(s)",
            package,
            decls.len()
        );

        Ok(Self { package, decls })
    }

    /// Package name from the template's package clause
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn generic_decls(&self) -> &[GenericDecl] {
        &self.decls
    }

    /// Placeholder names declared in the template that the TypeSet does not cover
    ///
    /// A name carrying the native prefix (`CItem`) is covered when its
    /// unprefixed counterpart (`Item`) is present.
    pub fn uncovered(&self, typeset: &TypeSet, native_prefix: char) -> Vec<&str> {
        self.decls
            .iter()
            .filter(|decl| !typeset.covers(&decl.name, native_prefix))
            .map(|decl| decl.name.as_str())
            .collect()
    }
}

struct DeclScanner<'a> {
    source: &'a str,
    tokens: &'a [(Token, Span)],
    generic_package: &'a str,
}

impl<'a> DeclScanner<'a> {
    fn scan(&self) -> Vec<GenericDecl> {
        let mut decls = Vec::new();
        let mut depth = 0usize;
        let mut i = 0;
        while i < self.tokens.len() {
            match &self.tokens[i].0 {
                Token::Type if depth == 0 => {
                    if matches!(self.tokens.get(i + 1), Some((Token::ParenOpen, _))) {
                        i = self.scan_group(i + 2, &mut decls);
                    } else if let Some(decl) = self.generic_spec(i + 1) {
                        decls.push(decl);
                    }
                }
                tok if tok.closer().is_some() => depth += 1,
                tok if tok.is_closer() => depth = depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }
        decls
    }

    /// Scan the specs of a `type ( ... )` group; returns the index of its `)`
    fn scan_group(&self, start: usize, decls: &mut Vec<GenericDecl>) -> usize {
        let mut inner = 0usize;
        let mut at_spec_start = true;
        let mut j = start;
        while j < self.tokens.len() {
            let tok = &self.tokens[j].0;
            if tok.is_closer() {
                if inner == 0 {
                    return j;
                }
                inner -= 1;
            } else if tok.closer().is_some() {
                inner += 1;
            } else if inner == 0 && at_spec_start {
                if let Some(decl) = self.generic_spec(j) {
                    decls.push(decl);
                }
            }
            at_spec_start =
                inner == 0 && (matches!(tok, Token::Semicolon) || self.newline_after(j));
            j += 1;
        }
        j
    }

    /// Match `Name [=] generic.Marker` ending the spec at `at`
    fn generic_spec(&self, at: usize) -> Option<GenericDecl> {
        let Some((Token::Ident(name), name_span)) = self.tokens.get(at) else {
            return None;
        };
        let mut k = at + 1;
        if matches!(self.tokens.get(k), Some((Token::Assign, _))) {
            k += 1;
        }
        match (
            self.tokens.get(k),
            self.tokens.get(k + 1),
            self.tokens.get(k + 2),
        ) {
            (
                Some((Token::Ident(package), _)),
                Some((Token::Dot, _)),
                Some((Token::Ident(marker), end)),
            ) if package == self.generic_package && self.spec_ends(k + 2) => Some(GenericDecl {
                name: name.clone(),
                marker: marker.clone(),
                span: name_span.start..end.end,
            }),
            _ => None,
        }
    }

    fn spec_ends(&self, last: usize) -> bool {
        match self.tokens.get(last + 1) {
            None => true,
            Some((Token::Semicolon | Token::ParenClose, _)) => true,
            Some(_) => self.newline_after(last),
        }
    }

    /// Whether a line break separates token `at` from the next token
    fn newline_after(&self, at: usize) -> bool {
        match (self.tokens.get(at), self.tokens.get(at + 1)) {
            (Some((_, here)), Some((_, next))) => self.source[here.end..next.start].contains('\n'),
            _ => true,
        }
    }
}
