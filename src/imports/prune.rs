//! Built-in import fixer
//!
//! Works on the import section between the package clause and the first
//! other declaration. Imports no qualifier refers to are dropped, duplicates
//! collapse, well-known packages the code uses but never imports are added,
//! and the survivors are written back as one sorted block.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Catalog;
use crate::error::SourceError;
use crate::imports::{ImportFixer, ImportsError};
use crate::parser::lexer::{check_balance, lex, lex_checked, Token};
use crate::substitute::classify::is_word_char;

/// One import: optional alias and the quoted path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    /// Parse `[alias] "path" [// comment]`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let open = text.find('"')?;
        let rest = &text[open + 1..];
        let close = rest.find('"')?;
        let alias = text[..open].trim();
        Some(Self {
            alias: (!alias.is_empty()).then(|| alias.to_string()),
            path: rest[..close].to_string(),
        })
    }

    /// Qualifier the import introduces: the alias, or a name guessed from the path
    ///
    /// The guess is the last segment (skipping a `/vN` suffix), without a
    /// `go-` prefix, cut at the first character that cannot appear in an
    /// identifier: `gopkg.in/yaml.v2` is `yaml`.
    pub fn name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        let mut segments = self.path.rsplit('/');
        let last = segments.next().unwrap_or(&self.path);
        let last = match segments.next() {
            Some(previous) if is_major_version(last) => previous,
            _ => last,
        };
        let last = last.strip_prefix("go-").unwrap_or(last);
        let end = last.find(|c: char| !is_word_char(c)).unwrap_or(last.len());
        &last[..end]
    }

    /// Imports kept for their side effects or dot-imported names
    fn always_kept(&self) -> bool {
        matches!(self.alias.as_deref(), Some("_") | Some("."))
    }

    /// Standard library paths have no dot in their first segment
    fn is_std(&self) -> bool {
        !self.path.split('/').next().unwrap_or("").contains('.')
    }

    fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} \"{}\"", alias, self.path),
            None => format!("\"{}\"", self.path),
        }
    }
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Removes unused imports and adds missing well-known ones
#[derive(Debug, Clone)]
pub struct PruneImports {
    known: BTreeMap<String, String>,
    native_path: String,
}

impl PruneImports {
    pub fn new(catalog: &Catalog) -> Self {
        let native_path = ImportSpec::parse(&catalog.native_import)
            .map(|spec| spec.path)
            .unwrap_or_else(|| "C".to_string());
        Self {
            known: catalog.known_imports.clone(),
            native_path,
        }
    }
}

impl Default for PruneImports {
    fn default() -> Self {
        Self::new(&Catalog::default())
    }
}

/// Where the imports were found and what they said
struct ImportSection {
    package_line: usize,
    native_line: Option<usize>,
    removed: BTreeSet<usize>,
    specs: Vec<ImportSpec>,
}

impl ImportSection {
    fn scan(lines: &[&str], native_path: &str) -> Option<Self> {
        let package_line = lines.iter().position(|l| l.starts_with("package"))?;
        let mut section = Self {
            package_line,
            native_line: None,
            removed: BTreeSet::new(),
            specs: Vec::new(),
        };

        let mut i = package_line + 1;
        while i < lines.len() {
            let line = lines[i].trim();
            if line.is_empty() || line.starts_with("//") {
                i += 1;
                continue;
            }
            let Some(rest) = line.strip_prefix("import") else {
                break;
            };
            let rest = rest.trim();

            if rest == "(" {
                section.removed.insert(i);
                i += 1;
                while i < lines.len() {
                    section.removed.insert(i);
                    let inner = lines[i].trim();
                    if inner.starts_with(')') {
                        break;
                    }
                    if !inner.starts_with("//") {
                        section.specs.extend(ImportSpec::parse(inner));
                    }
                    i += 1;
                }
            } else if let Some(group) = rest.strip_prefix('(') {
                section.removed.insert(i);
                let group = group.trim_end().trim_end_matches(')');
                section
                    .specs
                    .extend(group.split(';').filter_map(ImportSpec::parse));
            } else {
                match ImportSpec::parse(rest) {
                    Some(spec) if spec.alias.is_none() && spec.path == native_path => {
                        section.native_line.get_or_insert(i);
                    }
                    Some(spec) => {
                        section.removed.insert(i);
                        section.specs.push(spec);
                    }
                    None => break,
                }
            }
            i += 1;
        }
        Some(section)
    }
}

/// How identifiers are used in the code outside the import section
#[derive(Default)]
struct Usage {
    /// Identifiers used as `name.` (not themselves a selector)
    qualifiers: BTreeSet<String>,
    /// Qualifiers whose member is exported (`name.Upper`)
    exported_qualifiers: BTreeSet<String>,
    /// Identifiers that appear on their own, i.e. declared or used locally
    bare: BTreeSet<String>,
}

impl Usage {
    fn collect(body: &str) -> Self {
        let tokens: Vec<Token> = lex(body).map(|(t, _)| t).collect();
        let mut usage = Self::default();
        for (i, tok) in tokens.iter().enumerate() {
            let Token::Ident(name) = tok else {
                continue;
            };
            if i > 0 && tokens[i - 1] == Token::Dot {
                continue;
            }
            if tokens.get(i + 1) == Some(&Token::Dot) {
                usage.qualifiers.insert(name.clone());
                if let Some(Token::Ident(member)) = tokens.get(i + 2) {
                    if member.starts_with(|c: char| c.is_uppercase()) {
                        usage.exported_qualifiers.insert(name.clone());
                    }
                }
            } else {
                usage.bare.insert(name.clone());
            }
        }
        usage
    }
}

impl ImportFixer for PruneImports {
    fn fix(&self, filename: &str, source: &str) -> Result<String, ImportsError> {
        let tokens = lex_checked(source)?;
        check_balance(&tokens)?;

        let lines: Vec<&str> = source.lines().collect();
        let section = ImportSection::scan(&lines, &self.native_path).ok_or_else(|| {
            SourceError::expected(0..source.len(), "no package clause", &["keyword 'package'"])
        })?;

        let body: String = lines
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != section.package_line && !section.removed.contains(i))
            .map(|(_, l)| format!("{}\n", l))
            .collect();
        let usage = Usage::collect(&body);

        let mut kept: Vec<ImportSpec> = Vec::new();
        for spec in &section.specs {
            if kept.contains(spec) {
                continue;
            }
            if spec.always_kept() || usage.qualifiers.contains(spec.name()) {
                kept.push(spec.clone());
            } else {
                log::debug!("{}: removing unused import {}", filename, spec.render());
            }
        }

        for qualifier in &usage.exported_qualifiers {
            if usage.bare.contains(qualifier) || kept.iter().any(|s| s.name() == qualifier.as_str()) {
                continue;
            }
            if let Some(path) = self.known.get(qualifier) {
                log::debug!("{}: adding import \"{}\"", filename, path);
                kept.push(ImportSpec::new(path.as_str()));
            }
        }

        let rendered = render_imports(kept);
        let insert_at = section
            .removed
            .first()
            .copied()
            .or(section.native_line.map(|l| l + 1))
            .unwrap_or(section.package_line + 1);

        let mut out_lines: Vec<String> = Vec::with_capacity(lines.len() + rendered.len() + 1);
        for (i, line) in lines.iter().enumerate() {
            if i == insert_at && !rendered.is_empty() {
                out_lines.push(String::new());
                out_lines.extend(rendered.iter().cloned());
                out_lines.push(String::new());
            }
            if !section.removed.contains(&i) {
                out_lines.push(line.to_string());
            }
        }
        if insert_at >= lines.len() && !rendered.is_empty() {
            out_lines.push(String::new());
            out_lines.extend(rendered);
        }

        Ok(tidy(&out_lines))
    }
}

/// Write imports as one line or a grouped, sorted block
fn render_imports(mut specs: Vec<ImportSpec>) -> Vec<String> {
    specs.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.alias.cmp(&b.alias)));
    match specs.as_slice() {
        [] => Vec::new(),
        [only] => vec![format!("import {}", only.render())],
        _ => {
            let (standard, other): (Vec<_>, Vec<_>) = specs.iter().partition(|s| s.is_std());
            let mut block = vec!["import (".to_string()];
            block.extend(standard.iter().map(|s| format!("\t{}", s.render())));
            if !standard.is_empty() && !other.is_empty() {
                block.push(String::new());
            }
            block.extend(other.iter().map(|s| format!("\t{}", s.render())));
            block.push(")".to_string());
            block
        }
    }
}

/// Drop leading and doubled blank lines, end with exactly one newline
fn tidy(lines: &[String]) -> String {
    let mut out = String::new();
    let mut previous_blank = true;
    for line in lines {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        previous_blank = blank;
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}
