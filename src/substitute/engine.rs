//! Line substitution engine
//!
//! Rewrites one template for one TypeSet. Lines declaring placeholders are
//! stripped, every other line is rewritten word by word, and single-line
//! comments are held back so that they always land directly above the line
//! they annotate (and vanish along with a stripped declaration).

use crate::catalog::Catalog;
use crate::substitute::classify::{is_embedded, is_exported, is_native_match, wordify};
use crate::typeset::TypeSet;

/// Output of one substitution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specific {
    /// Rewritten source, one `\n` per line
    pub content: String,
    /// Whether any native-interop spelling was substituted
    pub used_native: bool,
}

/// Applies TypeSets to template text using the catalog's tables
#[derive(Debug, Clone, Copy)]
pub struct Substituter<'a> {
    catalog: &'a Catalog,
}

impl<'a> Substituter<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Rewrite the whole template for one TypeSet
    pub fn generate_specific(&self, template: &str, typeset: &TypeSet) -> Specific {
        let placeholders = typeset.by_precedence();
        let mut content = String::with_capacity(template.len());
        let mut used_native = false;
        let mut pending_comment: Option<String> = None;

        for raw in template.lines() {
            if self.catalog.is_marker_line(raw) {
                if let Some(comment) = pending_comment.take() {
                    log::trace!("dropping comment above declaration: {}", comment);
                }
                continue;
            }

            let rewritten = self.rewrite_line(raw, &placeholders, &mut used_native);

            if let Some(comment) = pending_comment.take() {
                push_line(&mut content, &comment);
            }

            if rewritten.trim_start().starts_with("//") {
                pending_comment = Some(rewritten);
                continue;
            }

            push_line(&mut content, &rewritten);
        }

        if let Some(comment) = pending_comment {
            push_line(&mut content, &comment);
        }

        Specific {
            content,
            used_native,
        }
    }

    /// Rewrite every placeholder occurrence in a line
    ///
    /// Lines without any placeholder come back untouched; rewritten lines
    /// keep their indentation and have their words joined by single spaces.
    pub fn rewrite_line(
        &self,
        line: &str,
        placeholders: &[(&str, &str)],
        used_native: &mut bool,
    ) -> String {
        let mut line = line.to_string();
        for &(placeholder, concrete) in placeholders {
            if !line.contains(placeholder) {
                continue;
            }
            let indent = line.len() - line.trim_start().len();
            let words: Vec<String> = line
                .split_whitespace()
                .map(|word| self.rewrite_word(word, placeholder, concrete, used_native))
                .collect();
            line = format!("{}{}", &line[..indent], words.join(" "));
        }
        line
    }

    /// Rewrite the occurrences of one placeholder inside a word, left to right
    pub fn rewrite_word(
        &self,
        word: &str,
        placeholder: &str,
        concrete: &str,
        used_native: &mut bool,
    ) -> String {
        let mut word = word.to_string();
        if placeholder.is_empty() {
            return word;
        }

        let prefix = self.catalog.native_prefix;
        let mut cursor = 0;
        while let Some(offset) = word[cursor..].find(placeholder) {
            let index = cursor + offset;
            let end = index + placeholder.len();

            let (start, replacement) = if is_embedded(&word, index, placeholder.len()) {
                let native = if is_native_match(&word, placeholder, index, prefix) {
                    self.catalog.native_spelling(concrete)
                } else {
                    None
                };
                match native {
                    Some(spelling) => {
                        *used_native = true;
                        (index - prefix.len_utf8(), spelling.to_string())
                    }
                    None => (index, wordify(concrete, is_exported(&word))),
                }
            } else {
                (index, concrete.to_string())
            };

            word.replace_range(start..end, &replacement);
            cursor = start + replacement.len();
        }
        word
    }
}

pub(crate) fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end_matches(['\r', '\n']));
    out.push('\n');
}
