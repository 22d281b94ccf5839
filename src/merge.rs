//! Multi-variant merge pass
//!
//! Concatenates the per-TypeSet outputs behind the banner and cleans the
//! result into one file: a single package clause, a single import section,
//! no generator directives, and the native import directive right after the
//! package clause when any variant needed it.

use crate::catalog::Catalog;
use crate::substitute::{push_line, Specific};

/// Structural category of a line in the concatenated output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `package name`
    Package,
    /// `import (` opening a block
    ImportBlockOpen,
    /// Single-line `import "path"`
    Import,
    /// Generator directive to drop
    Unwanted,
    Other,
}

/// Classify one line of the concatenated output
pub fn classify_line(line: &str, catalog: &Catalog) -> LineKind {
    if starts_with_keyword(line, "package") {
        LineKind::Package
    } else if starts_with_keyword(line, "import") {
        if line.trim_end().ends_with('(') {
            LineKind::ImportBlockOpen
        } else {
            LineKind::Import
        }
    } else if catalog.is_unwanted(line) {
        LineKind::Unwanted
    } else {
        LineKind::Other
    }
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword).is_some_and(|rest| {
        rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '(' || c == '"')
    })
}

/// Line filter state across the whole concatenation
#[derive(Debug, Default)]
struct MergeState {
    packages_seen: usize,
    package_kept: bool,
    in_import_block: bool,
    native_import_pending: bool,
}

impl MergeState {
    /// Decide whether a line survives, updating the state
    fn keep(&mut self, line: &str, catalog: &Catalog) -> bool {
        if self.in_import_block {
            if line.trim_end().ends_with(')') {
                self.in_import_block = false;
            }
            if self.packages_seen > 1 {
                return false;
            }
        }

        match classify_line(line, catalog) {
            LineKind::Package => {
                self.packages_seen += 1;
                if self.package_kept {
                    return false;
                }
                self.package_kept = true;
                true
            }
            LineKind::ImportBlockOpen => {
                self.in_import_block = true;
                self.packages_seen <= 1
            }
            LineKind::Import => self.packages_seen <= 1,
            LineKind::Unwanted => false,
            LineKind::Other => true,
        }
    }
}

/// Concatenate variants after the banner and clean the result
pub fn merge_variants(catalog: &Catalog, variants: &[Specific]) -> String {
    let mut combined = catalog.banner.clone();
    let mut needs_native = false;
    for variant in variants {
        combined.push_str(&variant.content);
        needs_native |= variant.used_native;
    }
    clean(catalog, &combined, needs_native)
}

/// Deduplicate package clauses and import sections of a concatenation
pub fn clean(catalog: &Catalog, combined: &str, needs_native: bool) -> String {
    let mut state = MergeState {
        native_import_pending: needs_native,
        ..MergeState::default()
    };
    let mut out = String::with_capacity(combined.len());

    for line in combined.lines() {
        if !state.keep(line, catalog) {
            log::trace!("merge: dropping {:?}", line);
            continue;
        }
        push_line(&mut out, line);

        if state.package_kept && state.native_import_pending {
            log::info!("adding {} for native type spellings", catalog.native_import);
            push_line(&mut out, &catalog.native_import);
            state.native_import_pending = false;
        }
    }
    out
}

/// Replace the name in the first package clause
pub fn rename_package(source: &str, package: &str) -> String {
    let mut out = String::with_capacity(source.len() + package.len());
    let mut done = false;
    for line in source.lines() {
        if !done && starts_with_keyword(line, "package") {
            let mut parts: Vec<&str> = line.split(' ').collect();
            if parts.len() > 1 {
                parts[1] = package;
            } else {
                parts.push(package);
            }
            push_line(&mut out, &parts.join(" "));
            done = true;
            continue;
        }
        push_line(&mut out, line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn variant(content: &str, used_native: bool) -> Specific {
        Specific {
            content: content.to_string(),
            used_native,
        }
    }

    fn plain_catalog() -> Catalog {
        Catalog::default().with_banner("// banner\n")
    }

    #[test]
    fn test_classify_lines() {
        let catalog = Catalog::default();
        assert_eq!(classify_line("package queue", &catalog), LineKind::Package);
        assert_eq!(classify_line("import (", &catalog), LineKind::ImportBlockOpen);
        assert_eq!(classify_line(r#"import "fmt""#, &catalog), LineKind::Import);
        assert_eq!(
            classify_line("//go:generate genny -in=$GOFILE gen \"T=int\"", &catalog),
            LineKind::Unwanted
        );
        assert_eq!(classify_line("packages := 1", &catalog), LineKind::Other);
        assert_eq!(classify_line("\timport_x()", &catalog), LineKind::Other);
    }

    #[test]
    fn test_merge_keeps_one_package_and_import_block() {
        let catalog = plain_catalog();
        let first = "package q\n\nimport (\n\t\"fmt\"\n)\n\nfunc A() { fmt.Println() }\n";
        let second = "package q\n\nimport (\n\t\"fmt\"\n)\n\nfunc B() { fmt.Println() }\n";
        let merged = merge_variants(&catalog, &[variant(first, false), variant(second, false)]);
        assert_eq!(
            merged,
            "// banner\npackage q\n\nimport (\n\t\"fmt\"\n)\n\nfunc A() { fmt.Println() }\n\n\nfunc B() { fmt.Println() }\n"
        );
    }

    #[test]
    fn test_single_line_imports_after_first_variant_dropped() {
        let catalog = plain_catalog();
        let first = "package q\nimport \"fmt\"\nvar a = 1\n";
        let second = "package q\nimport \"fmt\"\nvar b = 2\n";
        let merged = merge_variants(&catalog, &[variant(first, false), variant(second, false)]);
        assert_eq!(
            merged,
            "// banner\npackage q\nimport \"fmt\"\nvar a = 1\nvar b = 2\n"
        );
    }

    #[test]
    fn test_native_import_injected_once() {
        let catalog = plain_catalog();
        let merged = merge_variants(
            &catalog,
            &[
                variant("package n\nvar a C.int\n", true),
                variant("package n\nvar b C.long\n", true),
            ],
        );
        assert_eq!(
            merged,
            "// banner\npackage n\nimport \"C\"\nvar a C.int\nvar b C.long\n"
        );
        assert_eq!(merged.matches("import \"C\"").count(), 1);
    }

    #[test]
    fn test_native_import_from_later_variant() {
        let catalog = plain_catalog();
        let merged = merge_variants(
            &catalog,
            &[
                variant("package n\nvar a string\n", false),
                variant("package n\nvar b C.int\n", true),
            ],
        );
        assert_eq!(
            merged,
            "// banner\npackage n\nimport \"C\"\nvar a string\nvar b C.int\n"
        );
    }

    #[test]
    fn test_unwanted_prefix_dropped() {
        let catalog = plain_catalog();
        let merged = merge_variants(
            &catalog,
            &[variant(
                "//go:generate genny -in=x.go gen \"T=int\"\npackage q\n",
                false,
            )],
        );
        assert_eq!(merged, "// banner\npackage q\n");
    }

    #[test]
    fn test_default_banner_leads_output() {
        let catalog = Catalog::default();
        let merged = merge_variants(&catalog, &[variant("package q\n", false)]);
        assert!(merged.starts_with(&catalog.banner));
        assert!(merged.ends_with("package q\n"));
    }

    #[test]
    fn test_rename_package_first_clause_only() {
        let source = "// banner\npackage q\n\nvar s = \"package q\"\npackage q\n";
        assert_eq!(
            rename_package(source, "ints"),
            "// banner\npackage ints\n\nvar s = \"package q\"\npackage q\n"
        );
    }

    #[test]
    fn test_rename_bare_package_line() {
        assert_eq!(rename_package("package\n", "p"), "package p\n");
    }
}
