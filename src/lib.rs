//! genny - type-specific Go code from generic templates
//!
//! A template is ordinary Go source in which placeholder types are declared
//! as aliases of markers from a pseudo `generic` package:
//!
//! ```text
//! type Item generic.Type
//! ```
//!
//! Generating the template for one or more TypeSets rewrites every
//! placeholder occurrence to the concrete type, merges the variants into a
//! single file, and tidies its imports.
//!
//! # Example
//!
//! ```rust
//! use genny::{generate, TypeSet};
//!
//! let template = "package queue\n\ntype Item generic.Type\n\ntype ItemQueue struct {\n\titems []Item\n}\n";
//! let out = generate("queue.go", template, &[TypeSet::from([("Item", "int")])]).unwrap();
//! assert!(out.contains("type intQueue struct {"));
//! assert!(out.contains("\titems []int"));
//! ```

pub mod catalog;
pub mod error;
pub mod imports;
pub mod merge;
pub mod parser;
pub mod substitute;
pub mod typeset;

pub use catalog::{Catalog, CatalogError};
pub use error::SourceError;
pub use imports::{CommandFixer, ImportFixer, ImportsError, Passthrough, PruneImports};
pub use parser::Template;
pub use substitute::{Specific, Substituter};
pub use typeset::{parse_typesets, TypeSet, TypeSetError};

use thiserror::Error;

/// Errors that can occur during generation
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The template is not well-formed source
    #[error("source: {0}")]
    Source(#[from] SourceError),

    /// A placeholder declared in the template has no concrete type
    #[error("failed to find specific type for: {generic_type}")]
    MissingSpecificType { generic_type: String },

    /// The import fixer rejected the merged output
    #[error("imports: {0}")]
    Imports(#[from] ImportsError),
}

/// Configuration for a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    /// Fixed tables: markers, banner, native spellings
    pub catalog: Catalog,
    /// Package name for the generated file, if it should differ from the template's
    pub package: Option<String>,
}

impl GenerateConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Rename the package of the generated file
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

/// Generate specific code with the default catalog and import fixer
pub fn generate(filename: &str, source: &str, typesets: &[TypeSet]) -> Result<String, GenerateError> {
    let config = GenerateConfig::default();
    let fixer = PruneImports::new(&config.catalog);
    generate_with_config(filename, source, typesets, &config, &fixer)
}

/// Generate specific code with a custom configuration and import fixer
///
/// Every TypeSet is checked against the template before any substitution
/// happens, so a missing type never yields partial output.
pub fn generate_with_config(
    filename: &str,
    source: &str,
    typesets: &[TypeSet],
    config: &GenerateConfig,
    fixer: &dyn ImportFixer,
) -> Result<String, GenerateError> {
    let catalog = &config.catalog;

    let template = Template::parse(source, catalog)?;
    for typeset in typesets {
        if let Some(missing) = template.uncovered(typeset, catalog.native_prefix).first() {
            return Err(GenerateError::MissingSpecificType {
                generic_type: missing.to_string(),
            });
        }
    }

    let substituter = Substituter::new(catalog);
    let variants: Vec<Specific> = typesets
        .iter()
        .map(|typeset| {
            log::debug!("{}: generating {:?}", filename, typeset);
            substituter.generate_specific(source, typeset)
        })
        .collect();

    let mut output = merge::merge_variants(catalog, &variants);
    if let Some(package) = &config.package {
        output = merge::rename_package(&output, package);
    }

    Ok(fixer.fix(filename, &output)?)
}
