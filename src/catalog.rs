//! Placeholder catalog: the fixed tables the generator works from
//!
//! Everything here is data rather than behavior. The built-in defaults ship
//! as an embedded TOML document, and a user file can override any table so
//! the engine can be exercised with alternate banners, markers or native
//! type mappings.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing a catalog file
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Immutable configuration tables consumed by the generator
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Name of the pseudo package the markers live in (`generic`)
    pub generic_package: String,
    /// Reserved marker names inside the generic package
    pub markers: Vec<String>,
    /// Letter that prefixes the native-interop form of a placeholder
    pub native_prefix: char,
    /// Concrete type -> native-interop spelling
    pub native_types: BTreeMap<String, String>,
    /// Directive inserted after the package clause when a native spelling was used
    pub native_import: String,
    /// Comment block written at the top of every generated file
    pub banner: String,
    /// Lines starting with any of these are dropped from the merged output
    pub unwanted_prefixes: Vec<String>,
    /// Qualifier -> import path for packages the import fixer may add
    pub known_imports: BTreeMap<String, String>,
}

/// TOML structure for deserializing catalogs; every table is optional
#[derive(Deserialize)]
struct TomlCatalog {
    generic: Option<TomlGeneric>,
    output: Option<TomlOutput>,
    native: Option<TomlNative>,
    imports: Option<TomlImports>,
}

#[derive(Deserialize)]
struct TomlGeneric {
    package: Option<String>,
    markers: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TomlOutput {
    banner: Option<String>,
    unwanted_prefixes: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct TomlNative {
    prefix: Option<char>,
    import: Option<String>,
    types: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct TomlImports {
    known: Option<BTreeMap<String, String>>,
}

/// Built-in tables
const DEFAULT_CATALOG: &str = r#"
[generic]
package = "generic"
markers = ["Type", "Number", "CType", "CNumber"]

[output]
banner = "\n\n// This file was automatically generated by genny.\n// Any changes will be lost if this file is regenerated.\n// see https://github.com/cheekybits/genny\n\n"
unwanted_prefixes = ["//go:generate genny "]

[native]
prefix = "C"
import = 'import "C"'

[native.types]
float64 = "C.double"
float32 = "C.float"
int = "C.int"
uint = "C.uint"
int32 = "C.int"
uint32 = "C.uint"
int64 = "C.long"
uint64 = "C.ulong"

[imports.known]
bufio = "bufio"
bytes = "bytes"
errors = "errors"
fmt = "fmt"
io = "io"
math = "math"
os = "os"
reflect = "reflect"
sort = "sort"
strconv = "strconv"
strings = "strings"
sync = "sync"
atomic = "sync/atomic"
time = "time"
unicode = "unicode"
utf8 = "unicode/utf8"
unsafe = "unsafe"
"#;

impl Catalog {
    /// Load a catalog from a TOML file, layered over the defaults
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a catalog from a TOML string, layered over the defaults
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;
        Ok(Self::default().overlay(parsed))
    }

    fn empty() -> Self {
        Self {
            generic_package: String::new(),
            markers: Vec::new(),
            native_prefix: 'C',
            native_types: BTreeMap::new(),
            native_import: String::new(),
            banner: String::new(),
            unwanted_prefixes: Vec::new(),
            known_imports: BTreeMap::new(),
        }
    }

    fn overlay(mut self, parsed: TomlCatalog) -> Self {
        if let Some(generic) = parsed.generic {
            if let Some(package) = generic.package {
                self.generic_package = package;
            }
            if let Some(markers) = generic.markers {
                self.markers = markers;
            }
        }
        if let Some(output) = parsed.output {
            if let Some(banner) = output.banner {
                self.banner = banner;
            }
            if let Some(prefixes) = output.unwanted_prefixes {
                self.unwanted_prefixes = prefixes;
            }
        }
        if let Some(native) = parsed.native {
            if let Some(prefix) = native.prefix {
                self.native_prefix = prefix;
            }
            if let Some(import) = native.import {
                self.native_import = import;
            }
            if let Some(types) = native.types {
                self.native_types = types;
            }
        }
        if let Some(known) = parsed.imports.and_then(|i| i.known) {
            self.known_imports = known;
        }
        self
    }

    /// Qualified marker spellings, e.g. `generic.Type`
    pub fn qualified_markers(&self) -> impl Iterator<Item = String> + '_ {
        self.markers
            .iter()
            .map(move |m| format!("{}.{}", self.generic_package, m))
    }

    /// Whether the line declares a placeholder and must be stripped
    pub fn is_marker_line(&self, line: &str) -> bool {
        self.qualified_markers().any(|m| line.contains(&m))
    }

    /// Native-interop spelling for a concrete type, if it has one
    pub fn native_spelling(&self, concrete: &str) -> Option<&str> {
        self.native_types.get(concrete).map(|s| s.as_str())
    }

    /// Whether the line starts with one of the unwanted prefixes
    pub fn is_unwanted(&self, line: &str) -> bool {
        self.unwanted_prefixes
            .iter()
            .any(|prefix| line.starts_with(prefix.as_str()))
    }

    /// Set the banner written at the top of generated output
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Replace the native-interop mapping table
    pub fn with_native_types(mut self, types: BTreeMap<String, String>) -> Self {
        self.native_types = types;
        self
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let parsed: TomlCatalog =
            toml::from_str(DEFAULT_CATALOG).expect("Default catalog should be valid TOML");
        Self::empty().overlay(parsed)
    }
}
