//! Integration tests for generating specific code from Go templates

use genny::{
    generate, generate_with_config, parse_typesets, Catalog, GenerateConfig, GenerateError,
    Passthrough, PruneImports, TypeSet,
};
use pretty_assertions::assert_eq;

const QUEUE: &str = include_str!("fixtures/queue.go");
const NUMBERS: &str = include_str!("fixtures/numbers.go");
const PAIR: &str = include_str!("fixtures/pair.go");

fn typesets(expr: &str) -> Vec<TypeSet> {
    parse_typesets(expr).expect("Should parse typesets")
}

#[test]
fn test_queue_for_two_types() {
    let out = generate("queue.go", QUEUE, &typesets("Something=string,int")).expect("Should generate");
    assert_eq!(out, include_str!("fixtures/queue_string_int.go.golden"));
}

#[test]
fn test_merged_output_has_one_package_clause() {
    let out = generate("queue.go", QUEUE, &typesets("Something=string,int,float64")).unwrap();
    assert_eq!(out.matches("package queue").count(), 1);
    assert!(out.contains("type float64Queue struct {"));
}

#[test]
fn test_generator_directive_removed() {
    let out = generate("queue.go", QUEUE, &typesets("Something=string")).unwrap();
    assert!(!out.contains("go:generate"));
}

#[test]
fn test_unused_generic_import_removed() {
    let out = generate("queue.go", QUEUE, &typesets("Something=string")).unwrap();
    assert!(!out.contains("cheekybits/genny/generic"));
}

#[test]
fn test_passthrough_keeps_imports_as_merged() {
    let config = GenerateConfig::new();
    let out = generate_with_config(
        "queue.go",
        QUEUE,
        &typesets("Something=string,int"),
        &config,
        &Passthrough,
    )
    .unwrap();
    assert!(out.starts_with("\n\n// This file was automatically generated by genny."));
    assert_eq!(
        out.matches("import \"github.com/cheekybits/genny/generic\"").count(),
        1
    );
}

#[test]
fn test_native_types_and_single_native_import() {
    let out = generate("numbers.go", NUMBERS, &typesets("Number=int32,float64")).unwrap();
    assert!(out.contains("package numbers\nimport \"C\"\n"));
    assert_eq!(out.matches("import \"C\"").count(), 1);
    assert_eq!(out.matches("import \"fmt\"").count(), 1);

    assert!(out.contains("func ToCint32(v int32) C.int {\n\treturn C.int(v)\n}"));
    assert!(out.contains("func ToCfloat64(v float64) C.double {\n\treturn C.double(v)\n}"));
    assert!(out.contains("// Printint32 prints a int32.\nfunc Printint32(v int32) {"));
}

#[test]
fn test_no_native_import_without_native_spelling() {
    let out = generate("numbers.go", NUMBERS, &typesets("Number=string")).unwrap();
    assert!(!out.contains("import \"C\""));
    assert!(out.contains("func ToCstring(v string) Cstring {"));
}

#[test]
fn test_grouped_declarations() {
    let out = generate("pair.go", PAIR, &typesets("Key=string Value=int")).unwrap();
    assert_eq!(
        out,
        "// This file was automatically generated by genny.\n\
         // Any changes will be lost if this file is regenerated.\n\
         // see https://github.com/cheekybits/genny\n\
         \n\
         package kv\n\
         \n\
         type (\n\
         )\n\
         \n\
         // stringint pairs a string with its int.\n\
         type stringint struct {\n\
         \tK string\n\
         \tV int\n\
         }\n"
    );
}

#[test]
fn test_missing_type_names_placeholder() {
    let err = generate("pair.go", PAIR, &typesets("Key=string")).unwrap_err();
    assert_eq!(err.to_string(), "failed to find specific type for: Value");
}

#[test]
fn test_missing_type_in_later_typeset() {
    let sets = vec![
        TypeSet::from([("Something", "int")]),
        TypeSet::from([("Other", "int")]),
    ];
    let err = generate("queue.go", QUEUE, &sets).unwrap_err();
    match err {
        GenerateError::MissingSpecificType { generic_type } => assert_eq!(generic_type, "Something"),
        other => panic!("expected missing type, got {other}"),
    }
}

#[test]
fn test_package_override() {
    let config = GenerateConfig::new().with_package("stringqueue");
    let fixer = PruneImports::new(&config.catalog);
    let out = generate_with_config(
        "queue.go",
        QUEUE,
        &typesets("Something=string"),
        &config,
        &fixer,
    )
    .unwrap();
    assert!(out.contains("\npackage stringqueue\n"));
    assert!(!out.contains("package queue"));
}

#[test]
fn test_custom_catalog_banner() {
    let catalog = Catalog::from_str("[output]\nbanner = \"// generated\\n\\n\"\n").unwrap();
    let config = GenerateConfig::new().with_catalog(catalog);
    let fixer = PruneImports::new(&config.catalog);
    let out = generate_with_config(
        "pair.go",
        PAIR,
        &typesets("Key=int Value=int"),
        &config,
        &fixer,
    )
    .unwrap();
    assert!(out.starts_with("// generated\n\npackage kv\n"));
}

#[test]
fn test_unbalanced_template_rejected() {
    let template = "package p\n\ntype T generic.Type\n\nfunc f(x T) {\n";
    let err = generate("broken.go", template, &typesets("T=int")).unwrap_err();
    match err {
        GenerateError::Source(e) => {
            let report = e.format(template, "broken.go");
            assert!(report.contains("broken.go"));
        }
        other => panic!("expected source error, got {other}"),
    }
}

#[test]
fn test_missing_well_known_import_added() {
    let template = "package p\n\ntype T generic.Type\n\nfunc ShowT(v T) string { return fmt.Sprint(v) }\n";
    let out = generate("show.go", template, &typesets("T=int")).unwrap();
    assert!(out.contains("package p\n\nimport \"fmt\"\n\nfunc Showint(v int) string { return fmt.Sprint(v) }\n"));
}
