//! Black-box checker tests.

#[test]
fn assigning_a_string_literal_into_number_is_rejected() {
    let diags = test_utils::diagnostics("const x: number = 'hello world';");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Can't assign 'hello world' into number");
}

#[test]
fn a_well_typed_const_declaration_has_no_diagnostics() {
    let diags = test_utils::diagnostics("const x: number = 12;");
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
}

#[test]
fn assigning_to_a_const_binding_is_rejected() {
    let diags = test_utils::diagnostics("const f = () => { const x = 1; x = 2; };");
    assert!(diags.iter().any(|d| d.message.to_lowercase().contains("const")), "expected a const-reassignment diagnostic, got {diags:?}");
}

#[test]
fn mismatched_markup_tags_are_rejected() {
    let diags = test_utils::diagnostics("const view = <Foo></Bar>;");
    assert!(!diags.is_empty(), "expected a tag-mismatch diagnostic");
}

#[test]
fn redundant_conditional_is_flagged_only_in_statement_form() {
    let stmt_diags = test_utils::diagnostics("const f = () => { if true { return 1; } else { return 2; } };");
    assert!(stmt_diags.iter().any(|d| d.message.to_lowercase().contains("redundant")), "expected a redundant-conditional diagnostic for the statement form, got {stmt_diags:?}");

    let expr_diags = test_utils::diagnostics("const x: number = if true { 12 } else { 'foo' };");
    assert!(expr_diags.is_empty(), "if-else-as-expression must never get the redundant-conditional diagnostic, got {expr_diags:?}");
}

#[test]
fn unresolved_local_identifier_is_rejected() {
    let diags = test_utils::diagnostics("const x = undeclared_name;");
    assert!(!diags.is_empty(), "expected a diagnostic for an unresolved identifier");
}

/// S6: `Pair = [number, number]`; `[1]` has fewer elements than the
/// destination tuple type.
#[test]
fn array_tuple_arity_mismatch_is_rejected() {
    let diags = test_utils::diagnostics("type Pair = [number, number];\nconst p: Pair = [1, 2];\nconst q: Pair = [1];");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Array type [1] has fewer elements than destination array type [number, number]");
}
