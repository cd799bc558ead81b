//! End-to-end scenarios, each run through the real parser/checker pipeline
//! (`test_utils::diagnostics`) rather than the hand-built fixture `Ast`s
//! `src/checker.rs`'s own unit tests use.

use glint_core::printer::display_type;
use glint_core::types::{infer::infer_type, TypeContext};

fn infer_declared_value(src: &str) -> glint_core::types::Type {
    let ast = test_utils::parse_ok(src);
    let decls = test_utils::declarations(&ast);
    let glint_core::ast::NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!("expected a variable declaration") };
    infer_type(&TypeContext::with_globals(), &ast, *value)
}

/// S1: `const x: number = 12` -> no diagnostics; `x` has type `12`.
#[test]
fn s1_well_typed_number_literal() {
    let diags = test_utils::diagnostics("const x: number = 12;");
    assert!(diags.is_empty(), "{diags:?}");
    assert_eq!(display_type(&infer_declared_value("const x: number = 12;")), "12");
}

/// S2: `const x: number = 'hello world'` -> exactly one diagnostic.
#[test]
fn s2_mismatched_string_into_number() {
    let diags = test_utils::diagnostics("const x: number = 'hello world';");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Can't assign 'hello world' into number");
}

/// S3: a literally-true if-else simplifies away the mismatched branch.
#[test]
fn s3_literally_true_if_else_short_circuits() {
    let diags = test_utils::diagnostics("const x: number = if true { 12 } else { 'foo' };");
    assert!(diags.is_empty(), "{diags:?}");
}

/// S4: a non-literal-true condition keeps the union, so the assignment
/// check sees `12 | 'foo'` against `number` and rejects it.
#[test]
fn s4_undetermined_if_else_keeps_the_union_and_is_rejected() {
    let diags = test_utils::diagnostics("const x: number = if false { 12 } else { 'foo' };");
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.starts_with("Can't assign"), "{diags:?}");
}

/// S5: the array literal's middle element carries a preceding comment.
#[test]
fn s5_array_literal_with_preceding_comment() {
    let ast = test_utils::parse_ok("const xs = [true,\n// foo\n 12, nil];");
    let decls = test_utils::declarations(&ast);
    let glint_core::ast::NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!() };
    let glint_core::ast::NodeKind::ArrayLiteralExpr { elements } = &ast.node(*value).kind else { panic!("expected an array literal") };
    assert_eq!(elements.len(), 3);
    let comments = &ast.node(elements[1]).preceding_comments;
    assert_eq!(comments.len(), 1);
    let glint_core::ast::NodeKind::Comment { text, .. } = &ast.node(comments[0]).kind else { panic!("expected a comment") };
    assert_eq!(text.trim(), "foo");
}

/// S6: the third declaration's `[1]` has too few elements for `Pair`.
#[test]
fn s6_tuple_arity_mismatch_is_diagnosed() {
    let diags = test_utils::diagnostics("type Pair = [number, number];\nconst p: Pair = [1, 2];\nconst q: Pair = [1];");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Array type [1] has fewer elements than destination array type [number, number]");
}
