//! Black-box type-engine tests.

use glint_core::printer::display_type;
use glint_core::types::{subsume::subsumation_issues, ArrayElement, ArrayShape, Type, TypeContext};

#[test]
fn literal_round_trips_through_infer_and_display() {
    let ast = test_utils::parse_ok("const _x = 12;");
    let decls = test_utils::declarations(&ast);
    let glint_core::ast::NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!() };
    let ctx = TypeContext::with_globals();
    let ty = glint_core::types::infer::infer_type(&ctx, &ast, *value);
    assert_eq!(display_type(&ty), "12");
}

#[test]
fn string_literal_round_trips_with_quoting() {
    let ast = test_utils::parse_ok("const _x = 'hello world';");
    let decls = test_utils::declarations(&ast);
    let glint_core::ast::NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!() };
    let ctx = TypeContext::with_globals();
    let ty = glint_core::types::infer::infer_type(&ctx, &ast, *value);
    assert_eq!(display_type(&ty), "'hello world'");
}

#[test]
fn subsumation_is_reflexive_for_structural_types() {
    let ctx = TypeContext::with_globals();
    let types = vec![
        Type::number_literal(12.0),
        Type::string_literal("hi"),
        Type::boolean_literal(true),
        Type::Nil,
        Type::Unknown,
        Type::Union(vec![Type::number_literal(1.0), Type::string_literal("a")]),
        Type::Array(ArrayShape::Tuple(vec![ArrayElement::Item(Type::number_literal(1.0))])),
    ];
    for ty in types {
        assert!(subsumation_issues(&ctx, &ty, &ty).is_empty(), "{ty:?} should subsume itself");
    }
}

#[test]
fn union_lattice_accepts_either_member() {
    let ctx = TypeContext::with_globals();
    let a = Type::number_literal(1.0);
    let b = Type::string_literal("x");
    let union = Type::Union(vec![a.clone(), b.clone()]);
    assert!(subsumation_issues(&ctx, &union, &a).is_empty());
    assert!(subsumation_issues(&ctx, &union, &b).is_empty());
}

#[test]
fn poisoned_absorbs_on_either_side() {
    let ctx = TypeContext::with_globals();
    let number = Type::number_literal(1.0);
    assert!(subsumation_issues(&ctx, &Type::Poisoned, &number).is_empty());
    assert!(subsumation_issues(&ctx, &number, &Type::Poisoned).is_empty());
}

#[test]
fn simplification_short_circuits_a_literally_true_if_else() {
    let ast = test_utils::parse_ok("const _x = if true { 12 } else { 'foo' };");
    let decls = test_utils::declarations(&ast);
    let glint_core::ast::NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!() };
    let ctx = TypeContext::with_globals();
    let inferred = glint_core::types::infer::infer_type(&ctx, &ast, *value);
    let simplified = glint_core::types::simplify::simplify_type(&ctx, &inferred);
    assert_eq!(display_type(&simplified), "12");
}
