//! Black-box parser tests.

use glint_core::ast::NodeKind;

#[test]
fn span_coverage_holds_for_a_small_module() {
    let ast = test_utils::parse_ok("const x: number = 1 + 2 * 3;");
    let root = ast.root().expect("parsed module has a root");
    ast.check_span_invariants(root).expect("span invariants hold");
}

#[test]
fn parenting_pass_is_idempotent_on_a_parsed_module() {
    let mut ast = test_utils::parse_ok("const x: number = 12;");
    let before: Vec<_> = {
        let mut ids = Vec::new();
        ast.walk(ast.root().unwrap(), &mut |id| ids.push((id, ast.node(id).parent)));
        ids
    };
    ast.run_parenting_pass();
    let mut after = Vec::new();
    ast.walk(ast.root().unwrap(), &mut |id| after.push((id, ast.node(id).parent)));
    assert_eq!(before, after, "re-running the parenting pass on an already-parsed module must be a no-op");
}

/// S5: `[true,\n// foo\n 12, nil]` -- three elements, the numeric literal
/// carries a preceding line comment whose content is `foo`.
#[test]
fn array_literal_element_carries_preceding_comment() {
    let ast = test_utils::parse_ok("const xs = [true,\n// foo\n 12, nil];");
    let decls = test_utils::declarations(&ast);
    assert_eq!(decls.len(), 1);
    let NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!("expected a variable declaration") };
    let NodeKind::ArrayLiteralExpr { elements } = &ast.node(*value).kind else { panic!("expected an array literal") };
    assert_eq!(elements.len(), 3);

    let twelve = elements[1];
    assert!(matches!(ast.node(twelve).kind, NodeKind::NumberLiteralExpr { value } if value == 12.0));
    let comments = &ast.node(twelve).preceding_comments;
    assert_eq!(comments.len(), 1);
    let NodeKind::Comment { text, .. } = &ast.node(comments[0]).kind else { panic!("expected a comment node") };
    assert_eq!(text.trim(), "foo");
}

#[test]
fn property_access_and_invocation_chain_folds_left_to_right() {
    let ast = test_utils::parse_ok("const r = foo.bar(1, 2);");
    let decls = test_utils::declarations(&ast);
    let NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!() };
    let NodeKind::InvocationExpr { subject, args, is_await, is_detach } = &ast.node(*value).kind else { panic!("expected an invocation") };
    assert_eq!(args.len(), 2);
    assert!(!is_await && !is_detach);
    assert!(matches!(ast.node(*subject).kind, NodeKind::PropertyAccessExpr { .. }));
}

#[test]
fn markup_tag_and_interpolated_child_parse() {
    let ast = test_utils::parse_ok("const view = <Greeting name={who}>Hello {who}</Greeting>;");
    let decls = test_utils::declarations(&ast);
    let NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!() };
    let NodeKind::MarkupExpr { tag, closing_tag, props, children } = &ast.node(*value).kind else { panic!("expected markup") };
    assert_eq!(tag, "Greeting");
    assert_eq!(tag, closing_tag);
    assert_eq!(props.len(), 1);
    assert_eq!(children.len(), 2);
}

#[test]
fn a_malformed_array_literal_degrades_to_a_broken_subtree_not_a_parse_failure() {
    let ast = test_utils::parse_ok("const xs = [1, , 3];");
    let decls = test_utils::declarations(&ast);
    let NodeKind::VariableDeclaration { value, .. } = &ast.node(decls[0]).kind else { panic!() };
    assert!(matches!(ast.node(*value).kind, NodeKind::BrokenSubtree { .. } | NodeKind::ArrayLiteralExpr { .. }));
}
