//! Name -> declaration resolution (component F).
//!
//! Modeled on `typechecker::typescope::Variable { variable_type, is_mutable
//! }`'s shape for the binding's *kind* of information, but the traversal
//! itself is ancestor-chain walking over the arena's `parent` links rather
//! than a push/pop `Scope`/`TypeScope` stack built during a traversal (see
//! DESIGN.md, component F).

use crate::ast::{Ast, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueBinding {
    pub name: String,
    pub declared_at: NodeId,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeBinding {
    pub name: String,
    pub declared_at: NodeId,
}

/// All value bindings visible at `at`, walking outward and stopping at the
/// first shadowing declaration for each name.
pub fn visible_value_bindings(ast: &Ast, at: NodeId) -> Vec<ValueBinding> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    let origin_start = ast.node(at).span.start;

    for ancestor in ast.ancestors(at) {
        match &ast.node(ancestor).kind {
            NodeKind::Module { declarations, .. } => {
                for decl in declarations {
                    match &ast.node(*decl).kind {
                        NodeKind::VariableDeclaration { name_and_type, is_const, .. } => {
                            if let Some(name) = name_of(ast, *name_and_type) {
                                if seen.insert(name.clone()) {
                                    out.push(ValueBinding {
                                        name,
                                        declared_at: *decl,
                                        is_const: *is_const,
                                    });
                                }
                            }
                        }
                        NodeKind::ImportDeclaration { items, .. } => {
                            for item in items {
                                if let NodeKind::ImportItem { name, alias } = &ast.node(*item).kind {
                                    let visible_name = alias.clone().unwrap_or_else(|| name.clone());
                                    if seen.insert(visible_name.clone()) {
                                        out.push(ValueBinding {
                                            name: visible_name,
                                            declared_at: *item,
                                            is_const: true,
                                        });
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            NodeKind::FunctionExpr { params, body, .. } => {
                for param in params {
                    if let Some(name) = name_of(ast, *param) {
                        if seen.insert(name.clone()) {
                            out.push(ValueBinding {
                                name,
                                declared_at: *param,
                                is_const: false,
                            });
                        }
                    }
                }
                if let crate::ast::NodeBody::Block(stmts) = body {
                    let mut decls = Vec::new();
                    for stmt in stmts {
                        collect_var_decls_before(ast, *stmt, origin_start, &mut decls);
                    }
                    for (name, declared_at, is_const) in decls {
                        if seen.insert(name.clone()) {
                            out.push(ValueBinding { name, declared_at, is_const });
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Walk a statement subtree (never crossing into a nested `FunctionExpr`,
/// which owns its own scope) collecting variable-declaration-statements
/// whose span starts strictly before `before_offset`.
fn collect_var_decls_before(
    ast: &Ast,
    node: NodeId,
    before_offset: usize,
    out: &mut Vec<(String, NodeId, bool)>,
) {
    let n = ast.node(node);
    if n.span.start >= before_offset {
        return;
    }
    if let NodeKind::VariableDeclarationStatement { name_and_type, is_const, .. } = &n.kind {
        if let Some(name) = name_of(ast, *name_and_type) {
            out.push((name, node, *is_const));
        }
    }
    if matches!(n.kind, NodeKind::FunctionExpr { .. }) {
        return;
    }
    for child in n.kind.children() {
        collect_var_decls_before(ast, child, before_offset, out);
    }
}

fn name_of(ast: &Ast, name_and_type: NodeId) -> Option<String> {
    match &ast.node(name_and_type).kind {
        NodeKind::NameAndType { name, .. } => Some(name.clone()),
        NodeKind::PlainIdentifier { name } => Some(name.clone()),
        _ => None,
    }
}

pub fn resolve_value(ast: &Ast, at: NodeId, name: &str) -> Option<ValueBinding> {
    visible_value_bindings(ast, at).into_iter().find(|b| b.name == name)
}

/// Type bindings visible at `at`: module-level `type` declarations plus, for
/// each enclosing generic abstraction, the parameters it introduces.
pub fn visible_type_bindings(ast: &Ast, at: NodeId) -> Vec<TypeBinding> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for ancestor in ast.ancestors(at) {
        match &ast.node(ancestor).kind {
            NodeKind::Module { declarations, .. } => {
                for decl in declarations {
                    if let NodeKind::TypeDeclaration { name, .. } = &ast.node(*decl).kind {
                        if seen.insert(name.clone()) {
                            out.push(TypeBinding {
                                name: name.clone(),
                                declared_at: *decl,
                            });
                        }
                    }
                }
            }
            NodeKind::GenericAbstractionType { params, .. } => {
                for param in params {
                    if let NodeKind::GenericTypeParameter { name, .. } = &ast.node(*param).kind {
                        if seen.insert(name.clone()) {
                            out.push(TypeBinding {
                                name: name.clone(),
                                declared_at: *param,
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}

pub fn resolve_type(ast: &Ast, at: NodeId, name: &str) -> Option<TypeBinding> {
    visible_type_bindings(ast, at).into_iter().find(|b| b.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeBody, NodeKind};
    use crate::span::Span;

    /// `const x = 1` at module scope; resolving `x` from inside the value
    /// finds the declaration.
    #[test]
    fn resolves_module_level_const() {
        let mut ast = Ast::new("const x = 1");
        let one = ast.push(Span::new(10, 11), NodeKind::NumberLiteralExpr { value: 1.0 });
        let name_and_type = ast.push(Span::new(6, 7), NodeKind::NameAndType { name: "x".into(), type_expr: None });
        let decl = ast.push(
            Span::new(0, 11),
            NodeKind::VariableDeclaration {
                is_const: true,
                name_and_type,
                value: one,
                exported: false,
            },
        );
        let module = ast.push(
            Span::new(0, 11),
            NodeKind::Module { declarations: vec![decl], trailing_comments: vec![] },
        );
        ast.set_root(module);
        ast.run_parenting_pass();

        let binding = resolve_value(&ast, one, "x").unwrap();
        assert_eq!(binding.declared_at, decl);
        assert!(binding.is_const);
    }

    #[test]
    fn function_params_shadow_outer_bindings() {
        let mut ast = Ast::new("");
        let param = ast.push(Span::point(0), NodeKind::NameAndType { name: "x".into(), type_expr: None });
        let body_expr = ast.push(Span::point(0), NodeKind::IdentifierExpr { name: "x".into() });
        let func = ast.push(
            Span::point(0),
            NodeKind::FunctionExpr {
                params: vec![param],
                return_type: None,
                body: NodeBody::Expr(body_expr),
                is_pure: false,
                is_async: false,
            },
        );
        ast.set_root(func);
        ast.run_parenting_pass();

        let binding = resolve_value(&ast, body_expr, "x").unwrap();
        assert_eq!(binding.declared_at, param);
        assert!(!binding.is_const);
    }

    #[test]
    fn later_statement_declarations_are_not_visible_to_earlier_ones() {
        let mut ast = Ast::new("");
        let lit1 = ast.push(Span::new(0, 1), NodeKind::NumberLiteralExpr { value: 1.0 });
        let nt1 = ast.push(Span::point(0), NodeKind::NameAndType { name: "a".into(), type_expr: None });
        let decl1 = ast.push(
            Span::new(0, 2),
            NodeKind::VariableDeclarationStatement { is_const: true, name_and_type: nt1, value: lit1 },
        );
        let use_site = ast.push(Span::new(1, 3), NodeKind::IdentifierExpr { name: "b".into() });
        let lit2 = ast.push(Span::new(4, 5), NodeKind::NumberLiteralExpr { value: 2.0 });
        let nt2 = ast.push(Span::point(4), NodeKind::NameAndType { name: "b".into(), type_expr: None });
        let decl2 = ast.push(
            Span::new(4, 6),
            NodeKind::VariableDeclarationStatement { is_const: true, name_and_type: nt2, value: lit2 },
        );
        let func = ast.push(
            Span::new(0, 6),
            NodeKind::FunctionExpr {
                params: vec![],
                return_type: None,
                body: NodeBody::Block(vec![decl1, decl2]),
                is_pure: false,
                is_async: false,
            },
        );
        ast.set_root(func);
        ast.run_parenting_pass();

        // `use_site` sits between decl1 and decl2 positionally (span start 1);
        // only `a` (declared before it) should resolve.
        assert!(resolve_value(&ast, use_site, "a").is_some());
        assert!(resolve_value(&ast, use_site, "b").is_none());
    }
}
