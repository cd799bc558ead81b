//! `inferType(ctx, expr) -> Type`, exhaustive over every
//! expression kind.

use crate::ast::{Ast, NodeBody, NodeId, NodeKind};

use super::{ArrayElement, ArrayShape, FunctionParam, GenericParam, ObjectEntry, Type, TypeContext};

/// Best-effort type of a value expression. Equivalent to calling
/// [`infer_type_expected`] with no contextual expected type.
pub fn infer_type(ctx: &TypeContext, ast: &Ast, expr: NodeId) -> Type {
    infer_type_expected(ctx, ast, expr, None)
}

/// Like [`infer_type`], but threads an optional *expected* function type
/// through to a function-expression RHS so its parameters can borrow
/// annotations from the destination type. Checker call sites at a
/// variable declaration pass the declared type here; every other call site
/// passes `None`.
pub fn infer_type_expected(ctx: &TypeContext, ast: &Ast, expr: NodeId, expected: Option<&Type>) -> Type {
    match &ast.node(expr).kind {
        NodeKind::StringLiteralExpr { value } => Type::string_literal(value.clone()),
        NodeKind::NumberLiteralExpr { value } => Type::number_literal(*value),
        NodeKind::BooleanLiteralExpr { value } => Type::boolean_literal(*value),
        NodeKind::NilLiteralExpr => Type::Nil,

        NodeKind::IdentifierExpr { name } => Type::LocalIdentifierType(name.clone()),

        NodeKind::PropertyAccessExpr { subject, property } => Type::PropertyType {
            subject: Box::new(infer_type(ctx, ast, *subject)),
            property: Box::new(infer_type(ctx, ast, *property)),
        },

        NodeKind::ParenthesisExpr { inner } => infer_type_expected(ctx, ast, *inner, expected),

        NodeKind::AsExpr { target_type, .. } => super::resolve::resolve_type(ctx, ast, *target_type),

        NodeKind::ArrayLiteralExpr { elements } => {
            let items = elements
                .iter()
                .map(|id| match &ast.node(*id).kind {
                    NodeKind::Spread { expr } => ArrayElement::Spread(Box::new(infer_type(ctx, ast, *expr))),
                    _ => ArrayElement::Item(infer_type(ctx, ast, *id)),
                })
                .collect();
            Type::Array(ArrayShape::Tuple(items))
        }

        NodeKind::ObjectLiteralExpr { entries } => {
            let entries = entries
                .iter()
                .map(|id| infer_object_entry(ctx, ast, *id))
                .collect();
            Type::Object { entries }
        }

        NodeKind::FunctionExpr { params, return_type, body, .. } => {
            let expected_params = match expected {
                Some(Type::Function { params, .. }) => Some(params.clone()),
                _ => None,
            };
            let param_types = params
                .iter()
                .enumerate()
                .map(|(i, param)| FunctionParam {
                    name: name_of_param(ast, *param),
                    ty: infer_param_type(ctx, ast, *param, expected_params.as_ref(), i),
                })
                .collect();
            let body_type = match body {
                NodeBody::Expr(e) => infer_type(ctx, ast, *e),
                NodeBody::Block(_) => Type::Nil,
            };
            let return_type = match return_type {
                Some(rt) => super::resolve::resolve_type(ctx, ast, *rt),
                None => body_type,
            };
            Type::Function { params: param_types, return_type: Box::new(return_type) }
        }

        NodeKind::InvocationExpr { subject, args, .. } => Type::InvocationType {
            subject: Box::new(infer_type(ctx, ast, *subject)),
            args: args.iter().map(|a| infer_type(ctx, ast, *a)).collect(),
        },

        NodeKind::BinaryOperationExpr { left, op, right } => Type::BinaryOperationType {
            left: Box::new(infer_type(ctx, ast, *left)),
            op: *op,
            right: Box::new(infer_type(ctx, ast, *right)),
        },

        NodeKind::IfElseExpr { cases, default } => {
            let cases = cases
                .iter()
                .map(|c| (infer_type(ctx, ast, c.condition), infer_body(ctx, ast, &c.body)))
                .collect();
            let default = match default {
                Some(body) => infer_body(ctx, ast, body),
                None => Type::Nil,
            };
            Type::IfElseType { cases, default: Box::new(default) }
        }

        NodeKind::SwitchExpr { subject, cases } => {
            let subject_ty = infer_type(ctx, ast, *subject);
            let mut pairs = Vec::new();
            let mut default = Type::Nil;
            for case in cases {
                let branch = infer_body(ctx, ast, &case.body);
                match case.pattern {
                    Some(p) => pairs.push((infer_type(ctx, ast, p), branch)),
                    None => default = branch,
                }
            }
            Type::SwitchType { subject: Box::new(subject_ty), cases: pairs, default: Box::new(default) }
        }

        NodeKind::MarkupExpr { .. } => Type::Unknown,

        NodeKind::BrokenSubtree { .. } => Type::Poisoned,

        other => unreachable!("infer_type called on non-expression node {:?}", other.kind_name()),
    }
}

fn infer_body(ctx: &TypeContext, ast: &Ast, body: &NodeBody) -> Type {
    match body {
        NodeBody::Expr(e) => infer_type(ctx, ast, *e),
        NodeBody::Block(_) => Type::Nil,
    }
}

fn infer_param_type(
    ctx: &TypeContext,
    ast: &Ast,
    param: NodeId,
    expected_params: Option<&Vec<FunctionParam>>,
    index: usize,
) -> Type {
    if let NodeKind::NameAndType { type_expr: Some(t), .. } = &ast.node(param).kind {
        return super::resolve::resolve_type(ctx, ast, *t);
    }
    if let Some(expected) = expected_params {
        if let Some(p) = expected.get(index) {
            return p.ty.clone();
        }
    }
    Type::Unknown
}

fn name_of_param(ast: &Ast, param: NodeId) -> Option<String> {
    match &ast.node(param).kind {
        NodeKind::NameAndType { name, .. } => Some(name.clone()),
        _ => None,
    }
}

fn infer_object_entry(ctx: &TypeContext, ast: &Ast, entry: NodeId) -> ObjectEntry {
    match &ast.node(entry).kind {
        NodeKind::Spread { expr } => ObjectEntry::Spread(Box::new(infer_type(ctx, ast, *expr))),
        NodeKind::KeyValue { key, value } => ObjectEntry::Entry {
            key: infer_key(ast, *key),
            value: infer_type(ctx, ast, *value),
        },
        _ => ObjectEntry::Entry { key: Type::Unknown, value: Type::Poisoned },
    }
}

/// A key's type: bare identifiers and literal keys collapse to the
/// corresponding string literal type (so property lookup can match them by
/// subsumption); any other expression is inferred as-is, becoming an
/// index-signature-shaped entry.
fn infer_key(ast: &Ast, key: NodeId) -> Type {
    match &ast.node(key).kind {
        NodeKind::IdentifierExpr { name } => Type::string_literal(name.clone()),
        NodeKind::PlainIdentifier { name } => Type::string_literal(name.clone()),
        NodeKind::StringLiteralExpr { value } => Type::string_literal(value.clone()),
        NodeKind::NumberLiteralExpr { value } => Type::string_literal(format!("{value}")),
        _ => Type::String { value: None },
    }
}

/// Generic abstraction/application params, used by resolve/simplify for
/// type-level (not value-level) function type parameters. Kept here since
/// it shares `infer_key`'s "literal collapses to string" helper role for
/// nothing else -- a thin re-export point for the generic-param shape.
pub(super) fn generic_params_of(ast: &Ast, ctx: &TypeContext, params: &[NodeId]) -> Vec<GenericParam> {
    params
        .iter()
        .map(|p| match &ast.node(*p).kind {
            NodeKind::GenericTypeParameter { name, extends } => GenericParam {
                name: name.clone(),
                extends: extends.map(|e| Box::new(super::resolve::resolve_type(ctx, ast, e))),
            },
            _ => GenericParam { name: String::new(), extends: None },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn literal_expressions_infer_singleton_types() {
        let mut ast = Ast::new("12");
        let lit = ast.push(Span::new(0, 2), NodeKind::NumberLiteralExpr { value: 12.0 });
        let ctx = TypeContext::new();
        assert_eq!(infer_type(&ctx, &ast, lit), Type::number_literal(12.0));
    }

    #[test]
    fn identifier_infers_local_identifier_type() {
        let mut ast = Ast::new("x");
        let id = ast.push(Span::new(0, 1), NodeKind::IdentifierExpr { name: "x".into() });
        let ctx = TypeContext::new();
        assert_eq!(infer_type(&ctx, &ast, id), Type::LocalIdentifierType("x".into()));
    }

    #[test]
    fn array_literal_infers_tuple_with_items() {
        let mut ast = Ast::new("[1, 2]");
        let a = ast.push(Span::new(1, 2), NodeKind::NumberLiteralExpr { value: 1.0 });
        let b = ast.push(Span::new(4, 5), NodeKind::NumberLiteralExpr { value: 2.0 });
        let arr = ast.push(Span::new(0, 6), NodeKind::ArrayLiteralExpr { elements: vec![a, b] });
        let ctx = TypeContext::new();
        let ty = infer_type(&ctx, &ast, arr);
        assert_eq!(
            ty,
            Type::Array(ArrayShape::Tuple(vec![
                ArrayElement::Item(Type::number_literal(1.0)),
                ArrayElement::Item(Type::number_literal(2.0)),
            ]))
        );
    }
}
