//! `resolveType(ctx, tyExpr) -> Type`: elaborate a syntactic
//! type expression into an (unsimplified) engine-side `Type`.

use crate::ast::{Ast, NodeId, NodeKind, PrimitiveKind};

use super::{FunctionParam, NumberValue, ObjectEntry, Type, TypeContext};

pub fn resolve_type(ctx: &TypeContext, ast: &Ast, ty_expr: NodeId) -> Type {
    match &ast.node(ty_expr).kind {
        NodeKind::TypeofType { expr } => super::infer::infer_type(ctx, ast, *expr),

        NodeKind::FunctionType { params, return_type } => Type::Function {
            params: params
                .iter()
                .map(|p| FunctionParam { name: param_name(ast, *p), ty: resolve_name_and_type(ctx, ast, *p) })
                .collect(),
            return_type: Box::new(match return_type {
                Some(rt) => resolve_type(ctx, ast, *rt),
                None => Type::Nil,
            }),
        },

        NodeKind::UnionType { variants } => {
            Type::Union(variants.iter().map(|v| resolve_type(ctx, ast, *v)).collect())
        }

        NodeKind::GenericAbstractionType { params, inner } => Type::GenericAbstraction {
            params: super::infer::generic_params_of(ast, ctx, params),
            inner: Box::new(resolve_type(ctx, ast, *inner)),
        },

        NodeKind::GenericApplicationType { inner, args } => Type::GenericApplication {
            inner: Box::new(resolve_type(ctx, ast, *inner)),
            args: args.iter().map(|a| resolve_type(ctx, ast, *a)).collect(),
        },

        NodeKind::ObjectType { entries, index_signature } => {
            let mut out: Vec<ObjectEntry> = entries.iter().map(|e| resolve_object_entry(ctx, ast, *e)).collect();
            if let Some((key, value)) = index_signature {
                out.push(ObjectEntry::Entry {
                    key: resolve_type(ctx, ast, *key),
                    value: resolve_type(ctx, ast, *value),
                });
            }
            Type::Object { entries: out }
        }

        NodeKind::ArrayLiteralType { elements } => {
            let items = elements
                .iter()
                .map(|id| match &ast.node(*id).kind {
                    NodeKind::Spread { expr } => {
                        super::ArrayElement::Spread(Box::new(resolve_type(ctx, ast, *expr)))
                    }
                    _ => super::ArrayElement::Item(resolve_type(ctx, ast, *id)),
                })
                .collect();
            Type::Array(super::ArrayShape::Tuple(items))
        }

        // The optional length is a refinement this core does not further
        // check; the element type is what subsumption acts on.
        NodeKind::ArrayOfType { element, .. } => {
            Type::Array(super::ArrayShape::List(Box::new(resolve_type(ctx, ast, *element))))
        }

        NodeKind::PrimitiveType { primitive } => match primitive {
            PrimitiveKind::String => Type::String { value: None },
            PrimitiveKind::Number => Type::Number { value: None },
            PrimitiveKind::Boolean => Type::Boolean { value: None },
            PrimitiveKind::Unknown => Type::Unknown,
        },

        NodeKind::RangeType { start, end } => Type::Number {
            value: Some(NumberValue::Range {
                start: start.map(|s| literal_number(ast, s)),
                end: end.map(|e| literal_number(ast, e)),
            }),
        },

        NodeKind::StringLiteralType { value } => Type::string_literal(value.clone()),
        NodeKind::NumberLiteralType { value } => Type::number_literal(*value),
        NodeKind::BooleanLiteralType { value } => Type::boolean_literal(*value),
        NodeKind::NilLiteralType => Type::Nil,

        NodeKind::NamedType { name } => Type::NamedType(name.clone()),

        NodeKind::BrokenSubtree { .. } => Type::Poisoned,

        other => unreachable!("resolve_type called on non-type-expression node {:?}", other.kind_name()),
    }
}

fn resolve_name_and_type(ctx: &TypeContext, ast: &Ast, id: NodeId) -> Type {
    match &ast.node(id).kind {
        NodeKind::NameAndType { type_expr: Some(t), .. } => resolve_type(ctx, ast, *t),
        _ => Type::Unknown,
    }
}

fn param_name(ast: &Ast, id: NodeId) -> Option<String> {
    match &ast.node(id).kind {
        NodeKind::NameAndType { name, .. } => Some(name.clone()),
        _ => None,
    }
}

fn resolve_object_entry(ctx: &TypeContext, ast: &Ast, id: NodeId) -> ObjectEntry {
    match &ast.node(id).kind {
        NodeKind::Spread { expr } => ObjectEntry::Spread(Box::new(resolve_type(ctx, ast, *expr))),
        NodeKind::KeyValue { key, value } => ObjectEntry::Entry {
            key: key_type(ast, *key),
            value: resolve_type(ctx, ast, *value),
        },
        _ => ObjectEntry::Entry { key: Type::Unknown, value: Type::Poisoned },
    }
}

fn key_type(ast: &Ast, key: NodeId) -> Type {
    match &ast.node(key).kind {
        NodeKind::PlainIdentifier { name } | NodeKind::IdentifierExpr { name } => Type::string_literal(name.clone()),
        NodeKind::StringLiteralType { value } | NodeKind::StringLiteralExpr { value } => {
            Type::string_literal(value.clone())
        }
        _ => Type::String { value: None },
    }
}

fn literal_number(ast: &Ast, id: NodeId) -> f64 {
    match &ast.node(id).kind {
        NodeKind::NumberLiteralType { value } | NodeKind::NumberLiteralExpr { value } => *value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn primitive_type_resolves_to_generic_variant() {
        let mut ast = Ast::new("number");
        let id = ast.push(Span::new(0, 6), NodeKind::PrimitiveType { primitive: PrimitiveKind::Number });
        let ctx = TypeContext::new();
        assert_eq!(resolve_type(&ctx, &ast, id), Type::Number { value: None });
    }

    #[test]
    fn named_type_stays_unresolved_until_simplified() {
        let mut ast = Ast::new("Pair");
        let id = ast.push(Span::new(0, 4), NodeKind::NamedType { name: "Pair".into() });
        let ctx = TypeContext::new();
        assert_eq!(resolve_type(&ctx, &ast, id), Type::NamedType("Pair".into()));
    }

    #[test]
    fn range_type_resolves_to_numeric_range() {
        let mut ast = Ast::new("1..3");
        let start = ast.push(Span::new(0, 1), NodeKind::NumberLiteralType { value: 1.0 });
        let end = ast.push(Span::new(3, 4), NodeKind::NumberLiteralType { value: 3.0 });
        let id = ast.push(Span::new(0, 4), NodeKind::RangeType { start: Some(start), end: Some(end) });
        let ctx = TypeContext::new();
        assert_eq!(
            resolve_type(&ctx, &ast, id),
            Type::Number { value: Some(NumberValue::Range { start: Some(1.0), end: Some(3.0) }) }
        );
    }
}
