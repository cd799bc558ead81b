//! `simplifyType(ctx, ty) -> Type`: drives computed/named/identifier types
//! toward structural form.
//!
//! Bounded by [`super::SIMPLIFY_DEPTH_BOUND`]; exhausting it is the one
//! place this crate panics on otherwise-valid-looking input -- legitimate
//! programs never reach it, so hitting the bound is a defect in the engine,
//! not a user error.

use log::trace;

use super::operators;
use super::{ArrayElement, ArrayShape, FunctionParam, NumberValue, ObjectEntry, Type, TypeContext};

pub fn simplify_type(ctx: &TypeContext, ty: &Type) -> Type {
    simplify_depth(ctx, ty, 0)
}

fn simplify_depth(ctx: &TypeContext, ty: &Type, depth: usize) -> Type {
    if depth >= super::SIMPLIFY_DEPTH_BOUND {
        panic!("simplification budget exhausted while reducing {ty:?}; this indicates a malformed computed-type cycle, not a user error");
    }
    trace!("simplify depth={depth} ty={ty:?}");
    crate::metrics::Metrics::record_simplify_call();

    match ty {
        Type::Function { params, return_type } => Type::Function {
            params: params
                .iter()
                .map(|p| FunctionParam { name: p.name.clone(), ty: simplify_depth(ctx, &p.ty, depth + 1) })
                .collect(),
            return_type: Box::new(simplify_depth(ctx, return_type, depth + 1)),
        },
        Type::Union(variants) => Type::Union(variants.iter().map(|v| simplify_depth(ctx, v, depth + 1)).collect()),
        Type::Object { entries } => Type::Object {
            entries: entries
                .iter()
                .map(|e| match e {
                    ObjectEntry::Entry { key, value } => ObjectEntry::Entry {
                        key: simplify_depth(ctx, key, depth + 1),
                        value: simplify_depth(ctx, value, depth + 1),
                    },
                    ObjectEntry::Spread(inner) => ObjectEntry::Spread(Box::new(simplify_depth(ctx, inner, depth + 1))),
                })
                .collect(),
        },
        Type::Array(ArrayShape::Tuple(items)) => Type::Array(ArrayShape::Tuple(
            items
                .iter()
                .map(|e| match e {
                    ArrayElement::Item(t) => ArrayElement::Item(simplify_depth(ctx, t, depth + 1)),
                    ArrayElement::Spread(t) => ArrayElement::Spread(Box::new(simplify_depth(ctx, t, depth + 1))),
                })
                .collect(),
        )),
        Type::Array(ArrayShape::List(elem)) => Type::Array(ArrayShape::List(Box::new(simplify_depth(ctx, elem, depth + 1)))),
        Type::String { .. } | Type::Number { .. } | Type::Boolean { .. } | Type::Nil | Type::Unknown | Type::Poisoned => {
            ty.clone()
        }

        Type::InvocationType { subject, args } => {
            let subject = simplify_depth(ctx, subject, depth + 1);
            let args: Vec<Type> = args.iter().map(|a| simplify_depth(ctx, a, depth + 1)).collect();
            match subject {
                Type::Function { params, return_type } => {
                    let mut next_ctx = ctx.clone();
                    if !ctx.preserve_values {
                        for (param, arg) in params.iter().zip(args.iter()) {
                            if let Some(name) = &param.name {
                                next_ctx.value_scope.insert(name.clone(), arg.clone());
                            }
                        }
                    }
                    simplify_depth(&next_ctx, &return_type, depth + 1)
                }
                _ => Type::Poisoned,
            }
        }

        Type::PropertyType { subject, property } => {
            let subject = simplify_depth(ctx, subject, depth + 1);
            let property = simplify_depth(ctx, property, depth + 1);
            simplify_property(ctx, &subject, &property, depth)
        }

        Type::KeysType(inner) => keys_of(&simplify_depth(ctx, inner, depth + 1)),
        Type::ValuesType(inner) => values_of(&simplify_depth(ctx, inner, depth + 1)),

        Type::ParametersType(inner) => match simplify_depth(ctx, inner, depth + 1) {
            Type::Function { params, .. } => {
                Type::Array(ArrayShape::Tuple(params.into_iter().map(|p| ArrayElement::Item(p.ty)).collect()))
            }
            Type::Poisoned => Type::Poisoned,
            _ => Type::Poisoned,
        },

        Type::ReturnType(inner) => match simplify_depth(ctx, inner, depth + 1) {
            Type::Function { return_type, .. } => *return_type,
            _ => Type::Poisoned,
        },

        Type::IfElseType { cases, default } => simplify_if_else(ctx, cases, default, depth),

        Type::SwitchType { subject, cases, default } => simplify_switch(ctx, subject, cases, default, depth),

        Type::BinaryOperationType { left, op, right } => {
            let left = simplify_depth(ctx, left, depth + 1);
            let right = simplify_depth(ctx, right, depth + 1);
            let raw = operators::apply(*op, &left, &right);
            if raw.is_poisoned() {
                raw
            } else {
                simplify_depth(ctx, &raw, depth + 1)
            }
        }

        Type::NamedType(name) => match ctx.type_scope.get(name) {
            Some(found) => simplify_depth(ctx, &found.clone(), depth + 1),
            None => ty.clone(),
        },

        Type::LocalIdentifierType(name) => match ctx.value_scope.get(name) {
            Some(found) => simplify_depth(ctx, &found.clone(), depth + 1),
            None => ty.clone(),
        },

        Type::GenericAbstraction { params, inner } => {
            if ctx.preserve_generics {
                ty.clone()
            } else {
                Type::GenericAbstraction { params: params.clone(), inner: Box::new(simplify_depth(ctx, inner, depth + 1)) }
            }
        }

        Type::GenericApplication { inner, args } => {
            let simplified_inner = simplify_depth(ctx, inner, depth + 1);
            let simplified_args: Vec<Type> = args.iter().map(|a| simplify_depth(ctx, a, depth + 1)).collect();
            match simplified_inner {
                Type::GenericAbstraction { params, inner: abs_inner } => {
                    // Open Question 1: wrong-arity application truncate-zips
                    // rather than erroring (the checker additionally emits a
                    // TODO diagnostic when arities differ).
                    let mut next_ctx = ctx.clone();
                    for (param, arg) in params.iter().zip(simplified_args.iter()) {
                        next_ctx.type_scope.insert(param.name.clone(), arg.clone());
                    }
                    simplify_depth(&next_ctx, &abs_inner, depth + 1)
                }
                other if ctx.preserve_generics => {
                    Type::GenericApplication { inner: Box::new(other), args: simplified_args }
                }
                other => other,
            }
        }

        Type::ExcludeType { from, exclude } => {
            let from = simplify_depth(ctx, from, depth + 1);
            let exclude = simplify_depth(ctx, exclude, depth + 1);
            exclude_from(from, &exclude)
        }
    }
}

/// `if (cond1) b1 else if (cond2) b2 ... else default`: short-circuits to a
/// case's branch the moment its condition simplifies to the literal `true`;
/// otherwise every branch plus the default plus `nil` are unioned together.
fn simplify_if_else(ctx: &TypeContext, cases: &[(Type, Type)], default: &Type, depth: usize) -> Type {
    for (cond, body) in cases {
        if simplify_depth(ctx, cond, depth + 1) == Type::boolean_literal(true) {
            return simplify_depth(ctx, body, depth + 1);
        }
    }
    let mut variants: Vec<Type> = cases.iter().map(|(_, body)| simplify_depth(ctx, body, depth + 1)).collect();
    variants.push(simplify_depth(ctx, default, depth + 1));
    variants.push(Type::Nil);
    Type::Union(variants)
}

/// Same shape as if-else but keyed by pattern equality against `subject`
/// rather than a boolean condition: short-circuits only when both the
/// subject and a case's pattern are literal and equal.
fn simplify_switch(ctx: &TypeContext, subject: &Type, cases: &[(Type, Type)], default: &Type, depth: usize) -> Type {
    let subject = simplify_depth(ctx, subject, depth + 1);
    for (pattern, body) in cases {
        let pattern = simplify_depth(ctx, pattern, depth + 1);
        if operators::apply(crate::ast::BinaryOp::Eq, &subject, &pattern) == Type::boolean_literal(true) {
            return simplify_depth(ctx, body, depth + 1);
        }
    }
    let mut variants: Vec<Type> = cases.iter().map(|(_, body)| simplify_depth(ctx, body, depth + 1)).collect();
    variants.push(simplify_depth(ctx, default, depth + 1));
    variants.push(Type::Nil);
    Type::Union(variants)
}

fn simplify_property(ctx: &TypeContext, subject: &Type, property: &Type, depth: usize) -> Type {
    match subject {
        Type::Object { entries } => {
            for entry in entries {
                match entry {
                    ObjectEntry::Entry { key, value } => {
                        if super::subsume::subsumation_issues(ctx, key, property).is_empty() {
                            return simplify_depth(ctx, value, depth + 1);
                        }
                    }
                    // Open Question 2: spreads in projection are poisoned
                    // with a TODO rather than chased through.
                    ObjectEntry::Spread(_) => return Type::Poisoned,
                }
            }
            Type::Poisoned
        }
        Type::Array(ArrayShape::Tuple(items)) => property_of_tuple(ctx, items, property, depth),
        Type::Array(ArrayShape::List(elem)) => Type::Union(vec![(**elem).clone(), Type::Nil]),
        Type::String { value } => property_of_string(value.as_deref(), property),
        Type::Poisoned | Type::Unknown => Type::Poisoned,
        _ => Type::Poisoned,
    }
}

fn property_of_tuple(ctx: &TypeContext, items: &[ArrayElement], property: &Type, depth: usize) -> Type {
    match property {
        Type::Number { value: Some(NumberValue::Scalar(idx)) } => {
            match items.get(*idx as usize) {
                Some(ArrayElement::Item(t)) => simplify_depth(ctx, t, depth + 1),
                Some(ArrayElement::Spread(_)) => Type::Poisoned,
                None => Type::Poisoned,
            }
        }
        Type::Number { value: Some(NumberValue::Range { start, end }) } => {
            let lo = start.unwrap_or(0.0) as usize;
            let hi = end.map(|e| e as usize).unwrap_or(items.len());
            let variants: Vec<Type> = items[lo.min(items.len())..hi.min(items.len())]
                .iter()
                .map(|e| match e {
                    ArrayElement::Item(t) => t.clone(),
                    ArrayElement::Spread(t) => (**t).clone(),
                })
                .collect();
            Type::Union(variants)
        }
        Type::Number { value: None } => {
            let mut variants: Vec<Type> = items
                .iter()
                .map(|e| match e {
                    ArrayElement::Item(t) => t.clone(),
                    ArrayElement::Spread(t) => (**t).clone(),
                })
                .collect();
            variants.push(Type::Nil);
            Type::Union(variants)
        }
        _ => Type::Poisoned,
    }
}

fn property_of_string(value: Option<&str>, property: &Type) -> Type {
    let is_length = matches!(property, Type::String { value: Some(p) } if p == "length");
    if !is_length {
        return Type::Poisoned;
    }
    match value {
        Some(s) => Type::number_literal(s.chars().count() as f64),
        None => Type::Number { value: None },
    }
}

/// `keysType`: union of keys for records, `[0,len) | 'length'` for arrays,
/// character-index set + `'length'` for strings.
fn keys_of(ty: &Type) -> Type {
    match ty {
        Type::Object { entries } => {
            let mut variants = Vec::new();
            for e in entries {
                match e {
                    ObjectEntry::Entry { key, .. } => variants.push(key.clone()),
                    ObjectEntry::Spread(inner) => variants.push(keys_of(inner)),
                }
            }
            Type::Union(variants)
        }
        Type::Array(ArrayShape::Tuple(items)) if items.iter().all(|e| matches!(e, ArrayElement::Item(_))) => {
            let mut variants: Vec<Type> = (0..items.len()).map(|i| Type::number_literal(i as f64)).collect();
            variants.push(Type::string_literal("length"));
            Type::Union(variants)
        }
        Type::Array(_) => Type::Union(vec![Type::Number { value: None }, Type::string_literal("length")]),
        Type::String { value: Some(s) } => {
            let mut variants: Vec<Type> = (0..s.chars().count()).map(|i| Type::number_literal(i as f64)).collect();
            variants.push(Type::string_literal("length"));
            Type::Union(variants)
        }
        Type::String { value: None } => Type::Union(vec![Type::Number { value: None }, Type::string_literal("length")]),
        Type::Poisoned | Type::Unknown => Type::Poisoned,
        _ => Type::Poisoned,
    }
}

/// `valuesType`: union of values for records (+ recursive spread), elements
/// plus the length value for arrays and strings.
fn values_of(ty: &Type) -> Type {
    match ty {
        Type::Object { entries } => {
            let mut variants = Vec::new();
            for e in entries {
                match e {
                    ObjectEntry::Entry { value, .. } => variants.push(value.clone()),
                    ObjectEntry::Spread(inner) => variants.push(values_of(inner)),
                }
            }
            Type::Union(variants)
        }
        Type::Array(ArrayShape::Tuple(items)) => {
            let mut variants: Vec<Type> = items
                .iter()
                .map(|e| match e {
                    ArrayElement::Item(t) => t.clone(),
                    ArrayElement::Spread(t) => (**t).clone(),
                })
                .collect();
            let all_items = items.iter().all(|e| matches!(e, ArrayElement::Item(_)));
            variants.push(if all_items {
                Type::number_literal(items.len() as f64)
            } else {
                Type::Number { value: None }
            });
            Type::Union(variants)
        }
        Type::Array(ArrayShape::List(elem)) => Type::Union(vec![(**elem).clone(), Type::Number { value: None }]),
        Type::String { value: Some(s) } => {
            let mut variants: Vec<Type> = s.chars().map(|c| Type::string_literal(c.to_string())).collect();
            variants.push(Type::number_literal(s.chars().count() as f64));
            Type::Union(variants)
        }
        Type::String { value: None } => Type::Union(vec![Type::String { value: None }, Type::Number { value: None }]),
        Type::Poisoned | Type::Unknown => Type::Poisoned,
        _ => Type::Poisoned,
    }
}

/// Set subtraction from a union (`Exclude<from, exclude>`, used by `??`).
fn exclude_from(from: Type, exclude: &Type) -> Type {
    match from {
        Type::Union(variants) => {
            let remaining: Vec<Type> = variants.into_iter().filter(|v| v != exclude).collect();
            match remaining.len() {
                0 => Type::Poisoned,
                1 => remaining.into_iter().next().unwrap(),
                _ => Type::Union(remaining),
            }
        }
        other if &other == exclude => Type::Poisoned,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_type_looks_up_type_scope() {
        let ctx = TypeContext::new().with_type("Pair", Type::number_literal(1.0));
        assert_eq!(simplify_type(&ctx, &Type::NamedType("Pair".into())), Type::number_literal(1.0));
    }

    #[test]
    fn named_type_stays_as_is_when_unresolved() {
        let ctx = TypeContext::new();
        assert_eq!(simplify_type(&ctx, &Type::NamedType("Missing".into())), Type::NamedType("Missing".into()));
    }

    #[test]
    fn if_else_short_circuits_on_true_condition() {
        let ctx = TypeContext::new();
        let ty = Type::IfElseType {
            cases: vec![(Type::boolean_literal(true), Type::number_literal(12.0))],
            default: Box::new(Type::string_literal("foo")),
        };
        assert_eq!(simplify_type(&ctx, &ty), Type::number_literal(12.0));
    }

    #[test]
    fn if_else_unions_branches_when_condition_not_definitely_true() {
        let ctx = TypeContext::new();
        let ty = Type::IfElseType {
            cases: vec![(Type::boolean_literal(false), Type::number_literal(12.0))],
            default: Box::new(Type::string_literal("foo")),
        };
        let simplified = simplify_type(&ctx, &ty);
        assert_eq!(
            simplified,
            Type::Union(vec![Type::number_literal(12.0), Type::string_literal("foo"), Type::Nil])
        );
    }

    #[test]
    fn invocation_binds_argument_to_parameter_name() {
        let ctx = TypeContext::new();
        let func = Type::Function {
            params: vec![FunctionParam { name: Some("x".into()), ty: Type::Number { value: None } }],
            return_type: Box::new(Type::LocalIdentifierType("x".into())),
        };
        let ty = Type::InvocationType { subject: Box::new(func), args: vec![Type::number_literal(5.0)] };
        assert_eq!(simplify_type(&ctx, &ty), Type::number_literal(5.0));
    }

    #[test]
    fn property_type_on_tuple_resolves_literal_index() {
        let ctx = TypeContext::new();
        let tuple = Type::Array(ArrayShape::Tuple(vec![
            ArrayElement::Item(Type::number_literal(1.0)),
            ArrayElement::Item(Type::number_literal(2.0)),
        ]));
        let ty = Type::PropertyType { subject: Box::new(tuple), property: Box::new(Type::number_literal(0.0)) };
        assert_eq!(simplify_type(&ctx, &ty), Type::number_literal(1.0));
    }

    #[test]
    #[should_panic(expected = "simplification budget exhausted")]
    fn simplification_panics_on_runaway_recursion() {
        let ctx = TypeContext::new().with_type("Loop", Type::NamedType("Loop".into()));
        simplify_type(&ctx, &Type::NamedType("Loop".into()));
    }
}
