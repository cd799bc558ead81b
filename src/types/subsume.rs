//! `subsumationIssues(ctx, {to, from}) -> Vec<String>`:
//! structural assignability. An empty list means `from` fits into `to`.
//!
//! Both sides are simplified once per call, then matched structurally
//! without further simplification.

use super::simplify::simplify_type;
use super::{ArrayElement, ArrayShape, NumberValue, ObjectEntry, Type, TypeContext};
use crate::printer::display_type;

pub fn subsumation_issues(ctx: &TypeContext, to: &Type, from: &Type) -> Vec<String> {
    let to = simplify_type(ctx, to);
    let from = simplify_type(ctx, from);
    issues_structural(ctx, &to, &from)
}

pub fn subsumes(ctx: &TypeContext, to: &Type, from: &Type) -> bool {
    subsumation_issues(ctx, to, from).is_empty()
}

fn issues_structural(ctx: &TypeContext, to: &Type, from: &Type) -> Vec<String> {
    if matches!(to, Type::Unknown | Type::Poisoned) || matches!(from, Type::Unknown | Type::Poisoned) {
        return Vec::new();
    }

    if let Type::Union(members) = to {
        let mut all_issues = Vec::new();
        for member in members {
            let issues = issues_structural(ctx, member, from);
            if issues.is_empty() {
                return Vec::new();
            }
            all_issues.extend(issues);
        }
        if all_issues.is_empty() {
            all_issues.push(format!("{to:?} does not subsume {from:?}: empty union"));
        }
        return all_issues;
    }

    if let Type::Union(members) = from {
        let mut all_issues = Vec::new();
        for member in members {
            all_issues.extend(issues_structural(ctx, to, member));
        }
        return all_issues;
    }

    match (to, from) {
        (Type::Function { params: to_params, return_type: to_ret }, Type::Function { params: from_params, return_type: from_ret }) => {
            let mut issues = Vec::new();
            // Contravariant parameters: the `from` function must accept
            // everything `to`'s callers will pass, so `from`'s declared
            // param type must subsume `to`'s (truncate-zip pairs); extra
            // `from` params are irrelevant, missing ones fail.
            if from_params.len() < to_params.len() {
                issues.push(format!(
                    "function expects at least {} parameter(s), found {}",
                    to_params.len(),
                    from_params.len()
                ));
            }
            for (to_p, from_p) in to_params.iter().zip(from_params.iter()) {
                issues.extend(issues_structural(ctx, &from_p.ty, &to_p.ty));
            }
            issues.extend(issues_structural(ctx, to_ret, from_ret));
            issues
        }

        (Type::Object { entries: to_entries }, Type::Object { .. }) => {
            let mut issues = Vec::new();
            for to_entry in to_entries {
                match to_entry {
                    ObjectEntry::Entry { key, value } => {
                        match matching_entry_value(ctx, from, key) {
                            Some(from_value) => issues.extend(issues_structural(ctx, value, &from_value)),
                            None => issues.push(format!("missing required key {key:?}")),
                        }
                    }
                    ObjectEntry::Spread(inner) => issues.extend(issues_structural(ctx, inner, from)),
                }
            }
            issues
        }

        (Type::Array(ArrayShape::Tuple(to_items)), Type::Array(ArrayShape::Tuple(from_items))) => {
            let mut issues = Vec::new();
            if from_items.len() < to_items.len() {
                issues.push(format!(
                    "Array type {} has fewer elements than destination array type {}",
                    display_type(from),
                    display_type(to)
                ));
            }
            for (to_item, from_item) in to_items.iter().zip(from_items.iter()) {
                issues.extend(issues_structural(ctx, element_type(to_item), element_type(from_item)));
            }
            issues
        }
        (Type::Array(ArrayShape::Tuple(to_items)), Type::Array(ArrayShape::List(from_elem))) => {
            let mut issues = Vec::new();
            for to_item in to_items {
                issues.extend(issues_structural(ctx, element_type(to_item), from_elem));
            }
            issues
        }
        (Type::Array(ArrayShape::List(to_elem)), Type::Array(ArrayShape::Tuple(from_items))) => {
            let mut issues = Vec::new();
            for from_item in from_items {
                issues.extend(issues_structural(ctx, to_elem, element_type(from_item)));
            }
            issues
        }
        (Type::Array(ArrayShape::List(to_elem)), Type::Array(ArrayShape::List(from_elem))) => {
            issues_structural(ctx, to_elem, from_elem)
        }

        (Type::Number { value: to_value }, Type::Number { value: from_value }) => number_issues(to_value, from_value),

        (Type::String { value: to_value }, Type::String { value: from_value }) => {
            literal_issues("string", to_value.as_ref(), from_value.as_ref())
        }
        (Type::Boolean { value: to_value }, Type::Boolean { value: from_value }) => {
            literal_issues("boolean", to_value.as_ref(), from_value.as_ref())
        }
        (Type::Nil, Type::Nil) => Vec::new(),

        _ => vec![format!("{to:?} does not subsume {from:?}")],
    }
}

fn element_type(e: &ArrayElement) -> &Type {
    match e {
        ArrayElement::Item(t) => t,
        ArrayElement::Spread(t) => t,
    }
}

/// Finds the value type for `key` in an object (or index-typed) `from`,
/// by subsumption against each entry's key -- "quantifying over all keys"
/// for index-typed objects.
fn matching_entry_value(ctx: &TypeContext, from: &Type, key: &Type) -> Option<Type> {
    let Type::Object { entries } = from else { return None };
    for entry in entries {
        match entry {
            ObjectEntry::Entry { key: from_key, value } => {
                if issues_structural(ctx, from_key, key).is_empty() || issues_structural(ctx, key, from_key).is_empty() {
                    return Some(value.clone());
                }
            }
            ObjectEntry::Spread(inner) => {
                if let Some(v) = matching_entry_value(ctx, inner, key) {
                    return Some(v);
                }
            }
        }
    }
    None
}

fn number_issues(to: &Option<NumberValue>, from: &Option<NumberValue>) -> Vec<String> {
    match (to, from) {
        (None, _) => Vec::new(),
        (Some(NumberValue::Range { start, end }), Some(NumberValue::Scalar(v))) => {
            if in_bound(*start, *end, *v) {
                Vec::new()
            } else {
                vec![format!("{v} is not within range [{start:?}, {end:?})")]
            }
        }
        (Some(NumberValue::Range { start: to_s, end: to_e }), Some(NumberValue::Range { start: from_s, end: from_e })) => {
            if range_contains(*to_s, *to_e, *from_s, *from_e) {
                Vec::new()
            } else {
                vec![format!("range [{from_s:?}, {from_e:?}) is not contained in [{to_s:?}, {to_e:?})")]
            }
        }
        (Some(NumberValue::Scalar(a)), Some(NumberValue::Scalar(b))) => {
            if a == b {
                Vec::new()
            } else {
                vec![format!("expected number literal {a}, found {b}")]
            }
        }
        (Some(_), None) => vec!["expected a specific number, found an unconstrained number".to_string()],
    }
}

fn in_bound(start: Option<f64>, end: Option<f64>, v: f64) -> bool {
    start.map_or(true, |s| v >= s) && end.map_or(true, |e| v < e)
}

fn range_contains(to_start: Option<f64>, to_end: Option<f64>, from_start: Option<f64>, from_end: Option<f64>) -> bool {
    let start_ok = match to_start {
        None => true,
        Some(ts) => from_start.map_or(false, |fs| fs >= ts),
    };
    let end_ok = match to_end {
        None => true,
        Some(te) => from_end.map_or(false, |fe| fe <= te),
    };
    start_ok && end_ok
}

fn literal_issues<T: PartialEq + std::fmt::Debug>(kind: &str, to: Option<&T>, from: Option<&T>) -> Vec<String> {
    match to {
        None => Vec::new(),
        Some(expected) => match from {
            Some(actual) if actual == expected => Vec::new(),
            Some(actual) => vec![format!("expected {kind} literal {expected:?}, found {actual:?}")],
            None => vec![format!("expected {kind} literal {expected:?}, found an unconstrained {kind}")],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexivity_holds_for_literals() {
        let ctx = TypeContext::new();
        assert!(subsumation_issues(&ctx, &Type::number_literal(3.0), &Type::number_literal(3.0)).is_empty());
    }

    #[test]
    fn union_to_accepts_any_matching_member() {
        let ctx = TypeContext::new();
        let to = Type::Union(vec![Type::number_literal(1.0), Type::string_literal("a")]);
        assert!(subsumation_issues(&ctx, &to, &Type::string_literal("a")).is_empty());
        assert!(!subsumation_issues(&ctx, &to, &Type::string_literal("b")).is_empty());
    }

    #[test]
    fn poisoned_absorbs_on_either_side() {
        let ctx = TypeContext::new();
        assert!(subsumation_issues(&ctx, &Type::Poisoned, &Type::string_literal("x")).is_empty());
        assert!(subsumation_issues(&ctx, &Type::string_literal("x"), &Type::Poisoned).is_empty());
    }

    #[test]
    fn number_range_bounds_scalar() {
        let ctx = TypeContext::new();
        let range = Type::Number { value: Some(NumberValue::Range { start: Some(0.0), end: Some(10.0) }) };
        assert!(subsumation_issues(&ctx, &range, &Type::number_literal(5.0)).is_empty());
        assert!(!subsumation_issues(&ctx, &range, &Type::number_literal(12.0)).is_empty());
    }

    #[test]
    fn object_requires_each_key_present_and_compatible() {
        let ctx = TypeContext::new();
        let to = Type::Object {
            entries: vec![ObjectEntry::Entry { key: Type::string_literal("x"), value: Type::Number { value: None } }],
        };
        let from_ok = Type::Object {
            entries: vec![ObjectEntry::Entry { key: Type::string_literal("x"), value: Type::number_literal(1.0) }],
        };
        let from_missing = Type::Object { entries: vec![] };
        assert!(subsumation_issues(&ctx, &to, &from_ok).is_empty());
        assert!(!subsumation_issues(&ctx, &to, &from_missing).is_empty());
    }

    #[test]
    fn function_parameters_are_contravariant() {
        let ctx = TypeContext::new();
        let wide_param = Type::Union(vec![Type::number_literal(1.0), Type::string_literal("a")]);
        let to = Type::Function {
            params: vec![super::super::FunctionParam { name: None, ty: Type::number_literal(1.0) }],
            return_type: Box::new(Type::Nil),
        };
        let from = Type::Function {
            params: vec![super::super::FunctionParam { name: None, ty: wide_param }],
            return_type: Box::new(Type::Nil),
        };
        assert!(subsumation_issues(&ctx, &to, &from).is_empty());
    }
}
