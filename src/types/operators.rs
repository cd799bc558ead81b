//! The operator signature table:
//!
//! ```text
//! +      : (number,number->number) | (string,string->string)
//!          | (string,number->string) | (number,string->string)
//! - * /  : (number,number->number)
//! == !=  : subject to mutual intersection; literal-equal args fold to true
//! < > <= >= : number | nil -> boolean (range comparison may fold)
//! && ||  : boolean | nil -> boolean
//! ??     : Exclude<left, nil> | right
//! ```
//!
//! `apply` assumes both operands are already simplified to structural form;
//! its result may itself be non-structural (e.g. `??`'s `Union` of an
//! `ExcludeType`) and is simplified once further by the caller
//! ([`super::simplify::simplify_type`]).

use crate::ast::BinaryOp;

use super::{NumberValue, Type};

pub fn apply(op: BinaryOp, left: &Type, right: &Type) -> Type {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => numeric_arith(left, right, |a, b| a - b),
        BinaryOp::Mul => numeric_arith(left, right, |a, b| a * b),
        BinaryOp::Div => numeric_arith(left, right, |a, b| a / b),
        BinaryOp::Eq => equality(left, right, true),
        BinaryOp::Neq => equality(left, right, false),
        BinaryOp::Lt => comparison(left, right, |a, b| a < b),
        BinaryOp::Gt => comparison(left, right, |a, b| a > b),
        BinaryOp::Le => comparison(left, right, |a, b| a <= b),
        BinaryOp::Ge => comparison(left, right, |a, b| a >= b),
        BinaryOp::And => boolean_op(left, right, |a, b| a && b),
        BinaryOp::Or => boolean_op(left, right, |a, b| a || b),
        BinaryOp::Nullish => Type::Union(vec![
            Type::ExcludeType { from: Box::new(left.clone()), exclude: Box::new(Type::Nil) },
            right.clone(),
        ]),
    }
}

fn is_number_like(t: &Type) -> bool {
    matches!(t, Type::Number { .. })
}

fn is_string_like(t: &Type) -> bool {
    matches!(t, Type::String { .. })
}

fn add(left: &Type, right: &Type) -> Type {
    if let (Type::Number { value: Some(NumberValue::Scalar(a)) }, Type::Number { value: Some(NumberValue::Scalar(b)) }) =
        (left, right)
    {
        return Type::number_literal(a + b);
    }
    if let (Type::Number { value: Some(NumberValue::Range { start: s1, end: e1 }) }, Type::Number { value: Some(NumberValue::Range { start: s2, end: e2 }) }) =
        (left, right)
    {
        return Type::Number {
            value: Some(NumberValue::Range {
                start: combine_open(*s1, *s2, |a, b| a + b),
                end: combine_open(*e1, *e2, |a, b| a + b),
            }),
        };
    }
    if is_number_like(left) && is_number_like(right) {
        return Type::Number { value: None };
    }
    if let (Type::String { value: Some(a) }, Type::String { value: Some(b) }) = (left, right) {
        return Type::string_literal(format!("{a}{b}"));
    }
    let stringy = |t: &Type| is_string_like(t) || is_number_like(t);
    if (is_string_like(left) || is_string_like(right)) && stringy(left) && stringy(right) {
        return Type::String { value: None };
    }
    Type::Poisoned
}

fn numeric_arith(left: &Type, right: &Type, f: impl Fn(f64, f64) -> f64) -> Type {
    if let (Type::Number { value: Some(NumberValue::Scalar(a)) }, Type::Number { value: Some(NumberValue::Scalar(b)) }) =
        (left, right)
    {
        return Type::number_literal(f(*a, *b));
    }
    if let (Type::Number { value: Some(NumberValue::Range { start: s1, end: e1 }) }, Type::Number { value: Some(NumberValue::Range { start: s2, end: e2 }) }) =
        (left, right)
    {
        return Type::Number {
            value: Some(NumberValue::Range {
                start: combine_open(*s1, *s2, &f),
                end: combine_open(*e1, *e2, &f),
            }),
        };
    }
    if is_number_like(left) && is_number_like(right) {
        return Type::Number { value: None };
    }
    Type::Poisoned
}

fn combine_open(a: Option<f64>, b: Option<f64>, f: impl Fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        _ => None,
    }
}

fn equality(left: &Type, right: &Type, want_eq: bool) -> Type {
    if let (Some(a), Some(b)) = (literal_key(left), literal_key(right)) {
        return Type::boolean_literal((a == b) == want_eq);
    }
    Type::Boolean { value: None }
}

/// A comparable key for literal-equality folding, `None` for non-literal or
/// non-comparable types.
fn literal_key(t: &Type) -> Option<String> {
    match t {
        Type::String { value: Some(v) } => Some(format!("s:{v}")),
        Type::Number { value: Some(NumberValue::Scalar(v)) } => Some(format!("n:{v}")),
        Type::Boolean { value: Some(v) } => Some(format!("b:{v}")),
        Type::Nil => Some("nil".to_string()),
        _ => None,
    }
}

fn comparison(left: &Type, right: &Type, f: impl Fn(f64, f64) -> bool) -> Type {
    let numberish = |t: &Type| matches!(t, Type::Number { .. } | Type::Nil);
    if !numberish(left) || !numberish(right) {
        return Type::Poisoned;
    }
    match (left, right) {
        (Type::Number { value: Some(NumberValue::Scalar(a)) }, Type::Number { value: Some(NumberValue::Scalar(b)) }) => {
            Type::boolean_literal(f(*a, *b))
        }
        (Type::Number { value: Some(NumberValue::Range { start, end }) }, Type::Number { value: Some(NumberValue::Scalar(b)) }) => {
            fold_range_scalar_comparison(*start, *end, *b, &f, false)
        }
        (Type::Number { value: Some(NumberValue::Scalar(a)) }, Type::Number { value: Some(NumberValue::Range { start, end }) }) => {
            fold_range_scalar_comparison(*start, *end, *a, &f, true)
        }
        _ => Type::Boolean { value: None },
    }
}

/// Folds a `range OP scalar` (or, with `flip`, `scalar OP range`) comparison
/// to a literal boolean when every member of the range agrees -- "range
/// comparison may fold".
fn fold_range_scalar_comparison(
    start: Option<f64>,
    end: Option<f64>,
    scalar: f64,
    f: &impl Fn(f64, f64) -> bool,
    flip: bool,
) -> Type {
    let sample_low = start.unwrap_or(f64::NEG_INFINITY);
    let sample_high = end.map(|e| e - f64::EPSILON).unwrap_or(f64::INFINITY);
    let (lo_result, hi_result) = if flip {
        (f(scalar, sample_low), f(scalar, sample_high))
    } else {
        (f(sample_low, scalar), f(sample_high, scalar))
    };
    if lo_result == hi_result && start.is_some() && end.is_some() {
        Type::boolean_literal(lo_result)
    } else {
        Type::Boolean { value: None }
    }
}

fn boolean_op(left: &Type, right: &Type, f: impl Fn(bool, bool) -> bool) -> Type {
    let boolish = |t: &Type| matches!(t, Type::Boolean { .. } | Type::Nil);
    if !boolish(left) || !boolish(right) {
        return Type::Poisoned;
    }
    if let (Type::Boolean { value: Some(a) }, Type::Boolean { value: Some(b) }) = (left, right) {
        return Type::boolean_literal(f(*a, *b));
    }
    Type::Boolean { value: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_folds_numeric_literals() {
        assert_eq!(apply(BinaryOp::Add, &Type::number_literal(1.0), &Type::number_literal(2.0)), Type::number_literal(3.0));
    }

    #[test]
    fn add_concatenates_string_literals() {
        assert_eq!(
            apply(BinaryOp::Add, &Type::string_literal("a"), &Type::string_literal("b")),
            Type::string_literal("ab")
        );
    }

    #[test]
    fn add_of_boolean_and_number_is_poisoned() {
        assert_eq!(apply(BinaryOp::Add, &Type::boolean_literal(true), &Type::number_literal(1.0)), Type::Poisoned);
    }

    #[test]
    fn equality_folds_literal_equal_args() {
        assert_eq!(
            apply(BinaryOp::Eq, &Type::number_literal(1.0), &Type::number_literal(1.0)),
            Type::boolean_literal(true)
        );
        assert_eq!(
            apply(BinaryOp::Neq, &Type::number_literal(1.0), &Type::number_literal(1.0)),
            Type::boolean_literal(false)
        );
    }

    #[test]
    fn and_requires_boolean_operands() {
        assert_eq!(apply(BinaryOp::And, &Type::number_literal(1.0), &Type::boolean_literal(true)), Type::Poisoned);
    }
}
