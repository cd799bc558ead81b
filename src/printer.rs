//! `displayType(ty) -> String` (component I): canonical textual form used
//! in diagnostics.
//!
//! Modeled on `Display for VariableType` (`src/typechecker/
//! variabletype.rs`), generalised from that file's small closed set of
//! primitive variants to the full structural/computed `Type` language here.
//! Literal display must round-trip with the surface syntax: strings `'x'`,
//! numbers decimal, booleans `true`/`false`, nil `nil`.

use super::types::{ArrayElement, ArrayShape, NumberValue, ObjectEntry, Type};

pub fn display_type(ty: &Type) -> String {
    match ty {
        Type::Function { params, return_type } => {
            let params = params
                .iter()
                .map(|p| match &p.name {
                    Some(name) => format!("{name}: {}", display_type(&p.ty)),
                    None => display_type(&p.ty),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("({params}) => {}", display_type(return_type))
        }
        Type::Union(variants) => variants.iter().map(display_type).collect::<Vec<_>>().join(" | "),
        Type::Object { entries } => {
            let entries = entries
                .iter()
                .map(|e| match e {
                    ObjectEntry::Entry { key, value } => format!("{}: {}", display_key(key), display_type(value)),
                    ObjectEntry::Spread(inner) => format!("...{}", display_type(inner)),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{entries}}}")
        }
        Type::Array(ArrayShape::Tuple(items)) => {
            let items = items
                .iter()
                .map(|e| match e {
                    ArrayElement::Item(t) => display_type(t),
                    ArrayElement::Spread(t) => format!("...{}", display_type(t)),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{items}]")
        }
        Type::Array(ArrayShape::List(elem)) => format!("{}[]", display_type(elem)),
        Type::String { value: Some(v) } => format!("'{v}'"),
        Type::String { value: None } => "string".to_string(),
        Type::Number { value: Some(NumberValue::Scalar(v)) } => display_number(*v),
        Type::Number { value: Some(NumberValue::Range { start, end }) } => {
            format!("{}..{}", start.map(display_number).unwrap_or_default(), end.map(display_number).unwrap_or_default())
        }
        Type::Number { value: None } => "number".to_string(),
        Type::Boolean { value: Some(v) } => v.to_string(),
        Type::Boolean { value: None } => "boolean".to_string(),
        Type::Nil => "nil".to_string(),
        Type::Unknown => "unknown".to_string(),
        Type::Poisoned => "poisoned".to_string(),

        Type::InvocationType { subject, args } => {
            format!("{}({})", display_type(subject), args.iter().map(display_type).collect::<Vec<_>>().join(", "))
        }
        Type::IfElseType { cases, default } => {
            let cases = cases.iter().map(|(c, b)| format!("if {} {{{}}}", display_type(c), display_type(b))).collect::<Vec<_>>().join(" else ");
            format!("{cases} else {{{}}}", display_type(default))
        }
        Type::SwitchType { subject, cases, default } => {
            let cases = cases.iter().map(|(p, b)| format!("case {}: {}", display_type(p), display_type(b))).collect::<Vec<_>>().join(", ");
            format!("switch {} {{{cases}, default: {}}}", display_type(subject), display_type(default))
        }
        Type::BinaryOperationType { left, op, right } => format!("{} {} {}", display_type(left), op.as_str(), display_type(right)),
        Type::PropertyType { subject, property } => format!("{}[{}]", display_type(subject), display_type(property)),
        Type::KeysType(inner) => format!("keysType<{}>", display_type(inner)),
        Type::ValuesType(inner) => format!("valuesType<{}>", display_type(inner)),
        Type::ParametersType(inner) => format!("parametersType<{}>", display_type(inner)),
        Type::ReturnType(inner) => format!("returnType<{}>", display_type(inner)),
        Type::NamedType(name) => name.clone(),
        Type::GenericAbstraction { params, inner } => {
            let params = params.iter().map(|p| p.name.clone()).collect::<Vec<_>>().join(", ");
            format!("<{params}>{}", display_type(inner))
        }
        Type::GenericApplication { inner, args } => {
            format!("{}<{}>", display_type(inner), args.iter().map(display_type).collect::<Vec<_>>().join(", "))
        }
        Type::LocalIdentifierType(name) => name.clone(),
        Type::ExcludeType { from, exclude } => format!("Exclude<{}, {}>", display_type(from), display_type(exclude)),
    }
}

fn display_key(key: &Type) -> String {
    match key {
        Type::String { value: Some(v) } => v.clone(),
        other => display_type(other),
    }
}

/// Integral-valued numbers print without a trailing `.0` so `displayType`
/// round-trips the literal's own textual form.
fn display_number(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_literal_round_trips_without_decimal_point() {
        assert_eq!(display_type(&Type::number_literal(12.0)), "12");
    }

    #[test]
    fn string_literal_round_trips_with_quotes() {
        assert_eq!(display_type(&Type::string_literal("hello world")), "'hello world'");
    }

    #[test]
    fn boolean_and_nil_round_trip() {
        assert_eq!(display_type(&Type::boolean_literal(true)), "true");
        assert_eq!(display_type(&Type::Nil), "nil");
    }

    #[test]
    fn union_joins_members_with_pipe() {
        let ty = Type::Union(vec![Type::number_literal(12.0), Type::string_literal("foo")]);
        assert_eq!(display_type(&ty), "12 | 'foo'");
    }
}
