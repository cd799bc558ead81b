//! Type-expression grammar: same layering
//! idea as the value-expression cascade, distinct dispatcher and [`RuleId`]
//! set. Every level but the generic-application suffix follows the same
//! shape: try to build *this* level's construct, and if it doesn't start
//! here, delegate whole to the next (tighter) level via `one_of`.

use crate::ast::{NodeId, NodeKind, PrimitiveKind};
use crate::combinators::*;
use crate::span::{ParseInput, ParseResult, Span};

use super::{identifier, keyword, name_and_type, spanned_node, string_literal_text, ws, AstBuilder};

pub(crate) fn type_expression<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    type_union(builder)
}

/// `(|)? T (| T)+`. A lone member (no extra `|`) is not a union at all --
/// `many_sep2` only matches two-or-more items, so in that case this level
/// contributes nothing and falls through to `next` unwrapped.
fn type_union<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = type_generic_application(builder);
    let own = spanned_node(builder, move |input| {
        map(
            tuple2(optional(ws(exact("|"))), many_sep2(ws(type_generic_application(builder)), ws(exact("|")))),
            |(_, variants)| NodeKind::UnionType { variants },
        )(input)
    });
    memo(RuleId::TypeUnion, builder.memo(), one_of(vec![own, next]))
}

/// `T<A, ...>`: an inner type (from the abstraction level down) optionally
/// suffixed by a bracketed argument list -- parsed *after* the inner type,
/// so this is sequential composition rather than `one_of` alternation.
fn type_generic_application<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = type_generic_abstraction(builder);
    memo(RuleId::TypeGenericApplication, builder.memo(), move |input: ParseInput<'a>| match next(input) {
        ParseResult::Success { input: after_inner, value: inner_id, .. } => {
            match tuple3(
                ws(exact("<")),
                ws(many_sep1(type_generic_abstraction(builder), ws(exact(",")))),
                ws(required(exact(">"), || "expected '>'".to_string())),
            )(after_inner)
            {
                ParseResult::Success { input: after, value: (_, args, _), .. } => {
                    let span = Span::new(input.index, after.index);
                    let id = builder.push(span, NodeKind::GenericApplicationType { inner: inner_id, args });
                    ParseResult::Success { input: after, span, value: id }
                }
                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                ParseResult::None => ParseResult::Success {
                    input: after_inner,
                    span: Span::new(input.index, after_inner.index),
                    value: inner_id,
                },
            }
        }
        other => other,
    })
}

fn generic_type_parameter<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple2(ws(identifier), optional(tuple2(ws(keyword("extends")), ws(type_function(builder))))),
            |(name, extends)| NodeKind::GenericTypeParameter { name, extends: extends.map(|(_, e)| e) },
        )(input)
    })
}

/// `<P, ...>T`: a generic-parameter list prefixing an inner type.
fn type_generic_abstraction<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = type_function(builder);
    let own = spanned_node(builder, move |input| {
        map(
            tuple3(
                ws(exact("<")),
                tuple2(
                    ws(many_sep1(generic_type_parameter(builder), ws(exact(",")))),
                    ws(required(exact(">"), || "expected '>'".to_string())),
                ),
                ws(required(type_function(builder), || "expected a type".to_string())),
            ),
            |(_, (params, _), inner)| NodeKind::GenericAbstractionType { params, inner },
        )(input)
    });
    memo(RuleId::TypeGenericAbstraction, builder.memo(), one_of(vec![own, next]))
}

/// `(params) (=> ReturnType)?`.
fn type_function<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = type_object(builder);
    let own = spanned_node(builder, move |input| {
        map(
            tuple3(
                ws(exact("(")),
                tuple2(
                    ws(many_sep0(name_and_type(builder), ws(exact(",")))),
                    ws(required(exact(")"), || "expected ')'".to_string())),
                ),
                optional(tuple2(ws(exact("=>")), ws(required(type_expression(builder), || "expected a return type".to_string())))),
            ),
            |(_, (params, _), return_type)| NodeKind::FunctionType { params, return_type: return_type.map(|(_, t)| t) },
        )(input)
    });
    memo(RuleId::TypeFunction, builder.memo(), one_of(vec![own, next]))
}

fn object_type_entry<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| match ws(identifier)(input) {
        ParseResult::Success { input: after_name, span: name_span, value: name } => {
            match tuple2(ws(exact(":")), ws(required(type_expression(builder), || "expected a type".to_string())))(after_name) {
                ParseResult::Success { input: after, value: (_, value), .. } => {
                    let key_id = builder.push(name_span, NodeKind::PlainIdentifier { name });
                    let span = Span::new(input.index, after.index);
                    let id = builder.push(span, NodeKind::KeyValue { key: key_id, value });
                    ParseResult::Success { input: after, span, value: id }
                }
                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                ParseResult::None => {
                    let id = builder.push(name_span, NodeKind::PlainIdentifier { name });
                    ParseResult::Success { input: after_name, span: name_span, value: id }
                }
            }
        }
        _ => ParseResult::None,
    })
}

fn type_object<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = type_array(builder);
    let own = spanned_node(builder, move |input| {
        let inner = tuple3(
            ws(exact("{")),
            ws(many_sep0(object_type_entry(builder), ws(exact(",")))),
            ws(required(exact("}"), || "expected '}'".to_string())),
        );
        backtrack(
            map(inner, |(_, entries, _)| NodeKind::ObjectType { entries, index_signature: None }),
            take_until("}"),
            |message, _| NodeKind::BrokenSubtree { message },
        )(input)
    });
    memo(RuleId::TypeObjectLiteral, builder.memo(), one_of(vec![own, next]))
}

fn array_type_element<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let spread = spanned_node(builder, move |input| {
        map(
            tuple2(ws(exact("...")), ws(required(type_expression(builder), || "expected a type".to_string()))),
            |(_, expr)| NodeKind::Spread { expr },
        )(input)
    });
    one_of(vec![spread, type_expression(builder)])
}

fn type_array<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = type_range(builder);
    let own = spanned_node(builder, move |input| {
        let inner = tuple3(
            ws(exact("[")),
            ws(many_sep0(array_type_element(builder), ws(exact(",")))),
            ws(required(exact("]"), || "expected ']'".to_string())),
        );
        backtrack(
            map(inner, |(_, elements, _)| NodeKind::ArrayLiteralType { elements }),
            take_until("]"),
            |message, _| NodeKind::BrokenSubtree { message },
        )(input)
    });
    memo(RuleId::TypeArrayLiteral, builder.memo(), one_of(vec![own, next]))
}

/// `start..end` with at least one endpoint present. Written
/// with manual control flow rather than combinator composition because the
/// number-literal sub-parser is consulted at two call sites (start and end)
/// within the same attempt.
fn type_range<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::TypeRange, builder.memo(), move |input: ParseInput<'a>| {
        let start_input = super::skip_ws(input);
        let start = match number_literal_type(builder)(start_input) {
            ParseResult::Success { input: after, value, .. } => Some((value, after)),
            _ => None,
        };
        let after_start = start.map(|(_, after)| after).unwrap_or(start_input);
        let dots_input = super::skip_ws(after_start);
        if dots_input.rest().starts_with("..") {
            let after_dots = dots_input.advance_bytes(2);
            let end_input = super::skip_ws(after_dots);
            let end = match number_literal_type(builder)(end_input) {
                ParseResult::Success { input: after, value, .. } => Some((value, after)),
                _ => None,
            };
            let start_id = start.map(|(v, _)| v);
            let end_id = end.map(|(v, _)| v);
            if start_id.is_some() || end_id.is_some() {
                let after = end.map(|(_, after)| after).unwrap_or(end_input);
                let span = Span::new(input.index, after.index);
                let id = builder.push(span, NodeKind::RangeType { start: start_id, end: end_id });
                return ParseResult::Success { input: after, span, value: id };
            }
        }
        type_atom(builder)(input)
    })
}

fn number_literal_type<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, number_literal_type_kind)
}

fn number_literal_type_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    map(take1::<'a>(|c| c.is_ascii_digit()), |digits: String| NodeKind::NumberLiteralType {
        value: digits.parse().unwrap_or(0.0),
    })(input)
}

fn type_atom<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::TypeAtom, builder.memo(), spanned_node(builder, move |input| atom_kind(builder)(input)))
}

fn atom_kind<'a>(builder: &'a AstBuilder<'a>) -> impl Fn(ParseInput<'a>) -> ParseResult<'a, NodeKind> + 'a {
    move |input: ParseInput<'a>| {
        one_of(vec![
            Box::new(string_literal_type_kind) as BoxParser<'a, NodeKind>,
            Box::new(number_literal_type_kind),
            Box::new(boolean_literal_type_kind),
            Box::new(nil_literal_type_kind),
            Box::new(primitive_type_kind),
            Box::new(move |input| typeof_type_kind(builder)(input)),
            Box::new(named_type_kind),
        ])(input)
    }
}

fn string_literal_type_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    map(string_literal_text, |value| NodeKind::StringLiteralType { value })(input)
}

fn boolean_literal_type_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    one_of(vec![
        map(keyword("true"), |_| NodeKind::BooleanLiteralType { value: true }),
        map(keyword("false"), |_| NodeKind::BooleanLiteralType { value: false }),
    ])(input)
}

fn nil_literal_type_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    map(keyword("nil"), |_| NodeKind::NilLiteralType)(input)
}

fn primitive_type_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    one_of(vec![
        map(keyword("string"), |_| NodeKind::PrimitiveType { primitive: PrimitiveKind::String }),
        map(keyword("number"), |_| NodeKind::PrimitiveType { primitive: PrimitiveKind::Number }),
        map(keyword("boolean"), |_| NodeKind::PrimitiveType { primitive: PrimitiveKind::Boolean }),
        map(keyword("unknown"), |_| NodeKind::PrimitiveType { primitive: PrimitiveKind::Unknown }),
    ])(input)
}

fn typeof_type_kind<'a>(builder: &'a AstBuilder<'a>) -> impl Fn(ParseInput<'a>) -> ParseResult<'a, NodeKind> + 'a {
    move |input: ParseInput<'a>| {
        map(
            tuple2(keyword("typeof"), ws(required(super::expression(builder), || "expected an expression".to_string()))),
            |(_, expr)| NodeKind::TypeofType { expr },
        )(input)
    }
}

fn named_type_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    map(identifier, |name| NodeKind::NamedType { name })(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::ParseInput;

    fn parse_type(src: &'static str) -> (NodeId, AstBuilder<'static>) {
        let builder = AstBuilder::new(src);
        let input = ParseInput::new(src);
        match type_expression(&builder)(input) {
            ParseResult::Success { value, .. } => (value, builder),
            _ => panic!("expected a type expression"),
        }
    }

    #[test]
    fn parses_primitive() {
        let (id, builder) = parse_type("number");
        assert!(matches!(builder.node_kind(id), NodeKind::PrimitiveType { primitive: PrimitiveKind::Number }));
    }

    #[test]
    fn parses_union_of_two() {
        let (id, builder) = parse_type("number | string");
        assert!(matches!(builder.node_kind(id), NodeKind::UnionType { variants } if variants.len() == 2));
    }

    #[test]
    fn lone_member_skips_union_wrapper() {
        let (id, builder) = parse_type("number");
        assert!(matches!(builder.node_kind(id), NodeKind::PrimitiveType { .. }));
    }

    #[test]
    fn parses_range_with_both_endpoints() {
        let (id, builder) = parse_type("0..10");
        assert!(matches!(builder.node_kind(id), NodeKind::RangeType { start: Some(_), end: Some(_) }));
    }

    #[test]
    fn parses_generic_abstraction_and_application() {
        let (id, builder) = parse_type("<T>T");
        assert!(matches!(builder.node_kind(id), NodeKind::GenericAbstractionType { .. }));
        let (id, builder) = parse_type("Pair<number>");
        assert!(matches!(builder.node_kind(id), NodeKind::GenericApplicationType { .. }));
    }

    #[test]
    fn parses_object_type_with_bare_and_typed_entries() {
        let (id, builder) = parse_type("{x, y: number}");
        let NodeKind::ObjectType { entries, .. } = builder.node_kind(id) else { panic!() };
        assert_eq!(entries.len(), 2);
        assert!(matches!(builder.node_kind(entries[0]), NodeKind::PlainIdentifier { .. }));
        assert!(matches!(builder.node_kind(entries[1]), NodeKind::KeyValue { .. }));
    }
}
