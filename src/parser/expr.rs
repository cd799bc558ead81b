//! Value-expression grammar: the same precedence-cascade idea
//! as [`super::type_expr`], widened to binary-operator tiers and the
//! property-access/invocation chain. Levels run loosest to tightest: markup,
//! as-cast, `??`, `||`, `&&`, `==`/`!=`, relational, `+`/`-`, `*`/`/`, chain,
//! switch, if-else, function, parenthesis, object literal, array literal,
//! literal, identifier.

use crate::ast::{BinaryOp, NodeBody, NodeId, NodeKind};
use crate::combinators::*;
use crate::span::{ParseInput, ParseResult, Span};

use super::{identifier, keyword, name_and_type, spanned_node, string_literal_text, type_expression, ws, AstBuilder};

pub(crate) fn expression<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    expr_markup(builder)
}

// --- Markup -------------------------------------------------------------

/// A markup prop's key needs its own node pushed before the `KeyValue`
/// wrapping it, so this is written directly rather than through
/// `spanned_node` (which only pushes the single kind its closure returns).
fn markup_prop_entry<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| match ws(identifier)(input) {
        ParseResult::Success { input: after_name, span: name_span, value: name } => {
            match tuple3(
                ws(exact("=")),
                ws(exact("{")),
                tuple2(ws(required(expression(builder), || "expected a prop value".to_string())), ws(required(exact("}"), || "expected '}'".to_string()))),
            )(after_name)
            {
                ParseResult::Success { input: after, value: (_, _, (value, _)), .. } => {
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

fn markup_text_child<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, |input: ParseInput<'a>| {
        match take1::<'a>(|c| c != '<' && c != '{')(input) {
            ParseResult::Success { input: after, span, value } => {
                ParseResult::Success { input: after, span, value: NodeKind::StringLiteralExpr { value } }
            }
            _ => ParseResult::None,
        }
    })
}

fn markup_interpolation_child<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| match exact("{")(input) {
        ParseResult::Success { input: after_open, .. } => {
            match tuple2(required(expression(builder), || "expected an expression".to_string()), required(exact("}"), || "expected '}'".to_string()))(after_open) {
                ParseResult::Success { input: after, value: (expr, _), .. } => ParseResult::Success {
                    span: Span::new(input.index, after.index),
                    input: after,
                    value: expr,
                },
                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                ParseResult::None => ParseResult::None,
            }
        }
        _ => ParseResult::None,
    })
}

fn markup_child<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| {
        one_of(vec![markup_interpolation_child(builder), markup_expr_atom(builder), markup_text_child(builder)])(input)
    })
}

/// `<Tag props*>children*</Tag>` or a self-closing `<Tag props* />`.
fn markup_expr_atom<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        match tuple2(ws(exact("<")), ws(identifier))(input) {
            ParseResult::Success { input: after_tag, value: (_, tag), .. } => {
                match many0(markup_prop_entry(builder))(after_tag) {
                    ParseResult::Success { input: after_props, value: props, .. } => {
                        match ws(exact("/>"))(after_props) {
                            ParseResult::Success { input: after, .. } => ParseResult::Success {
                                span: Span::new(input.index, after.index),
                                input: after,
                                value: NodeKind::MarkupExpr { tag: tag.clone(), closing_tag: tag, props, children: Vec::new() },
                            },
                            _ => match ws(required(exact(">"), || "expected '>' or '/>'".to_string()))(after_props) {
                                ParseResult::Success { input: after_open, .. } => {
                                    match tuple3(
                                        many0(markup_child(builder)),
                                        required(exact("</"), || "expected a closing tag".to_string()),
                                        required(identifier, || "expected a closing tag name".to_string()),
                                    )(after_open)
                                    {
                                        ParseResult::Success { input: after_close_name, value: (children, _, closing_tag), .. } => {
                                            match required(ws(exact(">")), || "expected '>'".to_string())(after_close_name) {
                                                ParseResult::Success { input: after, .. } => ParseResult::Success {
                                                    span: Span::new(input.index, after.index),
                                                    input: after,
                                                    value: NodeKind::MarkupExpr { tag, closing_tag, props, children },
                                                },
                                                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                                                ParseResult::None => unreachable!("required never returns None"),
                                            }
                                        }
                                        ParseResult::Error { input, err } => ParseResult::Error { input, err },
                                        ParseResult::None => unreachable!("required never returns None"),
                                    }
                                }
                                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                                ParseResult::None => unreachable!("required never returns None"),
                            },
                        }
                    }
                    _ => unreachable!("many0 never fails"),
                }
            }
            _ => ParseResult::None,
        }
    })
}

fn expr_markup<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprMarkup, builder.memo(), one_of(vec![markup_expr_atom(builder), expr_as_cast(builder)]))
}

// --- As-cast --------------------------------------------------------------

fn expr_as_cast<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprAsCast, builder.memo(), move |input: ParseInput<'a>| match expr_nullish(builder)(input) {
        ParseResult::Success { input: after_expr, value: expr, .. } => {
            match tuple2(ws(keyword("as")), ws(required(type_expression(builder), || "expected a type".to_string())))(after_expr) {
                ParseResult::Success { input: after, value: (_, target_type), .. } => {
                    let span = Span::new(input.index, after.index);
                    let id = builder.push(span, NodeKind::AsExpr { expr, target_type });
                    ParseResult::Success { input: after, span, value: id }
                }
                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                ParseResult::None => {
                    ParseResult::Success { span: Span::new(input.index, after_expr.index), input: after_expr, value: expr }
                }
            }
        }
        other => other,
    })
}

// --- Binary-operator tiers -----------------------------------------------

/// Parses `operand (op operand)*` and left-folds into nested
/// `BinaryOperationExpr` nodes; zero operators falls through to the bare
/// operand. `operand` and `op` are constructor functions (not bound
/// parser values) so each iteration calls them fresh instead of reusing a
/// `BoxParser` by reference across loop iterations.
fn binary_tier<'a>(
    builder: &'a AstBuilder<'a>,
    operand: impl Fn(&'a AstBuilder<'a>) -> BoxParser<'a, NodeId> + Copy + 'a,
    op: impl Fn(ParseInput<'a>) -> ParseResult<'a, BinaryOp> + Copy + 'a,
) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| match ws(operand(builder))(input) {
        ParseResult::Success { input: after_first, value: first, .. } => {
            let mut left = first;
            let mut cursor = after_first;
            loop {
                match tuple2(ws(op), ws(operand(builder)))(cursor) {
                    ParseResult::Success { input: next_input, value: (op, right), .. } => {
                        let span = Span::new(input.index, next_input.index);
                        left = builder.push(span, NodeKind::BinaryOperationExpr { left, op, right });
                        cursor = next_input;
                    }
                    ParseResult::Error { input, err } => return ParseResult::Error { input, err },
                    ParseResult::None => break,
                }
            }
            ParseResult::Success { span: Span::new(input.index, cursor.index), input: cursor, value: left }
        }
        other => other,
    })
}

fn nullish_op<'a>(input: ParseInput<'a>) -> ParseResult<'a, BinaryOp> {
    map(exact("??"), |_| BinaryOp::Nullish)(input)
}

fn expr_nullish<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprNullish, builder.memo(), binary_tier(builder, expr_or, nullish_op))
}

fn or_op<'a>(input: ParseInput<'a>) -> ParseResult<'a, BinaryOp> {
    map(exact("||"), |_| BinaryOp::Or)(input)
}

fn expr_or<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprOr, builder.memo(), binary_tier(builder, expr_and, or_op))
}

fn and_op<'a>(input: ParseInput<'a>) -> ParseResult<'a, BinaryOp> {
    map(exact("&&"), |_| BinaryOp::And)(input)
}

fn expr_and<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprAnd, builder.memo(), binary_tier(builder, expr_equality, and_op))
}

fn equality_op<'a>(input: ParseInput<'a>) -> ParseResult<'a, BinaryOp> {
    one_of(vec![map(exact("=="), |_| BinaryOp::Eq), map(exact("!="), |_| BinaryOp::Neq)])(input)
}

fn expr_equality<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprEquality, builder.memo(), binary_tier(builder, expr_relational, equality_op))
}

/// `<=`/`>=` must be tried before `<`/`>` or the shorter prefix would win.
fn relational_op<'a>(input: ParseInput<'a>) -> ParseResult<'a, BinaryOp> {
    one_of(vec![
        map(exact("<="), |_| BinaryOp::Le),
        map(exact(">="), |_| BinaryOp::Ge),
        map(exact("<"), |_| BinaryOp::Lt),
        map(exact(">"), |_| BinaryOp::Gt),
    ])(input)
}

fn expr_relational<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprRelational, builder.memo(), binary_tier(builder, expr_additive, relational_op))
}

fn additive_op<'a>(input: ParseInput<'a>) -> ParseResult<'a, BinaryOp> {
    one_of(vec![map(exact("+"), |_| BinaryOp::Add), map(exact("-"), |_| BinaryOp::Sub)])(input)
}

fn expr_additive<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprAdditive, builder.memo(), binary_tier(builder, expr_multiplicative, additive_op))
}

fn multiplicative_op<'a>(input: ParseInput<'a>) -> ParseResult<'a, BinaryOp> {
    one_of(vec![map(exact("*"), |_| BinaryOp::Mul), map(exact("/"), |_| BinaryOp::Div)])(input)
}

fn expr_multiplicative<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprMultiplicative, builder.memo(), binary_tier(builder, expr_chain, multiplicative_op))
}

// --- Property-access / invocation chain -----------------------------------

/// A subject followed by zero or more `.name` / `[expr]` / `(args)`
/// applications folded left-to-right; a leading `await`/`detach` attaches to
/// the outermost invocation only. Written as manual control flow, like [`super::type_expr::type_range`],
/// because the loop needs to mutate the accumulated node id in place.
fn expr_chain<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprChain, builder.memo(), move |input: ParseInput<'a>| {
        let (is_await, is_detach, after_prefix) = match ws(keyword("await"))(input) {
            ParseResult::Success { input: next, .. } => (true, false, next),
            _ => match ws(keyword("detach"))(input) {
                ParseResult::Success { input: next, .. } => (false, true, next),
                _ => (false, false, input),
            },
        };
        match expr_switch(builder)(after_prefix) {
            ParseResult::Success { input: after_subject, value: subject, .. } => {
                let mut current = subject;
                let mut cursor = after_subject;
                let mut last_was_invocation = false;
                loop {
                    if let ParseResult::Success { input: after_dot, .. } = ws(exact("."))(cursor) {
                        match required(identifier, || "expected a property name".to_string())(after_dot) {
                            ParseResult::Success { input: after_name, span: name_span, value: name } => {
                                let prop = builder.push(name_span, NodeKind::StringLiteralExpr { value: name });
                                let span = Span::new(input.index, after_name.index);
                                current = builder.push(span, NodeKind::PropertyAccessExpr { subject: current, property: prop });
                                cursor = after_name;
                                last_was_invocation = false;
                                continue;
                            }
                            ParseResult::Error { input, err } => return ParseResult::Error { input, err },
                            ParseResult::None => unreachable!("required never returns None"),
                        }
                    }
                    if let ParseResult::Success { input: after_bracket, .. } = ws(exact("["))(cursor) {
                        match tuple2(
                            required(expression(builder), || "expected an expression".to_string()),
                            required(ws(exact("]")), || "expected ']'".to_string()),
                        )(after_bracket)
                        {
                            ParseResult::Success { input: after, value: (property, _), .. } => {
                                let span = Span::new(input.index, after.index);
                                current = builder.push(span, NodeKind::PropertyAccessExpr { subject: current, property });
                                cursor = after;
                                last_was_invocation = false;
                                continue;
                            }
                            ParseResult::Error { input, err } => return ParseResult::Error { input, err },
                            ParseResult::None => break,
                        }
                    }
                    if let ParseResult::Success { input: after_paren, .. } = ws(exact("("))(cursor) {
                        match tuple2(
                            many_sep0(expression(builder), ws(exact(","))),
                            required(ws(exact(")")), || "expected ')'".to_string()),
                        )(after_paren)
                        {
                            ParseResult::Success { input: after, value: (args, _), .. } => {
                                let span = Span::new(input.index, after.index);
                                current = builder.push(
                                    span,
                                    NodeKind::InvocationExpr { subject: current, args, is_await: false, is_detach: false },
                                );
                                cursor = after;
                                last_was_invocation = true;
                                continue;
                            }
                            ParseResult::Error { input, err } => return ParseResult::Error { input, err },
                            ParseResult::None => break,
                        }
                    }
                    break;
                }
                if (is_await || is_detach) && last_was_invocation {
                    builder.set_invocation_flags(current, is_await, is_detach);
                }
                ParseResult::Success { span: Span::new(input.index, cursor.index), input: cursor, value: current }
            }
            other => other,
        }
    })
}

// --- Switch / if-else / function ------------------------------------------

fn switch_case_body<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeBody> {
    map(required(expression(builder), || "expected an expression".to_string()), NodeBody::Expr)
}

fn switch_case<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, crate::ast::SwitchCase> {
    Box::new(move |input: ParseInput<'a>| {
        one_of(vec![
            map(
                tuple3(ws(keyword("default")), ws(required(exact(":"), || "expected ':'".to_string())), ws(switch_case_body(builder))),
                |(_, _, body)| crate::ast::SwitchCase { pattern: None, body },
            ),
            map(
                tuple3(
                    ws(keyword("case")),
                    tuple2(ws(required(expression(builder), || "expected a case pattern".to_string())), ws(required(exact(":"), || "expected ':'".to_string()))),
                    ws(switch_case_body(builder)),
                ),
                |(_, (pattern, _), body)| crate::ast::SwitchCase { pattern: Some(pattern), body },
            ),
        ])(input)
    })
}

fn expr_switch<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = expr_if_else(builder);
    let own = spanned_node(builder, move |input| {
        map(
            tuple4(
                ws(keyword("switch")),
                ws(required(expr_if_else(builder), || "expected a subject expression".to_string())),
                ws(required(exact("{"), || "expected '{'".to_string())),
                tuple2(
                    ws(many_sep1(switch_case(builder), ws(exact(",")))),
                    ws(required(exact("}"), || "expected '}'".to_string())),
                ),
            ),
            |(_, subject, _, (cases, _))| NodeKind::SwitchExpr { subject, cases },
        )(input)
    });
    memo(RuleId::ExprSwitch, builder.memo(), one_of(vec![own, next]))
}

fn if_else_case<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, crate::ast::IfElseCase> {
    map(
        tuple4(
            ws(keyword("if")),
            ws(required(expression(builder), || "expected a condition".to_string())),
            ws(required(exact("{"), || "expected '{'".to_string())),
            tuple2(
                ws(required(expression(builder), || "expected an expression".to_string())),
                ws(required(exact("}"), || "expected '}'".to_string())),
            ),
        ),
        |(_, condition, _, (body, _))| crate::ast::IfElseCase { condition, body: NodeBody::Expr(body) },
    )
}

fn expr_if_else<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = expr_function(builder);
    let own = spanned_node(builder, move |input| {
        map(
            tuple2(
                many_sep1(if_else_case(builder), ws(keyword("else"))),
                optional(tuple4(
                    ws(keyword("else")),
                    ws(required(exact("{"), || "expected '{'".to_string())),
                    ws(required(expression(builder), || "expected an expression".to_string())),
                    ws(required(exact("}"), || "expected '}'".to_string())),
                )),
            ),
            |(cases, default)| NodeKind::IfElseExpr { cases, default: default.map(|(_, _, e, _)| NodeBody::Expr(e)) },
        )(input)
    });
    memo(RuleId::ExprIfElse, builder.memo(), one_of(vec![own, next]))
}

fn function_body<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeBody> {
    Box::new(move |input: ParseInput<'a>| {
        one_of(vec![
            map(
                tuple3(
                    exact("{"),
                    ws(many0(super::stmt::statement(builder))),
                    ws(required(exact("}"), || "expected '}'".to_string())),
                ),
                |(_, stmts, _)| NodeBody::Block(stmts),
            ),
            map(expression(builder), NodeBody::Expr),
        ])(input)
    })
}

/// `pure? async? (params): ReturnType? => body` (the `:` annotation mirrors
/// `name-and-type`'s own `name: Type` shape; `:` and `=>` are distinct
/// tokens).
fn expr_function<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = expr_parenthesis(builder);
    let own = spanned_node(builder, move |input| {
        map(
            tuple4(
                optional(ws(keyword("pure"))),
                optional(ws(keyword("async"))),
                tuple3(
                    ws(required(exact("("), || "expected '('".to_string())),
                    ws(many_sep0(name_and_type(builder), ws(exact(",")))),
                    ws(required(exact(")"), || "expected ')'".to_string())),
                ),
                tuple2(
                    optional(tuple2(ws(exact(":")), ws(required(type_expression(builder), || "expected a return type".to_string())))),
                    tuple2(ws(required(exact("=>"), || "expected '=>'".to_string())), ws(required(function_body(builder), || "expected a function body".to_string()))),
                ),
            ),
            |(is_pure, is_async, (_, params, _), (return_type, (_, body)))| NodeKind::FunctionExpr {
                params,
                return_type: return_type.map(|(_, t)| t),
                body,
                is_pure: is_pure.is_some(),
                is_async: is_async.is_some(),
            },
        )(input)
    });
    memo(RuleId::ExprFunction, builder.memo(), one_of(vec![own, next]))
}

// --- Parenthesis / literals / object / array ------------------------------

fn expr_parenthesis<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = expr_object_literal(builder);
    let own = spanned_node(builder, move |input| {
        let inner = tuple3(
            ws(exact("(")),
            ws(required(expression(builder), || "expected an expression".to_string())),
            ws(required(exact(")"), || "expected ')'".to_string())),
        );
        backtrack(
            map(inner, |(_, inner, _)| NodeKind::ParenthesisExpr { inner }),
            take_until(")"),
            |message, _| NodeKind::BrokenSubtree { message },
        )(input)
    });
    memo(RuleId::ExprParenthesis, builder.memo(), one_of(vec![own, next]))
}

fn object_literal_entry<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let spread = spanned_node(builder, move |input| {
        map(
            tuple2(ws(exact("...")), ws(required(expression(builder), || "expected an expression".to_string()))),
            |(_, expr)| NodeKind::Spread { expr },
        )(input)
    });
    let key_value = Box::new(move |input: ParseInput<'a>| match ws(object_literal_key(builder))(input) {
        ParseResult::Success { input: after_key, span: key_span, value: key } => {
            match tuple2(ws(exact(":")), ws(required(expression(builder), || "expected an expression".to_string())))(after_key) {
                ParseResult::Success { input: after, value: (_, value), .. } => {
                    let span = Span::new(input.index, after.index);
                    let id = builder.push(span, NodeKind::KeyValue { key, value });
                    ParseResult::Success { input: after, span, value: id }
                }
                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                ParseResult::None => ParseResult::Success { input: after_key, span: key_span, value: key },
            }
        }
        _ => ParseResult::None,
    }) as BoxParser<'a, NodeId>;
    one_of(vec![spread, key_value])
}

/// A bare identifier key parses as `PlainIdentifier`; a quoted key as
/// `StringLiteralExpr` (object-literal keys may be either).
fn object_literal_key<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, |input| {
        one_of(vec![
            map(identifier, |name| NodeKind::PlainIdentifier { name }) as BoxParser<'a, NodeKind>,
            map(string_literal_text, |value| NodeKind::StringLiteralExpr { value }),
        ])(input)
    })
}

fn expr_object_literal<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = expr_array_literal(builder);
    let own = spanned_node(builder, move |input| {
        let inner = tuple3(
            ws(exact("{")),
            ws(many_sep0(object_literal_entry(builder), ws(exact(",")))),
            ws(required(exact("}"), || "expected '}'".to_string())),
        );
        backtrack(
            map(inner, |(_, entries, _)| NodeKind::ObjectLiteralExpr { entries }),
            take_until("}"),
            |message, _| NodeKind::BrokenSubtree { message },
        )(input)
    });
    memo(RuleId::ExprObjectLiteral, builder.memo(), one_of(vec![own, next]))
}

fn array_literal_element<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let spread = spanned_node(builder, move |input| {
        map(
            tuple2(ws(exact("...")), ws(required(expression(builder), || "expected an expression".to_string()))),
            |(_, expr)| NodeKind::Spread { expr },
        )(input)
    });
    one_of(vec![spread, expression(builder)])
}

fn expr_array_literal<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = expr_literal(builder);
    let own = spanned_node(builder, move |input| {
        let inner = tuple3(
            ws(exact("[")),
            ws(many_sep0(array_literal_element(builder), ws(exact(",")))),
            ws(required(exact("]"), || "expected ']'".to_string())),
        );
        backtrack(
            map(inner, |(_, elements, _)| NodeKind::ArrayLiteralExpr { elements }),
            take_until("]"),
            |message, _| NodeKind::BrokenSubtree { message },
        )(input)
    });
    memo(RuleId::ExprArrayLiteral, builder.memo(), one_of(vec![own, next]))
}

fn expr_literal<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    let next = expr_identifier(builder);
    let own = spanned_node(builder, |input| literal_kind(input));
    memo(RuleId::ExprLiteral, builder.memo(), one_of(vec![own, next]))
}

fn literal_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    one_of(vec![
        map(string_literal_text, |value| NodeKind::StringLiteralExpr { value }) as BoxParser<'a, NodeKind>,
        map(take1::<'a>(|c| c.is_ascii_digit()), |digits: String| NodeKind::NumberLiteralExpr {
            value: digits.parse().unwrap_or(0.0),
        }),
        map(keyword("true"), |_| NodeKind::BooleanLiteralExpr { value: true }),
        map(keyword("false"), |_| NodeKind::BooleanLiteralExpr { value: false }),
        map(keyword("nil"), |_| NodeKind::NilLiteralExpr),
    ])(input)
}

fn expr_identifier<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::ExprIdentifier, builder.memo(), spanned_node(builder, |input| map(identifier, |name| NodeKind::IdentifierExpr { name })(input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::ParseInput;

    fn parse_expr(src: &'static str) -> (NodeId, AstBuilder<'static>) {
        let builder = AstBuilder::new(src);
        let input = ParseInput::new(src);
        match expression(&builder)(input) {
            ParseResult::Success { value, .. } => (value, builder),
            _ => panic!("expected an expression"),
        }
    }

    #[test]
    fn parses_number_literal() {
        let (id, builder) = parse_expr("12");
        assert!(matches!(builder.node_kind(id), NodeKind::NumberLiteralExpr { value } if value == 12.0));
    }

    #[test]
    fn left_folds_additive_chain() {
        let (id, builder) = parse_expr("1 + 2 + 3");
        let NodeKind::BinaryOperationExpr { left, op: BinaryOp::Add, .. } = builder.node_kind(id) else { panic!() };
        assert!(matches!(builder.node_kind(left), NodeKind::BinaryOperationExpr { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn respects_multiplicative_over_additive_precedence() {
        let (id, builder) = parse_expr("1 + 2 * 3");
        let NodeKind::BinaryOperationExpr { left, op: BinaryOp::Add, right } = builder.node_kind(id) else { panic!() };
        assert!(matches!(builder.node_kind(left), NodeKind::NumberLiteralExpr { value } if value == 1.0));
        assert!(matches!(builder.node_kind(right), NodeKind::BinaryOperationExpr { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn parses_property_and_invocation_chain() {
        let (id, builder) = parse_expr("foo.bar(1, 2)");
        let NodeKind::InvocationExpr { subject, args, .. } = builder.node_kind(id) else { panic!() };
        assert_eq!(args.len(), 2);
        assert!(matches!(builder.node_kind(subject), NodeKind::PropertyAccessExpr { .. }));
    }

    #[test]
    fn await_attaches_to_outermost_invocation_only() {
        let (id, builder) = parse_expr("await foo()");
        assert!(matches!(builder.node_kind(id), NodeKind::InvocationExpr { is_await: true, .. }));
    }

    #[test]
    fn parses_as_cast() {
        let (id, builder) = parse_expr("1 as number");
        assert!(matches!(builder.node_kind(id), NodeKind::AsExpr { .. }));
    }

    #[test]
    fn parses_object_literal_with_spread() {
        let (id, builder) = parse_expr("{x: 1, ...y}");
        let NodeKind::ObjectLiteralExpr { entries } = builder.node_kind(id) else { panic!() };
        assert_eq!(entries.len(), 2);
        assert!(matches!(builder.node_kind(entries[1]), NodeKind::Spread { .. }));
    }
}
