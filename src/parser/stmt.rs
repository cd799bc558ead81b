//! Statement grammar, used only inside function-expression
//! block bodies. Unlike the expression/type-expression cascades this is a
//! flat `one_of` over statement kinds rather than a precedence ladder --
//! [`RuleId::StatementLevel`] names a single memo key for the whole
//! dispatcher, not one per kind.
//!
//! Modeled on the `Statement<T>` dispatch in `src/parser/ast/
//! statement/mod.rs`: declaration/constant/assignment forms are terminated
//! by a required `;`, control-flow forms (`if`, `switch`, `for`) by an
//! optional one.

use crate::ast::{NodeBody, NodeId, NodeKind};
use crate::combinators::*;
use crate::span::{ParseInput, ParseResult, Span};

use super::{expression, keyword, name_and_type, spanned_node, ws, AstBuilder};

pub(crate) fn statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    memo(RuleId::StatementLevel, builder.memo(), move |input: ParseInput<'a>| {
        one_of(vec![
            variable_declaration_statement(builder),
            return_statement(builder),
            switch_statement(builder),
            if_else_statement(builder),
            for_loop_statement(builder),
            assignment_statement(builder),
            invocation_statement(builder),
        ])(input)
    })
}

fn statement_block<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, Vec<NodeId>> {
    Box::new(move |input: ParseInput<'a>| {
        map(
            tuple3(
                ws(exact("{")),
                ws(many0(statement(builder))),
                ws(required(exact("}"), || "expected '}'".to_string())),
            ),
            |(_, stmts, _)| stmts,
        )(input)
    })
}

fn variable_declaration_statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple4(
                ws(one_of(vec![keyword("const"), keyword("let")])),
                ws(required(name_and_type(builder), || "expected a name".to_string())),
                tuple2(
                    ws(required(exact("="), || "expected '='".to_string())),
                    ws(required(expression(builder), || "expected an expression".to_string())),
                ),
                ws(required(exact(";"), || "expected ';'".to_string())),
            ),
            |(kw, name_and_type, (_, value), _)| NodeKind::VariableDeclarationStatement {
                is_const: kw == "const",
                name_and_type,
                value,
            },
        )(input)
    })
}

fn return_statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple3(
                ws(keyword("return")),
                optional(ws(expression(builder))),
                ws(required(exact(";"), || "expected ';'".to_string())),
            ),
            |(_, value, _)| NodeKind::ReturnStatement { value },
        )(input)
    })
}

fn switch_stmt_body<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeBody> {
    map(statement_block(builder), NodeBody::Block)
}

fn switch_statement_case<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, crate::ast::SwitchCase> {
    Box::new(move |input: ParseInput<'a>| {
        one_of(vec![
            map(tuple2(ws(keyword("default")), tuple2(ws(required(exact(":"), || "expected ':'".to_string())), ws(switch_stmt_body(builder)))), |(_, (_, body))| {
                crate::ast::SwitchCase { pattern: None, body }
            }),
            map(
                tuple3(
                    ws(keyword("case")),
                    ws(required(expression(builder), || "expected a case pattern".to_string())),
                    tuple2(ws(required(exact(":"), || "expected ':'".to_string())), ws(switch_stmt_body(builder))),
                ),
                |(_, pattern, (_, body))| crate::ast::SwitchCase { pattern: Some(pattern), body },
            ),
        ])(input)
    })
}

fn switch_statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple4(
                ws(keyword("switch")),
                ws(required(expression(builder), || "expected a subject expression".to_string())),
                ws(required(exact("{"), || "expected '{'".to_string())),
                tuple2(
                    ws(many_sep1(switch_statement_case(builder), ws(exact(",")))),
                    ws(required(exact("}"), || "expected '}'".to_string())),
                ),
            ),
            |(_, subject, _, (cases, _))| NodeKind::SwitchStatement { subject, cases },
        )(input)
    })
}

fn if_else_statement_case<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, crate::ast::IfElseCase> {
    map(
        tuple3(
            ws(keyword("if")),
            ws(required(expression(builder), || "expected a condition".to_string())),
            ws(required(statement_block(builder), || "expected a block".to_string())),
        ),
        |(_, condition, stmts)| crate::ast::IfElseCase { condition, body: NodeBody::Block(stmts) },
    )
}

fn if_else_statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple2(
                many_sep1(if_else_statement_case(builder), ws(keyword("else"))),
                optional(tuple2(ws(keyword("else")), ws(required(statement_block(builder), || "expected a block".to_string())))),
            ),
            |(cases, default)| NodeKind::IfElseStatement { cases, default: default.map(|(_, stmts)| stmts) },
        )(input)
    })
}

/// `for (binding of iterable) { body }`.
fn for_loop_statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple4(
                ws(keyword("for")),
                ws(required(exact("("), || "expected '('".to_string())),
                tuple3(
                    ws(required(name_and_type(builder), || "expected a loop binding".to_string())),
                    ws(required(keyword("of"), || "expected 'of'".to_string())),
                    tuple2(
                        ws(required(expression(builder), || "expected an iterable expression".to_string())),
                        ws(required(exact(")"), || "expected ')'".to_string())),
                    ),
                ),
                ws(required(statement_block(builder), || "expected a block".to_string())),
            ),
            |(_, _, (binding, _, (iterable, _)), body)| NodeKind::ForLoopStatement { binding, iterable, body },
        )(input)
    })
}

/// A property-access/invocation target followed by `= expr;`.
fn assignment_statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| match ws(expression(builder))(input) {
        ParseResult::Success { input: after_target, value: target, .. } => {
            match tuple3(
                ws(exact("=")),
                ws(required(expression(builder), || "expected an expression".to_string())),
                ws(required(exact(";"), || "expected ';'".to_string())),
            )(after_target)
            {
                ParseResult::Success { input: after, value: (_, value, _), .. } => {
                    let span = Span::new(input.index, after.index);
                    let id = builder.push(span, NodeKind::AssignmentStatement { target, value });
                    ParseResult::Success { input: after, span, value: id }
                }
                ParseResult::Error { input, err } => ParseResult::Error { input, err },
                ParseResult::None => ParseResult::None,
            }
        }
        _ => ParseResult::None,
    })
}

/// An expression used for its side effect, terminated by `;`.
fn invocation_statement<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple2(ws(expression(builder)), ws(required(exact(";"), || "expected ';'".to_string()))),
            |(expr, _)| NodeKind::InvocationStatement { expr },
        )(input)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::ParseInput;

    fn parse_stmt(src: &'static str) -> (NodeId, AstBuilder<'static>) {
        let builder = AstBuilder::new(src);
        let input = ParseInput::new(src);
        match statement(&builder)(input) {
            ParseResult::Success { value, .. } => (value, builder),
            _ => panic!("expected a statement"),
        }
    }

    #[test]
    fn parses_variable_declaration_statement() {
        let (id, builder) = parse_stmt("let x = 1;");
        assert!(matches!(builder.node_kind(id), NodeKind::VariableDeclarationStatement { is_const: false, .. }));
    }

    #[test]
    fn parses_return_with_value() {
        let (id, builder) = parse_stmt("return 1;");
        assert!(matches!(builder.node_kind(id), NodeKind::ReturnStatement { value: Some(_) }));
    }

    #[test]
    fn parses_return_without_value() {
        let (id, builder) = parse_stmt("return;");
        assert!(matches!(builder.node_kind(id), NodeKind::ReturnStatement { value: None }));
    }

    #[test]
    fn parses_assignment_statement() {
        let (id, builder) = parse_stmt("x = 1;");
        assert!(matches!(builder.node_kind(id), NodeKind::AssignmentStatement { .. }));
    }

    #[test]
    fn parses_if_else_statement_block() {
        let (id, builder) = parse_stmt("if true { return 1; } else { return 2; }");
        let NodeKind::IfElseStatement { cases, default } = builder.node_kind(id) else { panic!() };
        assert_eq!(cases.len(), 1);
        assert!(default.is_some());
    }

    #[test]
    fn parses_for_loop_statement() {
        let (id, builder) = parse_stmt("for (x of xs) { return x; }");
        assert!(matches!(builder.node_kind(id), NodeKind::ForLoopStatement { .. }));
    }
}
