//! `parseModule` and the declaration grammar (component D).
//!
//! Modeled on `src/parser/ast/expression/mod.rs` + sibling per-kind files'
//! `FromTokens`-per-node-kind convention, rebuilt directly atop
//! [`crate::combinators`] rather than a token stream -- see DESIGN.md,
//! component D.

mod expr;
mod stmt;
mod type_expr;

use std::cell::RefCell;

use log::trace;

use crate::ast::{Ast, Node, NodeId, NodeKind};
use crate::combinators::*;
use crate::span::{ParseError, ParseInput, ParseResult, Span};

pub(crate) use expr::expression;
pub(crate) use type_expr::type_expression;

/// Identifiers reserved in their grammar positions; the
/// identifier parser rejects these so e.g. `if` never parses as a plain
/// name.
const KEYWORDS: &[&str] = &[
    "const", "let", "export", "type", "import", "from", "as", "if", "else", "switch", "case", "default", "for", "of",
    "return", "typeof", "true", "false", "nil", "string", "number", "boolean", "unknown", "pure", "async", "await",
    "detach", "extends",
];

/// Interior-mutable node arena used while parsing: every grammar rule is a
/// plain `Fn(ParseInput) -> ParseResult`, so building the tree they
/// construct needs a shared, not exclusive, reference (mirrors
/// `MemoTable`'s own `RefCell`-backed design in the same crate).
pub(crate) struct AstBuilder<'s> {
    source: &'s str,
    nodes: RefCell<Vec<Node>>,
    /// Shared across every precedence-level dispatcher so `(RuleId,
    /// input.index)` lookups land in one table for the whole parse
    ///.
    memo: MemoTable,
}

impl<'s> AstBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self { source, nodes: RefCell::new(Vec::new()), memo: MemoTable::new() }
    }

    pub(crate) fn memo(&self) -> &MemoTable {
        &self.memo
    }

    pub(crate) fn push(&self, span: Span, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len() as u32);
        nodes.push(Node { id, span, parent: None, preceding_comments: Vec::new(), kind });
        id
    }

    fn attach_preceding_comments(&self, id: NodeId, comments: Vec<NodeId>) {
        self.nodes.borrow_mut()[id.0 as usize].preceding_comments = comments;
    }

    #[cfg(test)]
    pub(crate) fn node_kind(&self, id: NodeId) -> NodeKind {
        self.nodes.borrow()[id.0 as usize].kind.clone()
    }

    /// Patches an already-pushed `InvocationExpr`'s await/detach flags --
    /// the property-access/invocation chain only learns whether a leading
    /// `await`/`detach` applies after folding the whole chain, by which
    /// point the outermost invocation node has already been pushed.
    pub(crate) fn set_invocation_flags(&self, id: NodeId, is_await: bool, is_detach: bool) {
        if let NodeKind::InvocationExpr { is_await: a, is_detach: d, .. } = &mut self.nodes.borrow_mut()[id.0 as usize].kind {
            *a = is_await;
            *d = is_detach;
        }
    }

    /// Replays every node pushed during parsing into a fresh [`Ast`] (in the
    /// same order, so ids line up), then runs the parenting pass.
    fn finish(self, root: NodeId) -> Ast {
        let mut ast = Ast::new(self.source.to_string());
        for node in self.nodes.into_inner() {
            let id = ast.push(node.span, node.kind);
            debug_assert_eq!(id, node.id);
            if !node.preceding_comments.is_empty() {
                ast.attach_preceding_comments(id, node.preceding_comments);
            }
        }
        ast.set_root(root);
        ast.run_parenting_pass();
        ast
    }
}

/// Wraps a `ParseInput -> ParseResult<NodeKind>` rule into one producing the
/// pushed node's id, at the span the inner rule matched.
pub(crate) fn spanned_node<'a>(
    builder: &'a AstBuilder<'a>,
    inner: impl Fn(ParseInput<'a>) -> ParseResult<'a, NodeKind> + 'a,
) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| match inner(input) {
        ParseResult::Success { input: next, span, value: kind } => {
            let id = builder.push(span, kind);
            ParseResult::Success { input: next, span, value: id }
        }
        ParseResult::None => ParseResult::None,
        ParseResult::Error { input, err } => ParseResult::Error { input, err },
    })
}

/// A keyword token: `exact(kw)` that additionally requires the next
/// character not continue an identifier, so `from` doesn't match a prefix
/// of `fromage`.
pub(crate) fn keyword<'a>(kw: &'static str) -> BoxParser<'a, &'static str> {
    Box::new(move |input: ParseInput<'a>| match exact(kw)(input) {
        ParseResult::Success { input: next, span, value } => match next.peek_char() {
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => ParseResult::None,
            _ => ParseResult::Success { input: next, span, value },
        },
        other => other,
    })
}

fn raw_identifier<'a>(input: ParseInput<'a>) -> ParseResult<'a, String> {
    match alpha_char(input) {
        ParseResult::Success { input: after_first, value: first, .. } => {
            match take0::<'a>(|c| c.is_ascii_alphanumeric() || c == '_')(after_first) {
                ParseResult::Success { input: after, value: rest, .. } => {
                    let mut name = String::new();
                    name.push(first);
                    name.push_str(&rest);
                    ParseResult::Success { span: Span::new(input.index, after.index), input: after, value: name }
                }
                _ => unreachable!("take0 never fails"),
            }
        }
        _ => ParseResult::None,
    }
}

pub(crate) fn identifier<'a>(input: ParseInput<'a>) -> ParseResult<'a, String> {
    filter_value(raw_identifier, |s: &String| !KEYWORDS.contains(&s.as_str()))(input)
}

/// `p` preceded by (and ignoring) whitespace -- used between tokens where no
/// comment can legally sit.
pub(crate) fn ws<'a, T: 'a>(p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a) -> BoxParser<'a, T> {
    Box::new(move |input: ParseInput<'a>| match whitespace(input) {
        ParseResult::Success { input: next, .. } => p(next),
        _ => p(input),
    })
}

/// Advances past whitespace without the `ParseResult` wrapper -- for
/// manually sequencing an already-built parser value at more than one call
/// site within the same closure, where re-wrapping it through `ws`/`tuple2`
/// by reference would tie the parser's lifetime to the local borrow instead
/// of `'a`.
pub(crate) fn skip_ws(input: ParseInput<'_>) -> ParseInput<'_> {
    match whitespace(input) {
        ParseResult::Success { input: next, .. } => next,
        _ => input,
    }
}

fn line_comment_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    map(tuple2(exact("//"), take0::<'a>(|c| c != '\n')), |(_, text)| NodeKind::Comment { text, is_block: false })(input)
}

fn block_comment_kind<'a>(input: ParseInput<'a>) -> ParseResult<'a, NodeKind> {
    match exact("/*")(input) {
        ParseResult::Success { input: after_open, .. } => match take_until("*/")(after_open) {
            ParseResult::Success { input: after, span, .. } => {
                let raw = span.text(input.source);
                let text = raw.strip_suffix("*/").unwrap_or(raw).to_string();
                ParseResult::Success {
                    span: Span::new(input.index, after.index),
                    input: after,
                    value: NodeKind::Comment { text, is_block: true },
                }
            }
            _ => ParseResult::Error {
                input: after_open,
                err: ParseError::new("unterminated block comment", Span::point(after_open.index)),
            },
        },
        _ => ParseResult::None,
    }
}

fn comment<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, |input| {
        one_of(vec![
            Box::new(block_comment_kind) as BoxParser<'a, NodeKind>,
            Box::new(line_comment_kind),
        ])(input)
    })
}

/// Consumes interleaved whitespace and comments, returning every comment
/// node encountered (in source order) for attachment to whatever follows.
fn skip_trivia<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, Vec<NodeId>> {
    let comment_p = comment(builder);
    Box::new(move |input: ParseInput<'a>| {
        let mut cursor = input;
        let mut comments = Vec::new();
        loop {
            if let ParseResult::Success { input: next, .. } = whitespace(cursor) {
                cursor = next;
            }
            match comment_p(cursor) {
                ParseResult::Success { input: next, value, .. } => {
                    comments.push(value);
                    cursor = next;
                }
                _ => break,
            }
        }
        if let ParseResult::Success { input: next, .. } = whitespace(cursor) {
            cursor = next;
        }
        ParseResult::Success { span: Span::new(input.index, cursor.index), input: cursor, value: comments }
    })
}

/// Skips leading trivia, runs `inner`, and attaches any comments collected
/// to the resulting node as `precedingComments`.
fn with_leading_comments<'a>(
    builder: &'a AstBuilder<'a>,
    inner: impl Fn(ParseInput<'a>) -> ParseResult<'a, NodeId> + 'a,
) -> BoxParser<'a, NodeId> {
    let skip = skip_trivia(builder);
    Box::new(move |input: ParseInput<'a>| match skip(input) {
        ParseResult::Success { input: after_trivia, value: comments, .. } => match inner(after_trivia) {
            ParseResult::Success { input: next, value: id, .. } => {
                if !comments.is_empty() {
                    builder.attach_preceding_comments(id, comments);
                }
                ParseResult::Success { span: Span::new(input.index, next.index), input: next, value: id }
            }
            ParseResult::None => ParseResult::None,
            ParseResult::Error { input, err } => ParseResult::Error { input, err },
        },
        _ => unreachable!("skip_trivia never fails"),
    })
}

// --- Declarations ------------------------------------------------------

fn import_item<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, |input| {
        map(
            tuple2(ws(identifier), optional(tuple2(ws(keyword("as")), ws(identifier)))),
            |(name, alias)| NodeKind::ImportItem { name, alias: alias.map(|(_, a)| a) },
        )(input)
    })
}

fn import_declaration<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple4(
                optional(ws(keyword("export"))),
                ws(keyword("from")),
                ws(required(string_literal_text, || "expected a module path string".to_string())),
                tuple4(
                    ws(required(exact("import"), || "expected 'import'".to_string())),
                    ws(required(exact("{"), || "expected '{'".to_string())),
                    ws(many_sep0(import_item(builder), ws(exact(",")))),
                    ws(required(exact("}"), || "expected '}'".to_string())),
                ),
            ),
            |(export, _, from, (_, _, items, _))| NodeKind::ImportDeclaration {
                from,
                items,
                exported: export.is_some(),
            },
        )(input)
    })
}

fn type_declaration<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple4(
                optional(ws(keyword("export"))),
                ws(keyword("type")),
                ws(required(identifier, || "expected a type name".to_string())),
                tuple2(
                    ws(required(exact("="), || "expected '='".to_string())),
                    ws(required(type_expression(builder), || "expected a type expression".to_string())),
                ),
            ),
            |(export, _, name, (_, type_expr))| NodeKind::TypeDeclaration { name, type_expr, exported: export.is_some() },
        )(input)
    })
}

pub(crate) fn name_and_type<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple2(ws(identifier), optional(tuple2(ws(exact(":")), ws(type_expression(builder))))),
            |(name, ty)| NodeKind::NameAndType { name, type_expr: ty.map(|(_, t)| t) },
        )(input)
    })
}

fn variable_declaration<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    spanned_node(builder, move |input| {
        map(
            tuple4(
                optional(ws(keyword("export"))),
                ws(one_of(vec![keyword("const"), keyword("let")])),
                ws(required(name_and_type(builder), || "expected a name".to_string())),
                tuple2(
                    ws(required(exact("="), || "expected '='".to_string())),
                    ws(required(expression(builder), || "expected an expression".to_string())),
                ),
            ),
            |(export, kw, name_and_type, (_, value))| NodeKind::VariableDeclaration {
                is_const: kw == "const",
                name_and_type,
                value,
                exported: export.is_some(),
            },
        )(input)
    })
}

fn declaration<'a>(builder: &'a AstBuilder<'a>) -> BoxParser<'a, NodeId> {
    Box::new(move |input: ParseInput<'a>| {
        one_of(vec![
            import_declaration(builder),
            type_declaration(builder),
            variable_declaration(builder),
        ])(input)
    })
}

pub(crate) fn string_literal_text<'a>(input: ParseInput<'a>) -> ParseResult<'a, String> {
    match exact("'")(input) {
        ParseResult::Success { input: after_open, .. } => match take0::<'a>(|c| c != '\'')(after_open) {
            ParseResult::Success { input: after_text, value: text, .. } => match exact("'")(after_text) {
                ParseResult::Success { input: after_close, .. } => {
                    ParseResult::Success { span: Span::new(input.index, after_close.index), input: after_close, value: text }
                }
                _ => ParseResult::Error {
                    input: after_text,
                    err: ParseError::new("unterminated string literal", Span::point(after_text.index)),
                },
            },
            _ => unreachable!("take0 never fails"),
        },
        _ => ParseResult::None,
    }
}

/// `parseModule`: optional leading whitespace/comments, zero
/// or more preceded declarations, trailing comments hung off the module,
/// then a required end-of-file.
pub fn parse_module(source: &str) -> Result<Ast, ParseError> {
    let builder = AstBuilder::new(source);
    let input = ParseInput::new(source);

    let decl = with_leading_comments(&builder, declaration(&builder));
    let (after_decls, declarations) = match many0(decl)(input) {
        ParseResult::Success { input, value, .. } => (input, value),
        ParseResult::Error { err, .. } => return Err(err),
        ParseResult::None => unreachable!("many0 never returns None"),
    };

    let trivia = skip_trivia(&builder);
    let (after_trailing, trailing_comments) = match trivia(after_decls) {
        ParseResult::Success { input, value, .. } => (input, value),
        _ => (after_decls, Vec::new()),
    };

    match end_of_file(after_trailing) {
        ParseResult::Success { .. } => {
            trace!("parsed module with {} declaration(s)", declarations.len());
            let module_span = Span::new(0, source.len());
            let root = builder.push(module_span, NodeKind::Module { declarations, trailing_comments });
            Ok(builder.finish(root))
        }
        _ => Err(ParseError::new(
            format!("Failed to consume entire module source at index {}", after_trailing.index),
            Span::point(after_trailing.index),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_module() {
        let ast = parse_module("").unwrap();
        let root = ast.root().unwrap();
        match &ast.node(root).kind {
            NodeKind::Module { declarations, .. } => assert!(declarations.is_empty()),
            other => panic!("expected module, got {other:?}"),
        }
    }

    #[test]
    fn parses_const_number_declaration() {
        let ast = parse_module("const x = 12").unwrap();
        let root = ast.root().unwrap();
        let NodeKind::Module { declarations, .. } = &ast.node(root).kind else { panic!("not a module") };
        assert_eq!(declarations.len(), 1);
        match &ast.node(declarations[0]).kind {
            NodeKind::VariableDeclaration { is_const, value, .. } => {
                assert!(*is_const);
                assert!(matches!(ast.node(*value).kind, NodeKind::NumberLiteralExpr { value } if value == 12.0));
            }
            other => panic!("expected variable-declaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_declared_type_annotation() {
        let ast = parse_module("const x: number = 12").unwrap();
        let root = ast.root().unwrap();
        let NodeKind::Module { declarations, .. } = &ast.node(root).kind else { panic!("not a module") };
        let NodeKind::VariableDeclaration { name_and_type, .. } = &ast.node(declarations[0]).kind else { panic!() };
        let NodeKind::NameAndType { name, type_expr } = &ast.node(*name_and_type).kind else { panic!() };
        assert_eq!(name, "x");
        assert!(type_expr.is_some());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse_module("const x = 12 )").is_err());
    }

    #[test]
    fn attaches_preceding_line_comment_to_declaration() {
        let ast = parse_module("// hello\nconst x = 1").unwrap();
        let root = ast.root().unwrap();
        let NodeKind::Module { declarations, .. } = &ast.node(root).kind else { panic!() };
        assert_eq!(ast.node(declarations[0]).preceding_comments.len(), 1);
    }
}
