//! Fixture loading and span/position builders shared by `tests/*.rs` --
//! an antecedent `test-utils` crate drove a built `why` binary as a
//! subprocess; this crate has no binary, so this one drives
//! `glint_core::parser::parse_module`/`glint_core::checker::check` in
//! process instead and keeps the same "one helper per behavioural area"
//! shape.

use std::{fs, path::Path};

use glint_core::ast::{Ast, NodeId};
use glint_core::checker::{self, Diagnostic};
use glint_core::parser::{self, ParseError};
use glint_core::span::Span;

/// A byte-offset span, for asserting against a diagnostic's or node's
/// `Span` without spelling out the struct literal at every call site.
pub fn span(start: usize, end: usize) -> Span {
    Span::new(start, end)
}

/// Parses `src`, panicking with the render of any [`ParseError`] -- for
/// tests asserting against a well-formed module's AST shape.
pub fn parse_ok(src: &str) -> Ast {
    match parser::parse_module(src) {
        Ok(ast) => ast,
        Err(err) => panic!("expected `{src}` to parse: {err}"),
    }
}

/// Parses and checks `src` in one step, for tests asserting against the
/// checker's diagnostic stream rather than the parsed shape.
pub fn diagnostics(src: &str) -> Vec<Diagnostic> {
    let ast = parse_ok(src);
    checker::check(&ast)
}

/// The root module's declaration ids, in source order -- most scenario
/// tests only care about "the Nth top-level declaration".
pub fn declarations(ast: &Ast) -> Vec<NodeId> {
    let Some(root) = ast.root() else { return Vec::new() };
    match &ast.node(root).kind {
        glint_core::ast::NodeKind::Module { declarations, .. } => declarations.clone(),
        _ => Vec::new(),
    }
}

/// Loads a fixture source file from `test-utils/fixtures/<name>`, trimming
/// a single trailing newline so fixture files can end in one without
/// tests needing to account for it.
pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name);
    let contents = fs::read_to_string(&path).unwrap_or_else(|err| panic!("reading fixture {path:?}: {err}"));
    contents.strip_suffix('\n').map(str::to_string).unwrap_or(contents)
}

/// Asserts that `src` fails to parse, returning the [`ParseError`] for
/// further inspection (span, message).
pub fn expect_parse_error(src: &str) -> ParseError {
    match parser::parse_module(src) {
        Err(err) => err,
        Ok(_) => panic!("expected `{src}` to fail parsing"),
    }
}
