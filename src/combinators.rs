//! Parser combinator primitives (component B).
//!
//! These are the building blocks the grammar in [`crate::parser`] is built
//! from. Every primitive is deterministic and total: given any
//! [`ParseInput`] it always returns one of [`ParseResult::Success`],
//! [`ParseResult::Error`], or [`ParseResult::None`] -- it never panics and
//! never loops forever on its own.
//!
//! Modeled on `parser::combinators::Comb`'s function-combinator style, but
//! retargeted: `Comb` matches a stream of pre-lexed `Token`s, these match
//! `char`s directly out of [`ParseInput`] (see DESIGN.md, component B).

use std::cell::RefCell;
use std::collections::HashMap;

use crate::span::{ParseError, ParseInput, ParseResult, Span};

/// A boxed, type-erased parser. Combinators generally take `impl Fn(...)`
/// by value and return a `BoxParser` so they can be stored, cloned via
/// `Rc`, and composed without fighting `impl Trait` lifetime inference.
pub type BoxParser<'a, T> = Box<dyn Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a>;

/// Match a literal prefix exactly.
pub fn exact<'a>(literal: &'static str) -> BoxParser<'a, &'static str> {
    Box::new(move |input: ParseInput<'a>| {
        if input.rest().starts_with(literal) {
            let next = input.advance_bytes(literal.len());
            ParseResult::Success {
                span: input.span_since(input).merge(Span::new(input.index, next.index)),
                input: next,
                value: literal,
            }
        } else {
            ParseResult::None
        }
    })
}

/// Match any single character.
pub fn any_char(input: ParseInput<'_>) -> ParseResult<'_, char> {
    match input.peek_char() {
        Some(c) => {
            let next = input.advance_char(c);
            ParseResult::Success {
                span: Span::new(input.index, next.index),
                input: next,
                value: c,
            }
        }
        None => ParseResult::None,
    }
}

/// Match a single character satisfying `pred`.
pub fn char_filter<'a>(pred: fn(char) -> bool) -> BoxParser<'a, char> {
    Box::new(move |input: ParseInput<'a>| match any_char(input) {
        ParseResult::Success { input, span, value } if pred(value) => ParseResult::Success {
            input,
            span,
            value,
        },
        _ => ParseResult::None,
    })
}

pub fn alpha_char<'a>(input: ParseInput<'a>) -> ParseResult<'a, char> {
    char_filter(|c| c.is_ascii_alphabetic())(input)
}

pub fn numeric_char<'a>(input: ParseInput<'a>) -> ParseResult<'a, char> {
    char_filter(|c| c.is_ascii_digit())(input)
}

pub fn whitespace_char<'a>(input: ParseInput<'a>) -> ParseResult<'a, char> {
    char_filter(|c| c.is_whitespace())(input)
}

/// Greedily capture as many characters matching `pred` as possible (zero or
/// more). Never fails -- an empty capture is still a `Success`.
pub fn take0<'a>(pred: fn(char) -> bool) -> BoxParser<'a, String> {
    Box::new(move |input: ParseInput<'a>| {
        let mut cursor = input;
        let mut out = String::new();
        while let Some(c) = cursor.peek_char() {
            if !pred(c) {
                break;
            }
            out.push(c);
            cursor = cursor.advance_char(c);
        }
        ParseResult::Success {
            span: Span::new(input.index, cursor.index),
            input: cursor,
            value: out,
        }
    })
}

/// Like [`take0`] but requires at least one character, otherwise `None`.
pub fn take1<'a>(pred: fn(char) -> bool) -> BoxParser<'a, String> {
    let inner = take0(pred);
    Box::new(move |input: ParseInput<'a>| match inner(input) {
        ParseResult::Success { value, .. } if value.is_empty() => ParseResult::None,
        other => other,
    })
}

/// Zero or more repetitions of `p`. Never fails.
pub fn many0<'a, T: 'a>(p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a) -> BoxParser<'a, Vec<T>> {
    Box::new(move |input: ParseInput<'a>| {
        let mut cursor = input;
        let mut out = vec![];
        loop {
            match p(cursor) {
                ParseResult::Success { input: next, value, .. } => {
                    out.push(value);
                    cursor = next;
                }
                ParseResult::None => break,
                ParseResult::Error { input, err } => return ParseResult::Error { input, err },
            }
        }
        ParseResult::Success {
            span: Span::new(input.index, cursor.index),
            input: cursor,
            value: out,
        }
    })
}

/// One or more repetitions of `p`. `None` if the first attempt doesn't match.
pub fn many1<'a, T: 'a>(p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a) -> BoxParser<'a, Vec<T>> {
    let inner = many0(p);
    Box::new(move |input: ParseInput<'a>| match inner(input) {
        ParseResult::Success { value, .. } if value.is_empty() => ParseResult::None,
        other => other,
    })
}

fn many_sep_min<'a, T: 'a, S: 'a>(
    min: usize,
    item: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    sep: impl Fn(ParseInput<'a>) -> ParseResult<'a, S> + 'a,
) -> BoxParser<'a, Vec<T>> {
    Box::new(move |input: ParseInput<'a>| {
        let mut cursor = input;
        let mut out = vec![];

        match item(cursor) {
            ParseResult::Success { input: next, value, .. } => {
                out.push(value);
                cursor = next;
            }
            ParseResult::None => {
                return if min == 0 {
                    ParseResult::Success {
                        span: Span::point(input.index),
                        input,
                        value: out,
                    }
                } else {
                    ParseResult::None
                }
            }
            ParseResult::Error { input, err } => return ParseResult::Error { input, err },
        }

        loop {
            let before_sep = cursor;
            match sep(cursor) {
                ParseResult::Success { input: after_sep, .. } => match item(after_sep) {
                    ParseResult::Success { input: next, value, .. } => {
                        out.push(value);
                        cursor = next;
                    }
                    ParseResult::None => {
                        cursor = before_sep;
                        break;
                    }
                    ParseResult::Error { input, err } => return ParseResult::Error { input, err },
                },
                ParseResult::None => break,
                ParseResult::Error { input, err } => return ParseResult::Error { input, err },
            }
        }

        if out.len() < min.max(1) && min > 1 && out.len() < min {
            return ParseResult::None;
        }

        ParseResult::Success {
            span: Span::new(input.index, cursor.index),
            input: cursor,
            value: out,
        }
    })
}

/// Zero or more `item`s interleaved with `sep`.
pub fn many_sep0<'a, T: 'a, S: 'a>(
    item: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    sep: impl Fn(ParseInput<'a>) -> ParseResult<'a, S> + 'a,
) -> BoxParser<'a, Vec<T>> {
    many_sep_min(0, item, sep)
}

/// One or more `item`s interleaved with `sep`.
pub fn many_sep1<'a, T: 'a, S: 'a>(
    item: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    sep: impl Fn(ParseInput<'a>) -> ParseResult<'a, S> + 'a,
) -> BoxParser<'a, Vec<T>> {
    many_sep_min(1, item, sep)
}

/// Two or more `item`s interleaved with `sep` (i.e. at least one separator
/// actually present). Used for binary-operator chains.
pub fn many_sep2<'a, T: 'a, S: 'a>(
    item: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    sep: impl Fn(ParseInput<'a>) -> ParseResult<'a, S> + 'a,
) -> BoxParser<'a, Vec<T>> {
    many_sep_min(2, item, sep)
}

/// Sequential composition of two parsers; the first failure/error wins.
pub fn tuple2<'a, A: 'a, B: 'a>(
    a: impl Fn(ParseInput<'a>) -> ParseResult<'a, A> + 'a,
    b: impl Fn(ParseInput<'a>) -> ParseResult<'a, B> + 'a,
) -> BoxParser<'a, (A, B)> {
    Box::new(move |input: ParseInput<'a>| match a(input) {
        ParseResult::Success { input: mid, value: va, .. } => match b(mid) {
            ParseResult::Success { input: end, value: vb, .. } => ParseResult::Success {
                span: Span::new(input.index, end.index),
                input: end,
                value: (va, vb),
            },
            ParseResult::None => ParseResult::None,
            ParseResult::Error { input, err } => ParseResult::Error { input, err },
        },
        ParseResult::None => ParseResult::None,
        ParseResult::Error { input, err } => ParseResult::Error { input, err },
    })
}

pub fn tuple3<'a, A: 'a, B: 'a, C: 'a>(
    a: impl Fn(ParseInput<'a>) -> ParseResult<'a, A> + 'a,
    b: impl Fn(ParseInput<'a>) -> ParseResult<'a, B> + 'a,
    c: impl Fn(ParseInput<'a>) -> ParseResult<'a, C> + 'a,
) -> BoxParser<'a, (A, B, C)> {
    let ab = tuple2(a, b);
    let abc = tuple2(ab, c);
    Box::new(move |input| {
        abc(input).map(|((va, vb), vc)| (va, vb, vc))
    })
}

pub fn tuple4<'a, A: 'a, B: 'a, C: 'a, D: 'a>(
    a: impl Fn(ParseInput<'a>) -> ParseResult<'a, A> + 'a,
    b: impl Fn(ParseInput<'a>) -> ParseResult<'a, B> + 'a,
    c: impl Fn(ParseInput<'a>) -> ParseResult<'a, C> + 'a,
    d: impl Fn(ParseInput<'a>) -> ParseResult<'a, D> + 'a,
) -> BoxParser<'a, (A, B, C, D)> {
    let abc = tuple3(a, b, c);
    let abcd = tuple2(abc, d);
    Box::new(move |input| abcd(input).map(|((va, vb, vc), vd)| (va, vb, vc, vd)))
}

/// Ordered choice: returns the first non-`None` result, including *errors*
/// (an error stops the search rather than falling through to the next
/// alternative -- it means a later alternative already committed).
pub fn one_of<'a, T: 'a>(parsers: Vec<BoxParser<'a, T>>) -> BoxParser<'a, T> {
    Box::new(move |input: ParseInput<'a>| {
        for p in &parsers {
            match p(input) {
                ParseResult::None => continue,
                other => return other,
            }
        }
        ParseResult::None
    })
}

/// Lift a `None` result to a successful `Option::None`, leaving input
/// untouched on non-match.
pub fn optional<'a, T: 'a>(p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a) -> BoxParser<'a, Option<T>> {
    Box::new(move |input: ParseInput<'a>| match p(input) {
        ParseResult::Success { input, span, value } => ParseResult::Success {
            input,
            span,
            value: Some(value),
        },
        ParseResult::None => ParseResult::Success {
            input,
            span: Span::point(input.index),
            value: None,
        },
        ParseResult::Error { input, err } => ParseResult::Error { input, err },
    })
}

/// Transform a successful value.
pub fn map<'a, T: 'a, U: 'a>(
    p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    f: impl Fn(T) -> U + 'a,
) -> BoxParser<'a, U> {
    Box::new(move |input: ParseInput<'a>| p(input).map(&f))
}

/// Keep only successes whose value satisfies `pred`; other successes become
/// `None` (they did not fail, but the constraint rejects this parse).
pub fn filter_value<'a, T: 'a>(
    p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    pred: impl Fn(&T) -> bool + 'a,
) -> BoxParser<'a, T> {
    Box::new(move |input: ParseInput<'a>| match p(input) {
        ParseResult::Success { input, span, value } => {
            if pred(&value) {
                ParseResult::Success { input, span, value }
            } else {
                ParseResult::None
            }
        }
        other => other,
    })
}

/// Run `q` against the substring `p` just matched, as a fresh sub-parse.
/// Used where a captured span needs a second grammar applied to its text
/// (e.g. re-parsing a numeric literal's digits with overflow checking).
pub fn sub_parser<'a, T: 'a, U: 'a>(
    p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    q: impl Fn(ParseInput<'a>) -> ParseResult<'a, U> + 'a,
) -> BoxParser<'a, U> {
    Box::new(move |input: ParseInput<'a>| match p(input) {
        ParseResult::Success { input: next, span, .. } => {
            let sub_input = ParseInput {
                source: span.text(input.source),
                index: 0,
            };
            match q(sub_input) {
                ParseResult::Success { value, .. } => ParseResult::Success {
                    input: next,
                    span,
                    value,
                },
                ParseResult::None => ParseResult::None,
                ParseResult::Error { err, .. } => ParseResult::Error { input: next, err },
            }
        }
        ParseResult::None => ParseResult::None,
        ParseResult::Error { input, err } => ParseResult::Error { input, err },
    })
}

/// Promote a `None` to a hard `Error` carrying `err`. Used past a commit
/// point, where the grammar is certain a construct was intended.
pub fn required<'a, T: 'a>(
    p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    message: impl Fn() -> String + 'a,
) -> BoxParser<'a, T> {
    Box::new(move |input: ParseInput<'a>| match p(input) {
        ParseResult::None => ParseResult::Error {
            input,
            err: ParseError::new(message(), Span::point(input.index)),
        },
        other => other,
    })
}

/// Greedily consume up to and including the literal `terminator`. Used as
/// the `recover` parser passed to [`backtrack`].
pub fn take_until<'a>(terminator: &'static str) -> BoxParser<'a, ()> {
    Box::new(move |input: ParseInput<'a>| {
        let mut cursor = input;
        loop {
            if cursor.rest().starts_with(terminator) {
                let end = cursor.advance_bytes(terminator.len());
                return ParseResult::Success {
                    span: Span::new(input.index, end.index),
                    input: end,
                    value: (),
                };
            }
            match any_char(cursor) {
                ParseResult::Success { input: next, .. } => cursor = next,
                _ => {
                    return ParseResult::Success {
                        span: Span::new(input.index, cursor.index),
                        input: cursor,
                        value: (),
                    }
                }
            }
        }
    })
}

/// If `inner` errors, consume up to a terminator with `recover` and emit a
/// broken-subtree value built by `make(message, span)` instead of
/// propagating the error -- one failed subexpression becomes a single
/// opaque node rather than derailing the enclosing parse.
pub fn backtrack<'a, T: 'a>(
    inner: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a,
    recover: impl Fn(ParseInput<'a>) -> ParseResult<'a, ()> + 'a,
    make: impl Fn(String, Span) -> T + 'a,
) -> BoxParser<'a, T> {
    Box::new(move |input: ParseInput<'a>| match inner(input) {
        ParseResult::Error { input: err_input, err } => match recover(err_input) {
            ParseResult::Success { input: after, .. } => ParseResult::Success {
                span: Span::new(input.index, after.index),
                input: after,
                value: make(err.message, Span::new(input.index, after.index)),
            },
            _ => ParseResult::Error { input: err_input, err },
        },
        other => other,
    })
}

/// Consume whitespace (no comment handling -- see [`crate::parser::comments`]
/// for comment-aware whitespace skipping used by the grammar proper).
pub fn whitespace<'a>(input: ParseInput<'a>) -> ParseResult<'a, ()> {
    take0::<'a>(|c| c.is_whitespace())(input).map(|_| ())
}

pub fn end_of_file<'a>(input: ParseInput<'a>) -> ParseResult<'a, ()> {
    if input.is_eof() {
        ParseResult::Success {
            span: Span::point(input.index),
            input,
            value: (),
        }
    } else {
        ParseResult::None
    }
}

/// Discard a parser's value, keeping only the fact that it matched.
pub fn drop_<'a, T: 'a>(p: impl Fn(ParseInput<'a>) -> ParseResult<'a, T> + 'a) -> BoxParser<'a, ()> {
    map(p, |_| ())
}

/// Identity of a memoised grammar rule, used as half of the memo key. Rust
/// closures have no stable identity of their own, so every memoised rule
/// gets a fixed enum variant instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    ExprMarkup,
    ExprAsCast,
    ExprNullish,
    ExprOr,
    ExprAnd,
    ExprEquality,
    ExprRelational,
    ExprAdditive,
    ExprMultiplicative,
    ExprChain,
    ExprSwitch,
    ExprIfElse,
    ExprFunction,
    ExprParenthesis,
    ExprObjectLiteral,
    ExprArrayLiteral,
    ExprLiteral,
    ExprIdentifier,
    TypeUnion,
    TypeGenericApplication,
    TypeGenericAbstraction,
    TypeFunction,
    TypeObjectLiteral,
    TypeArrayLiteral,
    TypeRange,
    TypeAtom,
    StatementLevel,
}

/// A single grammar rule's outcome at a given input position, recorded so a
/// later attempt at the same `(rule, position)` can be served from cache
/// instead of re-running the parser. Parse results in this crate always
/// produce a [`crate::ast::NodeId`] (an index into the arena, `Copy`), so
/// the cache never needs to clone arbitrary AST data -- replaying a cached
/// outcome is just handing back the same id and end offset.
#[derive(Clone, Copy)]
pub enum MemoOutcome {
    Success { node: crate::ast::NodeId, span: Span, end_index: usize },
    None,
}

/// The memoisation table: scoped to a single `parse_module` call, keyed by
/// `(RuleId, input.index)`, and discarded when that call returns.
#[derive(Default)]
pub struct MemoTable {
    cache: RefCell<HashMap<(RuleId, usize), MemoOutcome>>,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, rule: RuleId, index: usize) -> Option<MemoOutcome> {
        self.cache.borrow().get(&(rule, index)).copied()
    }

    pub fn insert(&self, rule: RuleId, index: usize, outcome: MemoOutcome) {
        self.cache.borrow_mut().insert((rule, index), outcome);
    }
}

/// Wrap a [`crate::ast::NodeId`]-producing rule parser with memoisation on
/// `(rule, input.index)`.
pub fn memo<'a>(
    rule: RuleId,
    table: &'a MemoTable,
    p: impl Fn(ParseInput<'a>) -> ParseResult<'a, crate::ast::NodeId> + 'a,
) -> BoxParser<'a, crate::ast::NodeId> {
    Box::new(move |input: ParseInput<'a>| {
        if let Some(cached) = table.get(rule, input.index) {
            crate::metrics::Metrics::record_memo_hit();
            return match cached {
                MemoOutcome::Success { node, span, end_index } => ParseResult::Success {
                    span,
                    input: ParseInput { source: input.source, index: end_index },
                    value: node,
                },
                MemoOutcome::None => ParseResult::None,
            };
        }

        crate::metrics::Metrics::record_memo_miss();
        let result = p(input);
        match &result {
            ParseResult::Success { input: next, span, value } => {
                table.insert(
                    rule,
                    input.index,
                    MemoOutcome::Success {
                        node: *value,
                        span: *span,
                        end_index: next.index,
                    },
                );
            }
            ParseResult::None => table.insert(rule, input.index, MemoOutcome::None),
            ParseResult::Error { .. } => {}
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_prefix() {
        let input = ParseInput::new("let x");
        match exact("let")(input) {
            ParseResult::Success { input, value, .. } => {
                assert_eq!(value, "let");
                assert_eq!(input.index, 3);
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn exact_none_on_mismatch() {
        let input = ParseInput::new("letter");
        match exact("let x")(input) {
            ParseResult::None => {}
            _ => panic!("expected none"),
        }
    }

    #[test]
    fn take1_requires_one_char() {
        let input = ParseInput::new("");
        match take1::<'_>(|c| c.is_ascii_digit())(input) {
            ParseResult::None => {}
            _ => panic!("expected none on empty input"),
        }
    }

    #[test]
    fn many_sep1_parses_interleaved_list() {
        let input = ParseInput::new("1,2,3");
        let digit = take1::<'_>(|c| c.is_ascii_digit());
        let comma = exact(",");
        match many_sep1(digit, comma)(input) {
            ParseResult::Success { value, input, .. } => {
                assert_eq!(value, vec!["1", "2", "3"]);
                assert!(input.is_eof());
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn one_of_tries_in_order() {
        let input = ParseInput::new("b");
        let p = one_of(vec![exact("a"), exact("b")]);
        match p(input) {
            ParseResult::Success { value, .. } => assert_eq!(value, "b"),
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn backtrack_recovers_with_broken_marker() {
        let input = ParseInput::new("bad) rest");
        let inner = required(exact::<'_>("ok"), || "expected ok".to_string());
        let recovered = backtrack(inner, take_until(")"), |msg, span| format!("<broken {msg} {span}>"));
        match recovered(input) {
            ParseResult::Success { value, input, .. } => {
                assert!(value.starts_with("<broken"));
                assert_eq!(input.rest(), " rest");
            }
            _ => panic!("expected recovered success"),
        }
    }

    #[test]
    fn take_until_stops_after_terminator() {
        let input = ParseInput::new("abc)def");
        match take_until(")")(input) {
            ParseResult::Success { input, .. } => assert_eq!(input.rest(), "def"),
            _ => panic!("expected success"),
        }
    }
}
