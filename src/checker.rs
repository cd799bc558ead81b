//! `check(ast) -> Vec<Diagnostic>` (component H): single recursive-descent
//! traversal keyed by node kind, re-deriving a [`TypeContext`] at each
//! scope boundary from [`crate::scope`] rather than threading one top-down.
//!
//! Modeled on `Typechecker::check`'s traversal entry point and its
//! `TResult<T>` convention (`src/typechecker/mod.rs`), generalised to a
//! node-kind-keyed validation list.

use crate::ast::{Ast, BinaryOp, NodeBody, NodeId, NodeKind};
use crate::printer::display_type;
use crate::scope;
use crate::span::Span;
use crate::types::infer::{infer_type, infer_type_expected};
use crate::types::resolve::resolve_type;
use crate::types::simplify::simplify_type;
use crate::types::{globals, subsume, ArrayElement, ArrayShape, Type, TypeContext};

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticDetail {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub details: Vec<DiagnosticDetail>,
}

impl Diagnostic {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self { message: message.into(), span, details: Vec::new() }
    }

    fn with_details(message: impl Into<String>, span: Span, details: Vec<DiagnosticDetail>) -> Self {
        Self { message: message.into(), span, details }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {})", self.message, self.span)?;
        for detail in &self.details {
            write!(f, "\n  - {} (at {})", detail.message, detail.span)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

pub fn check(ast: &Ast) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    if let Some(root) = ast.root() {
        if let NodeKind::Module { declarations, .. } = &ast.node(root).kind {
            for decl in declarations {
                check_declaration(ast, *decl, &mut diags);
            }
        }
    }
    diags
}

/// Builds the `TypeContext` visible at `at`: every value/type binding
/// [`crate::scope`] reports, each mapped to its declared-or-inferred `Type`.
fn context_at(ast: &Ast, at: NodeId) -> TypeContext {
    let mut ctx = TypeContext::with_globals();
    for binding in scope::visible_value_bindings(ast, at) {
        let ty = value_binding_type(ast, &ctx, &binding);
        ctx.value_scope.insert(binding.name, ty);
    }
    for binding in scope::visible_type_bindings(ast, at) {
        // Generic parameters stay unresolved in `typeScope` until a
        // generic-application substitutes them (see simplify::GenericApplication);
        // inserting a self-referential `NamedType(name)` here would spin
        // `simplifyType`'s named-type lookup forever.
        if matches!(ast.node(binding.declared_at).kind, NodeKind::GenericTypeParameter { .. }) {
            continue;
        }
        let ty = type_binding_type(ast, &ctx, &binding);
        ctx.type_scope.insert(binding.name, ty);
    }
    ctx
}

fn value_binding_type(ast: &Ast, ctx: &TypeContext, binding: &scope::ValueBinding) -> Type {
    match &ast.node(binding.declared_at).kind {
        NodeKind::VariableDeclaration { name_and_type, value, .. }
        | NodeKind::VariableDeclarationStatement { name_and_type, value, .. } => {
            declared_or_inferred_type(ast, ctx, *name_and_type, *value)
        }
        NodeKind::NameAndType { type_expr: Some(t), .. } => resolve_type(ctx, ast, *t),
        NodeKind::NameAndType { type_expr: None, .. } => Type::Unknown,
        _ => Type::Unknown,
    }
}

fn type_binding_type(ast: &Ast, ctx: &TypeContext, binding: &scope::TypeBinding) -> Type {
    match &ast.node(binding.declared_at).kind {
        NodeKind::TypeDeclaration { type_expr, .. } => resolve_type(ctx, ast, *type_expr),
        _ => Type::Unknown,
    }
}

fn declared_or_inferred_type(ast: &Ast, ctx: &TypeContext, name_and_type: NodeId, value: NodeId) -> Type {
    match &ast.node(name_and_type).kind {
        NodeKind::NameAndType { type_expr: Some(t), .. } => resolve_type(ctx, ast, *t),
        _ => infer_type(ctx, ast, value),
    }
}

fn check_declaration(ast: &Ast, id: NodeId, diags: &mut Vec<Diagnostic>) {
    match &ast.node(id).kind {
        NodeKind::ImportDeclaration { .. } => {}
        NodeKind::TypeDeclaration { type_expr, .. } => check_type_expr(ast, *type_expr, diags),
        NodeKind::VariableDeclaration { name_and_type, value, .. } => {
            let ctx = context_at(ast, id);
            check_variable_decl(ast, &ctx, *name_and_type, *value, diags);
        }
        _ => {}
    }
}

/// **variable-declaration** / **variable-declaration-statement**: if a declared type is present, the RHS must infer to a subtype.
fn check_variable_decl(ast: &Ast, ctx: &TypeContext, name_and_type: NodeId, value: NodeId, diags: &mut Vec<Diagnostic>) {
    let declared = match &ast.node(name_and_type).kind {
        NodeKind::NameAndType { type_expr: Some(t), .. } => Some(resolve_type(ctx, ast, *t)),
        _ => None,
    };
    if let Some(declared_ty) = &declared {
        let declared_s = simplify_type(ctx, declared_ty);
        let rhs_s = simplify_type(ctx, &infer_type_expected(ctx, ast, value, Some(declared_ty)));
        let mut issues = subsume::subsumation_issues(ctx, &declared_s, &rhs_s);
        if !issues.is_empty() {
            // Tuple arity shortfall gets its own spec-mandated wording as the
            // primary message, rather than the generic "Can't assign" wrapper.
            let is_tuple_shortfall = matches!(
                (&declared_s, &rhs_s),
                (Type::Array(ArrayShape::Tuple(to_items)), Type::Array(ArrayShape::Tuple(from_items)))
                    if from_items.len() < to_items.len()
            );
            let message = if is_tuple_shortfall {
                issues.remove(0)
            } else {
                format!("Can't assign {} into {}", display_type(&rhs_s), display_type(&declared_s))
            };
            let details = issues.into_iter().map(|message| DiagnosticDetail { message, span: ast.span_of(value) }).collect();
            diags.push(Diagnostic::with_details(message, ast.span_of(value), details));
        }
    }
    check_expr(ctx, ast, value, diags);
    if let NodeKind::NameAndType { type_expr: Some(t), .. } = &ast.node(name_and_type).kind {
        check_type_expr(ast, *t, diags);
    }
}

fn check_body(ctx: &TypeContext, ast: &Ast, body: &NodeBody, diags: &mut Vec<Diagnostic>) {
    match body {
        NodeBody::Expr(e) => check_expr(ctx, ast, *e, diags),
        NodeBody::Block(stmts) => {
            for s in stmts {
                check_stmt(ctx, ast, *s, diags);
            }
        }
    }
}

fn check_expr(ctx: &TypeContext, ast: &Ast, id: NodeId, diags: &mut Vec<Diagnostic>) {
    match &ast.node(id).kind {
        NodeKind::StringLiteralExpr { .. }
        | NodeKind::NumberLiteralExpr { .. }
        | NodeKind::BooleanLiteralExpr { .. }
        | NodeKind::NilLiteralExpr => {}

        // **local-identifier**: must resolve in the applicable scope.
        NodeKind::IdentifierExpr { name } => {
            if scope::resolve_value(ast, id, name).is_none() && globals::lookup(name).is_none() {
                diags.push(Diagnostic::new(format!("Cannot find name '{name}'"), ast.span_of(id)));
            }
        }

        // **property-access**: `from` must have a keys-type subsuming `property`.
        NodeKind::PropertyAccessExpr { subject, property } => {
            check_expr(ctx, ast, *subject, diags);
            check_expr(ctx, ast, *property, diags);
            let subject_ty = simplify_type(ctx, &infer_type(ctx, ast, *subject));
            let property_ty = simplify_type(ctx, &infer_type(ctx, ast, *property));
            let keys = simplify_type(ctx, &Type::KeysType(Box::new(subject_ty.clone())));
            if !subsume::subsumes(ctx, &keys, &property_ty) {
                let message = match &property_ty {
                    Type::String { value: Some(name) } => {
                        format!("Property {name} doesn't exist on type {}", display_type(&subject_ty))
                    }
                    _ => format!("Index {} doesn't exist on type {}", display_type(&property_ty), display_type(&subject_ty)),
                };
                diags.push(Diagnostic::new(message, ast.span_of(id)));
            }
        }

        // **as-expression**: cast target must be subsumed by or contain the source.
        NodeKind::AsExpr { expr, target_type } => {
            check_expr(ctx, ast, *expr, diags);
            check_type_expr(ast, *target_type, diags);
            let target = simplify_type(ctx, &resolve_type(ctx, ast, *target_type));
            let source = simplify_type(ctx, &infer_type(ctx, ast, *expr));
            if !subsume::subsumes(ctx, &target, &source) && !subsume::subsumes(ctx, &source, &target) {
                diags.push(Diagnostic::new(
                    format!("Cannot cast {} as {}", display_type(&source), display_type(&target)),
                    ast.span_of(id),
                ));
            }
        }

        // **function-expression**: body type must be subsumed by a declared return type.
        NodeKind::FunctionExpr { params, return_type, body, .. } => {
            let inner_ctx = context_at(ast, id);
            for p in params {
                if let NodeKind::NameAndType { type_expr: Some(t), .. } = &ast.node(*p).kind {
                    check_type_expr(ast, *t, diags);
                }
            }
            check_body(&inner_ctx, ast, body, diags);
            if let Some(rt) = return_type {
                check_type_expr(ast, *rt, diags);
                let declared = simplify_type(&inner_ctx, &resolve_type(&inner_ctx, ast, *rt));
                let body_ty = simplify_type(
                    &inner_ctx,
                    &match body {
                        NodeBody::Expr(e) => infer_type(&inner_ctx, ast, *e),
                        NodeBody::Block(_) => Type::Nil,
                    },
                );
                if !subsume::subsumes(&inner_ctx, &declared, &body_ty) {
                    diags.push(Diagnostic::new(
                        format!("Function body has type {} but declared return type is {}", display_type(&body_ty), display_type(&declared)),
                        body_span(ast, body),
                    ));
                }
            }
        }

        // **invocation**: subject must be a function; argument subsumption; await/detach discipline.
        NodeKind::InvocationExpr { subject, args, is_await, is_detach } => {
            check_expr(ctx, ast, *subject, diags);
            for a in args {
                check_expr(ctx, ast, *a, diags);
            }
            let subject_ty = simplify_type(ctx, &infer_type(ctx, ast, *subject));
            match &subject_ty {
                Type::Function { params, .. } => {
                    let params_tuple = Type::Array(ArrayShape::Tuple(params.iter().map(|p| ArrayElement::Item(p.ty.clone())).collect()));
                    let args_tuple = Type::Array(ArrayShape::Tuple(
                        args.iter().map(|a| ArrayElement::Item(simplify_type(ctx, &infer_type(ctx, ast, *a)))).collect(),
                    ));
                    let issues = subsume::subsumation_issues(ctx, &params_tuple, &args_tuple);
                    if !issues.is_empty() {
                        let details = issues[1..].iter().map(|m| DiagnosticDetail { message: m.clone(), span: ast.span_of(id) }).collect();
                        diags.push(Diagnostic::with_details(issues[0].clone(), ast.span_of(id), details));
                    }
                }
                Type::Poisoned | Type::Unknown => {}
                other => diags.push(Diagnostic::new(format!("Cannot invoke a value of type {}", display_type(other)), ast.span_of(*subject))),
            }
            if let Some(is_async) = async_of(ast, *subject) {
                if is_async && !*is_await && !*is_detach {
                    diags.push(Diagnostic::new("Async call must be awaited or detached", ast.span_of(id)));
                }
                if !is_async && (*is_await || *is_detach) {
                    diags.push(Diagnostic::new("Cannot await or detach a non-async call", ast.span_of(id)));
                }
            }
            if *is_detach {
                let in_statement_position =
                    matches!(ast.node(id).parent.map(|p| &ast.node(p).kind), Some(NodeKind::InvocationStatement { .. }));
                if !in_statement_position {
                    diags.push(Diagnostic::new("detach is forbidden in expression context", ast.span_of(id)));
                }
            }
        }

        // **binary-operation**: the simplified result must not be poisoned.
        NodeKind::BinaryOperationExpr { left, op, right } => {
            check_expr(ctx, ast, *left, diags);
            check_expr(ctx, ast, *right, diags);
            let left_ty = simplify_type(ctx, &infer_type(ctx, ast, *left));
            let right_ty = simplify_type(ctx, &infer_type(ctx, ast, *right));
            let result = simplify_type(ctx, &Type::BinaryOperationType { left: Box::new(left_ty.clone()), op: *op, right: Box::new(right_ty.clone()) });
            if result.is_poisoned() {
                diags.push(Diagnostic::new(
                    format!("Operator '{}' cannot be applied to types {} and {}", BinaryOp::as_str(*op), display_type(&left_ty), display_type(&right_ty)),
                    ast.span_of(id),
                ));
            }
        }

        NodeKind::SwitchExpr { subject, cases } => {
            check_expr(ctx, ast, *subject, diags);
            for case in cases {
                if let Some(p) = case.pattern {
                    check_expr(ctx, ast, p, diags);
                }
                check_body(ctx, ast, &case.body, diags);
            }
        }

        // Redundant-conditional diagnostics apply only to the statement form
        // (see `IfElseStatement` below) -- scenario S3 requires that a
        // literally-true condition on the *expression* form (the sanctioned
        // idiom for literal-driven type selection) produce no diagnostics.
        NodeKind::IfElseExpr { cases, default } => {
            for case in cases {
                check_expr(ctx, ast, case.condition, diags);
                check_body(ctx, ast, &case.body, diags);
            }
            if let Some(body) = default {
                check_body(ctx, ast, body, diags);
            }
        }

        // **markup-expression**: opening and closing tag identifiers must match.
        NodeKind::MarkupExpr { tag, closing_tag, props, children } => {
            if tag != closing_tag {
                diags.push(Diagnostic::new(format!("Mismatched closing tag: expected </{tag}>, found </{closing_tag}>"), ast.span_of(id)));
            }
            for p in props {
                match &ast.node(*p).kind {
                    NodeKind::KeyValue { value, .. } => check_expr(ctx, ast, *value, diags),
                    _ => check_expr(ctx, ast, *p, diags),
                }
            }
            for c in children {
                check_expr(ctx, ast, *c, diags);
            }
        }

        NodeKind::ParenthesisExpr { inner } => check_expr(ctx, ast, *inner, diags),

        NodeKind::ObjectLiteralExpr { entries } => {
            for e in entries {
                match &ast.node(*e).kind {
                    NodeKind::Spread { expr } => check_expr(ctx, ast, *expr, diags),
                    // The key is a bare name, not a value reference -- don't
                    // run local-identifier resolution against it.
                    NodeKind::KeyValue { value, .. } => check_expr(ctx, ast, *value, diags),
                    _ => {}
                }
            }
        }

        NodeKind::ArrayLiteralExpr { elements } => {
            for e in elements {
                match &ast.node(*e).kind {
                    NodeKind::Spread { expr } => check_expr(ctx, ast, *expr, diags),
                    _ => check_expr(ctx, ast, *e, diags),
                }
            }
        }

        // **broken-subtree**: surface its stored error.
        NodeKind::BrokenSubtree { message } => diags.push(Diagnostic::new(message.clone(), ast.span_of(id))),

        _ => {}
    }
}

fn check_stmt(ctx: &TypeContext, ast: &Ast, id: NodeId, diags: &mut Vec<Diagnostic>) {
    match &ast.node(id).kind {
        NodeKind::InvocationStatement { expr } => check_expr(ctx, ast, *expr, diags),

        NodeKind::VariableDeclarationStatement { name_and_type, value, .. } => {
            let local_ctx = context_at(ast, id);
            check_variable_decl(ast, &local_ctx, *name_and_type, *value, diags);
        }

        // **assignment-statement**: target must be a mutable value identifier
        // or a property access; constants and function parameters rejected.
        NodeKind::AssignmentStatement { target, value } => {
            check_expr(ctx, ast, *value, diags);
            check_assignment_target(ast, *target, diags);
            let target_ty = simplify_type(ctx, &infer_type(ctx, ast, *target));
            let value_ty = simplify_type(ctx, &infer_type(ctx, ast, *value));
            if !subsume::subsumes(ctx, &target_ty, &value_ty) {
                diags.push(Diagnostic::new(
                    format!("Can't assign {} into {}", display_type(&value_ty), display_type(&target_ty)),
                    ast.span_of(*value),
                ));
            }
        }

        NodeKind::ReturnStatement { value } => {
            if let Some(v) = value {
                check_expr(ctx, ast, *v, diags);
            }
        }

        NodeKind::SwitchStatement { subject, cases } => {
            check_expr(ctx, ast, *subject, diags);
            for case in cases {
                if let Some(p) = case.pattern {
                    check_expr(ctx, ast, p, diags);
                }
                check_body(ctx, ast, &case.body, diags);
            }
        }

        // **if-else**: each branch condition must not be statically true or false.
        NodeKind::IfElseStatement { cases, default } => {
            for case in cases {
                check_expr(ctx, ast, case.condition, diags);
                let cond_ty = simplify_type(ctx, &infer_type(ctx, ast, case.condition));
                if cond_ty == Type::boolean_literal(true) || cond_ty == Type::boolean_literal(false) {
                    diags.push(Diagnostic::new("Conditional is redundant", ast.span_of(case.condition)));
                }
                check_body(ctx, ast, &case.body, diags);
            }
            if let Some(stmts) = default {
                for s in stmts {
                    check_stmt(ctx, ast, *s, diags);
                }
            }
        }

        NodeKind::ForLoopStatement { iterable, body, .. } => {
            // only `module` and `function-expression` are scope-bearing
            // ancestors; the loop binding is not separately resolvable, so
            // the body is checked under the enclosing scope.
            check_expr(ctx, ast, *iterable, diags);
            for s in body {
                check_stmt(ctx, ast, *s, diags);
            }
        }

        NodeKind::BrokenSubtree { message } => diags.push(Diagnostic::new(message.clone(), ast.span_of(id))),

        _ => {}
    }
}

fn check_assignment_target(ast: &Ast, target: NodeId, diags: &mut Vec<Diagnostic>) {
    match &ast.node(target).kind {
        NodeKind::IdentifierExpr { name } => match scope::resolve_value(ast, target, name) {
            Some(binding) => {
                if matches!(ast.node(binding.declared_at).kind, NodeKind::NameAndType { .. }) {
                    diags.push(Diagnostic::new(format!("Cannot assign to function parameter '{name}'"), ast.span_of(target)));
                } else if binding.is_const {
                    diags.push(Diagnostic::new(format!("Cannot assign to constant '{name}'"), ast.span_of(target)));
                }
            }
            None => diags.push(Diagnostic::new(format!("Cannot find name '{name}'"), ast.span_of(target))),
        },
        NodeKind::PropertyAccessExpr { .. } => {}
        _ => diags.push(Diagnostic::new("Invalid assignment target", ast.span_of(target))),
    }
}

/// Best-effort "is the callee an async function" check. The `Type` model
/// doesn't carry async-ness, so
/// this inspects the underlying `function-expression` syntax directly when
/// it's reachable in one hop; anything further (a parameter of function
/// type, a re-exported import) is treated as indeterminate and skipped
/// rather than risking a false diagnostic.
fn async_of(ast: &Ast, subject: NodeId) -> Option<bool> {
    match &ast.node(subject).kind {
        NodeKind::FunctionExpr { is_async, .. } => Some(*is_async),
        NodeKind::IdentifierExpr { name } => {
            let binding = scope::resolve_value(ast, subject, name)?;
            match &ast.node(binding.declared_at).kind {
                NodeKind::VariableDeclaration { value, .. } | NodeKind::VariableDeclarationStatement { value, .. } => {
                    match &ast.node(*value).kind {
                        NodeKind::FunctionExpr { is_async, .. } => Some(*is_async),
                        _ => None,
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn body_span(ast: &Ast, body: &NodeBody) -> Span {
    match body {
        NodeBody::Expr(e) => ast.span_of(*e),
        NodeBody::Block(stmts) => stmts.first().map(|s| ast.span_of(*s)).unwrap_or(Span::point(0)),
    }
}

fn check_type_expr(ast: &Ast, id: NodeId, diags: &mut Vec<Diagnostic>) {
    match &ast.node(id).kind {
        NodeKind::NamedType { name } => {
            if scope::resolve_type(ast, id, name).is_none() {
                diags.push(Diagnostic::new(format!("Cannot find type '{name}'"), ast.span_of(id)));
            }
        }

        NodeKind::TypeofType { expr } => check_expr(&context_at(ast, id), ast, *expr, diags),

        NodeKind::FunctionType { params, return_type } => {
            for p in params {
                if let NodeKind::NameAndType { type_expr: Some(t), .. } = &ast.node(*p).kind {
                    check_type_expr(ast, *t, diags);
                }
            }
            if let Some(rt) = return_type {
                check_type_expr(ast, *rt, diags);
            }
        }

        NodeKind::UnionType { variants } => {
            for v in variants {
                check_type_expr(ast, *v, diags);
            }
        }

        NodeKind::GenericAbstractionType { params, inner } => {
            for p in params {
                if let NodeKind::GenericTypeParameter { extends: Some(e), .. } = &ast.node(*p).kind {
                    check_type_expr(ast, *e, diags);
                }
            }
            check_type_expr(ast, *inner, diags);
        }

        // **parameterized-type**: inner must simplify to a generic-type;
        // each argument must satisfy the corresponding `extends` bound.
        NodeKind::GenericApplicationType { inner, args } => {
            check_type_expr(ast, *inner, diags);
            for a in args {
                check_type_expr(ast, *a, diags);
            }
            check_generic_application(ast, id, *inner, args, diags);
        }

        // **object-literal** in type context: bare identifier entries are forbidden.
        NodeKind::ObjectType { entries, index_signature } => {
            for e in entries {
                match &ast.node(*e).kind {
                    NodeKind::KeyValue { value, .. } => check_type_expr(ast, *value, diags),
                    NodeKind::PlainIdentifier { name } | NodeKind::IdentifierExpr { name } => {
                        diags.push(Diagnostic::new(
                            format!("Bare identifier '{name}' is not allowed in a type position; write '{name}: <type>'"),
                            ast.span_of(*e),
                        ));
                    }
                    _ => {}
                }
            }
            if let Some((k, v)) = index_signature {
                check_type_expr(ast, *k, diags);
                check_type_expr(ast, *v, diags);
            }
        }

        NodeKind::ArrayLiteralType { elements } => {
            for e in elements {
                match &ast.node(*e).kind {
                    NodeKind::Spread { expr } => check_type_expr(ast, *expr, diags),
                    _ => check_type_expr(ast, *e, diags),
                }
            }
        }

        NodeKind::ArrayOfType { element, .. } => check_type_expr(ast, *element, diags),

        // **range**: `start <= end` when both present.
        NodeKind::RangeType { start: Some(s), end: Some(e) } => {
            let s_val = literal_number(ast, *s);
            let e_val = literal_number(ast, *e);
            if s_val > e_val {
                diags.push(Diagnostic::new(format!("Range start {s_val} must be <= end {e_val}"), ast.span_of(id)));
            }
        }

        _ => {}
    }
}

fn check_generic_application(ast: &Ast, id: NodeId, inner: NodeId, args: &[NodeId], diags: &mut Vec<Diagnostic>) {
    let ctx = context_at(ast, id);
    let inner_ty = simplify_type(&ctx, &resolve_type(&ctx, ast, inner));
    match inner_ty {
        Type::GenericAbstraction { params, .. } => {
            if params.len() != args.len() {
                diags.push(Diagnostic::new(
                    format!("Generic type expects {} argument(s), found {} (TODO: arity)", params.len(), args.len()),
                    ast.span_of(id),
                ));
            }
            for (param, arg_id) in params.iter().zip(args.iter()) {
                if let Some(bound) = &param.extends {
                    let arg_ty = simplify_type(&ctx, &resolve_type(&ctx, ast, *arg_id));
                    if !subsume::subsumes(&ctx, bound, &arg_ty) {
                        diags.push(Diagnostic::new(
                            format!("{} does not satisfy the bound {}", display_type(&arg_ty), display_type(bound)),
                            ast.span_of(*arg_id),
                        ));
                    }
                }
            }
        }
        Type::Poisoned => {}
        other => diags.push(Diagnostic::new(format!("{} is not a generic type", display_type(&other)), ast.span_of(id))),
    }
}

fn literal_number(ast: &Ast, id: NodeId) -> f64 {
    match &ast.node(id).kind {
        NodeKind::NumberLiteralType { value } | NodeKind::NumberLiteralExpr { value } => *value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ast, NodeBody, NodeKind, PrimitiveKind};

    /// S2: `const x: number = 'hello world'` produces exactly one diagnostic.
    #[test]
    fn mismatched_declared_type_is_one_diagnostic() {
        let mut ast = Ast::new("const x: number = 'hello world'");
        let ty = ast.push(Span::new(9, 15), NodeKind::PrimitiveType { primitive: PrimitiveKind::Number });
        let name_and_type = ast.push(Span::new(6, 15), NodeKind::NameAndType { name: "x".into(), type_expr: Some(ty) });
        let value = ast.push(Span::new(18, 31), NodeKind::StringLiteralExpr { value: "hello world".into() });
        let decl = ast.push(
            Span::new(0, 31),
            NodeKind::VariableDeclaration { is_const: true, name_and_type, value, exported: false },
        );
        let module = ast.push(Span::new(0, 31), NodeKind::Module { declarations: vec![decl], trailing_comments: vec![] });
        ast.set_root(module);
        ast.run_parenting_pass();

        let diags = check(&ast);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Can't assign 'hello world' into number");
    }

    /// S1: `const x: number = 12` produces no diagnostics.
    #[test]
    fn matching_declared_type_is_clean() {
        let mut ast = Ast::new("const x: number = 12");
        let ty = ast.push(Span::new(9, 15), NodeKind::PrimitiveType { primitive: PrimitiveKind::Number });
        let name_and_type = ast.push(Span::new(6, 15), NodeKind::NameAndType { name: "x".into(), type_expr: Some(ty) });
        let value = ast.push(Span::new(18, 20), NodeKind::NumberLiteralExpr { value: 12.0 });
        let decl = ast.push(
            Span::new(0, 20),
            NodeKind::VariableDeclaration { is_const: true, name_and_type, value, exported: false },
        );
        let module = ast.push(Span::new(0, 20), NodeKind::Module { declarations: vec![decl], trailing_comments: vec![] });
        ast.set_root(module);
        ast.run_parenting_pass();

        assert!(check(&ast).is_empty());
    }

    /// S4: `if false { 12 } else { 'foo' }` keeps the union, so assigning it
    /// into `number` still produces exactly one diagnostic.
    #[test]
    fn if_else_union_rejected_against_narrower_declared_type() {
        let mut ast = Ast::new("const x: number = if false { 12 } else { 'foo' }");
        let ty = ast.push(Span::point(9), NodeKind::PrimitiveType { primitive: PrimitiveKind::Number });
        let name_and_type = ast.push(Span::point(6), NodeKind::NameAndType { name: "x".into(), type_expr: Some(ty) });
        let cond = ast.push(Span::point(22), NodeKind::BooleanLiteralExpr { value: false });
        let then_lit = ast.push(Span::point(29), NodeKind::NumberLiteralExpr { value: 12.0 });
        let else_lit = ast.push(Span::point(43), NodeKind::StringLiteralExpr { value: "foo".into() });
        let if_else = ast.push(
            Span::new(18, 49),
            NodeKind::IfElseExpr {
                cases: vec![crate::ast::IfElseCase { condition: cond, body: NodeBody::Expr(then_lit) }],
                default: Some(NodeBody::Expr(else_lit)),
            },
        );
        let decl = ast.push(
            Span::new(0, 49),
            NodeKind::VariableDeclaration { is_const: true, name_and_type, value: if_else, exported: false },
        );
        let module = ast.push(Span::new(0, 49), NodeKind::Module { declarations: vec![decl], trailing_comments: vec![] });
        ast.set_root(module);
        ast.run_parenting_pass();

        let diags = check(&ast);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.starts_with("Can't assign"));
    }

    /// Unresolved identifiers are flagged by the local-identifier validation.
    #[test]
    fn unresolved_identifier_is_flagged() {
        let mut ast = Ast::new("const x = y");
        let rhs = ast.push(Span::new(10, 11), NodeKind::IdentifierExpr { name: "y".into() });
        let name_and_type = ast.push(Span::point(6), NodeKind::NameAndType { name: "x".into(), type_expr: None });
        let decl = ast.push(
            Span::new(0, 11),
            NodeKind::VariableDeclaration { is_const: true, name_and_type, value: rhs, exported: false },
        );
        let module = ast.push(Span::new(0, 11), NodeKind::Module { declarations: vec![decl], trailing_comments: vec![] });
        ast.set_root(module);
        ast.run_parenting_pass();

        let diags = check(&ast);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Cannot find name 'y'");
    }

    /// `if true {} else {}` used as a *statement* is flagged redundant,
    /// unlike the expression form (see S3, exercised at the simplify layer).
    #[test]
    fn redundant_conditional_statement_is_flagged() {
        let mut ast = Ast::new("");
        let cond = ast.push(Span::point(0), NodeKind::BooleanLiteralExpr { value: true });
        let stmt = ast.push(
            Span::point(0),
            NodeKind::IfElseStatement {
                cases: vec![crate::ast::IfElseCase { condition: cond, body: NodeBody::Block(vec![]) }],
                default: Some(vec![]),
            },
        );
        let func = ast.push(
            Span::point(0),
            NodeKind::FunctionExpr {
                params: vec![],
                return_type: None,
                body: NodeBody::Block(vec![stmt]),
                is_pure: false,
                is_async: false,
            },
        );
        let module = ast.push(Span::point(0), NodeKind::Module { declarations: vec![], trailing_comments: vec![] });
        ast.set_root(module);
        ast.run_parenting_pass();

        let ctx = context_at(&ast, func);
        let mut diags = Vec::new();
        check_expr(&ctx, &ast, func, &mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Conditional is redundant");
    }
}
