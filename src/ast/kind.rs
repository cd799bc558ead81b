//! The ~40 node shapes (component C): module, declaration, type-expression,
//! expression, statement, auxiliary.
//!
//! Every field that refers to another node is a [`NodeId`], never an owned
//! subtree -- all nodes live in one [`super::Ast`] arena.

use serde::{Deserialize, Serialize};

use super::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Nullish,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Nullish => "??",
        }
    }
}

/// The body of an if/else or switch case: either a bare expression (used
/// when the enclosing construct is an expression) or a statement block
/// (used when it's a statement). Carried inline rather than via its own
/// [`NodeId`] since it's pure structure, not a node in its own right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeBody {
    Expr(NodeId),
    Block(Vec<NodeId>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfElseCase {
    pub condition: NodeId,
    pub body: NodeBody,
}

/// `pattern` is `None` for the `default` case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    pub pattern: Option<NodeId>,
    pub body: NodeBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    // --- Module -----------------------------------------------------
    Module {
        declarations: Vec<NodeId>,
        trailing_comments: Vec<NodeId>,
    },

    // --- Declaration --------------------------------------------------
    ImportDeclaration {
        from: String,
        items: Vec<NodeId>,
        exported: bool,
    },
    TypeDeclaration {
        name: String,
        type_expr: NodeId,
        exported: bool,
    },
    VariableDeclaration {
        is_const: bool,
        name_and_type: NodeId,
        value: NodeId,
        exported: bool,
    },

    // --- TypeExpression ------------------------------------------------
    TypeofType {
        expr: NodeId,
    },
    FunctionType {
        params: Vec<NodeId>,
        return_type: Option<NodeId>,
    },
    UnionType {
        variants: Vec<NodeId>,
    },
    GenericAbstractionType {
        params: Vec<NodeId>,
        inner: NodeId,
    },
    GenericApplicationType {
        inner: NodeId,
        args: Vec<NodeId>,
    },
    ObjectType {
        entries: Vec<NodeId>,
        index_signature: Option<(NodeId, NodeId)>,
    },
    ArrayLiteralType {
        elements: Vec<NodeId>,
    },
    ArrayOfType {
        element: NodeId,
        length: Option<NodeId>,
    },
    PrimitiveType {
        primitive: PrimitiveKind,
    },
    RangeType {
        start: Option<NodeId>,
        end: Option<NodeId>,
    },
    StringLiteralType {
        value: String,
    },
    NumberLiteralType {
        value: f64,
    },
    BooleanLiteralType {
        value: bool,
    },
    NilLiteralType,
    NamedType {
        name: String,
    },

    // --- Expression -----------------------------------------------------
    PropertyAccessExpr {
        subject: NodeId,
        property: NodeId,
    },
    AsExpr {
        expr: NodeId,
        target_type: NodeId,
    },
    FunctionExpr {
        params: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: NodeBody,
        is_pure: bool,
        is_async: bool,
    },
    InvocationExpr {
        subject: NodeId,
        args: Vec<NodeId>,
        is_await: bool,
        is_detach: bool,
    },
    BinaryOperationExpr {
        left: NodeId,
        op: BinaryOp,
        right: NodeId,
    },
    SwitchExpr {
        subject: NodeId,
        cases: Vec<SwitchCase>,
    },
    IfElseExpr {
        cases: Vec<IfElseCase>,
        default: Option<NodeBody>,
    },
    MarkupExpr {
        tag: String,
        closing_tag: String,
        props: Vec<NodeId>,
        children: Vec<NodeId>,
    },
    ParenthesisExpr {
        inner: NodeId,
    },
    ObjectLiteralExpr {
        entries: Vec<NodeId>,
    },
    ArrayLiteralExpr {
        elements: Vec<NodeId>,
    },
    StringLiteralExpr {
        value: String,
    },
    NumberLiteralExpr {
        value: f64,
    },
    BooleanLiteralExpr {
        value: bool,
    },
    NilLiteralExpr,
    IdentifierExpr {
        name: String,
    },

    // --- Statement (only inside function bodies) -------------------------
    InvocationStatement {
        expr: NodeId,
    },
    VariableDeclarationStatement {
        is_const: bool,
        name_and_type: NodeId,
        value: NodeId,
    },
    AssignmentStatement {
        target: NodeId,
        value: NodeId,
    },
    ReturnStatement {
        value: Option<NodeId>,
    },
    SwitchStatement {
        subject: NodeId,
        cases: Vec<SwitchCase>,
    },
    IfElseStatement {
        cases: Vec<IfElseCase>,
        default: Option<Vec<NodeId>>,
    },
    ForLoopStatement {
        binding: NodeId,
        iterable: NodeId,
        body: Vec<NodeId>,
    },

    // --- Auxiliary --------------------------------------------------------
    KeyValue {
        key: NodeId,
        value: NodeId,
    },
    Spread {
        expr: NodeId,
    },
    NameAndType {
        name: String,
        type_expr: Option<NodeId>,
    },
    GenericTypeParameter {
        name: String,
        extends: Option<NodeId>,
    },
    ImportItem {
        name: String,
        alias: Option<String>,
    },
    PlainIdentifier {
        name: String,
    },
    Comment {
        text: String,
        is_block: bool,
    },
    Range {
        start: Option<NodeId>,
        end: Option<NodeId>,
    },

    /// Shared across expression/type-expression/statement positions: parser
    /// recovery produces one of these in place of whatever context required
    /// it.
    BrokenSubtree {
        message: String,
    },
}

impl NodeKind {
    /// Node ids this node directly references, in source order -- used by
    /// the parenting pass and by the generic walker (component E). The
    /// `parent` edge is deliberately excluded.
    pub fn children(&self) -> Vec<NodeId> {
        fn body_children(body: &NodeBody, out: &mut Vec<NodeId>) {
            match body {
                NodeBody::Expr(id) => out.push(*id),
                NodeBody::Block(stmts) => out.extend(stmts.iter().copied()),
            }
        }

        let mut out = Vec::new();
        match self {
            NodeKind::Module { declarations, trailing_comments } => {
                out.extend(declarations.iter().copied());
                out.extend(trailing_comments.iter().copied());
            }
            NodeKind::ImportDeclaration { items, .. } => out.extend(items.iter().copied()),
            NodeKind::TypeDeclaration { type_expr, .. } => out.push(*type_expr),
            NodeKind::VariableDeclaration { name_and_type, value, .. } => {
                out.push(*name_and_type);
                out.push(*value);
            }
            NodeKind::TypeofType { expr } => out.push(*expr),
            NodeKind::FunctionType { params, return_type } => {
                out.extend(params.iter().copied());
                out.extend(*return_type);
            }
            NodeKind::UnionType { variants } => out.extend(variants.iter().copied()),
            NodeKind::GenericAbstractionType { params, inner } => {
                out.extend(params.iter().copied());
                out.push(*inner);
            }
            NodeKind::GenericApplicationType { inner, args } => {
                out.push(*inner);
                out.extend(args.iter().copied());
            }
            NodeKind::ObjectType { entries, index_signature } => {
                out.extend(entries.iter().copied());
                if let Some((k, v)) = index_signature {
                    out.push(*k);
                    out.push(*v);
                }
            }
            NodeKind::ArrayLiteralType { elements } => out.extend(elements.iter().copied()),
            NodeKind::ArrayOfType { element, length } => {
                out.push(*element);
                out.extend(*length);
            }
            NodeKind::RangeType { start, end } => {
                out.extend(*start);
                out.extend(*end);
            }
            NodeKind::PropertyAccessExpr { subject, property } => {
                out.push(*subject);
                out.push(*property);
            }
            NodeKind::AsExpr { expr, target_type } => {
                out.push(*expr);
                out.push(*target_type);
            }
            NodeKind::FunctionExpr { params, return_type, body, .. } => {
                out.extend(params.iter().copied());
                out.extend(*return_type);
                body_children(body, &mut out);
            }
            NodeKind::InvocationExpr { subject, args, .. } => {
                out.push(*subject);
                out.extend(args.iter().copied());
            }
            NodeKind::BinaryOperationExpr { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::SwitchExpr { subject, cases } => {
                out.push(*subject);
                for case in cases {
                    out.extend(case.pattern);
                    body_children(&case.body, &mut out);
                }
            }
            NodeKind::IfElseExpr { cases, default } => {
                for case in cases {
                    out.push(case.condition);
                    body_children(&case.body, &mut out);
                }
                if let Some(body) = default {
                    body_children(body, &mut out);
                }
            }
            NodeKind::MarkupExpr { props, children, .. } => {
                out.extend(props.iter().copied());
                out.extend(children.iter().copied());
            }
            NodeKind::ParenthesisExpr { inner } => out.push(*inner),
            NodeKind::ObjectLiteralExpr { entries } => out.extend(entries.iter().copied()),
            NodeKind::ArrayLiteralExpr { elements } => out.extend(elements.iter().copied()),
            NodeKind::InvocationStatement { expr } => out.push(*expr),
            NodeKind::VariableDeclarationStatement { name_and_type, value, .. } => {
                out.push(*name_and_type);
                out.push(*value);
            }
            NodeKind::AssignmentStatement { target, value } => {
                out.push(*target);
                out.push(*value);
            }
            NodeKind::ReturnStatement { value } => out.extend(*value),
            NodeKind::SwitchStatement { subject, cases } => {
                out.push(*subject);
                for case in cases {
                    out.extend(case.pattern);
                    body_children(&case.body, &mut out);
                }
            }
            NodeKind::IfElseStatement { cases, default } => {
                for case in cases {
                    out.push(case.condition);
                    body_children(&case.body, &mut out);
                }
                if let Some(stmts) = default {
                    out.extend(stmts.iter().copied());
                }
            }
            NodeKind::ForLoopStatement { binding, iterable, body } => {
                out.push(*binding);
                out.push(*iterable);
                out.extend(body.iter().copied());
            }
            NodeKind::KeyValue { key, value } => {
                out.push(*key);
                out.push(*value);
            }
            NodeKind::Spread { expr } => out.push(*expr),
            NodeKind::NameAndType { type_expr, .. } => out.extend(*type_expr),
            NodeKind::GenericTypeParameter { extends, .. } => out.extend(*extends),
            NodeKind::Range { start, end } => {
                out.extend(*start);
                out.extend(*end);
            }

            // Leaves: no children.
            NodeKind::StringLiteralType { .. }
            | NodeKind::NumberLiteralType { .. }
            | NodeKind::BooleanLiteralType { .. }
            | NodeKind::NilLiteralType
            | NodeKind::NamedType { .. }
            | NodeKind::StringLiteralExpr { .. }
            | NodeKind::NumberLiteralExpr { .. }
            | NodeKind::BooleanLiteralExpr { .. }
            | NodeKind::NilLiteralExpr
            | NodeKind::IdentifierExpr { .. }
            | NodeKind::ImportItem { .. }
            | NodeKind::PlainIdentifier { .. }
            | NodeKind::Comment { .. }
            | NodeKind::PrimitiveType { .. }
            | NodeKind::BrokenSubtree { .. } => {}
        }
        out
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Module { .. } => "module",
            NodeKind::ImportDeclaration { .. } => "import-declaration",
            NodeKind::TypeDeclaration { .. } => "type-declaration",
            NodeKind::VariableDeclaration { .. } => "variable-declaration",
            NodeKind::TypeofType { .. } => "typeof-type",
            NodeKind::FunctionType { .. } => "function-type",
            NodeKind::UnionType { .. } => "union-type",
            NodeKind::GenericAbstractionType { .. } => "generic-abstraction-type",
            NodeKind::GenericApplicationType { .. } => "generic-application-type",
            NodeKind::ObjectType { .. } => "object-type",
            NodeKind::ArrayLiteralType { .. } => "array-literal-type",
            NodeKind::ArrayOfType { .. } => "array-of-type",
            NodeKind::PrimitiveType { .. } => "primitive-type",
            NodeKind::RangeType { .. } => "range-type",
            NodeKind::StringLiteralType { .. } => "string-literal-type",
            NodeKind::NumberLiteralType { .. } => "number-literal-type",
            NodeKind::BooleanLiteralType { .. } => "boolean-literal-type",
            NodeKind::NilLiteralType => "nil-literal-type",
            NodeKind::NamedType { .. } => "named-type",
            NodeKind::PropertyAccessExpr { .. } => "property-access-expr",
            NodeKind::AsExpr { .. } => "as-expr",
            NodeKind::FunctionExpr { .. } => "function-expr",
            NodeKind::InvocationExpr { .. } => "invocation-expr",
            NodeKind::BinaryOperationExpr { .. } => "binary-operation-expr",
            NodeKind::SwitchExpr { .. } => "switch-expr",
            NodeKind::IfElseExpr { .. } => "if-else-expr",
            NodeKind::MarkupExpr { .. } => "markup-expr",
            NodeKind::ParenthesisExpr { .. } => "parenthesis-expr",
            NodeKind::ObjectLiteralExpr { .. } => "object-literal-expr",
            NodeKind::ArrayLiteralExpr { .. } => "array-literal-expr",
            NodeKind::StringLiteralExpr { .. } => "string-literal-expr",
            NodeKind::NumberLiteralExpr { .. } => "number-literal-expr",
            NodeKind::BooleanLiteralExpr { .. } => "boolean-literal-expr",
            NodeKind::NilLiteralExpr => "nil-literal-expr",
            NodeKind::IdentifierExpr { .. } => "identifier-expr",
            NodeKind::InvocationStatement { .. } => "invocation-statement",
            NodeKind::VariableDeclarationStatement { .. } => "variable-declaration-statement",
            NodeKind::AssignmentStatement { .. } => "assignment-statement",
            NodeKind::ReturnStatement { .. } => "return-statement",
            NodeKind::SwitchStatement { .. } => "switch-statement",
            NodeKind::IfElseStatement { .. } => "if-else-statement",
            NodeKind::ForLoopStatement { .. } => "for-loop-statement",
            NodeKind::KeyValue { .. } => "key-value",
            NodeKind::Spread { .. } => "spread",
            NodeKind::NameAndType { .. } => "name-and-type",
            NodeKind::GenericTypeParameter { .. } => "generic-type-parameter",
            NodeKind::ImportItem { .. } => "import-item",
            NodeKind::PlainIdentifier { .. } => "plain-identifier",
            NodeKind::Comment { .. } => "comment",
            NodeKind::Range { .. } => "range",
            NodeKind::BrokenSubtree { .. } => "broken-subtree",
        }
    }
}
