//! Arena-based AST (component C).
//!
//! A single [`Ast`] owns every [`Node`] produced by [`crate::parser`] for one
//! module, addressed by [`NodeId`]. The `child -> parent` cycle is broken
//! with indices into a `Vec`, `parent` stored as `Option<NodeId>`, rather
//! than `Rc<RefCell<Weak<_>>>` back-edges.

pub mod kind;

pub use kind::{BinaryOp, IfElseCase, NodeBody, NodeKind, PrimitiveKind, SwitchCase};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// An index into an [`Ast`]'s node arena. `Copy`, cheap to pass around --
/// this is exactly the property the arena design buys over owned recursive
/// enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub preceding_comments: Vec<NodeId>,
    pub kind: NodeKind,
}

/// Owns every node parsed from one module's source text, plus the text
/// itself -- the single handle spans reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ast {
    pub source: String,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Allocate a node and return its id. Callers build children first
    /// (bottom-up), so a child's id is always smaller than its parent's.
    pub fn push(&mut self, span: Span, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            span,
            parent: None,
            preceding_comments: Vec::new(),
            kind,
        });
        id
    }

    pub fn attach_preceding_comments(&mut self, id: NodeId, comments: Vec<NodeId>) {
        self.node_mut(id).preceding_comments = comments;
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn span_of(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn text_of(&self, id: NodeId) -> &str {
        self.node(id).span.text(&self.source)
    }

    /// Walk outward from `at`, yielding `at` itself then each ancestor in
    /// turn, stopping at the root. Used by the scope resolver (component
    /// F) -- this is the "must not be followed during generic walks"
    /// `parent` edge, followed deliberately here.
    pub fn ancestors(&self, at: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = Some(at);
        std::iter::from_fn(move || {
            let this = current?;
            current = self.node(this).parent;
            Some(this)
        })
    }

    /// Re-run the parenting pass: for every node reachable from the root,
    /// set each child's `parent` if unset. Running this twice on an
    /// already-parented tree is a no-op because already-set `parent` edges
    /// are never overwritten.
    pub fn run_parenting_pass(&mut self) {
        let Some(root) = self.root else { return };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let children = self.node(id).kind.children();
            for child in &children {
                if self.node(*child).parent.is_none() {
                    self.node_mut(*child).parent = Some(id);
                }
                stack.push(*child);
            }
        }
    }

    /// Generic pre-order visit over the whole tree from `at`, skipping the
    /// `parent` back-edge (component E uses this for `find_node_at`).
    pub fn walk(&self, at: NodeId, visit: &mut impl FnMut(NodeId)) {
        visit(at);
        for child in self.node(at).kind.children() {
            self.walk(child, visit);
        }
    }

    /// Verify invariant 1 (span coverage) and invariant 3 (child spans
    /// nested and in source order) for the subtree rooted at `at`. Intended
    /// for tests and debug assertions, not the hot path.
    pub fn check_span_invariants(&self, at: NodeId) -> Result<(), String> {
        let node = self.node(at);
        let mut prev_end = node.span.start;
        for child in node.kind.children() {
            let child_span = self.node(child).span;
            if child_span.start < node.span.start || child_span.end > node.span.end {
                return Err(format!(
                    "child {child} span {child_span} escapes parent {at} span {}",
                    node.span
                ));
            }
            if child_span.start < prev_end {
                return Err(format!("child {child} out of source order under {at}"));
            }
            prev_end = child_span.end;
            self.check_span_invariants(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_ast() -> (Ast, NodeId, NodeId) {
        let mut ast = Ast::new("12");
        let lit = ast.push(Span::new(0, 2), NodeKind::NumberLiteralExpr { value: 12.0 });
        let decl = ast.push(
            Span::new(0, 2),
            NodeKind::Module {
                declarations: vec![lit],
                trailing_comments: vec![],
            },
        );
        ast.set_root(decl);
        (ast, decl, lit)
    }

    #[test]
    fn parenting_pass_sets_parent() {
        let (mut ast, module, lit) = tiny_ast();
        ast.run_parenting_pass();
        assert_eq!(ast.node(lit).parent, Some(module));
        assert_eq!(ast.node(module).parent, None);
    }

    #[test]
    fn parenting_pass_is_idempotent() {
        let (mut ast, module, lit) = tiny_ast();
        ast.run_parenting_pass();
        let before = ast.node(lit).parent;
        ast.run_parenting_pass();
        assert_eq!(ast.node(lit).parent, before);
    }

    #[test]
    fn ancestors_walks_to_root() {
        let (mut ast, module, lit) = tiny_ast();
        ast.run_parenting_pass();
        let chain: Vec<_> = ast.ancestors(lit).collect();
        assert_eq!(chain, vec![lit, module]);
    }

    #[test]
    fn span_invariants_hold_for_well_formed_tree() {
        let (ast, module, _) = tiny_ast();
        assert!(ast.check_span_invariants(module).is_ok());
    }

    #[test]
    fn span_invariants_reject_escaping_child() {
        let mut ast = Ast::new("12x");
        let lit = ast.push(Span::new(0, 3), NodeKind::NumberLiteralExpr { value: 12.0 });
        let module = ast.push(
            Span::new(0, 2),
            NodeKind::Module {
                declarations: vec![lit],
                trailing_comments: vec![],
            },
        );
        assert!(ast.check_span_invariants(module).is_err());
    }
}
