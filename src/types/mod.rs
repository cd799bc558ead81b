//! The bidirectional type engine (component G): `Type`, `TypeContext`, and
//! the four public entry points (`infer_type`, `resolve_type`,
//! `simplify_type`, `subsumation_issues`).
//!
//! Modeled on `typechecker::mod`'s inference/simplification traversal shape
//! and `ast::types::Type` / `typechecker::variabletype::VariableType`
//! sum-type shape (see DESIGN.md, component G), generalised from a small
//! closed set of primitive types to a structural + computed type language.

pub mod globals;
pub mod infer;
pub mod operators;
pub mod resolve;
pub mod simplify;
pub mod subsume;

use std::collections::HashMap;

use crate::ast::BinaryOp;

/// How far [`simplify::simplify_type`] may recurse before giving up and
/// returning `poisoned`.
pub const SIMPLIFY_DEPTH_BOUND: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Scalar(f64),
    /// Half-open `[start, end)`; either end may be absent (open).
    Range { start: Option<f64>, end: Option<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    Entry { key: Type, value: Type },
    Spread(Box<Type>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Item(Type),
    Spread(Box<Type>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayShape {
    Tuple(Vec<ArrayElement>),
    List(Box<Type>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam {
    pub name: String,
    pub extends: Option<Box<Type>>,
}

/// A function type's parameter. `name` is carried (when known) so
/// invocation-type simplification can bind the argument's inferred type to
/// that name in `valueScope` before simplifying the return type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub name: Option<String>,
    pub ty: Type,
}

/// An engine-side type value. Computed
/// variants are not yet in structural form; [`simplify::simplify_type`]
/// drives them toward one of the structural variants above it.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    // --- structural ---------------------------------------------------
    Function { params: Vec<FunctionParam>, return_type: Box<Type> },
    Union(Vec<Type>),
    Object { entries: Vec<ObjectEntry> },
    Array(ArrayShape),
    String { value: Option<String> },
    Number { value: Option<NumberValue> },
    Boolean { value: Option<bool> },
    Nil,
    Unknown,
    /// Fail-silent bottom; subsumes and is subsumed by everything
    ///.
    Poisoned,

    // --- computed ------------------------------------------------------
    InvocationType { subject: Box<Type>, args: Vec<Type> },
    IfElseType { cases: Vec<(Type, Type)>, default: Box<Type> },
    SwitchType { subject: Box<Type>, cases: Vec<(Type, Type)>, default: Box<Type> },
    BinaryOperationType { left: Box<Type>, op: BinaryOp, right: Box<Type> },
    PropertyType { subject: Box<Type>, property: Box<Type> },
    KeysType(Box<Type>),
    ValuesType(Box<Type>),
    ParametersType(Box<Type>),
    ReturnType(Box<Type>),
    NamedType(String),
    GenericAbstraction { params: Vec<GenericParam>, inner: Box<Type> },
    GenericApplication { inner: Box<Type>, args: Vec<Type> },
    LocalIdentifierType(String),
    /// Set subtraction from a union (used by `??`'s `Exclude<left, nil>`).
    ExcludeType { from: Box<Type>, exclude: Box<Type> },
}

impl Type {
    pub fn is_poisoned(&self) -> bool {
        matches!(self, Type::Poisoned)
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Type::Function { .. }
                | Type::Union(_)
                | Type::Object { .. }
                | Type::Array(_)
                | Type::String { .. }
                | Type::Number { .. }
                | Type::Boolean { .. }
                | Type::Nil
                | Type::Unknown
                | Type::Poisoned
        )
    }

    pub fn string_literal(value: impl Into<String>) -> Type {
        Type::String { value: Some(value.into()) }
    }

    pub fn number_literal(value: f64) -> Type {
        Type::Number { value: Some(NumberValue::Scalar(value)) }
    }

    pub fn boolean_literal(value: bool) -> Type {
        Type::Boolean { value: Some(value) }
    }
}

/// `{ typeScope, valueScope, preserveGenerics?, preserveValues? }`
///. Scopes are plain maps built by the checker at each scope
/// boundary it walks (component H), using [`crate::scope`] to discover
/// which names are in play and [`infer::infer_type`]/[`resolve::resolve_type`]
/// to populate their types.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    pub type_scope: HashMap<String, Type>,
    pub value_scope: HashMap<String, Type>,
    pub preserve_generics: bool,
    pub preserve_values: bool,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_globals() -> Self {
        Self {
            value_scope: globals::global_value_table().clone(),
            ..Self::default()
        }
    }

    /// A copy of this context with one more value-scope binding -- used by
    /// invocation-type simplification to bind argument types to parameter
    /// names without mutating the caller's context.
    pub fn with_value(&self, name: impl Into<String>, ty: Type) -> TypeContext {
        let mut next = self.clone();
        next.value_scope.insert(name.into(), ty);
        next
    }

    pub fn with_type(&self, name: impl Into<String>, ty: Type) -> TypeContext {
        let mut next = self.clone();
        next.type_scope.insert(name.into(), ty);
        next
    }
}
