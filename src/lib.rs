pub mod ast;
pub mod checker;
pub mod combinators;
pub mod metrics;
pub mod parser;
pub mod printer;
pub mod scope;
pub mod span;
pub mod types;
pub mod walker;
