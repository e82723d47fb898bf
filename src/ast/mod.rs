//! Syntax tree consumed by the validator
//!
//! Parsing is out of scope for this crate: a parser (or test code) builds
//! these nodes and hands them to the validator. Nodes carry source spans for
//! diagnostics and render back to SQL-ish text via `Display`.

pub mod expressions;
pub mod query;

pub use expressions::{Expression, Literal, Operator};
pub use query::{FromClause, JoinType, Node, NodeId, NodeKind, SelectStatement, SetOpKind, Span};
