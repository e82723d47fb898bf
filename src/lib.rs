//! Semantic validation core for a SQL front end
//!
//! This crate sits between parsing and planning: given an already parsed
//! syntax tree, it determines whether a query is meaningful and computes the
//! row type (column names, types, nullability) that each sub-expression
//! produces. It does not parse SQL text and it does not plan or execute
//! queries.
//!
//! The validator:
//! - Resolves table and column references against a catalog of schemas
//! - Tracks the name-resolution scope active at every node
//! - Associates each row-producing node with a namespace that validates
//!   itself once and caches its derived row type
//! - Derives combined row types for set operations (UNION, INTERSECT,
//!   EXCEPT) under least-restrictive-type unification
//! - Reports position-tagged diagnostics, distinguishing user-facing SQL
//!   mistakes from broken internal invariants

pub mod ast;
pub mod error;
pub mod semantic;
pub mod types;

pub use error::{DiagnosticKind, Error, Result, ValidationError};
pub use semantic::{Namespace, NamespaceKind, ValidationState, Validator};
pub use types::{Column, DataType, Field, RowType, Table};
