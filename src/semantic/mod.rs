//! Semantic validation of parsed queries
//!
//! This module operates between parsing and planning: it resolves names,
//! type-checks expressions, and derives the row type each row-producing node
//! yields. Validation is a single-threaded, session-scoped pass: one
//! [`Validator`] per query tree, no shared state between sessions.
//!
//! The pass has two phases:
//! - registration: a top-down walk that stamps node identities, builds the
//!   scope registry, and creates one namespace per row-producing node
//! - validation: a memoizing bottom-up traversal where each namespace
//!   validates itself once and caches its derived row type

pub mod namespace;
pub mod scope;
pub mod setop;
pub mod typing;
pub mod validator;

#[cfg(test)]
mod validator_test;

pub use namespace::{Namespace, NamespaceKind, SetOpOperand, ValidationState};
pub use scope::{Scope, ScopeId, ScopeRegistry, ScopeSource};
pub use validator::{MAX_QUERY_DEPTH, Validator};
