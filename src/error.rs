//! Error types for the validator
//!
//! User-facing diagnostics and internal invariant violations travel through
//! the same `Result`, but in distinct categories: a driver presenting errors
//! to the user must never show an `Internal` error as an ordinary SQL
//! mistake.

use crate::ast::Span;
use crate::types::DataType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A user-facing diagnostic raised while validating a query.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A broken internal invariant (e.g. a node validated without a
    /// registered scope). Aborts the compilation; not a SQL mistake.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

/// A position-tagged validation diagnostic.
///
/// Raise sites select a [`DiagnosticKind`] and supply structured arguments;
/// message text is rendered only when the error is displayed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {span}")]
pub struct ValidationError {
    pub kind: DiagnosticKind,
    pub span: Span,
}

impl ValidationError {
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kinds of user-facing validation diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    #[error("expected a query, found '{0}'")]
    NotAQuery(String),

    #[error("set operation operands have {left} and {right} columns")]
    ColumnCountMismatch { left: usize, right: usize },

    #[error("no common type for column {position}: {left} and {right}")]
    NoCommonType {
        position: usize,
        left: DataType,
        right: DataType,
    },

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column reference '{0}' is ambiguous")]
    AmbiguousColumn(String),

    #[error("duplicate table name or alias: {0}")]
    DuplicateSourceLabel(String),

    #[error("derived table requires an alias")]
    DerivedTableWithoutAlias,

    #[error("WHERE condition must be a boolean, found {0}")]
    NonBooleanFilter(DataType),

    #[error("join condition must be a boolean, found {0}")]
    NonBooleanJoinCondition(DataType),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("VALUES list is empty")]
    EmptyValues,

    #[error("VALUES rows have uneven lengths: expected {expected}, found {found}")]
    UnevenValuesRows { expected: usize, found: usize },

    #[error("query nesting exceeds the maximum depth of {0}")]
    NestingTooDeep(usize),
}

impl From<crate::types::RowTypeIncompatibility> for DiagnosticKind {
    fn from(incompatibility: crate::types::RowTypeIncompatibility) -> Self {
        use crate::types::RowTypeIncompatibility;
        match incompatibility {
            RowTypeIncompatibility::ColumnCount { left, right } => {
                DiagnosticKind::ColumnCountMismatch { left, right }
            }
            RowTypeIncompatibility::NoCommonType {
                position,
                left,
                right,
            } => DiagnosticKind::NoCommonType {
                position,
                left,
                right,
            },
        }
    }
}
