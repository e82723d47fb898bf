//! Namespaces: row-producing units of a query
//!
//! Each row-producing node (SELECT, VALUES, set operation, table scan,
//! derived table, join) gets one namespace. A namespace validates itself at
//! most once; the derived row type is cached on success, the error on
//! failure, and neither is ever recomputed within a session.

use crate::ast::{Expression, JoinType, NodeId, SetOpKind, Span};
use crate::error::{Error, Result};
use crate::types::RowType;

/// Validation lifecycle of a namespace. Mutated exactly once past
/// `Validating`.
#[derive(Debug, Clone)]
pub enum ValidationState {
    Unvalidated,
    Validating,
    Validated(RowType),
    Failed(Error),
}

/// One operand of a set operation, as recorded at registration.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOpOperand {
    pub id: NodeId,
    pub span: Span,
    /// Whether the operand denotes a complete query. Non-query operands have
    /// no namespace; validation reports them as NotAQuery.
    pub is_query: bool,
    /// The operand's rendered SQL text, for diagnostics.
    pub text: String,
}

/// The variants of row-producing nodes. Closed union: the validation driver
/// matches exhaustively, so a new variant cannot silently fall through.
#[derive(Debug, Clone)]
pub enum NamespaceKind {
    /// UNION, INTERSECT, or EXCEPT over ordered operands.
    SetOp {
        op: SetOpKind,
        operands: Vec<SetOpOperand>,
    },
    /// A SELECT query: projection items, optional filter, and the top-level
    /// FROM namespaces in order.
    Select {
        items: Vec<(Expression, Option<String>)>,
        filter: Option<Expression>,
        sources: Vec<NodeId>,
    },
    /// A standalone VALUES clause.
    Values { rows: Vec<Vec<Expression>> },
    /// A base-table scan resolved against the catalog.
    TableScan { table: String },
    /// A derived table: a subquery in FROM.
    Derived { query: NodeId },
    /// A join of two row sources.
    Join {
        left: NodeId,
        right: NodeId,
        join_type: JoinType,
        predicate: Option<Expression>,
    },
}

impl NamespaceKind {
    /// The kind name, for internal error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NamespaceKind::SetOp { .. } => "set operation",
            NamespaceKind::Select { .. } => "SELECT",
            NamespaceKind::Values { .. } => "VALUES",
            NamespaceKind::TableScan { .. } => "table scan",
            NamespaceKind::Derived { .. } => "derived table",
            NamespaceKind::Join { .. } => "join",
        }
    }
}

/// A namespace: a node-associated row producer with a memoized row type.
#[derive(Debug, Clone)]
pub struct Namespace {
    /// The defining node's identity.
    pub id: NodeId,
    /// The defining node's source span.
    pub span: Span,
    /// The span used for position-tagging diagnostics about this namespace
    /// as a whole; differs from `span` when the node is wrapped, e.g. an
    /// aliased derived table.
    pub enclosing_span: Span,
    pub(crate) kind: NamespaceKind,
    pub(crate) state: ValidationState,
}

impl Namespace {
    pub fn new(id: NodeId, span: Span, enclosing_span: Span, kind: NamespaceKind) -> Self {
        Self {
            id,
            span,
            enclosing_span,
            kind,
            state: ValidationState::Unvalidated,
        }
    }

    pub fn kind(&self) -> &NamespaceKind {
        &self.kind
    }

    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    /// The derived row type. Calling this before validation succeeds is a
    /// programming error, reported as an internal error.
    pub fn row_type(&self) -> Result<&RowType> {
        match &self.state {
            ValidationState::Validated(row_type) => Ok(row_type),
            _ => Err(Error::Internal(format!(
                "row type of {} namespace {} read before validation",
                self.kind.name(),
                self.id
            ))),
        }
    }
}
