//! Query-level syntax nodes: SELECT, VALUES, and set operations.

use super::expressions::Expression;
use std::fmt;

/// A source byte range, used to tag diagnostics with a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub offset: u32,
    pub len: u32,
}

impl Span {
    pub fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    pub fn end(&self) -> u32 {
        self.offset + self.len
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}..{}", self.offset, self.end())
    }
}

/// Identity of a syntax node within one validation session.
///
/// Ids are stamped by the validator's registration pass; they key the scope
/// and namespace registries. A freshly built tree carries [`NodeId::UNSET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const UNSET: NodeId = NodeId(u32::MAX);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Set operators. ALL vs DISTINCT is carried on the node, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

impl fmt::Display for SetOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOpKind::Union => write!(f, "UNION"),
            SetOpKind::Intersect => write!(f, "INTERSECT"),
            SetOpKind::Except => write!(f, "EXCEPT"),
        }
    }
}

/// Join types for SQL joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Cross,
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Cross => write!(f, "CROSS JOIN"),
            JoinType::Inner => write!(f, "JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
        }
    }
}

/// A FROM item.
#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    /// A table, optionally aliased.
    Table {
        id: NodeId,
        span: Span,
        name: String,
        alias: Option<String>,
    },
    /// A derived table: a subquery in FROM. Requires an alias.
    Derived {
        id: NodeId,
        span: Span,
        query: Box<Node>,
        alias: Option<String>,
    },
    /// A join of two FROM items (may be nested).
    Join {
        id: NodeId,
        span: Span,
        left: Box<FromClause>,
        right: Box<FromClause>,
        join_type: JoinType,
        /// The join condition. None for a cross join.
        predicate: Option<Expression>,
    },
}

impl FromClause {
    pub fn table(span: Span, name: impl Into<String>) -> Self {
        FromClause::Table {
            id: NodeId::UNSET,
            span,
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased_table(span: Span, name: impl Into<String>, alias: impl Into<String>) -> Self {
        FromClause::Table {
            id: NodeId::UNSET,
            span,
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn derived(span: Span, query: Node, alias: Option<String>) -> Self {
        FromClause::Derived {
            id: NodeId::UNSET,
            span,
            query: Box::new(query),
            alias,
        }
    }

    pub fn join(
        span: Span,
        left: FromClause,
        right: FromClause,
        join_type: JoinType,
        predicate: Option<Expression>,
    ) -> Self {
        FromClause::Join {
            id: NodeId::UNSET,
            span,
            left: Box::new(left),
            right: Box::new(right),
            join_type,
            predicate,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            FromClause::Table { span, .. }
            | FromClause::Derived { span, .. }
            | FromClause::Join { span, .. } => *span,
        }
    }
}

/// SELECT statement structure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    /// Expressions to select, with an optional column alias.
    pub items: Vec<(Expression, Option<String>)>,
    /// FROM: row sources to select from.
    pub from: Vec<FromClause>,
    /// WHERE: optional condition to filter rows.
    pub filter: Option<Expression>,
}

/// A general syntax node handed to the validator.
///
/// The `kind` discriminator mirrors what a permissive parser can produce in
/// query position, including a bare scalar expression; classifying those is
/// the validator's job, not the tree's.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A SELECT query.
    Select(SelectStatement),
    /// A standalone VALUES clause: rows of expressions.
    Values(Vec<Vec<Expression>>),
    /// A set operation over two or more operand nodes, in order.
    SetOp {
        op: SetOpKind,
        all: bool,
        operands: Vec<Node>,
    },
    /// A bare scalar expression in query position.
    Expr(Expression),
}

impl Node {
    pub fn new(span: Span, kind: NodeKind) -> Self {
        Self {
            id: NodeId::UNSET,
            span,
            kind,
        }
    }

    pub fn select(span: Span, select: SelectStatement) -> Self {
        Self::new(span, NodeKind::Select(select))
    }

    pub fn values(span: Span, rows: Vec<Vec<Expression>>) -> Self {
        Self::new(span, NodeKind::Values(rows))
    }

    pub fn set_op(span: Span, op: SetOpKind, all: bool, operands: Vec<Node>) -> Self {
        Self::new(span, NodeKind::SetOp { op, all, operands })
    }

    pub fn expr(span: Span, expression: Expression) -> Self {
        Self::new(span, NodeKind::Expr(expression))
    }

    /// Whether this node denotes a complete query (something that produces
    /// rows), as opposed to a bare scalar expression.
    pub fn is_query(&self) -> bool {
        self.kind.is_query()
    }
}

impl NodeKind {
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            NodeKind::Select(_) | NodeKind::Values(_) | NodeKind::SetOp { .. }
        )
    }

    /// The kind name, for internal error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Select(_) => "SELECT",
            NodeKind::Values(_) => "VALUES",
            NodeKind::SetOp { .. } => "set operation",
            NodeKind::Expr(_) => "expression",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Select(select) => write!(f, "{}", select),
            NodeKind::Values(rows) => {
                write!(f, "VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({})", join_exprs(row))?;
                }
                Ok(())
            }
            NodeKind::SetOp { op, all, operands } => {
                let sep = if *all {
                    format!(" {} ALL ", op)
                } else {
                    format!(" {} ", op)
                };
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", sep)?;
                    }
                    write!(f, "{}", operand)?;
                }
                Ok(())
            }
            NodeKind::Expr(expression) => write!(f, "{}", expression),
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        for (i, (expr, alias)) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match alias {
                Some(alias) => write!(f, "{} AS {}", expr, alias)?,
                None => write!(f, "{}", expr)?,
            }
        }
        if !self.from.is_empty() {
            write!(f, " FROM ")?;
            for (i, from) in self.from.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", from)?;
            }
        }
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {}", filter)?;
        }
        Ok(())
    }
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromClause::Table { name, alias, .. } => match alias {
                Some(alias) => write!(f, "{} AS {}", name, alias),
                None => write!(f, "{}", name),
            },
            FromClause::Derived { query, alias, .. } => match alias {
                Some(alias) => write!(f, "({}) AS {}", query, alias),
                None => write!(f, "({})", query),
            },
            FromClause::Join {
                left,
                right,
                join_type,
                predicate,
                ..
            } => {
                write!(f, "{} {} {}", left, join_type, right)?;
                if let Some(predicate) = predicate {
                    write!(f, " ON {}", predicate)?;
                }
                Ok(())
            }
        }
    }
}

fn join_exprs(exprs: &[Expression]) -> String {
    exprs
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
