//! The validation driver: registration walk plus memoizing dispatcher
//!
//! One `Validator` per validation session. All session state (scope
//! registry, namespaces, depth counter) lives here and is threaded
//! explicitly; nothing is ambient or shared across sessions.

use crate::ast::{FromClause, JoinType, Node, NodeId, NodeKind, Span};
use crate::error::{DiagnosticKind, Error, Result, ValidationError};
use crate::semantic::namespace::{Namespace, NamespaceKind, SetOpOperand, ValidationState};
use crate::semantic::scope::{Scope, ScopeId, ScopeRegistry, ScopeSource};
use crate::semantic::{setop, typing};
use crate::types::row_type::unify_rows;
use crate::types::{DataType, Field, RowType, Table};
use std::collections::HashMap;

/// Default bound on query nesting depth. Recursion depth equals SQL nesting
/// depth, so pathological inputs fail with a diagnostic instead of
/// exhausting the stack.
pub const MAX_QUERY_DEPTH: usize = 64;

/// Validates one query tree against a catalog of table schemas.
pub struct Validator {
    pub(crate) catalog: HashMap<String, Table>,
    pub(crate) scopes: ScopeRegistry,
    pub(crate) namespaces: HashMap<NodeId, Namespace>,
    next_id: u32,
    depth: usize,
    max_depth: usize,
}

impl Validator {
    pub fn new(catalog: HashMap<String, Table>) -> Self {
        Self::with_max_depth(catalog, MAX_QUERY_DEPTH)
    }

    pub fn with_max_depth(catalog: HashMap<String, Table>, max_depth: usize) -> Self {
        Self {
            catalog,
            scopes: ScopeRegistry::new(),
            namespaces: HashMap::new(),
            next_id: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Register a query tree: stamp node identities, build scopes, and
    /// create namespaces. Returns the root namespace's id, ready for
    /// [`Validator::validate`].
    pub fn register(&mut self, node: Node) -> Result<NodeId> {
        if !node.is_query() {
            return Err(ValidationError::new(
                DiagnosticKind::NotAQuery(node.to_string()),
                node.span,
            )
            .into());
        }
        let root_scope = self.scopes.insert(Scope::root());
        self.register_node(node, root_scope, None)
    }

    /// Validate a registered namespace and return its derived row type.
    /// Idempotent: repeated calls return the cached result (or replay the
    /// recorded error) without re-traversing operands.
    pub fn validate(&mut self, id: NodeId) -> Result<RowType> {
        tracing::debug!(node = %id, "validating query");
        self.validate_namespace(id)
    }

    /// The cached row type of a validated namespace. Internal error if the
    /// namespace has not validated successfully.
    pub fn row_type(&self, id: NodeId) -> Result<&RowType> {
        self.namespace(id)?.row_type()
    }

    /// The namespace registered for a node.
    pub fn namespace(&self, id: NodeId) -> Result<&Namespace> {
        self.namespaces
            .get(&id)
            .ok_or_else(|| Error::Internal(format!("no namespace registered for node {}", id)))
    }

    pub(crate) fn scope(&self, id: ScopeId) -> Result<&Scope> {
        self.scopes
            .get(id)
            .ok_or_else(|| Error::Internal(format!("unknown scope {}", id.index())))
    }

    fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_namespace(&mut self, namespace: Namespace) {
        self.namespaces.insert(namespace.id, namespace);
    }

    // Registration walk

    fn register_node(
        &mut self,
        node: Node,
        enclosing: ScopeId,
        enclosing_span: Option<Span>,
    ) -> Result<NodeId> {
        if self.depth >= self.max_depth {
            return Err(ValidationError::new(
                DiagnosticKind::NestingTooDeep(self.max_depth),
                node.span,
            )
            .into());
        }
        self.depth += 1;
        let result = self.register_node_inner(node, enclosing, enclosing_span);
        self.depth -= 1;
        result
    }

    fn register_node_inner(
        &mut self,
        node: Node,
        enclosing: ScopeId,
        enclosing_span: Option<Span>,
    ) -> Result<NodeId> {
        let id = self.next_node_id();
        let span = node.span;
        let enclosing_span = enclosing_span.unwrap_or(span);

        match node.kind {
            NodeKind::Select(select) => {
                // FROM sources first: their namespaces are what the scope
                // makes visible.
                let mut sources = Vec::with_capacity(select.from.len());
                let mut leaves = Vec::new();
                let mut created = Vec::new();
                for from in select.from {
                    let from_id =
                        self.register_from(from, enclosing, false, &mut leaves, &mut created)?;
                    sources.push(from_id);
                }

                let mut scope = Scope::child_of(enclosing);
                for (label, namespace, leaf_span, nullable) in leaves {
                    if scope.sources.iter().any(|s| s.label == label) {
                        return Err(ValidationError::new(
                            DiagnosticKind::DuplicateSourceLabel(label),
                            leaf_span,
                        )
                        .into());
                    }
                    scope.sources.push(ScopeSource {
                        label,
                        namespace,
                        nullable,
                    });
                }
                let scope_id = self.scopes.insert(scope);
                self.scopes.bind(id, scope_id);
                for from_id in created {
                    self.scopes.bind(from_id, scope_id);
                }

                self.insert_namespace(Namespace::new(
                    id,
                    span,
                    enclosing_span,
                    NamespaceKind::Select {
                        items: select.items,
                        filter: select.filter,
                        sources,
                    },
                ));
                Ok(id)
            }

            NodeKind::Values(rows) => {
                self.scopes.bind(id, enclosing);
                self.insert_namespace(Namespace::new(
                    id,
                    span,
                    enclosing_span,
                    NamespaceKind::Values { rows },
                ));
                Ok(id)
            }

            NodeKind::SetOp { op, all: _, operands } => {
                // Operands are registered against the set operation's own
                // scope; they resolve names exactly where the operation
                // itself sits.
                self.scopes.bind(id, enclosing);
                let mut registered = Vec::with_capacity(operands.len());
                for operand in operands {
                    let operand_span = operand.span;
                    let text = operand.to_string();
                    if operand.is_query() {
                        let operand_id = self.register_node(operand, enclosing, None)?;
                        registered.push(SetOpOperand {
                            id: operand_id,
                            span: operand_span,
                            is_query: true,
                            text,
                        });
                    } else {
                        // No namespace for a bare expression; validation
                        // reports it at this position.
                        let operand_id = self.next_node_id();
                        registered.push(SetOpOperand {
                            id: operand_id,
                            span: operand_span,
                            is_query: false,
                            text,
                        });
                    }
                }
                self.insert_namespace(Namespace::new(
                    id,
                    span,
                    enclosing_span,
                    NamespaceKind::SetOp {
                        op,
                        operands: registered,
                    },
                ));
                Ok(id)
            }

            NodeKind::Expr(expression) => Err(ValidationError::new(
                DiagnosticKind::NotAQuery(expression.to_string()),
                span,
            )
            .into()),
        }
    }

    fn register_from(
        &mut self,
        from: FromClause,
        enclosing: ScopeId,
        nullable: bool,
        leaves: &mut Vec<(String, NodeId, Span, bool)>,
        created: &mut Vec<NodeId>,
    ) -> Result<NodeId> {
        match from {
            FromClause::Table {
                span, name, alias, ..
            } => {
                let id = self.next_node_id();
                let label = alias.unwrap_or_else(|| name.clone());
                self.insert_namespace(Namespace::new(
                    id,
                    span,
                    span,
                    NamespaceKind::TableScan { table: name },
                ));
                leaves.push((label, id, span, nullable));
                created.push(id);
                Ok(id)
            }

            FromClause::Derived {
                span, query, alias, ..
            } => {
                let label = alias.ok_or_else(|| {
                    Error::from(ValidationError::new(
                        DiagnosticKind::DerivedTableWithoutAlias,
                        span,
                    ))
                })?;
                let query_id = self.register_node(*query, enclosing, Some(span))?;
                let id = self.next_node_id();
                self.insert_namespace(Namespace::new(
                    id,
                    span,
                    span,
                    NamespaceKind::Derived { query: query_id },
                ));
                leaves.push((label, id, span, nullable));
                created.push(id);
                Ok(id)
            }

            FromClause::Join {
                span,
                left,
                right,
                join_type,
                predicate,
                ..
            } => {
                // Columns from the non-preserved side of an outer join
                // resolve as nullable, however deeply the join nests.
                let (left_nullable, right_nullable) = match join_type {
                    JoinType::Cross | JoinType::Inner => (false, false),
                    JoinType::Left => (false, true),
                    JoinType::Right => (true, false),
                    JoinType::Full => (true, true),
                };
                let left_id =
                    self.register_from(*left, enclosing, nullable || left_nullable, leaves, created)?;
                let right_id = self.register_from(
                    *right,
                    enclosing,
                    nullable || right_nullable,
                    leaves,
                    created,
                )?;
                let id = self.next_node_id();
                self.insert_namespace(Namespace::new(
                    id,
                    span,
                    span,
                    NamespaceKind::Join {
                        left: left_id,
                        right: right_id,
                        join_type,
                        predicate,
                    },
                ));
                created.push(id);
                Ok(id)
            }
        }
    }

    // Validation dispatch

    /// Memoizing validation of one namespace.
    ///
    /// State machine: Unvalidated -> Validating -> Validated | Failed.
    /// Validated short-circuits with the cached row type; Failed replays the
    /// recorded error; re-entering Validating means a cycle, which the
    /// registration walk cannot produce.
    pub(crate) fn validate_namespace(&mut self, id: NodeId) -> Result<RowType> {
        match &self.namespace(id)?.state {
            ValidationState::Validated(row_type) => return Ok(row_type.clone()),
            ValidationState::Failed(error) => return Err(error.clone()),
            ValidationState::Validating => {
                return Err(Error::Internal(format!(
                    "cyclic validation of namespace {}",
                    id
                )));
            }
            ValidationState::Unvalidated => {}
        }

        let (span, enclosing_span, kind) = {
            let namespace = self
                .namespaces
                .get_mut(&id)
                .ok_or_else(|| Error::Internal(format!("no namespace registered for node {}", id)))?;
            namespace.state = ValidationState::Validating;
            (namespace.span, namespace.enclosing_span, namespace.kind.clone())
        };

        self.depth += 1;
        let result = if self.depth > self.max_depth {
            Err(ValidationError::new(
                DiagnosticKind::NestingTooDeep(self.max_depth),
                enclosing_span,
            )
            .into())
        } else {
            self.validate_kind(id, span, &kind)
        };
        self.depth -= 1;

        let namespace = self
            .namespaces
            .get_mut(&id)
            .ok_or_else(|| Error::Internal(format!("no namespace registered for node {}", id)))?;
        match &result {
            Ok(row_type) => namespace.state = ValidationState::Validated(row_type.clone()),
            Err(error) => {
                tracing::debug!(node = %id, %error, "namespace validation failed");
                namespace.state = ValidationState::Failed(error.clone());
            }
        }
        result
    }

    fn validate_kind(&mut self, id: NodeId, span: Span, kind: &NamespaceKind) -> Result<RowType> {
        match kind {
            NamespaceKind::TableScan { table } => self.validate_table_scan(span, table),
            NamespaceKind::Derived { query } => self.validate_namespace(*query),
            NamespaceKind::Join {
                left,
                right,
                join_type,
                predicate,
            } => self.validate_join(id, span, *left, *right, *join_type, predicate.as_ref()),
            NamespaceKind::Values { rows } => self.validate_values(id, span, rows),
            NamespaceKind::Select {
                items,
                filter,
                sources,
            } => self.validate_select(id, span, items, filter.as_ref(), sources),
            NamespaceKind::SetOp { op, operands } => {
                setop::validate_set_op(self, id, *op, operands)
            }
        }
    }

    fn validate_table_scan(&mut self, span: Span, table: &str) -> Result<RowType> {
        let schema = self.catalog.get(table).ok_or_else(|| {
            Error::from(ValidationError::new(
                DiagnosticKind::TableNotFound(table.to_string()),
                span,
            ))
        })?;
        Ok(schema.row_type())
    }

    fn validate_join(
        &mut self,
        id: NodeId,
        span: Span,
        left: NodeId,
        right: NodeId,
        join_type: JoinType,
        predicate: Option<&crate::ast::Expression>,
    ) -> Result<RowType> {
        let left_row = self.validate_namespace(left)?;
        let right_row = self.validate_namespace(right)?;

        if let Some(predicate) = predicate {
            let scope = self.scopes.lookup(id).ok_or_else(|| {
                Error::Internal(format!("no scope registered for join node {}", id))
            })?;
            let (data_type, _) = typing::infer_expr(self, scope, span, predicate)?;
            if !matches!(data_type, DataType::Bool | DataType::Null) {
                return Err(ValidationError::new(
                    DiagnosticKind::NonBooleanJoinCondition(data_type),
                    span,
                )
                .into());
            }
        }

        // Outer joins make the non-preserved side nullable.
        let (left_nullable, right_nullable) = match join_type {
            JoinType::Cross | JoinType::Inner => (false, false),
            JoinType::Left => (false, true),
            JoinType::Right => (true, false),
            JoinType::Full => (true, true),
        };

        let mut fields = Vec::with_capacity(left_row.arity() + right_row.arity());
        for field in left_row.fields {
            fields.push(Field::new(
                field.name,
                field.data_type,
                field.nullable || left_nullable,
            ));
        }
        for field in right_row.fields {
            fields.push(Field::new(
                field.name,
                field.data_type,
                field.nullable || right_nullable,
            ));
        }
        Ok(RowType::new(fields))
    }

    fn validate_values(
        &mut self,
        id: NodeId,
        span: Span,
        rows: &[Vec<crate::ast::Expression>],
    ) -> Result<RowType> {
        let Some(first) = rows.first() else {
            return Err(ValidationError::new(DiagnosticKind::EmptyValues, span).into());
        };
        if first.is_empty() {
            return Err(ValidationError::new(DiagnosticKind::EmptyValues, span).into());
        }
        let scope = self
            .scopes
            .lookup(id)
            .ok_or_else(|| Error::Internal(format!("no scope registered for VALUES node {}", id)))?;

        let arity = first.len();
        let mut combined: Option<RowType> = None;
        for row in rows {
            if row.len() != arity {
                return Err(ValidationError::new(
                    DiagnosticKind::UnevenValuesRows {
                        expected: arity,
                        found: row.len(),
                    },
                    span,
                )
                .into());
            }
            let mut fields = Vec::with_capacity(arity);
            for (idx, expr) in row.iter().enumerate() {
                let (data_type, nullable) = typing::infer_expr(self, scope, span, expr)?;
                fields.push(Field::new(format!("column{}", idx + 1), data_type, nullable));
            }
            let row_type = RowType::new(fields);
            combined = Some(match combined {
                None => row_type,
                Some(previous) => unify_rows(&previous, &row_type).map_err(|incompatibility| {
                    Error::from(ValidationError::new(incompatibility.into(), span))
                })?,
            });
        }
        // rows is non-empty, so combined is set.
        combined.ok_or_else(|| Error::Internal(format!("VALUES node {} derived no row type", id)))
    }

    fn validate_select(
        &mut self,
        id: NodeId,
        span: Span,
        items: &[(crate::ast::Expression, Option<String>)],
        filter: Option<&crate::ast::Expression>,
        sources: &[NodeId],
    ) -> Result<RowType> {
        let scope = self.scopes.lookup(id).ok_or_else(|| {
            Error::Internal(format!("no scope registered for SELECT node {}", id))
        })?;

        // Row sources first; projection typing reads their row types
        // through the scope.
        for source in sources {
            self.validate_namespace(*source)?;
        }

        let mut fields = Vec::with_capacity(items.len());
        for (idx, (expr, alias)) in items.iter().enumerate() {
            let (data_type, nullable) = typing::infer_expr(self, scope, span, expr)?;
            let name = match (alias, expr) {
                (Some(alias), _) => alias.clone(),
                (None, crate::ast::Expression::Column(_, column)) => column.clone(),
                (None, _) => format!("column{}", idx + 1),
            };
            fields.push(Field::new(name, data_type, nullable));
        }

        if let Some(filter) = filter {
            let (data_type, _) = typing::infer_expr(self, scope, span, filter)?;
            if !matches!(data_type, DataType::Bool | DataType::Null) {
                return Err(ValidationError::new(
                    DiagnosticKind::NonBooleanFilter(data_type),
                    span,
                )
                .into());
            }
        }

        Ok(RowType::new(fields))
    }
}

