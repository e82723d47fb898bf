//! Scope registry: which row sources are visible at each node
//!
//! Scopes form a tree mirroring query nesting; the registry maps node
//! identity to the scope active at that node. Both are session-scoped and
//! built during the registration walk.

use crate::ast::NodeId;
use std::collections::HashMap;

/// Identity of a scope within one validation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// A row source visible in a scope: its label (table name or alias) and the
/// namespace that produces its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSource {
    pub label: String,
    pub namespace: NodeId,
    /// True when the source sits on the non-preserved side of an outer
    /// join; every column it contributes resolves as nullable.
    pub nullable: bool,
}

/// The set of visible row sources at a point in the syntax tree.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Row sources visible at this level, in FROM order.
    pub sources: Vec<ScopeSource>,
    /// The enclosing scope, for correlated references.
    pub parent: Option<ScopeId>,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child_of(parent: ScopeId) -> Self {
        Self {
            sources: Vec::new(),
            parent: Some(parent),
        }
    }
}

/// Session-scoped mapping from node identity to its resolution scope.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: Vec<Scope>,
    by_node: HashMap<NodeId, ScopeId>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scope to the registry and return its id.
    pub fn insert(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    /// Bind a node to the scope active at it.
    pub fn bind(&mut self, node: NodeId, scope: ScopeId) {
        self.by_node.insert(node, scope);
    }

    /// The scope active at a node, if the node was registered.
    pub fn lookup(&self, node: NodeId) -> Option<ScopeId> {
        self.by_node.get(&node).copied()
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }
}
