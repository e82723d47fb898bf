//! Validation of set operations (UNION, INTERSECT, EXCEPT)
//!
//! A set operation's operands must each be a complete query, and their row
//! types must unify position by position into a least-restrictive combined
//! row type. Operand validation is mutual recursion through the namespace
//! dispatcher: an operand may itself be a nested set operation.

use crate::ast::{NodeId, SetOpKind};
use crate::error::{DiagnosticKind, Error, Result, ValidationError};
use crate::semantic::namespace::SetOpOperand;
use crate::semantic::validator::Validator;
use crate::types::RowType;
use crate::types::row_type::unify_rows;

/// Validate a set-operation namespace and derive its combined row type.
///
/// Fails fast on the first violation, left to right: a non-query operand is
/// reported before any later operand is examined, matching the order the
/// user wrote the query.
pub(crate) fn validate_set_op(
    validator: &mut Validator,
    id: NodeId,
    op: SetOpKind,
    operands: &[SetOpOperand],
) -> Result<RowType> {
    // Every set-operation node is bound to a scope during registration, and
    // its operands were registered against that same scope. A missing
    // binding means validation started on an unregistered tree.
    let scope = validator
        .scopes
        .lookup(id)
        .ok_or_else(|| Error::Internal(format!("no scope registered for {} node {}", op, id)))?;

    tracing::debug!(
        %op,
        node = %id,
        scope = scope.index(),
        operands = operands.len(),
        "validating set operation"
    );

    if operands.is_empty() {
        return Err(Error::Internal(format!(
            "{} node {} has no operands",
            op, id
        )));
    }

    for operand in operands {
        if !operand.is_query {
            return Err(ValidationError::new(
                DiagnosticKind::NotAQuery(operand.text.clone()),
                operand.span,
            )
            .into());
        }
        validator.validate_namespace(operand.id)?;
    }

    // All operands validated; fold their row types pairwise. A single
    // operand degenerates to its own row type.
    let mut combined = validator.row_type(operands[0].id)?.clone();
    for operand in &operands[1..] {
        let row_type = validator.row_type(operand.id)?.clone();
        combined = unify_rows(&combined, &row_type).map_err(|incompatibility| {
            ValidationError::new(incompatibility.into(), operand.span)
        })?;
    }

    tracing::trace!(node = %id, row_type = %combined, "set operation row type");
    Ok(combined)
}
