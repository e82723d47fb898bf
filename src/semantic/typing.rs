//! Expression type inference against a scope
//!
//! Bottom-up inference for scalar expressions: literals type themselves,
//! column references resolve through the scope chain, and operators unify
//! their operand types. Expressions carry no spans of their own, so
//! diagnostics are tagged with the containing node's span.

use crate::ast::{Expression, Literal, Operator, Span};
use crate::error::{DiagnosticKind, Result, ValidationError};
use crate::semantic::scope::ScopeId;
use crate::semantic::validator::Validator;
use crate::types::DataType;

/// Infer the type and nullability of an expression in a scope.
pub(crate) fn infer_expr(
    validator: &mut Validator,
    scope: ScopeId,
    span: Span,
    expr: &Expression,
) -> Result<(DataType, bool)> {
    match expr {
        Expression::Literal(literal) => Ok(literal_type(literal)),
        Expression::Column(table, name) => {
            resolve_column(validator, scope, table.as_deref(), name, span)
        }
        Expression::Operator(op) => infer_operator(validator, scope, span, op),
    }
}

/// Infer type of a literal.
fn literal_type(literal: &Literal) -> (DataType, bool) {
    let data_type = match literal {
        Literal::Null => DataType::Null,
        Literal::Boolean(_) => DataType::Bool,
        Literal::Integer(n) => {
            // Choose the narrowest integer type that holds the value.
            if *n >= i32::MIN as i128 && *n <= i32::MAX as i128 {
                DataType::I32
            } else if *n >= i64::MIN as i128 && *n <= i64::MAX as i128 {
                DataType::I64
            } else {
                DataType::I128
            }
        }
        Literal::Float(_) => DataType::F64,
        Literal::Decimal(_) => DataType::Decimal(None, None),
        Literal::String(_) => DataType::Varchar(None),
        Literal::Date(_) => DataType::Date,
        Literal::Time(_) => DataType::Time,
        Literal::Timestamp(_) => DataType::Timestamp,
    };
    (data_type, matches!(literal, Literal::Null))
}

/// Resolve a column reference by walking the scope chain outward.
///
/// Row sources are validated on first reference; the namespace cache makes
/// repeated lookups cheap.
fn resolve_column(
    validator: &mut Validator,
    scope: ScopeId,
    table: Option<&str>,
    name: &str,
    span: Span,
) -> Result<(DataType, bool)> {
    let mut current = Some(scope);

    while let Some(scope_id) = current {
        let sources = validator.scope(scope_id)?.sources.clone();

        match table {
            Some(table) => {
                if let Some(source) = sources.iter().find(|s| s.label == table) {
                    let row_type = validator.validate_namespace(source.namespace)?;
                    return match row_type.field(name) {
                        Some(field) => {
                            Ok((field.data_type.clone(), field.nullable || source.nullable))
                        }
                        None => Err(ValidationError::new(
                            DiagnosticKind::ColumnNotFound(format!("{}.{}", table, name)),
                            span,
                        )
                        .into()),
                    };
                }
            }
            None => {
                let mut found = None;
                for source in &sources {
                    let row_type = validator.validate_namespace(source.namespace)?;
                    if let Some(field) = row_type.field(name) {
                        if found.is_some() {
                            return Err(ValidationError::new(
                                DiagnosticKind::AmbiguousColumn(name.to_string()),
                                span,
                            )
                            .into());
                        }
                        found = Some((field.data_type.clone(), field.nullable || source.nullable));
                    }
                }
                if let Some(found) = found {
                    return Ok(found);
                }
            }
        }

        current = validator.scope(scope_id)?.parent;
    }

    Err(match table {
        Some(table) => ValidationError::new(
            DiagnosticKind::TableNotFound(table.to_string()),
            span,
        )
        .into(),
        None => ValidationError::new(DiagnosticKind::ColumnNotFound(name.to_string()), span).into(),
    })
}

fn infer_operator(
    validator: &mut Validator,
    scope: ScopeId,
    span: Span,
    op: &Operator,
) -> Result<(DataType, bool)> {
    use Operator::*;

    match op {
        And(lhs, rhs) | Or(lhs, rhs) => {
            let left = infer_expr(validator, scope, span, lhs)?;
            let right = infer_expr(validator, scope, span, rhs)?;
            expect_boolean(&left.0, span)?;
            expect_boolean(&right.0, span)?;
            Ok((DataType::Bool, left.1 || right.1))
        }

        Not(expr) => {
            let operand = infer_expr(validator, scope, span, expr)?;
            expect_boolean(&operand.0, span)?;
            Ok((DataType::Bool, operand.1))
        }

        Equal(lhs, rhs)
        | NotEqual(lhs, rhs)
        | GreaterThan(lhs, rhs)
        | GreaterThanOrEqual(lhs, rhs)
        | LessThan(lhs, rhs)
        | LessThanOrEqual(lhs, rhs) => {
            let left = infer_expr(validator, scope, span, lhs)?;
            let right = infer_expr(validator, scope, span, rhs)?;
            if DataType::unify(&left.0, &right.0).is_none() {
                return Err(ValidationError::new(
                    DiagnosticKind::TypeMismatch {
                        expected: left.0.to_string(),
                        found: right.0.to_string(),
                    },
                    span,
                )
                .into());
            }
            Ok((DataType::Bool, left.1 || right.1))
        }

        Add(lhs, rhs) | Subtract(lhs, rhs) | Multiply(lhs, rhs) | Divide(lhs, rhs) => {
            let left = infer_expr(validator, scope, span, lhs)?;
            let right = infer_expr(validator, scope, span, rhs)?;
            expect_numeric(&left.0, span)?;
            expect_numeric(&right.0, span)?;
            // Both numeric (or NULL), so a common type always exists.
            let data_type =
                DataType::unify(&left.0, &right.0).unwrap_or(DataType::F64);
            let nullable = left.1
                || right.1
                || left.0 == DataType::Null
                || right.0 == DataType::Null;
            Ok((data_type, nullable))
        }

        Negate(expr) => {
            let operand = infer_expr(validator, scope, span, expr)?;
            expect_numeric(&operand.0, span)?;
            Ok(operand)
        }

        IsNull { expr, .. } => {
            infer_expr(validator, scope, span, expr)?;
            Ok((DataType::Bool, false))
        }
    }
}

fn expect_boolean(data_type: &DataType, span: Span) -> Result<()> {
    if matches!(data_type, DataType::Bool | DataType::Null) {
        return Ok(());
    }
    Err(ValidationError::new(
        DiagnosticKind::TypeMismatch {
            expected: DataType::Bool.to_string(),
            found: data_type.to_string(),
        },
        span,
    )
    .into())
}

fn expect_numeric(data_type: &DataType, span: Span) -> Result<()> {
    if data_type.is_numeric() || *data_type == DataType::Null {
        return Ok(());
    }
    Err(ValidationError::new(
        DiagnosticKind::TypeMismatch {
            expected: "a numeric type".to_string(),
            found: data_type.to_string(),
        },
        span,
    )
    .into())
}
