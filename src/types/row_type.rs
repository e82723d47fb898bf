//! Row types: the ordered field schema a query produces

use super::data_type::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single output column: name, type, and nullability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if self.nullable {
            write!(f, " NULL")?;
        }
        Ok(())
    }
}

/// The ordered field schema produced by a query or row source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowType {
    pub fields: Vec<Field>,
}

impl RowType {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Returns the field with the given name, if it exists.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, ")")
    }
}

/// Why two row types would not unify.
#[derive(Debug, Clone, PartialEq)]
pub enum RowTypeIncompatibility {
    /// Field counts differ.
    ColumnCount { left: usize, right: usize },
    /// A field position has no least-restrictive common type.
    NoCommonType {
        /// 1-based column position, for messages.
        position: usize,
        left: DataType,
        right: DataType,
    },
}

/// Unify two row types field by field.
///
/// Requires equal field counts. Each position gets the least-restrictive
/// common type of the two field types and the OR of their nullability; a
/// NULL-typed field forces the result nullable. Field names come from the
/// left operand.
pub fn unify_rows(
    left: &RowType,
    right: &RowType,
) -> Result<RowType, RowTypeIncompatibility> {
    if left.arity() != right.arity() {
        return Err(RowTypeIncompatibility::ColumnCount {
            left: left.arity(),
            right: right.arity(),
        });
    }

    let mut fields = Vec::with_capacity(left.arity());
    for (position, (l, r)) in left.fields.iter().zip(right.fields.iter()).enumerate() {
        let data_type = DataType::unify(&l.data_type, &r.data_type).ok_or(
            RowTypeIncompatibility::NoCommonType {
                position: position + 1,
                left: l.data_type.clone(),
                right: r.data_type.clone(),
            },
        )?;
        let nullable = l.nullable
            || r.nullable
            || l.data_type == DataType::Null
            || r.data_type == DataType::Null;
        fields.push(Field::new(l.name.clone(), data_type, nullable));
    }
    Ok(RowType::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, DataType, bool)]) -> RowType {
        RowType::new(
            fields
                .iter()
                .map(|(name, dt, nullable)| Field::new(*name, dt.clone(), *nullable))
                .collect(),
        )
    }

    #[test]
    fn unify_widens_and_keeps_left_names() {
        let left = row(&[("a", DataType::I32, false), ("b", DataType::Varchar(Some(10)), false)]);
        let right = row(&[("c", DataType::I64, false), ("d", DataType::Varchar(Some(20)), true)]);

        let unified = unify_rows(&left, &right).unwrap();
        assert_eq!(unified.fields[0], Field::new("a", DataType::I64, false));
        assert_eq!(unified.fields[1], Field::new("b", DataType::Varchar(Some(20)), true));
    }

    #[test]
    fn unify_rejects_column_count_mismatch() {
        let left = row(&[("a", DataType::I32, false), ("b", DataType::Text, false)]);
        let right = row(&[
            ("c", DataType::I32, false),
            ("d", DataType::Text, false),
            ("e", DataType::Bool, false),
        ]);

        assert_eq!(
            unify_rows(&left, &right),
            Err(RowTypeIncompatibility::ColumnCount { left: 2, right: 3 })
        );
    }

    #[test]
    fn unify_rejects_incompatible_field() {
        let left = row(&[("a", DataType::Bool, false)]);
        let right = row(&[("b", DataType::Date, false)]);

        assert_eq!(
            unify_rows(&left, &right),
            Err(RowTypeIncompatibility::NoCommonType {
                position: 1,
                left: DataType::Bool,
                right: DataType::Date,
            })
        );
    }

    #[test]
    fn unify_null_field_forces_nullable() {
        let left = row(&[("a", DataType::Null, false)]);
        let right = row(&[("b", DataType::I32, false)]);

        let unified = unify_rows(&left, &right).unwrap();
        assert_eq!(unified.fields[0], Field::new("a", DataType::I32, true));
    }
}
