//! Catalog schemas (tables and columns)
//!
//! The catalog itself is an external collaborator; the validator only reads
//! these shapes to derive base-table row types.

use super::data_type::DataType;
use super::row_type::{Field, RowType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A table schema as supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// The table name. Unique identifier for the table.
    pub name: String,
    /// The table's columns, in order.
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// The row type produced by scanning this table.
    pub fn row_type(&self) -> RowType {
        RowType::new(
            self.columns
                .iter()
                .map(|c| Field::new(c.name.clone(), c.data_type.clone(), c.nullable))
                .collect(),
        )
    }

    /// Returns the column with the given name, if it exists.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}
