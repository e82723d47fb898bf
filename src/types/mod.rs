//! Type model: SQL data types, row types, and catalog schemas.

pub mod data_type;
pub mod row_type;
pub mod schema;

pub use data_type::DataType;
pub use row_type::{Field, RowType, RowTypeIncompatibility};
pub use schema::{Column, Table};
