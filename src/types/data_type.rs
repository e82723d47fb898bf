//! SQL data types and the least-restrictive-type lattice

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL data types.
///
/// Nullability is a property of a row-type field, not of the type itself;
/// `Null` exists only as the type of a NULL literal and unifies with any
/// other type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    // Boolean
    Bool,
    // Integer types
    I8,
    I16,
    I32,
    I64,
    I128,
    // Float types
    F32,
    F64,
    // Decimal with optional precision and scale
    Decimal(Option<u32>, Option<u32>),
    // String types: VARCHAR with an optional length bound, and unbounded TEXT
    Varchar(Option<u32>),
    Text,
    // Date/Time types
    Date,
    Time,
    Timestamp,
    // Special types
    Uuid,
    Bytea,
    // The type of a NULL literal
    Null,
}

impl DataType {
    /// Check if this type is numeric (integer, float, or decimal).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::I8
                | DataType::I16
                | DataType::I32
                | DataType::I64
                | DataType::I128
                | DataType::F32
                | DataType::F64
                | DataType::Decimal(_, _)
        )
    }

    /// Check if this type is a signed integer.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64 | DataType::I128
        )
    }

    /// Check if this type is a character string.
    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Varchar(_) | DataType::Text)
    }

    /// Widening rank for integer types.
    fn integer_rank(&self) -> Option<u8> {
        match self {
            DataType::I8 => Some(1),
            DataType::I16 => Some(2),
            DataType::I32 => Some(3),
            DataType::I64 => Some(4),
            DataType::I128 => Some(5),
            _ => None,
        }
    }

    /// Compute the least-restrictive common type of two types: the narrowest
    /// type both can be implicitly widened to without loss. Returns `None`
    /// if no common type exists.
    ///
    /// The widening rules:
    /// - `Null` unifies with anything, yielding the other type
    /// - signed integers widen by rank (TINYINT < SMALLINT < INT < BIGINT <
    ///   HUGEINT)
    /// - an integer and a float unify to DOUBLE PRECISION; REAL and DOUBLE
    ///   PRECISION unify to DOUBLE PRECISION
    /// - an integer and a decimal unify to a decimal with the larger
    ///   precision/scale; a decimal and a float unify to DOUBLE PRECISION
    /// - VARCHAR lengths take the maximum, unbounded dominating; VARCHAR and
    ///   TEXT unify to TEXT
    /// - DATE and TIMESTAMP unify to TIMESTAMP
    pub fn unify(left: &DataType, right: &DataType) -> Option<DataType> {
        use DataType::*;

        if left == right {
            return Some(left.clone());
        }

        match (left, right) {
            (Null, other) | (other, Null) => Some(other.clone()),

            // Integer widening: take the larger rank.
            _ if left.is_integer() && right.is_integer() => {
                if left.integer_rank() >= right.integer_rank() {
                    Some(left.clone())
                } else {
                    Some(right.clone())
                }
            }

            // Floats absorb integers and each other.
            (F32, F64) | (F64, F32) => Some(F64),
            (F32 | F64, other) | (other, F32 | F64) if other.is_integer() => Some(F64),

            // Decimals absorb integers; floats absorb decimals.
            (Decimal(p, s), other) | (other, Decimal(p, s)) if other.is_integer() => {
                Some(Decimal(*p, *s))
            }
            (Decimal(lp, ls), Decimal(rp, rs)) => {
                Some(Decimal(merge_bound(*lp, *rp), merge_bound(*ls, *rs)))
            }
            (Decimal(_, _), F32 | F64) | (F32 | F64, Decimal(_, _)) => Some(F64),

            // Strings: the longer bound wins, unbounded dominates.
            (Varchar(l), Varchar(r)) => Some(Varchar(merge_bound(*l, *r))),
            (Varchar(_), Text) | (Text, Varchar(_)) => Some(Text),

            (Date, Timestamp) | (Timestamp, Date) => Some(Timestamp),

            _ => None,
        }
    }
}

/// Merge two optional bounds, taking the maximum; `None` means unbounded
/// and dominates.
fn merge_bound(left: Option<u32>, right: Option<u32>) -> Option<u32> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l.max(r)),
        _ => None,
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "BOOLEAN"),
            DataType::I8 => write!(f, "TINYINT"),
            DataType::I16 => write!(f, "SMALLINT"),
            DataType::I32 => write!(f, "INT"),
            DataType::I64 => write!(f, "BIGINT"),
            DataType::I128 => write!(f, "HUGEINT"),
            DataType::F32 => write!(f, "REAL"),
            DataType::F64 => write!(f, "DOUBLE PRECISION"),
            DataType::Decimal(p, s) => match (p, s) {
                (Some(p), Some(s)) => write!(f, "DECIMAL({}, {})", p, s),
                (Some(p), None) => write!(f, "DECIMAL({})", p),
                _ => write!(f, "DECIMAL"),
            },
            DataType::Varchar(Some(n)) => write!(f, "VARCHAR({})", n),
            DataType::Varchar(None) => write!(f, "VARCHAR"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Uuid => write!(f, "UUID"),
            DataType::Bytea => write!(f, "BYTEA"),
            DataType::Null => write!(f, "NULL"),
        }
    }
}
