//! SQL scalar expressions, e.g. `a + 7 > b`. Can be nested.

use std::fmt;

/// SQL expressions appearing in projections, filters, and VALUES rows.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// A column reference, optionally qualified with a table name.
    Column(Option<String>, String),
    /// A literal value.
    Literal(Literal),
    /// An operator.
    Operator(Operator),
}

/// Expression literal values.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i128),
    Float(f64),
    Decimal(rust_decimal::Decimal),
    String(String),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    Timestamp(chrono::NaiveDateTime),
}

/// Expression operators.
///
/// Since this is a recursive data structure, each child expression is boxed.
#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    And(Box<Expression>, Box<Expression>), // a AND b
    Or(Box<Expression>, Box<Expression>),  // a OR b
    Not(Box<Expression>),                  // NOT a

    Equal(Box<Expression>, Box<Expression>),       // a = b
    NotEqual(Box<Expression>, Box<Expression>),    // a != b
    GreaterThan(Box<Expression>, Box<Expression>), // a > b
    GreaterThanOrEqual(Box<Expression>, Box<Expression>), // a >= b
    LessThan(Box<Expression>, Box<Expression>),    // a < b
    LessThanOrEqual(Box<Expression>, Box<Expression>), // a <= b

    Add(Box<Expression>, Box<Expression>),      // a + b
    Subtract(Box<Expression>, Box<Expression>), // a - b
    Multiply(Box<Expression>, Box<Expression>), // a * b
    Divide(Box<Expression>, Box<Expression>),   // a / b
    Negate(Box<Expression>),                    // -a

    /// a IS NULL, or a IS NOT NULL when negated.
    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

impl From<Operator> for Expression {
    fn from(operator: Operator) -> Self {
        Expression::Operator(operator)
    }
}

impl Expression {
    /// Shorthand for an unqualified column reference.
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(None, name.into())
    }

    /// Shorthand for a qualified column reference.
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(Some(table.into()), name.into())
    }

    /// Shorthand for an integer literal.
    pub fn integer(value: i128) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    /// Shorthand for a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(Some(table), name) => write!(f, "{}.{}", table, name),
            Expression::Column(None, name) => write!(f, "{}", name),
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Operator(op) => write!(f, "{}", op),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(true) => write!(f, "TRUE"),
            Literal::Boolean(false) => write!(f, "FALSE"),
            Literal::Integer(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Decimal(v) => write!(f, "{}", v),
            Literal::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Literal::Date(v) => write!(f, "DATE '{}'", v),
            Literal::Time(v) => write!(f, "TIME '{}'", v),
            Literal::Timestamp(v) => write!(f, "TIMESTAMP '{}'", v),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;
        match self {
            And(lhs, rhs) => write!(f, "{} AND {}", lhs, rhs),
            Or(lhs, rhs) => write!(f, "{} OR {}", lhs, rhs),
            Not(expr) => write!(f, "NOT {}", expr),
            Equal(lhs, rhs) => write!(f, "{} = {}", lhs, rhs),
            NotEqual(lhs, rhs) => write!(f, "{} != {}", lhs, rhs),
            GreaterThan(lhs, rhs) => write!(f, "{} > {}", lhs, rhs),
            GreaterThanOrEqual(lhs, rhs) => write!(f, "{} >= {}", lhs, rhs),
            LessThan(lhs, rhs) => write!(f, "{} < {}", lhs, rhs),
            LessThanOrEqual(lhs, rhs) => write!(f, "{} <= {}", lhs, rhs),
            Add(lhs, rhs) => write!(f, "{} + {}", lhs, rhs),
            Subtract(lhs, rhs) => write!(f, "{} - {}", lhs, rhs),
            Multiply(lhs, rhs) => write!(f, "{} * {}", lhs, rhs),
            Divide(lhs, rhs) => write!(f, "{} / {}", lhs, rhs),
            Negate(expr) => write!(f, "-{}", expr),
            IsNull {
                expr,
                negated: false,
            } => write!(f, "{} IS NULL", expr),
            IsNull {
                expr,
                negated: true,
            } => write!(f, "{} IS NOT NULL", expr),
        }
    }
}
