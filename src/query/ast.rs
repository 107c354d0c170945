//! Expression tree produced by the query parser

use std::fmt;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Shell-style wildcard match (`~`)
    Glob,
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Glob => "~",
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// A single `field operator literal` test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Field name as written in the query
    pub field: String,
    pub operator: Operator,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Condition(Condition),
    Boolean {
        connective: Connective,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn condition(field: &str, operator: Operator, literal: &str) -> Self {
        Expression::Condition(Condition {
            field: field.to_string(),
            operator,
            literal: literal.to_string(),
        })
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::boolean(Connective::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::boolean(Connective::Or, left, right)
    }

    fn boolean(connective: Connective, left: Expression, right: Expression) -> Self {
        Expression::Boolean {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connective::And => write!(f, "and"),
            Connective::Or => write!(f, "or"),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully parenthesized rendering, so grouping is visible in logs
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Condition(cond) => {
                write!(f, "{} {} {}", cond.field, cond.operator, cond.literal)
            }
            Expression::Boolean {
                connective,
                left,
                right,
            } => write!(f, "({left} {connective} {right})"),
        }
    }
}
