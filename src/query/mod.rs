//! Access-log query language
//!
//! A query is a boolean combination of field comparisons, evaluated
//! against every record of a log.
//!
//! # Syntax
//!
//! ```text
//! field OP value                  Compare one field of the record
//! expr and expr / expr & expr     Both sides must hold
//! expr or expr / expr | expr      Either side must hold
//! ( expr )                        Grouping
//! ```
//!
//! `and` and `or` share one precedence level and group left to right, so
//! `a and b or c` means `(a and b) or c`. Use parentheses to group otherwise.
//!
//! # Operators
//!
//! - `=`  equality, case-insensitive for text fields
//! - `~`  shell glob (`*`, `?`, `[seq]`), case-sensitive
//! - `>`, `>=`, `<` ordering (`<=` is not a token: it reads as `<` `=`)
//!
//! Values are converted to the field's type: integers for `status` and
//! `size`, a float for `version`, an IPv4 address for `ip` and an ISO-8601
//! timestamp for `datetime`. A backslash before a space keeps the space in
//! the value.
//!
//! # Examples
//!
//! ```text
//! method = POST
//! status ~ 50?
//! size >= 60000000
//! user_agent ~ *Version/6.0\ Mobile* and ip = 66.249.73.135
//! (METHOD = post or url ~ *admin*) & (ip > 91.0.0.0 | referrer ~ *://*)
//! ```

pub mod ast;
pub mod compare;
pub mod error;
pub mod eval;
pub mod glob;
pub mod lexer;
pub mod parser;

use std::collections::HashMap;

pub use ast::{Condition, Connective, Expression, Operator};
pub use compare::compare;
pub use error::{CoercionError, QueryError, QueryResult};
pub use eval::{evaluate, evaluate_with};
pub use glob::Glob;
pub use lexer::{Token, tokenize};
pub use parser::{parse_query, parse_tokens};

use crate::parser::{AccessRecord, FieldValue};
use compare::glob_match;

/// A parsed query, ready to be matched against a record stream
#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    expression: Expression,
    /// Glob conditions compiled once per query, keyed by pattern
    globs: HashMap<String, Glob>,
}

impl Query {
    pub fn parse(text: &str) -> QueryResult<Self> {
        let expression = parse_query(text)?;
        let mut globs = HashMap::new();
        collect_globs(&expression, &mut globs);

        Ok(Self {
            text: text.to_string(),
            expression,
            globs,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Check whether a record satisfies the query
    pub fn matches(&self, record: &AccessRecord) -> QueryResult<bool> {
        evaluate_with(
            &self.expression,
            record,
            &mut |cond: &Condition, value: FieldValue<'_>| match self.globs.get(&cond.literal) {
                Some(glob) if cond.operator == Operator::Glob => Ok(glob_match(glob, value)),
                _ => compare(&cond.literal, cond.operator, value),
            },
        )
    }
}

/// Invalid patterns are skipped here and reported if evaluation reaches them
fn collect_globs(expr: &Expression, globs: &mut HashMap<String, Glob>) {
    match expr {
        Expression::Condition(cond) if cond.operator == Operator::Glob => {
            if let Ok(glob) = Glob::new(&cond.literal) {
                globs.insert(cond.literal.clone(), glob);
            }
        }
        Expression::Condition(_) => {}
        Expression::Boolean { left, right, .. } => {
            collect_globs(left, globs);
            collect_globs(right, globs);
        }
    }
}
