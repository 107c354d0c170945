use super::ast::{Connective, Expression, Operator};
use super::error::{QueryError, QueryResult};
use super::lexer::{Symbol, Token, tokenize};

/// Parse a query string into an expression tree
pub fn parse_query(input: &str) -> QueryResult<Expression> {
    parse_tokens(&tokenize(input))
}

/// Parse a token sequence; every token must be consumed
pub fn parse_tokens(tokens: &[Token]) -> QueryResult<Expression> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;

    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(QueryError::syntax(
            parser.pos,
            token.text(),
            "unexpected token after complete expression",
        )),
    }
}

/// Recursive-descent parser with a single forward cursor.
///
/// Both connectives share one precedence level and fold left to right:
/// `a and b or c` is `(a and b) or c`.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_expression(&mut self) -> QueryResult<Expression> {
        let mut left = self.parse_term()?;

        while let Some(connective) = self.peek().and_then(connective) {
            self.pos += 1;
            let right = self.parse_term()?;
            left = Expression::Boolean {
                connective,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> QueryResult<Expression> {
        match self.peek() {
            Some(Token::Symbol(Symbol::LParen)) => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                match self.peek() {
                    Some(Token::Symbol(Symbol::RParen)) => {
                        self.pos += 1;
                        Ok(expr)
                    }
                    Some(token) => Err(QueryError::syntax(
                        self.pos,
                        token.text(),
                        "missing closing parenthesis",
                    )),
                    None => Err(QueryError::syntax(
                        self.pos,
                        "",
                        "missing closing parenthesis",
                    )),
                }
            }
            Some(_) => self.parse_condition(),
            None => Err(QueryError::syntax(
                self.pos,
                "",
                "expected a condition or '(' but the query ended",
            )),
        }
    }

    fn parse_condition(&mut self) -> QueryResult<Expression> {
        let [field, op, literal] = match self.tokens.get(self.pos..self.pos + 3) {
            Some([field, op, literal]) => [field, op, literal],
            _ => {
                let token = self.peek().map(Token::text).unwrap_or_default();
                return Err(QueryError::syntax(
                    self.pos,
                    token,
                    "incomplete condition, expected 'field operator value'",
                ));
            }
        };

        let Some(operator) = operator(op) else {
            return Err(QueryError::syntax(
                self.pos + 1,
                op.text(),
                "expected one of ~ = > >= < <=",
            ));
        };

        self.pos += 3;
        Ok(Expression::condition(field.text(), operator, literal.text()))
    }
}

fn connective(token: &Token) -> Option<Connective> {
    match token {
        Token::Symbol(Symbol::Amp) => Some(Connective::And),
        Token::Symbol(Symbol::Pipe) => Some(Connective::Or),
        Token::Word(word) if word == "and" => Some(Connective::And),
        Token::Word(word) if word == "or" => Some(Connective::Or),
        _ => None,
    }
}

fn operator(token: &Token) -> Option<Operator> {
    match token {
        Token::Symbol(Symbol::Tilde) => Some(Operator::Glob),
        Token::Symbol(Symbol::Equal) => Some(Operator::Eq),
        Token::Symbol(Symbol::Greater) => Some(Operator::Gt),
        Token::Symbol(Symbol::GreaterOrEqual) => Some(Operator::Ge),
        Token::Symbol(Symbol::Less) => Some(Operator::Lt),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(field: &str, op: Operator, literal: &str) -> Expression {
        Expression::condition(field, op, literal)
    }

    #[test]
    fn test_single_condition() {
        assert_eq!(
            parse_query("status = 404").unwrap(),
            cond("status", Operator::Eq, "404")
        );
    }

    #[test]
    fn test_connectives_fold_left_without_precedence() {
        let expr = parse_query("a = 1 or b = 2 and c = 3").unwrap();
        assert_eq!(
            expr,
            Expression::and(
                Expression::or(cond("a", Operator::Eq, "1"), cond("b", Operator::Eq, "2")),
                cond("c", Operator::Eq, "3"),
            )
        );
    }

    #[test]
    fn test_symbol_connectives() {
        let expr = parse_query("a = 1 & b = 2 | c = 3").unwrap();
        assert_eq!(expr.to_string(), "((a = 1 and b = 2) or c = 3)");
    }

    #[test]
    fn test_parentheses_group() {
        let expr = parse_query("a = 1 and (b = 2 or c = 3)").unwrap();
        assert_eq!(
            expr,
            Expression::and(
                cond("a", Operator::Eq, "1"),
                Expression::or(cond("b", Operator::Eq, "2"), cond("c", Operator::Eq, "3")),
            )
        );
    }

    #[test]
    fn test_nested_parentheses() {
        let expr = parse_query("((method = post))").unwrap();
        assert_eq!(expr, cond("method", Operator::Eq, "post"));
    }

    #[test]
    fn test_less_or_equal_is_rejected() {
        // `<=` lexes as `<` `=`, leaving a dangling token
        let err = parse_query("status <= 403").unwrap_err();
        assert!(matches!(err, QueryError::Syntax { .. }));
    }

    #[test]
    fn test_all_operators() {
        for (text, op) in [
            ("~", Operator::Glob),
            ("=", Operator::Eq),
            (">", Operator::Gt),
            (">=", Operator::Ge),
            ("<", Operator::Lt),
        ] {
            let expr = parse_query(&format!("size {text} 10")).unwrap();
            assert_eq!(expr, cond("size", op, "10"));
        }
    }

    #[test]
    fn test_missing_closing_parenthesis() {
        let err = parse_query("(a = 1 and b = 2").unwrap_err();
        match err {
            QueryError::Syntax { message, .. } => {
                assert!(message.contains("closing parenthesis"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_condition() {
        let err = parse_query("status =").unwrap_err();
        assert_eq!(
            err,
            QueryError::syntax(
                0,
                "status",
                "incomplete condition, expected 'field operator value'"
            )
        );
    }

    #[test]
    fn test_bad_operator_reports_position() {
        let err = parse_query("status is 404").unwrap_err();
        match err {
            QueryError::Syntax {
                position, token, ..
            } => {
                assert_eq!(position, 1);
                assert_eq!(token, "is");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        assert!(parse_query("a = 1 )").is_err());
        assert!(parse_query("a = 1 AND b = 2").is_err());
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query("").is_err());
        assert!(parse_query("a = 1 and").is_err());
    }

    #[test]
    fn test_literal_may_be_any_token() {
        assert_eq!(
            parse_query("url = )").unwrap(),
            cond("url", Operator::Eq, ")")
        );
    }
}
