use std::fmt;

/// Single-character operators and the merged `>=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Amp,
    Pipe,
    Tilde,
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LParen,
    RParen,
}

impl Symbol {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '&' => Some(Symbol::Amp),
            '|' => Some(Symbol::Pipe),
            '~' => Some(Symbol::Tilde),
            '=' => Some(Symbol::Equal),
            '>' => Some(Symbol::Greater),
            '<' => Some(Symbol::Less),
            '(' => Some(Symbol::LParen),
            ')' => Some(Symbol::RParen),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Amp => "&",
            Symbol::Pipe => "|",
            Symbol::Tilde => "~",
            Symbol::Equal => "=",
            Symbol::Greater => ">",
            Symbol::GreaterOrEqual => ">=",
            Symbol::Less => "<",
            Symbol::LParen => "(",
            Symbol::RParen => ")",
        }
    }
}

/// A lexical unit of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Field name, literal or keyword, with original case preserved
    Word(String),
    Symbol(Symbol),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word(word) => word,
            Token::Symbol(symbol) => symbol.as_str(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Split a query string into tokens.
///
/// Never fails: anything malformed is left for the parser to reject.
/// Only `>` merges with a following `=`; `<=` always lexes as `<` then `=`.
/// A backslash escapes a single whitespace character into the current word.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            flush_word(&mut word, &mut tokens);
        } else if let Some(mut symbol) = Symbol::from_char(c) {
            if symbol == Symbol::Greater && chars.peek() == Some(&'=') {
                chars.next();
                symbol = Symbol::GreaterOrEqual;
            }
            flush_word(&mut word, &mut tokens);
            tokens.push(Token::Symbol(symbol));
        } else if c == '\\' {
            match chars.next_if(|next| next.is_whitespace()) {
                Some(escaped) => word.push(escaped),
                None => word.push(c),
            }
        } else {
            word.push(c);
        }
    }
    flush_word(&mut word, &mut tokens);

    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}
