//! Tokenizer for visibility expressions
//!
//! Shared by the call-site scanner and the parser, so both see the same
//! token boundaries.

use menuvis_core::VisError;
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Call name
    Ident(String),
    /// `$name`, stored without the sigil
    Variable(String),
    Number(i64),
    Str(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl TokenKind {
    /// Source-like rendering for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => s.clone(),
            TokenKind::Variable(s) => format!("${}", s),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::Str(s) => format!("'{}'", s),
            TokenKind::True => "true".to_string(),
            TokenKind::False => "false".to_string(),
            TokenKind::Null => "null".to_string(),
            TokenKind::And => "&&".to_string(),
            TokenKind::Or => "||".to_string(),
            TokenKind::Not => "!".to_string(),
            TokenKind::Eq => "==".to_string(),
            TokenKind::NotEq => "!=".to_string(),
            TokenKind::Lt => "<".to_string(),
            TokenKind::Le => "<=".to_string(),
            TokenKind::Gt => ">".to_string(),
            TokenKind::Ge => ">=".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::LBracket => "[".to_string(),
            TokenKind::RBracket => "]".to_string(),
            TokenKind::Comma => ",".to_string(),
        }
    }
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string starting at offset {pos}")]
    UnterminatedString { pos: usize },

    #[error("number at offset {pos} does not fit in 64 bits")]
    NumberOutOfRange { pos: usize },

    #[error("expected a variable name after '$' at offset {pos}")]
    EmptyVariable { pos: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedChar { pos, .. }
            | LexError::UnterminatedString { pos }
            | LexError::NumberOutOfRange { pos }
            | LexError::EmptyVariable { pos } => *pos,
        }
    }
}

impl From<LexError> for VisError {
    fn from(e: LexError) -> Self {
        VisError::lex_error(e.to_string()).at(e.position())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword(word: &str) -> Option<TokenKind> {
    match word.to_ascii_lowercase().as_str() {
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "null" => Some(TokenKind::Null),
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        "not" => Some(TokenKind::Not),
        _ => None,
    }
}

/// Tokenize an expression
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' => single(&mut chars, TokenKind::LParen),
            ')' => single(&mut chars, TokenKind::RParen),
            '[' => single(&mut chars, TokenKind::LBracket),
            ']' => single(&mut chars, TokenKind::RBracket),
            ',' => single(&mut chars, TokenKind::Comma),
            '&' => pair(&mut chars, '&', TokenKind::And, pos, c)?,
            '|' => pair(&mut chars, '|', TokenKind::Or, pos, c)?,
            '=' => pair(&mut chars, '=', TokenKind::Eq, pos, c)?,
            '!' => {
                chars.next();
                if next_is(&mut chars, '=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                chars.next();
                if next_is(&mut chars, '=') { TokenKind::Le } else { TokenKind::Lt }
            }
            '>' => {
                chars.next();
                if next_is(&mut chars, '=') { TokenKind::Ge } else { TokenKind::Gt }
            }
            '\'' | '"' => lex_string(&mut chars, pos, c)?,
            '$' => {
                chars.next();
                let name = take_while(&mut chars, is_ident_char);
                if name.is_empty() || !name.starts_with(is_ident_start) {
                    return Err(LexError::EmptyVariable { pos });
                }
                TokenKind::Variable(name)
            }
            '-' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, d)) if d.is_ascii_digit() => lex_number(&mut chars, pos, true)?,
                    _ => return Err(LexError::UnexpectedChar { ch: '-', pos }),
                }
            }
            c if c.is_ascii_digit() => lex_number(&mut chars, pos, false)?,
            c if is_ident_start(c) => {
                let word = take_while(&mut chars, is_ident_char);
                keyword(&word).unwrap_or(TokenKind::Ident(word))
            }
            other => return Err(LexError::UnexpectedChar { ch: other, pos }),
        };
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

fn single(chars: &mut Peekable<CharIndices<'_>>, kind: TokenKind) -> TokenKind {
    chars.next();
    kind
}

fn next_is(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    if matches!(chars.peek(), Some(&(_, c)) if c == expected) {
        chars.next();
        true
    } else {
        false
    }
}

/// Two-character operators whose single character has no meaning
fn pair(
    chars: &mut Peekable<CharIndices<'_>>,
    second: char,
    kind: TokenKind,
    pos: usize,
    first: char,
) -> Result<TokenKind, LexError> {
    chars.next();
    if next_is(chars, second) {
        Ok(kind)
    } else {
        Err(LexError::UnexpectedChar { ch: first, pos })
    }
}

fn take_while(chars: &mut Peekable<CharIndices<'_>>, pred: fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !pred(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn lex_number(chars: &mut Peekable<CharIndices<'_>>, pos: usize, negative: bool) -> Result<TokenKind, LexError> {
    let digits = take_while(chars, |c| c.is_ascii_digit());
    let text = if negative { format!("-{}", digits) } else { digits };
    text.parse::<i64>()
        .map(TokenKind::Number)
        .map_err(|_| LexError::NumberOutOfRange { pos })
}

fn lex_string(chars: &mut Peekable<CharIndices<'_>>, pos: usize, quote: char) -> Result<TokenKind, LexError> {
    chars.next();
    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err(LexError::UnterminatedString { pos }),
            Some((_, c)) if c == quote => return Ok(TokenKind::Str(out)),
            Some((_, '\\')) => match chars.next() {
                None => return Err(LexError::UnterminatedString { pos }),
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, escaped)) => out.push(escaped),
            },
            Some((_, c)) => out.push(c),
        }
    }
}
