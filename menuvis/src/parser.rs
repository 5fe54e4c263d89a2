//! Expression parser
//!
//! Recursive descent over the token stream. Calls are checked against the
//! allow-list while parsing, so a parsed `Expr` never names a call outside it.
//! Nesting and operator counts are capped so neither parsing nor evaluating a
//! hostile expression can exhaust the stack.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::lexer::{tokenize, Token, TokenKind};
use menuvis_core::VisError;
use menuvis_plugin::AllowList;

/// Deepest allowed nesting of `(`, `[`, calls and `!`
pub const MAX_DEPTH: usize = 64;
/// Most binary operators one expression may hold
pub const MAX_OPERATORS: usize = 128;

/// Parse an expression, rejecting calls not on the allow-list
pub fn parse_expr(input: &str, allow: &AllowList) -> Result<Expr, VisError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(VisError::parse_error("empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0, end: input.len(), allow, depth: 0, operators: 0 };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(parser.unexpected(tok)),
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    allow: &'a AllowList,
    depth: usize,
    operators: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), VisError> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(tok) => Err(VisError::parse_error(format!(
                "expected '{}' but found '{}'", kind.describe(), tok.kind.describe()
            )).at(tok.pos)),
            None => Err(self.eof(&format!("expected '{}'", kind.describe()))),
        }
    }

    fn unexpected(&self, tok: &Token) -> VisError {
        VisError::parse_error(format!("unexpected '{}'", tok.kind.describe())).at(tok.pos)
    }

    fn eof(&self, what: &str) -> VisError {
        VisError::parse_error(format!("{} at end of expression", what)).at(self.end)
    }

    fn descend(&mut self, pos: usize) -> Result<(), VisError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(VisError::parse_error("expression nested too deeply")
                .with_suggestion(format!("Use at most {} levels of nesting", MAX_DEPTH))
                .at(pos));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    /// Binary operators build left-deep trees without recursing here, so
    /// they are counted instead of nested
    fn count_operator(&mut self) -> Result<(), VisError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            let pos = self.tokens.get(self.pos.saturating_sub(1)).map_or(self.end, |t| t.pos);
            return Err(VisError::parse_error("expression has too many operators")
                .with_suggestion(format!("Use at most {} operators", MAX_OPERATORS))
                .at(pos));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, VisError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            self.count_operator()?;
            let right = self.parse_and()?;
            left = Expr::Binary(Box::new(left), BinOp::Or, Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, VisError> {
        let mut left = self.parse_not()?;
        while self.eat(&TokenKind::And) {
            self.count_operator()?;
            let right = self.parse_not()?;
            left = Expr::Binary(Box::new(left), BinOp::And, Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, VisError> {
        if let Some(tok) = self.peek().filter(|t| t.kind == TokenKind::Not) {
            let pos = tok.pos;
            self.pos += 1;
            self.descend(pos)?;
            let inner = self.parse_not()?;
            self.ascend();
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, VisError> {
        let left = self.parse_primary()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => BinOp::Eq,
            Some(TokenKind::NotEq) => BinOp::NotEq,
            Some(TokenKind::Lt) => BinOp::Lt,
            Some(TokenKind::Le) => BinOp::Le,
            Some(TokenKind::Gt) => BinOp::Gt,
            Some(TokenKind::Ge) => BinOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        self.count_operator()?;
        let right = self.parse_primary()?;
        Ok(Expr::Binary(Box::new(left), op, Box::new(right)))
    }

    fn parse_primary(&mut self) -> Result<Expr, VisError> {
        let Some(tok) = self.advance() else {
            return Err(self.eof("expected a value"));
        };
        match tok.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Str(s) => Ok(Expr::Str(s)),
            TokenKind::True => Ok(Expr::Bool(true)),
            TokenKind::False => Ok(Expr::Bool(false)),
            TokenKind::Null => Ok(Expr::Null),
            TokenKind::Variable(name) => Ok(Expr::Variable(name)),
            TokenKind::LParen => {
                self.descend(tok.pos)?;
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen)?;
                self.ascend();
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.descend(tok.pos)?;
                let items = self.parse_args(TokenKind::RBracket)?;
                self.ascend();
                Ok(Expr::List(items))
            }
            TokenKind::Ident(name) => {
                if self.peek_kind() != Some(&TokenKind::LParen) {
                    return Err(VisError::parse_error(format!("bare name '{}' (only calls are allowed)", name))
                        .with_suggestion(format!("Did you mean {}() or ${}?", name, name))
                        .at(tok.pos));
                }
                if !self.allow.contains(&name) {
                    return Err(VisError::disallowed_call(&name).at(tok.pos));
                }
                self.pos += 1;
                self.descend(tok.pos)?;
                let args = self.parse_args(TokenKind::RParen)?;
                self.ascend();
                Ok(Expr::Call(name, args))
            }
            _ => Err(self.unexpected(&tok)),
        }
    }

    /// Comma-separated expressions up to and including `close`
    fn parse_args(&mut self, close: TokenKind) -> Result<Vec<Expr>, VisError> {
        let mut args = Vec::new();
        if self.eat(&close) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(close.clone())?;
            return Ok(args);
        }
    }
}
