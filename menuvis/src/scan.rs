//! Call-site scanner
//!
//! Reports every identifier that is immediately followed by `(`, in lexical
//! order. Input that does not tokenize is reported as an error so the gate
//! can fail closed.

use crate::lexer::{tokenize, LexError, TokenKind};

/// A call site found in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub pos: usize,
}

/// Call sites of a single input string
pub fn call_sites(input: &str) -> Result<Vec<CallSite>, LexError> {
    let tokens = tokenize(input)?;
    let sites = tokens
        .windows(2)
        .filter_map(|pair| match (&pair[0].kind, &pair[1].kind) {
            (TokenKind::Ident(name), TokenKind::LParen) => Some(CallSite {
                name: name.clone(),
                pos: pair[0].pos,
            }),
            _ => None,
        })
        .collect();
    Ok(sites)
}

/// Call sites of a save batch, scanned as one comma-joined string
pub fn scan_batch(expressions: &[&str]) -> Result<Vec<CallSite>, LexError> {
    call_sites(&expressions.join(", "))
}
