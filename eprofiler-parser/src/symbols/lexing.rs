//! Tokenization entry point for one symbol line.
//!
//! This is the source that creates the token stream from a string; the
//! parser operates on the stream produced here, never on raw text. Tokens
//! are paired with their byte ranges so errors can point at the offending
//! span.

use logos::Logos;
use std::ops::Range;

use crate::symbols::error::SymbolError;
use crate::symbols::token::Token;

/// Tokenize one demangled symbol line.
///
/// Any character outside the sub-language is fatal: the whole line is
/// rejected as [SymbolError::MalformedSymbolLine].
pub fn tokenize(line: &str) -> Result<Vec<(Token, Range<usize>)>, SymbolError> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(SymbolError::malformed(
                    line,
                    format!("unexpected character at byte {}", lexer.span().start),
                ))
            }
        }
    }

    Ok(tokens)
}
