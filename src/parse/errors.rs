use thiserror::Error;

use crate::diag::Span;
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("Expected struct, resource, or fn, found: {0}")]
    ExpectedItem(Token),

    #[error("Expected {0}, found: {1}")]
    ExpectedToken(TokenKind, Token),

    #[error("Expected identifier, found: {0}")]
    ExpectedIdent(Token),

    #[error("Expected type, found: {0}")]
    ExpectedType(Token),

    #[error("Expected expression, found: {0}")]
    ExpectedExpr(Token),

    #[error("Expected format string, found: {0}")]
    ExpectedFormatString(Token),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::ExpectedItem(token) => token.span,
            ParseError::ExpectedToken(_, token) => token.span,
            ParseError::ExpectedIdent(token) => token.span,
            ParseError::ExpectedType(token) => token.span,
            ParseError::ExpectedExpr(token) => token.span,
            ParseError::ExpectedFormatString(token) => token.span,
        }
    }
}
