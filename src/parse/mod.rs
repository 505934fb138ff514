use crate::ast::*;
use crate::diag::{Position, Span};
use crate::lexer::{Token, TokenKind, TokenKind as TK};

mod decl;
mod errors;
mod expr;
mod stmt;

pub use errors::ParseError;

#[derive(Debug, Clone, Copy)]
struct Marker {
    pos: Position,
    token_index: usize,
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    curr_token: &'a Token,
}

impl<'a> Parser<'a> {
    /// `tokens` must be terminated by an `Eof` token (the lexer's `tokenize`
    /// iterator guarantees this).
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            pos: 0,
            curr_token: &tokens[0],
        }
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();

        while self.curr_token.kind != TK::Eof {
            match self.curr_token.kind {
                TK::KwStruct => program.structs.push(self.parse_struct_def()?),
                TK::KwResource => program.resources.push(self.parse_resource_def()?),
                TK::KwFn => program.funcs.push(self.parse_func_def()?),
                _ => return Err(ParseError::ExpectedItem(self.curr_token.clone())),
            }
        }

        Ok(program)
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
            self.curr_token = &self.tokens[self.pos];
        }
    }

    fn mark(&self) -> Marker {
        Marker {
            pos: self.curr_token.span.start,
            token_index: self.pos,
        }
    }

    fn close(&self, marker: Marker) -> Span {
        let end = if self.pos == marker.token_index {
            self.curr_token.span.end
        } else {
            self.tokens[self.pos - 1].span.end
        };
        Span::new(marker.pos, end)
    }

    fn consume(&mut self, expected: &TokenKind) -> Result<(), ParseError> {
        if self.curr_token.kind == *expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::ExpectedToken(
                expected.clone(),
                self.curr_token.clone(),
            ))
        }
    }

    fn consume_if(&mut self, expected: &TokenKind) -> bool {
        if self.curr_token.kind == *expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match &self.curr_token.kind {
            TK::Ident(name) => {
                let name = name.clone();
                let span = self.curr_token.span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(ParseError::ExpectedIdent(self.curr_token.clone())),
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_parse.rs"]
mod tests;
