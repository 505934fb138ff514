use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::num::ParseIntError;
use std::str::Chars;

use thiserror::Error;

use crate::diag::{Position, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum TokenKind {
    // Identifiers and literals
    Ident(String),
    IntLit(i64),
    StringLit(String),

    // Keywords
    KwStruct,
    KwResource,
    KwCleanup,
    KwFn,
    KwLet,
    KwMut,
    KwRef,
    KwInout,
    KwManaged,
    KwReturn,
    KwPrintln,
    KwTrue,
    KwFalse,
    KwInt,
    KwBool,
    KwUnit,

    // Punctuation and operators
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Equals,
    Arrow,
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    NotEq,
    LessThan,
    LessThanEq,
    GreaterThan,
    GreaterThanEq,

    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::IntLit(value) => write!(f, "{}", value),
            TokenKind::StringLit(value) => write!(f, "{:?}", value),
            TokenKind::KwStruct => write!(f, "struct"),
            TokenKind::KwResource => write!(f, "resource"),
            TokenKind::KwCleanup => write!(f, "cleanup"),
            TokenKind::KwFn => write!(f, "fn"),
            TokenKind::KwLet => write!(f, "let"),
            TokenKind::KwMut => write!(f, "mut"),
            TokenKind::KwRef => write!(f, "ref"),
            TokenKind::KwInout => write!(f, "inout"),
            TokenKind::KwManaged => write!(f, "managed"),
            TokenKind::KwReturn => write!(f, "return"),
            TokenKind::KwPrintln => write!(f, "println"),
            TokenKind::KwTrue => write!(f, "true"),
            TokenKind::KwFalse => write!(f, "false"),
            TokenKind::KwInt => write!(f, "int"),
            TokenKind::KwBool => write!(f, "bool"),
            TokenKind::KwUnit => write!(f, "unit"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Equals => write!(f, "="),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::LessThanEq => write!(f, "<="),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::GreaterThanEq => write!(f, ">="),
            TokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

fn keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "struct" => Some(TokenKind::KwStruct),
        "resource" => Some(TokenKind::KwResource),
        "cleanup" => Some(TokenKind::KwCleanup),
        "fn" => Some(TokenKind::KwFn),
        "let" => Some(TokenKind::KwLet),
        "mut" => Some(TokenKind::KwMut),
        "ref" => Some(TokenKind::KwRef),
        "inout" => Some(TokenKind::KwInout),
        "managed" => Some(TokenKind::KwManaged),
        "return" => Some(TokenKind::KwReturn),
        "println" => Some(TokenKind::KwPrintln),
        "true" => Some(TokenKind::KwTrue),
        "false" => Some(TokenKind::KwFalse),
        "int" => Some(TokenKind::KwInt),
        "bool" => Some(TokenKind::KwBool),
        "unit" => Some(TokenKind::KwUnit),
        _ => None,
    }
}

#[derive(Debug, Clone, Error)]
pub enum LexError {
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char, Span),

    #[error("Unterminated string literal")]
    UnterminatedString(Span),

    #[error("Invalid escape sequence: \\{0}")]
    InvalidEscape(char, Span),

    #[error("Invalid integer: {0}")]
    InvalidInteger(ParseIntError, Span),
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter(_, span) => *span,
            LexError::UnterminatedString(span) => *span,
            LexError::InvalidEscape(_, span) => *span,
            LexError::InvalidInteger(_, span) => *span,
        }
    }
}

pub struct Lexer<'a> {
    source: Peekable<Chars<'a>>,
    pos: Position,
    emitted_eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.chars().peekable(),
            pos: Position::start(),
            emitted_eof: false,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.next()?;
        self.pos.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        loop {
            while let Some(&ch) = self.source.peek()
                && ch.is_whitespace()
            {
                self.advance();
            }
            // Line comment
            if let Some(&'/') = self.source.peek() {
                let mut lookahead = self.source.clone();
                lookahead.next();
                if lookahead.peek() == Some(&'/') {
                    while let Some(&ch) = self.source.peek()
                        && ch != '\n'
                    {
                        self.advance();
                    }
                    continue;
                }
            }
            break;
        }
    }

    /// Consume the next character and wrap `kind` in a single-char token.
    fn single(&mut self, kind: TokenKind) -> Result<Token, LexError> {
        let start = self.pos;
        self.advance();
        Ok(Token {
            kind,
            span: Span::new(start, self.pos),
        })
    }

    /// Consume one character, then pick between a one- and two-char token
    /// depending on whether `second` follows.
    fn one_or_two(
        &mut self,
        second: char,
        two: TokenKind,
        one: TokenKind,
    ) -> Result<Token, LexError> {
        let start = self.pos;
        self.advance();
        let kind = if self.source.peek() == Some(&second) {
            self.advance();
            two
        } else {
            one
        };
        Ok(Token {
            kind,
            span: Span::new(start, self.pos),
        })
    }

    fn scan_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.source.peek() {
                None => return Err(LexError::UnterminatedString(Span::new(start, self.pos))),
                Some(&'"') => {
                    self.advance();
                    return Ok(Token {
                        kind: TokenKind::StringLit(value),
                        span: Span::new(start, self.pos),
                    });
                }
                Some(&'\\') => {
                    self.advance();
                    let escape_start = self.pos;
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some(other) => {
                            return Err(LexError::InvalidEscape(
                                other,
                                Span::new(escape_start, self.pos),
                            ));
                        }
                        None => {
                            return Err(LexError::UnterminatedString(Span::new(start, self.pos)));
                        }
                    }
                }
                Some(_) => {
                    let ch = self.advance().unwrap();
                    value.push(ch);
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start = self.pos;
        match self.source.peek() {
            Some(&ch) if ch.is_alphabetic() || ch == '_' => {
                let mut ident = String::new();
                while let Some(&ch) = self.source.peek()
                    && (ch.is_alphanumeric() || ch == '_')
                {
                    ident.push(ch);
                    self.advance();
                }
                let kind = keyword(&ident).unwrap_or(TokenKind::Ident(ident));
                Ok(Token {
                    kind,
                    span: Span::new(start, self.pos),
                })
            }
            Some(&ch) if ch.is_ascii_digit() => {
                let mut num_str = String::new();
                while let Some(&ch) = self.source.peek()
                    && ch.is_ascii_digit()
                {
                    num_str.push(ch);
                    self.advance();
                }
                let span = Span::new(start, self.pos);
                let value = num_str
                    .parse::<i64>()
                    .map_err(|e| LexError::InvalidInteger(e, span))?;
                Ok(Token {
                    kind: TokenKind::IntLit(value),
                    span,
                })
            }
            Some(&'"') => self.scan_string(),
            Some(&'-') => self.one_or_two('>', TokenKind::Arrow, TokenKind::Minus),
            Some(&'=') => self.one_or_two('=', TokenKind::EqEq, TokenKind::Equals),
            Some(&'<') => self.one_or_two('=', TokenKind::LessThanEq, TokenKind::LessThan),
            Some(&'>') => self.one_or_two('=', TokenKind::GreaterThanEq, TokenKind::GreaterThan),
            Some(&'!') => {
                self.advance();
                if self.source.peek() == Some(&'=') {
                    self.advance();
                    Ok(Token {
                        kind: TokenKind::NotEq,
                        span: Span::new(start, self.pos),
                    })
                } else {
                    Err(LexError::UnexpectedCharacter(
                        '!',
                        Span::new(start, self.pos),
                    ))
                }
            }
            Some(&'+') => self.single(TokenKind::Plus),
            Some(&'*') => self.single(TokenKind::Star),
            Some(&'/') => self.single(TokenKind::Slash),
            Some(&'(') => self.single(TokenKind::LParen),
            Some(&')') => self.single(TokenKind::RParen),
            Some(&'{') => self.single(TokenKind::LBrace),
            Some(&'}') => self.single(TokenKind::RBrace),
            Some(&',') => self.single(TokenKind::Comma),
            Some(&':') => self.single(TokenKind::Colon),
            Some(&';') => self.single(TokenKind::Semicolon),
            Some(&'.') => self.single(TokenKind::Dot),
            Some(&ch) => {
                self.advance();
                Err(LexError::UnexpectedCharacter(
                    ch,
                    Span::new(start, self.pos),
                ))
            }
            None => Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
            }),
        }
    }

    /// Iterator over the token stream. The final item is the `Eof` token, so
    /// the collected stream is never empty.
    pub fn tokenize(self) -> impl Iterator<Item = Result<Token, LexError>> {
        self
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted_eof {
            return None;
        }
        match self.next_token() {
            Ok(token) => {
                if token.kind == TokenKind::Eof {
                    self.emitted_eof = true;
                }
                Some(Ok(token))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

#[cfg(test)]
#[path = "tests/t_lexer.rs"]
mod tests;
