//! Tokenizer for the expression language (spec §4.1).

use std::fmt;
use std::str::Chars;

use octran_common::Span;

use crate::token::{Token, TokenKind};

/// A lexer error with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    UnexpectedCharacter(char),
    UnterminatedString,
    InvalidNumberLiteral(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::InvalidNumberLiteral(s) => write!(f, "invalid number literal: {s}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.kind, self.span.start)
    }
}

impl std::error::Error for LexError {}

/// Byte-level cursor over the source text, tracking the current offset.
struct Cursor<'src> {
    chars: Chars<'src>,
    pos: u32,
}

impl<'src> Cursor<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn pos(&self) -> u32 {
        self.pos
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize a complete expression source string.
///
/// The returned vector always ends with an [`TokenKind::Eof`] token on
/// success.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        cursor.eat_while(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r');
        let start = cursor.pos();

        let Some(c) = cursor.peek() else {
            tokens.push(Token::new(TokenKind::Eof, start, start));
            return Ok(tokens);
        };

        let tok = match c {
            '(' => single(&mut cursor, TokenKind::LParen, start),
            ')' => single(&mut cursor, TokenKind::RParen, start),
            ',' => single(&mut cursor, TokenKind::Comma, start),
            '+' => single(&mut cursor, TokenKind::Plus, start),
            '-' => single(&mut cursor, TokenKind::Minus, start),
            '*' => single(&mut cursor, TokenKind::Star, start),
            '/' => single(&mut cursor, TokenKind::Slash, start),
            '^' => single(&mut cursor, TokenKind::Caret, start),
            '\'' | '"' => lex_string(&mut cursor, c, start)?,
            '0'..='9' => lex_number(&mut cursor, start)?,
            c if is_ident_start(c) => lex_ident(&mut cursor, start),
            c => {
                cursor.advance();
                return Err(LexError::new(
                    LexErrorKind::UnexpectedCharacter(c),
                    Span::new(start, cursor.pos()),
                ));
            }
        };
        tokens.push(tok);
    }
}

fn single(cursor: &mut Cursor, kind: TokenKind, start: u32) -> Token {
    cursor.advance();
    Token::new(kind, start, cursor.pos())
}

fn lex_ident(cursor: &mut Cursor, start: u32) -> Token {
    let mut text = String::new();
    while let Some(c) = cursor.peek() {
        if is_ident_continue(c) {
            text.push(c);
            cursor.advance();
        } else {
            break;
        }
    }
    Token::new(TokenKind::Ident(text), start, cursor.pos())
}

fn lex_number(cursor: &mut Cursor, start: u32) -> Result<Token, LexError> {
    let mut text = String::new();
    let mut is_float = false;

    while let Some(c) = cursor.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            cursor.advance();
        } else {
            break;
        }
    }

    if cursor.peek() == Some('.') {
        // Only consume the '.' as part of the number if followed by a digit;
        // otherwise it belongs to whatever comes after the expression.
        let mut lookahead = cursor.chars.clone();
        lookahead.next();
        if matches!(lookahead.next(), Some(d) if d.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            cursor.advance();
            while let Some(c) = cursor.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    cursor.advance();
                } else {
                    break;
                }
            }
        }
    }

    let span = Span::new(start, cursor.pos());
    let value: f64 = text
        .parse()
        .map_err(|_| LexError::new(LexErrorKind::InvalidNumberLiteral(text.clone()), span))?;

    let kind = if is_float {
        TokenKind::Float(value)
    } else {
        TokenKind::Int(value)
    };
    Ok(Token::new(kind, start, cursor.pos()))
}

fn lex_string(cursor: &mut Cursor, quote: char, start: u32) -> Result<Token, LexError> {
    cursor.advance(); // opening quote
    let mut text = String::new();
    loop {
        match cursor.advance() {
            None => {
                return Err(LexError::new(
                    LexErrorKind::UnterminatedString,
                    Span::new(start, cursor.pos()),
                ))
            }
            Some(c) if c == quote => break,
            Some('\\') => match cursor.advance() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('\\') => text.push('\\'),
                Some(c) if c == quote => text.push(quote),
                Some(other) => {
                    text.push('\\');
                    text.push(other);
                }
                None => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        Span::new(start, cursor.pos()),
                    ))
                }
            },
            Some(c) => text.push(c),
        }
    }
    Ok(Token::new(TokenKind::Str(text), start, cursor.pos()))
}
