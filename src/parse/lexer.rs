//! Artifact tokenizer.
//!
//! Splits the JavaScript text of a `search-index.js` file into tokens,
//! decoding string escapes along the way. Byte offsets are tracked on every
//! token so later stages can point diagnostics into the source.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::SyntaxError;
use crate::parse::Span;

/// One lexed token with the byte range it came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// The `var` keyword.
    Var,
    /// The `null` keyword.
    Null,
    Ident(String),
    /// A string literal, escapes already decoded.
    Str(String),
    /// A non-negative integer literal.
    Number(u64),
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Semi,
    Colon,
    Eq,
}

impl TokenKind {
    /// Short rendering for "expected X, found Y" diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Var => "`var`".to_string(),
            Self::Null => "`null`".to_string(),
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Str(_) => "string literal".to_string(),
            Self::Number(n) => format!("number `{n}`"),
            Self::LBracket => "`[`".to_string(),
            Self::RBracket => "`]`".to_string(),
            Self::LBrace => "`{`".to_string(),
            Self::RBrace => "`}`".to_string(),
            Self::LParen => "`(`".to_string(),
            Self::RParen => "`)`".to_string(),
            Self::Comma => "`,`".to_string(),
            Self::Semi => "`;`".to_string(),
            Self::Colon => "`:`".to_string(),
            Self::Eq => "`=`".to_string(),
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn error_at(&self, message: impl Into<String>, position: usize) -> SyntaxError {
        SyntaxError::new(message, position, self.input)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        self.skip_whitespace();

        let start = self.position;
        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            '"' => return self.read_string().map(Some),
            '0'..='9' => return self.read_number().map(Some),
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Eq,
            c if is_ident_start(c) => return self.read_word().map(Some),
            c => return Err(self.error_at(format!("unexpected character `{c}`"), start)),
        };

        self.advance();
        Ok(Some(Token {
            kind,
            span: Span::new(start, self.position),
        }))
    }

    /// Reads an identifier or one of the two keywords.
    fn read_word(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position;
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if !is_ident_continue(ch) {
                break;
            }
            word.push(ch);
            self.advance();
        }

        let kind = match word.as_str() {
            "var" => TokenKind::Var,
            "null" => TokenKind::Null,
            _ => TokenKind::Ident(word),
        };
        Ok(Token {
            kind,
            span: Span::new(start, self.position),
        })
    }

    fn read_number(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position;
        let mut digits = String::new();

        while let Some(&ch) = self.chars.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            self.advance();
        }

        let value = digits
            .parse::<u64>()
            .map_err(|_| self.error_at(format!("number `{digits}` is out of range"), start))?;
        Ok(Token {
            kind: TokenKind::Number(value),
            span: Span::new(start, self.position),
        })
    }

    /// Reads a double-quoted string literal, decoding JavaScript escapes.
    fn read_string(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance();
                    return Ok(Token {
                        kind: TokenKind::Str(content),
                        span: Span::new(start, self.position),
                    });
                }
                Some(&'\\') => {
                    self.advance();
                    content.push(self.read_escape()?);
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => {
                    return Err(self.error_at("unterminated string literal", start));
                }
            }
        }
    }

    /// Decodes the escape following a consumed backslash.
    fn read_escape(&mut self) -> Result<char, SyntaxError> {
        let escape_start = self.position - 1;
        let Some(ch) = self.chars.next() else {
            return Err(self.error_at("unterminated string literal", escape_start));
        };
        self.position += ch.len_utf8();

        match ch {
            '"' => Ok('"'),
            '\'' => Ok('\''),
            '\\' => Ok('\\'),
            '/' => Ok('/'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000C}'),
            '0' => Ok('\0'),
            'u' => self.read_unicode_escape(escape_start),
            c => Err(self.error_at(format!("unknown escape `\\{c}`"), escape_start)),
        }
    }

    /// Decodes `\uXXXX`, pairing surrogates when the first unit is a high
    /// surrogate.
    fn read_unicode_escape(&mut self, escape_start: usize) -> Result<char, SyntaxError> {
        let first = self.read_hex4(escape_start)?;

        if (0xDC00..=0xDFFF).contains(&first) {
            return Err(self.error_at("unpaired surrogate in `\\u` escape", escape_start));
        }
        if !(0xD800..=0xDBFF).contains(&first) {
            // Outside the surrogate range every 16-bit value is a scalar.
            return char::from_u32(first)
                .ok_or_else(|| self.error_at("invalid `\\u` escape", escape_start));
        }

        // High surrogate: a `\uXXXX` low surrogate must follow.
        if self.chars.next_if_eq(&'\\').is_none() {
            return Err(self.error_at("unpaired surrogate in `\\u` escape", escape_start));
        }
        self.position += 1;
        if self.chars.next_if_eq(&'u').is_none() {
            return Err(self.error_at("unpaired surrogate in `\\u` escape", escape_start));
        }
        self.position += 1;

        let second = self.read_hex4(escape_start)?;
        if !(0xDC00..=0xDFFF).contains(&second) {
            return Err(self.error_at("unpaired surrogate in `\\u` escape", escape_start));
        }

        let scalar = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
        char::from_u32(scalar).ok_or_else(|| self.error_at("invalid `\\u` escape", escape_start))
    }

    fn read_hex4(&mut self, escape_start: usize) -> Result<u32, SyntaxError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .chars
                .next()
                .and_then(|c| {
                    self.position += c.len_utf8();
                    c.to_digit(16)
                })
                .ok_or_else(|| {
                    self.error_at("expected four hex digits after `\\u`", escape_start)
                })?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Tokenizes artifact source text.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(input).tokenize()
}
