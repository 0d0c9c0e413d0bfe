//! Statement parser for the artifact grammar.
//!
//! Consumes the token stream into [`RawStmt`]s. The grammar is deliberately
//! narrow: anything a real `search-index.js` never contained (arbitrary
//! expressions, nested assignments, control flow) is a syntax error here.

use std::iter::Peekable;

use crate::error::SyntaxError;
use crate::parse::lexer::{Token, TokenKind};
use crate::parse::{RawArtifact, RawBinding, RawEntry, RawStmt, RawValue, RawValueKind, Span};

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Peekable<std::vec::IntoIter<Token>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens: tokens.into_iter().peekable(),
        }
    }

    pub fn parse(mut self) -> Result<RawArtifact, SyntaxError> {
        let mut stmts = Vec::new();
        while let Some(tok) = self.tokens.next() {
            match tok.kind {
                TokenKind::Var => stmts.push(self.var_decl(tok.span)?),
                TokenKind::Ident(name) => stmts.push(self.ident_stmt(name, tok.span)?),
                _ => return Err(self.unexpected("a statement", Some(&tok))),
            }
        }
        Ok(RawArtifact { stmts })
    }

    /// `var name(=value)?(,name(=value)?)*;` with the `var` already consumed.
    fn var_decl(&mut self, var_span: Span) -> Result<RawStmt, SyntaxError> {
        let mut bindings = Vec::new();
        loop {
            let (name, name_span) = self.expect_ident("a binding name")?;
            let mut span = name_span;
            let value = if self.eat(&TokenKind::Eq) {
                let value = self.value()?;
                span = name_span.to(value.span);
                Some(value)
            } else {
                None
            };
            bindings.push(RawBinding { name, value, span });

            match self.tokens.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {}
                Some(Token {
                    kind: TokenKind::Semi,
                    span: semi,
                }) => {
                    return Ok(RawStmt::VarDecl {
                        bindings,
                        span: var_span.to(semi),
                    });
                }
                found => return Err(self.unexpected("`,` or `;`", found.as_ref())),
            }
        }
    }

    /// An assignment or call, with the leading identifier already consumed.
    fn ident_stmt(&mut self, name: String, name_span: Span) -> Result<RawStmt, SyntaxError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::LBracket,
                ..
            }) => {
                let (key, key_span) = self.expect_str("a crate name string")?;
                self.expect(&TokenKind::RBracket, "`]`")?;
                self.expect(&TokenKind::Eq, "`=`")?;
                let value = self.value()?;
                let semi = self.expect(&TokenKind::Semi, "`;`")?;
                Ok(RawStmt::Assign {
                    target: name,
                    key,
                    key_span,
                    value,
                    span: name_span.to(semi),
                })
            }
            Some(Token {
                kind: TokenKind::LParen,
                ..
            }) => {
                let (arg, _) = self.expect_ident("an argument identifier")?;
                self.expect(&TokenKind::RParen, "`)`")?;
                let semi = self.expect(&TokenKind::Semi, "`;`")?;
                Ok(RawStmt::Call {
                    callee: name,
                    arg,
                    span: name_span.to(semi),
                })
            }
            found => Err(self.unexpected("`[` or `(`", found.as_ref())),
        }
    }

    fn value(&mut self) -> Result<RawValue, SyntaxError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Null,
                span,
            }) => Ok(RawValue {
                kind: RawValueKind::Null,
                span,
            }),
            Some(Token {
                kind: TokenKind::Number(n),
                span,
            }) => Ok(RawValue {
                kind: RawValueKind::Number(n),
                span,
            }),
            Some(Token {
                kind: TokenKind::Str(s),
                span,
            }) => Ok(RawValue {
                kind: RawValueKind::Str(s),
                span,
            }),
            Some(Token {
                kind: TokenKind::Ident(name),
                span,
            }) => {
                if self.eat(&TokenKind::LBracket) {
                    let (index, _) = self.expect_number("an interning index")?;
                    let close = self.expect(&TokenKind::RBracket, "`]`")?;
                    Ok(RawValue {
                        kind: RawValueKind::InternRef { array: name, index },
                        span: span.to(close),
                    })
                } else {
                    Ok(RawValue {
                        kind: RawValueKind::Ident(name),
                        span,
                    })
                }
            }
            Some(Token {
                kind: TokenKind::LBracket,
                span,
            }) => self.array(span),
            Some(Token {
                kind: TokenKind::LBrace,
                span,
            }) => self.object(span),
            found => Err(self.unexpected("a value", found.as_ref())),
        }
    }

    fn array(&mut self, start: Span) -> Result<RawValue, SyntaxError> {
        let mut values = Vec::new();
        if let Some(close) = self.tokens.next_if(|t| t.kind == TokenKind::RBracket) {
            return Ok(RawValue {
                kind: RawValueKind::Array(values),
                span: start.to(close.span),
            });
        }
        loop {
            values.push(self.value()?);
            match self.tokens.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {}
                Some(Token {
                    kind: TokenKind::RBracket,
                    span,
                }) => {
                    return Ok(RawValue {
                        kind: RawValueKind::Array(values),
                        span: start.to(span),
                    });
                }
                found => return Err(self.unexpected("`,` or `]`", found.as_ref())),
            }
        }
    }

    fn object(&mut self, start: Span) -> Result<RawValue, SyntaxError> {
        let mut entries = Vec::new();
        if let Some(close) = self.tokens.next_if(|t| t.kind == TokenKind::RBrace) {
            return Ok(RawValue {
                kind: RawValueKind::Object(entries),
                span: start.to(close.span),
            });
        }
        loop {
            let (key, key_span) = self.expect_str("an object key")?;
            self.expect(&TokenKind::Colon, "`:`")?;
            let value = self.value()?;
            entries.push(RawEntry {
                key,
                key_span,
                value,
            });
            match self.tokens.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {}
                Some(Token {
                    kind: TokenKind::RBrace,
                    span,
                }) => {
                    return Ok(RawValue {
                        kind: RawValueKind::Object(entries),
                        span: start.to(span),
                    });
                }
                found => return Err(self.unexpected("`,` or `}`", found.as_ref())),
            }
        }
    }

    /// Consumes the next token if it matches `kind`.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.tokens.next_if(|t| t.kind == *kind).is_some()
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span, SyntaxError> {
        match self.tokens.next() {
            Some(tok) if tok.kind == *kind => Ok(tok.span),
            found => Err(self.unexpected(what, found.as_ref())),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span), SyntaxError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Ident(name),
                span,
            }) => Ok((name, span)),
            found => Err(self.unexpected(what, found.as_ref())),
        }
    }

    fn expect_str(&mut self, what: &str) -> Result<(String, Span), SyntaxError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Str(s),
                span,
            }) => Ok((s, span)),
            found => Err(self.unexpected(what, found.as_ref())),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<(u64, Span), SyntaxError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Number(n),
                span,
            }) => Ok((n, span)),
            found => Err(self.unexpected(what, found.as_ref())),
        }
    }

    fn unexpected(&self, what: &str, found: Option<&Token>) -> SyntaxError {
        match found {
            Some(tok) => SyntaxError::new(
                format!("expected {what}, found {}", tok.kind.describe()),
                tok.span.start,
                self.source,
            ),
            None => SyntaxError::new(
                format!("expected {what}, found end of input"),
                self.source.len(),
                self.source,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_artifact;
    use assert2::{check, let_assert};

    #[test]
    fn empty_source_parses_to_no_statements() {
        check!(parse_artifact("").unwrap().stmts.is_empty());
    }

    #[test]
    fn prologue_declares_five_bindings() {
        let raw = parse_artifact(r#"var N=null,E="",T="t",U="u",searchIndex={};"#).unwrap();
        let_assert!([RawStmt::VarDecl { bindings, .. }] = raw.stmts.as_slice());
        let names: Vec<&str> = bindings.iter().map(|b| b.name.as_str()).collect();
        check!(names == vec!["N", "E", "T", "U", "searchIndex"]);
        let_assert!(Some(RawValueKind::Null) = bindings[0].value.as_ref().map(|v| &v.kind));
        let_assert!(
            Some(RawValueKind::Object(entries)) = bindings[4].value.as_ref().map(|v| &v.kind)
        );
        check!(entries.is_empty());
    }

    #[test]
    fn binding_without_value() {
        let raw = parse_artifact("var x;").unwrap();
        let_assert!([RawStmt::VarDecl { bindings, .. }] = raw.stmts.as_slice());
        check!(bindings[0].value.is_none());
    }

    #[test]
    fn assignment_with_nested_values() {
        let source = r#"searchIndex["demo"]={"doc":E,"i":[[5,"go",R[0],E,N,[[["usize"]],["bool"]]]],"p":[]};"#;
        let raw = parse_artifact(source).unwrap();
        let_assert!(
            [RawStmt::Assign {
                target, key, value, ..
            }] = raw.stmts.as_slice()
        );
        check!(target == "searchIndex");
        check!(key == "demo");
        let_assert!(Some(rows) = value.entry("i").and_then(RawValue::as_array));
        let_assert!(Some(row) = rows[0].as_array());
        check!(row.len() == 6);
        let_assert!(RawValueKind::Number(5) = &row[0].kind);
        let_assert!(RawValueKind::InternRef { array, index: 0 } = &row[2].kind);
        check!(array == "R");
    }

    #[test]
    fn call_statement() {
        let raw = parse_artifact("initSearch(searchIndex);").unwrap();
        let_assert!([RawStmt::Call { callee, arg, .. }] = raw.stmts.as_slice());
        check!(callee == "initSearch");
        check!(arg == "searchIndex");
    }

    #[test]
    fn object_lookup_prefers_later_duplicate() {
        let raw = parse_artifact(r#"searchIndex["a"]={"doc":"first","doc":"second"};"#).unwrap();
        let_assert!([RawStmt::Assign { value, .. }] = raw.stmts.as_slice());
        let_assert!(Some(RawValue { kind: RawValueKind::Str(doc), .. }) = value.entry("doc"));
        check!(doc == "second");
    }

    #[test]
    fn missing_semicolon() {
        let err = parse_artifact("var N=null").unwrap_err();
        check!(err.message.contains("expected `,` or `;`"));
        check!(err.offset == 10);
    }

    #[test]
    fn statement_cannot_start_with_a_number() {
        let err = parse_artifact("42;").unwrap_err();
        check!(err.message.contains("expected a statement"));
        check!(err.offset == 0);
    }

    #[test]
    fn assignment_key_must_be_a_string() {
        let err = parse_artifact("searchIndex[42]=1;").unwrap_err();
        check!(err.message.contains("crate name string"));
        check!(err.message.contains("number `42`"));
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let err = parse_artifact(r#"searchIndex["a"]=[1,];"#).unwrap_err();
        check!(err.message.contains("expected a value"));
    }

    #[test]
    fn unclosed_array_reports_end_of_input() {
        let err = parse_artifact(r#"searchIndex["a"]=[1,2"#).unwrap_err();
        check!(err.message.contains("end of input"));
        check!(err.offset == 21);
    }

    #[test]
    fn spans_cover_whole_statements() {
        let source = r#"var N=null;initSearch(searchIndex);"#;
        let raw = parse_artifact(source).unwrap();
        check!(raw.stmts[0].span() == Span::new(0, 11));
        check!(raw.stmts[1].span() == Span::new(11, 35));
    }
}
