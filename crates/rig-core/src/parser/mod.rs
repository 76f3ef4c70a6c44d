//! Descriptor parser: nested key-value blocks.
//!
//! ```text
//! file    := entry*
//! entry   := key '=' value | key '{' entry* '}'
//! key     := identifier ('.' identifier)* | string
//! value   := string | integer | 'true' | 'false' | list
//! list    := '[' (value (',' value)* ','?)? ']'
//! ```
//!
//! The parser produces a syntax tree of [`Entry`] values. Turning that tree
//! into a typed descriptor happens in [`crate::descriptor`].

pub mod lexer;

use std::collections::HashMap;

use rig_util::errors::{Result, RigError};

use self::lexer::{Spanned, Token};
use crate::value::Value;

/// One `key = value` assignment or `key { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Dotted key as written (`android.compileSdk`) or the string key verbatim.
    pub key: String,
    /// `true` when the key was written as a string literal.
    pub quoted: bool,
    pub line: usize,
    pub body: EntryBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryBody {
    Value(Value),
    Block(Vec<Entry>),
}

impl Entry {
    pub fn as_block(&self) -> Option<&[Entry]> {
        match &self.body {
            EntryBody::Block(entries) => Some(entries),
            EntryBody::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match &self.body {
            EntryBody::Value(v) => Some(v),
            EntryBody::Block(_) => None,
        }
    }
}

/// Deepest allowed nesting of blocks and lists combined.
pub const MAX_NESTING: usize = 256;

struct TokenCursor<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> TokenCursor<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<&'a Spanned> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Line of the next token, or of the last token at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(1)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn error(&self, message: impl Into<String>) -> RigError {
        RigError::Parse {
            line: self.line(),
            message: message.into(),
        }
    }

    /// Open a nested block or list opened on `line`.
    fn enter(&mut self, line: usize) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(RigError::Parse {
                line,
                message: format!("nesting deeper than {MAX_NESTING} levels"),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let line = self.line();
        match self.advance() {
            Some(Spanned {
                token: Token::Identifier(s),
                ..
            }) => Ok(s.clone()),
            other => Err(RigError::Parse {
                line,
                message: format!("expected identifier, got {}", describe(other)),
            }),
        }
    }
}

fn describe(tok: Option<&Spanned>) -> String {
    match tok {
        Some(s) => format!("{:?}", s.token),
        None => "end of input".to_string(),
    }
}

/// Parse descriptor text into a syntax tree.
///
/// # Errors
///
/// Returns [`RigError::Parse`] for malformed syntax: unterminated blocks,
/// lists or strings, unexpected tokens, and keys repeated within one block.
pub fn parse(input: &str) -> Result<Vec<Entry>> {
    let tokens = lexer::tokenize(input)?;
    tracing::debug!("tokenized descriptor into {} tokens", tokens.len());
    let mut cursor = TokenCursor::new(&tokens);
    parse_entries(&mut cursor, None)
}

/// Parse entries until end of input (top level) or the closing brace of the
/// block opened at `open` (`(key, line)`).
fn parse_entries(
    cursor: &mut TokenCursor<'_>,
    open: Option<(&str, usize)>,
) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    loop {
        match (cursor.peek(), open) {
            (None, None) => break,
            (None, Some((key, line))) => {
                return Err(cursor.error(format!(
                    "unterminated block '{key}' opened at line {line}"
                )));
            }
            (Some(Token::BraceClose), Some(_)) => {
                let _ = cursor.advance();
                break;
            }
            (Some(Token::BraceClose), None) => {
                return Err(cursor.error("unexpected '}' with no open block"));
            }
            _ => {}
        }

        let entry = parse_entry(cursor)?;
        if let Some(first) = seen.insert(entry.key.clone(), entry.line) {
            return Err(RigError::Parse {
                line: entry.line,
                message: format!(
                    "duplicate key '{}' (first declared at line {first})",
                    entry.key
                ),
            });
        }
        entries.push(entry);
    }

    Ok(entries)
}

fn parse_entry(cursor: &mut TokenCursor<'_>) -> Result<Entry> {
    let line = cursor.line();
    let (key, quoted) = parse_key(cursor)?;

    match cursor.peek() {
        Some(Token::Equals) => {
            let _ = cursor.advance();
            let value = parse_value(cursor)?;
            Ok(Entry {
                key,
                quoted,
                line,
                body: EntryBody::Value(value),
            })
        }
        Some(Token::BraceOpen) => {
            let _ = cursor.advance();
            cursor.enter(line)?;
            let children = parse_entries(cursor, Some((&key, line)))?;
            cursor.leave();
            Ok(Entry {
                key,
                quoted,
                line,
                body: EntryBody::Block(children),
            })
        }
        _ => {
            let next = describe(cursor.tokens.get(cursor.pos));
            Err(cursor.error(format!("expected '=' or '{{' after '{key}', got {next}")))
        }
    }
}

fn parse_key(cursor: &mut TokenCursor<'_>) -> Result<(String, bool)> {
    if let Some(Token::StringLiteral(s)) = cursor.peek() {
        let key = s.clone();
        let _ = cursor.advance();
        if key.is_empty() {
            return Err(cursor.error("empty string used as a key"));
        }
        return Ok((key, true));
    }

    let mut segments = vec![cursor.expect_identifier()?];
    while cursor.peek() == Some(&Token::Dot) {
        let _ = cursor.advance();
        segments.push(cursor.expect_identifier()?);
    }
    Ok((segments.join("."), false))
}

fn parse_value(cursor: &mut TokenCursor<'_>) -> Result<Value> {
    let line = cursor.line();
    match cursor.advance().map(|s| &s.token) {
        Some(Token::StringLiteral(s)) => Ok(Value::String(s.clone())),
        Some(Token::Integer(n)) => Ok(Value::Integer(*n)),
        Some(Token::True) => Ok(Value::Bool(true)),
        Some(Token::False) => Ok(Value::Bool(false)),
        Some(Token::BracketOpen) => {
            cursor.enter(line)?;
            let list = parse_list(cursor, line)?;
            cursor.leave();
            Ok(list)
        }
        Some(other) => Err(RigError::Parse {
            line,
            message: format!("expected a value, got {other:?}"),
        }),
        None => Err(RigError::Parse {
            line,
            message: "expected a value, got end of input".to_string(),
        }),
    }
}

fn parse_list(cursor: &mut TokenCursor<'_>, open_line: usize) -> Result<Value> {
    let mut items = Vec::new();
    loop {
        if cursor.at_end() {
            return Err(cursor.error(format!(
                "unterminated list opened at line {open_line}"
            )));
        }
        if cursor.peek() == Some(&Token::BracketClose) {
            let _ = cursor.advance();
            break;
        }
        items.push(parse_value(cursor)?);
        match cursor.peek() {
            Some(Token::Comma) => {
                let _ = cursor.advance();
            }
            Some(Token::BracketClose) | None => {}
            Some(other) => {
                let message = format!("expected ',' or ']' in list, got {other:?}");
                return Err(cursor.error(message));
            }
        }
    }
    Ok(Value::List(items))
}
