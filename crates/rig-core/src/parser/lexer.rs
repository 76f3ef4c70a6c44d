//! Tokenization of descriptor text using `nom`.
//!
//! Produces a stream of line-tagged [`Token`]s for the block parser.
//! Whitespace, `//` comments and `#` comments are discarded between tokens.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending},
    combinator::{map, map_res, opt, recognize, value},
    multi::many0,
    sequence::{pair, preceded},
    IResult, Parser,
};
use rig_util::errors::{Result, RigError};

/// A token in the descriptor language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Boolean literal `true`.
    True,
    /// Boolean literal `false`.
    False,
    /// A bare word: option name, block name, variant name.
    Identifier(String),
    /// A double-quoted string literal, escapes already applied.
    StringLiteral(String),
    /// An integer literal, optionally negative.
    Integer(i64),
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,
    Equals,
    Comma,
    /// `.` between the segments of a dotted key.
    Dot,
}

/// A token together with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

fn trivia(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), preceded(tag("//"), not_line_ending)),
            value((), preceded(char('#'), not_line_ending)),
        ))),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, Token> {
    let Some(body) = input.strip_prefix('"') else {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    };
    let mut result = String::new();
    let mut chars = body.char_indices();
    loop {
        match chars.next() {
            Some((idx, '"')) => return Ok((&body[idx + 1..], Token::StringLiteral(result))),
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, '\\')) => result.push('\\'),
                Some((_, '"')) => result.push('"'),
                Some((_, c)) => {
                    result.push('\\');
                    result.push(c);
                }
                None => break,
            },
            Some((_, '\n')) | None => break,
            Some((_, c)) => result.push(c),
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn integer_literal(input: &str) -> IResult<&str, Token> {
    map_res(recognize(pair(opt(char('-')), digit1)), |digits: &str| {
        digits.parse::<i64>().map(Token::Integer)
    })
    .parse(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn identifier_or_keyword(input: &str) -> IResult<&str, Token> {
    map(
        recognize(pair(take_while1(is_ident_start), take_while(is_ident_continue))),
        |word: &str| match word {
            "true" => Token::True,
            "false" => Token::False,
            _ => Token::Identifier(word.to_string()),
        },
    )
    .parse(input)
}

fn symbol(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::BraceOpen, char('{')),
        value(Token::BraceClose, char('}')),
        value(Token::BracketOpen, char('[')),
        value(Token::BracketClose, char(']')),
        value(Token::Equals, char('=')),
        value(Token::Comma, char(',')),
        value(Token::Dot, char('.')),
    ))
    .parse(input)
}

fn single_token(input: &str) -> IResult<&str, Token> {
    alt((string_literal, symbol, integer_literal, identifier_or_keyword)).parse(input)
}

/// Tokenize descriptor text.
///
/// # Errors
///
/// Returns [`RigError::Parse`] on an unterminated string or a character that
/// cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut remaining = input;
    let mut line = 1;

    loop {
        let (rest, ()) = trivia(remaining).map_err(|e| RigError::Parse {
            line,
            message: format!("lexer error skipping whitespace: {e}"),
        })?;
        line += newlines(remaining, rest);
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        let (rest, token) = single_token(remaining).map_err(|_| RigError::Parse {
            line,
            message: if remaining.starts_with('"') {
                "unterminated string literal".to_string()
            } else {
                let snippet: String = remaining.chars().take(20).collect();
                format!("unexpected character at \"{snippet}\"")
            },
        })?;
        tokens.push(Spanned { token, line });
        line += newlines(remaining, rest);
        remaining = rest;
    }

    Ok(tokens)
}

/// Newlines in the part of `before` that was consumed to reach `after`.
fn newlines(before: &str, after: &str) -> usize {
    before[..before.len() - after.len()].matches('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("should tokenize")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn tokenize_symbols() {
        assert_eq!(
            kinds("{ } [ ] = , ."),
            vec![
                Token::BraceOpen,
                Token::BraceClose,
                Token::BracketOpen,
                Token::BracketClose,
                Token::Equals,
                Token::Comma,
                Token::Dot,
            ]
        );
    }

    #[test]
    fn tokenize_keywords_and_identifiers() {
        assert_eq!(
            kinds("true false minSdk kotlin-android"),
            vec![
                Token::True,
                Token::False,
                Token::Identifier("minSdk".into()),
                Token::Identifier("kotlin-android".into()),
            ]
        );
    }

    #[test]
    fn tokenize_dotted_key() {
        assert_eq!(
            kinds("android.compileSdk"),
            vec![
                Token::Identifier("android".into()),
                Token::Dot,
                Token::Identifier("compileSdk".into()),
            ]
        );
    }

    #[test]
    fn tokenize_integers() {
        assert_eq!(
            kinds("34 -1"),
            vec![Token::Integer(34), Token::Integer(-1)]
        );
    }

    #[test]
    fn tokenize_string_with_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c\nd""#),
            vec![Token::StringLiteral("a\"b\\c\nd".into())]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let input = "# header\nminSdk = 21 // trailing\n";
        assert_eq!(
            kinds(input),
            vec![
                Token::Identifier("minSdk".into()),
                Token::Equals,
                Token::Integer(21),
            ]
        );
    }

    #[test]
    fn tokens_carry_line_numbers() {
        let tokens = tokenize("a = 1\n\n// gap\nb = \"x\"").expect("should tokenize");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[3].line, 4);
        assert_eq!(tokens[5].line, 4);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("name = \"oops\nnext = 1").unwrap_err();
        match err {
            RigError::Parse { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("unterminated"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unexpected_character_is_an_error() {
        let err = tokenize("a = 1\nb = @").unwrap_err();
        assert!(matches!(err, RigError::Parse { line: 2, .. }), "got: {err}");
    }
}
