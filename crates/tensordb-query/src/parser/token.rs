//! Tokenizer for the query language.
//!
//! Queries are short, so the whole input is tokenized up front. Every token
//! carries its byte offset for error reporting.

use super::ParseError;

/// One lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword: `[A-Za-z_][A-Za-z0-9_]*`.
    Ident(String),
    /// Unsigned numeric literal, possibly with a fraction or exponent.
    Number(String),
    /// Single-quoted string, quotes stripped.
    Quoted(String),
    /// A single punctuation character.
    Punct(char),
}

/// A token plus its byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token's content.
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub pos: usize,
}

const PUNCT: &[char] = &['[', ']', '(', ')', ',', ':', '=', '+', '-'];

/// Tokenizes `input`, rejecting characters outside the language.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len()
                && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
            {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(input[start..i].to_string()),
                pos: start,
            });
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && next_is_digit(bytes, i)) {
            let start = i;
            let mut prev = 0u8;
            while i < bytes.len() {
                let b = bytes[i];
                let is_number_char = b.is_ascii_digit()
                    || b == b'.'
                    || b == b'e'
                    || b == b'E'
                    // A sign continues the number only inside an exponent.
                    || ((b == b'+' || b == b'-') && (prev == b'e' || prev == b'E'));
                if !is_number_char {
                    break;
                }
                prev = b;
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number(input[start..i].to_string()),
                pos: start,
            });
            continue;
        }

        if c == '\'' {
            let start = i;
            i += 1;
            let content_start = i;
            while i < bytes.len() && bytes[i] != b'\'' {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(ParseError::Syntax {
                    position: start,
                    message: "unterminated string literal".to_string(),
                });
            }
            tokens.push(Token {
                kind: TokenKind::Quoted(input[content_start..i].to_string()),
                pos: start,
            });
            i += 1;
            continue;
        }

        if PUNCT.contains(&c) {
            tokens.push(Token {
                kind: TokenKind::Punct(c),
                pos: i,
            });
            i += 1;
            continue;
        }

        return Err(ParseError::Syntax {
            position: i,
            message: format!("unexpected character '{c}'"),
        });
    }

    Ok(tokens)
}

fn next_is_digit(bytes: &[u8], i: usize) -> bool {
    bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
}
