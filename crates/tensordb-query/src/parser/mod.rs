//! Query parser for TensorDB.
//!
//! A hand-rolled tokenizer plus recursive descent over the small query
//! surface. Keywords are matched case-insensitively; tensor names are
//! case-sensitive identifiers. Every rejection carries the byte offset of
//! the offending token.

use std::str::FromStr;

use tensordb_common::constants::DEFAULT_DATA_TYPE;
use tensordb_common::{DataType, TensorDbError};
use tensordb_core::tensor::DimRange;
use tensordb_storage::IndexFilter;
use thiserror::Error;

pub mod statement;
mod token;

use statement::{GetDataStatement, InsertSource, MathStatement, Statement, TensorSelection};
use token::{tokenize, Token, TokenKind};

/// Errors produced while parsing a query.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The query text violates the grammar.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// Byte offset of the offending token.
        position: usize,
        /// What was expected or found.
        message: String,
    },

    /// The query was empty.
    #[error("empty query")]
    Empty,
}

impl From<ParseError> for TensorDbError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax { position, message } => {
                TensorDbError::MalformedQuery { position, message }
            }
            ParseError::Empty => TensorDbError::MalformedQuery {
                position: 0,
                message: "empty query".to_string(),
            },
        }
    }
}

/// The query parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    input_len: usize,
}

impl Parser {
    /// Parses one query string into a [`Statement`].
    pub fn parse(input: &str) -> Result<Statement, ParseError> {
        if input.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let mut parser = Parser {
            tokens: tokenize(input)?,
            pos: 0,
            input_len: input.len(),
        };
        let statement = parser.parse_statement()?;
        parser.expect_end()?;
        Ok(statement)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let (keyword, pos) = self.expect_ident("a query keyword")?;
        match keyword.to_ascii_lowercase().as_str() {
            "create" => self.parse_create(),
            "insert" => self.parse_insert(),
            "select" => self.parse_select(),
            "get" => self.parse_get_data(),
            "list" => self.parse_list(),
            "add" => self.parse_math(),
            other => Err(self.error_at(pos, format!("unsupported query keyword '{other}'"))),
        }
    }

    // =========================================================================
    // CREATE TENSOR <name> [<d0>,<d1>,...] [TYPE <kind>]
    // =========================================================================

    fn parse_create(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("TENSOR")?;
        let name = self.expect_name()?;

        let mut shape = Vec::new();
        if matches!(self.peek_kind(), Some(TokenKind::Number(_))) {
            shape.push(self.expect_dimension()?);
            while self.eat_punct(',') {
                shape.push(self.expect_dimension()?);
            }
        }

        let mut data_type = DEFAULT_DATA_TYPE;
        if self.keyword_ahead("TYPE") {
            self.advance();
            data_type = self.expect_data_type()?;
        }

        Ok(Statement::Create {
            name,
            shape,
            data_type,
        })
    }

    // =========================================================================
    // INSERT INTO <name> VALUES ( <literal>, ... )
    // =========================================================================

    fn parse_insert(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("INTO")?;
        let name = self.expect_name()?;
        self.expect_keyword("VALUES")?;
        self.expect_punct('(')?;

        let mut literals = Vec::new();
        if !self.eat_punct(')') {
            literals.push(self.expect_literal()?);
            while self.eat_punct(',') {
                literals.push(self.expect_literal()?);
            }
            self.expect_punct(')')?;
        }

        Ok(Statement::Insert {
            name,
            source: InsertSource::Literals(literals),
        })
    }

    // =========================================================================
    // SELECT <display> FROM <name> [ [slice] ]
    // =========================================================================

    fn parse_select(&mut self) -> Result<Statement, ParseError> {
        let display = self.expect_name()?;
        self.expect_keyword("FROM")?;
        let name = self.expect_name()?;
        let ranges = self.parse_optional_ranges()?;
        Ok(Statement::Select {
            display,
            name,
            ranges,
        })
    }

    // =========================================================================
    // GET DATA FROM <name>[ [ranges] ] [, ...] [BATCH <n>]
    // =========================================================================

    fn parse_get_data(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("DATA")?;
        self.expect_keyword("FROM")?;

        let mut targets = vec![self.parse_selection()?];
        while self.eat_punct(',') {
            targets.push(self.parse_selection()?);
        }

        let mut batch_size = None;
        if self.keyword_ahead("BATCH") {
            let (_, pos) = self.expect_ident("BATCH")?;
            let n = self.expect_unsigned("a batch size")?;
            if n == 0 {
                return Err(self.error_at(pos, "batch size must be a positive integer".to_string()));
            }
            batch_size = Some(n);
        }

        Ok(Statement::GetData(GetDataStatement {
            targets,
            batch_size,
        }))
    }

    fn parse_selection(&mut self) -> Result<TensorSelection, ParseError> {
        let name = self.expect_name()?;
        let ranges = self.parse_optional_ranges()?;
        Ok(TensorSelection { name, ranges })
    }

    // =========================================================================
    // LIST TENSORS [WHERE <pred> [AND <pred>]]
    // =========================================================================

    fn parse_list(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword("TENSORS")?;

        let mut filter = IndexFilter::default();
        if self.keyword_ahead("WHERE") {
            self.advance();
            self.parse_predicate(&mut filter)?;
            while self.keyword_ahead("AND") {
                self.advance();
                self.parse_predicate(&mut filter)?;
            }
        }

        Ok(Statement::List { filter })
    }

    fn parse_predicate(&mut self, filter: &mut IndexFilter) -> Result<(), ParseError> {
        let (field, pos) = self.expect_ident("DATATYPE or NUM_DIMENSIONS")?;
        match field.to_ascii_lowercase().as_str() {
            "datatype" => {
                self.expect_punct('=')?;
                let (value, value_pos) = self.expect_quoted()?;
                let data_type = DataType::from_str(&value.to_ascii_lowercase())
                    .map_err(|_| {
                        self.error_at(value_pos, format!("invalid data type '{value}' in WHERE clause"))
                    })?;
                filter.data_type = Some(data_type);
            }
            "num_dimensions" => {
                self.expect_punct('=')?;
                filter.rank = Some(self.expect_unsigned("a dimension count")?);
            }
            other => {
                return Err(self.error_at(
                    pos,
                    format!("unknown predicate '{other}', expected DATATYPE or NUM_DIMENSIONS"),
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // ADD TENSOR <a> WITH TENSOR <b> INTO <out>
    // ADD SCALAR <literal> TO TENSOR <a> INTO <out>
    // =========================================================================

    fn parse_math(&mut self) -> Result<Statement, ParseError> {
        let (kind, pos) = self.expect_ident("TENSOR or SCALAR")?;
        match kind.to_ascii_lowercase().as_str() {
            "tensor" => {
                let left = self.expect_name()?;
                self.expect_keyword("WITH")?;
                self.expect_keyword("TENSOR")?;
                let right = self.expect_name()?;
                self.expect_keyword("INTO")?;
                let output = self.expect_name()?;
                Ok(Statement::Math(MathStatement::AddTensors {
                    left,
                    right,
                    output,
                }))
            }
            "scalar" => {
                let scalar = self.expect_literal()?;
                self.expect_keyword("TO")?;
                self.expect_keyword("TENSOR")?;
                let input = self.expect_name()?;
                self.expect_keyword("INTO")?;
                let output = self.expect_name()?;
                Ok(Statement::Math(MathStatement::AddScalar {
                    scalar,
                    input,
                    output,
                }))
            }
            other => Err(self.error_at(pos, format!("expected TENSOR or SCALAR after ADD, found '{other}'"))),
        }
    }

    // =========================================================================
    // Shared pieces
    // =========================================================================

    /// `[lo:hi, ...]` after a tensor name; `[]` means no slicing.
    fn parse_optional_ranges(&mut self) -> Result<Option<Vec<DimRange>>, ParseError> {
        if !self.eat_punct('[') {
            return Ok(None);
        }
        if self.eat_punct(']') {
            return Ok(None);
        }
        let mut ranges = vec![self.parse_range()?];
        while self.eat_punct(',') {
            ranges.push(self.parse_range()?);
        }
        self.expect_punct(']')?;
        Ok(Some(ranges))
    }

    fn parse_range(&mut self) -> Result<DimRange, ParseError> {
        let pos = self.current_pos();
        let lo = self.expect_unsigned("a slice start")?;
        self.expect_punct(':')?;
        let hi = self.expect_unsigned("a slice end")?;
        if lo > hi {
            return Err(self.error_at(pos, format!("invalid slice range [{lo}:{hi}]")));
        }
        Ok((lo, hi))
    }

    /// A signed numeric literal, preserved as written.
    fn expect_literal(&mut self) -> Result<String, ParseError> {
        let mut sign = String::new();
        if let Some(TokenKind::Punct(c @ ('+' | '-'))) = self.peek_kind() {
            sign.push(*c);
            self.advance();
        }
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Number(n),
                ..
            }) => Ok(format!("{sign}{n}")),
            other => Err(self.unexpected(other, "a numeric literal")),
        }
    }

    fn expect_dimension(&mut self) -> Result<usize, ParseError> {
        self.expect_unsigned("a non-negative dimension")
    }

    fn expect_unsigned(&mut self, what: &str) -> Result<usize, ParseError> {
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Number(n),
                pos,
            }) => n.parse::<usize>().map_err(|_| {
                ParseError::Syntax {
                    position: pos,
                    message: format!("expected {what}, found '{n}'"),
                }
            }),
            other => Err(self.unexpected(other, what)),
        }
    }

    fn expect_data_type(&mut self) -> Result<DataType, ParseError> {
        let (name, pos) = self.expect_ident("a data type")?;
        DataType::from_str(&name.to_ascii_lowercase())
            .map_err(|_| self.error_at(pos, format!("invalid data type '{name}'")))
    }

    /// A tensor name: any identifier token.
    fn expect_name(&mut self) -> Result<String, ParseError> {
        self.expect_ident("a tensor name").map(|(name, _)| name)
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, usize), ParseError> {
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Ident(name),
                pos,
            }) => Ok((name, pos)),
            other => Err(self.unexpected(other, what)),
        }
    }

    fn expect_quoted(&mut self) -> Result<(String, usize), ParseError> {
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Quoted(value),
                pos,
            }) => Ok((value, pos)),
            other => Err(self.unexpected(other, "a quoted string")),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        let (word, pos) = self.expect_ident(keyword)?;
        if word.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(self.error_at(pos, format!("expected {keyword}, found '{word}'")))
        }
    }

    fn keyword_ahead(&self, keyword: &str) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Ident(word)) if word.eq_ignore_ascii_case(keyword)
        )
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ParseError> {
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Punct(found),
                ..
            }) if found == c => Ok(()),
            other => Err(self.unexpected(other, &format!("'{c}'"))),
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if matches!(self.peek_kind(), Some(TokenKind::Punct(found)) if *found == c) {
            self.advance();
            return true;
        }
        false
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(token) => Err(self.error_at(
                token.pos,
                format!("unexpected trailing token {:?}", token.kind),
            )),
        }
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.input_len, |t| t.pos)
    }

    fn unexpected(&self, token: Option<Token>, what: &str) -> ParseError {
        match token {
            Some(token) => ParseError::Syntax {
                position: token.pos,
                message: format!("expected {what}, found {:?}", token.kind),
            },
            None => ParseError::Syntax {
                position: self.input_len,
                message: format!("expected {what}, found end of query"),
            },
        }
    }

    fn error_at(&self, position: usize, message: String) -> ParseError {
        ParseError::Syntax { position, message }
    }
}
