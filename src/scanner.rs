use log::trace;

use crate::{
    error::ScanError,
    syntax::token::{Literal, Token, TokenType},
};

/// How the scanner reacts to malformed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Record every error and keep scanning at the next character.
    #[default]
    Tolerant,
    /// Stop at the first error.
    Strict,
}

pub struct Scanner<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            tokens: vec![],
            errors: vec![],
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans the whole source, collecting errors instead of stopping at them.
    /// The token list always ends with `Eof`.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<ScanError>) {
        while !self.is_at_end() {
            self.start = self.current;
            if let Err(error) = self.scan_token() {
                self.errors.push(error);
            }
        }

        self.finish();
        (self.tokens, self.errors)
    }

    /// Scans the whole source, failing on the first malformed construct.
    pub fn scan_tokens_strict(mut self) -> Result<Vec<Token>, ScanError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.finish();
        Ok(self.tokens)
    }

    pub fn scan(self, mode: ScanMode) -> (Vec<Token>, Vec<ScanError>) {
        match mode {
            ScanMode::Tolerant => self.scan_tokens(),
            ScanMode::Strict => match self.scan_tokens_strict() {
                Ok(tokens) => (tokens, vec![]),
                Err(error) => (vec![], vec![error]),
            },
        }
    }

    fn finish(&mut self) {
        self.tokens.push(Token::eof(self.line));
        trace!(
            "scanned {} tokens over {} lines",
            self.tokens.len(),
            self.line
        );
    }

    fn scan_token(&mut self) -> Result<(), ScanError> {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),
            '?' => self.add_token(TokenType::Question),
            ':' => self.add_token(TokenType::Colon),

            // single or double length operators
            '!' => {
                let token_type = if self.match_next('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type);
            }
            '=' => {
                let token_type = if self.match_next('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type);
            }
            '<' => {
                let token_type = if self.match_next('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_next('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            '/' => {
                if self.match_next('/') {
                    // comment goes until the end of the line
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_next('*') {
                    self.block_comment()?;
                } else {
                    self.add_token(TokenType::Slash);
                }
            }

            // newlines and whitespace
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '"' => self.string()?,

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            c => {
                return Err(ScanError::new(
                    self.line,
                    format!("Unexpected character '{c}'."),
                ))
            }
        }

        Ok(())
    }

    fn block_comment(&mut self) -> Result<(), ScanError> {
        loop {
            if self.is_at_end() {
                return Err(ScanError::new(self.line, "Unterminated block comment."));
            }
            match self.advance() {
                '*' if self.match_next('/') => return Ok(()),
                '\n' => self.line += 1,
                _ => {}
            }
        }
    }

    fn string(&mut self) -> Result<(), ScanError> {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(ScanError::new(self.line, "Unterminated string."));
        }

        // the closing "
        self.advance();

        // Trim surrounding quotes
        let value = self.source[(self.start + 1)..(self.current - 1)].to_string();
        self.add_literal_token(TokenType::String, Literal::String(value));
        Ok(())
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // look for fractional part of number
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            // consume the '.'
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // digits with at most one interior '.' always parse
        let value = self.source[self.start..self.current]
            .parse()
            .unwrap_or_default();
        self.add_literal_token(TokenType::Number, Literal::Number(value));
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let token_type = TokenType::keyword(text).unwrap_or(TokenType::Identifier);
        self.add_token(token_type);
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.push_token(token_type, None);
    }

    fn add_literal_token(&mut self, token_type: TokenType, literal: Literal) {
        self.push_token(token_type, Some(literal));
    }

    fn push_token(&mut self, token_type: TokenType, literal: Option<Literal>) {
        let text = &self.source[self.start..self.current];
        self.tokens
            .push(Token::new(token_type, text, literal, self.line));
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }

        self.advance();
        true
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.current += c.len_utf8();
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }
}
