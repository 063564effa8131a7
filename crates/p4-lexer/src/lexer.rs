//! Lexer for the P4 language
//!
//! Converts source text into a sequence of tokens. Newlines are significant
//! (they separate statements) and are emitted as [`TokenKind::Newline`].

use crate::error::LexError;
use crate::token::{Token, TokenKind};
use p4_error::span::{Position, Span};

/// Single-pass lexer over one P4 source text
pub struct Lexer<'src> {
    source: &'src str,
    chars: Vec<char>,
    /// Index into `chars`
    pos: usize,
    line: u32,
    /// Counted in chars, so `ø` is one column
    column: u32,
    /// Byte offset into `source`, kept in step with `pos`
    offset: usize,
    /// No token has been produced on the current line yet
    at_line_start: bool,
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_lowercase() || matches!(ch, 'æ' | 'ø' | 'å')
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, 'æ' | 'ø' | 'å' | 'Æ' | 'Ø' | 'Å')
}

fn is_upper_start(ch: char) -> bool {
    ch.is_ascii_uppercase() || matches!(ch, 'Æ' | 'Ø' | 'Å')
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            offset: 0,
            at_line_start: true,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// One character of lookahead past `peek`
    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Consumes one character, updating line, column and offset
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        self.offset += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    /// Builds a token spanning from `start` to the current location
    fn make_token(&mut self, kind: TokenKind, start: Position) -> Token<'src> {
        self.at_line_start = matches!(kind, TokenKind::Newline);
        let span = Span::new(start, self.current_position());
        Token::new(kind, &self.source[start.offset..self.offset], span)
    }

    /// Skips horizontal whitespace (`\r` included, so CRLF ends a line like LF)
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r') = self.peek() {
            self.advance();
        }
    }

    /// Skips a `#` comment up to, but not including, the line terminator
    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skips whitespace and comments.
    ///
    /// A comment alone on its line is dropped together with its newline, so
    /// it never produces a `Newline` token. A comment after code keeps the
    /// newline that ends the code's line.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();

            if self.peek() != Some('#') {
                return;
            }

            self.skip_comment();

            if !self.at_line_start {
                return;
            }
            if self.peek() == Some('\n') {
                self.advance();
            }
        }
    }

    /// Integer or decimal literal; see `malformed_number` for rejects
    fn read_number(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.current_position();
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') {
            self.advance();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.malformed_number(start));
            }
            is_float = true;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // `1.2.3`, `12abc`, `3_000`
        if self
            .peek()
            .is_some_and(|c| c == '.' || c == '_' || is_ident_continue(c))
        {
            return Err(self.malformed_number(start));
        }

        let text = &self.source[start.offset..self.offset];
        let kind = if is_float {
            match text.parse::<f64>() {
                Ok(value) => TokenKind::FloatLit(value),
                Err(_) => return Err(self.malformed_number(start)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::IntLit(value),
                Err(_) => return Err(self.malformed_number(start)),
            }
        };

        Ok(self.make_token(kind, start))
    }

    /// Consumes the rest of a bad numeric lexeme and builds the error
    fn malformed_number(&mut self, start: Position) -> LexError {
        while self
            .peek()
            .is_some_and(|c| c == '.' || c == '_' || is_ident_continue(c))
        {
            self.advance();
        }

        LexError::MalformedNumber {
            text: self.source[start.offset..self.offset].to_string(),
            position: start,
        }
    }

    /// Reads a double-quoted string
    fn read_string(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.current_position();
        self.advance();
        let mut value = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexError::UnterminatedString { position: start });
                }
                Some('\\') => {
                    self.advance(); // backslash
                    let escaped = match self.peek() {
                        None | Some('\n') => {
                            return Err(LexError::UnterminatedString { position: start });
                        }
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        // `\\`, `\"` and any other escaped character stand for themselves
                        Some(ch) => ch,
                    };
                    value.push(escaped);
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Ok(self.make_token(TokenKind::StringLit(value), start))
    }

    /// Reads an identifier, keyword or boolean literal
    fn read_identifier(&mut self) -> Token<'src> {
        let start = self.current_position();

        loop {
            while self.peek().is_some_and(is_ident_continue) {
                self.advance();
            }
            // `_` only joins two alphanumeric runs
            if self.peek() == Some('_') && self.peek_next().is_some_and(is_ident_continue) {
                self.advance();
                continue;
            }
            break;
        }

        let text = &self.source[start.offset..self.offset];
        let kind = TokenKind::keyword_from_str(text).unwrap_or(TokenKind::Ident);

        self.make_token(kind, start)
    }

    /// Reads an uppercase-initial word; only header words are valid
    fn read_header_word(&mut self, first: char) -> Result<Token<'src>, LexError> {
        let start = self.current_position();

        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }

        let text = &self.source[start.offset..self.offset];
        match TokenKind::header_word_from_str(text) {
            Some(kind) => Ok(self.make_token(kind, start)),
            None => Err(LexError::InvalidCharacter {
                ch: first,
                position: start,
            }),
        }
    }

    /// `long` if the next character is `next` (consuming it), else `short`
    fn followed_by(&mut self, next: char, long: TokenKind, short: TokenKind) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            long
        } else {
            short
        }
    }

    /// Produces the next token, skipping whitespace and comments first
    pub fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_trivia();

        let start = self.current_position();

        let Some(ch) = self.peek() else {
            return Ok(self.make_token(TokenKind::Eof, start));
        };

        if ch == '\n' {
            self.advance();
            return Ok(self.make_token(TokenKind::Newline, start));
        }

        if ch.is_ascii_digit() {
            return self.read_number();
        }

        if ch == '"' {
            return self.read_string();
        }

        if is_ident_start(ch) {
            return Ok(self.read_identifier());
        }

        if is_upper_start(ch) {
            return self.read_header_word(ch);
        }

        // Two-character operators are tried before their prefixes
        self.advance();
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => self.followed_by('=', TokenKind::EqEq, TokenKind::Eq),
            '!' => self.followed_by('=', TokenKind::Ne, TokenKind::Bang),
            '<' => self.followed_by('=', TokenKind::Le, TokenKind::Lt),
            '>' => self.followed_by('=', TokenKind::Ge, TokenKind::Gt),
            '&' if self.peek() == Some('&') => {
                self.advance();
                TokenKind::AndAnd
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                TokenKind::OrOr
            }
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            _ => {
                return Err(LexError::InvalidCharacter { ch, position: start });
            }
        };

        Ok(self.make_token(kind, start))
    }

    /// Runs the lexer to the end. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token<'src>>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Lexes `source` completely, stopping at the first error
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    let result = Lexer::new(source).tokenize();

    match &result {
        Ok(tokens) => tracing::debug!(tokens = tokens.len(), "lexing finished"),
        Err(err) => tracing::debug!(%err, "lexing failed"),
    }

    result
}
