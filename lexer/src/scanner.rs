//! Byte scanner for the pipeline-set description language

use psl_text::{
    lookup_keyword, Column, Line, LogEvent, LogSource, Logger, Severity, Token, TokenData,
    TokenList, SHADER_GLSL_KEYWORD, SHADER_HLSL_KEYWORD,
};
use std::path::Path;

/// Scan a whole source file into a token stream.
///
/// Comments are consumed but never emitted. Diagnostics go through `logger`;
/// the returned stream is best-effort and may contain [Token::Invalid]
/// entries where the input could not be tokenized.
pub fn scan(source: &str, path: &Path, logger: &dyn Logger) -> TokenList {
    let mut scanner = Scanner {
        source: source.as_bytes(),
        pos: 0,
        line: Line::first(),
        column: Column::first(),
        path,
        logger,
    };

    let mut tokens = TokenList::new();
    while let Some(token) = scanner.read_token() {
        tokens.push(token);
    }
    tokens
}

struct Scanner<'a> {
    source: &'a [u8],
    pos: usize,
    line: Line,
    column: Column,
    path: &'a Path,
    logger: &'a dyn Logger,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.get(self.pos + 1).copied()
    }

    /// Consume one byte, keeping the line/column counters in step
    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line.increment();
            self.column = Column::first();
        } else {
            self.column.increment();
        }
        Some(c)
    }

    fn error(&self, message: &str, line: Line, column: Column) {
        self.logger.log(LogEvent::at(
            Severity::Error,
            LogSource::Scanner,
            message,
            self.path,
            line,
            column,
        ));
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.bump();
        }
    }

    /// Read the next token, or `None` at the end of the file
    fn read_token(&mut self) -> Option<TokenData> {
        loop {
            self.skip_whitespace();

            let line = self.line;
            let column = self.column;
            let c = self.peek()?;

            let token = match c {
                b'[' => self.single(Token::LeftSquareBracket),
                b']' => self.single(Token::RightSquareBracket),
                b'{' => self.single(Token::LeftBrace),
                b'}' => self.single(Token::RightBrace),
                b'(' => self.single(Token::LeftParen),
                b')' => self.single(Token::RightParen),
                b':' => self.single(Token::Colon),
                b';' => self.single(Token::Semicolon),
                b',' => self.single(Token::Comma),
                b'"' => {
                    self.bump();
                    Token::Text(self.read_string())
                }
                b'/' => match self.peek_next() {
                    Some(b'/') => {
                        self.read_line_comment();
                        continue;
                    }
                    Some(b'*') => {
                        self.read_block_comment(line, column);
                        continue;
                    }
                    _ => self.single(Token::Invalid),
                },
                b'.' | b'0'..=b'9' => match self.read_number(line, column) {
                    Some(value) => Token::Number(value),
                    None => Token::Invalid,
                },
                c if c.is_ascii_alphabetic() => {
                    let identifier = self.read_identifier();
                    if identifier == SHADER_GLSL_KEYWORD {
                        Token::ShaderGlsl(self.read_shader_code(line, column))
                    } else if identifier == SHADER_HLSL_KEYWORD {
                        Token::ShaderHlsl(self.read_shader_code(line, column))
                    } else {
                        match lookup_keyword(&identifier) {
                            Some(keyword) => keyword,
                            None => Token::Identifier(identifier),
                        }
                    }
                }
                _ => self.single(Token::Invalid),
            };

            return Some(TokenData::new(token, line, column));
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    /// Read until the closing quote. Escape sequences are not processed; a
    /// string hitting the end of the file yields the remaining text.
    fn read_string(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'"' {
                let text = self.slice_to_string(start, self.pos);
                self.bump();
                return text;
            }
            self.bump();
        }
        self.slice_to_string(start, self.pos)
    }

    fn read_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == b'\n' {
                break;
            }
            self.bump();
        }
    }

    fn read_block_comment(&mut self, line: Line, column: Column) {
        // Consume the '/' and '*'
        self.bump();
        self.bump();
        while let Some(c) = self.peek() {
            if c == b'*' && self.peek_next() == Some(b'/') {
                self.bump();
                self.bump();
                return;
            }
            self.bump();
        }
        self.error("Unterminated block comment", line, column);
    }

    /// Accumulate a decimal number with at most one point. A second point
    /// ends the literal with an error; the value read so far is kept.
    fn read_number(&mut self, line: Line, column: Column) -> Option<f32> {
        let mut number = 0.0f32;
        let mut divide = 1.0f32;
        let mut seen_point = false;
        let mut seen_digit = false;

        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => {
                    number = number * 10.0 + f32::from(c - b'0');
                    if seen_point {
                        divide *= 10.0;
                    }
                    seen_digit = true;
                }
                b'.' => {
                    if seen_point {
                        self.error("Malformed number: more than one decimal point", line, column);
                        break;
                    }
                    seen_point = true;
                }
                _ => break,
            }
            self.bump();
        }

        if !seen_digit {
            self.error("Invalid number", line, column);
            return None;
        }

        Some(number / divide)
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        self.bump();
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() && c != b'.' {
                break;
            }
            self.bump();
        }
        self.slice_to_string(start, self.pos)
    }

    /// Capture raw shader text between the next balanced pair of braces.
    /// Nested braces inside the code keep the block open.
    fn read_shader_code(&mut self, line: Line, column: Column) -> String {
        loop {
            match self.peek() {
                Some(b'{') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
                None => {
                    self.error("Expected '{' to open a shader code block", line, column);
                    return String::new();
                }
            }
        }

        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            match c {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let code = self.slice_to_string(start, self.pos);
                        self.bump();
                        return code;
                    }
                }
                _ => {}
            }
            self.bump();
        }

        self.error("Unterminated shader code block", line, column);
        self.slice_to_string(start, self.pos)
    }

    fn slice_to_string(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }
}
