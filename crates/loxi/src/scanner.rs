//! Lexical scanner: source text to token stream.
//!
//! An external collaborator to the core per the system overview — only the
//! token stream it produces matters to the resolver and evaluator. Errors are
//! collected rather than aborting so the caller can report every scan error
//! for a unit before giving up.

use crate::exception::Diagnostic;
use crate::intern::Interns;
use crate::token::{Literal, Span, Token, TokenType};

pub struct Scanner<'a> {
    source: &'a [u8],
    interns: &'a mut Interns,
    start: usize,
    current: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, interns: &'a mut Interns) -> Self {
        Self {
            source: source.as_bytes(),
            interns,
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scans the whole source, returning tokens (always terminated by `Eof`)
    /// and any scan errors encountered along the way.
    pub fn scan(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        let eof_id = self.interns.intern("");
        self.tokens.push(Token::new(
            TokenType::Eof,
            eof_id,
            Literal::None,
            self.line,
            Span { start: self.current, end: self.current },
        ));
        (self.tokens, self.errors)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.current] }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() { 0 } else { self.source[self.current + 1] }
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> &str {
        std::str::from_utf8(&self.source[self.start..self.current]).expect("lexer operates on ASCII-compatible input")
    }

    fn add_token(&mut self, kind: TokenType) {
        self.add_token_literal(kind, Literal::None);
    }

    fn add_token_literal(&mut self, kind: TokenType, literal: Literal) {
        let lexeme = self.interns.intern(self.lexeme());
        self.tokens.push(Token::new(kind, lexeme, literal, self.line, Span { start: self.start, end: self.current }));
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(Diagnostic { line: self.line, location: String::new(), message: message.into() });
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            b'(' => self.add_token(TokenType::LeftParen),
            b')' => self.add_token(TokenType::RightParen),
            b'{' => self.add_token(TokenType::LeftBrace),
            b'}' => self.add_token(TokenType::RightBrace),
            b',' => self.add_token(TokenType::Comma),
            b'.' => self.add_token(TokenType::Dot),
            b'-' => self.add_token(TokenType::Minus),
            b'+' => self.add_token(TokenType::Plus),
            b';' => self.add_token(TokenType::Semicolon),
            b'*' => self.add_token(TokenType::Star),
            b'!' => {
                let kind = if self.matches(b'=') { TokenType::BangEqual } else { TokenType::Bang };
                self.add_token(kind);
            }
            b'=' => {
                let kind = if self.matches(b'=') { TokenType::EqualEqual } else { TokenType::Equal };
                self.add_token(kind);
            }
            b'<' => {
                let kind = if self.matches(b'=') { TokenType::LessEqual } else { TokenType::Less };
                self.add_token(kind);
            }
            b'>' => {
                let kind = if self.matches(b'=') { TokenType::GreaterEqual } else { TokenType::Greater };
                self.add_token(kind);
            }
            b'/' => {
                if self.matches(b'/') {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.matches(b'*') {
                    self.block_comment();
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            b' ' | b'\r' | b'\t' => {}
            b'\n' => self.line += 1,
            b'"' => self.string(),
            _ if c.is_ascii_digit() => self.number(),
            _ if c.is_ascii_alphabetic() || c == b'_' => self.identifier(),
            _ => self.error(format!("Unexpected character '{}'.", c as char)),
        }
    }

    fn block_comment(&mut self) {
        let mut depth = 1;
        while depth > 0 {
            if self.is_at_end() {
                self.error("Unterminated comment.");
                return;
            }
            match self.advance() {
                b'\n' => self.line += 1,
                b'*' if self.matches(b'/') => depth -= 1,
                b'/' if self.matches(b'*') => depth += 1,
                _ => {}
            }
        }
    }

    fn string(&mut self) {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }
        if self.is_at_end() {
            self.error("Unterminated string.");
            return;
        }
        self.advance(); // closing quote
        let text = std::str::from_utf8(&self.source[self.start + 1..self.current - 1])
            .expect("lexer operates on ASCII-compatible input");
        let id = self.interns.intern(text);
        self.add_token_literal(TokenType::String, Literal::Str(id));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let value: f64 = self.lexeme().parse().expect("number lexeme is always valid ASCII digits");
        self.add_token_literal(TokenType::Number, Literal::Number(value));
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }
        let kind = keyword(self.lexeme()).unwrap_or(TokenType::Identifier);
        let literal = if kind == TokenType::Identifier {
            Literal::Str(self.interns.intern(self.lexeme()))
        } else {
            Literal::None
        };
        self.add_token_literal(kind, literal);
    }
}

fn keyword(text: &str) -> Option<TokenType> {
    Some(match text {
        "and" => TokenType::And,
        "class" => TokenType::Class,
        "else" => TokenType::Else,
        "false" => TokenType::False,
        "for" => TokenType::For,
        "fun" => TokenType::Fun,
        "if" => TokenType::If,
        "nil" => TokenType::Nil,
        "or" => TokenType::Or,
        "print" => TokenType::Print,
        "return" => TokenType::Return,
        "super" => TokenType::Super,
        "this" => TokenType::This,
        "true" => TokenType::True,
        "var" => TokenType::Var,
        "while" => TokenType::While,
        _ => return None,
    })
}

/// Convenience entry point used by the parser and REPL.
pub fn scan(source: &str, interns: &mut Interns) -> (Vec<Token>, Vec<Diagnostic>) {
    Scanner::new(source, interns).scan()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenType> {
        let mut interns = Interns::new();
        let (tokens, errors) = scan(src, &mut interns);
        assert!(errors.is_empty(), "unexpected scan errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_arithmetic_expression() {
        use TokenType::*;
        assert_eq!(kinds("1 + 2;"), vec![Number, Plus, Number, Semicolon, Eof]);
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        use TokenType::*;
        assert_eq!(kinds("var x = nil;"), vec![Var, Identifier, Equal, Nil, Semicolon, Eof]);
    }

    #[test]
    fn block_comments_nest() {
        use TokenType::*;
        assert_eq!(kinds("/* a /* b */ c */ 1;"), vec![Number, Semicolon, Eof]);
    }

    #[test]
    fn unterminated_string_is_reported() {
        let mut interns = Interns::new();
        let (_, errors) = scan("\"abc", &mut interns);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unterminated string"));
    }
}
