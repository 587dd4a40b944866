// ABOUTME: Character cursor that turns source text into a token stream

use crate::error::LexError;
use crate::token::{keyword, Literal, Token, TokenKind};

pub struct Lexer {
    source: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_column: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scans the whole source, returning the token stream and any lex
    /// errors encountered. Lexing continues past an error where possible,
    /// but the caller must not hand the token stream to the parser if
    /// `errors` is non-empty.
    pub fn scan(mut self) -> (Vec<Token>, Vec<LexError>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_column = self.column;
            self.scan_token();
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", Literal::None, self.line, self.column));
        (self.tokens, self.errors)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        self.column += 1;
        true
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_literal(kind, Literal::None);
    }

    fn add_token_literal(&mut self, kind: TokenKind, literal: Literal) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line, self.start_column));
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        use TokenKind::*;
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            '[' => self.add_token(LeftBracket),
            ']' => self.add_token(RightBracket),
            ',' => self.add_token(Comma),
            ':' => self.add_token(Colon),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '%' => self.add_token(Percent),
            '^' => self.add_token(Caret),
            '\\' => self.add_token(Backslash),
            '!' => {
                let kind = if self.matches('=') { BangEqual } else { Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') { EqualEqual } else { Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') { LessEqual } else { Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') { GreaterEqual } else { Greater };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Slash);
                }
            }
            ' ' | '\t' | '\r' => {}
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '"' | '\'' => self.string(c),
            d if d.is_ascii_digit() => self.number(),
            a if a.is_alphabetic() || a == '_' => self.identifier(),
            other => {
                self.errors.push(LexError::UnexpectedChar {
                    ch: other,
                    line: self.line,
                    column: self.start_column,
                });
            }
        }
    }

    fn string(&mut self, quote: char) {
        let mut value = String::new();
        while self.peek() != quote && !self.is_at_end() {
            let c = self.advance();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
                value.push('\n');
                continue;
            }
            if c == '\\' {
                match self.peek() {
                    'n' => {
                        self.advance();
                        value.push('\n');
                    }
                    't' => {
                        self.advance();
                        value.push('\t');
                    }
                    '\'' => {
                        self.advance();
                        value.push('\'');
                    }
                    '"' => {
                        self.advance();
                        value.push('"');
                    }
                    '\\' => {
                        self.advance();
                        value.push('\\');
                    }
                    '\n' => {
                        // line continuation: escape the newline itself
                        self.advance();
                        self.line += 1;
                        self.column = 1;
                    }
                    _ => value.push(c),
                }
            } else {
                value.push(c);
            }
        }

        if self.is_at_end() {
            self.errors.push(LexError::UnterminatedString { line: self.line, column: self.start_column });
            return;
        }

        self.advance(); // closing quote
        self.add_token_literal(TokenKind::String, Literal::Str(value));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if self.peek().is_alphabetic() || self.peek() == '_' {
            let start = self.start;
            while self.peek().is_alphanumeric() || self.peek() == '_' {
                self.advance();
            }
            let text: String = self.source[start..self.current].iter().collect();
            self.errors.push(LexError::InvalidNumber { text, line: self.line, column: self.start_column });
            return;
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let n: f64 = text.parse().expect("lexer only admits well-formed digit sequences");
        self.add_token_literal(TokenKind::Number, Literal::Number(n));
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, errors) = Lexer::new(src).scan();
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_punctuation_and_operators() {
        use TokenKind::*;
        assert_eq!(kinds("(){};,.+-*/%^[]"), vec![
            LeftParen, RightParen, LeftBrace, RightBrace, Semicolon, Comma, Dot, Plus, Minus,
            Star, Slash, Percent, Caret, LeftBracket, RightBracket, Eof,
        ]);
    }

    #[test]
    fn scans_compound_operators() {
        use TokenKind::*;
        assert_eq!(kinds("!= == <= >= < > ="), vec![
            BangEqual, EqualEqual, LessEqual, GreaterEqual, Less, Greater, Equal, Eof,
        ]);
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(kinds("var x fun foo"), vec![Var, Identifier, Fun, Identifier, Eof]);
    }

    #[test]
    fn scans_numbers() {
        let (tokens, errors) = Lexer::new("42 3.5").scan();
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Literal::Number(42.0));
        assert_eq!(tokens[1].literal, Literal::Number(3.5));
    }

    #[test]
    fn scans_strings_with_escapes() {
        let (tokens, errors) = Lexer::new(r#""a\nb""#).scan();
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Literal::Str("a\nb".to_string()));
    }

    #[test]
    fn line_comment_runs_to_newline() {
        let (tokens, errors) = Lexer::new("1 // comment\n2").scan();
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Literal::Number(1.0));
        assert_eq!(tokens[1].literal, Literal::Number(2.0));
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (_, errors) = Lexer::new("\"abc").scan();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
    }

    #[test]
    fn invalid_number_reports_error() {
        let (_, errors) = Lexer::new("123abc").scan();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::InvalidNumber { .. }));
    }

    #[test]
    fn unrecognized_character_reports_error() {
        let (_, errors) = Lexer::new("@").scan();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnexpectedChar { ch: '@', .. }));
    }

    #[test]
    fn newlines_increment_line_counter() {
        let (tokens, _) = Lexer::new("var\nx").scan();
        assert_eq!(tokens[1].line, 2);
    }
}
