use std::{iter::Peekable, str::CharIndices};

use super::error::ParseError;

/// Lexical tokens of the expression language.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    String(String),
    /// A bare identifier such as `mass` or `true`.
    Ident(String),
    /// A bracketed name such as `[Engine Size]`, without the brackets.
    Quoted(String),
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Power,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    RegexMatch,
    RegexNotMatch,
    And,
    Or,
    Not,
    Coalesce,
    Question,
    Colon,
    Comma,
    OpenParen,
    CloseParen,
}

/// A token and the byte offset it starts at.
pub(crate) type Spanned = (usize, Token);

pub(crate) struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// Tokenize the whole input.
    pub(crate) fn tokenize(mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_if(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn scan(&mut self) -> Result<Option<Spanned>, ParseError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };
        let token = match c {
            '0'..='9' | '.' => self.scan_number(start)?,
            '\'' | '"' => self.scan_string(start, c)?,
            '[' => self.scan_quoted(start)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_ident(start),
            _ => self.scan_symbol(start, c)?,
        };
        Ok(Some((start, token)))
    }

    fn scan_number(&mut self, start: usize) -> Result<Token, ParseError> {
        let mut end = start;
        while let Some((i, c)) = self.chars.next_if(|(_, c)| c.is_ascii_digit() || *c == '.') {
            end = i + c.len_utf8();
        }
        if let Some((i, c)) = self.chars.next_if(|(_, c)| matches!(c, 'e' | 'E')) {
            end = i + c.len_utf8();
            if let Some((i, c)) = self.chars.next_if(|(_, c)| matches!(c, '+' | '-')) {
                end = i + c.len_utf8();
            }
            while let Some((i, c)) = self.chars.next_if(|(_, c)| c.is_ascii_digit()) {
                end = i + c.len_utf8();
            }
        }
        let text = &self.source[start..end];
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ParseError::InvalidNumber {
                position: start,
                text: text.to_string(),
            })
    }

    fn scan_string(&mut self, start: usize, quote: char) -> Result<Token, ParseError> {
        self.chars.next();
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(Token::String(out)),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, c)) => out.push(c),
                    None => break,
                },
                Some((_, c)) => out.push(c),
                None => break,
            }
        }
        Err(ParseError::UnterminatedString { position: start })
    }

    fn scan_quoted(&mut self, start: usize) -> Result<Token, ParseError> {
        self.chars.next();
        let mut out = String::new();
        for (_, c) in self.chars.by_ref() {
            if c == ']' {
                return Ok(Token::Quoted(out));
            }
            out.push(c);
        }
        Err(ParseError::UnterminatedBracket { position: start })
    }

    fn scan_ident(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some((i, c)) = self
            .chars
            .next_if(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        {
            end = i + c.len_utf8();
        }
        Token::Ident(self.source[start..end].to_string())
    }

    fn scan_symbol(&mut self, start: usize, c: char) -> Result<Token, ParseError> {
        self.chars.next();
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if self.next_if('*') => Token::Power,
            '*' => Token::Asterisk,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '=' if self.next_if('=') => Token::Equal,
            '=' if self.next_if('~') => Token::RegexMatch,
            '!' if self.next_if('=') => Token::NotEqual,
            '!' if self.next_if('~') => Token::RegexNotMatch,
            '!' => Token::Not,
            '>' if self.next_if('=') => Token::GreaterThanOrEqual,
            '>' => Token::GreaterThan,
            '<' if self.next_if('=') => Token::LessThanOrEqual,
            '<' => Token::LessThan,
            '&' if self.next_if('&') => Token::And,
            '|' if self.next_if('|') => Token::Or,
            '?' if self.next_if('?') => Token::Coalesce,
            '?' => Token::Question,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            c => {
                return Err(ParseError::UnexpectedCharacter {
                    position: start,
                    character: c,
                })
            }
        };
        Ok(token)
    }
}
