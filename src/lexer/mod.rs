/*
    This module holds the token vocabulary of the language and the scanner
    that cuts source text into tokens
*/

pub mod scanner;

use std::fmt::Display;
use std::path::Path;

use crate::error_handling::*;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Identifier,
    Number,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Assign,
    LParen,
    RParen,
    Semicolon,
    Print,
    Function,
    Unknown,
    EndOfInput,
}

impl TokenKind {
    // Rank used when several token classes accept the same lexeme. Lower
    // ranks win: punctuation beats vocabulary words, which beat numbers,
    // which beat the identifier catch-all.
    pub fn precedence(self) -> u32 {
        match self {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Multiply
            | TokenKind::Divide
            | TokenKind::Modulo
            | TokenKind::Assign
            | TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::Semicolon => 1,
            TokenKind::Print | TokenKind::Function => 2,
            TokenKind::Number => 3,
            TokenKind::Identifier => 4,
            TokenKind::Unknown | TokenKind::EndOfInput => u32::MAX,
        }
    }

    // Short name used in token tables
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "ID",
            TokenKind::Number => "NUMBER",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULT",
            TokenKind::Divide => "DIV",
            TokenKind::Modulo => "MOD",
            TokenKind::Assign => "ASSIGN",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Print => "PRINT",
            TokenKind::Function => "FUNCTION",
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::EndOfInput => "EOF",
        }
    }

    // The terminal this kind stands for in the grammar, if any
    pub fn terminal(self) -> Option<&'static str> {
        match self {
            TokenKind::Identifier => Some("IDENTIFIER"),
            TokenKind::Number => Some("NUMBER"),
            TokenKind::Plus => Some("+"),
            TokenKind::Minus => Some("-"),
            TokenKind::Multiply => Some("*"),
            TokenKind::Divide => Some("/"),
            TokenKind::Modulo => Some("%"),
            TokenKind::Assign => Some("="),
            TokenKind::LParen => Some("("),
            TokenKind::RParen => Some(")"),
            TokenKind::Semicolon => Some(";"),
            TokenKind::Print => Some("print"),
            TokenKind::Function => Some("FUNCTION"),
            TokenKind::EndOfInput => Some(END_MARKER),
            TokenKind::Unknown => None,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Terminal and lexeme of the end-of-input sentinel
pub const END_MARKER: &str = "$";

// Characters that each get their own single-character automaton
pub const SINGLE_CHAR_TOKENS: [(char, TokenKind); 9] = [
    ('+', TokenKind::Plus),
    ('-', TokenKind::Minus),
    ('*', TokenKind::Multiply),
    ('/', TokenKind::Divide),
    ('%', TokenKind::Modulo),
    ('=', TokenKind::Assign),
    ('(', TokenKind::LParen),
    (')', TokenKind::RParen),
    (';', TokenKind::Semicolon),
];

pub const FUNCTIONS: [&str; 7] = ["sin", "cos", "tan", "sqrt", "abs", "ceil", "floor"];

// Words that scan as identifiers but belong to the language's vocabulary
pub fn vocabulary_kind(lexeme: &str) -> Option<TokenKind> {
    if lexeme == "print" {
        Some(TokenKind::Print)
    } else if FUNCTIONS.contains(&lexeme) {
        Some(TokenKind::Function)
    } else {
        None
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    // Byte offset of the lexeme's first character
    pub offset: usize,
}

impl Token {
    pub fn end_marker(line: usize, offset: usize) -> Self {
        Token {
            kind: TokenKind::EndOfInput,
            lexeme: END_MARKER.to_string(),
            line,
            offset,
        }
    }

    // The terminal the parser sees for this token
    pub fn terminal(&self) -> Option<&'static str> {
        match self.kind {
            TokenKind::Identifier if self.lexeme == "print" => Some("print"),
            kind => kind.terminal(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum LexErrorType {
    // No token class accepts anything starting at this character
    UnrecognizedCharacter(char),
}

impl ErrorType for LexErrorType {}

impl Display for LexErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErrorType::UnrecognizedCharacter(c) => write!(f, "Unrecognized character {:?}", c),
        }
    }
}

pub type LexError = Error<LexErrorType>;

// Turns the UNKNOWN tokens of a scanned stream into located errors
pub fn lexical_errors(tokens: &[Token], file: &Path) -> Errors<LexErrorType> {
    tokens.iter()
        .filter(|token| token.kind == TokenKind::Unknown)
        .filter_map(|token| token.lexeme.chars().next().map(|c| LexError {
            location: Location::at(file, token.line),
            error: LexErrorType::UnrecognizedCharacter(c)
        }))
        .collect()
}
