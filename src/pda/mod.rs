/*
    This module parses token streams with a table-driven pushdown automaton,
    recording every step it takes
*/

use std::fmt::Display;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error_handling::*;
use crate::grammar::table::ParseTable;
use crate::grammar::{show_alternative, Alternative, Symbol};
use crate::lexer::{Token, TokenKind, END_MARKER};

#[derive(Debug, PartialEq, Clone)]
pub enum Action {
    Push(String),
    Expand { nonterminal: String, alternative: Alternative },
    Match(String),
    Accept,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Push(symbol) => write!(f, "push {}", symbol),
            Action::Expand { nonterminal, alternative } => write!(f, "expand {} → {}", nonterminal, show_alternative(alternative)),
            Action::Match(terminal) => write!(f, "match {}", terminal),
            Action::Accept => write!(f, "ACCEPTED"),
        }
    }
}

// One step of the automaton. Each entry is a full snapshot, so a trace can
// be replayed from any index.
#[derive(Debug, PartialEq, Clone)]
pub struct PdaAction {
    // Bottom first, taken after the action
    pub stack: Vec<Symbol>,
    pub lookahead: Token,
    pub action: Action,
}

impl PdaAction {
    pub fn show_stack(&self) -> String {
        self.stack.iter().join(" ")
    }
}

pub type Trace = Vec<PdaAction>;

#[derive(Debug, PartialEq)]
pub enum ParseErrorType {
    // The scanner could not classify this lexeme
    UnknownToken(String),
    // A terminal on the stack does not match the input
    UnexpectedTerminal { expected: String, found: String },
    // Input ran out while a construct was still open
    IncompleteInput { nonterminal: String, expected: Vec<String> },
    // No production of the nonterminal starts with the lookahead
    UnexpectedSymbol { nonterminal: String, found: String, expected: Vec<String> },
    // Expanding the nonterminal led back to itself without reading input.
    // This is a problem with the parsing table, not the input.
    NonProductive { nonterminal: String },
    // Tokens follow an end marker that was given before the last token
    TrailingInput(String),
}

impl ErrorType for ParseErrorType {
    fn is_internal(&self) -> bool {
        matches!(self, ParseErrorType::NonProductive { .. })
    }
}

fn show_found(found: &str) -> String {
    if found == END_MARKER {
        "end of input".to_string()
    } else {
        format!("`{}`", found)
    }
}

impl Display for ParseErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorType::UnknownToken(lexeme) => write!(f, "Unknown token `{}`", lexeme),
            ParseErrorType::UnexpectedTerminal { expected, found } => {
                write!(f, "Expected {} but found {}", show_found(expected), show_found(found))
            }
            ParseErrorType::IncompleteInput { nonterminal, expected } => write!(
                f,
                "Incomplete {} at end of input (expected one of {})",
                nonterminal,
                expected.join(" ")
            ),
            ParseErrorType::UnexpectedSymbol { nonterminal, found, expected } => write!(
                f,
                "Unexpected `{}` in {} (expected one of {})",
                found,
                nonterminal,
                expected.join(" ")
            ),
            ParseErrorType::TrailingInput(lexeme) => write!(f, "Extra input `{}` after end of input", lexeme),
            ParseErrorType::NonProductive { nonterminal } => write!(
                f,
                "Expanding {} made no progress (this is a problem with the parsing table, not the input)",
                nonterminal
            ),
        }
    }
}

pub type ParseError = Error<ParseErrorType>;

// A failed parse still hands back the steps taken up to the error
#[derive(Debug, PartialEq)]
pub struct Failure {
    pub error: ParseError,
    pub trace: Trace,
}

pub struct Parser<'t> {
    table: &'t ParseTable,
    tokens: Vec<Token>,
    pos: usize,
    stack: Vec<Symbol>,
    trace: Trace,
    source: PathBuf,
    // (nonterminal, stack height) of expansions since input was last consumed
    open: Vec<(String, usize)>,
}

impl<'t> Parser<'t> {
    // Terminates `tokens` with an end marker unless they already are
    pub fn new(table: &'t ParseTable, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EndOfInput) {
            let (line, offset) = tokens.last()
                .map(|token| (token.line, token.offset + token.lexeme.len()))
                .unwrap_or((1, 0));
            tokens.push(Token::end_marker(line, offset));
        }

        Parser {
            table,
            tokens,
            pos: 0,
            stack: Vec::new(),
            trace: Vec::new(),
            source: PathBuf::from("<input>"),
            open: Vec::new(),
        }
    }

    // File name used in error locations
    pub fn with_source(mut self, source: &Path) -> Self {
        self.source = source.to_path_buf();
        self
    }

    pub fn parse(mut self) -> Result<Trace, Failure> {
        match self.run() {
            Ok(()) => Ok(self.trace),
            Err(error) => Err(Failure { error, trace: self.trace }),
        }
    }

    fn lookahead(&self) -> &Token {
        // The end marker is never consumed, so this stays in bounds
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn record(&mut self, action: Action) {
        log::trace!("[{}] {}", self.stack.iter().join(" "), action);
        let lookahead = self.lookahead().clone();
        self.trace.push(PdaAction {
            stack: self.stack.clone(),
            lookahead,
            action,
        });
    }

    fn error(&self, error: ParseErrorType) -> ParseError {
        ParseError {
            location: Location::at(&self.source, self.lookahead().line),
            error,
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        let start = self.table.start_symbol().to_string();
        self.stack = vec![Symbol::Terminal(END_MARKER.to_string()), Symbol::Nonterminal(start.clone())];
        self.record(Action::Push(start));

        while let Some(top) = self.stack.last().cloned() {
            let lookahead = self.lookahead();
            let key = lookahead.terminal()
                .ok_or_else(|| self.error(ParseErrorType::UnknownToken(lookahead.lexeme.clone())))?;

            match top {
                Symbol::Terminal(terminal) if terminal == END_MARKER && key == END_MARKER => {
                    if let Some(extra) = self.tokens.get(self.pos + 1) {
                        return Err(ParseError {
                            location: Location::at(&self.source, extra.line),
                            error: ParseErrorType::TrailingInput(extra.lexeme.clone()),
                        });
                    }
                    self.record(Action::Accept);
                    return Ok(());
                }
                Symbol::Terminal(terminal) => {
                    if terminal != key {
                        let found = if key == END_MARKER { key.to_string() } else { lookahead.lexeme.clone() };
                        return Err(self.error(ParseErrorType::UnexpectedTerminal { expected: terminal, found }));
                    }
                    self.stack.pop();
                    self.pos += 1;
                    self.open.clear();
                    self.record(Action::Match(terminal));
                }
                Symbol::Nonterminal(nonterminal) => {
                    let Some(alternative) = self.table.get(&nonterminal, key).cloned() else {
                        let expected = self.table.expected(&nonterminal);
                        let error = if key == END_MARKER {
                            ParseErrorType::IncompleteInput { nonterminal, expected }
                        } else {
                            ParseErrorType::UnexpectedSymbol { nonterminal, found: lookahead.lexeme.clone(), expected }
                        };
                        return Err(self.error(error));
                    };

                    // An expansion still open below this height that names
                    // the same nonterminal means it derived itself leftmost
                    let height = self.stack.len();
                    self.open.retain(|(_, open_height)| *open_height <= height);
                    if self.open.iter().any(|(open, _)| *open == nonterminal) {
                        return Err(self.error(ParseErrorType::NonProductive { nonterminal }));
                    }
                    self.open.push((nonterminal.clone(), height));

                    self.stack.pop();
                    self.stack.extend(alternative.iter().rev().cloned());
                    self.record(Action::Expand { nonterminal, alternative });
                }
            }
        }

        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::lexer::scanner::Scanner;

    fn parse_text(input: &str) -> Result<Trace, Failure> {
        let table = ParseTable::builtin().unwrap();
        let tokens = Scanner::default().scan_all(input);
        Parser::new(&table, tokens).parse()
    }

    fn actions(trace: &Trace) -> Vec<String> {
        trace.iter().map(|step| step.action.to_string()).collect()
    }

    fn token(kind: TokenKind, lexeme: &str) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            line: 1,
            offset: 0,
        }
    }

    #[test]
    fn accepts_assignment() {
        let trace = parse_text("x = 1 + 2 ;").unwrap();
        let last = trace.last().unwrap();

        assert_eq!(last.action, Action::Accept);
        assert_eq!(last.action.to_string(), "ACCEPTED");
        assert_eq!(last.stack, vec![Symbol::Terminal("$".to_string())]);
        assert_eq!(last.lookahead.kind, TokenKind::EndOfInput);
    }

    #[test]
    fn assignment_trace() {
        let trace = parse_text("x = 1;").unwrap();

        assert_eq!(actions(&trace), vec![
            "push S",
            "expand S → StmtList",
            "expand StmtList → Stmt StmtList",
            "expand Stmt → AssignStmt ;",
            "expand AssignStmt → IDENTIFIER = Expr",
            "match IDENTIFIER",
            "match =",
            "expand Expr → Term ExprPrime",
            "expand Term → Factor TermPrime",
            "expand Factor → NUMBER",
            "match NUMBER",
            "expand TermPrime → ε",
            "expand ExprPrime → ε",
            "match ;",
            "expand StmtList → ε",
            "ACCEPTED"
        ]);
        assert_eq!(trace[0].show_stack(), "$ S");
        assert_eq!(trace[4].show_stack(), "$ StmtList ; Expr = IDENTIFIER");
        assert_eq!(trace[5].lookahead.lexeme, "=");
    }

    #[test]
    fn accepts_programs() {
        let inputs = vec![
            "",
            "print(1);",
            "y_x12 = 1 + (2 * y) + 3; y = 3.5 / 2;",
            "a = sqrt(b * b + c % 4) - 1;",
            "a = floor(1.5) * (2 - cos(x));\nprint(a + 1);"
        ];

        for input in inputs {
            assert!(parse_text(input).is_ok(), "input {:?}", input);
        }

        // Unary minus is not part of the grammar
        assert!(parse_text("a = - 1;").is_err());
    }

    #[test]
    fn missing_expression() {
        let failure = parse_text("x = ;").unwrap_err();

        assert_eq!(failure.error, ParseError {
            location: Location::at(Path::new("<input>"), 1),
            error: ParseErrorType::UnexpectedSymbol {
                nonterminal: "Expr".to_string(),
                found: ";".to_string(),
                expected: vec!["(".to_string(), "FUNCTION".to_string(), "IDENTIFIER".to_string(), "NUMBER".to_string()]
            }
        });
        assert!(!failure.error.is_internal());
        // Partial trace ends right after matching `=`
        assert_eq!(failure.trace.last().unwrap().action, Action::Match("=".to_string()));
    }

    #[test]
    fn error_lines() {
        let table = ParseTable::builtin().unwrap();
        let tokens = Scanner::default().scan_all("a = 1;\nb = 2;\n\nc = ;");
        let failure = Parser::new(&table, tokens)
            .with_source(Path::new("prog.txt"))
            .parse()
            .unwrap_err();

        assert_eq!(failure.error.location, Location::at(Path::new("prog.txt"), 4));
    }

    #[test]
    fn syntax_errors() {
        let inputs = vec![
            "x = 1 + ",
            "x = 1",
            "print(1;",
            "x = (1 + 2;",
            "1 = x;",
            "x = 1 @ 2 ;",
            "x = 1 2;"
        ];
        let answers = vec![
            ParseErrorType::IncompleteInput {
                nonterminal: "Term".to_string(),
                expected: vec!["(".to_string(), "FUNCTION".to_string(), "IDENTIFIER".to_string(), "NUMBER".to_string()]
            },
            ParseErrorType::IncompleteInput {
                nonterminal: "TermPrime".to_string(),
                expected: vec!["*".to_string(), "/".to_string(), "%".to_string(), ")".to_string(), "+".to_string(), "-".to_string(), ";".to_string()]
            },
            ParseErrorType::UnexpectedTerminal { expected: ")".to_string(), found: ";".to_string() },
            ParseErrorType::UnexpectedTerminal { expected: ")".to_string(), found: ";".to_string() },
            ParseErrorType::UnexpectedSymbol {
                nonterminal: "S".to_string(),
                found: "1".to_string(),
                expected: vec!["$".to_string(), "IDENTIFIER".to_string(), "print".to_string()]
            },
            ParseErrorType::UnknownToken("@".to_string()),
            ParseErrorType::UnexpectedSymbol {
                nonterminal: "TermPrime".to_string(),
                found: "2".to_string(),
                expected: vec!["*".to_string(), "/".to_string(), "%".to_string(), ")".to_string(), "+".to_string(), "-".to_string(), ";".to_string()]
            }
        ];

        for (input, answer) in zip(inputs, answers) {
            assert_eq!(parse_text(input).unwrap_err().error.error, answer, "input {:?}", input);
        }
    }

    #[test]
    fn parse_normal_file() {
        let path = Path::new("example_data/circle.calc");
        let text = std::fs::read_to_string(path).unwrap();
        let table = ParseTable::builtin().unwrap();
        let trace = Parser::new(&table, Scanner::default().scan_all(&text))
            .with_source(path)
            .parse()
            .unwrap();

        assert_eq!(trace.last().unwrap().action, Action::Accept);
        assert_eq!(trace.last().unwrap().lookahead.line, 7);
    }

    #[test]
    fn parse_malformed_file() {
        let path = Path::new("example_data/broken.calc");
        let text = std::fs::read_to_string(path).unwrap();
        let table = ParseTable::builtin().unwrap();
        let failure = Parser::new(&table, Scanner::default().scan_all(&text))
            .with_source(path)
            .parse()
            .unwrap_err();

        assert_eq!(failure.error.location, Location::at(path, 3));
        assert!(failure.error.to_string().contains("Unexpected `)` in Factor"));
    }

    #[test]
    fn print_as_identifier_lexeme() {
        // A stream built by hand may carry `print` as a plain identifier
        let table = ParseTable::builtin().unwrap();
        let tokens = vec![
            token(TokenKind::Identifier, "print"),
            token(TokenKind::LParen, "("),
            token(TokenKind::Number, "1"),
            token(TokenKind::RParen, ")"),
            token(TokenKind::Semicolon, ";")
        ];
        assert!(Parser::new(&table, tokens).parse().is_ok());
    }

    #[test]
    fn end_marker_is_added_once() {
        let table = ParseTable::builtin().unwrap();
        let tokens = vec![Token::end_marker(1, 0)];
        let trace = Parser::new(&table, tokens).parse().unwrap();

        assert_eq!(actions(&trace), vec!["push S", "expand S → StmtList", "expand StmtList → ε", "ACCEPTED"]);
    }

    #[test]
    fn tokens_after_end_marker_are_rejected() {
        let table = ParseTable::builtin().unwrap();
        let mut tokens = vec![Token::end_marker(1, 0)];
        tokens.extend(Scanner::default().scan_all("\nx = ;"));
        let failure = Parser::new(&table, tokens).parse().unwrap_err();

        assert_eq!(failure.error.error, ParseErrorType::TrailingInput("x".to_string()));
        assert_eq!(failure.error.location.line, 2);
        assert!(!failure.error.is_internal());
        assert_eq!(actions(&failure.trace), vec!["push S", "expand S → StmtList", "expand StmtList → ε"]);
        assert_eq!(failure.error.error.to_string(), "Extra input `x` after end of input");
    }

    #[test]
    fn self_expansion_is_internal_error() {
        let mut table = ParseTable::new("A");
        table.insert("A", "NUMBER", vec![Symbol::Nonterminal("A".to_string())]);
        let failure = Parser::new(&table, vec![token(TokenKind::Number, "1")]).parse().unwrap_err();

        assert_eq!(failure.error.error, ParseErrorType::NonProductive { nonterminal: "A".to_string() });
        assert!(failure.error.is_internal());
        assert_eq!(actions(&failure.trace), vec!["push A", "expand A → A"]);
    }

    #[test]
    fn left_recursion_is_internal_error() {
        // A → B "+" , B → A "NUMBER" loops without reading anything
        let mut table = ParseTable::new("A");
        table.insert("A", "NUMBER", vec![Symbol::Nonterminal("B".to_string()), Symbol::Terminal("+".to_string())]);
        table.insert("B", "NUMBER", vec![Symbol::Nonterminal("A".to_string()), Symbol::Terminal("NUMBER".to_string())]);
        let failure = Parser::new(&table, vec![token(TokenKind::Number, "1")]).parse().unwrap_err();

        assert_eq!(failure.error.error, ParseErrorType::NonProductive { nonterminal: "A".to_string() });
    }

    #[test]
    fn repeated_nullable_is_not_a_loop() {
        // X → E E "NUMBER" with E → ε expands E twice without reading input
        let mut table = ParseTable::new("X");
        table.insert("X", "NUMBER", vec![
            Symbol::Nonterminal("E".to_string()),
            Symbol::Nonterminal("E".to_string()),
            Symbol::Terminal("NUMBER".to_string())
        ]);
        table.insert("E", "NUMBER", vec![]);

        assert!(Parser::new(&table, vec![token(TokenKind::Number, "1")]).parse().is_ok());
    }

    #[test]
    fn steps_make_progress() {
        let trace = parse_text("a = b * (c + 1) % 2; print(a);").unwrap();

        // Stack height never grows across a match
        for (before, after) in trace.iter().tuple_windows() {
            if let Action::Match(_) = after.action {
                assert_eq!(after.stack.len() + 1, before.stack.len());
            }
        }
        let matches = trace.iter().filter(|step| matches!(step.action, Action::Match(_))).count();
        assert_eq!(matches, 17);
    }
}
