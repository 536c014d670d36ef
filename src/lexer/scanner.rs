use crate::automata::{Dfa, DfaStateId};
use super::{vocabulary_kind, Token, TokenKind};

// One step the DFA took while scanning a token
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Transition {
    pub from: DfaStateId,
    pub to: DfaStateId,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ScanOutcome {
    // `path` holds the transitions up to the last accepting state
    Found { token: Token, next: usize, path: Vec<Transition> },
    // Nothing is accepted from here; `next` is one character further on
    Unrecognized { token: Token, next: usize },
    EndOfInput { next: usize },
}

impl ScanOutcome {
    pub fn found(&self) -> bool {
        matches!(self, ScanOutcome::Found { .. })
    }

    pub fn next_offset(&self) -> usize {
        match self {
            ScanOutcome::Found { next, .. }
            | ScanOutcome::Unrecognized { next, .. }
            | ScanOutcome::EndOfInput { next } => *next,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match self {
            ScanOutcome::Found { token, .. } | ScanOutcome::Unrecognized { token, .. } => Some(token),
            ScanOutcome::EndOfInput { .. } => None,
        }
    }
}

pub struct Scanner {
    dfa: Dfa,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner::new(Dfa::for_tokens())
    }
}

impl Scanner {
    pub fn new(dfa: Dfa) -> Self {
        Scanner { dfa }
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    // Scans the longest token starting at `offset` after any whitespace.
    // `line` is advanced past every newline skipped. An offset inside a
    // character moves forward to the next character; one past the end is
    // end of input.
    pub fn scan_token(&self, input: &str, offset: usize, line: &mut usize) -> ScanOutcome {
        let Some(offset) = (offset..=input.len()).find(|&at| input.is_char_boundary(at)) else {
            return ScanOutcome::EndOfInput { next: input.len() };
        };

        let mut start = offset;
        for c in input[offset..].chars() {
            if !c.is_whitespace() {
                break;
            }
            if c == '\n' {
                *line += 1;
            }
            start += c.len_utf8();
        }

        let Some(first) = input[start..].chars().next() else {
            return ScanOutcome::EndOfInput { next: input.len() };
        };

        if self.dfa.state(self.dfa.start).accepting {
            log::warn!("DFA start state accepts the empty string; ignoring zero-width match at {}", start);
        }

        let mut state = self.dfa.start;
        let mut path = Vec::new();
        // (end offset, kind, transitions taken) of the longest accepted prefix
        let mut accepted = None;

        for (index, c) in input[start..].char_indices() {
            let Some(next) = self.dfa.next(state, c) else {
                break;
            };
            path.push(Transition { from: state, to: next });
            state = next;

            if self.dfa.is_dead(state) {
                break;
            }
            if let Some(kind) = self.dfa.state(state).kind {
                accepted = Some((start + index + c.len_utf8(), kind, path.len()));
            }
        }

        match accepted {
            Some((end, kind, path_len)) => {
                let lexeme = &input[start..end];
                let kind = match kind {
                    TokenKind::Identifier => vocabulary_kind(lexeme).unwrap_or(kind),
                    _ => kind,
                };
                path.truncate(path_len);

                log::trace!("line {}: {} {:?}", line, kind, lexeme);
                ScanOutcome::Found {
                    token: Token {
                        kind,
                        lexeme: lexeme.to_string(),
                        line: *line,
                        offset: start,
                    },
                    next: end,
                    path,
                }
            }
            None => {
                log::warn!("line {}: unrecognized character {:?}", line, first);
                ScanOutcome::Unrecognized {
                    token: Token {
                        kind: TokenKind::Unknown,
                        lexeme: first.to_string(),
                        line: *line,
                        offset: start,
                    },
                    next: start + first.len_utf8(),
                }
            }
        }
    }

    // Every token of `input`, unrecognized characters included as UNKNOWN
    pub fn scan_all(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        let mut line = 1;

        loop {
            match self.scan_token(input, offset, &mut line) {
                ScanOutcome::Found { token, next, .. } | ScanOutcome::Unrecognized { token, next } => {
                    tokens.push(token);
                    offset = next;
                }
                ScanOutcome::EndOfInput { .. } => break,
            }
        }

        return tokens;
    }
}
