use itertools::{Itertools, PeekingNext};

use super::Result;
use crate::grammar::GrammarErrorType;

#[derive(PartialEq, Debug)]
pub enum BnfToken {
    Equals,
    Or,
    Nonterminal(String),
    // Quoted text. An empty terminal marks an epsilon alternative.
    Terminal(String)
}

pub fn lex_terminal(line: &mut impl PeekingNext<Item = char>) -> Result<BnfToken> {
    line.next(); // Consume open quote
    let text = line.peeking_take_while(|&c| c != '"').collect();

    if line.next() != Some('"') {
        return Err(GrammarErrorType::UnmatchedQuote);
    }

    Ok(BnfToken::Terminal(text))
}

// A bare word ends at whitespace or at the next quote
pub fn lex_nonterminal(line: &mut impl PeekingNext<Item = char>) -> BnfToken {
    BnfToken::Nonterminal(line.peeking_take_while(|&c| !c.is_whitespace() && c != '"').collect())
}

pub fn lex_line(line: &str) -> Result<Vec<BnfToken>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '=' => {
                chars.next();
                tokens.push(BnfToken::Equals);
            }
            '|' => {
                chars.next();
                tokens.push(BnfToken::Or);
            }
            '"' => tokens.push(lex_terminal(&mut chars)?),
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => tokens.push(lex_nonterminal(&mut chars)),
        }
    }

    return Ok(tokens);
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    #[test]
    fn lex_normal_terminal() {
        let lines = vec![
            "\"IDENTIFIER\" \"=\" Expr",
            "\";\"",
            "\"(\"\")\"",
            "\"\" rest"
        ];
        // (result from the function, rest of the iterator)
        let answers = vec![
            (BnfToken::Terminal("IDENTIFIER".to_string()), " \"=\" Expr"),
            (BnfToken::Terminal(";".to_string()), ""),
            (BnfToken::Terminal("(".to_string()), "\")\""),
            (BnfToken::Terminal("".to_string()), " rest")
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_terminal(&mut chars).unwrap(), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_mismatched_terminal() {
        for line in vec!["\"print", "\"print ( Expr )"] {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_terminal(&mut chars).unwrap_err(), GrammarErrorType::UnmatchedQuote);
        }
    }

    #[test]
    fn lex_normal_nonterminal() {
        let lines = vec![
            "Term ExprPrime",
            "Factor",
            "Stmt\";\""
        ];
        let answers = vec![
            (BnfToken::Nonterminal("Term".to_string()), " ExprPrime"),
            (BnfToken::Nonterminal("Factor".to_string()), ""),
            (BnfToken::Nonterminal("Stmt".to_string()), "\";\"")
        ];

        for (line, (answer_token, answer_rest)) in zip(lines, answers) {
            let mut chars = line.chars().peekable();
            assert_eq!(lex_nonterminal(&mut chars), answer_token);
            assert_eq!(chars.collect::<String>(), answer_rest);
        }
    }

    #[test]
    fn lex_normal_line() {
        let lines = vec![
            "Stmt = AssignStmt \";\" | PrintStmt \";\"",
            "ExprPrime = \"+\" Term ExprPrime | \"\""
        ];
        let answers = vec![
            vec![
                BnfToken::Nonterminal("Stmt".to_string()),
                BnfToken::Equals,
                BnfToken::Nonterminal("AssignStmt".to_string()),
                BnfToken::Terminal(";".to_string()),
                BnfToken::Or,
                BnfToken::Nonterminal("PrintStmt".to_string()),
                BnfToken::Terminal(";".to_string())
            ],
            vec![
                BnfToken::Nonterminal("ExprPrime".to_string()),
                BnfToken::Equals,
                BnfToken::Terminal("+".to_string()),
                BnfToken::Nonterminal("Term".to_string()),
                BnfToken::Nonterminal("ExprPrime".to_string()),
                BnfToken::Or,
                BnfToken::Terminal("".to_string())
            ]
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(lex_line(line).unwrap(), answer)
        }
    }
}
