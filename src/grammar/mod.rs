/*
    This module is for storing the grammar of the language and deriving
    the predictive parsing table from it
*/

pub mod bnf;
pub mod sets;
pub mod table;

use std::fmt::Display;
use std::path::PathBuf;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::error_handling::*;

// The base unit in a grammar rule
#[derive(Debug, PartialEq, Eq, Clone, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => name,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// The symbols in a single alternative. Empty for an epsilon alternative.
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

pub fn show_alternative(alternative: &Alternative) -> String {
    if alternative.is_empty() {
        "ε".to_string()
    } else {
        alternative.iter().join(" ")
    }
}

#[derive(Debug, PartialEq)]
pub struct Grammar {
    pub start_symbol: String,
    // In the order the rules were written
    pub rules: IndexMap<String, Rewrite>,
    pub source: PathBuf,
}

const BUILTIN_PATH: &str = "src/grammar/arith.bnf";
const BUILTIN_TEXT: &str = include_str!("arith.bnf");

impl Grammar {
    // The statement language: assignments and print statements over
    // arithmetic expressions
    pub fn builtin() -> GrammarResult<Grammar> {
        bnf::parse_str(BUILTIN_TEXT, &PathBuf::from(BUILTIN_PATH))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &String> {
        self.rules.keys()
    }

    // Every terminal used in a rule, first use first
    pub fn terminals(&self) -> Vec<&str> {
        self.rules.values()
            .flatten()
            .flatten()
            .filter_map(|symbol| match symbol {
                Symbol::Terminal(name) => Some(name.as_str()),
                Symbol::Nonterminal(_) => None
            })
            .unique()
            .collect()
    }
}

#[derive(Debug, PartialEq)]
pub enum GrammarErrorType {
    // A line which should contain a rule does not
    MissingEquals,
    // A rule has multiple equals signs
    UnexpectedEquals,
    // A rule line starts with something other than a nonterminal
    MissingNonterminal,
    // There is an unclosed quote
    UnmatchedQuote,
    // An undefined nonterminal was used
    UndefinedNonterminal(String),
    // The same nonterminal has two rule lines
    DuplicateRule(String),
    // Somehow a full rewrite was parsed as a base alternative
    UnsplitRewrite,
    // A blank line got too deep into the reader
    UnexpectedBlankLine,
    // Two productions compete for one parsing table cell
    Conflict { nonterminal: String, terminal: String, existing: Alternative, incoming: Alternative },
}

impl ErrorType for GrammarErrorType {
    // The grammar is built in, so anything wrong with it is lexpda's fault
    fn is_internal(&self) -> bool {
        true
    }
}

impl Display for GrammarErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarErrorType::MissingEquals => write!(f, "Expected `=` after nonterminal"),
            GrammarErrorType::UnexpectedEquals => write!(f, "Unexpected `=` encountered"),
            GrammarErrorType::MissingNonterminal => write!(f, "Tried to define something other than a nonterminal"),
            GrammarErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            GrammarErrorType::UndefinedNonterminal(nonterminal) => write!(f, "Could not find definition for `{}`", nonterminal),
            GrammarErrorType::DuplicateRule(nonterminal) => write!(f, "`{}` is defined more than once", nonterminal),
            GrammarErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split"),
            GrammarErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule reader"),
            GrammarErrorType::Conflict { nonterminal, terminal, existing, incoming } => write!(
                f,
                "Grammar is not LL(1): `{}` on `{}` could be `{}` or `{}`",
                nonterminal,
                terminal,
                show_alternative(existing),
                show_alternative(incoming)
            ),
        }
    }
}

pub type GrammarError = Error<GrammarErrorType>;
pub type GrammarErrors = Errors<GrammarErrorType>;
pub type GrammarResult<T> = std::result::Result<T, GrammarErrors>;
