/*
    This module generates random programs from the grammar
*/

use rand::prelude::*;
use std::collections::HashMap;
use std::fmt::Display;

use crate::error_handling::*;
use crate::grammar::*;
use crate::lexer::FUNCTIONS;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // An undefined nonterminal was used
    UndefinedNonterminal(String),
    // Every alternative of the nonterminal recurses forever
    NoFiniteDerivation(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            GenerateErrorType::NoFiniteDerivation(nonterminal) => write!(f, "`{}` never derives a finite sentence", nonterminal),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult<T> = Result<T, GenerateError>;

const IDENTIFIERS: [&str; 6] = ["x", "y", "total", "rate_2", "_tmp", "Count"];

// Past this depth every choice takes the shortest way out
const DEFAULT_MAX_DEPTH: usize = 12;

pub struct Generator<'g, R: Rng> {
    grammar: &'g Grammar,
    // Fewest nested expansions each nonterminal needs to reach terminals
    heights: HashMap<String, usize>,
    max_depth: usize,
    rng: R,
}

impl<'g, R: Rng> Generator<'g, R> {
    pub fn new(grammar: &'g Grammar, rng: R) -> Self {
        Generator {
            grammar,
            heights: derivation_heights(grammar),
            max_depth: DEFAULT_MAX_DEPTH,
            rng,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // Generates a program starting with the grammar's start symbol
    pub fn generate(&mut self) -> GenResult<String> {
        let start = self.grammar.start_symbol.clone();
        let mut words = Vec::new();
        self.generate_nonterminal(&start, 0, &mut words)?;
        return Ok(words.join(" "));
    }

    fn location(&self) -> Location {
        Location::at(&self.grammar.source, 0)
    }

    fn alternative_height(&self, alternative: &Alternative) -> Option<usize> {
        alternative.iter()
            .filter_map(|symbol| match symbol {
                Symbol::Nonterminal(name) => Some(self.heights.get(name).copied()),
                Symbol::Terminal(_) => None
            })
            .try_fold(0, |highest, height| height.map(|h| highest.max(h)))
    }

    fn generate_nonterminal(&mut self, nonterminal: &str, depth: usize, words: &mut Vec<String>) -> GenResult<()> {
        let grammar = self.grammar;
        let rewrite = grammar.rules
            .get(nonterminal)
            .ok_or_else(|| GenerateError {
                location: self.location(),
                error: GenerateErrorType::UndefinedNonterminal(nonterminal.to_string())
            })?;

        let alternative = if depth < self.max_depth {
            rewrite.choose(&mut self.rng)
        } else {
            rewrite.iter()
                .filter(|alternative| self.alternative_height(alternative).is_some())
                .min_by_key(|alternative| self.alternative_height(alternative))
        };
        let alternative = alternative
            .ok_or_else(|| GenerateError {
                location: self.location(),
                error: GenerateErrorType::NoFiniteDerivation(nonterminal.to_string())
            })?
            .clone();

        for symbol in &alternative {
            match symbol {
                Symbol::Nonterminal(name) => self.generate_nonterminal(name, depth + 1, words)?,
                Symbol::Terminal(name) => {
                    let word = self.generate_terminal(name);
                    words.push(word);
                }
            }
        }

        return Ok(());
    }

    // A concrete lexeme for a grammar terminal
    fn generate_terminal(&mut self, terminal: &str) -> String {
        match terminal {
            "IDENTIFIER" => IDENTIFIERS.choose(&mut self.rng).unwrap_or(&"x").to_string(),
            "FUNCTION" => FUNCTIONS.choose(&mut self.rng).unwrap_or(&"abs").to_string(),
            "NUMBER" => {
                let whole = self.rng.gen_range(0..1000);
                if self.rng.gen_bool(0.25) {
                    format!("{}.{}", whole, self.rng.gen_range(0..100))
                } else {
                    whole.to_string()
                }
            }
            _ => terminal.to_string(),
        }
    }
}

// Fixed point of height(N) = 1 + min over alternatives of the highest
// nonterminal in that alternative. Nonterminals that never bottom out are
// left out.
fn derivation_heights(grammar: &Grammar) -> HashMap<String, usize> {
    let mut heights = HashMap::<String, usize>::new();

    let mut changed = true;
    while changed {
        changed = false;
        for (nonterminal, rewrite) in &grammar.rules {
            let best = rewrite.iter()
                .filter_map(|alternative| alternative.iter()
                    .filter_map(|symbol| match symbol {
                        Symbol::Nonterminal(name) => Some(heights.get(name).copied()),
                        Symbol::Terminal(_) => None
                    })
                    .try_fold(0, |highest, height| height.map(|h| highest.max(h))))
                .min()
                .map(|height| height + 1);

            if let Some(best) = best {
                if heights.get(nonterminal).map_or(true, |&current| best < current) {
                    heights.insert(nonterminal.clone(), best);
                    changed = true;
                }
            }
        }
    }

    return heights;
}
