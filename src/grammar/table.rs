use indexmap::IndexMap;

use crate::error_handling::*;
use super::sets::GrammarSets;
use super::*;

// Predictive parsing table: (nonterminal, lookahead terminal) → the
// right-hand side to expand to. A missing cell is a syntax error.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseTable {
    start_symbol: String,
    cells: IndexMap<String, IndexMap<String, Alternative>>,
}

impl ParseTable {
    pub fn new(start_symbol: &str) -> Self {
        ParseTable {
            start_symbol: start_symbol.to_string(),
            cells: IndexMap::new(),
        }
    }

    // Table for the built-in statement grammar
    pub fn builtin() -> GrammarResult<ParseTable> {
        let grammar = Grammar::builtin()?;
        ParseTable::from_grammar(&grammar, &GrammarSets::compute(&grammar))
    }

    // Fills the cell of every terminal in FIRST of each alternative, plus
    // FOLLOW of the nonterminal for nullable alternatives
    pub fn from_grammar(grammar: &Grammar, sets: &GrammarSets) -> GrammarResult<ParseTable> {
        let mut table = ParseTable::new(&grammar.start_symbol);
        let mut errors = Vec::new();

        for (nonterminal, rewrite) in &grammar.rules {
            table.cells.entry(nonterminal.clone()).or_default();

            for alternative in rewrite {
                let (mut lookaheads, nullable) = sets.first_of(alternative);
                if nullable {
                    lookaheads.extend(sets.follow[nonterminal].iter().cloned());
                }

                for terminal in lookaheads {
                    match table.insert(nonterminal, &terminal, alternative.clone()) {
                        Some(existing) if existing != *alternative => errors.push(GrammarError {
                            location: Location::at(&grammar.source, 0),
                            error: GrammarErrorType::Conflict {
                                nonterminal: nonterminal.clone(),
                                terminal,
                                existing,
                                incoming: alternative.clone()
                            }
                        }),
                        _ => {}
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        log::debug!("parsing table built with {} cells", table.cells.values().map(IndexMap::len).sum::<usize>());
        return Ok(table);
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    // Returns the alternative previously in the cell, if any
    pub fn insert(&mut self, nonterminal: &str, terminal: &str, alternative: Alternative) -> Option<Alternative> {
        self.cells
            .entry(nonterminal.to_string())
            .or_default()
            .insert(terminal.to_string(), alternative)
    }

    pub fn get(&self, nonterminal: &str, terminal: &str) -> Option<&Alternative> {
        self.cells.get(nonterminal)?.get(terminal)
    }

    // Terminals with a cell for `nonterminal`, in insertion order
    pub fn expected(&self, nonterminal: &str) -> Vec<String> {
        self.cells.get(nonterminal)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&String, &IndexMap<String, Alternative>)> {
        self.cells.iter()
    }
}
