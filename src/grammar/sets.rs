use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;

use super::{Grammar, Symbol};
use crate::lexer::END_MARKER;

// Nullable, FIRST and FOLLOW sets of every nonterminal
#[derive(Debug, PartialEq)]
pub struct GrammarSets {
    pub nullable: HashSet<String>,
    pub first: IndexMap<String, BTreeSet<String>>,
    pub follow: IndexMap<String, BTreeSet<String>>,
}

impl GrammarSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let mut sets = GrammarSets {
            nullable: HashSet::new(),
            first: grammar.nonterminals().map(|n| (n.clone(), BTreeSet::new())).collect(),
            follow: grammar.nonterminals().map(|n| (n.clone(), BTreeSet::new())).collect(),
        };

        // Nullable and FIRST grow together until neither changes
        let mut changed = true;
        while changed {
            changed = false;
            for (nonterminal, rewrite) in &grammar.rules {
                for alternative in rewrite {
                    let (first, nullable) = sets.first_of(alternative);
                    if nullable && sets.nullable.insert(nonterminal.clone()) {
                        changed = true;
                    }
                    let entry = &mut sets.first[nonterminal];
                    let before = entry.len();
                    entry.extend(first);
                    changed |= entry.len() != before;
                }
            }
        }

        if let Some(start) = sets.follow.get_mut(&grammar.start_symbol) {
            start.insert(END_MARKER.to_string());
        }

        let mut changed = true;
        while changed {
            changed = false;
            for (nonterminal, rewrite) in &grammar.rules {
                for alternative in rewrite {
                    for (index, symbol) in alternative.iter().enumerate() {
                        let Symbol::Nonterminal(name) = symbol else {
                            continue;
                        };
                        let (mut follow, rest_nullable) = sets.first_of(&alternative[index + 1..]);
                        if rest_nullable {
                            follow.extend(sets.follow[nonterminal].iter().cloned());
                        }
                        let entry = &mut sets.follow[name];
                        let before = entry.len();
                        entry.extend(follow);
                        changed |= entry.len() != before;
                    }
                }
            }
        }

        return sets;
    }

    // FIRST of a symbol sequence, and whether the whole sequence can vanish
    pub fn first_of(&self, symbols: &[Symbol]) -> (BTreeSet<String>, bool) {
        let mut first = BTreeSet::new();

        for symbol in symbols {
            match symbol {
                Symbol::Terminal(name) => {
                    first.insert(name.clone());
                    return (first, false);
                }
                Symbol::Nonterminal(name) => {
                    if let Some(set) = self.first.get(name) {
                        first.extend(set.iter().cloned());
                    }
                    if !self.nullable.contains(name) {
                        return (first, false);
                    }
                }
            }
        }

        return (first, true);
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn nullable_nonterminals() {
        let grammar = Grammar::builtin().unwrap();
        let sets = GrammarSets::compute(&grammar);

        let mut nullable = sets.nullable.iter().map(String::as_str).collect::<Vec<_>>();
        nullable.sort();
        assert_eq!(nullable, vec!["ExprPrime", "S", "StmtList", "TermPrime"]);
    }

    #[test]
    fn first_sets() {
        let grammar = Grammar::builtin().unwrap();
        let sets = GrammarSets::compute(&grammar);

        let nonterminals = vec!["S", "Stmt", "PrintStmt", "Expr", "ExprPrime", "TermPrime", "Factor"];
        let answers = vec![
            set(&["IDENTIFIER", "print"]),
            set(&["IDENTIFIER", "print"]),
            set(&["print"]),
            set(&["(", "FUNCTION", "IDENTIFIER", "NUMBER"]),
            set(&["+", "-"]),
            set(&["%", "*", "/"]),
            set(&["(", "FUNCTION", "IDENTIFIER", "NUMBER"])
        ];

        for (nonterminal, answer) in zip(nonterminals, answers) {
            assert_eq!(sets.first[nonterminal], answer, "FIRST({})", nonterminal);
        }
    }

    #[test]
    fn follow_sets() {
        let grammar = Grammar::builtin().unwrap();
        let sets = GrammarSets::compute(&grammar);

        let nonterminals = vec!["S", "StmtList", "Stmt", "AssignStmt", "Expr", "ExprPrime", "Term", "TermPrime", "Factor"];
        let answers = vec![
            set(&["$"]),
            set(&["$"]),
            set(&["$", "IDENTIFIER", "print"]),
            set(&[";"]),
            set(&[")", ";"]),
            set(&[")", ";"]),
            set(&["+", "-", ")", ";"]),
            set(&["+", "-", ")", ";"]),
            set(&["%", "*", "/", "+", "-", ")", ";"])
        ];

        for (nonterminal, answer) in zip(nonterminals, answers) {
            assert_eq!(sets.follow[nonterminal], answer, "FOLLOW({})", nonterminal);
        }
    }

    #[test]
    fn first_of_sequences() {
        let grammar = Grammar::builtin().unwrap();
        let sets = GrammarSets::compute(&grammar);

        let term_tail = vec![
            Symbol::Nonterminal("TermPrime".to_string()),
            Symbol::Nonterminal("ExprPrime".to_string())
        ];
        assert_eq!(sets.first_of(&term_tail), (set(&["%", "*", "+", "-", "/"]), true));
        assert_eq!(sets.first_of(&[]), (BTreeSet::new(), true));
    }
}
