use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use crate::lexer::{TokenKind, SINGLE_CHAR_TOKENS};

pub type StateId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct NfaState {
    pub id: StateId,
    // A symbol may lead to several states
    pub transitions: BTreeMap<char, Vec<StateId>>,
    pub epsilon: Vec<StateId>,
    // Set on accepting states only
    pub accepts: Option<TokenKind>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nfa {
    pub start: StateId,
    // A combined NFA keeps the accept states of its parts, so it has none
    pub accept: Option<StateId>,
}

// Owns every state of every NFA built through it. Ids are indices into the
// arena, so they stay unique across all automata that get combined.
#[derive(Debug, Default)]
pub struct NfaArena {
    states: Vec<NfaState>,
}

impl NfaArena {
    pub fn new() -> Self {
        NfaArena { states: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateId) -> &NfaState {
        &self.states[id]
    }

    fn new_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(NfaState {
            id,
            transitions: BTreeMap::new(),
            epsilon: Vec::new(),
            accepts: None,
        });
        id
    }

    fn new_accept(&mut self, kind: TokenKind) -> StateId {
        let id = self.new_state();
        self.states[id].accepts = Some(kind);
        id
    }

    fn add_edge(&mut self, from: StateId, symbol: char, to: StateId) {
        self.states[from].transitions.entry(symbol).or_default().push(to);
    }

    fn add_range(&mut self, from: StateId, symbols: RangeInclusive<char>, to: StateId) {
        for symbol in symbols {
            self.add_edge(from, symbol, to);
        }
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from].epsilon.push(to);
    }

    // [a-zA-Z_][a-zA-Z0-9_]*
    pub fn identifier(&mut self) -> Nfa {
        let start = self.new_state();
        let first = self.new_state();
        let repeat = self.new_state();
        let repeated = self.new_state();
        let accept = self.new_accept(TokenKind::Identifier);

        self.add_range(start, 'a'..='z', first);
        self.add_range(start, 'A'..='Z', first);
        self.add_edge(start, '_', first);

        // Zero repeats skip straight to accept
        self.add_epsilon(first, repeat);
        self.add_epsilon(first, accept);

        self.add_range(repeat, 'a'..='z', repeated);
        self.add_range(repeat, 'A'..='Z', repeated);
        self.add_range(repeat, '0'..='9', repeated);
        self.add_edge(repeat, '_', repeated);

        self.add_epsilon(repeated, repeat);
        self.add_epsilon(repeated, accept);

        Nfa { start, accept: Some(accept) }
    }

    // [0-9]+(\.[0-9]+)?
    pub fn number(&mut self) -> Nfa {
        let start = self.new_state();
        let digit = self.new_state();
        let int_repeat = self.new_state();
        let int_repeated = self.new_state();
        let int_done = self.new_state();
        let no_fraction = self.new_state();
        let no_fraction_done = self.new_state();
        let fraction = self.new_state();
        let dot = self.new_state();
        let frac_digit = self.new_state();
        let frac_repeat = self.new_state();
        let frac_repeated = self.new_state();
        let frac_done = self.new_state();
        let accept = self.new_accept(TokenKind::Number);

        // Integer part
        self.add_range(start, '0'..='9', digit);
        self.add_epsilon(digit, int_repeat);
        self.add_epsilon(digit, int_done);
        self.add_range(int_repeat, '0'..='9', int_repeated);
        self.add_epsilon(int_repeated, int_done);
        self.add_epsilon(int_repeated, int_repeat);

        // Optional fraction, skipped
        self.add_epsilon(int_done, no_fraction);
        self.add_epsilon(no_fraction, no_fraction_done);
        self.add_epsilon(no_fraction_done, accept);

        // Optional fraction, taken
        self.add_epsilon(int_done, fraction);
        self.add_edge(fraction, '.', dot);
        self.add_range(dot, '0'..='9', frac_digit);
        self.add_epsilon(frac_digit, frac_repeat);
        self.add_epsilon(frac_digit, frac_done);
        self.add_range(frac_repeat, '0'..='9', frac_repeated);
        self.add_epsilon(frac_repeated, frac_done);
        self.add_epsilon(frac_repeated, frac_repeat);
        self.add_epsilon(frac_done, accept);

        Nfa { start, accept: Some(accept) }
    }

    pub fn single_char(&mut self, symbol: char, kind: TokenKind) -> Nfa {
        let start = self.new_state();
        let accept = self.new_accept(kind);
        self.add_edge(start, symbol, accept);
        Nfa { start, accept: Some(accept) }
    }

    // New start state with an epsilon edge to every part. Nothing is merged
    // or minimised.
    pub fn combine(&mut self, nfas: &[Nfa]) -> Nfa {
        let start = self.new_state();
        for nfa in nfas {
            self.add_epsilon(start, nfa.start);
        }
        Nfa { start, accept: None }
    }

    // One NFA per token class of the language
    pub fn token_nfas(&mut self) -> Vec<Nfa> {
        let mut nfas = vec![self.identifier(), self.number()];
        for (symbol, kind) in SINGLE_CHAR_TOKENS {
            nfas.push(self.single_char(symbol, kind));
        }
        nfas
    }

    pub fn epsilon_closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut closure = states.clone();
        let mut stack = states.iter().copied().collect::<Vec<_>>();

        while let Some(state) = stack.pop() {
            for &next in &self.states[state].epsilon {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }

        return closure;
    }

    // Every state reachable from `states` on `symbol`, before closing
    pub fn step(&self, states: &BTreeSet<StateId>, symbol: char) -> BTreeSet<StateId> {
        states.iter()
            .filter_map(|&state| self.states[state].transitions.get(&symbol))
            .flatten()
            .copied()
            .collect()
    }

    // Highest precedence token kind among the accepting states in `states`
    pub fn accepting_kind(&self, states: &BTreeSet<StateId>) -> Option<TokenKind> {
        states.iter()
            .filter_map(|&state| self.states[state].accepts)
            .min_by_key(|kind| kind.precedence())
    }

    // Runs the NFA over the whole input. Returns the kind it accepts as, if any.
    pub fn simulate(&self, nfa: Nfa, input: &str) -> Option<TokenKind> {
        let mut current = self.epsilon_closure(&BTreeSet::from([nfa.start]));
        for symbol in input.chars() {
            current = self.epsilon_closure(&self.step(&current, symbol));
            if current.is_empty() {
                return None;
            }
        }
        self.accepting_kind(&current)
    }
}
