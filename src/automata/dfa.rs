use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use itertools::Itertools;

use crate::lexer::TokenKind;
use super::nfa::{Nfa, NfaArena, StateId};

pub type DfaStateId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct DfaState {
    pub id: DfaStateId,
    pub accepting: bool,
    // Kind of the highest precedence NFA accept state merged into this one
    pub kind: Option<TokenKind>,
    pub transitions: BTreeMap<char, DfaStateId>,
    // The closure this state was built from. Empty for the dead state.
    pub nfa_states: BTreeSet<StateId>,
}

impl DfaState {
    fn new(id: DfaStateId, nfa_states: BTreeSet<StateId>, kind: Option<TokenKind>) -> Self {
        DfaState {
            id,
            accepting: kind.is_some(),
            kind,
            transitions: BTreeMap::new(),
            nfa_states,
        }
    }
}

// Total over `alphabet` once built: every state has exactly one transition
// per symbol, with the dead state absorbing everything that cannot lead to
// a token.
#[derive(Debug, Clone, PartialEq)]
pub struct Dfa {
    pub start: DfaStateId,
    pub dead: DfaStateId,
    pub states: Vec<DfaState>,
    pub alphabet: BTreeSet<char>,
}

impl Dfa {
    // Subset construction over the states reachable from `nfa.start`
    pub fn from_nfa(arena: &NfaArena, nfa: Nfa) -> Self {
        let mut states = Vec::new();
        let mut ids = HashMap::<BTreeSet<StateId>, DfaStateId>::new();
        let mut worklist = VecDeque::new();
        let mut alphabet = BTreeSet::new();

        let start_set = arena.epsilon_closure(&BTreeSet::from([nfa.start]));
        let start_kind = arena.accepting_kind(&start_set);
        states.push(DfaState::new(0, start_set.clone(), start_kind));
        ids.insert(start_set.clone(), 0);
        worklist.push_back(start_set);

        while let Some(current_set) = worklist.pop_front() {
            let current = ids[&current_set];

            let symbols = current_set.iter()
                .flat_map(|&state| arena.state(state).transitions.keys().copied())
                .collect::<BTreeSet<_>>();

            for symbol in symbols {
                alphabet.insert(symbol);
                let next_set = arena.epsilon_closure(&arena.step(&current_set, symbol));

                let next = match ids.get(&next_set) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        let kind = arena.accepting_kind(&next_set);
                        log::debug!(
                            "DFA state {} = {{{}}}{}",
                            id,
                            next_set.iter().join(", "),
                            kind.map(|k| format!(" accepts {}", k)).unwrap_or_default()
                        );
                        states.push(DfaState::new(id, next_set.clone(), kind));
                        ids.insert(next_set.clone(), id);
                        worklist.push_back(next_set);
                        id
                    }
                };

                states[current].transitions.insert(symbol, next);
            }
        }

        let dead = states.len();
        states.push(DfaState::new(dead, BTreeSet::new(), None));

        for state in states.iter_mut() {
            for &symbol in &alphabet {
                state.transitions.entry(symbol).or_insert(dead);
            }
        }

        log::debug!("DFA built: {} states over {} symbols", states.len(), alphabet.len());

        return Dfa {
            start: 0,
            dead,
            states,
            alphabet,
        };
    }

    // Combines the per-class NFAs under a fresh start state, then converts
    pub fn from_nfas(arena: &mut NfaArena, nfas: &[Nfa]) -> Self {
        let combined = arena.combine(nfas);
        Dfa::from_nfa(arena, combined)
    }

    // The scanner automaton for every token class of the language
    pub fn for_tokens() -> Self {
        let mut arena = NfaArena::new();
        let nfas = arena.token_nfas();
        Dfa::from_nfas(&mut arena, &nfas)
    }

    pub fn state(&self, id: DfaStateId) -> &DfaState {
        &self.states[id]
    }

    // None only for symbols outside the alphabet
    pub fn next(&self, state: DfaStateId, symbol: char) -> Option<DfaStateId> {
        self.states[state].transitions.get(&symbol).copied()
    }

    pub fn is_dead(&self, state: DfaStateId) -> bool {
        state == self.dead
    }
}
