/*
    This module builds the finite automata behind the scanner: one NFA per
    token class, combined and converted into a single DFA
*/

pub mod dfa;
pub mod nfa;

pub use dfa::{Dfa, DfaStateId};
pub use nfa::{Nfa, NfaArena};
