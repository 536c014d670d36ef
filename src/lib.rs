/*
    Compiler front-end for a small assignment and print language: a scanner
    driven by a DFA built from per-token NFAs, and an LL(1) pushdown parser
    that records a step-by-step trace
*/

pub mod automata;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod lexer;
pub mod pda;
