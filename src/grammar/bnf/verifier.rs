use indexmap::IndexMap;

use crate::grammar::Symbol::Nonterminal;
use crate::grammar::GrammarErrorType::UndefinedNonterminal;
use super::{Alternative, GrammarError, GrammarErrors, GrammarResult, Location, Rewrite};

pub type IntermediateRuleset = IndexMap<String, (Rewrite, Location)>;

fn get_alternative_undefined_symbols(alternative: &Alternative, location: &Location, rules: &IntermediateRuleset) -> GrammarErrors {
    alternative.iter()
        .filter_map(|symbol| match symbol {
            Nonterminal(symbol) => Some(symbol),
            _ => None
        })
        .filter(|symbol| !rules.contains_key(*symbol))
        .map(|symbol_text| GrammarError {
            location: location.to_owned(),
            error: UndefinedNonterminal(symbol_text.to_owned())
        })
        .collect()
}

// Every nonterminal used on a right-hand side must have its own rule
pub fn verify_rules(rules: &IntermediateRuleset) -> GrammarResult<()> {
    let errors = rules.values()
        .flat_map(|(rewrite, location)| rewrite.iter()
            .flat_map(move |alternative| get_alternative_undefined_symbols(alternative, location, rules)))
        .collect::<GrammarErrors>();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
