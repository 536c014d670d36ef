/*
    This module reads grammars written in BNF text
*/

mod lexer;
mod verifier;

use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::error_handling::*;
use super::*;
use lexer::*;
use verifier::{verify_rules, IntermediateRuleset};

pub type Result<T> = std::result::Result<T, GrammarErrorType>;
pub type LineResult<T> = std::result::Result<T, GrammarError>;

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    location: Location
}

// Empty terminals only mark epsilon, so they are dropped
fn parse_alternative(tokens: &[BnfToken]) -> Result<Alternative> {
    tokens.iter()
        .filter(|t| **t != BnfToken::Terminal(String::new()))
        .map(|t| match t {
            BnfToken::Equals => Err(GrammarErrorType::UnexpectedEquals),
            BnfToken::Or => Err(GrammarErrorType::UnsplitRewrite),
            BnfToken::Nonterminal(s) => Ok(Symbol::Nonterminal(s.clone())),
            BnfToken::Terminal(s) => Ok(Symbol::Terminal(s.clone()))
        })
        .collect()
}

fn parse_rewrite(tokens: &[BnfToken]) -> Result<Rewrite> {
    tokens.split(|t| *t == BnfToken::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[BnfToken], location: Location) -> Result<Rule> {
    let symbol = match tokens.first() {
        Some(BnfToken::Nonterminal(s)) => Ok(s.clone()),
        Some(_) => Err(GrammarErrorType::MissingNonterminal),
        None => Err(GrammarErrorType::UnexpectedBlankLine)
    }?;

    if tokens.get(1) != Some(&BnfToken::Equals) {
        return Err(GrammarErrorType::MissingEquals)
    }

    let rewrite = parse_rewrite(&tokens[2..])?;

    return Ok(Rule {
        symbol,
        rewrite,
        location
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| GrammarError { location, error })
}

fn is_rule_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

// Rule lines with their 1-based line numbers
fn rule_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| is_rule_line(line))
        .map(|(num, line)| (num + 1, line))
}

fn ruleset_from_rules(rules: Vec<Rule>) -> GrammarResult<IndexMap<String, Rewrite>> {
    let mut test_ruleset = IntermediateRuleset::with_capacity(rules.len());
    let mut errors = Vec::new();

    for rule in rules {
        if test_ruleset.contains_key(&rule.symbol) {
            errors.push(GrammarError {
                location: rule.location,
                error: GrammarErrorType::DuplicateRule(rule.symbol)
            });
            continue;
        }
        test_ruleset.insert(rule.symbol, (rule.rewrite, rule.location));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    verify_rules(&test_ruleset)?;

    return Ok(test_ruleset.into_iter()
        .map(|(symbol, (rewrite, _))| (symbol, rewrite))
        .collect());
}

fn grammar_from_rules(rule_list: Vec<Rule>, source: &Path) -> GrammarResult<Grammar> {
    let start_symbol = rule_list.first()
        .map(|rule| rule.symbol.clone())
        .unwrap_or_default();

    let rules = ruleset_from_rules(rule_list)?;

    return Ok(Grammar {
        start_symbol,
        rules,
        source: source.to_path_buf()
    })
}

// Reads every rule line of `text`, collecting all malformed lines before
// giving up. The first rule defines the start symbol.
pub fn parse_str(text: &str, source: &Path) -> GrammarResult<Grammar> {
    let (rules, errors): (Vec<_>, Vec<_>) = rule_lines(text)
        .map(|(num, line)| parse_lex_line(line, Location::at(source, num)))
        .partition_result();

    if !errors.is_empty() {
        return Err(errors);
    }

    return grammar_from_rules(rules, source);
}
