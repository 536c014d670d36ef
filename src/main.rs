mod cli;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser as _;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cli::{Cli, Command};
use lexpda::automata::Dfa;
use lexpda::generator::Generator;
use lexpda::grammar::sets::GrammarSets;
use lexpda::grammar::table::ParseTable;
use lexpda::grammar::{show_alternative, Grammar, GrammarErrors};
use lexpda::lexer::scanner::{ScanOutcome, Scanner};
use lexpda::lexer::lexical_errors;
use lexpda::pda::{Parser, PdaAction};

fn read_source(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

fn report_grammar(errors: GrammarErrors) -> ExitCode {
    for error in errors {
        eprintln!("{}", error);
    }
    ExitCode::FAILURE
}

fn print_step(index: usize, step: &PdaAction) {
    println!("{:>4}  {:<48} {:<10} {}", index, step.show_stack(), step.lookahead.lexeme, step.action);
}

fn tokens(path: &Path, show_path: bool) -> ExitCode {
    let text = match read_source(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let scanner = Scanner::default();
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut line = 1;

    println!("{:>4}  {:<10} {}", "LINE", "TOKEN", "LEXEME");
    loop {
        let outcome = scanner.scan_token(&text, offset, &mut line);
        let Some(token) = outcome.token() else {
            break;
        };
        println!("{:>4}  {:<10} {}", token.line, token.kind, token.lexeme);

        if let ScanOutcome::Found { path: steps, .. } = &outcome {
            if show_path {
                let states = steps.first().map(|step| step.from).into_iter()
                    .chain(steps.iter().map(|step| step.to))
                    .map(|state| format!("S{}", state))
                    .join(" -> ");
                println!("{:>4}  {:<10} {}", "", "", states);
            }
        }

        tokens.push(token.clone());
        offset = outcome.next_offset();
    }

    let errors = lexical_errors(&tokens, path);
    for error in &errors {
        eprintln!("{}", error);
    }

    if errors.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn dfa() -> ExitCode {
    let dfa = Dfa::for_tokens();
    println!("{} states over {{{}}}", dfa.states.len(), dfa.alphabet.iter().join(""));

    for state in &dfa.states {
        let mut header = format!("S{}", state.id);
        if state.id == dfa.start {
            header.push_str(" (start)");
        }
        if dfa.is_dead(state.id) {
            header.push_str(" (dead)");
        }
        if let Some(kind) = state.kind {
            header.push_str(&format!(" accepts {}", kind));
        }
        println!("{}", header);

        // Edges into the dead state are implied
        let edges = state.transitions.iter()
            .filter(|(_, &target)| !dfa.is_dead(target) || dfa.is_dead(state.id))
            .map(|(&symbol, &target)| (target, symbol))
            .into_group_map();
        for (target, symbols) in edges.into_iter().sorted() {
            println!("    {} -> S{}", symbols.into_iter().collect::<String>(), target);
        }
    }

    ExitCode::SUCCESS
}

fn table() -> ExitCode {
    let grammar = match Grammar::builtin() {
        Ok(grammar) => grammar,
        Err(errors) => return report_grammar(errors),
    };
    let sets = GrammarSets::compute(&grammar);
    let table = match ParseTable::from_grammar(&grammar, &sets) {
        Ok(table) => table,
        Err(errors) => return report_grammar(errors),
    };

    println!("{:<12} {:<36} {}", "NONTERMINAL", "FIRST", "FOLLOW");
    for nonterminal in grammar.nonterminals() {
        println!(
            "{:<12} {:<36} {}",
            nonterminal,
            sets.first[nonterminal].iter().join(" "),
            sets.follow[nonterminal].iter().join(" ")
        );
    }

    println!();
    for (nonterminal, row) in table.rows() {
        for (terminal, alternative) in row {
            println!("M[{}, {}] = {} → {}", nonterminal, terminal, nonterminal, show_alternative(alternative));
        }
    }

    ExitCode::SUCCESS
}

fn parse(path: &Path, trace: bool) -> ExitCode {
    let text = match read_source(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let table = match ParseTable::builtin() {
        Ok(table) => table,
        Err(errors) => return report_grammar(errors),
    };

    let tokens = Scanner::default().scan_all(&text);
    match Parser::new(&table, tokens).with_source(path).parse() {
        Ok(steps) => {
            if trace {
                steps.iter().enumerate().for_each(|(index, step)| print_step(index, step));
            }
            println!("{}: accepted ({} steps)", path.display(), steps.len());
            ExitCode::SUCCESS
        }
        Err(failure) => {
            failure.trace.iter().enumerate().for_each(|(index, step)| print_step(index, step));
            eprintln!("{}", failure.error);
            ExitCode::FAILURE
        }
    }
}

fn generate(amount: u32, seed: Option<u64>) -> ExitCode {
    let grammar = match Grammar::builtin() {
        Ok(grammar) => grammar,
        Err(errors) => return report_grammar(errors),
    };
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut generator = Generator::new(&grammar, rng);
    for _ in 0..amount {
        match generator.generate() {
            Ok(program) => println!("{}", program),
            Err(error) => {
                eprintln!("{}", error);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tokens { file, path } => tokens(&file, path),
        Command::Dfa => dfa(),
        Command::Table => table(),
        Command::Parse { file, trace } => parse(&file, trace),
        Command::Generate { amount, seed } => generate(amount.unwrap_or(1), seed),
    }
}
