use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan a program and print its tokens
    Tokens {
        /// Program file (`-` for standard input)
        file: PathBuf,

        /// Print the DFA states each token was scanned through
        #[arg(short, long)]
        path: bool
    },

    /// Print the scanner's DFA
    Dfa,

    /// Print FIRST and FOLLOW sets and the predictive parsing table
    Table,

    /// Scan and parse a program
    Parse {
        /// Program file (`-` for standard input)
        file: PathBuf,

        /// Print every step of the pushdown automaton
        #[arg(short, long)]
        trace: bool
    },

    /// Generate random programs from the grammar
    Generate {
        /// Amount to generate (default: 1)
        #[arg(short = 'n', long, value_name = "AMOUNT")]
        amount: Option<u32>,

        /// Seed for repeatable output
        #[arg(short, long)]
        seed: Option<u64>
    }
}
