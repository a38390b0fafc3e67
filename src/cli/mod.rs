//! [Command-line interface](Cli) (CLI) of the main binary.

pub mod blast;
pub mod fasta;
pub mod matrix;
pub mod plot;
pub mod stats;
pub mod tags;

use crate::collect;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::default::Default;

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function. This is achieved with the `parse` function, which parses the command line arguments from [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = strepcore::Cli::parse();
/// ```
/// The command-line arguments from `std::env::args` are simply a vector of space separated strings. Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// use strepcore::cli::{blast, Command};
///
/// let input = ["strepcore", "blast", "tabulate", "--file", "equi_vs_suiscoredb.txt"];
/// let args = strepcore::Cli::parse_from(input);
/// assert!(matches!(args.command, Command::Blast(blast::Args { command: blast::Command::Tabulate(_) })));
/// ```
#[derive(Debug, Parser)]
#[clap(name = "strepcore", author, version)]
#[clap(about = "strepcore analyzes core and essential genes across Streptococcus species.")]
#[clap(trailing_var_arg = true)]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Used to decide which runtime [Command](#variants) the CLI arguments should be passed to.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the [BLAST](blast::Command) subcommands.
    #[clap(about = "Convert, combine, and summarize tabular BLAST reports.")]
    Blast(blast::Args),

    /// Pass CLI arguments to the [locus tag](tags::Command) subcommands.
    #[clap(about = "Cross-reference pangenome and reference locus tags.")]
    Tags(tags::Args),

    /// Pass CLI arguments to the [fasta](fasta::Command) subcommands.
    #[clap(about = "Extract, pick, and translate fasta records.")]
    Fasta(fasta::Args),

    /// Pass CLI arguments to the [presence matrix](matrix::Command) subcommands.
    #[clap(about = "Merge species presence tables and count intersections.")]
    Matrix(matrix::Args),

    /// Pass CLI arguments to the [statistics](stats::Command) subcommands.
    #[clap(about = "Run statistical tests on thesis tables.")]
    Stats(stats::Args),

    /// Pass CLI arguments to the [plot](plot::Command) subcommands.
    #[clap(about = "Draw figures as SVG.")]
    Plot(plot::Args),

    /// Pass CLI arguments to the [collect](crate::collect::collect()) method.
    #[clap(about = "Move files out of sub-directories, prefixing their names.")]
    Collect(collect::Args),
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // Convert to lowercase for RUST_LOG env var compatibility
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
