use crate::blast::{analyze, combine, recap, TabulateArgs};
use clap::{Parser, Subcommand};

/// CLI arguments to convert, combine, and summarize BLAST reports.
#[derive(Debug, Parser)]
#[clap(about = "Convert, combine, and summarize tabular BLAST reports.")]
pub struct Args {
    /// BLAST command: Tabulate, Combine, Recap, Analyze
    #[clap(subcommand)]
    pub command: Command,
}

/// CLI BLAST [commands](#variants). Used to decide which BLAST method the CLI arguments should be passed to.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the BLAST [tabulate](crate::blast::tabulate()) method.
    ///
    /// ```rust
    /// use strepcore::cli::blast::Command;
    /// use strepcore::blast::TabulateArgs;
    ///
    /// let command = Command::Tabulate(TabulateArgs::default());
    /// match command {
    ///   Command::Tabulate(args) => assert!(args.file.is_empty()),
    ///   _ => (),
    /// }
    /// ```
    #[clap(about = "Convert comment-header BLAST reports (.txt) to tables (.tsv).")]
    Tabulate(TabulateArgs),

    /// Pass CLI arguments to the BLAST [combine](crate::blast::combine::combine()) method.
    #[clap(about = "Concatenate the per-database tables of one species.")]
    Combine(combine::Args),

    /// Pass CLI arguments to the BLAST [recap](crate::blast::recap::recap()) method.
    #[clap(about = "Summarize genes with and without hits for every report in a folder.")]
    Recap(recap::Args),

    /// Pass CLI arguments to the BLAST [analyze](crate::blast::analyze::analyze()) method.
    #[clap(about = "Count how many databases each query hits, with a network graph and heatmap.")]
    Analyze(analyze::Args),
}
