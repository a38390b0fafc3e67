use crate::sequence::{alleles, fetch, translate};
use clap::{Parser, Subcommand};

/// CLI arguments to manipulate fasta files.
#[derive(Debug, Parser)]
#[clap(about = "Extract, pick, and translate fasta records.")]
pub struct Args {
    /// Fasta command: Fetch, Alleles, Translate
    #[clap(subcommand)]
    pub command: Command,
}

/// CLI fasta [commands](#variants).
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the fasta [fetch](crate::sequence::fetch::fetch()) method.
    #[clap(about = "Extract fasta records by a list of keys.")]
    Fetch(fetch::Args),

    /// Pass CLI arguments to the fasta [alleles](crate::sequence::alleles::alleles()) method.
    #[clap(about = "Pick one representative allele per key from a pangenome allele file.")]
    Alleles(alleles::Args),

    /// Pass CLI arguments to the fasta [translate](crate::sequence::translate::translate()) method.
    #[clap(about = "Translate nucleotide records to protein with the standard genetic code.")]
    Translate(translate::Args),
}
