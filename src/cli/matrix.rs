use crate::matrix::{CoreArgs, MergeArgs, UpsetArgs};
use clap::{Parser, Subcommand};

/// CLI arguments to work with species presence tables.
#[derive(Debug, Parser)]
#[clap(about = "Merge species presence tables and count intersections.")]
pub struct Args {
    /// Matrix command: Merge, Core, Upset
    #[clap(subcommand)]
    pub command: Command,
}

/// CLI presence matrix [commands](#variants).
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the matrix [merge](crate::matrix::merge()) method.
    #[clap(about = "Align presence tables to the species columns and concatenate them.")]
    Merge(MergeArgs),

    /// Pass CLI arguments to the matrix [core](crate::matrix::core()) method.
    #[clap(about = "Keep rows present in every species.")]
    Core(CoreArgs),

    /// Pass CLI arguments to the matrix [upset](crate::matrix::upset()) method.
    #[clap(about = "Count unique rows for every combination of species, as an R named vector.")]
    Upset(UpsetArgs),
}
