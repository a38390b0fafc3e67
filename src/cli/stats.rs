use crate::stats::{cog, overlap, ChisqArgs, CoreEssentialArgs, NormalityArgs};
use clap::{Parser, Subcommand};

/// CLI arguments to run statistical tests.
#[derive(Debug, Parser)]
#[clap(about = "Run statistical tests on thesis tables.")]
pub struct Args {
    /// Stats command: Normality, Chisq, CoreEssential, Cog, Overlap
    #[clap(subcommand)]
    pub command: Command,
}

/// CLI statistics [commands](#variants).
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the stats [normality](crate::stats::normality()) method.
    #[clap(about = "Shapiro-Wilk test of every column of a table.")]
    Normality(NormalityArgs),

    /// Pass CLI arguments to the stats [chisq](crate::stats::chisq()) method.
    #[clap(about = "Chi-square test of independence on a contingency table.")]
    Chisq(ChisqArgs),

    /// Pass CLI arguments to the stats [core_essential](crate::stats::core_essential()) method.
    #[clap(about = "Compare core-essential genes across species.")]
    CoreEssential(CoreEssentialArgs),

    /// Pass CLI arguments to the stats [cog](crate::stats::cog::cog()) method.
    #[clap(about = "Enrichment of functional (COG) categories.")]
    Cog(cog::Args),

    /// Pass CLI arguments to the stats [overlap](crate::stats::overlap::overlap()) method.
    #[clap(about = "Compare matched and unmatched genes across categories.")]
    Overlap(overlap::Args),
}
