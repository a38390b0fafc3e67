use crate::plot::{EssentialArgs, RecapArgs};
use clap::{Parser, Subcommand};

/// CLI arguments to draw figures.
#[derive(Debug, Parser)]
#[clap(about = "Draw figures as SVG.")]
pub struct Args {
    /// Plot command: Essential, Recap
    #[clap(subcommand)]
    pub command: Command,
}

/// CLI plot [commands](#variants).
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the plot [essential](crate::plot::essential()) method.
    #[clap(about = "Stacked bar chart of essential and non-essential genes per species.")]
    Essential(EssentialArgs),

    /// Pass CLI arguments to the plot [recap](crate::plot::recap()) method.
    #[clap(about = "Bar chart and Venn diagrams of BLAST recaps per database.")]
    Recap(RecapArgs),
}
