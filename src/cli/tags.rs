use crate::tags::{essential, MapArgs};
use clap::{Parser, Subcommand};

/// CLI arguments to cross-reference locus tags.
#[derive(Debug, Parser)]
#[clap(about = "Cross-reference pangenome and reference locus tags.")]
pub struct Args {
    /// Tags command: Map, Essential
    #[clap(subcommand)]
    pub command: Command,
}

/// CLI locus tag [commands](#variants).
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the tags [map](crate::tags::map()) method.
    #[clap(about = "Resolve core pangenome locus tags to reference genome locus tags.")]
    Map(MapArgs),

    /// Pass CLI arguments to the tags [essential](crate::tags::essential::extract()) method.
    #[clap(about = "List the locus tags without insertions in a TraDIS table.")]
    Essential(essential::Args),
}
