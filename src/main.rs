use clap::Parser;
use color_eyre::eyre::{Report, Result};
use strepcore::{blast, collect, matrix, plot, sequence, stats, tags};
use strepcore::{cli, cli::Cli};

fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    // check which CLI command we're running
    match args.command {
        // BLAST reports
        cli::Command::Blast(args) => match args.command {
            cli::blast::Command::Tabulate(args) => _ = blast::tabulate(&args)?,
            cli::blast::Command::Combine(args) => _ = blast::combine::combine(&args)?,
            cli::blast::Command::Recap(args) => _ = blast::recap::recap(&args)?,
            cli::blast::Command::Analyze(args) => _ = blast::analyze::analyze(&args)?,
        },
        // Locus tags
        cli::Command::Tags(args) => match args.command {
            cli::tags::Command::Map(args) => _ = tags::map(&args)?,
            cli::tags::Command::Essential(args) => _ = tags::essential::extract(&args)?,
        },
        // Sequences
        cli::Command::Fasta(args) => match args.command {
            cli::fasta::Command::Fetch(args) => _ = sequence::fetch::fetch(&args)?,
            cli::fasta::Command::Alleles(args) => _ = sequence::alleles::alleles(&args)?,
            cli::fasta::Command::Translate(args) => _ = sequence::translate::translate(&args)?,
        },
        // Presence matrices
        cli::Command::Matrix(args) => match args.command {
            cli::matrix::Command::Merge(args) => _ = matrix::merge(&args)?,
            cli::matrix::Command::Core(args) => _ = matrix::core(&args)?,
            cli::matrix::Command::Upset(args) => _ = matrix::upset(&args)?,
        },
        // Statistics
        cli::Command::Stats(args) => match args.command {
            cli::stats::Command::Normality(args) => _ = stats::normality(&args)?,
            cli::stats::Command::Chisq(args) => _ = stats::chisq(&args)?,
            cli::stats::Command::CoreEssential(args) => _ = stats::core_essential(&args)?,
            cli::stats::Command::Cog(args) => _ = stats::cog::cog(&args)?,
            cli::stats::Command::Overlap(args) => _ = stats::overlap::overlap(&args)?,
        },
        // Figures
        cli::Command::Plot(args) => match args.command {
            cli::plot::Command::Essential(args) => plot::essential(&args)?,
            cli::plot::Command::Recap(args) => plot::recap(&args)?,
        },
        // File housekeeping
        cli::Command::Collect(args) => _ = collect::collect(&args)?,
    }

    Ok(())
}
