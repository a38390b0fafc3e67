use crate::{utils, Table};
use clap::Parser;
use color_eyre::eyre::{Report, Result};
use log::{debug, warn};
use std::path::PathBuf;

/// Column of a transposon insertion table counting insertions per feature.
pub const INSERTIONS: &str = "test_num_insertions_mapped_per_feat";
/// Column of a transposon insertion table with the feature locus tag.
pub const LOCUS_TAG: &str = "locus_tag";

/// Arguments for extracting essential genes from a transposon insertion table.
#[derive(Clone, Debug, Default, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Insertion table (.tsv or .csv).
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Output list of essential locus tags.
    #[clap(short = 'o', long, required = true)]
    pub output: PathBuf,
}

/// Write the locus tags of features with zero mapped insertions.
///
/// Rows without a numeric insertion count are skipped.
pub fn extract(args: &Args) -> Result<Vec<String>, Report> {
    let table = Table::read(&args.input)?;
    let insertions = table.get_header_index(INSERTIONS)?;
    let locus_tag = table.get_header_index(LOCUS_TAG)?;

    let essential = table
        .rows
        .iter()
        .filter_map(|row| match row[insertions].trim().parse::<f64>() {
            Ok(count) => Some((count, &row[locus_tag])),
            Err(_) => {
                warn!("Skipping {:?}, non-numeric {INSERTIONS}: {:?}", row[locus_tag], row[insertions]);
                None
            }
        })
        .filter(|(count, _)| *count == 0.0)
        .map(|(_, tag)| tag.clone())
        .collect::<Vec<_>>();
    debug!("{} of {} features have no insertions.", essential.len(), table.rows.len());

    utils::write_lines(&args.output, &essential)?;
    println!("Output saved to {}", args.output.display());
    Ok(essential)
}
