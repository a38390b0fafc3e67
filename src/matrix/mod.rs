//! Presence matrices: one column per species, one locus tag per cell (blank = absent).

#[cfg(test)]
mod tests;

use crate::{utils, Table};
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Species columns of a presence matrix, in output order.
pub const SPECIES_COLUMNS: [&str; 6] = ["equi", "iniae", "uberis", "pneumo", "suis", "agal"];

/// Display names of the species columns in the UpSet input, as `column=Label`.
pub const UPSET_LABELS: [&str; 6] = [
    "pneumo=S.Pneumoniae",
    "suis=S.Suis",
    "agal=S.Agalactiae",
    "equi=S.Equi_sb_equi",
    "iniae=S.Iniae",
    "uberis=S.Uberis",
];

fn species_columns() -> Vec<String> {
    SPECIES_COLUMNS.map(String::from).to_vec()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// ----------------------------------------------------------------------------
// Merge

/// Arguments for merging per-species presence matrices.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct MergeArgs {
    /// Presence matrices, comma separated.
    #[clap(short = 'i', long, required = true, value_delimiter = ',')]
    pub input: Vec<PathBuf>,

    /// Queries without BLAST results, laid out like a presence matrix.
    ///
    /// Skipped if the file does not exist.
    #[clap(long, default_value = "no_results_all_species.tsv")]
    pub no_results: PathBuf,

    /// Species columns, comma separated.
    #[clap(long, value_delimiter = ',', default_values_t = SPECIES_COLUMNS.map(String::from))]
    pub columns: Vec<String>,

    /// Output matrix.
    #[clap(short = 'o', long, default_value = "deduplicated_full_matrix.tsv")]
    pub output: PathBuf,
}

impl Default for MergeArgs {
    fn default() -> Self {
        MergeArgs {
            input: Vec::new(),
            no_results: PathBuf::from("no_results_all_species.tsv"),
            columns: species_columns(),
            output: PathBuf::from("deduplicated_full_matrix.tsv"),
        }
    }
}

/// Concatenate presence matrices aligned to the species columns, dropping exact duplicate rows.
pub fn merge(args: &MergeArgs) -> Result<Table<String>, Report> {
    let columns = args.columns.iter().map(String::as_str).collect_vec();

    let mut paths = args.input.clone();
    if args.no_results.exists() {
        paths.push(args.no_results.clone());
    } else {
        debug!("No results table does not exist, skipping: {:?}", args.no_results);
    }

    let mut merged = Table::new();
    merged.headers = args.columns.clone();
    for path in &paths {
        let table = Table::read(path)?;
        let missing = columns.iter().filter(|c| !table.has_header(c)).collect_vec();
        if !missing.is_empty() {
            warn!("{path:?} has no column(s): {}", missing.iter().join(", "));
        }
        merged.rows.extend(table.select(&columns).rows);
    }

    let merged = merged.unique();
    info!("Merged {} tables into {} unique rows.", paths.len(), merged.rows.len());
    merged.write(&args.output)?;
    println!("Merged file with all mapping contexts saved to: {}", args.output.display());
    Ok(merged)
}

// ----------------------------------------------------------------------------
// Core

/// Arguments for extracting the groups present in every species.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct CoreArgs {
    /// Presence matrix.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Species columns, comma separated.
    #[clap(long, value_delimiter = ',', default_values_t = SPECIES_COLUMNS.map(String::from))]
    pub columns: Vec<String>,

    /// Output matrix.
    #[clap(short = 'o', long, default_value = "all_essential.tsv")]
    pub output: PathBuf,
}

impl Default for CoreArgs {
    fn default() -> Self {
        CoreArgs {
            input: PathBuf::new(),
            columns: species_columns(),
            output: PathBuf::from("all_essential.tsv"),
        }
    }
}

/// Keep the rows with a locus tag in every species column, deduplicated over those columns.
pub fn core(args: &CoreArgs) -> Result<Table<String>, Report> {
    let table = Table::read(&args.input)?;
    let missing = args.columns.iter().filter(|c| !table.has_header(c)).collect_vec();
    if !missing.is_empty() {
        return Err(eyre!("Presence matrix {:?} has no column(s): {}", args.input, missing.iter().join(", "))
            .suggestion("Set the species columns with --columns."));
    }

    let columns = args.columns.iter().map(String::as_str).collect_vec();
    let mut core = table.select(&columns);
    core.rows.retain(|row| row.iter().all(|value| !is_blank(value)));
    let core = core.unique();

    core.write(&args.output)?;
    println!("Saved {} core groups to {}", core.rows.len(), args.output.display());
    Ok(core)
}

// ----------------------------------------------------------------------------
// Upset

/// Arguments for counting the groups shared by every combination of species.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct UpsetArgs {
    /// Presence matrix.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Species columns and their display names, as comma separated `column=Label` pairs.
    #[clap(long, value_delimiter = ',', default_values_t = UPSET_LABELS.map(String::from))]
    pub labels: Vec<String>,

    /// Output R dataset.
    #[clap(short = 'o', long, default_value = "upset_input_dataset.txt")]
    pub output: PathBuf,
}

impl Default for UpsetArgs {
    fn default() -> Self {
        UpsetArgs {
            input: PathBuf::new(),
            labels: UPSET_LABELS.map(String::from).to_vec(),
            output: PathBuf::from("upset_input_dataset.txt"),
        }
    }
}

/// Count the unique value tuples of every combination of labelled columns.
///
/// Combinations follow the column order of the table, smallest first. A row counts toward a
/// combination when all of its columns are non-blank.
pub fn intersections(
    table: &Table<String>,
    labels: &BTreeMap<String, String>,
) -> Result<Vec<(String, usize)>, Report> {
    let available = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| labels.contains_key(*header))
        .collect_vec();
    if available.is_empty() {
        return Err(eyre!("No labelled species columns found in table: {:?}", table.path)
            .suggestion(format!("Labelled columns: {}", labels.keys().join(", "))));
    }

    let mut counts = Vec::new();
    for size in 1..=available.len() {
        for combo in available.iter().combinations(size) {
            let key = combo.iter().map(|(_, header)| &labels[*header]).join("&");
            let unique = table
                .rows
                .iter()
                .map(|row| combo.iter().map(|(i, _)| row[*i].trim()).collect_vec())
                .filter(|values| values.iter().all(|v| !v.is_empty()))
                .collect::<HashSet<_>>();
            counts.push((key, unique.len()));
        }
    }
    Ok(counts)
}

/// Format intersection counts as an R named vector.
///
/// ```rust
/// use strepcore::matrix::to_r_vector;
/// let counts = vec![("S.Suis".to_string(), 3), ("S.Suis&S.Iniae".to_string(), 1)];
/// assert_eq!(
///     to_r_vector(&counts),
///     "# Dataset\ninput <- c(\n  \"S.Suis\" = 3,\n  \"S.Suis&S.Iniae\" = 1\n)\n"
/// );
/// ```
pub fn to_r_vector(counts: &[(String, usize)]) -> String {
    let entries = counts.iter().map(|(key, count)| format!("  \"{key}\" = {count}")).join(",\n");
    format!("# Dataset\ninput <- c(\n{entries}\n)\n")
}

/// Write the UpSet plot input of a presence matrix.
pub fn upset(args: &UpsetArgs) -> Result<Vec<(String, usize)>, Report> {
    let labels = args
        .labels
        .iter()
        .map(|pair| utils::parse_key_value(pair))
        .collect::<Result<BTreeMap<_, _>, Report>>()?;
    let table = Table::read(&args.input)?;

    let counts = intersections(&table, &labels)?;
    debug!("{} species combinations.", counts.len());

    utils::create_parent_dir(&args.output)?;
    std::fs::write(&args.output, to_r_vector(&counts))
        .wrap_err_with(|| eyre!("Unable to write: {:?}", args.output))?;
    println!("{} generated.", args.output.display());
    Ok(counts)
}
