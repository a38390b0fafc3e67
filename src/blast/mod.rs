//! Parse tabular BLAST reports (`-outfmt 7`, with `#` comment headers) into tables.

pub mod analyze;
pub mod combine;
pub mod recap;

#[cfg(test)]
mod tests;

use crate::{utils, Table};
use clap::Parser;
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use log::{debug, info, warn};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Column headers of a BLAST hit table, in order.
pub const HEADERS: [&str; 13] = [
    "Query",
    "Database",
    "Hits found",
    "query id",
    "subject id",
    "alignment length",
    "query length",
    "subject length",
    "q. start",
    "q. end",
    "s. start",
    "s. end",
    "evalue",
];

/// The tab-separated hit fields, in the order BLAST writes them.
pub const HIT_FIELDS: [&str; 10] = [
    "query id",
    "subject id",
    "alignment length",
    "query length",
    "subject length",
    "q. start",
    "q. end",
    "s. start",
    "s. end",
    "evalue",
];

// ----------------------------------------------------------------------------
// Structs

/// Arguments for converting BLAST reports to tables.
#[derive(Clone, Debug, Default, Parser)]
#[clap(verbatim_doc_comment)]
pub struct TabulateArgs {
    /// BLAST report(s), comma separated.
    ///
    /// Each report is written next to its input, with `.txt` replaced by `.tsv`.
    #[clap(short = 'f', long, required = true, value_delimiter = ',')]
    pub file: Vec<PathBuf>,
}

/// One row of a BLAST hit table.
///
/// A query without hits is recorded once, with `hits_found = 0` and empty hit fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BlastHit {
    pub query: String,
    pub database: String,
    pub hits_found: usize,
    /// Raw hit fields (`query id` .. `evalue`), empty for zero-hit rows.
    pub fields: Vec<String>,
}

impl BlastHit {
    /// A placeholder row for a query that had no hits in a database.
    pub fn zero_hit(query: &str, database: &str) -> Self {
        BlastHit {
            query: query.to_string(),
            database: database.to_string(),
            hits_found: 0,
            fields: vec![String::new(); HIT_FIELDS.len()],
        }
    }

    /// A hit row, with tab-separated `values` zipped onto [`HIT_FIELDS`].
    ///
    /// Extra values are dropped and missing ones are left empty.
    pub fn hit(query: &str, database: &str, values: &[&str]) -> Self {
        let fields = (0..HIT_FIELDS.len())
            .map(|i| values.get(i).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        BlastHit { query: query.to_string(), database: database.to_string(), hits_found: 1, fields }
    }

    /// Convert to a table row matching [`HEADERS`].
    pub fn to_row(&self) -> Vec<String> {
        [self.query.clone(), self.database.clone(), self.hits_found.to_string()]
            .into_iter()
            .chain(self.fields.iter().cloned())
            .collect()
    }
}

// ----------------------------------------------------------------------------
// Functions

/// Parse the number of hits from a `# N hits found` line.
fn parse_hits_found(line: &str) -> Option<usize> {
    let (num, rest) = line.strip_prefix("# ")?.split_once(' ')?;
    rest.starts_with("hits found").then(|| num.parse().ok()).flatten()
}

/// Parse the text of a BLAST report into hit records.
///
/// ```rust
/// use strepcore::blast::parse_report;
///
/// let report = "# Query: geneA [locus_tag=A_001]\n# Database: suiscoredb\n# 0 hits found\n";
/// let hits = parse_report(report);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].query, "geneA");
/// assert_eq!(hits[0].database, "suiscoredb");
/// assert_eq!(hits[0].hits_found, 0);
/// ```
pub fn parse_report(text: &str) -> Vec<BlastHit> {
    let mut hits = Vec::new();
    let mut query: Option<String> = None;
    let mut database = String::new();

    for line in text.lines() {
        if line.starts_with("# Query:") {
            let id = line.split_whitespace().nth(2).unwrap_or_default();
            query = Some(id.to_string());
        } else if line.starts_with("# Database:") {
            database = line.split(": ").nth(1).unwrap_or_default().to_string();
        } else if let Some(num_hits) = parse_hits_found(line) {
            match (&query, num_hits) {
                (Some(query), 0) => hits.push(BlastHit::zero_hit(query, &database)),
                (None, 0) => warn!("Skipping zero hits line before any query: {line:?}"),
                _ => (),
            }
        } else if !line.starts_with('#') {
            let values = line.split('\t').collect_vec();
            if values.len() <= 1 {
                continue;
            }
            match &query {
                Some(query) => hits.push(BlastHit::hit(query, &database, &values)),
                None => debug!("Skipping hit line before any query: {line:?}"),
            }
        }
    }

    hits
}

/// Convert hit records into a [`Table`] with [`HEADERS`].
pub fn to_table(hits: &[BlastHit]) -> Table<String> {
    let mut table = Table::new();
    table.headers = HEADERS.iter().map(|h| h.to_string()).collect();
    table.rows = hits.iter().map(BlastHit::to_row).collect();
    table
}

/// Read a (optionally zstd compressed) BLAST report into a [`Table`].
pub fn read_report<P>(path: &P) -> Result<Table<String>, Report>
where
    P: AsRef<Path> + Debug,
{
    let text = utils::read_to_string(path)?;
    let mut table = to_table(&parse_report(&text));
    table.path = Some(path.as_ref().to_path_buf());
    Ok(table)
}

/// Convert BLAST reports to tables written next to the input.
///
/// Returns the paths that were written.
pub fn tabulate(args: &TabulateArgs) -> Result<Vec<PathBuf>, Report> {
    let mut outputs = Vec::new();
    for path in &args.file {
        info!("Parsing BLAST report: {path:?}");
        let table = read_report(path)?;
        let output = utils::sibling_path(path, "tsv")?;
        table.write(&output)?;
        println!("Wrote {} to disk...", output.display());
        outputs.push(output);
    }
    Ok(outputs)
}
