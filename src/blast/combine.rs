use crate::blast::HEADERS;
use crate::Table;
use clap::Parser;
use color_eyre::eyre::{ContextCompat, Report, Result};
use log::info;
use std::path::{Path, PathBuf};

/// The core genome BLAST databases, one per species.
pub const DATABASES: [&str; 6] =
    ["iniaecoredb", "pneumocoredb", "suiscoredb", "uberiscoredb", "agalcoredb", "equicoredb"];

/// Arguments for combining the per-database tables of a species.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Species name, used to find `<species>_essential_vs_<database>.tsv`.
    #[clap(short = 's', long, required = true)]
    pub species: String,

    /// Output table (.tsv or .csv).
    #[clap(short = 'o', long, required = true)]
    pub outfile: PathBuf,

    /// BLAST databases, comma separated.
    #[clap(long, value_delimiter = ',', default_values_t = DATABASES.map(String::from))]
    pub databases: Vec<String>,

    /// Directory holding the per-database tables.
    #[clap(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Args::new()
    }
}

impl Args {
    pub fn new() -> Self {
        Args {
            species: String::new(),
            outfile: PathBuf::new(),
            databases: DATABASES.map(String::from).to_vec(),
            directory: PathBuf::from("."),
        }
    }
}

/// Database name from a table file name: the text after `_vs_`, without extension.
///
/// ```rust
/// use strepcore::blast::combine::database_name;
/// assert_eq!(database_name(&"out/equi_essential_vs_suiscoredb.tsv")?, "suiscoredb");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn database_name<P>(path: &P) -> Result<String, Report>
where
    P: AsRef<Path> + std::fmt::Debug,
{
    let stem = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .wrap_err(format!("Failed to get file name: {path:?}"))?;
    let (_, database) =
        stem.split_once("_vs_").wrap_err(format!("File name has no '_vs_': {path:?}"))?;
    Ok(database.to_string())
}

/// Concatenate the per-database tables of a species into one table.
pub fn combine(args: &Args) -> Result<Table<String>, Report> {
    let mut combined = Table::new();
    combined.headers = HEADERS.iter().map(|h| h.to_string()).collect();

    for database in &args.databases {
        let path = args.directory.join(format!("{}_essential_vs_{database}.tsv", args.species));
        info!("Reading: {path:?}");
        let mut table = Table::read(&path)?.select(&HEADERS);

        // the file name is the source of truth for the database
        let name = database_name(&path)?;
        (0..table.rows.len()).try_for_each(|i| table.set("Database", i, name.clone()))?;
        combined.rows.append(&mut table.rows);
    }

    combined.write(&args.outfile)?;
    info!("Wrote {} rows to: {:?}", combined.rows.len(), args.outfile);
    Ok(combined)
}
