//! Figures of essential gene counts and BLAST recaps.

pub mod chart;


use crate::blast::recap::Recap;
use crate::{utils, Table};
use chart::{BarChart, BarMode, Series};
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::info;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Databases drawn by [`recap`] by default.
pub const RECAP_DATABASES: [&str; 7] = [
    "agalcoredb",
    "allcoredb",
    "equicoredb",
    "iniaecoredb",
    "pneumocoredb",
    "suiscoredb",
    "uberiscoredb",
];

/// Number of core genes in every database, as `database=count`.
pub const CORE_TOTALS: [&str; 7] = [
    "agalcoredb=1556",
    "allcoredb=716",
    "equicoredb=1781",
    "iniaecoredb=1561",
    "pneumocoredb=1459",
    "suiscoredb=1279",
    "uberiscoredb=1422",
];

// ----------------------------------------------------------------------------
// Essential

/// Arguments for the essential gene bar chart.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct EssentialArgs {
    /// Table with the columns: species, essential, non_essential.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Output figure (.svg).
    #[clap(short = 'o', long, default_value = "streptococcus_essential_nonessential.svg")]
    pub output: PathBuf,
}

impl Default for EssentialArgs {
    fn default() -> Self {
        EssentialArgs {
            input: PathBuf::new(),
            output: PathBuf::from("streptococcus_essential_nonessential.svg"),
        }
    }
}

/// Stacked bar chart of essential and non-essential genes per species, with totals.
pub fn essential(args: &EssentialArgs) -> Result<(), Report> {
    let table = Table::read(&args.input)?;
    let species = table.get_column("species")?.into_iter().cloned().collect_vec();

    let mut essential = Series::new("Essential genes", table.get_numeric_column("essential")?);
    essential.color = Some("#D33F6A".to_string());
    let mut non_essential =
        Series::new("Non-essential genes", table.get_numeric_column("non_essential")?);
    non_essential.color = Some("#7F7F7F".to_string());

    let chart = BarChart {
        title: "Essential and Non-Essential Genes in Different Streptococcus Species".to_string(),
        x_label: "Species".to_string(),
        y_label: "Number of Genes".to_string(),
        categories: species,
        series: vec![essential, non_essential],
        mode: BarMode::Stacked,
        show_totals: true,
        total_prefix: "Total: ".to_string(),
        show_values: true,
        ..Default::default()
    };
    chart::save(&chart.to_svg(), &args.output)?;
    println!("Wrote {} to disk...", args.output.display());
    Ok(())
}

// ----------------------------------------------------------------------------
// Recap

/// Arguments for the BLAST recap figures.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct RecapArgs {
    /// Species name, used to find `<species>_essential_vs_<database>_recap.txt`.
    #[clap(short = 's', long, required = true)]
    pub species: String,

    /// BLAST databases, comma separated.
    #[clap(long, value_delimiter = ',', default_values_t = RECAP_DATABASES.map(String::from))]
    pub databases: Vec<String>,

    /// Number of core genes per database, as comma separated `database=count` pairs.
    #[clap(long, value_delimiter = ',', default_values_t = CORE_TOTALS.map(String::from))]
    pub core_totals: Vec<String>,

    /// Directory holding the recap files.
    #[clap(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,

    /// Output directory.
    #[clap(short = 'o', long, default_value = "Species_Output")]
    pub output_dir: PathBuf,
}

impl Default for RecapArgs {
    fn default() -> Self {
        RecapArgs {
            species: String::new(),
            databases: RECAP_DATABASES.map(String::from).to_vec(),
            core_totals: CORE_TOTALS.map(String::from).to_vec(),
            directory: PathBuf::from("."),
            output_dir: PathBuf::from("Species_Output"),
        }
    }
}

/// Parse `database=count` pairs.
pub fn parse_core_totals(pairs: &[String]) -> Result<BTreeMap<String, usize>, Report> {
    pairs
        .iter()
        .map(|pair| {
            let (database, count) = utils::parse_key_value(pair)?;
            let count = count
                .parse()
                .wrap_err_with(|| eyre!("Core total is not a count: {pair:?}"))?;
            Ok((database, count))
        })
        .collect()
}

/// Capitalize the first letter of a word.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Grouped bar chart of genes with and without hits per database, and one Venn diagram
/// of essential against core genes per database.
pub fn recap(args: &RecapArgs) -> Result<(), Report> {
    let species = &args.species;
    let core_totals = parse_core_totals(&args.core_totals)?;

    let mut with_hits = Vec::new();
    let mut zero_hits = Vec::new();
    for database in &args.databases {
        let path = args.directory.join(format!("{species}_essential_vs_{database}_recap.txt"));
        let (hits, zero) = Recap::parse_summary(&utils::read_to_string(&path)?)
            .wrap_err_with(|| eyre!("Failed to parse recap: {path:?}"))?;
        info!("{database}: {hits} genes with hits, {zero} genes with zero hits");
        with_hits.push(hits);
        zero_hits.push(zero);
    }

    let mut hits_series =
        Series::new("Essential and Core", with_hits.iter().map(|n| *n as f64).collect());
    hits_series.color = Some("#add8e6".to_string());
    let mut zero_series =
        Series::new("Essential but not Core", zero_hits.iter().map(|n| *n as f64).collect());
    zero_series.color = Some("#00008b".to_string());

    let chart = BarChart {
        title: format!("Essential vs Core gene comparison in Streptococcus {}", capitalize(species)),
        x_label: "Database".to_string(),
        y_label: "Number of Genes".to_string(),
        categories: args.databases.clone(),
        series: vec![hits_series, zero_series],
        mode: BarMode::Grouped,
        show_values: true,
        ..Default::default()
    };
    let path = args.output_dir.join(format!("{species}_histogram.svg"));
    chart::save(&chart.to_svg(), &path)?;
    info!("Wrote: {path:?}");

    for (i, database) in args.databases.iter().enumerate() {
        let core = *core_totals.get(database).ok_or_else(|| {
            eyre!("No core gene total for database: {database}")
                .suggestion(format!("Add it with --core-totals {database}=<count>"))
        })?;
        let both = with_hits[i];
        let essential = with_hits[i] + zero_hits[i];
        // the core set includes the genes shared with the essential set
        let counts = (essential - both, core.saturating_sub(both), both);
        let short_name = database.split('_').next().unwrap_or(database);
        let label = format!("{} Core Genes", capitalize(short_name));
        let document = chart::venn2(
            &format!("{database} Essential vs Core Gene Comparison"),
            ("Essential Genes", &label),
            counts,
        );
        let path = args.output_dir.join(format!("{database}_venn.svg"));
        chart::save(&document, &path)?;
        info!("Wrote: {path:?}");
    }

    println!("Histogram and Venn diagrams saved in {:?} directory.", args.output_dir);
    Ok(())
}
