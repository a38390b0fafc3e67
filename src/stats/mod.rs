//! Statistical summaries of gene category and essential gene counts.
//!
//! Every operation reads its counts from a table (see `data/` for the thesis values) and
//! writes a plain-text report next to any tabular results.

pub mod cog;
pub mod hypothesis;
pub mod overlap;

#[cfg(test)]
mod tests;

use crate::{utils, Table};
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use hypothesis::{ChiSquare, Fisher, ShapiroWilk, Spearman};
use indoc::formatdoc;
use itertools::Itertools;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tabled::settings::Style;

/// Write a text report, creating the parent directory.
fn write_report(path: &Path, report: &str) -> Result<(), Report> {
    utils::create_parent_dir(&path)?;
    std::fs::write(path, report).wrap_err_with(|| eyre!("Unable to write report: {path:?}"))?;
    Ok(())
}

/// Format a probability or statistic to a fixed number of decimals.
fn fixed(x: f64, decimals: usize) -> String {
    format!("{x:.decimals$}")
}

// ----------------------------------------------------------------------------
// Normality

/// Arguments for testing the normality of every numeric column of a table.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct NormalityArgs {
    /// Table with one column per category, one row per species.
    ///
    /// Columns with non-numeric values (ex. species names) are skipped.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Output report.
    #[clap(short = 'o', long, default_value = "normality_results.txt")]
    pub output: PathBuf,

    /// Significance level.
    #[clap(long, default_value_t = 0.05)]
    pub alpha: f64,
}

impl Default for NormalityArgs {
    fn default() -> Self {
        NormalityArgs {
            input: PathBuf::new(),
            output: PathBuf::from("normality_results.txt"),
            alpha: 0.05,
        }
    }
}

/// Shapiro-Wilk test of every numeric column.
pub fn normality(args: &NormalityArgs) -> Result<Vec<(String, ShapiroWilk)>, Report> {
    let table = Table::read(&args.input)?;

    let mut results = Vec::new();
    for header in &table.headers {
        let Ok(values) = table.get_numeric_column(header) else {
            debug!("Skipping non-numeric column: {header}");
            continue;
        };
        let result = hypothesis::shapiro_wilk(&values)
            .wrap_err_with(|| eyre!("Failed to test the normality of column: {header}"))?;
        results.push((header.clone(), result));
    }
    if results.is_empty() {
        return Err(eyre!("No numeric columns found in: {:?}", args.input)
            .suggestion("Each category should be a column of counts."));
    }

    let mut report = format!("Shapiro-Wilk Normality Test Results\n{}\n", "=".repeat(40));
    for (category, result) in &results {
        let conclusion = match result.p_value > args.alpha {
            true => "Normally Distributed",
            false => "Not Normally Distributed",
        };
        report += &formatdoc!(
            "Category: {category}
              Shapiro-Wilk Test Statistic: {}
              P-value: {}
              Conclusion: {conclusion}
            {}
            ",
            fixed(result.statistic, 4),
            fixed(result.p_value, 4),
            "-".repeat(40),
        );
    }

    write_report(&args.output, &report)?;
    println!("Shapiro-Wilk test results have been saved to {:?}.", args.output);
    Ok(results)
}

// ----------------------------------------------------------------------------
// Chi-Square

/// Arguments for a chi-square test of independence.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct ChisqArgs {
    /// Contingency table, the first column holds the row labels.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Output report.
    #[clap(short = 'o', long, default_value = "chi_square_results.txt")]
    pub output: PathBuf,
}

impl Default for ChisqArgs {
    fn default() -> Self {
        ChisqArgs { input: PathBuf::new(), output: PathBuf::from("chi_square_results.txt") }
    }
}

/// Split a table into row labels, column labels, and counts.
pub fn contingency(table: &Table<String>) -> Result<(Vec<String>, Vec<String>, Vec<Vec<f64>>), Report> {
    if table.headers.len() < 2 {
        return Err(eyre!("Contingency table needs a label column and a count column: {:?}", table.path));
    }
    let row_labels = table.rows.iter().map(|row| row[0].clone()).collect_vec();
    let col_labels = table.headers[1..].to_vec();
    let counts = col_labels
        .iter()
        .map(|header| table.get_numeric_column(header))
        .collect::<Result<Vec<_>, Report>>()?;
    // transpose columns to rows
    let observed = (0..row_labels.len())
        .map(|r| counts.iter().map(|column| column[r]).collect_vec())
        .collect_vec();
    Ok((row_labels, col_labels, observed))
}

/// Table of expected frequencies, for printing.
fn expected_table(row_labels: &[String], col_labels: &[String], result: &ChiSquare) -> tabled::Table {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(std::iter::once(String::new()).chain(col_labels.iter().cloned()));
    for (label, row) in row_labels.iter().zip(&result.expected) {
        builder.push_record(std::iter::once(label.clone()).chain(row.iter().map(|v| fixed(*v, 2))));
    }
    let mut table = builder.build();
    table.with(Style::markdown());
    table
}

/// Chi-square test of independence of the rows and columns of a contingency table.
pub fn chisq(args: &ChisqArgs) -> Result<ChiSquare, Report> {
    let table = Table::read(&args.input)?;
    let (row_labels, col_labels, observed) = contingency(&table)?;
    let result = hypothesis::chi2_contingency(&observed)?;
    info!("Chi-square statistic: {}, p-value: {}", result.statistic, result.p_value);

    let line = "=".repeat(60);
    let report = formatdoc!(
        "Chi-Square Test for Gene Category Proportions Across Species
        {line}
        Chi-Square Statistic: {}
        P-value: {}
        Degrees of Freedom: {}

        Expected Frequencies (If Proportions Were the Same):
        {}
        {line}
        ",
        fixed(result.statistic, 4),
        fixed(result.p_value, 4),
        result.dof,
        expected_table(&row_labels, &col_labels, &result),
    );

    write_report(&args.output, &report)?;
    println!("Chi-Square test results have been saved to {:?}.", args.output);
    Ok(result)
}

// ----------------------------------------------------------------------------
// Core Essential

/// Columns of the core-essential table.
pub const CORE_ESSENTIAL_COLUMNS: [&str; 5] =
    ["species", "core_essential", "core_non_essential", "total_essential", "genome_size"];

/// Arguments for comparing core-essential genes across species.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct CoreEssentialArgs {
    /// Table with the columns: species, core_essential, core_non_essential, total_essential, genome_size.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Output report.
    #[clap(long, default_value = "summary.txt")]
    pub summary: PathBuf,

    /// Output table of per species Fisher tests.
    #[clap(long, default_value = "species_fisher.tsv")]
    pub fisher: PathBuf,
}

impl Default for CoreEssentialArgs {
    fn default() -> Self {
        CoreEssentialArgs {
            input: PathBuf::new(),
            summary: PathBuf::from("summary.txt"),
            fisher: PathBuf::from("species_fisher.tsv"),
        }
    }
}

/// Fisher test of core enrichment among the essential genes of one species.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesFisher {
    pub species: String,
    /// Core and essential.
    pub a: u64,
    /// Core, not essential.
    pub b: u64,
    /// Essential, not core.
    pub c: u64,
    /// Neither core nor essential.
    pub d: u64,
    pub fisher: Fisher,
    pub q_value: f64,
}

/// Results of [`core_essential`].
#[derive(Clone, Debug, PartialEq)]
pub struct CoreEssential {
    pub chi_square: ChiSquare,
    pub fisher: Vec<SpeciesFisher>,
    pub spearman: Spearman,
}

fn to_count(value: f64, header: &str, species: &str) -> Result<u64, Report> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(eyre!("{header} of {species} is not a count: {value}"));
    }
    Ok(value as u64)
}

/// Chi-square test over species, Fisher tests per species, and the Spearman correlation of
/// core-essential against total essential genes.
pub fn core_essential(args: &CoreEssentialArgs) -> Result<CoreEssential, Report> {
    let table = Table::read(&args.input)?;
    let species = table.get_column(CORE_ESSENTIAL_COLUMNS[0])?.into_iter().cloned().collect_vec();
    let columns = CORE_ESSENTIAL_COLUMNS[1..]
        .iter()
        .map(|header| table.get_numeric_column(header))
        .collect::<Result<Vec<_>, Report>>()?;
    let (core_essential, core_non_essential, total_essential, genome_size) =
        (&columns[0], &columns[1], &columns[2], &columns[3]);

    // 2 x N test
    let chi_square =
        hypothesis::chi2_contingency(&[core_essential.clone(), core_non_essential.clone()])?;

    let mut fisher = Vec::new();
    for (i, name) in species.iter().enumerate() {
        let a = to_count(core_essential[i], "core_essential", name)?;
        let b = to_count(core_non_essential[i], "core_non_essential", name)?;
        let total = to_count(total_essential[i], "total_essential", name)?;
        let genome = to_count(genome_size[i], "genome_size", name)?;
        let c = total.checked_sub(a).ok_or_else(|| {
            eyre!("{name} has more core-essential ({a}) than essential genes ({total}).")
        })?;
        let d = genome.checked_sub(a + b + c).ok_or_else(|| {
            eyre!("{name} has more core and essential genes ({}) than genes ({genome}).", a + b + c)
        })?;
        let result = hypothesis::fisher_exact([[a, b], [c, d]]);
        fisher.push(SpeciesFisher { species: name.clone(), a, b, c, d, fisher: result, q_value: f64::NAN });
    }
    let q_values = hypothesis::benjamini_hochberg(&fisher.iter().map(|f| f.fisher.p_value).collect_vec());
    fisher.iter_mut().zip(q_values).for_each(|(f, q)| f.q_value = q);

    let spearman = hypothesis::spearman(core_essential, total_essential)?;

    // per species table
    let mut fisher_table = Table::new();
    fisher_table.headers = ["Species", "a", "b", "c", "d", "OR", "p_raw", "q_BH"].map(String::from).to_vec();
    for f in &fisher {
        let row = [f.species.clone(), f.a.to_string(), f.b.to_string(), f.c.to_string(), f.d.to_string()]
            .into_iter()
            .chain([f.fisher.odds_ratio, f.fisher.p_value, f.q_value].map(|v| v.to_string()));
        fisher_table.add_row(row)?;
    }
    fisher_table.write(&args.fisher)?;

    // console and file report
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["", "Species", "OR", "p_raw", "q_BH"].map(String::from));
    for (i, f) in fisher.iter().enumerate() {
        let values = [f.fisher.odds_ratio, f.fisher.p_value, f.q_value].map(|v| utils::format_general(v, 3));
        builder.push_record([i.to_string(), f.species.clone()].into_iter().chain(values));
    }
    let mut fisher_summary = builder.build();
    fisher_summary.with(Style::markdown());

    let n = species.len();
    let report = formatdoc!(
        "=== 2 x {n} x² test (core-essential vs species) ===
        x² = {},  df = {},  p = {}

        === Fisher tests (core enrichment per species) ===
        {fisher_summary}

        === Spearman correlation (core-essential vs total essential) ===
        ρ = {},  p = {}",
        fixed(chi_square.statistic, 2),
        chi_square.dof,
        utils::format_scientific(chi_square.p_value, 3),
        fixed(spearman.rho, 3),
        utils::format_scientific(spearman.p_value, 3),
    );
    println!("{report}");
    write_report(&args.summary, &report)?;
    println!("\nFiles written:  {}   {}", args.summary.display(), args.fisher.display());

    Ok(CoreEssential { chi_square, fisher, spearman })
}
