use crate::utils;
use clap::Parser;
use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use itertools::Itertools;
use log::{debug, info};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// File name suffixes written by [`recap`], never read back as reports.
pub const OUTPUT_SUFFIXES: [&str; 3] = ["_genes_with_hits", "_genes_with_zero_hits", "_recap"];

/// Arguments for summarizing a folder of BLAST reports.
#[derive(Clone, Debug, Default, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Folder of BLAST reports (.txt).
    #[clap(short = 'i', long, required = true)]
    pub input_folder: PathBuf,
}

/// A single hit of a gene: (gene name, locus tag, subject id).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneHit {
    pub gene_name: String,
    pub locus_tag: String,
    pub subject_id: String,
}

/// Genes with and without hits in one BLAST report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Recap {
    /// Report file name without extension.
    pub name: String,
    /// Locus tags with at least one hit, in report order.
    pub genes_with_hits: Vec<String>,
    /// Every hit, in report order.
    pub hits: Vec<GeneHit>,
    /// Locus tags without any hit, sorted.
    pub genes_with_zero_hits: BTreeSet<String>,
}

impl Recap {
    /// Summary text, as written to `<name>_recap.txt`.
    pub fn summary(&self) -> String {
        format!(
            "Total number of genes with one or more hits: {}\nTotal number of genes with zero hits: {}\n",
            self.genes_with_hits.len(),
            self.genes_with_zero_hits.len()
        )
    }

    /// Parse the (with hits, zero hits) counts back out of a recap summary.
    ///
    /// ```rust
    /// use strepcore::blast::recap::Recap;
    /// let text = "Total number of genes with one or more hits: 12\nTotal number of genes with zero hits: 3\n";
    /// assert_eq!(Recap::parse_summary(text)?, (12, 3));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn parse_summary(text: &str) -> Result<(usize, usize), Report> {
        let count = |prefix: &str| -> Result<usize, Report> {
            let line = text
                .lines()
                .find(|line| line.starts_with(prefix))
                .wrap_err(format!("Recap is missing the line: {prefix:?}"))?;
            let value = line[prefix.len()..].trim();
            value.parse().wrap_err(format!("Failed to parse count: {value:?}"))
        };
        let with_hits = count("Total number of genes with one or more hits:")?;
        let zero_hits = count("Total number of genes with zero hits:")?;
        Ok((with_hits, zero_hits))
    }
}

/// Extract the text between `[key=` and the next `]` of a query header.
fn bracket_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(&format!("[{key}="))? + key.len() + 2;
    let end = line[start..].find(']').map(|i| start + i).unwrap_or(line.len());
    Some(&line[start..end])
}

/// Collect the genes with and without hits from the text of a BLAST report.
///
/// Genes are identified by the `[locus_tag=...]` of their query header, falling back
/// to the query id.
pub fn parse_report(name: &str, text: &str) -> Recap {
    let mut recap = Recap { name: name.to_string(), ..Default::default() };
    let mut current: Option<(String, String)> = None;

    for line in text.lines() {
        if line.starts_with("# Query:") {
            let query_id = line.split_whitespace().nth(2).unwrap_or_default();
            let locus_tag = bracket_value(line, "locus_tag").unwrap_or(query_id).to_string();
            let gene_name = bracket_value(line, "gene").unwrap_or_default().to_string();
            // assume no hits until one shows up
            if !recap.genes_with_hits.contains(&locus_tag) {
                recap.genes_with_zero_hits.insert(locus_tag.clone());
            }
            current = Some((gene_name, locus_tag));
        } else if !line.starts_with('#') && !line.trim().is_empty() {
            let parts = line.trim().split('\t').collect_vec();
            let Some((gene_name, locus_tag)) = &current else {
                debug!("Skipping hit line before any query: {line:?}");
                continue;
            };
            if parts.len() <= 1 {
                continue;
            }
            recap.hits.push(GeneHit {
                gene_name: gene_name.clone(),
                locus_tag: locus_tag.clone(),
                subject_id: parts[1].to_string(),
            });
            if !recap.genes_with_hits.contains(locus_tag) {
                recap.genes_with_hits.push(locus_tag.clone());
            }
            recap.genes_with_zero_hits.remove(locus_tag);
        }
    }

    recap
}

/// Summarize one BLAST report, writing the recap files next to it.
pub fn recap_file<P>(path: &P) -> Result<Recap, Report>
where
    P: AsRef<Path> + Debug,
{
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .wrap_err(format!("Failed to get file name: {path:?}"))?;
    let text = utils::read_to_string(&path)?;
    let recap = parse_report(name, &text);

    let dir = path.parent().unwrap_or(Path::new(""));
    let hits = recap
        .hits
        .iter()
        .map(|hit| format!("{}\t{}\t{}", hit.gene_name, hit.locus_tag, hit.subject_id));
    utils::write_lines(&dir.join(format!("{name}_genes_with_hits.txt")), hits)?;
    utils::write_lines(
        &dir.join(format!("{name}_genes_with_zero_hits.txt")),
        &recap.genes_with_zero_hits,
    )?;
    let recap_path = dir.join(format!("{name}_recap.txt"));
    std::fs::write(&recap_path, recap.summary())
        .wrap_err_with(|| eyre!("Unable to write: {recap_path:?}"))?;

    println!("Results for {name}:");
    println!("{}", recap.summary());
    Ok(recap)
}

/// Returns true if this file is a BLAST report, rather than a recap output.
pub fn is_report<P>(path: &P) -> bool
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    name.ends_with(".txt") && !OUTPUT_SUFFIXES.iter().any(|suffix| name.contains(suffix))
}

/// Summarize every BLAST report in a folder.
pub fn recap(args: &Args) -> Result<Vec<Recap>, Report> {
    utils::check_exists(&args.input_folder)?;
    let paths = std::fs::read_dir(&args.input_folder)
        .wrap_err_with(|| eyre!("Unable to read folder: {:?}", args.input_folder))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|path| path.is_file() && is_report(path))
        .sorted()
        .collect_vec();

    info!("Found {} BLAST reports in: {:?}", paths.len(), args.input_folder);
    paths.iter().map(|path| recap_file(path)).collect()
}
