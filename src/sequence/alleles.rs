use crate::sequence;
use crate::utils;
use clap::Parser;
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use log::{debug, info};
use noodles::fasta;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Arguments for picking representative alleles.
#[derive(Clone, Debug, Default, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Locus tags to pick, one per line.
    #[clap(short = 'k', long, required = true)]
    pub keyfile: PathBuf,

    /// Pangenome allele fasta, with headers like `>group:locus_tag_1 ...`.
    #[clap(short = 'f', long, required = true)]
    pub fasta: PathBuf,

    /// Output fasta.
    #[clap(short = 'o', long, required = true)]
    pub output: PathBuf,
}

/// Representative alleles and the keys that found one.
#[derive(Clone, Debug, Default)]
pub struct Alleles {
    pub records: Vec<fasta::Record>,
    pub keys_with_matches: BTreeSet<String>,
    pub keys_without_matches: usize,
}

/// The locus tag of an allele header: the text after the first `:`, up to whitespace.
///
/// ```rust
/// use strepcore::sequence::alleles::locus_tag;
/// assert_eq!(locus_tag("group_12:SSU_RS00005_1 len=900"), Some("SSU_RS00005_1"));
/// assert_eq!(locus_tag("SSU_RS00005"), None);
/// ```
pub fn locus_tag(header: &str) -> Option<&str> {
    let (_, rest) = header.split_once(':')?;
    rest.split(':').next()?.split_whitespace().next()
}

/// Pick one allele per key among the records whose locus tag starts with the key.
///
/// The first allele (`_1` at the end of the locus tag) wins, then the shortest header.
/// Ties keep fasta order.
pub fn pick(records: &[fasta::Record], keys: &[String]) -> Result<Alleles, Report> {
    let first_allele = Regex::new(r"_1(\s|$)")?;
    let headers = records
        .iter()
        .filter_map(|record| {
            let header = sequence::header(record);
            // malformed headers have no locus tag
            let tag = locus_tag(&header)?.to_string();
            Some((header, tag, record))
        })
        .collect_vec();

    let mut alleles = Alleles::default();
    let mut picked: Vec<String> = Vec::new();

    for key in keys {
        let best = headers
            .iter()
            .filter(|(_, tag, _)| tag.starts_with(key.as_str()))
            .min_by_key(|(header, _, _)| (!first_allele.is_match(header), header.len()));
        let Some((header, _, record)) = best else {
            alleles.keys_without_matches += 1;
            continue;
        };
        alleles.keys_with_matches.insert(key.clone());
        // keys sharing a best allele write it once
        if !picked.contains(header) {
            picked.push(header.clone());
            alleles.records.push((*record).clone());
        }
    }

    Ok(alleles)
}

/// Write the representative allele of every key.
pub fn alleles(args: &Args) -> Result<Alleles, Report> {
    let keys = utils::read_lines(&args.keyfile)?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect_vec();
    info!("Reading alleles: {:?}", args.fasta);
    let records = sequence::read_records(&args.fasta, false)?;
    debug!("Searching {} alleles for {} keys.", records.len(), keys.len());

    let alleles = pick(&records, &keys)?;
    sequence::write_records(&args.output, &alleles.records)?;

    println!(
        "Filtered FASTA saved to {} with {} sequences.",
        args.output.display(),
        alleles.records.len()
    );
    println!("Keys with matches: {}", alleles.keys_with_matches.len());
    println!("Keys without matches: {}", alleles.keys_without_matches);
    Ok(alleles)
}
