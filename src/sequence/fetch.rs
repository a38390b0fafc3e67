use crate::sequence;
use crate::utils;
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info};
use noodles::fasta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use strum::EnumIter;

/// How keys are compared to fasta headers.
#[derive(Clone, Copy, Debug, Default, Deserialize, EnumIter, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// The record id equals a key.
    #[default]
    Exact,
    /// A key is a substring of the full header line.
    Partial,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}

/// Arguments for extracting fasta records by a list of keys.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// The multifasta to search (optionally .zst).
    #[clap(short = 'f', long, required = true)]
    pub fasta: PathBuf,

    /// File of header strings to search for, one per line.
    #[clap(short = 'k', long, conflicts_with = "string")]
    pub keyfile: Option<PathBuf>,

    /// Comma separated header strings to search for, instead of a key file.
    #[clap(short = 's', long, value_delimiter = ',')]
    pub string: Vec<String>,

    /// Output fasta of the retrieved records.
    #[clap(short = 'o', long, required = true)]
    pub outfile: PathBuf,

    /// Output file for the keys that were not found.
    #[clap(long, default_value = "keys_not_found.txt")]
    pub keys_not_found: PathBuf,

    /// Retrieve all records NOT matching the keys.
    #[clap(short = 'i', long)]
    pub invert: bool,

    /// Compare keys to headers as exact id matches, or as substrings of the header.
    #[clap(short = 'm', long, value_enum, default_value_t = Method::default())]
    pub method: Method,

    /// Print the keys and the retrieved records.
    #[clap(long)]
    pub verbose: bool,
}

impl Default for Args {
    fn default() -> Self {
        Args {
            fasta: PathBuf::new(),
            keyfile: None,
            string: Vec::new(),
            outfile: PathBuf::new(),
            keys_not_found: PathBuf::from("keys_not_found.txt"),
            invert: false,
            method: Method::default(),
            verbose: false,
        }
    }
}

/// Records retrieved by [`fetch`] and the keys they account for.
#[derive(Clone, Debug, Default)]
pub struct Fetched {
    pub records: Vec<fasta::Record>,
    pub found: BTreeSet<String>,
    pub not_found: BTreeSet<String>,
}

/// Read the keys from the key file (one per line, leading `>` removed) or the key string.
pub fn get_keys(args: &Args) -> Result<Vec<String>, Report> {
    match &args.keyfile {
        Some(path) => {
            let keys = utils::read_lines(path)?
                .into_iter()
                .map(|line| line.trim_end_matches('\r').trim_start_matches('>').to_string())
                .collect();
            Ok(keys)
        }
        None if !args.string.is_empty() => Ok(args.string.clone()),
        None => Err(eyre!("No key source provided.")
            .suggestion("Provide a key file with --keyfile, or keys with --string.")),
    }
}

/// Keep the records matching (or with `invert`, not matching) the keys.
pub fn filter(
    records: Vec<fasta::Record>,
    keys: &[String],
    method: Method,
    invert: bool,
) -> Fetched {
    let key_set: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
    let mut fetched = Fetched::default();

    for record in records {
        let header = sequence::header(&record);
        let matched = match method {
            Method::Exact => key_set.contains(record.name()),
            Method::Partial => key_set.iter().any(|key| header.contains(key)),
        };
        if matched == invert {
            continue;
        }
        match method {
            Method::Exact => {
                fetched.found.insert(record.name().to_string());
            }
            Method::Partial => {
                let contained = key_set.iter().filter(|key| header.contains(**key));
                fetched.found.extend(contained.map(|key| key.to_string()));
            }
        }
        fetched.records.push(record);
    }

    // found may hold ids that are not keys when inverted
    fetched.not_found = key_set
        .into_iter()
        .filter(|key| !fetched.found.contains(*key))
        .map(String::from)
        .collect();
    fetched
}

/// Extract fasta records by a list of keys.
pub fn fetch(args: &Args) -> Result<Fetched, Report> {
    let keys = get_keys(args)?;

    if args.verbose {
        match args.invert {
            false => eprintln!("Fetching the following keys:"),
            true => eprintln!(
                "Ignoring the following keys, and retrieving everything else from: {}",
                args.fasta.display()
            ),
        }
        keys.iter().for_each(|key| eprintln!("{key}"));
        eprintln!("{}", "-".repeat(80));
    }

    info!("Reading fasta: {:?}", args.fasta);
    let records = sequence::read_records(&args.fasta, args.verbose)?;
    debug!("Searching {} records for {} keys.", records.len(), keys.len());
    let fetched = filter(records, &keys, args.method, args.invert);

    if args.verbose {
        fetched.records.iter().for_each(|record| {
            let sequence = String::from_utf8_lossy(record.sequence().as_ref()).to_string();
            println!(">{}\n{sequence}\n", sequence::header(record));
        });
    }

    println!("Number of matches found: {}", fetched.found.len());
    println!("Number of keys not found: {}", fetched.not_found.len());

    sequence::write_records(&args.outfile, &fetched.records)?;

    if fetched.not_found.len() > 1 {
        println!(
            "Found multiple keys not found in search, writing findings to {}...",
            args.keys_not_found.display()
        );
        utils::write_lines(&args.keys_not_found, &fetched.not_found)?;
    }
    debug!("Keys not found: {}", fetched.not_found.iter().join(", "));

    Ok(fetched)
}
