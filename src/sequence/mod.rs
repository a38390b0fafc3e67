//! Read, filter, and write fasta records.

pub mod alleles;
pub mod fetch;
pub mod translate;


use crate::utils;
use color_eyre::eyre::{Report, Result, WrapErr};
use indicatif::{style::ProgressStyle, ProgressBar};
use noodles::fasta;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufRead, BufWriter};
use std::path::Path;

/// Returns a [`Reader`](fasta::Reader) over the records of a fasta file and the number of records.
///
/// The file may be zstd compressed (`.zst`). It is read twice: once to count the records
/// (optionally with a progress bar) and once more for the returned reader.
///
/// ```rust
/// use strepcore::sequence;
/// use std::io::Write;
///
/// let mut file = tempfile::Builder::new().suffix(".fasta").tempfile()?;
/// writeln!(file, ">seq1 first\nACGT\n>seq2\nTTGA")?;
///
/// let (mut reader, count) = sequence::get_reader(file.path(), false)?;
/// assert_eq!(count, 2);
///
/// let ids = reader.records().map(|r| Ok(r?.name().to_string())).collect::<Result<Vec<_>, std::io::Error>>()?;
/// assert_eq!(ids, ["seq1", "seq2"]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_reader<P>(
    path: &P,
    progress: bool,
) -> Result<(fasta::Reader<Box<dyn BufRead>>, usize), Report>
where
    P: AsRef<Path> + Debug + ?Sized,
{
    let path = path.as_ref();

    // create a progress bar, will only be displayed/updated if progress=true
    let progress_bar_style = ProgressStyle::with_template(
        "{bar:40} {pos}/{len} ({percent}%) | Sequences / Second: {per_sec} | Elapsed: {elapsed_precise}",
    )
    .wrap_err("Failed to create progress bar from template.")?;
    let progress_bar = ProgressBar::new(0_u64);
    progress_bar.set_style(progress_bar_style);

    let f_update = |progress_bar: &ProgressBar| {
        if progress {
            progress_bar.inc_length(1);
            progress_bar.inc(1);
        }
    };

    let mut reader = fasta::Reader::new(utils::open_reader(&path)?);
    let num_records = reader.records().inspect(|_| f_update(&progress_bar)).count();
    progress_bar.finish_and_clear();

    Ok((fasta::Reader::new(utils::open_reader(&path)?), num_records))
}

/// Read every record of a fasta file into memory.
pub fn read_records<P>(path: &P, progress: bool) -> Result<Vec<fasta::Record>, Report>
where
    P: AsRef<Path> + Debug + ?Sized,
{
    let (mut reader, count) = get_reader(path, progress)?;
    let records = reader
        .records()
        .enumerate()
        .map(|(i, record)| {
            record.wrap_err_with(|| format!("Failed to parse fasta record {} of {count}: {path:?}", i + 1))
        })
        .collect::<Result<Vec<_>, Report>>()?;
    Ok(records)
}

/// Write fasta records to a file, creating its parent directory.
pub fn write_records<'r, P, I>(path: &P, records: I) -> Result<usize, Report>
where
    P: AsRef<Path> + Debug + ?Sized,
    I: IntoIterator<Item = &'r fasta::Record>,
{
    let path = path.as_ref();
    utils::create_parent_dir(&path)?;
    let file = File::create(path).wrap_err_with(|| format!("Unable to create file: {path:?}"))?;
    let mut writer = fasta::Writer::new(BufWriter::new(file));

    let mut count = 0;
    for record in records {
        writer
            .write_record(record)
            .wrap_err_with(|| format!("Unable to write fasta record {}: {path:?}", record.name()))?;
        count += 1;
    }
    Ok(count)
}

/// The full header line of a record, without the leading `>`.
///
/// ```rust
/// use noodles::fasta;
/// use strepcore::sequence::header;
///
/// let definition = fasta::record::Definition::new("seq1", Some("dnaA chromosomal".to_string()));
/// let record = fasta::Record::new(definition, fasta::record::Sequence::default());
/// assert_eq!(header(&record), "seq1 dnaA chromosomal");
/// ```
pub fn header(record: &fasta::Record) -> String {
    match record.description() {
        Some(description) => format!("{} {description}", record.name()),
        None => record.name().to_string(),
    }
}

/// Create a new fasta record.
pub fn new_record(name: &str, description: Option<&str>, sequence: Vec<u8>) -> fasta::Record {
    let definition = fasta::record::Definition::new(name, description.map(String::from));
    let sequence = fasta::record::Sequence::from(sequence);
    fasta::Record::new(definition, sequence)
}
