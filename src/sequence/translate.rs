use crate::sequence;
use clap::Parser;
use color_eyre::eyre::{Report, Result};
use log::{info, warn};
use noodles::fasta;
use std::path::PathBuf;

/// Amino acids of the standard genetic code (NCBI table 1), codons ordered by `TCAG`.
const STANDARD_CODE: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
/// Description of every translated record.
pub const DESCRIPTION: &str = "translated protein";

/// Arguments for translating nucleotide records.
#[derive(Clone, Debug, Default, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Nucleotide (multi)fasta.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Output protein fasta.
    #[clap(short = 'o', long, required = true)]
    pub output: PathBuf,
}

/// IUPAC nucleotide code as a bitmask over `TCAG`, empty for anything else.
fn iupac_mask(base: u8) -> u8 {
    const T: u8 = 1;
    const C: u8 = 2;
    const A: u8 = 4;
    const G: u8 = 8;
    match base.to_ascii_uppercase() {
        b'T' | b'U' => T,
        b'C' => C,
        b'A' => A,
        b'G' => G,
        b'W' => A | T,
        b'S' => C | G,
        b'M' => A | C,
        b'K' => G | T,
        b'R' => A | G,
        b'Y' => C | T,
        b'B' => C | G | T,
        b'D' => A | G | T,
        b'H' => A | C | T,
        b'V' => A | C | G,
        b'N' => A | C | G | T,
        _ => 0,
    }
}

/// Indices into the `TCAG` ordered code of every base a mask stands for.
fn expand(mask: u8) -> impl Iterator<Item = usize> {
    (0..4).filter(move |i| mask & (1 << i) != 0)
}

/// Translate one codon, `None` for stop codons.
///
/// Ambiguous codons translate when all their expansions agree, to the amino acid
/// or to a stop. Expansions split between two amino acids give `B` (D/N), `Z` (E/Q)
/// or `J` (I/L), anything else gives `X`.
///
/// ```rust
/// use strepcore::sequence::translate::translate_codon;
/// assert_eq!(translate_codon(b"ATG"), Some(b'M'));
/// assert_eq!(translate_codon(b"tgg"), Some(b'W'));
/// assert_eq!(translate_codon(b"TAA"), None);
/// assert_eq!(translate_codon(b"GCN"), Some(b'A'));
/// assert_eq!(translate_codon(b"TAR"), None);
/// assert_eq!(translate_codon(b"RAY"), Some(b'B'));
/// assert_eq!(translate_codon(b"NNN"), Some(b'X'));
/// assert_eq!(translate_codon(b"A-G"), Some(b'X'));
/// ```
pub fn translate_codon(codon: &[u8]) -> Option<u8> {
    let [first, second, third] = codon else { return Some(b'X') };
    let masks = [iupac_mask(*first), iupac_mask(*second), iupac_mask(*third)];
    if masks.contains(&0) {
        return Some(b'X');
    }

    let mut residues = Vec::new();
    for a in expand(masks[0]) {
        for b in expand(masks[1]) {
            for c in expand(masks[2]) {
                let residue = STANDARD_CODE[a * 16 + b * 4 + c];
                if !residues.contains(&residue) {
                    residues.push(residue);
                }
            }
        }
    }
    residues.sort_unstable();

    match residues.as_slice() {
        [b'*'] => None,
        [residue] => Some(*residue),
        [b'D', b'N'] => Some(b'B'),
        [b'E', b'Q'] => Some(b'Z'),
        [b'I', b'L'] => Some(b'J'),
        _ => Some(b'X'),
    }
}

/// Translate a nucleotide sequence up to its first stop codon.
///
/// A trailing partial codon is ignored.
///
/// ```rust
/// use strepcore::sequence::translate::translate_sequence;
/// assert_eq!(translate_sequence(b"ATGGCCTAAGGG"), b"MA");
/// assert_eq!(translate_sequence(b"ATGGCCGG"), b"MA");
/// ```
pub fn translate_sequence(sequence: &[u8]) -> Vec<u8> {
    sequence.chunks_exact(3).map_while(translate_codon).collect()
}

/// Translate a record, keeping its id.
pub fn translate_record(record: &fasta::Record) -> fasta::Record {
    let protein = translate_sequence(record.sequence().as_ref());
    sequence::new_record(record.name(), Some(DESCRIPTION), protein)
}

/// Translate every record of a nucleotide fasta to protein.
pub fn translate(args: &Args) -> Result<Vec<fasta::Record>, Report> {
    info!("Reading nucleotide records: {:?}", args.input);
    let records = sequence::read_records(&args.input, false)?;
    let proteins = records.iter().map(translate_record).collect::<Vec<_>>();

    let partial = records.iter().filter(|r| r.sequence().len() % 3 != 0).count();
    if partial > 0 {
        warn!("{partial} record(s) have a length that is not a multiple of three.");
    }

    sequence::write_records(&args.output, &proteins)?;
    println!("Protein sequences have been written to {}", args.output.display());
    Ok(proteins)
}
