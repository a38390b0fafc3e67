//! `strepcore` bundles the analysis steps behind a study of core and essential genes in
//! _Streptococcus_ species.
//!
//! Every subcommand is a small, independent pipeline over local files: read input, transform,
//! write sibling outputs, and print a summary. Later steps consume the files written by earlier
//! ones, but nothing in the code chains them together.
//!
//! | Group    | Purpose |
//! |----------|---------|
//! | `blast`  | Convert tabular BLAST reports to tables, combine them, and summarize hits. |
//! | `tags`   | Cross-reference pangenome locus tags with reference genome locus tags. |
//! | `fasta`  | Extract records by key, pick representative alleles, translate to protein. |
//! | `matrix` | Merge species presence tables, keep the core, and count set intersections. |
//! | `stats`  | Normality, chi-square, Fisher's exact, and enrichment tests. |
//! | `plot`   | Bar charts and Venn diagrams of the results. |

pub mod blast;
pub mod cli;
pub mod collect;
pub mod matrix;
pub mod plot;
pub mod sequence;
pub mod stats;
pub mod table;
pub mod tags;
pub mod utils;

#[doc(inline)]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::cli::Verbosity;
#[doc(inline)]
pub use crate::table::Table;
