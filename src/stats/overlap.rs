//! Overlap of a gene set (ex. zoonotic or piscine genes) with the pangenome categories.

use crate::plot::chart::{self, BarChart, BarMode, Series, PALETTE};
use crate::stats::hypothesis::{self, ChiSquare, Fisher};
use crate::{utils, Table};
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, Report, Result};
use itertools::Itertools;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::EnumIter;

/// Color of the part of a bar that is not highlighted.
pub const GREY: &str = "#7F7F7F";

/// Colors of the pangenome categories.
pub const CATEGORY_COLORS: [(&str, &str); 4] = [
    ("Strict core", "#532C6B"),
    ("Collapsed core", "#377EB8"),
    ("Shell", "#2CA25F"),
    ("Cloud", "#F2CC45"),
];

/// Which part of every bar gets the category color.
#[derive(Clone, Copy, Debug, Default, Deserialize, EnumIter, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    #[default]
    Matched,
    Unmatched,
}

impl std::fmt::Display for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            Highlight::Matched => "Matched",
            Highlight::Unmatched => "Unmatched",
        };
        write!(f, "{label}")
    }
}

/// Arguments for the overlap of a gene set with the pangenome categories.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Table with the columns: category, total, matched.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Output base name of the figure and tables.
    #[clap(short = 'o', long, default_value = "overlap")]
    pub outbase: String,

    /// Figure title.
    #[clap(long, default_value = "Overlap with pangenome categories")]
    pub title: String,

    /// Part of every bar drawn in the category color, the rest is grey.
    #[clap(long, value_enum, default_value_t = Highlight::default())]
    pub highlight: Highlight,

    /// Draw gene counts instead of percentages.
    #[clap(long)]
    pub absolute: bool,
}

impl Default for Args {
    fn default() -> Self {
        Args {
            input: PathBuf::new(),
            outbase: "overlap".to_string(),
            title: "Overlap with pangenome categories".to_string(),
            highlight: Highlight::default(),
            absolute: false,
        }
    }
}

/// Matched and unmatched genes of one category.
#[derive(Clone, Debug, PartialEq)]
pub struct Counts {
    pub category: String,
    pub total: u64,
    pub matched: u64,
    pub unmatched: u64,
    pub matched_pct: f64,
    pub unmatched_pct: f64,
}

impl Counts {
    /// Matched genes are capped at the category total.
    ///
    /// ```rust
    /// use strepcore::stats::overlap::Counts;
    /// let counts = Counts::new("Shell", 50, 60);
    /// assert_eq!((counts.matched, counts.unmatched, counts.matched_pct), (50, 0, 100.0));
    /// let empty = Counts::new("Collapsed core", 0, 0);
    /// assert_eq!((empty.matched_pct, empty.unmatched_pct), (0.0, 0.0));
    /// ```
    pub fn new(category: &str, total: u64, matched: u64) -> Self {
        let matched = matched.min(total);
        let unmatched = total - matched;
        let percent = |n: u64| if total > 0 { n as f64 / total as f64 * 100.0 } else { 0.0 };
        Counts {
            category: category.to_string(),
            total,
            matched,
            unmatched,
            matched_pct: percent(matched),
            unmatched_pct: percent(unmatched),
        }
    }
}

/// Fisher test between two categories.
#[derive(Clone, Debug, PartialEq)]
pub struct Pairwise {
    pub a: usize,
    pub b: usize,
    pub fisher: Fisher,
    pub q_value: f64,
}

/// Results of [`overlap`].
#[derive(Clone, Debug, PartialEq)]
pub struct Overlap {
    pub counts: Vec<Counts>,
    /// `None` when a category has no genes.
    pub chi_square: Option<ChiSquare>,
    pub pairwise: Vec<Pairwise>,
}

/// Read the category counts.
///
/// Rows with a missing, negative, or fractional count are skipped.
pub fn read_counts(table: &Table<String>) -> Result<Vec<Counts>, Report> {
    let categories = table.get_column("category")?;
    let total = table.get_column("total")?;
    let matched = table.get_column("matched")?;

    let to_count = |value: &str| {
        value.trim().parse::<f64>().ok().filter(|v| *v >= 0.0 && v.fract() == 0.0).map(|v| v as u64)
    };
    let counts = categories
        .iter()
        .enumerate()
        .filter_map(|(i, category)| match (to_count(total[i].as_str()), to_count(matched[i].as_str())) {
            (Some(total), Some(matched)) => Some(Counts::new(category, total, matched)),
            _ => {
                warn!("Skipping {category}, counts are not counts: {:?}, {:?}", total[i], matched[i]);
                None
            }
        })
        .collect();
    Ok(counts)
}

/// Color of a category, from the pangenome colors or the palette.
pub fn category_color(category: &str, i: usize) -> String {
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, color)| color.to_string())
        .unwrap_or_else(|| PALETTE[i % PALETTE.len()].to_string())
}

/// Fisher tests of every pair of categories, with Benjamini-Hochberg q-values.
pub fn pairwise(counts: &[Counts]) -> Vec<Pairwise> {
    let mut results = (0..counts.len())
        .tuple_combinations()
        .map(|(a, b)| {
            let table = [[counts[a].matched, counts[a].unmatched], [counts[b].matched, counts[b].unmatched]];
            Pairwise { a, b, fisher: hypothesis::fisher_exact(table), q_value: f64::NAN }
        })
        .collect_vec();
    let q_values = hypothesis::benjamini_hochberg(&results.iter().map(|r| r.fisher.p_value).collect_vec());
    results.iter_mut().zip(q_values).for_each(|(r, q)| r.q_value = q);
    results
}

/// Stacked bar chart of matched and unmatched genes per category.
pub fn to_chart(counts: &[Counts], args: &Args) -> BarChart {
    let colors = counts.iter().enumerate().map(|(i, c)| category_color(&c.category, i)).collect_vec();
    let grey = vec![GREY.to_string(); counts.len()];
    let value = |n: u64, pct: f64| if args.absolute { n as f64 } else { pct };
    let label = |n: u64, pct: f64| format!("{n} ({pct:.1}%)");

    let mut matched = Series::new("Matched", counts.iter().map(|c| value(c.matched, c.matched_pct)).collect());
    matched.labels = counts.iter().map(|c| label(c.matched, c.matched_pct)).collect();
    let mut unmatched =
        Series::new("Unmatched", counts.iter().map(|c| value(c.unmatched, c.unmatched_pct)).collect());
    unmatched.labels = counts.iter().map(|c| label(c.unmatched, c.unmatched_pct)).collect();

    let other = match args.highlight {
        Highlight::Matched => {
            matched.colors = colors.clone();
            unmatched.colors = grey;
            Highlight::Unmatched
        }
        Highlight::Unmatched => {
            unmatched.colors = colors.clone();
            matched.colors = grey;
            Highlight::Matched
        }
    };
    let mut entries = counts
        .iter()
        .zip(&colors)
        .map(|(c, color)| (format!("{} - {}", args.highlight, c.category), color.clone()))
        .collect_vec();
    entries.push((other.to_string(), GREY.to_string()));

    BarChart {
        title: args.title.clone(),
        x_label: "Pangenome category".to_string(),
        y_label: if args.absolute { "Number of genes" } else { "Percentage of genes (%)" }.to_string(),
        categories: counts.iter().map(|c| c.category.clone()).collect(),
        series: vec![matched, unmatched],
        mode: BarMode::Stacked,
        y_max: (!args.absolute).then_some(100.0),
        show_totals: true,
        total_labels: counts.iter().map(|c| format!("Total: {}", c.total)).collect(),
        show_values: true,
        legend: entries,
        ..Default::default()
    }
}

fn counts_table(counts: &[Counts]) -> Table<String> {
    let mut table = Table::new();
    table.headers = ["category", "total", "matched", "unmatched", "matched_pct", "unmatched_pct"]
        .map(String::from)
        .to_vec();
    table.rows = counts
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                c.total.to_string(),
                c.matched.to_string(),
                c.unmatched.to_string(),
                c.matched_pct.to_string(),
                c.unmatched_pct.to_string(),
            ]
        })
        .collect();
    table
}

fn pairwise_table(counts: &[Counts], pairwise: &[Pairwise]) -> Table<String> {
    let mut table = Table::new();
    table.headers = [
        "cat_A",
        "cat_B",
        "matched_A",
        "unmatched_A",
        "matched_B",
        "unmatched_B",
        "odds_ratio",
        "p_value",
        "p_adj_fdr",
        "reject_fdr_0.05",
    ]
    .map(String::from)
    .to_vec();
    table.rows = pairwise
        .iter()
        .map(|p| {
            let (a, b) = (&counts[p.a], &counts[p.b]);
            vec![
                a.category.clone(),
                b.category.clone(),
                a.matched.to_string(),
                a.unmatched.to_string(),
                b.matched.to_string(),
                b.unmatched.to_string(),
                p.fisher.odds_ratio.to_string(),
                p.fisher.p_value.to_string(),
                p.q_value.to_string(),
                if p.q_value <= 0.05 { "True" } else { "False" }.to_string(),
            ]
        })
        .collect();
    table
}

/// Counts, figure, global chi-square test, and pairwise Fisher tests of a gene set against
/// the pangenome categories.
pub fn overlap(args: &Args) -> Result<Overlap, Report> {
    let table = Table::read(&args.input)?;
    let counts = read_counts(&table)?;
    if counts.is_empty() {
        return Err(eyre!("No categories found in: {:?}", args.input));
    }

    let counts_path = PathBuf::from(format!("{}_counts_and_pcts.csv", args.outbase));
    counts_table(&counts).write(&counts_path)?;

    let figure = PathBuf::from(format!("{}_stacked.svg", args.outbase));
    chart::save(&to_chart(&counts, args).to_svg(), &figure)?;
    info!("Wrote: {figure:?}");

    let observed = counts.iter().map(|c| vec![c.matched as f64, c.unmatched as f64]).collect_vec();
    let chi_square = match hypothesis::chi2_contingency(&observed) {
        Ok(result) => {
            println!(
                "Global chi-square: x² = {:.2}, df = {}, p = {}",
                result.statistic,
                result.dof,
                utils::format_scientific(result.p_value, 3)
            );
            Some(result)
        }
        Err(e) => {
            warn!("Skipping the global chi-square test: {e}");
            None
        }
    };

    let pairwise = pairwise(&counts);
    let pairwise_path = PathBuf::from(format!("{}_pairwise_fishers.csv", args.outbase));
    pairwise_table(&counts, &pairwise).write(&pairwise_path)?;

    println!("Saved:\n - {}\n - {}\n - {}", counts_path.display(), figure.display(), pairwise_path.display());
    Ok(Overlap { counts, chi_square, pairwise })
}
