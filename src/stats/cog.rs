use crate::plot::chart::{self, BarChart, Series, PALETTE};
use crate::stats::hypothesis;
use crate::{utils, Table};
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Column names tried, in order, for the category of a count table.
pub const CATEGORY_COLUMNS: [&str; 9] =
    ["LETTER", "category", "cog", "COG", "cog_category", "name", "label", "Class", "class"];
/// Column names tried, in order, for the count of a count table.
pub const COUNT_COLUMNS: [&str; 7] = ["count", "COUNT", "n", "N", "freq", "frequency", "total"];
/// File names tried, in order, inside a classifier output directory.
pub const COUNT_FILES: [&str; 5] =
    ["cog_count.tsv", "cog_counts.tsv", "counts.tsv", "classification.tsv", "cog_classify.tsv"];
/// Columns of the output table.
pub const HEADERS: [&str; 11] = [
    "category",
    "count",
    "percent",
    "pct_ci_low",
    "pct_ci_high",
    "expected_pct",
    "enrichment_ratio",
    "log2_enrichment",
    "p_value",
    "q_value",
    "significant",
];

/// Arguments for the enrichment of functional (COG) categories.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Count table, or a classifier output directory holding one.
    #[clap(short = 'i', long, default_value = "cog_count.tsv")]
    pub input: PathBuf,

    /// Output base name of the figure and table (default: input file stem).
    #[clap(short = 'o', long)]
    pub outbase: Option<String>,

    /// False discovery rate threshold for significance.
    #[clap(long, default_value_t = 0.05)]
    pub alpha: f64,

    /// Output table (default: <outbase>_percent_significance.tsv).
    #[clap(long)]
    pub table: Option<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Args { input: PathBuf::from("cog_count.tsv"), outbase: None, alpha: 0.05, table: None }
    }
}

/// Statistics of one category with a non-zero count.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryStats {
    pub percent: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub expected: f64,
    pub enrichment: f64,
    pub log2_enrichment: f64,
    pub p_value: f64,
    pub q_value: f64,
    pub significant: bool,
}

/// One category of the count table.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub name: String,
    pub count: u64,
    /// Display color from the count table, if it has one.
    pub color: Option<String>,
    /// `None` when the count is zero.
    pub stats: Option<CategoryStats>,
}

fn is_numeric(table: &Table<String>, header: &str) -> bool {
    !table.rows.is_empty() && table.get_numeric_column(header).is_ok()
}

/// Find the category and count columns of a count table.
pub fn infer_columns(table: &Table<String>) -> Result<(String, String), Report> {
    let category = CATEGORY_COLUMNS
        .iter()
        .find(|c| table.has_header(c))
        .map(|c| c.to_string())
        .or_else(|| table.headers.iter().find(|h| !is_numeric(table, h)).cloned());
    let count = COUNT_COLUMNS
        .iter()
        .find(|c| table.has_header(c))
        .map(|c| c.to_string())
        .or_else(|| table.headers.iter().find(|h| is_numeric(table, h)).cloned());

    match (category, count) {
        (Some(category), Some(count)) => Ok((category, count)),
        _ => Err(eyre!("Could not infer category/count columns from: {:?}", table.headers)
            .suggestion(format!("Name the columns, ex. {} and {}", CATEGORY_COLUMNS[0], COUNT_COLUMNS[0]))),
    }
}

/// Accept a count table, or find one inside a classifier output directory.
pub fn resolve_input(input: &Path) -> Result<PathBuf, Report> {
    if input.is_file() {
        return Ok(input.to_path_buf());
    }
    if !input.is_dir() {
        return Err(eyre!("Input path not found: {input:?}"));
    }
    if let Some(path) = COUNT_FILES.iter().map(|name| input.join(name)).find(|p| p.exists()) {
        return Ok(path);
    }

    let candidates = std::fs::read_dir(input)
        .map_err(|e| eyre!("Unable to read directory {input:?}: {e}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "tsv").unwrap_or(false))
        .sorted();
    for path in candidates {
        match Table::read(&path) {
            Ok(table) if table.headers.len() >= 2 && table.headers.iter().any(|h| is_numeric(&table, h)) => {
                return Ok(path)
            }
            Ok(_) => debug!("No count columns: {path:?}"),
            Err(e) => debug!("Unreadable table {path:?}: {e}"),
        }
    }
    Err(eyre!("No suitable TSV found inside directory: {input:?}"))
}

/// Read the categories of a count table. Unparseable counts are zero.
pub fn read_categories(table: &Table<String>) -> Result<Vec<Category>, Report> {
    let (category_column, count_column) = infer_columns(table)?;
    debug!("Category column: {category_column}, count column: {count_column}");
    let names = table.get_column(&category_column)?;
    let counts = table.get_column(&count_column)?;
    let colors = table.get_column("COLOR").ok();

    let categories = names
        .into_iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (name, count))| {
            let count = count.trim().parse::<f64>().ok().filter(|c| c.is_finite() && *c > 0.0);
            Category {
                name: name.clone(),
                count: count.map(|c| c.trunc() as u64).unwrap_or(0),
                color: colors.as_ref().map(|c| c[i].trim().to_string()).filter(|c| c.starts_with('#')),
                stats: None,
            }
        })
        .collect();
    Ok(categories)
}

/// Percent, Wilson interval, enrichment over a uniform expectation, and a binomial test for
/// every category with a non-zero count.
pub fn enrichment(categories: &mut [Category], alpha: f64) -> Result<(), Report> {
    let total = categories.iter().map(|c| c.count).sum::<u64>();
    let non_zero = categories.iter().filter(|c| c.count > 0).count();
    if non_zero == 0 {
        return Ok(());
    }
    let expected = 1.0 / non_zero as f64;

    let p_values = categories
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| hypothesis::binomial_test(c.count, total, expected))
        .collect::<Result<Vec<_>, Report>>()?;
    let q_values = hypothesis::benjamini_hochberg(&p_values);

    let stats = categories.iter_mut().filter(|c| c.count > 0);
    for ((category, p_value), q_value) in stats.zip(p_values).zip(q_values) {
        let proportion = category.count as f64 / total as f64;
        let (low, high) = hypothesis::wilson_interval(category.count, total, 0.95);
        let enrichment = proportion / expected;
        category.stats = Some(CategoryStats {
            percent: proportion * 100.0,
            ci_low: low * 100.0,
            ci_high: high * 100.0,
            expected: expected * 100.0,
            enrichment,
            log2_enrichment: enrichment.log2(),
            p_value,
            q_value,
            significant: q_value <= alpha,
        });
    }
    Ok(())
}

fn format_number(x: f64) -> String {
    match x.is_finite() {
        true => utils::format_general(x, 3),
        false => String::new(),
    }
}

fn format_p_value(x: f64) -> String {
    match x {
        x if !x.is_finite() => String::new(),
        x if x < 1e-3 => "<0.001".to_string(),
        x => utils::format_general(x, 3),
    }
}

/// Output table of the categories, blank statistics for zero counts.
pub fn to_table(categories: &[Category]) -> Table<String> {
    let mut table = Table::new();
    table.headers = HEADERS.map(String::from).to_vec();
    table.rows = categories
        .iter()
        .map(|category| {
            let stats = match &category.stats {
                Some(s) => [s.percent, s.ci_low, s.ci_high, s.expected, s.enrichment, s.log2_enrichment]
                    .map(format_number)
                    .into_iter()
                    .chain([format_p_value(s.p_value), format_p_value(s.q_value)])
                    .chain([if s.significant { "True" } else { "False" }.to_string()])
                    .collect_vec(),
                None => vec![String::new(); HEADERS.len() - 2],
            };
            [category.name.clone(), category.count.to_string()].into_iter().chain(stats).collect()
        })
        .collect();
    table
}

/// Bar chart of category percents, most frequent first.
pub fn to_chart(categories: &[Category], title: &str) -> BarChart {
    let total = categories.iter().map(|c| c.count).sum::<u64>().max(1) as f64;
    let sorted = categories.iter().filter(|c| c.count > 0).sorted_by_key(|c| std::cmp::Reverse(c.count)).collect_vec();

    let mut series = Series::new("Percent", sorted.iter().map(|c| c.count as f64 / total * 100.0).collect());
    series.colors = sorted
        .iter()
        .enumerate()
        .map(|(i, c)| c.color.clone().unwrap_or_else(|| PALETTE[i % PALETTE.len()].to_string()))
        .collect();
    series.labels = sorted.iter().map(|c| format!("{:.1}%", c.count as f64 / total * 100.0)).collect();

    BarChart {
        title: title.to_string(),
        x_label: "COG category".to_string(),
        y_label: "Percentage of genes (%)".to_string(),
        categories: sorted.iter().map(|c| c.name.clone()).collect(),
        series: vec![series],
        show_values: true,
        ..Default::default()
    }
}

/// Enrichment of functional categories against a uniform expectation.
pub fn cog(args: &Args) -> Result<Vec<Category>, Report> {
    let input = resolve_input(&args.input)?;
    info!("Reading counts: {input:?}");
    let outbase = match &args.outbase {
        Some(outbase) => outbase.clone(),
        None => input.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| "cog".to_string()),
    };
    let table_path = args.table.clone().unwrap_or_else(|| PathBuf::from(format!("{outbase}_percent_significance.tsv")));

    let table = Table::read(&input)?;
    let mut categories = read_categories(&table)?;
    let input_name = input.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();

    // all zero: counts only, no figure
    if categories.iter().all(|c| c.count == 0) {
        to_table(&categories).write(&table_path)?;
        println!("[info] Zero COG hits in {input_name}; skipped plotting and wrote {}", table_path.display());
        return Ok(categories);
    }

    let figure = PathBuf::from(format!("{outbase}.svg"));
    chart::save(&to_chart(&categories, &format!("COG categories of {outbase}")).to_svg(), &figure)?;
    println!("Saved chart:\n - {}", figure.display());

    enrichment(&mut categories, args.alpha)?;
    // stable, keeps input order among equal counts
    categories.sort_by_key(|c| std::cmp::Reverse(c.count));
    to_table(&categories).write(&table_path)?;
    println!("Wrote stats table: {}", table_path.display());
    Ok(categories)
}
