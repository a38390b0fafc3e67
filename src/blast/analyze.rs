use crate::plot::chart;
use crate::{utils, Table};
use clap::Parser;
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use log::info;
use petgraph::graph::UnGraph;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Arguments for analyzing a combined BLAST table.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Species name, used as the prefix of every output (ex. equi, agal).
    #[clap(short = 's', long, required = true)]
    pub species: String,

    /// Combined BLAST table, as written by `blast combine`.
    #[clap(short = 'f', long, required = true)]
    pub file: PathBuf,

    /// Output directory.
    #[clap(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Args::new()
    }
}

impl Args {
    pub fn new() -> Self {
        Args { species: String::new(), file: PathBuf::new(), output_dir: PathBuf::from(".") }
    }
}

/// Presence (1) or absence (0) of a hit for every query in every database.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HitsMatrix {
    /// Row labels, sorted.
    pub queries: Vec<String>,
    /// Column labels, sorted.
    pub databases: Vec<String>,
    /// One row per query, one column per database.
    pub hits: Vec<Vec<u8>>,
}

impl HitsMatrix {
    /// Pivot a combined BLAST table (`Query`, `Database`, `Hits found`) into a matrix.
    ///
    /// A cell is 1 if any row of that query and database found more than zero hits.
    pub fn from_table(table: &Table<String>) -> Result<Self, Report> {
        let queries = table.get_column("Query")?;
        let databases = table.get_column("Database")?;
        let hits_found = table.get_column("Hits found")?;

        let mut cells: BTreeMap<(&str, &str), u8> = BTreeMap::new();
        let mut database_names = BTreeSet::new();
        for ((query, database), hits) in queries.iter().zip(databases.iter()).zip(hits_found) {
            // empty or malformed counts are treated as no hit
            let hit = hits.trim().parse::<f64>().map(|n| n > 0.0).unwrap_or(false);
            let cell = cells.entry((query.as_str(), database.as_str())).or_insert(0);
            *cell |= hit as u8;
            database_names.insert(database.as_str());
        }

        let queries = queries.iter().map(|q| q.as_str()).collect::<BTreeSet<_>>();
        let hits = queries
            .iter()
            .map(|query| {
                database_names
                    .iter()
                    .map(|database| cells.get(&(*query, *database)).copied().unwrap_or(0))
                    .collect_vec()
            })
            .collect_vec();

        Ok(HitsMatrix {
            queries: queries.into_iter().map(String::from).collect(),
            databases: database_names.into_iter().map(String::from).collect(),
            hits,
        })
    }

    /// Number of databases hit by each query.
    pub fn counts(&self) -> Vec<usize> {
        self.hits.iter().map(|row| row.iter().map(|v| *v as usize).sum()).collect()
    }

    /// Number of queries hitting exactly `k` databases, for every `k` in `0..=databases`.
    pub fn distribution(&self) -> Vec<usize> {
        let mut distribution = vec![0; self.databases.len() + 1];
        self.counts().into_iter().for_each(|k| distribution[k] += 1);
        distribution
    }

    /// Queries grouped by the number of databases they hit, for observed counts only.
    ///
    /// A count no query reaches has no entry, so [`analyze`] writes no query list for it.
    pub fn queries_by_count(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        self.queries
            .iter()
            .zip(self.counts())
            .for_each(|(query, k)| groups.entry(k).or_default().push(query.as_str()));
        groups
    }

    /// Undirected graph of databases, weighted by the number of queries hitting both.
    ///
    /// Pairs without shared queries have no edge.
    pub fn shared_graph(&self) -> UnGraph<String, usize> {
        let mut graph = UnGraph::new_undirected();
        let nodes = self.databases.iter().map(|db| graph.add_node(db.clone())).collect_vec();

        for (i, j) in (0..self.databases.len()).tuple_combinations() {
            let shared = self.hits.iter().filter(|row| row[i] == 1 && row[j] == 1).count();
            if shared > 0 {
                graph.add_edge(nodes[i], nodes[j], shared);
            }
        }
        graph
    }

    /// Convert to a table with a `Query` column followed by one column per database.
    pub fn to_table(&self) -> Table<String> {
        let mut table = Table::new();
        table.headers = std::iter::once("Query".to_string()).chain(self.databases.clone()).collect();
        table.rows = self
            .queries
            .iter()
            .zip(&self.hits)
            .map(|(query, row)| {
                std::iter::once(query.clone()).chain(row.iter().map(|v| v.to_string())).collect()
            })
            .collect();
        table
    }
}

/// Count how many databases each query hits, and draw the shared hits between databases.
pub fn analyze(args: &Args) -> Result<HitsMatrix, Report> {
    let species = &args.species;
    let table = Table::read(&args.file)?;
    let matrix = HitsMatrix::from_table(&table)?;
    println!("Comparing against {} databases.", matrix.databases.len());

    // distribution of the number of databases hit
    let mut distribution = Table::new();
    distribution.headers = vec!["Databases".to_string(), "Hits found".to_string()];
    distribution.rows = matrix
        .distribution()
        .iter()
        .enumerate()
        .map(|(k, n)| vec![k.to_string(), n.to_string()])
        .collect();
    println!("{}", distribution.to_tabled());

    for (k, queries) in matrix.queries_by_count() {
        let path = args.output_dir.join(format!("{species}_queries_with_{k}_databases_hits.txt"));
        info!("Writing {} queries to: {path:?}", queries.len());
        utils::write_lines(&path, queries)?;
    }

    let path = args.output_dir.join(format!("{species}_hits_matrix.tsv"));
    matrix.to_table().write(&path)?;
    println!("Matrix saved to {}", path.display());

    let path = args.output_dir.join(format!("{species}_shared_essential_core_networkgraph.svg"));
    let document = chart::network(
        "Network Graph of Shared Queries Between Databases",
        "Number of Shared Queries",
        &matrix.shared_graph(),
    );
    chart::save(&document, &path)?;
    println!("Wrote {} to disk...", path.display());

    let path = args.output_dir.join(format!("{species}_shared_essential_core_heatmap.svg"));
    let values =
        matrix.hits.iter().map(|row| row.iter().map(|v| *v as f64).collect_vec()).collect_vec();
    let heatmap = chart::Heatmap {
        title: "Heatmap of Query Hits Across Databases".to_string(),
        x_label: "Database".to_string(),
        y_label: "Query".to_string(),
        legend: "Hit Present (1) or Absent (0)".to_string(),
        columns: matrix.databases.clone(),
        rows: matrix.queries.clone(),
        values,
    };
    chart::save(&heatmap.to_svg(), &path)?;
    println!("Wrote {} to disk...", path.display());

    Ok(matrix)
}
