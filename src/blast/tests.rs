use crate::blast::{self, analyze, combine, recap, HEADERS};
use crate::Table;
use color_eyre::eyre::{Report, Result};

const REPORT: &str = "\
# BLASTP 2.15.0+
# Query: lcl|NC_012925.1_prot_1 [gene=dnaA] [locus_tag=SSUSC84_RS00005]
# Database: suiscoredb
# Fields: query id, subject id, alignment length, query length, subject length, q. start, q. end, s. start, s. end, evalue
# 2 hits found
lcl|NC_012925.1_prot_1\tSuis_P17_00001\t452\t452\t452\t1\t452\t1\t452\t0.0
lcl|NC_012925.1_prot_1\tSuis_P17_01234\t60\t452\t300\t10\t70\t5\t65\t1e-05
# BLASTP 2.15.0+
# Query: lcl|NC_012925.1_prot_2 [locus_tag=SSUSC84_RS00010]
# Database: suiscoredb
# 0 hits found
# BLAST processed 2 queries
";

#[test]
fn parse_report() -> Result<(), Report> {
    let hits = blast::parse_report(REPORT);
    assert_eq!(hits.len(), 3);

    assert_eq!(hits[0].query, "lcl|NC_012925.1_prot_1");
    assert_eq!(hits[0].database, "suiscoredb");
    assert_eq!(hits[0].hits_found, 1);
    assert_eq!(hits[0].fields[1], "Suis_P17_00001");
    assert_eq!(hits[1].fields[9], "1e-05");

    assert_eq!(hits[2], blast::BlastHit::zero_hit("lcl|NC_012925.1_prot_2", "suiscoredb"));

    let table = blast::to_table(&hits);
    assert_eq!(table.headers, HEADERS);
    assert_eq!(table.get("subject length", 1)?, "300");
    assert_eq!(table.get("evalue", 2)?, "");
    Ok(())
}

#[test]
fn parse_report_skips_orphan_hits() {
    let text = "tA\tsB\t10\n# Query: geneA\n# Database: db1\ngeneA\tsubj\t5\n";
    let hits = blast::parse_report(text);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].query, "geneA");
    // short lines leave the remaining fields empty
    assert_eq!(hits[0].fields[2], "5");
    assert_eq!(hits[0].fields[3], "");
}

#[test]
fn tabulate() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("equi_essential_vs_suiscoredb.txt");
    std::fs::write(&input, REPORT)?;

    let args = blast::TabulateArgs { file: vec![input.clone()] };
    let outputs = blast::tabulate(&args)?;
    assert_eq!(outputs, [dir.path().join("equi_essential_vs_suiscoredb.tsv")]);

    let table = Table::read(&outputs[0])?;
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.get("Hits found", 2)?, "0");
    Ok(())
}

#[test]
fn combine() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let databases = vec!["suiscoredb".to_string(), "agalcoredb".to_string()];

    for database in &databases {
        let path = dir.path().join(format!("equi_essential_vs_{database}.tsv"));
        let mut table = blast::to_table(&blast::parse_report(REPORT));
        // a stale database name must be replaced by the one in the file name
        (0..table.rows.len()).try_for_each(|i| table.set("Database", i, "stale".to_string()))?;
        table.write(&path)?;
    }

    let args = combine::Args {
        species: "equi".to_string(),
        outfile: dir.path().join("equi_combined.tsv"),
        databases,
        directory: dir.path().to_path_buf(),
    };
    let combined = combine::combine(&args)?;
    assert_eq!(combined.rows.len(), 6);
    let observed = combined.get_column("Database")?;
    let expected = ["suiscoredb", "suiscoredb", "suiscoredb", "agalcoredb", "agalcoredb", "agalcoredb"];
    assert_eq!(observed, expected);
    assert!(args.outfile.exists());
    Ok(())
}

#[test]
fn combine_missing_database() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = combine::Args {
        species: "equi".to_string(),
        outfile: dir.path().join("equi_combined.tsv"),
        directory: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(combine::combine(&args).is_err());
    Ok(())
}

#[test]
fn recap_report() {
    let recap = recap::parse_report("equi_vs_suis", REPORT);
    assert_eq!(recap.genes_with_hits, ["SSUSC84_RS00005"]);
    assert_eq!(recap.hits.len(), 2);
    assert_eq!(recap.hits[0].gene_name, "dnaA");
    assert_eq!(recap.hits[1].subject_id, "Suis_P17_01234");
    assert_eq!(recap.genes_with_zero_hits.iter().collect::<Vec<_>>(), ["SSUSC84_RS00010"]);
    assert_eq!(
        recap.summary(),
        "Total number of genes with one or more hits: 1\nTotal number of genes with zero hits: 1\n"
    );
}

#[test]
fn recap_folder() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("equi_vs_suiscoredb.txt"), REPORT)?;
    std::fs::write(dir.path().join("notes.tsv"), "not a report")?;

    let args = recap::Args { input_folder: dir.path().to_path_buf() };
    let recaps = recap::recap(&args)?;
    assert_eq!(recaps.len(), 1);

    let hits = std::fs::read_to_string(dir.path().join("equi_vs_suiscoredb_genes_with_hits.txt"))?;
    assert_eq!(
        hits,
        "dnaA\tSSUSC84_RS00005\tSuis_P17_00001\ndnaA\tSSUSC84_RS00005\tSuis_P17_01234\n"
    );

    // a second run must not treat the recap outputs as reports
    let recaps = recap::recap(&args)?;
    assert_eq!(recaps.len(), 1);
    Ok(())
}

fn combined_table() -> Table<String> {
    let rows = vec![
        vec!["q1", "db1", "1"],
        vec!["q1", "db1", "1"],
        vec!["q1", "db2", "1"],
        vec!["q2", "db1", "1"],
        vec!["q2", "db2", "0"],
        vec!["q3", "db1", "0"],
        vec!["q3", "db2", ""],
    ];
    Table {
        headers: vec!["Query".to_string(), "Database".to_string(), "Hits found".to_string()],
        rows: rows.iter().map(|r| r.iter().map(|v| v.to_string()).collect()).collect(),
        path: None,
    }
}

#[test]
fn hits_matrix() -> Result<(), Report> {
    let matrix = analyze::HitsMatrix::from_table(&combined_table())?;
    assert_eq!(matrix.queries, ["q1", "q2", "q3"]);
    assert_eq!(matrix.databases, ["db1", "db2"]);
    assert_eq!(matrix.hits, [[1, 1], [1, 0], [0, 0]]);
    assert_eq!(matrix.counts(), [2, 1, 0]);
    assert_eq!(matrix.distribution(), [1, 1, 1]);

    let graph = matrix.shared_graph();
    assert_eq!(graph.node_count(), 2);
    let weights = graph.edge_references().map(|e| *e.weight()).collect::<Vec<_>>();
    assert_eq!(weights, [1]);
    Ok(())
}

#[test]
fn analyze() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("equi_combined.tsv");
    combined_table().write(&input)?;

    let args = analyze::Args {
        species: "equi".to_string(),
        file: input,
        output_dir: dir.path().to_path_buf(),
    };
    analyze::analyze(&args)?;

    let two = std::fs::read_to_string(dir.path().join("equi_queries_with_2_databases_hits.txt"))?;
    assert_eq!(two, "q1\n");
    assert!(dir.path().join("equi_hits_matrix.tsv").exists());
    assert!(dir.path().join("equi_shared_essential_core_networkgraph.svg").exists());
    assert!(dir.path().join("equi_shared_essential_core_heatmap.svg").exists());
    Ok(())
}

#[test]
fn analyze_skips_unobserved_counts() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("equi_combined.tsv");
    let mut table = combined_table();
    table.rows = [["q1", "db1", "1"], ["q1", "db2", "1"], ["q2", "db1", "0"], ["q2", "db2", "0"]]
        .iter()
        .map(|r| r.iter().map(|v| v.to_string()).collect())
        .collect();
    table.write(&input)?;

    let args = analyze::Args {
        species: "equi".to_string(),
        file: input,
        output_dir: dir.path().to_path_buf(),
    };
    let matrix = analyze::analyze(&args)?;
    assert_eq!(matrix.distribution(), [1, 0, 1]);
    assert_eq!(matrix.queries_by_count().into_keys().collect::<Vec<_>>(), [0, 2]);
    assert!(dir.path().join("equi_queries_with_0_databases_hits.txt").exists());
    assert!(!dir.path().join("equi_queries_with_1_databases_hits.txt").exists());
    assert!(dir.path().join("equi_queries_with_2_databases_hits.txt").exists());
    Ok(())
}
