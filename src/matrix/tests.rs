use crate::matrix::{self, CoreArgs, MergeArgs, UpsetArgs};
use crate::Table;
use color_eyre::eyre::{Report, Result};
use std::collections::BTreeMap;

#[test]
fn merge() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let equi = dir.path().join("equi_presence_matrix.tsv");
    std::fs::write(&equi, "equi\tsuis\nEQ01\tSS01\nEQ02\t\n")?;
    let suis = dir.path().join("suis_presence_matrix.tsv");
    std::fs::write(&suis, "suis\tequi\tnotes\nSS01\tEQ01\tdup\nSS09\t\tnew\n")?;
    let no_results = dir.path().join("no_results.tsv");
    std::fs::write(&no_results, "equi\nEQ77\n")?;

    let args = MergeArgs {
        input: vec![equi, suis],
        no_results,
        columns: vec!["equi".to_string(), "suis".to_string()],
        output: dir.path().join("merged.tsv"),
    };
    let merged = matrix::merge(&args)?;
    assert_eq!(merged.headers, ["equi", "suis"]);
    assert_eq!(merged.rows, [["EQ01", "SS01"], ["EQ02", ""], ["", "SS09"], ["EQ77", ""]]);
    assert!(args.output.exists());
    Ok(())
}

#[test]
fn merge_without_no_results() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let equi = dir.path().join("equi_presence_matrix.tsv");
    std::fs::write(&equi, "equi\nEQ01\nEQ01\n")?;
    let args = MergeArgs {
        input: vec![equi],
        no_results: dir.path().join("missing.tsv"),
        output: dir.path().join("merged.tsv"),
        ..Default::default()
    };
    let merged = matrix::merge(&args)?;
    assert_eq!(merged.headers.len(), 6);
    assert_eq!(merged.rows.len(), 1);
    assert_eq!(merged.get("equi", 0)?, "EQ01");
    assert_eq!(merged.get("agal", 0)?, "");
    Ok(())
}

#[test]
fn core() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("matrix.tsv");
    std::fs::write(
        &input,
        "query\tequi\tsuis\nq1\tEQ01\tSS01\nq2\tEQ01\tSS01\nq3\tEQ02\t \nq4\t\tSS03\n",
    )?;
    let args = CoreArgs {
        input,
        columns: vec!["equi".to_string(), "suis".to_string()],
        output: dir.path().join("core.tsv"),
    };
    let core = matrix::core(&args)?;
    assert_eq!(core.headers, ["equi", "suis"]);
    assert_eq!(core.rows, [["EQ01", "SS01"]]);

    let missing = CoreArgs { columns: vec!["agal".to_string()], ..args };
    assert!(matrix::core(&missing).is_err());
    Ok(())
}

#[test]
fn intersections() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = ["suis", "notes", "iniae"].map(String::from).to_vec();
    let rows = [["SS01", "x", "IN01"], ["SS01", "y", "IN01"], ["SS02", "", " "], ["", "", "IN03"]];
    table.rows = rows.iter().map(|r| r.map(String::from).to_vec()).collect();

    let labels = BTreeMap::from([
        ("iniae".to_string(), "S.Iniae".to_string()),
        ("suis".to_string(), "S.Suis".to_string()),
        ("agal".to_string(), "S.Agalactiae".to_string()),
    ]);
    let counts = matrix::intersections(&table, &labels)?;
    let expected = [("S.Suis", 2), ("S.Iniae", 2), ("S.Suis&S.Iniae", 1)];
    let expected = expected.map(|(k, v)| (k.to_string(), v));
    assert_eq!(counts, expected);
    Ok(())
}

#[test]
fn upset() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("matrix.csv");
    std::fs::write(&input, "pneumo,agal\nPN01,AG01\nPN02,\n")?;
    let args = UpsetArgs { input, output: dir.path().join("upset.txt"), ..Default::default() };
    matrix::upset(&args)?;

    let observed = std::fs::read_to_string(&args.output)?;
    let expected = "# Dataset\ninput <- c(\n  \"S.Pneumoniae\" = 2,\n  \"S.Agalactiae\" = 1,\n  \"S.Pneumoniae&S.Agalactiae\" = 1\n)\n";
    assert_eq!(observed, expected);
    Ok(())
}

#[test]
fn upset_no_species() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("matrix.tsv");
    std::fs::write(&input, "query\nq1\n")?;
    let args = UpsetArgs { input, output: dir.path().join("upset.txt"), ..Default::default() };
    assert!(matrix::upset(&args).is_err());
    Ok(())
}
