use crate::Table;
use color_eyre::eyre::{Report, Result};

#[test]
fn add_row_and_column() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = vec!["query", "subject"];
    table.add_row(vec!["geneA", "hit1"])?;
    table.add_row(vec!["geneB", "hit2"])?;
    table.add_column("evalue", vec!["1e-10", "0.5"])?;

    assert_eq!(table.get("evalue", 1)?, &"0.5");
    assert_eq!(table.get_column("query")?, [&"geneA", &"geneB"]);
    assert!(table.add_column("short", vec!["x"]).is_err());
    assert!(table.get("missing", 0).is_err());
    assert!(table.get_row(2).is_err());
    Ok(())
}

#[test]
fn set_value() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = vec!["Database".to_string()];
    table.add_row(vec!["old".to_string()])?;
    table.set("Database", 0, "new".to_string())?;
    assert_eq!(table.get("Database", 0)?, "new");
    assert!(table.set("Database", 1, "x".to_string()).is_err());
    Ok(())
}

#[test]
fn write_then_read_csv() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("table.csv");

    let mut table = Table::new();
    table.headers = vec!["species", "count"];
    table.add_row(vec!["equi", "398"])?;
    table.add_row(vec!["suis, strain P1/7", "308"])?;
    table.write(&path)?;

    let observed = Table::read(&path)?;
    assert_eq!(observed.headers, ["species", "count"]);
    assert_eq!(observed.rows, [["equi", "398"], ["suis, strain P1/7", "308"]]);
    assert_eq!(observed.path, Some(path));
    Ok(())
}

#[test]
fn read_pads_and_skips_blank_lines() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.tsv");
    std::fs::write(&path, "a\tb\tc\n1\t2\n\n4\t5\t6\t7\n")?;

    let table = Table::read(&path)?;
    assert_eq!(table.rows, [["1", "2", ""], ["4", "5", "6"]]);
    Ok(())
}

#[test]
fn read_unknown_extension() {
    assert!(Table::read("table.xlsx").is_err());
}

#[test]
fn select_columns() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = vec!["equi".to_string(), "suis".to_string()];
    table.add_row(vec!["E1".to_string(), "S1".to_string()])?;

    let observed = table.select(&["suis", "agal", "equi"]);
    assert_eq!(observed.headers, ["suis", "agal", "equi"]);
    assert_eq!(observed.rows, [["S1", "", "E1"]]);
    Ok(())
}
