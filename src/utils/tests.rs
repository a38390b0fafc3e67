use crate::utils;
use color_eyre::eyre::{Report, Result};
use std::io::Write;

#[test]
fn lines_round_trip_through_zstd() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;

    let plain = dir.path().join("keys.txt");
    utils::write_lines(&plain, ["geneA", "geneB"])?;
    assert_eq!(std::fs::read_to_string(&plain)?, "geneA\ngeneB\n");

    let compressed = dir.path().join("keys.txt.zst");
    let mut encoder = zstd::stream::write::Encoder::new(std::fs::File::create(&compressed)?, 0)?;
    encoder.write_all(b"geneA\ngeneB\n")?;
    encoder.finish()?;

    assert_eq!(utils::read_lines(&plain)?, utils::read_lines(&compressed)?);
    Ok(())
}

#[test]
fn write_lines_empty() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.txt");
    utils::write_lines(&path, Vec::<String>::new())?;
    assert_eq!(std::fs::read_to_string(&path)?, "");
    Ok(())
}

#[test]
fn missing_file() {
    assert!(utils::read_lines(&"does/not/exist.txt").is_err());
}

#[test]
fn sibling_path() -> Result<(), Report> {
    let observed = utils::sibling_path(&"blast/equi_vs_suiscoredb.txt", "tsv")?;
    assert_eq!(observed, std::path::PathBuf::from("blast/equi_vs_suiscoredb.tsv"));
    assert!(utils::sibling_path(&"blast/equi.tsv", "tsv").is_err());
    Ok(())
}

#[test]
fn format_general() {
    assert_eq!(utils::format_general(0.05, 3), "0.05");
    assert_eq!(utils::format_general(-12.3456, 4), "-12.35");
    assert_eq!(utils::format_general(9.9996, 3), "10");
    assert_eq!(utils::format_general(f64::NAN, 3), "nan");
    assert_eq!(utils::format_general(f64::INFINITY, 3), "inf");
    assert_eq!(utils::format_general(0.0, 3), "0");
}

#[test]
fn format_scientific() {
    assert_eq!(utils::format_scientific(1.5e-120, 2), "1.50e-120");
    assert_eq!(utils::format_scientific(1.0, 3), "1.000e+00");
}
