use assert_cmd::Command;
use color_eyre::eyre::{Report, Result};
use std::path::PathBuf;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn strepcore() -> Result<Command, Report> {
    Ok(Command::cargo_bin("strepcore")?)
}

#[test]
fn help() -> Result<(), Report> {
    let output = strepcore()?.arg("--help").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["blast", "tags", "fasta", "matrix", "stats", "plot", "collect"] {
        assert!(stdout.contains(command), "missing command: {command}");
    }
    Ok(())
}

#[test]
fn stats_core_essential() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let output = strepcore()?
        .current_dir(dir.path())
        .args(["stats", "core-essential", "-i"])
        .arg(data("core_essential.tsv"))
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("=== Spearman correlation"));
    assert!(dir.path().join("summary.txt").exists());
    assert!(dir.path().join("species_fisher.tsv").exists());
    Ok(())
}

#[test]
fn stats_normality_and_chisq() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    strepcore()?
        .current_dir(dir.path())
        .args(["stats", "normality", "-i"])
        .arg(data("gene_categories.tsv"))
        .assert()
        .success();
    let report = std::fs::read_to_string(dir.path().join("normality_results.txt"))?;
    assert!(report.contains("Category: Total"));

    strepcore()?
        .current_dir(dir.path())
        .args(["stats", "chisq", "-i"])
        .arg(data("gene_category_contingency.tsv"))
        .assert()
        .success();
    let report = std::fs::read_to_string(dir.path().join("chi_square_results.txt"))?;
    assert!(report.contains("Degrees of Freedom: 15"));
    Ok(())
}

#[test]
fn stats_overlap_piscine() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    strepcore()?
        .current_dir(dir.path())
        .args(["stats", "overlap", "-o", "piscine", "--highlight", "unmatched", "-i"])
        .arg(data("piscine.tsv"))
        .assert()
        .success();
    for name in ["piscine_counts_and_pcts.csv", "piscine_stacked.svg", "piscine_pairwise_fishers.csv"] {
        assert!(dir.path().join(name).exists(), "missing output: {name}");
    }
    Ok(())
}

#[test]
fn plot_essential() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    strepcore()?
        .current_dir(dir.path())
        .args(["plot", "essential", "-i"])
        .arg(data("essential_fig.tsv"))
        .assert()
        .success();
    let figure = std::fs::read_to_string(dir.path().join("streptococcus_essential_nonessential.svg"))?;
    assert!(figure.contains("S. pneumoniae"));
    Ok(())
}

#[test]
fn fasta_translate() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("genes.fasta"), ">SSU0001 dnaA\nATGGCTTAA\n")?;
    strepcore()?
        .current_dir(dir.path())
        .args(["fasta", "translate", "-i", "genes.fasta", "-o", "proteins.fasta"])
        .assert()
        .success();
    let proteins = std::fs::read_to_string(dir.path().join("proteins.fasta"))?;
    assert!(proteins.starts_with(">SSU0001"));
    assert!(proteins.contains("\nMA\n"));
    Ok(())
}

#[test]
fn unknown_command() -> Result<(), Report> {
    strepcore()?.arg("assemble").assert().failure();
    Ok(())
}
