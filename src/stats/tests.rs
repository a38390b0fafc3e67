use crate::stats::{self, cog, hypothesis, overlap, ChisqArgs, CoreEssentialArgs, NormalityArgs};
use crate::Table;
use color_eyre::eyre::{Report, Result};
use std::path::{Path, PathBuf};

const CORE_ESSENTIAL: &str = "\
species\tcore_essential\tcore_non_essential\ttotal_essential\tgenome_size
agal\t160\t1396\t160\t5300
equi\t398\t1383\t401\t2347
iniae\t419\t1142\t476\t3047
pneumo\t370\t1090\t536\t4341
suis\t308\t971\t342\t6645
uberis\t324\t1098\t384\t6334
";

const ZOONOSIS: &str = "\
category\ttotal\tmatched
Strict core\t1462\t356
Collapsed core\t186\t9
Shell\t754\t155
Cloud\t1939\t412
";

const PISCINE: &str = "\
category\ttotal\tmatched
Strict core\t1137\t719
Collapsed core\t0\t0
Shell\t50\t0
Cloud\t393\t7
";

fn write_file(dir: &Path, name: &str, text: &str) -> Result<PathBuf, Report> {
    let path = dir.join(name);
    std::fs::write(&path, text)?;
    Ok(path)
}

fn assert_close(observed: f64, expected: f64, tolerance: f64) {
    assert!((observed - expected).abs() < tolerance, "observed {observed}, expected {expected}");
}

// ----------------------------------------------------------------------------
// Hypothesis

#[test]
fn shapiro_wilk_skewed() -> Result<(), Report> {
    let values = [148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0];
    let result = hypothesis::shapiro_wilk(&values)?;
    assert_close(result.statistic, 0.7888147, 1e-4);
    assert_close(result.p_value, 0.0067038, 1e-3);
    Ok(())
}

#[test]
fn shapiro_wilk_strict_core() -> Result<(), Report> {
    let values = [1556.0, 1786.0, 1561.0, 1462.0, 1279.0, 1423.0];
    let result = hypothesis::shapiro_wilk(&values)?;
    assert_close(result.statistic, 0.965483, 1e-4);
    assert_close(result.p_value, 0.86083, 1e-3);
    Ok(())
}

#[test]
fn shapiro_wilk_too_few() {
    assert!(hypothesis::shapiro_wilk(&[1.0, 2.0]).is_err());
}

#[test]
fn fisher_exact_empty_margin() {
    let result = hypothesis::fisher_exact([[0, 0], [1, 2]]);
    assert!(result.odds_ratio.is_nan());
    assert_eq!(result.p_value, 1.0);
}

#[test]
fn binomial_test_symmetric() -> Result<(), Report> {
    assert_close(hypothesis::binomial_test(5, 10, 0.5)?, 1.0, 1e-9);
    assert!(hypothesis::binomial_test(11, 10, 0.5).is_err());
    Ok(())
}

#[test]
fn benjamini_hochberg_empty() {
    assert!(hypothesis::benjamini_hochberg(&[]).is_empty());
}

#[test]
fn chi2_contingency_zero_expected() {
    let observed = [vec![0.0, 0.0], vec![3.0, 4.0]];
    assert!(hypothesis::chi2_contingency(&observed).is_err());
    let ragged = [vec![1.0, 2.0], vec![3.0]];
    assert!(hypothesis::chi2_contingency(&ragged).is_err());
}

// ----------------------------------------------------------------------------
// Normality and Chi-Square

#[test]
fn normality() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(
        dir.path(),
        "categories.tsv",
        "Species\tStrict Core\tSoft Core\nagal\t1556\t96\nequi\t1786\t20\niniae\t1561\t77\npneumo\t1462\t186\nsuis\t1279\t132\nuberis\t1423\t57\n",
    )?;
    let args = NormalityArgs { input, output: dir.path().join("normality.txt"), ..Default::default() };
    let results = stats::normality(&args)?;

    let categories = results.iter().map(|(c, _)| c.as_str()).collect::<Vec<_>>();
    assert_eq!(categories, ["Strict Core", "Soft Core"]);

    let report = std::fs::read_to_string(&args.output)?;
    assert!(report.starts_with("Shapiro-Wilk Normality Test Results\n========"));
    assert!(report.contains("Category: Strict Core\n  Shapiro-Wilk Test Statistic: 0.9655\n  P-value: "));
    assert!(report.contains("  Conclusion: Normally Distributed\n"));
    Ok(())
}

#[test]
fn normality_no_numeric_columns() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "categories.tsv", "Species\nagal\nequi\n")?;
    let args = NormalityArgs { input, output: dir.path().join("normality.txt"), ..Default::default() };
    assert!(stats::normality(&args).is_err());
    Ok(())
}

#[test]
fn chisq() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "contingency.tsv", "Species\tCore\tCloud\nA\t10\t20\nB\t20\t10\n")?;
    let args = ChisqArgs { input, output: dir.path().join("chi.txt") };
    let result = stats::chisq(&args)?;

    // continuity corrected for one degree of freedom
    assert_close(result.statistic, 5.4, 1e-9);
    assert_eq!(result.dof, 1);
    assert_eq!(result.expected, [[15.0, 15.0], [15.0, 15.0]]);

    let report = std::fs::read_to_string(&args.output)?;
    assert!(report.contains("Chi-Square Statistic: 5.4000\n"));
    assert!(report.contains("Degrees of Freedom: 1\n"));
    assert!(report.contains("| A |"));
    Ok(())
}

// ----------------------------------------------------------------------------
// Core Essential

#[test]
fn core_essential() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "core_essential.tsv", CORE_ESSENTIAL)?;
    let args = CoreEssentialArgs {
        input,
        summary: dir.path().join("summary.txt"),
        fisher: dir.path().join("fisher.tsv"),
    };
    let result = stats::core_essential(&args)?;

    assert_eq!(result.chi_square.dof, 5);
    assert_eq!(result.fisher.len(), 6);

    // every essential gene of agal is core
    let agal = &result.fisher[0];
    assert_eq!((agal.a, agal.b, agal.c, agal.d), (160, 1396, 0, 3744));
    assert!(agal.fisher.odds_ratio.is_infinite());
    assert!(result.fisher.iter().all(|f| f.q_value >= f.fisher.p_value));

    assert_close(result.spearman.rho, 0.8285714, 1e-6);

    let table = Table::read(&args.fisher)?;
    assert_eq!(table.headers, ["Species", "a", "b", "c", "d", "OR", "p_raw", "q_BH"]);
    assert_eq!(table.get("OR", 0)?, "inf");

    let summary = std::fs::read_to_string(&args.summary)?;
    assert!(summary.starts_with("=== 2 x 6 x² test"));
    assert!(summary.contains("=== Spearman correlation"));
    Ok(())
}

#[test]
fn core_essential_inconsistent_counts() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let text = "species\tcore_essential\tcore_non_essential\ttotal_essential\tgenome_size\nagal\t160\t1396\t100\t5300\nequi\t398\t1383\t401\t2347\n";
    let input = write_file(dir.path(), "core_essential.tsv", text)?;
    let args = CoreEssentialArgs {
        input,
        summary: dir.path().join("summary.txt"),
        fisher: dir.path().join("fisher.tsv"),
    };
    assert!(stats::core_essential(&args).is_err());
    Ok(())
}

// ----------------------------------------------------------------------------
// COG

#[test]
fn cog() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "counts.tsv", "LETTER\tcount\nM\t0\nK\t10\nJ\t30\nL\t10\n")?;
    let outbase = dir.path().join("suis").to_string_lossy().to_string();
    let args = cog::Args { input, outbase: Some(outbase.clone()), ..Default::default() };
    let categories = cog::cog(&args)?;

    let names = categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["J", "K", "L", "M"]);

    let j = categories[0].stats.as_ref().map(|s| (s.percent, s.expected, s.enrichment));
    let (percent, expected, enrichment) = j.unwrap_or_default();
    assert_close(percent, 60.0, 1e-9);
    assert_close(expected, 100.0 / 3.0, 1e-9);
    assert_close(enrichment, 1.8, 1e-9);
    assert!(categories[0].stats.as_ref().is_some_and(|s| s.significant));
    assert!(categories[3].stats.is_none());

    let table = Table::read(&PathBuf::from(format!("{outbase}_percent_significance.tsv")))?;
    assert_eq!(table.headers, cog::HEADERS);
    assert_eq!(table.get("percent", 0)?, "60");
    assert_eq!(table.get("significant", 0)?, "True");
    assert_eq!(table.get("p_value", 3)?, "");
    assert!(PathBuf::from(format!("{outbase}.svg")).exists());
    Ok(())
}

#[test]
fn cog_all_zero() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "counts.tsv", "category\tn\nJ\t0\nK\tNA\n")?;
    let outbase = dir.path().join("empty").to_string_lossy().to_string();
    let args = cog::Args { input, outbase: Some(outbase.clone()), ..Default::default() };
    let categories = cog::cog(&args)?;

    assert!(categories.iter().all(|c| c.count == 0 && c.stats.is_none()));
    let table = Table::read(&PathBuf::from(format!("{outbase}_percent_significance.tsv")))?;
    assert_eq!(table.rows, [["J", "0", "", "", "", "", "", "", "", "", ""], ["K", "0", "", "", "", "", "", "", "", "", ""]]);
    assert!(!PathBuf::from(format!("{outbase}.svg")).exists());
    Ok(())
}

#[test]
fn cog_infer_columns() -> Result<(), Report> {
    let mut table = Table::new();
    table.headers = ["func", "hits"].map(String::from).to_vec();
    table.rows = vec![["J", "4"].map(String::from).to_vec()];
    assert_eq!(cog::infer_columns(&table)?, ("func".to_string(), "hits".to_string()));

    table.headers = ["name", "count"].map(String::from).to_vec();
    assert_eq!(cog::infer_columns(&table)?, ("name".to_string(), "count".to_string()));
    Ok(())
}

#[test]
fn cog_resolve_input() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "a_notes.tsv", "note\nnothing\n")?;
    let counts = write_file(dir.path(), "b_hits.tsv", "func\thits\nJ\t4\n")?;
    assert_eq!(cog::resolve_input(dir.path())?, counts);

    let preferred = write_file(dir.path(), "cog_counts.tsv", "LETTER\tcount\nJ\t4\n")?;
    assert_eq!(cog::resolve_input(dir.path())?, preferred);
    assert_eq!(cog::resolve_input(&counts)?, counts);
    assert!(cog::resolve_input(&dir.path().join("missing")).is_err());
    Ok(())
}

// ----------------------------------------------------------------------------
// Overlap

#[test]
fn overlap_zoonosis() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "zoonosis.tsv", ZOONOSIS)?;
    let outbase = dir.path().join("zoonosis").to_string_lossy().to_string();
    let args = overlap::Args { input, outbase: outbase.clone(), ..Default::default() };
    let result = overlap::overlap(&args)?;

    assert_eq!(result.counts[1].unmatched, 177);
    let chi_square = result.chi_square.as_ref().map(|c| (c.dof, c.p_value));
    assert!(chi_square.is_some_and(|(dof, p)| dof == 3 && p < 0.01));
    assert_eq!(result.pairwise.len(), 6);

    let counts = Table::read(&PathBuf::from(format!("{outbase}_counts_and_pcts.csv")))?;
    assert_eq!(counts.get("unmatched", 0)?, "1106");
    let pairwise = Table::read(&PathBuf::from(format!("{outbase}_pairwise_fishers.csv")))?;
    assert_eq!(pairwise.rows.len(), 6);
    assert_eq!(pairwise.get("cat_A", 0)?, "Strict core");
    assert_eq!(pairwise.get("cat_B", 0)?, "Collapsed core");

    let figure = std::fs::read_to_string(format!("{outbase}_stacked.svg"))?;
    assert!(figure.contains("Total: 1462"));
    assert!(figure.contains("Matched - Strict core"));
    assert!(figure.contains("#532C6B"));
    Ok(())
}

#[test]
fn overlap_empty_category() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "piscine.tsv", PISCINE)?;
    let outbase = dir.path().join("piscine").to_string_lossy().to_string();
    let args = overlap::Args {
        input,
        outbase,
        highlight: overlap::Highlight::Unmatched,
        absolute: true,
        ..Default::default()
    };
    let result = overlap::overlap(&args)?;

    assert!(result.chi_square.is_none());
    assert_eq!(result.counts[1].matched_pct, 0.0);
    let first = &result.pairwise[0];
    assert_eq!((first.a, first.b), (0, 1));
    assert!(first.fisher.odds_ratio.is_nan());
    assert_eq!(first.fisher.p_value, 1.0);
    Ok(())
}

#[test]
fn overlap_skips_bad_counts() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let text = "category\ttotal\tmatched\nShell\t10\t-1\nCloud\t20\t5\nStrict core\tNA\t3\nCollapsed core\t8\t2\n";
    let input = write_file(dir.path(), "bad.tsv", text)?;
    let args = overlap::Args { input, outbase: dir.path().join("bad").to_string_lossy().to_string(), ..Default::default() };
    let result = overlap::overlap(&args)?;
    let categories = result.counts.iter().map(|c| c.category.as_str()).collect::<Vec<_>>();
    assert_eq!(categories, ["Cloud", "Collapsed core"]);
    assert_eq!(result.pairwise.len(), 1);
    Ok(())
}

#[test]
fn overlap_no_valid_rows() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = write_file(dir.path(), "bad.tsv", "category\ttotal\tmatched\nShell\t10\t-1\n")?;
    let args = overlap::Args { input, outbase: dir.path().join("bad").to_string_lossy().to_string(), ..Default::default() };
    assert!(overlap::overlap(&args).is_err());
    Ok(())
}
