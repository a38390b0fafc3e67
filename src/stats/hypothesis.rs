//! Hypothesis tests and interval estimates over counts and small samples.
//!
//! Results follow the conventions of the scientific Python stack, so that reports can be
//! compared with earlier analyses.

use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use itertools::Itertools;
use statrs::function::beta::beta_reg;
use statrs::function::erf::{erfc, erfc_inv};
use statrs::function::factorial::ln_binomial;
use statrs::function::gamma::gamma_ur;
use std::f64::consts::{PI, SQRT_2};

/// Relative tolerance when collecting outcomes as extreme as the observed one.
const RELATIVE_TOLERANCE: f64 = 1e-7;

/// Upper tail of the standard normal distribution.
fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Quantile of the standard normal distribution.
fn normal_ppf(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Upper tail of the chi-square distribution.
fn chi2_sf(x: f64, dof: f64) -> f64 {
    if x <= 0.0 {
        1.0
    } else {
        gamma_ur(dof / 2.0, x / 2.0)
    }
}

/// Evaluate a polynomial with coefficients in increasing order of degree.
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

// ----------------------------------------------------------------------------
// Chi-Square

/// Result of a chi-square test of independence.
#[derive(Clone, Debug, PartialEq)]
pub struct ChiSquare {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    /// Expected frequencies under independence, same shape as the observed table.
    pub expected: Vec<Vec<f64>>,
}

/// Chi-square test of independence of the rows and columns of a contingency table.
///
/// With one degree of freedom, Yates' continuity correction is applied.
///
/// ```rust
/// use strepcore::stats::hypothesis::chi2_contingency;
///
/// let result = chi2_contingency(&[vec![10.0, 20.0], vec![20.0, 10.0]])?;
/// assert_eq!(result.dof, 1);
/// assert_eq!(result.expected, [[15.0, 15.0], [15.0, 15.0]]);
/// // |10 - 15| is corrected to 4.5
/// assert!((result.statistic - 4.0 * 4.5 * 4.5 / 15.0).abs() < 1e-12);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn chi2_contingency(observed: &[Vec<f64>]) -> Result<ChiSquare, Report> {
    let n_rows = observed.len();
    let n_cols = observed.first().map(|row| row.len()).unwrap_or(0);
    if n_rows == 0 || n_cols == 0 || observed.iter().any(|row| row.len() != n_cols) {
        return Err(eyre!("Contingency table must be a non-empty rectangle: {observed:?}"));
    }
    if observed.iter().flatten().any(|v| *v < 0.0 || !v.is_finite()) {
        return Err(eyre!("Contingency table has negative or non-finite counts: {observed:?}"));
    }

    let row_sums = observed.iter().map(|row| row.iter().sum::<f64>()).collect_vec();
    let col_sums = (0..n_cols).map(|c| observed.iter().map(|row| row[c]).sum::<f64>()).collect_vec();
    let total: f64 = row_sums.iter().sum();
    let expected = row_sums
        .iter()
        .map(|r| col_sums.iter().map(|c| r * c / total).collect_vec())
        .collect_vec();

    if expected.iter().flatten().any(|e| *e == 0.0 || !e.is_finite()) {
        return Err(eyre!("The table of expected frequencies has a zero element.")
            .suggestion("Remove rows or columns that only hold zeros."));
    }

    let dof = (n_rows - 1) * (n_cols - 1);
    if dof == 0 {
        return Ok(ChiSquare { statistic: 0.0, p_value: 1.0, dof, expected });
    }

    let statistic = observed
        .iter()
        .flatten()
        .zip(expected.iter().flatten())
        .map(|(o, e)| {
            let diff = e - o;
            let o = match dof {
                1 => o + diff.signum() * diff.abs().min(0.5),
                _ => *o,
            };
            (o - e).powi(2) / e
        })
        .sum::<f64>();

    let p_value = chi2_sf(statistic, dof as f64);
    Ok(ChiSquare { statistic, p_value, dof, expected })
}

// ----------------------------------------------------------------------------
// Fisher

/// Result of Fisher's exact test on a 2x2 table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fisher {
    /// Sample odds ratio `(a * d) / (b * c)`.
    pub odds_ratio: f64,
    pub p_value: f64,
}

/// Two-sided Fisher's exact test of the table `[[a, b], [c, d]]`.
///
/// The p-value sums the probability of every table with the same margins that is no more
/// likely than the observed one.
///
/// ```rust
/// use strepcore::stats::hypothesis::fisher_exact;
///
/// let result = fisher_exact([[3, 1], [1, 3]]);
/// assert_eq!(result.odds_ratio, 9.0);
/// assert!((result.p_value - 34.0 / 70.0).abs() < 1e-12);
/// ```
pub fn fisher_exact(table: [[u64; 2]; 2]) -> Fisher {
    let [[a, b], [c, d]] = table;
    if a + b == 0 || c + d == 0 || a + c == 0 || b + d == 0 {
        return Fisher { odds_ratio: f64::NAN, p_value: 1.0 };
    }
    let odds_ratio = match b > 0 && c > 0 {
        true => (a * d) as f64 / (b * c) as f64,
        false => f64::INFINITY,
    };

    // hypergeometric distribution of the top left cell
    let (row1, col1, total) = (a + b, a + c, a + b + c + d);
    let ln_denominator = ln_binomial(total, col1);
    let ln_pmf = |x: u64| ln_binomial(row1, x) + ln_binomial(total - row1, col1 - x) - ln_denominator;

    let low = col1.saturating_sub(total - row1);
    let high = col1.min(row1);
    let ln_observed = ln_pmf(a);
    let threshold = ln_observed + RELATIVE_TOLERANCE.ln_1p();

    let p_value = (low..=high)
        .map(ln_pmf)
        .filter(|ln_p| *ln_p <= threshold)
        .map(f64::exp)
        .sum::<f64>()
        .min(1.0);

    Fisher { odds_ratio, p_value }
}

// ----------------------------------------------------------------------------
// Binomial

/// Two-sided exact binomial test of `successes` in `trials` against probability `p`.
///
/// ```rust
/// use strepcore::stats::hypothesis::binomial_test;
///
/// // symmetric case, both tails
/// let p = binomial_test(2, 10, 0.5)?;
/// assert!((p - 112.0 / 1024.0).abs() < 1e-12);
/// assert!((binomial_test(5, 10, 0.5)? - 1.0).abs() < 1e-12);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn binomial_test(successes: u64, trials: u64, p: f64) -> Result<f64, Report> {
    if successes > trials {
        return Err(eyre!("Successes ({successes}) exceed trials ({trials})."));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(eyre!("Probability of success must be in [0, 1]: {p}"));
    }
    if p == 0.0 || p == 1.0 {
        let expected = if p == 0.0 { 0 } else { trials };
        return Ok(if successes == expected { 1.0 } else { 0.0 });
    }

    let ln_pmf =
        |k: u64| ln_binomial(trials, k) + k as f64 * p.ln() + (trials - k) as f64 * (-p).ln_1p();
    let threshold = ln_pmf(successes) + RELATIVE_TOLERANCE.ln_1p();
    let p_value = (0..=trials)
        .map(ln_pmf)
        .filter(|ln_p| *ln_p <= threshold)
        .map(f64::exp)
        .sum::<f64>();
    Ok(p_value.min(1.0))
}

/// Wilson score interval for a binomial proportion at the given confidence level.
///
/// ```rust
/// use strepcore::stats::hypothesis::wilson_interval;
///
/// let (low, high) = wilson_interval(5, 10, 0.95);
/// assert!((low - 0.2365931).abs() < 1e-6);
/// assert!((high - 0.7634069).abs() < 1e-6);
/// ```
pub fn wilson_interval(successes: u64, trials: u64, confidence: f64) -> (f64, f64) {
    if trials == 0 {
        return (f64::NAN, f64::NAN);
    }
    let n = trials as f64;
    let proportion = successes as f64 / n;
    let z = normal_ppf(1.0 - (1.0 - confidence) / 2.0);
    let z2 = z * z;
    let denominator = 1.0 + z2 / n;
    let center = (proportion + z2 / (2.0 * n)) / denominator;
    let half_width = z * (proportion * (1.0 - proportion) / n + z2 / (4.0 * n * n)).sqrt() / denominator;
    (center - half_width, center + half_width)
}

// ----------------------------------------------------------------------------
// Multiple Testing

/// Benjamini-Hochberg adjusted p-values (q-values), in input order.
///
/// ```rust
/// use strepcore::stats::hypothesis::benjamini_hochberg;
///
/// let q = benjamini_hochberg(&[0.01, 0.04, 0.03, 0.005]);
/// let expected = [0.02, 0.04, 0.04, 0.02];
/// assert!(q.iter().zip(expected).all(|(q, e)| (q - e).abs() < 1e-12));
/// ```
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    let order = (0..n).sorted_by(|a, b| p_values[*a].total_cmp(&p_values[*b])).collect_vec();

    let mut q_values = vec![f64::NAN; n];
    let mut running_min = 1.0_f64;
    for (rank, i) in order.iter().enumerate().rev() {
        let q = p_values[*i] * n as f64 / (rank + 1) as f64;
        running_min = running_min.min(q);
        q_values[*i] = running_min;
    }
    q_values
}

// ----------------------------------------------------------------------------
// Shapiro-Wilk

/// Result of a Shapiro-Wilk normality test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapiroWilk {
    pub statistic: f64,
    pub p_value: f64,
}

const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

/// Shapiro-Wilk test of normality (Royston's algorithm, 3 <= n <= 5000).
///
/// ```rust
/// use strepcore::stats::hypothesis::shapiro_wilk;
///
/// let result = shapiro_wilk(&[1.0, 2.0, 3.0])?;
/// assert!((result.statistic - 1.0).abs() < 1e-12);
/// assert!((result.p_value - 1.0).abs() < 1e-9);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn shapiro_wilk(values: &[f64]) -> Result<ShapiroWilk, Report> {
    let n = values.len();
    if !(3..=5000).contains(&n) {
        return Err(eyre!("Shapiro-Wilk needs between 3 and 5000 values, found {n}."));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(eyre!("Shapiro-Wilk values must be finite: {values:?}"));
    }
    let x = values.iter().copied().sorted_by(f64::total_cmp).collect_vec();
    let range = x[n - 1] - x[0];
    if range <= 0.0 {
        return Err(eyre!("Shapiro-Wilk values are all identical: {values:?}"));
    }

    // half of the antisymmetric coefficients, largest first
    let half = n / 2;
    let an = n as f64;
    let mut a = vec![0.0; half];
    if n == 3 {
        a[0] = 0.5_f64.sqrt();
    } else {
        let m = (1..=half).map(|i| normal_ppf((i as f64 - 0.375) / (an + 0.25))).collect_vec();
        let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
        let ssumm2 = summ2.sqrt();
        let rsn = 1.0 / an.sqrt();
        let a1 = poly(&SW_C1, rsn) - m[0] / ssumm2;

        let (first, fac) = if n > 5 {
            let a2 = -m[1] / ssumm2 + poly(&SW_C2, rsn);
            let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
                / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
            .sqrt();
            a[1] = a2;
            (2, fac)
        } else {
            let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
            (1, fac)
        };
        a[0] = a1;
        for i in first..half {
            a[i] = -m[i] / fac;
        }
    }

    // W is the squared correlation of the sorted values with the coefficients
    let coefficient = |i: usize| match (i < half, n - 1 - i < half) {
        (true, _) => -a[i],
        (_, true) => a[n - 1 - i],
        _ => 0.0,
    };
    let mean = x.iter().sum::<f64>() / an;
    let scaled = x.iter().map(|v| (v - mean) / range).collect_vec();
    let sax = (0..n).map(|i| coefficient(i) * scaled[i]).sum::<f64>();
    let ssa = (0..n).map(|i| coefficient(i).powi(2)).sum::<f64>();
    let ssx = scaled.iter().map(|v| v * v).sum::<f64>();
    let w = (sax * sax / (ssa * ssx)).min(1.0);

    let p_value = if n == 3 {
        (6.0 / PI * (w.sqrt().asin() - PI / 3.0)).max(0.0)
    } else {
        let w1 = (1.0 - w).ln();
        let (y, m, s) = if n <= 11 {
            let gamma = poly(&SW_G, an);
            if w1 >= gamma {
                return Ok(ShapiroWilk { statistic: w, p_value: 1e-99 });
            }
            (-(gamma - w1).ln(), poly(&SW_C3, an), poly(&SW_C4, an).exp())
        } else {
            let ln_n = an.ln();
            (w1, poly(&SW_C5, ln_n), poly(&SW_C6, ln_n).exp())
        };
        normal_sf((y - m) / s)
    };

    Ok(ShapiroWilk { statistic: w, p_value })
}

// ----------------------------------------------------------------------------
// Spearman

/// Result of a Spearman rank correlation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spearman {
    pub rho: f64,
    pub p_value: f64,
}

/// Ranks starting at 1, with ties given their average rank.
///
/// ```rust
/// use strepcore::stats::hypothesis::rank_average;
/// assert_eq!(rank_average(&[10.0, 30.0, 20.0, 20.0]), [1.0, 4.0, 2.5, 2.5]);
/// ```
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let order = (0..values.len()).sorted_by(|a, b| values[*a].total_cmp(&values[*b])).collect_vec();
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        order[start..=end].iter().for_each(|i| ranks[*i] = rank);
        start = end + 1;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let (mx, my) = (x.iter().sum::<f64>() / n, y.iter().sum::<f64>() / n);
    let sxy = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum::<f64>();
    let sxx = x.iter().map(|a| (a - mx).powi(2)).sum::<f64>();
    let syy = y.iter().map(|b| (b - my).powi(2)).sum::<f64>();
    sxy / (sxx * syy).sqrt()
}

/// Spearman rank correlation with a two-sided p-value from Student's t distribution.
///
/// ```rust
/// use strepcore::stats::hypothesis::spearman;
///
/// let result = spearman(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 25.0, 40.0])?;
/// assert_eq!(result.rho, 1.0);
/// assert_eq!(result.p_value, 0.0);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Spearman, Report> {
    if x.len() != y.len() {
        return Err(eyre!("Spearman samples differ in length ({} vs {}).", x.len(), y.len()));
    }
    if x.len() < 3 {
        return Err(eyre!("Spearman needs at least 3 pairs, found {}.", x.len()));
    }
    let rho = pearson(&rank_average(x), &rank_average(y));
    if !rho.is_finite() {
        return Ok(Spearman { rho: f64::NAN, p_value: f64::NAN });
    }
    let rho = rho.clamp(-1.0, 1.0);
    let dof = (x.len() - 2) as f64;

    let p_value = if rho.abs() == 1.0 {
        0.0
    } else {
        // two-sided tail of t = rho * sqrt(dof / (1 - rho^2))
        let t2 = rho * rho * dof / (1.0 - rho * rho);
        beta_reg(dof / 2.0, 0.5, dof / (dof + t2))
    };
    Ok(Spearman { rho, p_value })
}
