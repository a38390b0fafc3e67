//! Shared helpers for paths, plain-text lists, and number formatting.

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use zstd::stream::read::Decoder;

#[cfg(test)]
mod tests;

/// Get delimiter based on file extension.
///
/// ## Arguments
///
/// - `path` - File path.
///
/// ## Examples
///
/// - `.tsv` => `\t`
/// - `.txt` => `\t`
/// - `.csv` => `,`
///
/// Note that `.txt` is assumed to be tab-delimited!
///
/// ```rust
/// use strepcore::utils::get_delimiter;
///
/// assert_eq!(get_delimiter(&"file.tsv")?, '\t');
/// assert_eq!(get_delimiter(&"file.csv")?, ',');
/// assert_eq!(get_delimiter(&"file.txt")?, '\t');
/// assert!(get_delimiter(&"file").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_delimiter<P>(path: &P) -> Result<char, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path
        .as_ref()
        .extension()
        .wrap_err(format!("Failed to get file extension: {path:?}"))?
        .to_str()
        .wrap_err(format!("Failed to convert file extension to str: {path:?}"))?;
    // convert extension to the expected delimiter
    match ext {
        "tsv" | "txt" => Ok('\t'),
        "csv" => Ok(','),
        _ext => {
            Err(eyre!("Unknown file extension: {_ext:?}").suggestion("Options: tsv, csv, or txt"))
        }
    }
}

/// Create the parent directory of a file path, if it doesn't exist yet.
pub fn create_parent_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create directory: {parent:?}"))?;
        }
    }
    Ok(())
}

/// Returns an error with a suggestion if the path does not exist.
pub fn check_exists<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if !path.as_ref().exists() {
        Err(eyre!("File or directory does not exist: {path:?}")
            .suggestion("Check the path, or run the step that generates it first."))?;
    }
    Ok(())
}

/// Open a file for buffered reading, decompressing on the fly if it ends in `.zst`.
pub fn open_reader<P>(path: &P) -> Result<Box<dyn BufRead>, Report>
where
    P: AsRef<Path> + Debug,
{
    check_exists(path)?;
    let file = File::open(path).wrap_err(format!("Failed to open: {path:?}"))?;
    let is_zst = path.as_ref().extension().map(|ext| ext == "zst").unwrap_or(false);
    let reader: Box<dyn BufRead> = if is_zst {
        let decoder = Decoder::new(file).wrap_err(format!("Failed to decode: {path:?}"))?;
        Box::new(BufReader::new(decoder))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Read a whole (optionally zstd compressed) file into a string.
pub fn read_to_string<P>(path: &P) -> Result<String, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut buffer = String::new();
    open_reader(path)?
        .read_to_string(&mut buffer)
        .wrap_err(format!("Failed to read: {path:?}"))?;
    Ok(buffer)
}

/// Read the lines of a plain-text list, without line endings.
pub fn read_lines<P>(path: &P) -> Result<Vec<String>, Report>
where
    P: AsRef<Path> + Debug,
{
    open_reader(path)?
        .lines()
        .map(|line| line.wrap_err(format!("Failed to read line from: {path:?}")))
        .collect()
}

/// Write one item per line to a plain-text file.
pub fn write_lines<P, I>(path: &P, items: I) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
    I: IntoIterator,
    I::Item: Display,
{
    create_parent_dir(path)?;
    let mut output = items.into_iter().join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    std::fs::write(path, output).wrap_err(format!("Unable to write: {path:?}"))?;
    Ok(())
}

/// Parse a `key=value` pair from the command-line.
///
/// ```rust
/// use strepcore::utils::parse_key_value;
/// assert_eq!(parse_key_value("Equi=Equi_4047")?, ("Equi".to_string(), "Equi_4047".to_string()));
/// assert!(parse_key_value("Equi").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_key_value(text: &str) -> Result<(String, String), Report> {
    let (key, value) = text
        .split_once('=')
        .wrap_err(format!("Expected a KEY=VALUE pair, found: {text:?}"))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(eyre!("Empty key or value in pair: {text:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Swap the extension of an input path, refusing to clobber the input itself.
pub fn sibling_path<P>(path: &P, extension: &str) -> Result<PathBuf, Report>
where
    P: AsRef<Path> + Debug,
{
    let output = path.as_ref().with_extension(extension);
    if output == path.as_ref() {
        Err(eyre!("Output would overwrite the input: {path:?}")
            .suggestion(format!("Rename the input so it does not end in .{extension}")))?;
    }
    Ok(output)
}

// ----------------------------------------------------------------------------
// Number formatting

/// Format a float like printf's `%g` with `sig` significant digits.
///
/// ```rust
/// use strepcore::utils::format_general;
/// assert_eq!(format_general(0.0123456, 3), "0.0123");
/// assert_eq!(format_general(1234.5, 3), "1.23e+03");
/// assert_eq!(format_general(2.0, 3), "2");
/// assert_eq!(format_general(0.000012345, 3), "1.23e-05");
/// ```
pub fn format_general(x: f64, sig: usize) -> String {
    if !x.is_finite() {
        return format_non_finite(x);
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let sig = sig.max(1);
    // round first, the exponent can change (ex. 9.996 -> 1.00e1)
    let scientific = format!("{:.*e}", sig - 1, x);
    let exp: i32 = scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or_default();

    if exp < -4 || exp >= sig as i32 {
        let (mantissa, _) = scientific.split_once('e').unwrap_or((scientific.as_str(), ""));
        let mantissa = trim_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

/// Format a float in scientific notation with a two-digit exponent (ex. `1.234e-05`).
///
/// ```rust
/// use strepcore::utils::format_scientific;
/// assert_eq!(format_scientific(0.00012341, 3), "1.234e-04");
/// assert_eq!(format_scientific(12.0, 2), "1.20e+01");
/// ```
pub fn format_scientific(x: f64, precision: usize) -> String {
    if !x.is_finite() {
        return format_non_finite(x);
    }
    let scientific = format!("{x:.precision$e}");
    match scientific.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or_default();
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => scientific,
    }
}

fn format_non_finite(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
