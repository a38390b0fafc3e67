//! Flatten per-species output folders into one directory.

use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Arguments for moving files out of sub-directories.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct Args {
    /// Top directory.
    #[clap(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,

    /// Sub-directories to flatten, comma separated (default: all).
    #[clap(long, value_delimiter = ',')]
    pub subdirs: Vec<String>,
}

impl Default for Args {
    fn default() -> Self {
        Args { directory: PathBuf::from("."), subdirs: Vec::new() }
    }
}

/// Prefix of a sub-directory, its name up to the first `_`.
///
/// ```rust
/// use strepcore::collect::prefix;
/// assert_eq!(prefix("suis_results_2023"), "suis");
/// assert_eq!(prefix("equi"), "equi");
/// ```
pub fn prefix(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}

fn list_dir(directory: &Path) -> Result<Vec<PathBuf>, Report> {
    let paths = std::fs::read_dir(directory)
        .wrap_err_with(|| eyre!("Unable to read directory: {directory:?}"))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .wrap_err_with(|| eyre!("Unable to list directory: {directory:?}"))?;
    Ok(paths.into_iter().sorted().collect())
}

/// Move every file of the sub-directories into the top directory as `<prefix>_<file>`.
///
/// Returns the new file paths. Nested directories are left in place.
pub fn collect(args: &Args) -> Result<Vec<PathBuf>, Report> {
    let subdirs = match args.subdirs.is_empty() {
        true => list_dir(&args.directory)?.into_iter().filter(|p| p.is_dir()).collect_vec(),
        false => args.subdirs.iter().map(|name| args.directory.join(name)).collect_vec(),
    };

    let mut moved = Vec::new();
    for subdir in &subdirs {
        if !subdir.is_dir() {
            return Err(eyre!("Sub-directory does not exist: {subdir:?}")
                .suggestion(format!("List the sub-directories of {:?} with --subdirs.", args.directory)));
        }
        let name = subdir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let prefix = prefix(&name);

        for file in list_dir(subdir)?.into_iter().filter(|p| p.is_file()) {
            let file_name = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            let target = args.directory.join(format!("{prefix}_{file_name}"));
            if target.exists() {
                return Err(eyre!("Refusing to overwrite existing file: {target:?}"));
            }
            std::fs::rename(&file, &target)
                .wrap_err_with(|| eyre!("Unable to move {file:?} to {target:?}"))?;
            debug!("Moved: {file:?} -> {target:?}");
            moved.push(target);
        }
    }

    info!("Moved {} files out of {} sub-directories.", moved.len(), subdirs.len());
    println!("Files have been moved and renamed in {}", args.directory.display());
    Ok(moved)
}
