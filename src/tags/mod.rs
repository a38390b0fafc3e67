//! Resolve core pangenome (PEPPAN) locus tags to the locus tags of a reference genome.
//!
//! Each species folder is expected to look like:
//!
//! ```text
//! <directory>/
//! └── <Species>/
//!     ├── <species>_core_peppan_gene_locuses.txt
//!     └── annotated_genomes/
//!         └── peppan_out/
//!             └── PEPPAN.PEPPAN.gff
//! ```
//!
//! The annotation lines of the reference strain link every pangenome tag (inside
//! `ortholog_group:`) to the reference tag (`old_locus_tag=`).

pub mod essential;

#[cfg(test)]
mod tests;

use crate::utils;
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

/// Suffix of the core gene list in each species folder.
pub const CORE_LIST_SUFFIX: &str = "_core_peppan_gene_locuses.txt";
/// Pangenome annotation, relative to the peppan folder.
pub const ANNOTATION: &str = "PEPPAN.PEPPAN.gff";

// ----------------------------------------------------------------------------
// Entries

/// Which ortholog group entries of an annotation line contribute to the map.
#[derive(Clone, Copy, Debug, Default, Deserialize, EnumIter, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Entries {
    /// Every entry of the ortholog group, with or without a reference tag.
    #[default]
    All,
    /// Only the first entry, and only when the line has a reference tag.
    First,
}

impl std::fmt::Display for Entries {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}

impl FromStr for Entries {
    type Err = Report;

    fn from_str(text: &str) -> Result<Self, Report> {
        Entries::iter().find(|e| e.to_string() == text.to_lowercase()).ok_or_else(|| {
            eyre!("Unknown entries mode: {text:?}")
                .suggestion(format!("Options: {}", Entries::iter().join(", ")))
        })
    }
}

// ----------------------------------------------------------------------------
// Species Configuration

/// A species folder and the strain id of its reference genome.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SpeciesReference {
    /// Folder name (ex. Suis).
    pub name: String,
    /// Prefix of the reference strain's annotation lines (ex. Suis_P17).
    pub reference: String,
}

impl SpeciesReference {
    pub fn new(name: &str, reference: &str) -> Self {
        SpeciesReference { name: name.to_string(), reference: reference.to_string() }
    }
}

/// Species processed by [`map`], in order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SpeciesConfig {
    #[serde(default)]
    pub entries: Entries,
    pub species: Vec<SpeciesReference>,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeciesConfig {
    /// The species of the thesis, with their reference strains.
    pub fn new() -> Self {
        let species = [
            ("Agalactiae", "Agal_01173"),
            ("Iniae", "Iniae_GCF_000300915"),
            ("All", "Uberis_0140J"),
            ("Equi", "Equi_4047"),
            ("Pneumo", "Pneumo_TIGR4"),
            ("Suis", "Suis_P17"),
            ("Uberis", "Uberis_0140J"),
        ]
        .into_iter()
        .map(|(name, reference)| SpeciesReference::new(name, reference))
        .collect();
        SpeciesConfig { entries: Entries::default(), species }
    }

    /// Read a [`SpeciesConfig`] from a JSON file.
    pub fn read<P>(path: &P) -> Result<SpeciesConfig, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read species config: {path:?}."))?;
        let config = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize species config: {input}"))?;
        Ok(config)
    }

    /// Write a [`SpeciesConfig`] to a JSON file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        utils::create_parent_dir(path)?;
        let output = serde_json::to_string_pretty(self)
            .wrap_err(format!("Failed to serialize species config: {self:?}"))?;
        std::fs::write(path, output).wrap_err(format!("Failed to write species config: {path:?}"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Arguments

/// Arguments for mapping core pangenome tags to reference tags.
#[derive(Clone, Debug, Parser)]
#[clap(verbatim_doc_comment)]
pub struct MapArgs {
    /// Directory above the species folders.
    #[clap(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,

    /// Species folder and reference strain pairs, comma separated (ex. Suis=Suis_P17).
    ///
    /// Replaces the species of the config.
    #[clap(short = 's', long, value_delimiter = ',')]
    pub species: Vec<String>,

    /// JSON species config.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Ortholog group entries to map, overrides the config.
    #[clap(short = 'e', long, value_enum)]
    pub entries: Option<Entries>,

    /// Write the species config that was used to this JSON file.
    #[clap(long)]
    pub write_config: Option<PathBuf>,
}

impl Default for MapArgs {
    fn default() -> Self {
        MapArgs::new()
    }
}

impl MapArgs {
    pub fn new() -> Self {
        MapArgs {
            directory: PathBuf::from("."),
            species: Vec::new(),
            config: None,
            entries: None,
            write_config: None,
        }
    }

    /// Combine the config file, species pairs, and entries mode into one config.
    pub fn to_config(&self) -> Result<SpeciesConfig, Report> {
        let mut config = match &self.config {
            Some(path) => SpeciesConfig::read(path)?,
            None => SpeciesConfig::new(),
        };
        if !self.species.is_empty() {
            config.species = self
                .species
                .iter()
                .map(|pair| {
                    let (name, reference) = utils::parse_key_value(pair)?;
                    Ok(SpeciesReference { name, reference })
                })
                .collect::<Result<_, Report>>()?;
        }
        if let Some(entries) = self.entries {
            config.entries = entries;
        }
        Ok(config)
    }
}

// ----------------------------------------------------------------------------
// Locus Tag Map

/// Map of pangenome tag to (nullable) reference tag, in first insertion order.
///
/// Inserting an existing key replaces its value but keeps its position.
///
/// ```rust
/// use strepcore::tags::LocusTagMap;
///
/// let mut map = LocusTagMap::new();
/// map.insert("RS001", Some("SSU0001"));
/// map.insert("RS002", None);
/// map.insert("RS001", Some("SSU0009"));
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get("RS001"), Some(Some("SSU0009")));
/// assert_eq!(map.get("RS002"), Some(None));
/// assert_eq!(map.get("RS003"), None);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LocusTagMap {
    entries: Vec<(String, Option<String>)>,
    index: HashMap<String, usize>,
}

impl LocusTagMap {
    pub fn new() -> Self {
        LocusTagMap { entries: Vec::new(), index: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, new_tag: &str, old_tag: Option<&str>) {
        let old_tag = old_tag.map(String::from);
        match self.index.get(new_tag) {
            Some(i) => self.entries[*i].1 = old_tag,
            None => {
                self.index.insert(new_tag.to_string(), self.entries.len());
                self.entries.push((new_tag.to_string(), old_tag));
            }
        }
    }

    /// `None` if the key is absent, `Some(None)` if it maps to no reference tag.
    pub fn get(&self, new_tag: &str) -> Option<Option<&str>> {
        self.index.get(new_tag).map(|i| self.entries[*i].1.as_deref())
    }

    /// Every key mapped to this reference tag, in insertion order.
    pub fn keys_with_value(&self, old_tag: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, value)| value.as_deref() == Some(old_tag))
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

/// Regular expressions over annotation lines.
struct Patterns {
    old_tag: Regex,
    ortholog_group: Regex,
    group_tag: Regex,
    first_tag: Regex,
}

impl Patterns {
    fn new() -> Result<Self, Report> {
        Ok(Patterns {
            old_tag: Regex::new(r"old_locus_tag=([^;\n:]+)")?,
            ortholog_group: Regex::new(r"ortholog_group:([^;]+)")?,
            group_tag: Regex::new(r":([^:]+):")?,
            first_tag: Regex::new(r"ortholog_group:[^:]+:([^:;\n]+)")?,
        })
    }
}

/// Build the map of pangenome tag to reference tag from the text of an annotation.
///
/// Only lines starting with the `reference` strain id contribute.
pub fn parse_annotation(text: &str, reference: &str, entries: Entries) -> Result<LocusTagMap, Report> {
    let patterns = Patterns::new()?;
    let mut map = LocusTagMap::new();

    for line in text.lines().filter(|line| line.starts_with(reference)) {
        let old_tag = patterns.old_tag.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str());

        match entries {
            Entries::All => {
                let Some(group) = patterns.ortholog_group.captures(line).and_then(|c| c.get(1))
                else {
                    continue;
                };
                // restore the prefix cut off by the split
                let parts = group.as_str().split(",GCF_").enumerate().map(|(i, part)| {
                    if i == 0 {
                        part.to_string()
                    } else {
                        format!("GCF_{part}")
                    }
                });
                for part in parts {
                    if let Some(new_tag) = patterns.group_tag.captures(&part).and_then(|c| c.get(1)) {
                        map.insert(new_tag.as_str(), old_tag);
                    }
                }
            }
            Entries::First => {
                let new_tag = patterns.first_tag.captures(line).and_then(|c| c.get(1));
                if let (Some(new_tag), Some(old_tag)) = (new_tag, old_tag) {
                    map.insert(new_tag.as_str(), Some(old_tag));
                }
            }
        }
    }

    Ok(map)
}

// ----------------------------------------------------------------------------
// Resolution

/// Core pangenome tags resolved against a [`LocusTagMap`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Resolution {
    /// Number of core list lines, blank lines included.
    pub core_tags: usize,
    /// Number of core tags present in the map, with or without a reference tag.
    pub mapped_entries: usize,
    /// Unique reference tags of the core tags, sorted.
    pub resolved: BTreeSet<String>,
    /// Core tags absent from the map or without a reference tag, in core list order.
    /// Blank lines are not reported.
    pub not_found: Vec<String>,
    /// Reference tags reached from more than one core tag, with every key mapped to them.
    pub duplicates: Vec<(String, Vec<String>)>,
}

/// Resolve the core tags against the map.
pub fn resolve(map: &LocusTagMap, core_tags: &[String]) -> Resolution {
    let mapped = core_tags.iter().filter_map(|tag| map.get(tag)).collect_vec();
    let old_tags = mapped.iter().filter_map(|old_tag| *old_tag).collect_vec();

    let duplicates = old_tags
        .iter()
        .counts()
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(old_tag, _)| *old_tag)
        // keep first occurrence order
        .sorted_by_key(|old_tag| old_tags.iter().position(|t| t == old_tag))
        .map(|old_tag| {
            let keys = map.keys_with_value(old_tag).into_iter().map(String::from).collect();
            (old_tag.to_string(), keys)
        })
        .collect();

    let not_found = core_tags
        .iter()
        .filter(|tag| !tag.is_empty() && map.get(tag).flatten().is_none())
        .cloned()
        .collect();

    Resolution {
        core_tags: core_tags.len(),
        mapped_entries: mapped.len(),
        resolved: old_tags.iter().map(|t| t.to_string()).collect(),
        not_found,
        duplicates,
    }
}

/// Read a core tag list, one tag per line with quotes stripped.
///
/// Blank lines are kept as empty tags so that they count as core list lines.
pub fn read_core_tags<P>(path: &P) -> Result<Vec<String>, Report>
where
    P: AsRef<Path> + Debug,
{
    let tags = utils::read_lines(path)?
        .into_iter()
        .map(|line| line.trim_matches(|c| c == '"' || c == '\r' || c == '\n').to_string())
        .collect();
    Ok(tags)
}

/// Find the first file ending in [`CORE_LIST_SUFFIX`], searching each directory in order.
pub fn find_core_list(dirs: &[&Path]) -> Result<Option<PathBuf>, Report> {
    for dir in dirs {
        let found = std::fs::read_dir(dir)
            .wrap_err_with(|| eyre!("Unable to read folder: {dir:?}"))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.ends_with(CORE_LIST_SUFFIX))
                        .unwrap_or(false)
            })
            .sorted()
            .next();
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

/// Resolve the core tags of one species folder, writing the results into it.
pub fn map_species(
    directory: &Path,
    species: &SpeciesReference,
    entries: Entries,
) -> Result<Resolution, Report> {
    println!("Processing species {} and mapping peppan and reference locus tags...", species.name);

    let species_dir = directory.join(&species.name);
    if !species_dir.exists() {
        return Err(eyre!("Can not find {} species folder: {species_dir:?}", species.name)
            .suggestion("Run from the directory above the species folders, or set --directory."));
    }
    let peppan_dir = species_dir.join("annotated_genomes").join("peppan_out");
    if !peppan_dir.exists() {
        return Err(eyre!(
            "Can not find the peppan output folder at {peppan_dir:?} for the species {}",
            species.name
        ));
    }

    let core_list = find_core_list(&[&species_dir, &peppan_dir])?.ok_or_else(|| {
        eyre!("No *{CORE_LIST_SUFFIX} file found for the species {}", species.name)
            .suggestion("Did you forget to generate the core gene list?")
    })?;
    debug!("Core gene list: {core_list:?}");

    let annotation = utils::read_to_string(&peppan_dir.join(ANNOTATION))?;
    let map = parse_annotation(&annotation, &species.reference, entries)?;
    if map.is_empty() {
        warn!("No annotation lines start with the reference strain: {}", species.reference);
    }
    println!("Entries in species_specific_mapping (Full data dictionary): {}", map.len());

    let core_tags = read_core_tags(&core_list)?;
    let resolution = resolve(&map, &core_tags);

    println!("Number of lines in core_peppan_gene_locuses_txt: {}", resolution.core_tags);
    println!("Entries in core_genes_species_old_tags: {}", resolution.mapped_entries);
    println!("Number of duplicate old_locus_tags: {}", resolution.duplicates.len());
    println!("Entries in new_tags_not_found: {}", resolution.not_found.len());
    println!("Entries in unique_core_genes_old_tags: {}", resolution.resolved.len());

    let path = species_dir.join(format!("core_{}_locus_tags.txt", species.name));
    utils::write_lines(&path, &resolution.resolved)?;
    let path = species_dir.join("peppan_locus_tags_not_found.txt");
    utils::write_lines(&path, &resolution.not_found)?;
    let path = species_dir.join("duplicate_tags_found.txt");
    let duplicates = resolution
        .duplicates
        .iter()
        .map(|(old_tag, keys)| {
            std::iter::once(old_tag).chain(keys).map(|tag| format!("{tag}\t")).join("")
        });
    utils::write_lines(&path, duplicates)?;
    info!("Wrote locus tags to: {species_dir:?}");

    Ok(resolution)
}

/// Resolve the core tags of every configured species.
pub fn map(args: &MapArgs) -> Result<Vec<(String, Resolution)>, Report> {
    let config = args.to_config()?;
    if let Some(path) = &args.write_config {
        info!("Writing species config: {path:?}");
        config.write(path)?;
    }

    config
        .species
        .iter()
        .map(|species| {
            let resolution = map_species(&args.directory, species, config.entries)?;
            println!();
            Ok((species.name.clone(), resolution))
        })
        .collect()
}
