use crate::tags::{self, essential, Entries, LocusTagMap, MapArgs, SpeciesConfig, SpeciesReference};
use color_eyre::eyre::{Report, Result};
use std::path::Path;
use std::str::FromStr;

const ANNOTATION: &str = "\
##gff-version 3
Suis_P17\tPEPPAN\tCDS\t1\t900\t.\t+\t0\tID=Suis_P17:00001;ortholog_group:Suis_GCF_1:RS001:1:900,GCF_2:RS101:1:900;old_locus_tag=SSU0001;product=dnaA
Suis_P17\tPEPPAN\tCDS\t950\t1500\t.\t+\t0\tID=Suis_P17:00002;ortholog_group:Suis_GCF_1:RS002:950:1500;old_locus_tag=SSU0002
Suis_P17\tPEPPAN\tCDS\t1600\t2000\t.\t-\t0\tID=Suis_P17:00003;ortholog_group:Suis_GCF_1:RS003:1600:2000
Suis_P17\tPEPPAN\tCDS\t2100\t2400\t.\t-\t0\tID=Suis_P17:00004;ortholog_group:Suis_GCF_1:RS004:2100:2400;old_locus_tag=SSU0002
Suis_BM407\tPEPPAN\tCDS\t1\t900\t.\t+\t0\tID=Suis_BM407:00001;ortholog_group:Suis_GCF_9:RS901:1:900;old_locus_tag=SSUBM0001
";

#[test]
fn entries_from_str() -> Result<(), Report> {
    assert_eq!(Entries::from_str("first")?, Entries::First);
    assert_eq!(Entries::from_str("ALL")?, Entries::All);
    assert_eq!(Entries::All.to_string(), "all");
    assert!(Entries::from_str("some").is_err());
    Ok(())
}

#[test]
fn locus_tag_map_overwrite_keeps_position() {
    let mut map = LocusTagMap::new();
    map.insert("RS001", Some("SSU0001"));
    map.insert("RS002", Some("SSU0002"));
    map.insert("RS003", Some("SSU0002"));
    map.insert("RS001", Some("SSU0002"));
    assert_eq!(map.keys_with_value("SSU0002"), ["RS001", "RS002", "RS003"]);
    assert!(map.keys_with_value("SSU0001").is_empty());
}

#[test]
fn parse_annotation_all() -> Result<(), Report> {
    let map = tags::parse_annotation(ANNOTATION, "Suis_P17", Entries::All)?;
    assert_eq!(map.len(), 5);
    assert_eq!(map.get("RS001"), Some(Some("SSU0001")));
    // entries after the first keep their GCF_ prefix and are mapped too
    assert_eq!(map.get("RS101"), Some(Some("SSU0001")));
    assert_eq!(map.get("RS003"), Some(None));
    // other strains are ignored
    assert_eq!(map.get("RS901"), None);
    Ok(())
}

#[test]
fn parse_annotation_first() -> Result<(), Report> {
    let map = tags::parse_annotation(ANNOTATION, "Suis_P17", Entries::First)?;
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("RS001"), Some(Some("SSU0001")));
    assert_eq!(map.get("RS101"), None);
    assert_eq!(map.get("RS003"), None);
    assert_eq!(map.get("RS004"), Some(Some("SSU0002")));
    Ok(())
}

#[test]
fn resolve() -> Result<(), Report> {
    let map = tags::parse_annotation(ANNOTATION, "Suis_P17", Entries::All)?;
    let core = ["RS004", "RS001", "RS002", "RS003", "RS999"].map(String::from);
    let resolution = tags::resolve(&map, &core);

    assert_eq!(resolution.core_tags, 5);
    assert_eq!(resolution.mapped_entries, 4);
    assert_eq!(resolution.resolved.iter().collect::<Vec<_>>(), ["SSU0001", "SSU0002"]);
    assert_eq!(resolution.not_found, ["RS003", "RS999"]);
    assert_eq!(
        resolution.duplicates,
        [("SSU0002".to_string(), vec!["RS002".to_string(), "RS004".to_string()])]
    );
    Ok(())
}

#[test]
fn core_tags_blank_line() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("core_peppan_gene_locuses.txt");
    std::fs::write(&path, "\"RS001\"\n\nRS999\n")?;
    let core = tags::read_core_tags(&path)?;
    assert_eq!(core, ["RS001", "", "RS999"]);

    let map = tags::parse_annotation(ANNOTATION, "Suis_P17", Entries::All)?;
    let resolution = tags::resolve(&map, &core);
    assert_eq!(resolution.core_tags, 3);
    assert_eq!(resolution.mapped_entries, 1);
    assert_eq!(resolution.not_found, ["RS999"]);
    Ok(())
}

fn species_folder(root: &Path) -> Result<(), Report> {
    let peppan = root.join("Suis").join("annotated_genomes").join("peppan_out");
    std::fs::create_dir_all(&peppan)?;
    std::fs::write(peppan.join(tags::ANNOTATION), ANNOTATION)?;
    std::fs::write(
        root.join("Suis").join("suis_core_peppan_gene_locuses.txt"),
        "\"RS001\"\nRS002\n\nRS004\nRS003\n",
    )?;
    Ok(())
}

#[test]
fn map() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    species_folder(dir.path())?;
    let config = dir.path().join("species.json");

    let args = MapArgs {
        directory: dir.path().to_path_buf(),
        species: vec!["Suis=Suis_P17".to_string()],
        write_config: Some(config.clone()),
        ..Default::default()
    };
    let results = tags::map(&args)?;
    assert_eq!(results.len(), 1);
    // the blank line counts as a core list line
    assert_eq!(results[0].1.core_tags, 5);

    let suis = dir.path().join("Suis");
    assert_eq!(std::fs::read_to_string(suis.join("core_Suis_locus_tags.txt"))?, "SSU0001\nSSU0002\n");
    assert_eq!(std::fs::read_to_string(suis.join("peppan_locus_tags_not_found.txt"))?, "RS003\n");
    assert_eq!(
        std::fs::read_to_string(suis.join("duplicate_tags_found.txt"))?,
        "SSU0002\tRS002\tRS004\t\n"
    );

    let written = SpeciesConfig::read(&config)?;
    assert_eq!(written.species, [SpeciesReference::new("Suis", "Suis_P17")]);
    assert_eq!(written.entries, Entries::All);
    Ok(())
}

#[test]
fn map_missing_species() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let args = MapArgs {
        directory: dir.path().to_path_buf(),
        species: vec!["Equi=Equi_4047".to_string()],
        ..Default::default()
    };
    assert!(tags::map(&args).is_err());
    Ok(())
}

#[test]
fn map_missing_core_list() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    species_folder(dir.path())?;
    std::fs::remove_file(dir.path().join("Suis").join("suis_core_peppan_gene_locuses.txt"))?;
    let args = MapArgs {
        directory: dir.path().to_path_buf(),
        species: vec!["Suis=Suis_P17".to_string()],
        ..Default::default()
    };
    assert!(tags::map(&args).is_err());
    Ok(())
}

#[test]
fn config_entries_default() -> Result<(), Report> {
    let config: SpeciesConfig =
        serde_json::from_str(r#"{"species": [{"name": "Equi", "reference": "Equi_4047"}]}"#)?;
    assert_eq!(config.entries, Entries::All);
    assert_eq!(SpeciesConfig::new().species.len(), 7);
    Ok(())
}

#[test]
fn essential_extract() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("insertions.tsv");
    std::fs::write(
        &input,
        "locus_tag\tgene\ttest_num_insertions_mapped_per_feat\nSSU0001\tdnaA\t0\nSSU0002\t\t12\nSSU0003\tgyrB\t0.0\n",
    )?;
    let args = essential::Args { input, output: dir.path().join("essential.txt") };
    let tags = essential::extract(&args)?;
    assert_eq!(tags, ["SSU0001", "SSU0003"]);
    assert_eq!(std::fs::read_to_string(&args.output)?, "SSU0001\nSSU0003\n");
    Ok(())
}

#[test]
fn essential_extract_skips_bad_counts() -> Result<(), Report> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("insertions.tsv");
    std::fs::write(
        &input,
        "locus_tag\ttest_num_insertions_mapped_per_feat\nSSU0001\t0\nSSU0002\tNA\nSSU0003\t0\nSSU0004\n",
    )?;
    let args = essential::Args { input, output: dir.path().join("essential.txt") };
    assert_eq!(essential::extract(&args)?, ["SSU0001", "SSU0003"]);
    Ok(())
}
