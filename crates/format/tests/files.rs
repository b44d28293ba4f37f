use std::fs;

use phylevo_format::{read_alignment, read_config, to_newick, write_config, FormatError};
use phylevo_sim::simulation::{Configuration, SimulationBuilder};
use tempfile::tempdir;

#[test]
fn test_read_line_format_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("primates.txt");
    fs::write(&path, "3\nhomo ACGTAC\npan ACGTAA\ngorilla ACCTAA\n").unwrap();

    let alignment = read_alignment(&path).unwrap();
    assert_eq!(alignment.num_species(), 3);
    assert_eq!(alignment.sequence_len(), 6);
}

#[test]
fn test_read_fasta_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("primates.fa");
    fs::write(&path, ">homo\nACG\nTAC\n>pan\nACGTAA\n>gorilla\nACCTAA\n").unwrap();

    let alignment = read_alignment(&path).unwrap();
    assert_eq!(
        alignment.species_names().collect::<Vec<_>>(),
        vec!["homo", "pan", "gorilla"]
    );
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let err = read_alignment(&path).unwrap_err();
    assert!(matches!(err, FormatError::Io { .. }));
    assert!(err.to_string().contains("absent.txt"));
}

#[test]
fn test_config_roundtrip_both_layouts() {
    let dir = tempdir().unwrap();
    let mut config = Configuration::default();
    config.execution.population_size = 30;
    config.execution.seed = Some(7);
    config.mutation.crossover_prob = 0.4;

    for name in ["run.json", "run.properties"] {
        let path = dir.path().join(name);
        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config, "{name}");
    }

    let json = fs::read_to_string(dir.path().join("run.json")).unwrap();
    assert!(json.contains("\"population_size\": 30"));
    let props = fs::read_to_string(dir.path().join("run.properties")).unwrap();
    assert!(props.contains("ga.algo.params.population.count=30,int"));
}

#[test]
fn test_read_config_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    let mut config = Configuration::default();
    config.mutation.topology_rate = 1.5;
    fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    assert!(matches!(read_config(&path), Err(FormatError::Config(_))));
}

#[test]
fn test_best_tree_renders_as_newick() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("aln.txt");
    fs::write(&path, "4\na ACGTACGT\nb ACGTACGA\nc TCGTACGA\nd TCGAACGA\n").unwrap();
    let alignment = read_alignment(&path).unwrap();

    let mut sim = SimulationBuilder::new()
        .alignment(alignment)
        .population_size(12)
        .generations(5)
        .seed(3)
        .build()
        .unwrap();
    let summary = sim.run().unwrap();

    let newick = to_newick(&summary.best_tree).unwrap();
    assert!(newick.starts_with('('));
    assert!(newick.ends_with(");"));
    for species in ["a", "b", "c", "d"] {
        assert_eq!(newick.matches(species).count(), 1, "{newick}");
    }
    assert_eq!(newick.matches(':').count(), 6);
}
