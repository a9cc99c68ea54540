use atlantic_climate_index::cli::{Cli, Commands};
use atlantic_climate_index::config::{IndexConfig, IndexFormat};
use atlantic_climate_index::models::{LocationIndex, Province};
use atlantic_climate_index::processors::IndexBuilder;
use atlantic_climate_index::readers::{FsCorpus, ZipCorpus};
use atlantic_climate_index::{IndexError, RejectionReason};
use chrono::NaiveDate;
use clap::Parser;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FREDERICTON: &str = "\
Date/Time,Station Name,Max Temp (°C),Min Temp (°C),Total Precip (mm)
2020-01-01,FREDERICTON A,-3.1,-12.0,0.0
2020-06-15,FREDERICTON A,24.5,11.2,3.4
2020-12-31,FREDERICTON A,0.5,-8.9,1.2
";

const HALIFAX: &str = "\
date,max_temp,min_temp,precipitation
2019-03-01,2.0,-4.0,0.0
2019-01-01,1.0,-5.0,
2019-02-01,3.0,-1.0,2.0
";

fn write_file(root: &Path, province: &str, name: &str, contents: &[u8]) {
    let dir = root.join(province);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

fn sample_corpus() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let root = temp.path();
    write_file(root, "NB", "Fredericton.csv", FREDERICTON.as_bytes());
    write_file(root, "NS", "Halifax.csv", HALIFAX.as_bytes());
    fs::create_dir_all(root.join("NL")).unwrap();
    fs::create_dir_all(root.join("PEI")).unwrap();
    temp
}

fn config_for(corpus: &Path, output: &Path) -> IndexConfig {
    IndexConfig::default()
        .with_corpus_root(corpus)
        .with_output_path(output)
        .with_max_workers(2)
}

fn generate(corpus: &Path, output: &Path) -> atlantic_climate_index::Result<()> {
    let config = config_for(corpus, output);
    let source = FsCorpus::open(corpus)?;
    IndexBuilder::new(config)?.build_and_write(&source, None)?;
    Ok(())
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_fetcher_columns_end_to_end() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");

    generate(corpus.path(), &output).unwrap();
    let index = LocationIndex::load(&output).unwrap();

    assert_eq!(index.len(), 2);
    let fredericton = &index.locations()[0];
    assert_eq!(fredericton.province, Province::NewBrunswick);
    assert_eq!(fredericton.location_id, "Fredericton");
    assert_eq!(fredericton.display_name, "FREDERICTON A");
    assert_eq!(fredericton.file, "climate_data/NB/Fredericton.csv");
    assert_eq!(fredericton.date_range.earliest(), date("2020-01-01"));
    assert_eq!(fredericton.date_range.latest(), date("2020-12-31"));
    assert_eq!(
        fredericton.available_fields,
        vec!["Max Temp (°C)", "Min Temp (°C)", "Total Precip (mm)"]
    );

    let halifax = &index.locations()[1];
    assert_eq!(halifax.province, Province::NovaScotia);
    assert_eq!(halifax.display_name, "Halifax");
    assert_eq!(halifax.date_range.earliest(), date("2019-01-01"));
    assert_eq!(halifax.date_range.latest(), date("2019-03-01"));
    assert_eq!(halifax.observations, 3);
    assert_eq!(
        halifax.available_fields,
        vec!["max_temp", "min_temp", "precipitation"]
    );
}

#[test]
fn test_two_location_corpus_end_to_end() {
    let corpus = TempDir::new().unwrap();
    write_file(
        corpus.path(),
        "NB",
        "Fredericton.csv",
        b"date,max_temp,min_temp,precip\n\
2020-01-01,-3.0,-12.5,0.0\n\
2020-01-02,-1.5,-9.0,2.4\n\
2020-01-03,0.5,-6.0,1.1\n",
    );
    write_file(
        corpus.path(),
        "NS",
        "Halifax.csv",
        b"date,max_temp\n2019-06-01,18.2\n2019-06-02,21.7\n",
    );
    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");

    generate(corpus.path(), &output).unwrap();
    let index = LocationIndex::load(&output).unwrap();

    let summary: Vec<(Province, &str, NaiveDate, NaiveDate, Vec<&str>)> = index
        .iter()
        .map(|r| {
            (
                r.province,
                r.location_id.as_str(),
                r.date_range.earliest(),
                r.date_range.latest(),
                r.available_fields.iter().map(String::as_str).collect(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                Province::NewBrunswick,
                "Fredericton",
                date("2020-01-01"),
                date("2020-01-03"),
                vec!["max_temp", "min_temp", "precip"],
            ),
            (
                Province::NovaScotia,
                "Halifax",
                date("2019-06-01"),
                date("2019-06-02"),
                vec!["max_temp"],
            ),
        ]
    );
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();
    let first = out.path().join("first.json");
    let second = out.path().join("second.json");

    generate(corpus.path(), &first).unwrap();

    // Add an unrelated file and a sequential run; output must not change
    write_file(corpus.path(), "NS", "README.txt", b"not data");
    let config = config_for(corpus.path(), &second).with_max_workers(1);
    let source = FsCorpus::open(corpus.path()).unwrap();
    IndexBuilder::new(config)
        .unwrap()
        .build_and_write(&source, None)
        .unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_written_index_round_trips() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");

    let config = config_for(corpus.path(), &output);
    let source = FsCorpus::open(corpus.path()).unwrap();
    let build = IndexBuilder::new(config)
        .unwrap()
        .build_and_write(&source, None)
        .unwrap();

    assert_eq!(LocationIndex::load(&output).unwrap(), build.index);
}

#[test]
fn test_index_is_sorted_by_province_then_location() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for (province, name) in [
        ("PEI", "Summerside.csv"),
        ("NS", "Yarmouth.csv"),
        ("NS", "Amherst.csv"),
        ("NL", "Gander.csv"),
        ("NB", "Saint_John.csv"),
        ("NB", "Bathurst.csv"),
    ] {
        write_file(root, province, name, b"date,max_temp\n2021-05-05,10.0\n");
    }

    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");
    generate(root, &output).unwrap();

    let index = LocationIndex::load(&output).unwrap();
    let keys: Vec<(Province, String)> = index
        .iter()
        .map(|r| (r.province, r.location_id.clone()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(keys[0], (Province::NewBrunswick, "Bathurst".to_string()));
    assert_eq!(index.get(Province::NewBrunswick, "Saint_John").unwrap().display_name, "Saint John");
}

#[test]
fn test_rejected_files_are_excluded_and_reported() {
    let corpus = sample_corpus();
    let root = corpus.path();
    write_file(root, "NS", "HeaderOnly.csv", b"date,max_temp\n");
    write_file(root, "NS", "Empty.csv", b"");
    write_file(root, "NS", "BadDates.csv", b"date,max_temp\nyesterday,1.0\nsoon,2.0\n");
    write_file(root, "PEI", "Binary.csv", &[0x50, 0x4b, 0x03, 0x04, 0x00, 0x00, 0xff]);
    write_file(root, "QC", "Montreal.csv", b"date,max_temp\n2020-01-01,1.0\n");

    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");
    let config = config_for(root, &output);
    let source = FsCorpus::open(root).unwrap();
    let build = IndexBuilder::new(config)
        .unwrap()
        .build_and_write(&source, None)
        .unwrap();

    assert_eq!(build.index.len(), 2);
    assert!(build.index.iter().all(|r| r.location_id == "Fredericton" || r.location_id == "Halifax"));

    let reasons: Vec<(String, RejectionReason)> = build
        .report
        .rejections
        .iter()
        .map(|r| (r.file.clone(), r.reason.clone()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("NS/BadDates.csv".to_string(), RejectionReason::NoValidDates { rows: 2 }),
            ("NS/Empty.csv".to_string(), RejectionReason::MissingHeader),
            ("NS/HeaderOnly.csv".to_string(), RejectionReason::NoDataRows),
            ("PEI/Binary.csv".to_string(), RejectionReason::NotCsv),
        ]
    );
    assert_eq!(build.report.skipped_directories.len(), 1);
    assert_eq!(build.report.skipped_directories[0].name, "QC");
    assert!(build.report.summary().contains("NS/Empty.csv"));
}

#[test]
fn test_failed_build_keeps_previous_index() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");

    generate(corpus.path(), &output).unwrap();
    let previous = fs::read(&output).unwrap();

    // A corpus whose every file is rejected must not replace the good index
    let broken = TempDir::new().unwrap();
    write_file(broken.path(), "NB", "Empty.csv", b"date,max_temp\n");
    let result = generate(broken.path(), &output);

    assert!(matches!(result, Err(IndexError::EmptyIndex { rejected: 1 })));
    assert_eq!(fs::read(&output).unwrap(), previous);

    let stray: Vec<PathBuf> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p != &output)
        .collect();
    assert!(stray.is_empty(), "unexpected files: {:?}", stray);
}

#[test]
fn test_empty_corpus_writes_nothing() {
    let corpus = TempDir::new().unwrap();
    for province in ["NB", "NL", "NS", "PEI"] {
        fs::create_dir_all(corpus.path().join(province)).unwrap();
    }
    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");

    let result = generate(corpus.path(), &output);
    assert!(matches!(result, Err(IndexError::EmptyIndex { rejected: 0 })));
    assert!(!output.exists());
}

#[test]
fn test_missing_corpus_root_is_fatal() {
    let out = TempDir::new().unwrap();
    let missing = out.path().join("no_such_corpus");
    assert!(matches!(
        FsCorpus::open(&missing),
        Err(IndexError::CorpusRoot { .. })
    ));
}

#[test]
fn test_zip_corpus_matches_directory_corpus() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();

    let zip_path = out.path().join("climate_data.zip");
    {
        let file = fs::File::create(&zip_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        zip.add_directory("climate_data/", options).unwrap();
        zip.start_file("climate_data/NB/Fredericton.csv", options).unwrap();
        zip.write_all(FREDERICTON.as_bytes()).unwrap();
        zip.start_file("climate_data/NS/Halifax.csv", options).unwrap();
        zip.write_all(HALIFAX.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    let from_dir = IndexBuilder::new(config_for(corpus.path(), &out.path().join("a.json")))
        .unwrap()
        .build(&FsCorpus::open(corpus.path()).unwrap(), None)
        .unwrap();
    let from_zip = IndexBuilder::new(config_for(&zip_path, &out.path().join("b.json")))
        .unwrap()
        .build(&ZipCorpus::open(&zip_path).unwrap(), None)
        .unwrap();

    assert_eq!(from_dir.index, from_zip.index);
}

#[test]
fn test_manifest_format() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();
    let output = out.path().join("locations.json");

    let config = config_for(corpus.path(), &output).with_format(IndexFormat::Manifest);
    let source = FsCorpus::open(corpus.path()).unwrap();
    IndexBuilder::new(config)
        .unwrap()
        .build_and_write(&source, None)
        .unwrap();

    let manifest: serde_json::Value = serde_json::from_slice(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(
        manifest,
        serde_json::json!({
            "NB": [{"label": "FREDERICTON A", "file": "climate_data/NB/Fredericton.csv"}],
            "NS": [{"label": "Halifax", "file": "climate_data/NS/Halifax.csv"}]
        })
    );
}

#[test]
fn test_station_lookup_supplies_coordinates() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();
    let stations = out.path().join("stations.csv");
    fs::write(
        &stations,
        "province,location_id,latitude,longitude,name\nNS,Halifax,44.88,-63.51,Halifax Stanfield\n",
    )
    .unwrap();

    let config = config_for(corpus.path(), &out.path().join("locations.json"))
        .with_stations_file(&stations);
    let build = IndexBuilder::new(config)
        .unwrap()
        .build(&FsCorpus::open(corpus.path()).unwrap(), None)
        .unwrap();

    let halifax = build.index.get(Province::NovaScotia, "Halifax").unwrap();
    let coordinates = halifax.coordinates.as_ref().unwrap();
    assert_eq!(coordinates.latitude, 44.88);
    assert_eq!(coordinates.longitude, -63.51);
    assert_eq!(halifax.display_name, "Halifax Stanfield");

    let fredericton = build.index.get(Province::NewBrunswick, "Fredericton").unwrap();
    assert!(fredericton.coordinates.is_none());
}

#[test]
fn test_province_selection() {
    let corpus = sample_corpus();
    let out = TempDir::new().unwrap();
    let config = config_for(corpus.path(), &out.path().join("locations.json"))
        .with_provinces(vec![Province::NovaScotia]);

    let build = IndexBuilder::new(config)
        .unwrap()
        .build(&FsCorpus::open(corpus.path()).unwrap(), None)
        .unwrap();

    assert_eq!(build.index.len(), 1);
    assert_eq!(build.index.counts_by_province()[&Province::NewBrunswick], 0);
}

#[test]
fn test_cli_parses_generate_options() {
    let cli = Cli::try_parse_from([
        "climate-index",
        "--verbose",
        "generate",
        "--corpus-root",
        "data",
        "--output",
        "public/locations.json",
        "--format",
        "manifest",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.resolved_command() {
        Commands::Generate(args) => {
            assert_eq!(args.corpus_root, Some(PathBuf::from("data")));
            assert_eq!(args.output, Some(PathBuf::from("public/locations.json")));
            assert_eq!(args.format.as_deref(), Some("manifest"));
        }
        other => panic!("unexpected command {:?}", other),
    }
}
