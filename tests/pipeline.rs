//! End-to-end runs of the file pipeline against temporary directories.

use std::fs;
use std::path::Path;

use rust_voynich_remap::{PipelineConfig, RemapError, analyze_file, run};
use tempfile::TempDir;

const MAPPING: &str = ") identity letters\n1=d~d\n2=a~a\n3=r~r\n4=o~o\n5=l~l\n";

fn setup(input: &str) -> (TempDir, PipelineConfig) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("mapping.txt"), MAPPING).unwrap();
    fs::write(root.join("v101_cleaned.txt"), input).unwrap();
    let config = PipelineConfig {
        mapping: root.join("mapping.txt"),
        input: root.join("v101_cleaned.txt"),
        output: root.join("out/output.txt"),
        codes: root.join("out/output_numbers.txt"),
        report: Some(root.join("out/report.txt")),
        ..PipelineConfig::default()
    };
    (dir, config)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_run_writes_both_streams() {
    let (_dir, config) = setup("dar.ol,dar\nol");
    let summary = run(&config).unwrap();

    assert_eq!(read(&config.output), "dar_ol-dar\nol");
    assert_eq!(read(&config.codes), ".1.2.3...4.5.,.1.2.3.\n4.5.");
    assert_eq!(summary.rules, 5);
    assert_eq!(summary.warnings, 0);
    assert_eq!(summary.tokens, 10);
    assert_eq!(summary.misses, 0);
    assert_eq!(summary.words, 4);
    assert_eq!(summary.exact_matches, 0);

    let report = read(config.report.as_deref().unwrap());
    assert!(report.starts_with("Words: 4\n"));
    assert!(report.contains("== Word frequency ==\n{ dar: 2, 50.00% }\n{ ol: 2, 50.00% }\n"));
    assert!(!report.contains("== Reference corpus =="));
}

#[test]
fn test_run_with_reference_corpus() {
    let (dir, mut config) = setup("dar.ol,dar\nol");
    let corpus = dir.path().join("corpus");
    fs::create_dir(&corpus).unwrap();
    fs::write(corpus.join("latin.txt"), "Dar ol dar").unwrap();
    config.corpus = Some(corpus);

    let summary = run(&config).unwrap();
    assert_eq!(summary.exact_matches, 1);
    assert_eq!(summary.fuzzy_matches, 0);

    let report = read(config.report.as_deref().unwrap());
    assert!(report.contains("latin.txt: 3 words"));
    assert!(report.contains("== Exact matches ==\n{ dar: 2, word }\n"));
    assert!(report.contains("== Fuzzy matches ==\n(none)\n"));
}

#[test]
fn test_run_cleans_input_on_request() {
    let (_dir, mut config) = setup("<f1r.P1.1;H>dar.ol=\r\nd<!x>ar");
    config.clean = true;
    run(&config).unwrap();
    assert_eq!(read(&config.output), "dar_ol\ndar");
}

#[test]
fn test_unmapped_characters_drop_out() {
    let (_dir, config) = setup("dqr.x");
    let summary = run(&config).unwrap();
    assert_eq!(read(&config.output), "dr_");
    assert_eq!(read(&config.codes), ".1..3....");
    assert_eq!(summary.misses, 2);
}

#[test]
fn test_empty_corpus_dir_is_an_error() {
    let (dir, mut config) = setup("dar");
    let corpus = dir.path().join("empty");
    fs::create_dir(&corpus).unwrap();
    config.corpus = Some(corpus);
    assert!(matches!(run(&config), Err(RemapError::EmptyCorpus { .. })));
}

#[test]
fn test_analyze_existing_output() {
    let (_dir, config) = setup("dar.ol,dar\nol");
    run(&config).unwrap();
    let text = analyze_file(&config.output, &config.translit, 5).unwrap();
    assert!(text.starts_with("Words: 4\nCharacters: 10 (5 distinct)\n"));
}
