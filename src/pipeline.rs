//! File-level pipeline: read -> clean -> load table -> transliterate ->
//! write streams -> analyse -> discover -> report.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cleaner::clean_transcription;
use crate::dictionary::ReferenceVocabulary;
use crate::error::RemapError;
use crate::fuzzy::FuzzyMatcher;
use crate::mapping::{LoadedTable, MappingTable};
use crate::report::{render_analysis, render_discovery};
use crate::stats::{Corpus, analyze};
use crate::tokenizer::{TranslitConfig, transliterate};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mapping: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub codes: PathBuf,
    pub report: Option<PathBuf>,
    /// Folder of reference texts for corpus discovery.
    pub corpus: Option<PathBuf>,
    /// Folder of Hunspell `.aff`/`.dic` pairs.
    pub dictionaries: Option<PathBuf>,
    /// Run the transcription cleaner on the input first.
    pub clean: bool,
    /// Entries per table in the report.
    pub top: usize,
    pub translit: TranslitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mapping: PathBuf::from("mapping.txt"),
            input: PathBuf::from("v101_cleaned.txt"),
            output: PathBuf::from("output.txt"),
            codes: PathBuf::from("output_numbers.txt"),
            report: None,
            corpus: None,
            dictionaries: None,
            clean: false,
            top: 50,
            translit: TranslitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    pub rules: usize,
    pub warnings: usize,
    pub tokens: usize,
    pub misses: usize,
    pub words: usize,
    pub entropy: f64,
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
}

pub fn read_file(path: &Path) -> Result<String, RemapError> {
    fs::read_to_string(path).map_err(|e| RemapError::read(path, e))
}

/// Write through a temporary sibling and rename, so a failed write never
/// leaves a truncated file under the final name.
pub fn write_file(path: &Path, content: &str) -> Result<(), RemapError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RemapError::write(parent, e))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".partial");
    let tmp = PathBuf::from(tmp);

    let written = fs::write(&tmp, content).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(RemapError::write(path, e));
    }
    Ok(())
}

/// Load a mapping table, logging its warnings and tier summary.
pub fn load_table(path: &Path) -> Result<LoadedTable, RemapError> {
    let text = read_file(path)?;
    let loaded = MappingTable::parse(&text);
    for warning in &loaded.warnings {
        eprintln!("{}: {}", path.display(), warning);
    }
    let tiers: Vec<String> = loaded
        .table
        .summary()
        .iter()
        .map(|(tier, n)| format!("{tier}={n}"))
        .collect();
    eprintln!(
        "Loaded {} rules from {} ({}), max token width {}",
        loaded.rules,
        path.display(),
        tiers.join(", "),
        loaded.table.max_token_len()
    );
    Ok(loaded)
}

pub fn run(config: &PipelineConfig) -> Result<PipelineSummary, RemapError> {
    let raw = read_file(&config.input)?;
    let loaded = load_table(&config.mapping)?;

    let input = if config.clean {
        let (cleaned, removed) = clean_transcription(&raw);
        eprintln!("Cleaned {}: {} removals", config.input.display(), removed);
        cleaned
    } else {
        raw
    };

    let result = transliterate(&loaded.table, &config.translit, &input);
    write_file(&config.output, &result.text())?;
    write_file(&config.codes, &result.codes())?;
    eprintln!("Output : {}", config.output.display());
    eprintln!("Codes  : {}", config.codes.display());

    let corpus = Corpus::from_transliteration(&result);
    let analysis = analyze(&corpus);
    let mut summary = PipelineSummary {
        rules: loaded.rules,
        warnings: loaded.warnings.len(),
        tokens: result.tokens().count(),
        misses: result.misses(),
        words: analysis.words,
        entropy: analysis.entropy,
        ..PipelineSummary::default()
    };

    let mut report = render_analysis(&analysis, config.top);

    if let Some(dir) = &config.corpus {
        let mut vocab = ReferenceVocabulary::load_dir(dir)?;
        if let Some(dicts) = &config.dictionaries {
            vocab = vocab.with_hunspell(dicts);
        }
        eprintln!("{}", vocab.stats());
        let discovery = FuzzyMatcher::new(&vocab).discover(&corpus);
        summary.exact_matches = discovery.exact.len();
        summary.fuzzy_matches = discovery.fuzzy.len();
        report.push_str(&render_discovery(vocab.sources(), &discovery, config.top));
    }

    if let Some(path) = &config.report {
        write_file(path, &report)?;
        eprintln!("Report : {}", path.display());
    }

    Ok(summary)
}

/// Analyse an already written output file.
pub fn analyze_file(path: &Path, config: &TranslitConfig, top: usize) -> Result<String, RemapError> {
    let text = read_file(path)?;
    let corpus = Corpus::from_text(&text, &config.format);
    Ok(render_analysis(&analyze(&corpus), top))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_creates_parents_and_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_file(&path, "o_o").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "o_o");
        assert!(!dir.path().join("nested/out.txt.partial").exists());
    }

    #[test]
    fn test_missing_input_is_configuration_error() {
        let config = PipelineConfig {
            input: PathBuf::from("definitely/not/here.txt"),
            ..PipelineConfig::default()
        };
        assert!(matches!(run(&config), Err(RemapError::Configuration { .. })));
    }

    #[test]
    fn test_load_table_reports_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.txt");
        fs::write(&path, ") comment\n4=o~o\n5=k~c@\nbroken~line=x\n").unwrap();
        let loaded = load_table(&path).unwrap();
        assert_eq!(loaded.rules, 2);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.table.contains_token("k"));
        assert_eq!(loaded.table.max_token_len(), 1);
    }
}
