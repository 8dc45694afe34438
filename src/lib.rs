//! Context-sensitive remapping of the v101 Voynich transcription.
//!
//! A rule table maps each transcription token to a table code and each code
//! to an output token, with separate tiers for word-initial, word-final and
//! repeated (1st..4th occurrence) positions. The transliterated text then
//! feeds a set of descriptive statistics and an optional fuzzy lookup
//! against reference corpora.
//!
//! Built with the `python` feature this is also a PyO3 extension module.

mod boundary;
mod cleaner;
mod dictionary;
mod error;
mod fuzzy;
mod mapping;
mod pipeline;
mod report;
mod resolver;
mod stats;
mod sukhotin;
mod tokenizer;

pub use boundary::{DelimiterKind, Delimiters};
pub use cleaner::{clean_file_to_file, clean_transcription};
pub use dictionary::{ReferenceVocabulary, SourceInfo, normalize_words};
pub use error::{RedefinedKey, RemapError, RuleWarning};
pub use fuzzy::{
    CandidateKind, Discovery, FuzzyMatch, FuzzyMatcher, acceptance_threshold, best_match,
    closeness, edit_distance,
};
pub use mapping::{
    LoadedTable, MappingRule, MappingTable, Tier, TierMap, generate_identity_rules, parse_rule,
};
pub use pipeline::{
    PipelineConfig, PipelineSummary, analyze_file, load_table, read_file, run, write_file,
};
pub use report::{render_analysis, render_discovery};
pub use resolver::{
    DECODE_ORDER, ENCODE_ORDER, Resolution, ResolutionPolicy, TierSelector, TokenContext, resolve,
};
pub use stats::{
    AffixKind, AffixTables, AnalysisReport, Corpus, FrequencyTable, LanguageGuess,
    Reduplications, affix_frequencies, affix_tables, analyze, char_entropy, char_frequencies,
    language_guess, reduplications, word_frequencies,
};
pub use sukhotin::{VowelClassification, classify as sukhotin_classify};
pub use tokenizer::{
    OccurrenceTracker, OutputFormat, ResolvedToken, Segment, TranslitConfig, Transliteration,
    Transliterator, transliterate,
};

#[cfg(feature = "python")]
mod python {
    use std::path::Path;

    use pyo3::prelude::*;

    use crate::{
        Corpus, MappingTable, OutputFormat, TranslitConfig, char_entropy, clean_transcription,
        load_table, read_file, sukhotin_classify, transliterate, write_file,
    };

    fn io_err(e: crate::RemapError) -> PyErr {
        pyo3::exceptions::PyIOError::new_err(e.to_string())
    }

    /// Clean a raw v101 transcription
    /// Returns: (cleaned_text, removals)
    #[pyfunction]
    fn clean_text(text: String) -> PyResult<(String, u64)> {
        Ok(clean_transcription(&text))
    }

    /// Transliterate text with an in-memory rule table
    /// Returns: (output_text, code_stream)
    #[pyfunction]
    #[pyo3(name = "transliterate")]
    fn transliterate_text(rules: String, text: String) -> PyResult<(String, String)> {
        let loaded = MappingTable::parse(&rules);
        let result = transliterate(&loaded.table, &TranslitConfig::default(), &text);
        Ok((result.text(), result.codes()))
    }

    /// Transliterate a file, reading and writing entirely in Rust
    /// Returns: (token_count, unmapped_count, rule_warnings)
    #[pyfunction]
    fn transliterate_file_to_file(
        mapping_path: String,
        input_path: String,
        output_path: String,
        codes_path: String,
    ) -> PyResult<(u64, u64, u64)> {
        let loaded = load_table(Path::new(&mapping_path)).map_err(io_err)?;
        let input = read_file(Path::new(&input_path)).map_err(io_err)?;

        let result = transliterate(&loaded.table, &TranslitConfig::default(), &input);
        write_file(Path::new(&output_path), &result.text()).map_err(io_err)?;
        write_file(Path::new(&codes_path), &result.codes()).map_err(io_err)?;

        Ok((
            result.tokens().count() as u64,
            result.misses() as u64,
            loaded.warnings.len() as u64,
        ))
    }

    /// Shannon entropy (bits) of transliterated text
    #[pyfunction]
    #[pyo3(name = "char_entropy")]
    fn char_entropy_text(text: String) -> PyResult<f64> {
        let corpus = Corpus::from_text(&text, &OutputFormat::default());
        Ok(char_entropy(&corpus))
    }

    /// Sukhotin vowel guess for transliterated text
    /// Returns: vowels in promotion order
    #[pyfunction]
    fn sukhotin_vowels(text: String) -> PyResult<Vec<String>> {
        let corpus = Corpus::from_text(&text, &OutputFormat::default());
        let result = sukhotin_classify(&corpus);
        Ok(result.vowels.iter().map(char::to_string).collect())
    }

    #[pymodule]
    fn rust_voynich_remap(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(clean_text, m)?)?;
        m.add_function(wrap_pyfunction!(transliterate_text, m)?)?;
        m.add_function(wrap_pyfunction!(transliterate_file_to_file, m)?)?;
        m.add_function(wrap_pyfunction!(char_entropy_text, m)?)?;
        m.add_function(wrap_pyfunction!(sukhotin_vowels, m)?)?;
        Ok(())
    }
}
