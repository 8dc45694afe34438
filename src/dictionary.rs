//! Reference vocabulary for corpus discovery.
//!
//! Loads a folder of plaintext reference texts (e.g. Latin, Old Occitan,
//! Middle High German) into a single lowercased word set, and optionally
//! Hunspell dictionaries for exact membership checks. A word known to ANY
//! source counts as known.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use zspell::Dictionary;

use crate::error::RemapError;

lazy_static! {
    // Runs of letters; everything else (digits, punctuation, whitespace) splits
    static ref WORD_PATTERN: Regex = Regex::new(r"\p{L}+").unwrap();
}

/// Per-file summary for the discovery report.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub name: String,
    pub words: usize,
    pub language: Option<&'static str>,
}

/// Word set built from reference texts plus any Hunspell dictionaries.
#[derive(Default)]
pub struct ReferenceVocabulary {
    words: HashSet<String>,
    sorted: Vec<String>,
    sources: Vec<SourceInfo>,
    hunspell: Vec<(String, Dictionary)>,
}

/// Lowercased, accent-stripped words of `text`.
pub fn normalize_words(text: &str) -> Vec<String> {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    WORD_PATTERN
        .find_iter(&folded)
        .map(|m| m.as_str().to_string())
        .collect()
}

impl ReferenceVocabulary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::default();
        for w in words {
            vocab.words.extend(normalize_words(w.as_ref()));
        }
        vocab.reindex();
        vocab
    }

    /// Load every regular file in `dir`, sorted by name.
    pub fn load_dir(dir: &Path) -> Result<Self, RemapError> {
        let entries = fs::read_dir(dir).map_err(|e| RemapError::read(dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut vocab = Self::default();
        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Skipping reference file {}: {}", path.display(), e);
                    continue;
                }
            };
            let words = normalize_words(&content);
            let language = whatlang::detect(&content).map(|info| info.lang().code());
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            eprintln!(
                "Loaded reference text {}: {} words, language {}",
                name,
                words.len(),
                language.unwrap_or("unknown")
            );
            vocab.sources.push(SourceInfo {
                name,
                words: words.len(),
                language,
            });
            vocab.words.extend(words);
        }

        if vocab.words.is_empty() {
            return Err(RemapError::EmptyCorpus {
                path: dir.to_path_buf(),
            });
        }
        vocab.reindex();
        Ok(vocab)
    }

    /// Add every `<name>.aff`/`<name>.dic` pair found in `dict_dir`, in name
    /// order. A pair that is incomplete or fails to build is logged and left
    /// out; a missing directory leaves the vocabulary unchanged.
    pub fn with_hunspell(mut self, dict_dir: &Path) -> Self {
        let entries = match fs::read_dir(dict_dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Dictionary directory {} unavailable: {}", dict_dir.display(), e);
                return self;
            }
        };
        let mut dic_paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "dic"))
            .collect();
        dic_paths.sort();

        for dic_path in dic_paths {
            let name = dic_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match build_hunspell(&dic_path) {
                Ok(dict) => {
                    eprintln!("Loaded Hunspell dictionary {name}");
                    self.hunspell.push((name, dict));
                }
                Err(reason) => eprintln!("Skipping Hunspell dictionary {name}: {reason}"),
            }
        }
        self
    }

    fn reindex(&mut self) {
        self.sorted = self.words.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    }

    /// Known to a reference text or to any Hunspell dictionary.
    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        self.hunspell.iter().any(|(_, d)| d.check_word(word))
    }

    /// Word list in ascending order, for fuzzy scanning.
    pub fn sorted_words(&self) -> &[String] {
        &self.sorted
    }

    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// One-line summary for the run log.
    pub fn stats(&self) -> String {
        let names: Vec<&str> = self.hunspell.iter().map(|(n, _)| n.as_str()).collect();
        format!(
            "Reference vocabulary: {} words from {} texts, hunspell=[{}]",
            self.words.len(),
            self.sources.len(),
            names.join(", ")
        )
    }
}

/// Affix rules sit next to the word list under the same stem.
fn build_hunspell(dic_path: &Path) -> Result<Dictionary, String> {
    let aff_path = dic_path.with_extension("aff");
    let read = |p: &Path| fs::read_to_string(p).map_err(|e| format!("{}: {e}", p.display()));
    let affixes = read(&aff_path)?;
    let words = read(dic_path)?;
    zspell::builder()
        .config_str(&affixes)
        .dict_str(&words)
        .build()
        .map_err(|e| e.to_string())
}
