//! Descriptive statistics over the transliterated word stream.
//!
//! Every pass here is a pure function of a [`Corpus`]; none depends on
//! another, so [`analyze`] runs them side by side on the rayon pool.

use std::collections::HashMap;

use crate::sukhotin::{self, VowelClassification};
use crate::tokenizer::{OutputFormat, Transliteration};

/// Ordered output words of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    words: Vec<String>,
}

impl Corpus {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn from_transliteration(t: &Transliteration) -> Self {
        Self::new(t.words())
    }

    /// Re-split already written output text on whitespace and the
    /// configured delimiter symbols.
    pub fn from_text(text: &str, format: &OutputFormat) -> Self {
        let separators: Vec<char> = format
            .primary
            .chars()
            .chain(format.secondary.chars())
            .collect();
        let words = text
            .split(|c: char| c.is_whitespace() || separators.contains(&c))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(words)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.words.iter().flat_map(|w| w.chars())
    }

    pub fn char_count(&self) -> usize {
        self.words.iter().map(|w| w.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Counts sorted by descending count, then ascending key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    total: usize,
}

impl FrequencyTable {
    pub fn from_counts(counts: HashMap<String, usize>) -> Self {
        let total = counts.values().sum();
        let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self { entries, total }
    }

    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for item in items {
            *counts.entry(item.into()).or_insert(0) += 1;
        }
        Self::from_counts(counts)
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, key: &str) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, n)| *n)
    }

    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }

    /// `{ token: count, pct% }` lines for the top `limit` entries.
    pub fn render_lines(&self, limit: usize) -> Vec<String> {
        self.entries
            .iter()
            .take(limit)
            .map(|(key, n)| format!("{{ {key}: {n}, {:.2}% }}", self.percent(*n)))
            .collect()
    }
}

/// Shannon entropy in bits of the character distribution.
pub fn char_entropy(corpus: &Corpus) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in corpus.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

pub fn char_frequencies(corpus: &Corpus) -> FrequencyTable {
    FrequencyTable::from_items(corpus.chars().map(String::from))
}

pub fn word_frequencies(corpus: &Corpus) -> FrequencyTable {
    FrequencyTable::from_items(corpus.words().iter().cloned())
}

pub const AFFIX_WIDTHS: std::ops::RangeInclusive<usize> = 2..=4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffixKind {
    Prefix,
    Suffix,
    Substring,
}

/// Frequency of fixed-width affixes. Prefixes and suffixes only come from
/// words longer than `width`; substrings are every window of that width.
pub fn affix_frequencies(corpus: &Corpus, kind: AffixKind, width: usize) -> FrequencyTable {
    let mut items = Vec::new();
    for word in corpus.words() {
        let chars: Vec<char> = word.chars().collect();
        let n = chars.len();
        match kind {
            AffixKind::Prefix if n > width => items.push(chars[..width].iter().collect::<String>()),
            AffixKind::Suffix if n > width => items.push(chars[n - width..].iter().collect()),
            AffixKind::Substring if n >= width => {
                items.extend(chars.windows(width).map(|w| w.iter().collect::<String>()));
            }
            _ => {}
        }
    }
    FrequencyTable::from_items(items)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixTables {
    pub width: usize,
    pub prefixes: FrequencyTable,
    pub suffixes: FrequencyTable,
    pub substrings: FrequencyTable,
}

pub fn affix_tables(corpus: &Corpus) -> Vec<AffixTables> {
    AFFIX_WIDTHS
        .map(|width| AffixTables {
            width,
            prefixes: affix_frequencies(corpus, AffixKind::Prefix, width),
            suffixes: affix_frequencies(corpus, AffixKind::Suffix, width),
            substrings: affix_frequencies(corpus, AffixKind::Substring, width),
        })
        .collect()
}

/// Immediate repeats: a word directly followed by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reduplications {
    pub pairs: usize,
    pub by_word: FrequencyTable,
}

pub fn reduplications(corpus: &Corpus) -> Reduplications {
    let repeated: Vec<&String> = corpus
        .words()
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| &pair[0])
        .collect();
    Reduplications {
        pairs: repeated.len(),
        by_word: FrequencyTable::from_items(repeated.into_iter().cloned()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    pub code: &'static str,
    pub name: &'static str,
    pub confidence: f64,
    pub reliable: bool,
}

/// Which natural language the output text looks most like, if any.
pub fn language_guess(corpus: &Corpus) -> Option<LanguageGuess> {
    let text = corpus.words().join(" ");
    whatlang::detect(&text).map(|info| LanguageGuess {
        code: info.lang().code(),
        name: info.lang().eng_name(),
        confidence: info.confidence(),
        reliable: info.is_reliable(),
    })
}

/// All statistics passes over one corpus.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub words: usize,
    pub chars: usize,
    pub entropy: f64,
    pub char_freq: FrequencyTable,
    pub word_freq: FrequencyTable,
    pub affixes: Vec<AffixTables>,
    pub reduplications: Reduplications,
    pub vowels: VowelClassification,
    pub language: Option<LanguageGuess>,
}

pub fn analyze(corpus: &Corpus) -> AnalysisReport {
    let mut entropy = 0.0;
    let mut char_freq = FrequencyTable::default();
    let mut word_freq = FrequencyTable::default();
    let mut affixes = Vec::new();
    let mut redup = Reduplications::default();
    let mut vowels = VowelClassification::default();
    let mut language = None;

    rayon::scope(|s| {
        s.spawn(|_| entropy = char_entropy(corpus));
        s.spawn(|_| char_freq = char_frequencies(corpus));
        s.spawn(|_| word_freq = word_frequencies(corpus));
        s.spawn(|_| affixes = affix_tables(corpus));
        s.spawn(|_| redup = reduplications(corpus));
        s.spawn(|_| vowels = sukhotin::classify(corpus));
        s.spawn(|_| language = language_guess(corpus));
    });

    AnalysisReport {
        words: corpus.words().len(),
        chars: corpus.char_count(),
        entropy,
        char_freq,
        word_freq,
        affixes,
        reduplications: redup,
        vowels,
        language,
    }
}
