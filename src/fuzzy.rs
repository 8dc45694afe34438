//! Approximate matching of output words against the reference vocabulary.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::dictionary::ReferenceVocabulary;
use crate::stats::Corpus;

/// Shortest single word worth testing.
pub const MIN_CANDIDATE_LEN: usize = 3;

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// 1.0 for identical strings, falling towards 0.0 as edits pile up.
pub fn closeness(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// Minimum closeness accepted for a candidate of `len` chars. Short words
/// must match exactly; longer ones may carry proportionally more edits.
pub fn acceptance_threshold(len: usize) -> f64 {
    match len {
        0..=3 => 1.0,
        4..=5 => 0.8,
        6..=8 => 0.75,
        _ => 0.7,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// A single output word.
    Word,
    /// Two adjacent output words joined.
    MergedPair,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub candidate: String,
    pub kind: CandidateKind,
    pub matched: String,
    pub score: f64,
    /// Number of times the candidate appears in the corpus.
    pub occurrences: usize,
}

impl FuzzyMatch {
    pub fn is_exact(&self) -> bool {
        self.score >= 1.0
    }
}

/// Best vocabulary word for `candidate`, if any clears the threshold.
/// Ties go to the alphabetically first word.
pub fn best_match(words: &[String], candidate: &str) -> Option<(String, f64)> {
    let len = candidate.chars().count();
    let threshold = acceptance_threshold(len);
    let mut best: Option<(&String, f64)> = None;

    for word in words {
        let wlen = word.chars().count();
        let longest = len.max(wlen);
        // Length difference alone is a lower bound on the distance.
        if longest == 0 || 1.0 - (len.abs_diff(wlen) as f64 / longest as f64) < threshold {
            continue;
        }
        let score = closeness(candidate, word);
        if score >= threshold && best.is_none_or(|(_, s)| score > s) {
            best = Some((word, score));
        }
    }
    best.map(|(w, s)| (w.clone(), s))
}

/// Scores candidates against a vocabulary, remembering every result.
pub struct FuzzyMatcher<'v> {
    vocab: &'v ReferenceVocabulary,
    cache: HashMap<String, Option<(String, f64)>>,
}

/// Outcome of matching one corpus.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub candidates: usize,
    pub exact: Vec<FuzzyMatch>,
    pub fuzzy: Vec<FuzzyMatch>,
}

impl<'v> FuzzyMatcher<'v> {
    pub fn new(vocab: &'v ReferenceVocabulary) -> Self {
        Self {
            vocab,
            cache: HashMap::new(),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Match one candidate, consulting the cache first.
    pub fn lookup(&mut self, candidate: &str) -> Option<(String, f64)> {
        if let Some(hit) = self.cache.get(candidate) {
            return hit.clone();
        }
        let result = self.score(candidate);
        self.cache.insert(candidate.to_string(), result.clone());
        result
    }

    fn score(&self, candidate: &str) -> Option<(String, f64)> {
        if self.vocab.contains(candidate) {
            return Some((candidate.to_string(), 1.0));
        }
        best_match(self.vocab.sorted_words(), candidate)
    }

    /// Match every word and adjacent word pair of `corpus`.
    pub fn discover(&mut self, corpus: &Corpus) -> Discovery {
        let words = corpus.words();
        let mut counts: HashMap<(String, CandidateKind), usize> = HashMap::new();
        for w in words.iter().filter(|w| w.chars().count() >= MIN_CANDIDATE_LEN) {
            *counts.entry((w.to_lowercase(), CandidateKind::Word)).or_insert(0) += 1;
        }
        for pair in words.windows(2) {
            let merged = format!("{}{}", pair[0], pair[1]).to_lowercase();
            *counts.entry((merged, CandidateKind::MergedPair)).or_insert(0) += 1;
        }

        // Exact hits are cheap and may need the Hunspell dictionaries, so
        // settle those serially; only the misses go to the pool.
        let unique: HashSet<&String> = counts.keys().map(|(c, _)| c).collect();
        let mut pending: Vec<String> = Vec::new();
        for candidate in unique {
            if self.cache.contains_key(candidate) {
                continue;
            }
            if self.vocab.contains(candidate) {
                self.cache
                    .insert(candidate.clone(), Some((candidate.clone(), 1.0)));
            } else {
                pending.push(candidate.clone());
            }
        }
        let vocab_words = self.vocab.sorted_words();
        let scored: Vec<(String, Option<(String, f64)>)> = pending
            .into_par_iter()
            .map(|c| {
                let result = best_match(vocab_words, &c);
                (c, result)
            })
            .collect();
        self.cache.extend(scored);

        let mut discovery = Discovery {
            candidates: counts.len(),
            ..Discovery::default()
        };
        for ((candidate, kind), occurrences) in counts {
            let Some((matched, score)) = self.lookup(&candidate) else {
                continue;
            };
            let found = FuzzyMatch {
                candidate,
                kind,
                matched,
                score,
                occurrences,
            };
            if found.is_exact() {
                discovery.exact.push(found);
            } else {
                discovery.fuzzy.push(found);
            }
        }

        let order = |a: &FuzzyMatch, b: &FuzzyMatch| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| b.score.total_cmp(&a.score))
                .then_with(|| a.candidate.cmp(&b.candidate))
        };
        discovery.exact.sort_by(order);
        discovery.fuzzy.sort_by(order);
        discovery
    }
}
