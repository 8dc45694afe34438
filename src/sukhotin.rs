//! Sukhotin's vowel identification.
//!
//! Builds a symmetric adjacency-count matrix over the alphanumeric
//! characters of the corpus (adjacent pairs inside a word, identical pairs
//! ignored). Every character starts as a consonant. Each round promotes the
//! consonant with the highest remaining row sum to vowel and subtracts twice
//! its adjacency from every other consonant's sum. Stops once no consonant
//! has a positive sum, so at most one round per character.

use std::collections::BTreeSet;

use crate::stats::Corpus;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VowelClassification {
    /// In the order they were promoted.
    pub vowels: Vec<char>,
    /// Ascending.
    pub consonants: Vec<char>,
    pub iterations: usize,
}

pub fn classify(corpus: &Corpus) -> VowelClassification {
    let alphabet: Vec<char> = corpus
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<BTreeSet<char>>()
        .into_iter()
        .collect();
    let n = alphabet.len();
    let index = |c: char| alphabet.binary_search(&c).ok();

    let mut matrix = vec![vec![0i64; n]; n];
    for word in corpus.words() {
        let chars: Vec<char> = word.chars().collect();
        for pair in chars.windows(2) {
            if pair[0] == pair[1] {
                continue;
            }
            if let (Some(a), Some(b)) = (index(pair[0]), index(pair[1])) {
                matrix[a][b] += 1;
                matrix[b][a] += 1;
            }
        }
    }

    let mut sums: Vec<i64> = matrix.iter().map(|row| row.iter().sum()).collect();
    let mut is_vowel = vec![false; n];
    let mut vowels = Vec::new();
    let mut iterations = 0;

    loop {
        // Strictly greater keeps the lowest character on ties.
        let mut best: Option<usize> = None;
        for i in (0..n).filter(|&i| !is_vowel[i]) {
            if best.is_none_or(|b| sums[i] > sums[b]) {
                best = Some(i);
            }
        }
        let Some(v) = best.filter(|&b| sums[b] > 0) else {
            break;
        };

        iterations += 1;
        is_vowel[v] = true;
        vowels.push(alphabet[v]);
        for i in (0..n).filter(|&i| !is_vowel[i]) {
            sums[i] -= 2 * matrix[i][v];
        }
    }

    let consonants = alphabet
        .iter()
        .zip(&is_vowel)
        .filter(|&(_, &v)| !v)
        .map(|(&c, _)| c)
        .collect();

    VowelClassification {
        vowels,
        consonants,
        iterations,
    }
}
