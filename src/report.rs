//! Plain-text rendering of the analysis and discovery results.

use std::fmt::Write;

use crate::dictionary::SourceInfo;
use crate::fuzzy::{CandidateKind, Discovery, FuzzyMatch};
use crate::stats::{AnalysisReport, FrequencyTable};

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==");
}

fn table(out: &mut String, t: &FrequencyTable, limit: usize) {
    if t.is_empty() {
        out.push_str("(none)\n");
        return;
    }
    for line in t.render_lines(limit) {
        out.push_str(&line);
        out.push('\n');
    }
}

fn chars(list: &[char]) -> String {
    list.iter().map(char::to_string).collect::<Vec<_>>().join(" ")
}

/// Render the statistics sections, `limit` entries per table.
pub fn render_analysis(report: &AnalysisReport, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Words: {}", report.words);
    let _ = writeln!(out, "Characters: {} ({} distinct)", report.chars, report.char_freq.len());
    let _ = writeln!(out, "Character entropy: {:.4} bits", report.entropy);
    match &report.language {
        Some(lang) => {
            let _ = writeln!(
                out,
                "Closest language: {} ({}), confidence {:.2}{}",
                lang.name,
                lang.code,
                lang.confidence,
                if lang.reliable { "" } else { " (unreliable)" }
            );
        }
        None => out.push_str("Closest language: undetermined\n"),
    }

    section(&mut out, "Character frequency");
    table(&mut out, &report.char_freq, usize::MAX);

    section(&mut out, "Word frequency");
    table(&mut out, &report.word_freq, limit);

    for affixes in &report.affixes {
        let w = affixes.width;
        section(&mut out, &format!("Prefixes ({w})"));
        table(&mut out, &affixes.prefixes, limit);
        section(&mut out, &format!("Suffixes ({w})"));
        table(&mut out, &affixes.suffixes, limit);
        section(&mut out, &format!("Substrings ({w})"));
        table(&mut out, &affixes.substrings, limit);
    }

    section(&mut out, "Reduplication");
    let _ = writeln!(out, "Adjacent repeated words: {}", report.reduplications.pairs);
    table(&mut out, &report.reduplications.by_word, limit);

    section(&mut out, "Sukhotin vowels");
    let _ = writeln!(out, "Vowels: {}", chars(&report.vowels.vowels));
    let _ = writeln!(out, "Consonants: {}", chars(&report.vowels.consonants));
    let _ = writeln!(out, "Iterations: {}", report.vowels.iterations);

    out
}

fn match_line(m: &FuzzyMatch) -> String {
    let kind = match m.kind {
        CandidateKind::Word => "word",
        CandidateKind::MergedPair => "merged",
    };
    if m.is_exact() {
        format!("{{ {}: {}, {kind} }}", m.candidate, m.occurrences)
    } else {
        format!(
            "{{ {} -> {}: {}, {kind}, {:.2} }}",
            m.candidate, m.matched, m.occurrences, m.score
        )
    }
}

/// Render the corpus discovery section.
pub fn render_discovery(sources: &[SourceInfo], discovery: &Discovery, limit: usize) -> String {
    let mut out = String::new();
    section(&mut out, "Reference corpus");
    for s in sources {
        let _ = writeln!(
            out,
            "{}: {} words, language {}",
            s.name,
            s.words,
            s.language.unwrap_or("unknown")
        );
    }
    let _ = writeln!(out, "Candidates tested: {}", discovery.candidates);

    section(&mut out, "Exact matches");
    if discovery.exact.is_empty() {
        out.push_str("(none)\n");
    }
    for m in discovery.exact.iter().take(limit) {
        out.push_str(&match_line(m));
        out.push('\n');
    }

    section(&mut out, "Fuzzy matches");
    if discovery.fuzzy.is_empty() {
        out.push_str("(none)\n");
    }
    for m in discovery.fuzzy.iter().take(limit) {
        out.push_str(&match_line(m));
        out.push('\n');
    }

    out
}
