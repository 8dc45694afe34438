//! Longest-match tokenizer and the transliteration pass built on it.
//!
//! The input is scanned once, left to right. Delimiters and newlines are
//! echoed and close the current word. Everything else is matched against the
//! mapping table, longest token first, and resolved through the tier
//! policy using the token's word position and its occurrence count.

use std::collections::HashMap;

use crate::boundary::{DelimiterKind, Delimiters};
use crate::mapping::{MappingTable, Tier};
use crate::resolver::{ResolutionPolicy, TokenContext, resolve};

/// How delimiters and codes are written to the output streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    pub primary: String,
    pub secondary: String,
    /// Written after every code in the numeric-code stream.
    pub code_terminator: String,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            primary: "_".to_string(),
            secondary: "-".to_string(),
            code_terminator: ".".to_string(),
        }
    }
}

impl OutputFormat {
    pub fn symbol(&self, kind: DelimiterKind) -> &str {
        match kind {
            DelimiterKind::Primary => &self.primary,
            DelimiterKind::Secondary => &self.secondary,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslitConfig {
    pub delimiters: Delimiters,
    pub format: OutputFormat,
    pub policy: ResolutionPolicy,
}

/// Per-word count of how often each token string has been matched.
#[derive(Debug, Default)]
pub struct OccurrenceTracker {
    counts: HashMap<String, u32>,
}

impl OccurrenceTracker {
    /// Record one more match of `token` and return its count in this word.
    pub fn observe(&mut self, token: &str) -> u32 {
        let count = self.counts.entry(token.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Forget everything; called at every word boundary.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub matched: String,
    pub code: String,
    pub output: String,
    pub tier: Option<Tier>,
    pub occurrence: u32,
    pub at_start: bool,
    pub at_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Token(ResolvedToken),
    Delimiter { kind: DelimiterKind, raw: char },
    Newline,
}

/// Output of one transliteration pass.
#[derive(Debug, Clone)]
pub struct Transliteration {
    segments: Vec<Segment>,
    format: OutputFormat,
}

impl Transliteration {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn tokens(&self) -> impl Iterator<Item = &ResolvedToken> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(t) => Some(t),
            _ => None,
        })
    }

    /// Resolved text with delimiters echoed as their configured symbols.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Token(t) => out.push_str(&t.output),
                Segment::Delimiter { kind, .. } => out.push_str(self.format.symbol(*kind)),
                Segment::Newline => out.push('\n'),
            }
        }
        out
    }

    /// Numeric-code stream: each token's code followed by the terminator.
    ///
    /// The stream opens with a terminator; delimiters are written as their
    /// raw input character plus terminator.
    pub fn codes(&self) -> String {
        let term = &self.format.code_terminator;
        let mut out = term.clone();
        for segment in &self.segments {
            match segment {
                Segment::Token(t) => {
                    out.push_str(&t.code);
                    out.push_str(term);
                }
                Segment::Delimiter { raw, .. } => {
                    out.push(*raw);
                    out.push_str(term);
                }
                Segment::Newline => out.push('\n'),
            }
        }
        out
    }

    /// Output words in order. Words whose tokens all resolved to nothing are
    /// dropped.
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Token(t) => current.push_str(&t.output),
                Segment::Delimiter { .. } | Segment::Newline => {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    /// Tokens that no tier could decode.
    pub fn misses(&self) -> usize {
        self.tokens().filter(|t| t.tier.is_none()).count()
    }
}

/// Drives the table and policy over an input stream.
pub struct Transliterator<'a> {
    table: &'a MappingTable,
    config: &'a TranslitConfig,
}

impl<'a> Transliterator<'a> {
    pub fn new(table: &'a MappingTable, config: &'a TranslitConfig) -> Self {
        Self { table, config }
    }

    /// Longest table token starting at `index`, or the single character there
    /// when nothing matches. The window never crosses a delimiter.
    pub fn longest_match(&self, data: &[char], index: usize) -> (String, usize) {
        let delimiters = &self.config.delimiters;
        let word_len = data[index..]
            .iter()
            .take_while(|&&c| !delimiters.is_delimiter(c))
            .count();
        let window = self.table.max_token_len().min(word_len);

        for len in (1..=window).rev() {
            let candidate: String = data[index..index + len].iter().collect();
            if self.table.contains_token(&candidate) {
                return (candidate, len);
            }
        }
        (data[index].to_string(), 1)
    }

    pub fn run(&self, input: &str) -> Transliteration {
        let delimiters = &self.config.delimiters;
        let data: Vec<char> = input.chars().collect();
        let mut segments = Vec::with_capacity(data.len());
        let mut occurrences = OccurrenceTracker::default();
        let mut i = 0;

        while i < data.len() {
            let ch = data[i];

            if ch == '\n' {
                segments.push(Segment::Newline);
                occurrences.reset();
                i += 1;
                continue;
            }
            if let Some(kind) = delimiters.kind(ch) {
                segments.push(Segment::Delimiter { kind, raw: ch });
                occurrences.reset();
                i += 1;
                continue;
            }

            let (matched, len) = self.longest_match(&data, i);
            let ctx = TokenContext {
                at_start: delimiters.is_word_start(i, &data),
                at_end: delimiters.is_word_end(i, &data, len),
                occurrence: occurrences.observe(&matched),
            };
            let resolution = resolve(self.table, &self.config.policy, &matched, &ctx);

            segments.push(Segment::Token(ResolvedToken {
                matched,
                code: resolution.code,
                output: resolution.output,
                tier: resolution.tier,
                occurrence: ctx.occurrence,
                at_start: ctx.at_start,
                at_end: ctx.at_end,
            }));
            i += len;
        }

        Transliteration {
            segments,
            format: self.config.format.clone(),
        }
    }
}

/// Convenience wrapper: one pass with `config` over `input`.
pub fn transliterate(table: &MappingTable, config: &TranslitConfig, input: &str) -> Transliteration {
    Transliterator::new(table, config).run(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rules: &str, input: &str) -> Transliteration {
        let table = MappingTable::parse(rules).table;
        transliterate(&table, &TranslitConfig::default(), input)
    }

    #[test]
    fn test_end_to_end_normal_tier() {
        let t = run("4=o~o\n", "o.o,o\no");
        assert_eq!(t.text(), "o_o-o\no");
        assert!(t.tokens().all(|tok| tok.tier == Some(Tier::Normal)));
        assert_eq!(t.tokens().count(), 4);
    }

    #[test]
    fn test_longest_match_wins() {
        let t = run("1=a~x\n2=b~y\n3=ab~Z\n", "ab");
        let matched: Vec<&str> = t.tokens().map(|tok| tok.matched.as_str()).collect();
        assert_eq!(matched, ["ab"]);
        assert_eq!(t.text(), "Z");
    }

    #[test]
    fn test_longest_match_falls_back_to_shorter() {
        let t = run("1=a~x\n2=b~y\n3=abc~Z\n", "abab");
        assert_eq!(t.text(), "xyxy");
    }

    #[test]
    fn test_window_stops_at_delimiter() {
        let table = MappingTable::parse("1=a~x\n2=a.b~Q\n").table;
        let config = TranslitConfig::default();
        let tr = Transliterator::new(&table, &config);
        let data: Vec<char> = "a.b".chars().collect();
        assert_eq!(tr.longest_match(&data, 0), ("a".to_string(), 1));
    }

    #[test]
    fn test_unknown_character_drops_out() {
        let t = run("4=o~o\n", "oqo");
        assert_eq!(t.text(), "oo");
        assert_eq!(t.misses(), 1);
        assert_eq!(t.codes(), ".4..4.");
    }

    #[test]
    fn test_occurrence_counts_reset_per_word() {
        let t = run("5=e~e\n5=e~i\"\n", "eee.e\ne");
        let counts: Vec<u32> = t.tokens().map(|tok| tok.occurrence).collect();
        assert_eq!(counts, [1, 2, 3, 1, 1]);
        assert_eq!(t.text(), "eie_e\ne");
    }

    #[test]
    fn test_positional_tiers() {
        let rules = "1=k~c\n1=k~K@\n1=k~Q/\n2=a~a\n";
        assert_eq!(run(rules, "kak").text(), "KaQ");
        assert_eq!(run(rules, "aka").text(), "aca");
        // A one-token word is both initial and final; decode checks Initial first.
        assert_eq!(run(rules, "k").text(), "K");
    }

    #[test]
    fn test_multichar_token_end_detection() {
        let t = run("1=ch~C\n1=ch~X/\n2=o~o\n", "och.cho");
        assert_eq!(t.text(), "oX_Co");
    }

    #[test]
    fn test_codes_stream_layout() {
        let t = run("4=o~o\n7=ch~k\n", "och.o,o\nch");
        assert_eq!(t.codes(), ".4.7...4.,.4.\n7.");
    }

    #[test]
    fn test_words() {
        let t = run("4=o~o\n5=k~k\n", "ok.q.ko\nk");
        assert_eq!(t.words(), ["ok", "ko", "k"]);
    }

    #[test]
    fn test_custom_format() {
        let table = MappingTable::parse("4=o~o\n").table;
        let config = TranslitConfig {
            format: OutputFormat {
                primary: " ".to_string(),
                secondary: " ? ".to_string(),
                code_terminator: "|".to_string(),
            },
            ..TranslitConfig::default()
        };
        let t = transliterate(&table, &config, "o.o,o");
        assert_eq!(t.text(), "o o ? o");
        assert_eq!(t.codes(), "|4|.|4|,|4|");
    }

    #[test]
    fn test_tracker() {
        let mut tracker = OccurrenceTracker::default();
        assert_eq!(tracker.observe("a"), 1);
        assert_eq!(tracker.observe("b"), 1);
        assert_eq!(tracker.observe("a"), 2);
        tracker.reset();
        assert!(tracker.is_empty());
        assert_eq!(tracker.observe("a"), 1);
    }
}
