//! Mapping table: contextual substitution rules loaded from a rule file.
//!
//! Each line reads `<code>=<inputToken>~<outputToken>[marker]`. The optional
//! trailing marker picks the tier the rule lands in:
//!
//! | marker | tier          |
//! |--------|---------------|
//! | `@`    | word-initial  |
//! | `/`    | word-final    |
//! | `'`    | occurrence 1  |
//! | `"`    | occurrence 2  |
//! | `:`    | occurrence 3  |
//! | `;`    | occurrence 4  |
//!
//! Lines starting with `)` are comments. Blank lines and lines missing `=`
//! or `~` are skipped without comment.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::boundary::Delimiters;
use crate::error::{RedefinedKey, RuleWarning};

pub const COMMENT_MARKER: char = ')';
pub const FIELD_SEPARATOR: char = '=';
pub const TOKEN_SEPARATOR: char = '~';

/// Substitution bucket selected by a token's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Normal,
    Initial,
    Final,
    Occurrence1,
    Occurrence2,
    Occurrence3,
    Occurrence4,
}

impl Tier {
    pub const ALL: [Tier; 7] = [
        Tier::Normal,
        Tier::Initial,
        Tier::Final,
        Tier::Occurrence1,
        Tier::Occurrence2,
        Tier::Occurrence3,
        Tier::Occurrence4,
    ];

    /// Marked tiers in the order their markers are checked. The first marker
    /// found decides the tier.
    pub const MARKED: [Tier; 6] = [
        Tier::Initial,
        Tier::Final,
        Tier::Occurrence1,
        Tier::Occurrence2,
        Tier::Occurrence3,
        Tier::Occurrence4,
    ];

    pub fn marker(self) -> Option<char> {
        match self {
            Tier::Normal => None,
            Tier::Initial => Some('@'),
            Tier::Final => Some('/'),
            Tier::Occurrence1 => Some('\''),
            Tier::Occurrence2 => Some('"'),
            Tier::Occurrence3 => Some(':'),
            Tier::Occurrence4 => Some(';'),
        }
    }

    /// Occurrence tier for the n-th repetition of a token within a word.
    /// Counts outside 1..=4 have no tier.
    pub fn occurrence(count: u32) -> Option<Tier> {
        match count {
            1 => Some(Tier::Occurrence1),
            2 => Some(Tier::Occurrence2),
            3 => Some(Tier::Occurrence3),
            4 => Some(Tier::Occurrence4),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Normal => "normal",
            Tier::Initial => "initial",
            Tier::Final => "final",
            Tier::Occurrence1 => "occurrence-1",
            Tier::Occurrence2 => "occurrence-2",
            Tier::Occurrence3 => "occurrence-3",
            Tier::Occurrence4 => "occurrence-4",
        };
        f.write_str(name)
    }
}

/// One parsed line of the rule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    pub code: String,
    pub input_token: String,
    pub output_token: String,
    pub tier: Tier,
}

impl MappingRule {
    pub fn new(code: &str, input_token: &str, output_token: &str, tier: Tier) -> Self {
        Self {
            code: code.to_string(),
            input_token: input_token.to_string(),
            output_token: output_token.to_string(),
            tier,
        }
    }
}

/// Forward (code -> output) and reverse (input -> code) maps of one tier.
#[derive(Debug, Clone, Default)]
pub struct TierMap {
    forward: BTreeMap<String, String>,
    reverse: BTreeMap<String, String>,
}

impl TierMap {
    pub fn output_for(&self, code: &str) -> Option<&str> {
        self.forward.get(code).map(String::as_str)
    }

    pub fn code_for(&self, token: &str) -> Option<&str> {
        self.reverse.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }
}

/// Immutable, tier-indexed lookup structure built once per run.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    tiers: [TierMap; 7],
    tokens: HashSet<String>,
    max_token_len: usize,
}

/// A table together with the warnings raised while loading it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: MappingTable,
    pub rules: usize,
    pub warnings: Vec<RuleWarning>,
}

impl MappingTable {
    /// Parse a rule file. Malformed rules are skipped and reported as
    /// warnings; duplicate keys overwrite earlier ones and are reported too.
    pub fn parse(text: &str) -> LoadedTable {
        let mut table = MappingTable::default();
        let mut warnings = Vec::new();
        let mut rules = 0;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            match parse_rule(raw, line) {
                Ok(Some(rule)) => {
                    rules += 1;
                    let tier = rule.tier;
                    for (kind, value) in table.insert(rule) {
                        warnings.push(RuleWarning::Redefined {
                            line,
                            tier,
                            kind,
                            value,
                        });
                    }
                }
                Ok(None) => {}
                Err(warning) => warnings.push(warning),
            }
        }

        LoadedTable {
            table,
            rules,
            warnings,
        }
    }

    /// Build a table from rules directly. Later duplicates silently win.
    pub fn from_rules<I: IntoIterator<Item = MappingRule>>(rules: I) -> Self {
        let mut table = MappingTable::default();
        for rule in rules {
            table.insert(rule);
        }
        table
    }

    /// Insert a rule, returning the keys it overwrote in its tier.
    fn insert(&mut self, rule: MappingRule) -> Vec<(RedefinedKey, String)> {
        let mut redefined = Vec::new();
        let width = rule.input_token.chars().count();
        let tier = &mut self.tiers[rule.tier.index()];

        if tier
            .reverse
            .insert(rule.input_token.clone(), rule.code.clone())
            .is_some()
        {
            redefined.push((RedefinedKey::Token, rule.input_token.clone()));
        }
        if tier
            .forward
            .insert(rule.code.clone(), rule.output_token)
            .is_some()
        {
            redefined.push((RedefinedKey::Code, rule.code));
        }

        self.max_token_len = self.max_token_len.max(width);
        self.tokens.insert(rule.input_token);
        redefined
    }

    pub fn tier(&self, tier: Tier) -> &TierMap {
        &self.tiers[tier.index()]
    }

    /// Whether any tier recognises this input token.
    pub fn contains_token(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Widest input token across all tiers, in characters.
    pub fn max_token_len(&self) -> usize {
        self.max_token_len
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rule count per tier, skipping empty tiers.
    pub fn summary(&self) -> Vec<(Tier, usize)> {
        Tier::ALL
            .iter()
            .map(|&t| (t, self.tier(t).len()))
            .filter(|&(_, n)| n > 0)
            .collect()
    }
}

/// Parse one line of the rule file.
///
/// `Ok(None)` means the line is not a rule at all (blank, comment, or
/// missing a separator). `Err` means it looked like a rule but is malformed.
pub fn parse_rule(raw: &str, line: usize) -> Result<Option<MappingRule>, RuleWarning> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.starts_with(COMMENT_MARKER)
        || !trimmed.contains(FIELD_SEPARATOR)
        || !trimmed.contains(TOKEN_SEPARATOR)
    {
        return Ok(None);
    }

    let mut body = trimmed;
    let mut tier = None;
    for candidate in Tier::MARKED {
        let Some(marker) = candidate.marker() else {
            continue;
        };
        if let Some(rest) = body.strip_suffix(marker) {
            body = rest.trim_end();
            tier.get_or_insert(candidate);
        }
    }
    let tier = tier.unwrap_or(Tier::Normal);

    let Some((code, rest)) = body.split_once(FIELD_SEPARATOR) else {
        return Ok(None);
    };
    let Some((input, output)) = rest.split_once(TOKEN_SEPARATOR) else {
        return Err(RuleWarning::MissingTokenSeparator {
            line,
            text: trimmed.to_string(),
        });
    };

    let (code, input, output) = (code.trim(), input.trim(), output.trim());
    if code.is_empty() {
        return Err(RuleWarning::EmptyCode { line });
    }
    if input.is_empty() {
        return Err(RuleWarning::EmptyToken { line });
    }

    Ok(Some(MappingRule::new(code, input, output, tier)))
}

/// True if `c` survives a round trip as both input and output token of a
/// rule line. Tier markers and the token separator would be read back as
/// syntax, and whitespace is trimmed away.
fn is_rule_safe(c: char) -> bool {
    c != TOKEN_SEPARATOR
        && !c.is_whitespace()
        && !Tier::MARKED.iter().any(|t| t.marker() == Some(c))
}

/// Write an identity rule file for every distinct character of `text`.
///
/// Characters appear in first-seen order and are numbered from 0;
/// delimiters and newlines are left out. Characters the rule syntax cannot
/// carry (tier markers, `~`, whitespace) get no rule and are returned in
/// first-seen order instead; they will not survive transliteration.
pub fn generate_identity_rules(text: &str, delimiters: &Delimiters) -> (String, Vec<char>) {
    let mut seen = HashSet::new();
    let mut out = String::new();
    let mut skipped = Vec::new();
    let mut code = 0usize;

    for c in text.chars() {
        if delimiters.is_delimiter(c) || c == '\r' || !seen.insert(c) {
            continue;
        }
        if !is_rule_safe(c) {
            skipped.push(c);
            continue;
        }
        out.push_str(&format!("{code}{FIELD_SEPARATOR}{c}{TOKEN_SEPARATOR}{c}\n"));
        code += 1;
    }

    (out, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normal_rule() {
        let rule = parse_rule("4=o~o", 1).unwrap().unwrap();
        assert_eq!(rule, MappingRule::new("4", "o", "o", Tier::Normal));
    }

    #[test]
    fn test_parse_trims_fields() {
        let rule = parse_rule("  12 = 4o ~ qu  ", 1).unwrap().unwrap();
        assert_eq!(rule, MappingRule::new("12", "4o", "qu", Tier::Normal));
    }

    #[test]
    fn test_parse_markers() {
        let cases = [
            ("1=a~x@", Tier::Initial),
            ("1=a~x/", Tier::Final),
            ("1=a~x'", Tier::Occurrence1),
            ("1=a~x\"", Tier::Occurrence2),
            ("1=a~x:", Tier::Occurrence3),
            ("1=a~x;", Tier::Occurrence4),
        ];
        for (line, tier) in cases {
            let rule = parse_rule(line, 1).unwrap().unwrap();
            assert_eq!(rule.tier, tier, "{line}");
            assert_eq!(rule.output_token, "x", "{line}");
        }
    }

    #[test]
    fn test_first_marker_check_wins() {
        // '@' is checked before '/', so both are consumed and Initial wins.
        let rule = parse_rule("1=a~x/@", 1).unwrap().unwrap();
        assert_eq!(rule.tier, Tier::Initial);
        assert_eq!(rule.output_token, "x");

        // '/' is checked after '@', so the '@' stays in the output token.
        let rule = parse_rule("1=a~x@/", 1).unwrap().unwrap();
        assert_eq!(rule.tier, Tier::Final);
        assert_eq!(rule.output_token, "x@");
    }

    #[test]
    fn test_skipped_lines() {
        for line in ["", "   ", ") 4=o~o", "4o~o", "4=oo", "just text"] {
            assert_eq!(parse_rule(line, 1), Ok(None), "{line:?}");
        }
    }

    #[test]
    fn test_missing_token_separator_is_warning() {
        let err = parse_rule("4~x=o", 3).unwrap_err();
        assert!(matches!(err, RuleWarning::MissingTokenSeparator { line: 3, .. }));
    }

    #[test]
    fn test_empty_fields_are_warnings() {
        assert_eq!(parse_rule("=o~x", 2), Err(RuleWarning::EmptyCode { line: 2 }));
        assert_eq!(parse_rule("4=~x", 2), Err(RuleWarning::EmptyToken { line: 2 }));
    }

    #[test]
    fn test_empty_output_is_allowed() {
        let rule = parse_rule("9=q~", 1).unwrap().unwrap();
        assert_eq!(rule.output_token, "");
    }

    #[test]
    fn test_table_tiers_are_independent() {
        let loaded = MappingTable::parse("4=o~X\n4=o~Y@\n");
        let table = loaded.table;
        assert_eq!(table.tier(Tier::Normal).output_for("4"), Some("X"));
        assert_eq!(table.tier(Tier::Initial).output_for("4"), Some("Y"));
        assert_eq!(table.tier(Tier::Final).output_for("4"), None);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.rules, 2);
    }

    #[test]
    fn test_max_token_len_counts_chars() {
        let table = MappingTable::parse("1=a~a\n2=ab~b\n3=ééé~e/\n").table;
        assert_eq!(table.max_token_len(), 3);
        assert!(table.contains_token("ab"));
        assert!(table.contains_token("ééé"));
        assert!(!table.contains_token("b"));
    }

    #[test]
    fn test_duplicate_keys_last_wins_with_warning() {
        let loaded = MappingTable::parse("1=a~x\n2=a~y\n");
        assert_eq!(loaded.table.tier(Tier::Normal).code_for("a"), Some("2"));
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(
            loaded.warnings[0],
            RuleWarning::Redefined {
                line: 2,
                tier: Tier::Normal,
                kind: RedefinedKey::Token,
                value: "a".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_line_does_not_stop_loading() {
        let loaded = MappingTable::parse("1=a~x\n2~b=y\n3=c~z\n");
        assert_eq!(loaded.rules, 2);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].line(), 2);
        assert!(loaded.table.contains_token("c"));
    }

    #[test]
    fn test_summary_skips_empty_tiers() {
        let table = MappingTable::parse("1=a~x\n2=b~y\n1=a~z;\n").table;
        assert_eq!(
            table.summary(),
            vec![(Tier::Normal, 2), (Tier::Occurrence4, 1)]
        );
    }

    #[test]
    fn test_generate_identity_rules() {
        let (rules, skipped) = generate_identity_rules("oka.ok,y\ndo", &Delimiters::default());
        assert_eq!(rules, "0=o~o\n1=k~k\n2=a~a\n3=y~y\n4=d~d\n");
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_generate_skips_rule_syntax_chars() {
        let text = "a@b;c~d/e'f\"g:h i@";
        let (rules, skipped) = generate_identity_rules(text, &Delimiters::default());
        assert_eq!(skipped, ['@', ';', '~', '/', '\'', '"', ':', ' ']);
        assert_eq!(rules, "0=a~a\n1=b~b\n2=c~c\n3=d~d\n4=e~e\n5=f~f\n6=g~g\n7=h~h\n8=i~i\n");

        // Every generated rule loads cleanly into the Normal tier.
        let loaded = MappingTable::parse(&rules);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.rules, 9);
        assert_eq!(loaded.table.summary(), [(Tier::Normal, 9)]);
    }

    #[test]
    fn test_generate_keeps_field_and_comment_chars() {
        let (rules, skipped) = generate_identity_rules("a=)", &Delimiters::default());
        assert!(skipped.is_empty());
        let loaded = MappingTable::parse(&rules);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.table.tier(Tier::Normal).code_for("="), Some("1"));
        assert_eq!(loaded.table.tier(Tier::Normal).output_for("2"), Some(")"));
    }
}
