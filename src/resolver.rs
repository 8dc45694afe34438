//! Contextual resolution of a matched token through ordered tier lists.
//!
//! Resolution runs in two stages: the matched input token is encoded to a
//! table code, then the code is decoded to an output token. Each stage
//! walks its own ordered list of tier selectors and takes the first tier
//! that applies to the token's context and holds the key. The two default
//! orders differ on purpose:
//!
//! ```text
//! encode: Final -> Initial -> Occurrence(n) -> Normal -> ""
//! decode: Initial -> Final -> Occurrence(n) -> Normal -> ""
//! ```

use std::str::FromStr;

use crate::mapping::{MappingTable, Tier};

/// A step in a resolution order. `Initial` and `Final` only apply at a word
/// edge; `Occurrence` picks the tier matching the occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierSelector {
    Initial,
    Final,
    Occurrence,
    Normal,
}

impl FromStr for TierSelector {
    type Err = String;

    /// Parses a selector name ("initial", "final", "occurrence", "normal").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initial" => Ok(Self::Initial),
            "final" => Ok(Self::Final),
            "occurrence" => Ok(Self::Occurrence),
            "normal" => Ok(Self::Normal),
            other => Err(format!(
                "invalid tier selector: {other:?} (expected initial, final, occurrence or normal)"
            )),
        }
    }
}

pub const ENCODE_ORDER: [TierSelector; 4] = [
    TierSelector::Final,
    TierSelector::Initial,
    TierSelector::Occurrence,
    TierSelector::Normal,
];

pub const DECODE_ORDER: [TierSelector; 4] = [
    TierSelector::Initial,
    TierSelector::Final,
    TierSelector::Occurrence,
    TierSelector::Normal,
];

/// Where a token sits in its word and how often it has been seen there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenContext {
    pub at_start: bool,
    pub at_end: bool,
    pub occurrence: u32,
}

impl TokenContext {
    /// Mid-word, first occurrence. Only the Normal and Occurrence1 tiers apply.
    pub fn interior() -> Self {
        Self {
            at_start: false,
            at_end: false,
            occurrence: 1,
        }
    }
}

impl TierSelector {
    /// The concrete tier this step consults in `ctx`, if any.
    pub fn tier(self, ctx: &TokenContext) -> Option<Tier> {
        match self {
            TierSelector::Initial => ctx.at_start.then_some(Tier::Initial),
            TierSelector::Final => ctx.at_end.then_some(Tier::Final),
            TierSelector::Occurrence => Tier::occurrence(ctx.occurrence),
            TierSelector::Normal => Some(Tier::Normal),
        }
    }
}

/// The two ordered tier lists used for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPolicy {
    pub encode: Vec<TierSelector>,
    pub decode: Vec<TierSelector>,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            encode: ENCODE_ORDER.to_vec(),
            decode: DECODE_ORDER.to_vec(),
        }
    }
}

impl ResolutionPolicy {
    /// Encode a matched token to its table code. `None` is a lookup miss.
    pub fn encode<'t>(
        &self,
        table: &'t MappingTable,
        token: &str,
        ctx: &TokenContext,
    ) -> Option<(Tier, &'t str)> {
        self.encode
            .iter()
            .filter_map(|sel| sel.tier(ctx))
            .find_map(|tier| table.tier(tier).code_for(token).map(|code| (tier, code)))
    }

    /// Decode a table code to its output token. `None` is a lookup miss.
    pub fn decode<'t>(
        &self,
        table: &'t MappingTable,
        code: &str,
        ctx: &TokenContext,
    ) -> Option<(Tier, &'t str)> {
        self.decode
            .iter()
            .filter_map(|sel| sel.tier(ctx))
            .find_map(|tier| table.tier(tier).output_for(code).map(|out| (tier, out)))
    }
}

/// Result of running a token through both stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Empty when the token is unknown to every applicable tier.
    pub code: String,
    /// Empty when the code is unknown to every applicable tier.
    pub output: String,
    /// Tier the output came from, `None` on a lookup miss.
    pub tier: Option<Tier>,
}

/// Encode then decode `token`. Lookup misses degrade to empty strings.
pub fn resolve(
    table: &MappingTable,
    policy: &ResolutionPolicy,
    token: &str,
    ctx: &TokenContext,
) -> Resolution {
    let code = policy
        .encode(table, token, ctx)
        .map(|(_, code)| code.to_string())
        .unwrap_or_default();
    match policy.decode(table, &code, ctx) {
        Some((tier, output)) => Resolution {
            code,
            output: output.to_string(),
            tier: Some(tier),
        },
        None => Resolution {
            code,
            output: String::new(),
            tier: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingRule;

    fn ctx(at_start: bool, at_end: bool, occurrence: u32) -> TokenContext {
        TokenContext {
            at_start,
            at_end,
            occurrence,
        }
    }

    fn table(rules: &str) -> MappingTable {
        MappingTable::parse(rules).table
    }

    #[test]
    fn test_initial_beats_normal_at_word_start() {
        let t = table("4=o~X\n4=o~Y@\n");
        let policy = ResolutionPolicy::default();
        let r = resolve(&t, &policy, "o", &ctx(true, false, 1));
        assert_eq!(r.output, "Y");
        assert_eq!(r.tier, Some(Tier::Initial));

        let r = resolve(&t, &policy, "o", &ctx(false, false, 1));
        assert_eq!(r.output, "X");
        assert_eq!(r.tier, Some(Tier::Normal));
    }

    #[test]
    fn test_decode_prefers_initial_over_final() {
        let t = table("4=o~X\n4=o~I@\n4=o~F/\n");
        let r = resolve(&t, &ResolutionPolicy::default(), "o", &ctx(true, true, 1));
        assert_eq!(r.output, "I");
    }

    #[test]
    fn test_encode_prefers_final_over_initial() {
        let t = MappingTable::from_rules([
            MappingRule::new("1", "o", "a", Tier::Normal),
            MappingRule::new("2", "o", "b", Tier::Initial),
            MappingRule::new("3", "o", "c", Tier::Final),
            MappingRule::new("3", "x", "z", Tier::Normal),
        ]);
        let policy = ResolutionPolicy::default();
        let (tier, code) = policy.encode(&t, "o", &ctx(true, true, 1)).unwrap();
        assert_eq!((tier, code), (Tier::Final, "3"));
        // Decode walks Initial first, which has no code 3, then Final.
        let r = resolve(&t, &policy, "o", &ctx(true, true, 1));
        assert_eq!(r.output, "c");
        assert_eq!(r.tier, Some(Tier::Final));
    }

    #[test]
    fn test_occurrence_tiers() {
        let t = table("5=e~e\n5=e~i'\n5=e~a\"\n5=e~u:\n5=e~o;\n");
        let policy = ResolutionPolicy::default();
        let outs: Vec<String> = (1..=6)
            .map(|n| resolve(&t, &policy, "e", &ctx(false, false, n)).output)
            .collect();
        assert_eq!(outs, ["i", "a", "u", "o", "e", "e"]);
    }

    #[test]
    fn test_edges_beat_occurrence() {
        let t = table("5=e~e\n5=e~i'\n5=e~E/\n");
        let r = resolve(&t, &ResolutionPolicy::default(), "e", &ctx(false, true, 1));
        assert_eq!(r.output, "E");
    }

    #[test]
    fn test_unmapped_token_resolves_to_empty() {
        let t = table("4=o~o\n");
        let r = resolve(&t, &ResolutionPolicy::default(), "q", &ctx(true, true, 1));
        assert_eq!(r.code, "");
        assert_eq!(r.output, "");
        assert_eq!(r.tier, None);
    }

    #[test]
    fn test_code_without_output_in_reachable_tier() {
        // Code 7 only decodes in the Final tier; mid-word it drops out.
        let t = MappingTable::from_rules([
            MappingRule::new("7", "k", "K", Tier::Final),
            MappingRule::new("8", "k", "c", Tier::Normal),
        ]);
        let policy = ResolutionPolicy::default();
        assert_eq!(resolve(&t, &policy, "k", &ctx(false, true, 1)).output, "K");
        assert_eq!(resolve(&t, &policy, "k", &ctx(false, false, 1)).output, "c");
    }

    #[test]
    fn test_custom_policy_order() {
        let t = table("4=o~X\n4=o~Y@\n4=o~Z'\n");
        let policy = ResolutionPolicy {
            encode: ENCODE_ORDER.to_vec(),
            decode: vec![
                TierSelector::Occurrence,
                TierSelector::Initial,
                TierSelector::Normal,
            ],
        };
        let r = resolve(&t, &policy, "o", &ctx(true, false, 1));
        assert_eq!(r.output, "Z");
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!("Final".parse::<TierSelector>(), Ok(TierSelector::Final));
        assert_eq!(" occurrence ".parse::<TierSelector>(), Ok(TierSelector::Occurrence));
        assert!("medial".parse::<TierSelector>().is_err());
    }

    #[test]
    fn test_interior_context() {
        let c = TokenContext::interior();
        assert_eq!(TierSelector::Initial.tier(&c), None);
        assert_eq!(TierSelector::Final.tier(&c), None);
        assert_eq!(TierSelector::Occurrence.tier(&c), Some(Tier::Occurrence1));
        assert_eq!(TierSelector::Normal.tier(&c), Some(Tier::Normal));
    }
}
