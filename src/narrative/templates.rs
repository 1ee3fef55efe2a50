//! Narrative template registry
//!
//! A fixed table mapping signal ids (exact strings or regexes for dynamic id
//! families) to a category, a statement template, and a variable extractor
//! that pulls counts and names back out of the signal's prose. First match
//! wins; unmatched ids fall back to the generic statement in the builder.

use crate::heuristics::PrivacySignal;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Thematic bucket a statement lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeCategory {
    Identity,
    Connections,
    Behavior,
    Exposure,
}

impl NarrativeCategory {
    /// Fixed paragraph order for the narrative
    pub const PRIORITY: [NarrativeCategory; 4] = [
        NarrativeCategory::Identity,
        NarrativeCategory::Connections,
        NarrativeCategory::Behavior,
        NarrativeCategory::Exposure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeCategory::Identity => "identity",
            NarrativeCategory::Connections => "connections",
            NarrativeCategory::Behavior => "behavior",
            NarrativeCategory::Exposure => "exposure",
        }
    }

    /// Section title used in rendered output
    pub fn title(&self) -> &'static str {
        match self {
            NarrativeCategory::Identity => "What I Know About You",
            NarrativeCategory::Connections => "Who You Are Connected To",
            NarrativeCategory::Behavior => "How You Behave",
            NarrativeCategory::Exposure => "Where You Are Exposed",
        }
    }
}

enum TemplatePattern {
    Exact(&'static str),
    Matches(Regex),
}

/// One registry entry: match pattern, category, statement template, optional
/// per-evidence detail templates, and the variable extractor.
pub struct SignalTemplate {
    pattern: TemplatePattern,
    pub category: NarrativeCategory,
    pub template: &'static str,
    pub detail_templates: &'static [&'static str],
    pub extract: fn(&PrivacySignal) -> BTreeMap<&'static str, String>,
}

impl SignalTemplate {
    fn matches(&self, signal_id: &str) -> bool {
        match &self.pattern {
            TemplatePattern::Exact(id) => *id == signal_id,
            TemplatePattern::Matches(regex) => regex.is_match(signal_id),
        }
    }
}

fn exact(
    id: &'static str,
    category: NarrativeCategory,
    template: &'static str,
    detail_templates: &'static [&'static str],
    extract: fn(&PrivacySignal) -> BTreeMap<&'static str, String>,
) -> SignalTemplate {
    SignalTemplate { pattern: TemplatePattern::Exact(id), category, template, detail_templates, extract }
}

fn matching(
    pattern: &str,
    category: NarrativeCategory,
    template: &'static str,
    detail_templates: &'static [&'static str],
    extract: fn(&PrivacySignal) -> BTreeMap<&'static str, String>,
) -> SignalTemplate {
    SignalTemplate {
        pattern: TemplatePattern::Matches(Regex::new(pattern).expect("Invalid template pattern")),
        category,
        template,
        detail_templates,
        extract,
    }
}

static FIRST_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid regex"));

/// Default extractor: first number in the reason as {count}
fn extract_count(signal: &PrivacySignal) -> BTreeMap<&'static str, String> {
    let mut vars = BTreeMap::new();
    let count = FIRST_NUMBER_REGEX
        .find(&signal.reason)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "several".to_string());
    vars.insert("count", count);
    vars
}

/// Entity extractor: names pulled from "Name: N transfers" evidence lines,
/// plus the leading count from the reason.
fn extract_entities(signal: &PrivacySignal) -> BTreeMap<&'static str, String> {
    let mut vars = extract_count(signal);
    let names: Vec<&str> = signal
        .evidence
        .iter()
        .take(3)
        .filter_map(|e| e.description.split(':').next())
        .collect();
    let entities = if names.is_empty() { "known entities".to_string() } else { names.join(", ") };
    vars.insert("entities", entities);
    vars
}

/// Subject extractor: the first word of the reason (an address in most
/// linkage signals), plus {count}.
fn extract_subject(signal: &PrivacySignal) -> BTreeMap<&'static str, String> {
    let mut vars = extract_count(signal);
    let subject = signal
        .reason
        .split_whitespace()
        .next()
        .unwrap_or("an address")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string();
    vars.insert("subject", subject);
    vars
}

/// Replace `{var}` placeholders; unknown placeholders are left in place
pub fn interpolate(template: &str, vars: &BTreeMap<&'static str, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

static REGISTRY: Lazy<Vec<SignalTemplate>> = Lazy::new(|| {
    use NarrativeCategory::*;
    vec![
        // --- identity ---
        exact(
            "memo-pii-exposure",
            Identity,
            "You wrote personal contact details into permanent transaction memos - {count} of them are sitting on-chain for anyone to read.",
            &["One memo gave me this: {evidence}"],
            extract_count,
        ),
        exact(
            "memo-descriptive-content",
            Identity,
            "Your memos describe what you are doing in your own words; I read all {count} of them.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "identity-sol-domain",
            Identity,
            "You attached a human-readable .sol name to this wallet. I no longer need your address - I know your handle.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "identity-nft-metadata",
            Identity,
            "Your NFT metadata activity ({count} instructions) ties creative output and its public creator fields to this address.",
            &["{evidence}"],
            extract_count,
        ),
        // --- connections ---
        exact(
            "fee-payer-never-self",
            Connections,
            "You never pay your own transaction fees. Whoever funds {subject} is operationally joined to it, and I am watching them too.",
            &["{evidence}"],
            extract_subject,
        ),
        exact(
            "fee-payer-external",
            Connections,
            "External wallets pay a share of your fees; every sponsor is another thread tying your wallets together.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "signer-repeated",
            Connections,
            "{subject} keeps co-signing your transactions - a standing relationship I can follow.",
            &["{evidence}"],
            extract_subject,
        ),
        exact(
            "signer-set-reuse",
            Connections,
            "The same multi-signer lineup shows up in transaction after transaction; the group itself is the identifier.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "signer-authority-hub",
            Connections,
            "{subject} coordinates signatures across many parties. Find the hub, map the network.",
            &["{evidence}"],
            extract_subject,
        ),
        exact(
            "ata-creator-linkage",
            Connections,
            "One wallet paid to create token accounts for {count} different owners. That is an operator signature, and it joins all of them.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "ata-funding-pattern",
            Connections,
            "Token accounts appear in bursts - {count} in a single window - which reads as one actor doing setup.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "counterparty-reuse",
            Connections,
            "You keep returning to the same counterparty; {count} transfers draw the relationship for me.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "counterparty-program-combo",
            Connections,
            "Same counterparty, same program, {count} times over. A habit that specific is nearly a signature.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "pda-reuse",
            Connections,
            "You touch the same program-derived account over and over ({count} times); your protocol positions are mapped.",
            &["{evidence}"],
            extract_count,
        ),
        // --- behavior ---
        exact(
            "timing-burst",
            Behavior,
            "Your transactions arrive in dense bursts - I can delimit your active sessions down to the hour.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "timing-regular-interval",
            Behavior,
            "Your transactions tick on a near-fixed interval. That is a bot, and bots have owners.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "timing-timezone-pattern",
            Behavior,
            "{count}% of your activity falls in a narrow band of hours; I can estimate your timezone from it.",
            &["{evidence}"],
            extract_count,
        ),
        matching(
            r"^instruction-",
            Behavior,
            "You compose transactions the same way every time; the instruction ordering itself fingerprints your tooling.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "program-usage-profile",
            Behavior,
            "You lean on a set of only {count} programs, which carves you out of the crowd.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "priority-fee-consistent",
            Behavior,
            "You reuse the exact same priority fee ({count} micro-lamports); the value links transactions nothing else would.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "stake-delegation-pattern",
            Behavior,
            "Your stake keeps landing on the same validators - loyalty is a stable preference I can track.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "stake-timing-correlation",
            Behavior,
            "Your staking operations run on a schedule; schedules belong to people and scripts, both traceable.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "address-high-diversity",
            Behavior,
            "One address carries your whole on-chain life across {count} activity categories. Everything connects to everything.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "address-moderate-diversity",
            Behavior,
            "This address mixes {count} different kinds of activity; each one narrows who you could be.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "address-long-term-usage",
            Behavior,
            "You have used this address for {count} days straight. Long histories are deep histories.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "token-account-churn",
            Behavior,
            "You open and close token accounts rapidly - {count} create/close pairs - and the churn itself is a pattern.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "token-account-short-lived",
            Behavior,
            "Your burner accounts live less than an hour; their short lives bracket exactly what you did with them.",
            &["{evidence}"],
            extract_count,
        ),
        exact(
            "rent-refund-clustering",
            Behavior,
            "Your disposable accounts all refund rent to the same place. The collector address undoes every burner.",
            &["{evidence}"],
            extract_count,
        ),
        // --- exposure ---
        matching(
            r"^known-entity-",
            Exposure,
            "You transact directly with {entities} - counterparties that keep records and answer subpoenas.",
            &["Entity interaction: {evidence}"],
            extract_entities,
        ),
        exact(
            "memo-usage",
            Exposure,
            "You attach memo text at all, which most wallets never do; it marks your transactions in any index.",
            &["{evidence}"],
            extract_count,
        ),
    ]
});

/// Linear scan of the registry; first matching entry wins.
pub fn find_template(signal_id: &str) -> Option<&'static SignalTemplate> {
    REGISTRY.iter().find(|t| t.matches(signal_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::{Evidence, PrivacySignal};
    use crate::report::Severity;

    #[test]
    fn exact_ids_resolve() {
        assert_eq!(find_template("memo-pii-exposure").unwrap().category, NarrativeCategory::Identity);
        assert_eq!(find_template("fee-payer-never-self").unwrap().category, NarrativeCategory::Connections);
        assert_eq!(find_template("timing-burst").unwrap().category, NarrativeCategory::Behavior);
    }

    #[test]
    fn dynamic_ids_resolve_via_regex() {
        assert_eq!(find_template("known-entity-exchange").unwrap().category, NarrativeCategory::Exposure);
        assert_eq!(find_template("known-entity-frequent-abc123").unwrap().category, NarrativeCategory::Exposure);
        assert_eq!(find_template("instruction-sequence-pattern").unwrap().category, NarrativeCategory::Behavior);
    }

    #[test]
    fn unknown_id_returns_none() {
        assert!(find_template("totally-unknown-signal-id").is_none());
    }

    #[test]
    fn count_extracted_from_reason() {
        let signal = PrivacySignal::new(
            "counterparty-reuse",
            "Counterparty Reuse",
            Severity::Medium,
            "4 transfers with the same counterparty Friend",
        );
        let template = find_template("counterparty-reuse").unwrap();
        let vars = (template.extract)(&signal);
        assert_eq!(vars.get("count").map(String::as_str), Some("4"));
        let text = interpolate(template.template, &vars);
        assert!(text.contains("4 transfers"));
    }

    #[test]
    fn entities_extracted_from_evidence() {
        let signal = PrivacySignal::new(
            "known-entity-exchange",
            "Known Exchange Interaction",
            Severity::High,
            "3 transfers with 1 known exchange entities",
        )
        .with_evidence(vec![Evidence::new("Binance Deposit: 3 transfers")]);
        let template = find_template("known-entity-exchange").unwrap();
        let vars = (template.extract)(&signal);
        assert_eq!(vars.get("entities").map(String::as_str), Some("Binance Deposit"));
    }

    #[test]
    fn missing_count_degrades_to_several() {
        let signal = PrivacySignal::new(
            "counterparty-reuse",
            "Counterparty Reuse",
            Severity::Medium,
            "repeated transfers with one counterparty",
        );
        let vars = extract_count(&signal);
        assert_eq!(vars.get("count").map(String::as_str), Some("several"));
    }

    #[test]
    fn registry_priority_order_is_fixed() {
        assert_eq!(
            NarrativeCategory::PRIORITY,
            [
                NarrativeCategory::Identity,
                NarrativeCategory::Connections,
                NarrativeCategory::Behavior,
                NarrativeCategory::Exposure
            ]
        );
    }
}
