//! Memo exposure - caller-supplied text stored permanently in transaction logs

use super::{Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::programs;
use crate::report::Severity;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid regex")
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?[0-9][0-9()\s.-]{7,}[0-9]").expect("Invalid regex")
});

static SSN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b").expect("Invalid regex")
});

static CREDIT_CARD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[0-9]{4}[ -]?){3}[0-9]{4}\b").expect("Invalid regex")
});

/// PII detectors in priority order; the first match wins per memo
static PII_PATTERNS: Lazy<Vec<(&'static str, &'static Regex, f64)>> = Lazy::new(|| {
    vec![
        ("email address", &*EMAIL_REGEX, 0.95),
        ("phone number", &*PHONE_REGEX, 0.75),
        ("social security number", &*SSN_REGEX, 0.95),
        ("credit card number", &*CREDIT_CARD_REGEX, 0.9),
    ]
});

/// Minimum length/word count for a memo to count as descriptive prose
const DESCRIPTIVE_MIN_LEN: usize = 16;
const DESCRIPTIVE_MIN_WORDS: usize = 3;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let mut memos: Vec<(String, String)> = Vec::new();

    for tx in &context.transactions {
        if let Some(memo) = &tx.memo {
            if !memo.is_empty() {
                memos.push((tx.signature.clone(), memo.clone()));
            }
        }
    }
    for instruction in &context.instructions {
        if programs::is_memo_program(&instruction.program_id) {
            if let Some(text) = instruction.decoded.as_ref().and_then(|d| d.as_str()) {
                if !text.is_empty() {
                    memos.push((instruction.signature.clone(), text.to_string()));
                }
            }
        }
    }

    if memos.is_empty() {
        return Vec::new();
    }

    let mut pii_evidence: Vec<Evidence> = Vec::new();
    let mut max_pii_confidence: f64 = 0.0;
    let mut descriptive: Vec<&(String, String)> = Vec::new();
    let mut plain = 0usize;

    for entry in &memos {
        let (signature, text) = entry;
        let mut matched = false;
        for (kind, regex, confidence) in PII_PATTERNS.iter() {
            if let Some(found) = regex.find(text) {
                pii_evidence.push(
                    Evidence::new(format!("{} found in memo: \"{}\"", kind, found.as_str()))
                        .with_severity(Severity::High)
                        .with_reference(signature.clone()),
                );
                max_pii_confidence = max_pii_confidence.max(*confidence);
                matched = true;
                break;
            }
        }
        if matched {
            continue;
        }
        if text.len() >= DESCRIPTIVE_MIN_LEN
            && text.split_whitespace().count() >= DESCRIPTIVE_MIN_WORDS
        {
            descriptive.push(entry);
        } else {
            plain += 1;
        }
    }

    let mut signals = Vec::new();

    if !pii_evidence.is_empty() {
        let count = pii_evidence.len();
        signals.push(
            PrivacySignal::new(
                "memo-pii-exposure",
                "PII in Transaction Memos",
                Severity::High,
                format!(
                    "{} memos contain personally identifying information stored permanently on-chain",
                    count
                ),
            )
            .with_confidence(max_pii_confidence)
            .with_evidence(pii_evidence)
            .with_mitigation(
                "Never put contact details or identifiers in memos; memo text is public and immutable.",
            ),
        );
    }

    if !descriptive.is_empty() {
        let evidence = descriptive
            .iter()
            .map(|(signature, text)| {
                Evidence::new(format!("Memo text: \"{}\"", truncate(text, 60)))
                    .with_reference(signature.clone())
            })
            .collect();
        signals.push(
            PrivacySignal::new(
                "memo-descriptive-content",
                "Descriptive Memo Content",
                Severity::Medium,
                format!(
                    "{} memos carry free-text descriptions of the wallet's activity",
                    descriptive.len()
                ),
            )
            .with_confidence(0.7)
            .with_evidence(evidence)
            .with_mitigation("Drop human-readable notes from memos, or keep them off-chain."),
        );
    }

    if plain > 0 {
        signals.push(
            PrivacySignal::new(
                "memo-usage",
                "Memo Usage",
                Severity::Low,
                format!(
                    "{} transactions attach memo text; most wallets never use the memo program",
                    plain
                ),
            )
            .with_confidence(0.6)
            .with_mitigation("Avoid the memo program entirely unless a protocol requires it."),
        );
    }

    signals
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context::ScanContextBuilder;

    #[test]
    fn email_in_memo_instruction_is_high_pii() {
        let context = ScanContextBuilder::new("WalletY")
            .memo_instruction("contact me at test@example.com")
            .build();
        let signals = check(&context);
        let pii = signals.iter().find(|s| s.id == "memo-pii-exposure").unwrap();
        assert_eq!(pii.severity, Severity::High);
        assert!(pii.evidence.iter().any(|e| e.description.contains("test@example.com")));
    }

    #[test]
    fn email_beats_phone_when_both_present() {
        let context = ScanContextBuilder::new("WalletY")
            .memo("mail test@example.com or call 555-867-5309 x22")
            .build();
        let signals = check(&context);
        let pii = signals.iter().find(|s| s.id == "memo-pii-exposure").unwrap();
        assert_eq!(pii.evidence.len(), 1);
        assert!(pii.evidence[0].description.contains("email address"));
    }

    #[test]
    fn ssn_detected() {
        let context = ScanContextBuilder::new("WalletY").memo("ssn 123-45-6789").build();
        let signals = check(&context);
        assert!(signals.iter().any(|s| s.id == "memo-pii-exposure"));
    }

    #[test]
    fn descriptive_memo_is_medium() {
        let context = ScanContextBuilder::new("WalletY")
            .memo("paying rent for the downtown apartment")
            .build();
        let signals = check(&context);
        assert!(signals.iter().any(|s| s.id == "memo-descriptive-content" && s.severity == Severity::Medium));
        assert!(!signals.iter().any(|s| s.id == "memo-pii-exposure"));
    }

    #[test]
    fn short_memo_is_low_usage() {
        let context = ScanContextBuilder::new("WalletY").memo("gm").build();
        let signals = check(&context);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].id, "memo-usage");
        assert_eq!(signals[0].severity, Severity::Low);
    }

    #[test]
    fn mixed_memos_emit_all_three_kinds() {
        let context = ScanContextBuilder::new("WalletY")
            .memo("reach me at test@example.com")
            .memo("weekly payroll for the art collective")
            .memo("ok")
            .build();
        let signals = check(&context);
        let ids: Vec<&str> = signals.iter().map(|s| s.id.as_str()).collect();
        assert!(ids.contains(&"memo-pii-exposure"));
        assert!(ids.contains(&"memo-descriptive-content"));
        assert!(ids.contains(&"memo-usage"));
    }

    #[test]
    fn no_memos_no_signal() {
        let context = ScanContextBuilder::new("WalletY").self_paid(3).build();
        assert!(check(&context).is_empty());
    }
}
