//! Instruction fingerprinting - recurring program-call sequences

use super::{ratio, Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::report::Severity;
use std::collections::BTreeMap;

/// Share of transactions one fingerprint must cover to be flagged
const SEQUENCE_THRESHOLD: f64 = 0.2;
/// Program-set size at or below which the usage profile is "narrow"
const NARROW_PROGRAM_SET: usize = 2;
const NARROW_MIN_TXS: usize = 5;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    // Ordered program sequence per transaction, in instruction arrival order
    let mut sequences: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for instruction in &context.instructions {
        sequences
            .entry(instruction.signature.as_str())
            .or_default()
            .push(instruction.program_id.as_str());
    }

    if sequences.is_empty() {
        return Vec::new();
    }

    let fingerprinted_txs = sequences.len();
    let mut fingerprint_counts: BTreeMap<String, usize> = BTreeMap::new();
    for sequence in sequences.values() {
        *fingerprint_counts.entry(sequence.join("->")).or_insert(0) += 1;
    }

    let mut signals = Vec::new();

    let mut recurring: Vec<(&String, &usize)> = fingerprint_counts
        .iter()
        .filter(|(_, count)| **count >= 2 && ratio(**count, fingerprinted_txs) >= SEQUENCE_THRESHOLD)
        .collect();
    recurring.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    if !recurring.is_empty() {
        let top_share = ratio(*recurring[0].1, fingerprinted_txs);
        let evidence = recurring
            .iter()
            .take(3)
            .map(|(fingerprint, count)| {
                Evidence::new(format!(
                    "Sequence {} in {} of {} transactions",
                    fingerprint, count, fingerprinted_txs
                ))
            })
            .collect();
        signals.push(
            PrivacySignal::new(
                "instruction-sequence-pattern",
                "Recurring Instruction Sequence",
                Severity::Medium,
                format!(
                    "{} instruction sequences recur across transactions; the most common covers {:.0}% of them",
                    recurring.len(),
                    top_share * 100.0
                ),
            )
            .with_confidence(0.6 + top_share * 0.3)
            .with_evidence(evidence)
            .with_mitigation(
                "Identical instruction orderings read like a client fingerprint; vary transaction composition.",
            ),
        );
    }

    // Narrow overall program set
    let mut program_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for instruction in &context.instructions {
        *program_counts.entry(instruction.program_id.as_str()).or_insert(0) += 1;
    }
    if fingerprinted_txs >= NARROW_MIN_TXS && program_counts.len() <= NARROW_PROGRAM_SET {
        let evidence = program_counts
            .iter()
            .map(|(program, count)| Evidence::new(format!("{}: {} instructions", program, count)))
            .collect();
        signals.push(
            PrivacySignal::new(
                "program-usage-profile",
                "Narrow Program Usage Profile",
                Severity::Medium,
                format!(
                    "Only {} distinct programs appear across all {} transactions",
                    program_counts.len(),
                    fingerprinted_txs
                ),
            )
            .with_confidence(0.65)
            .with_evidence(evidence)
            .with_mitigation(
                "A small fixed program set distinguishes this wallet from the broader population.",
            ),
        );
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context::ScanContextBuilder;

    #[test]
    fn recurring_sequence_flagged_at_twenty_percent() {
        let mut builder = ScanContextBuilder::new("WalletY");
        for _ in 0..2 {
            builder = builder.instruction_sequence(&["ProgA", "ProgB", "ProgC"]);
        }
        for i in 0..8 {
            let unique = format!("Prog{}", i);
            builder = builder.instruction_sequence(&[unique.as_str()]);
        }
        let signals = check(&builder.build());
        let pattern = signals.iter().find(|s| s.id == "instruction-sequence-pattern").unwrap();
        assert_eq!(pattern.severity, Severity::Medium);
        assert!(pattern.evidence[0].description.contains("ProgA->ProgB->ProgC"));
    }

    #[test]
    fn below_threshold_is_quiet() {
        let mut builder = ScanContextBuilder::new("WalletY");
        builder = builder.instruction_sequence(&["ProgA", "ProgB"]);
        for i in 0..9 {
            let unique = format!("Prog{}", i);
            builder = builder.instruction_sequence(&[unique.as_str()]);
        }
        let signals = check(&builder.build());
        assert!(!signals.iter().any(|s| s.id == "instruction-sequence-pattern"));
    }

    #[test]
    fn narrow_program_set_flagged() {
        let mut builder = ScanContextBuilder::new("WalletY");
        for _ in 0..5 {
            builder = builder.instruction_sequence(&["ProgA", "ProgB"]);
        }
        let signals = check(&builder.build());
        assert!(signals.iter().any(|s| s.id == "program-usage-profile"));
    }

    #[test]
    fn no_instructions_no_signal() {
        let context = ScanContextBuilder::new("WalletY").self_paid(5).build();
        assert!(check(&context).is_empty());
    }
}
