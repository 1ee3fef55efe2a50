//! Counterparty and PDA reuse - who the wallet keeps coming back to

use super::{Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::report::Severity;
use std::collections::{BTreeMap, BTreeSet};

/// Interactions before a counterparty (or counterparty+program pair) is flagged
const REUSE_THRESHOLD: usize = 3;
/// Interactions at which the flag escalates to HIGH
const STRONG_THRESHOLD: usize = 5;
/// Repeats on one program-derived address before it is flagged
const PDA_THRESHOLD: usize = 5;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let mut signals = Vec::new();

    // Per-counterparty transfer tallies
    let mut counterparty_counts: BTreeMap<&str, usize> = BTreeMap::new();
    // (counterparty, program) pair tallies, joined through the transfer's transaction
    let mut pair_counts: BTreeMap<(String, String), usize> = BTreeMap::new();

    let mut programs_by_signature: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for instruction in &context.instructions {
        programs_by_signature
            .entry(instruction.signature.as_str())
            .or_default()
            .insert(instruction.program_id.as_str());
    }

    for transfer in &context.transfers {
        let other = if transfer.from == context.target {
            transfer.to.as_str()
        } else if transfer.to == context.target {
            transfer.from.as_str()
        } else {
            continue;
        };
        if other.is_empty() || other == context.target {
            continue;
        }
        *counterparty_counts.entry(other).or_insert(0) += 1;

        if let Some(programs) = programs_by_signature.get(transfer.signature.as_str()) {
            for program in programs {
                *pair_counts
                    .entry((other.to_string(), (*program).to_string()))
                    .or_insert(0) += 1;
            }
        }
    }

    for (counterparty, count) in &counterparty_counts {
        if *count >= REUSE_THRESHOLD {
            let severity = if *count >= STRONG_THRESHOLD {
                Severity::High
            } else {
                Severity::Medium
            };
            signals.push(
                PrivacySignal::new(
                    "counterparty-reuse",
                    "Counterparty Reuse",
                    severity,
                    format!("{} transfers with the same counterparty {}", count, counterparty),
                )
                .with_confidence(0.6 + (*count as f64 * 0.03).min(0.3))
                .with_evidence(vec![Evidence::new(format!(
                    "Counterparty {} appears in {} transfers",
                    counterparty, count
                ))
                .with_reference(*counterparty)])
                .with_mitigation(
                    "Repeated transfers to one address build a relationship graph; vary receiving addresses.",
                ),
            );
        }
    }

    // Counterparty tied to a specific program is more identifying than either alone
    for ((counterparty, program), count) in &pair_counts {
        if *count >= REUSE_THRESHOLD {
            let severity = if *count >= STRONG_THRESHOLD {
                Severity::High
            } else {
                Severity::Medium
            };
            signals.push(
                PrivacySignal::new(
                    "counterparty-program-combo",
                    "Counterparty-Program Combination",
                    severity,
                    format!(
                        "{} transfers with {} always through program {}",
                        count, counterparty, program
                    ),
                )
                .with_confidence(0.7 + (*count as f64 * 0.03).min(0.25))
                .with_evidence(vec![Evidence::new(format!(
                    "Pair ({}, {}) repeated {} times",
                    counterparty, program, count
                ))
                .with_reference(counterparty.clone())])
                .with_mitigation(
                    "A fixed counterparty-plus-program pairing is a behavioral signature; break the routine.",
                ),
            );
        }
    }

    let mut pda_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for interaction in &context.pda_interactions {
        if !interaction.address.is_empty() {
            *pda_counts.entry(interaction.address.as_str()).or_insert(0) += 1;
        }
    }
    for (address, count) in &pda_counts {
        if *count >= PDA_THRESHOLD {
            signals.push(
                PrivacySignal::new(
                    "pda-reuse",
                    "PDA Reuse",
                    Severity::Medium,
                    format!("{} repeated interactions with program-derived address {}", count, address),
                )
                .with_confidence(0.65)
                .with_evidence(vec![Evidence::new(format!(
                    "PDA {} touched {} times",
                    address, count
                ))
                .with_reference(*address)])
                .with_mitigation(
                    "Repeated PDA writes chart protocol habits; use fresh positions or accounts where the protocol allows.",
                ),
            );
        }
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context::ScanContextBuilder;

    #[test]
    fn three_transfers_flag_counterparty_medium() {
        let context = ScanContextBuilder::new("WalletY").transfers_with("Friend", 3).build();
        let signals = check(&context);
        let reuse = signals.iter().find(|s| s.id == "counterparty-reuse").unwrap();
        assert_eq!(reuse.severity, Severity::Medium);
    }

    #[test]
    fn five_transfers_escalate_to_high() {
        let context = ScanContextBuilder::new("WalletY").transfers_with("Friend", 5).build();
        let signals = check(&context);
        let reuse = signals.iter().find(|s| s.id == "counterparty-reuse").unwrap();
        assert_eq!(reuse.severity, Severity::High);
    }

    #[test]
    fn two_transfers_are_quiet() {
        let context = ScanContextBuilder::new("WalletY").transfers_with("Friend", 2).build();
        assert!(check(&context).is_empty());
    }

    #[test]
    fn pda_reuse_at_five() {
        let context = ScanContextBuilder::new("WalletY")
            .pda("Pda111", "LendingProgram", 5)
            .build();
        let signals = check(&context);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].id, "pda-reuse");
    }

    #[test]
    fn pda_four_repeats_quiet() {
        let context = ScanContextBuilder::new("WalletY")
            .pda("Pda111", "LendingProgram", 4)
            .build();
        assert!(check(&context).is_empty());
    }

    #[test]
    fn combo_weighted_at_least_as_high_as_plain_reuse() {
        // Same counterparty and the same program on every transfer
        let mut builder = ScanContextBuilder::new("WalletY");
        for _ in 0..3 {
            builder = builder.transfers_with("Friend", 1);
        }
        let mut context = builder.build();
        for transfer in &context.transfers {
            context.instructions.push(crate::context::InstructionRecord {
                signature: transfer.signature.clone(),
                program_id: "PayProgram".to_string(),
                accounts: Vec::new(),
                decoded: None,
            });
        }
        let signals = check(&context);
        let plain = signals.iter().find(|s| s.id == "counterparty-reuse").unwrap();
        let combo = signals.iter().find(|s| s.id == "counterparty-program-combo").unwrap();
        assert!(combo.severity >= plain.severity);
        assert!(combo.confidence >= plain.confidence);
    }
}
