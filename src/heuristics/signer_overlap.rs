//! Signer overlap - co-signers that keep showing up next to the target

use super::{ratio, Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::report::Severity;
use std::collections::{BTreeMap, BTreeSet};

/// Share of transactions a co-signer must appear in before it is flagged
const REPEAT_THRESHOLD: f64 = 0.3;
/// Share at which a repeated co-signer escalates to HIGH
const HIGH_THRESHOLD: f64 = 0.7;
/// Distinct counterpart signers that mark a signer as an authority hub
const HUB_FANOUT: usize = 3;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let tx_count = if context.transaction_count > 0 {
        context.transaction_count
    } else {
        context.transactions.len()
    };
    if tx_count == 0 {
        return Vec::new();
    }

    let mut signer_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut set_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut co_signers: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for tx in &context.transactions {
        let others: Vec<&str> = tx
            .signers
            .iter()
            .map(String::as_str)
            .filter(|s| *s != context.target && !s.is_empty())
            .collect();

        for &signer in &others {
            *signer_counts.entry(signer).or_insert(0) += 1;
            let counterparts = co_signers.entry(signer).or_default();
            for &other in &others {
                if other != signer {
                    counterparts.insert(other);
                }
            }
        }

        // Identical multi-signer sets are a fingerprint of their own
        if others.len() >= 2 {
            let mut sorted = others.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() >= 2 {
                *set_counts.entry(sorted.join(",")).or_insert(0) += 1;
            }
        }
    }

    let mut signals = Vec::new();

    for (signer, count) in &signer_counts {
        let share = ratio(*count, tx_count);
        if share >= REPEAT_THRESHOLD {
            let severity = if share >= HIGH_THRESHOLD {
                Severity::High
            } else {
                Severity::Medium
            };
            signals.push(
                PrivacySignal::new(
                    "signer-repeated",
                    "Repeated Co-Signer",
                    severity,
                    format!(
                        "{} co-signed {} of {} transactions ({:.0}%)",
                        signer,
                        count,
                        tx_count,
                        share * 100.0
                    ),
                )
                .with_confidence(0.55 + share * 0.4)
                .with_evidence(vec![Evidence::new(format!(
                    "Co-signer {} appears in {} transactions",
                    signer, count
                ))
                .with_reference(*signer)])
                .with_mitigation(
                    "Rotate multisig participants, or isolate recurring co-signers into a separate wallet.",
                ),
            );
        }
    }

    let repeated_sets: Vec<(&String, &usize)> =
        set_counts.iter().filter(|(_, count)| **count >= 2).collect();
    if !repeated_sets.is_empty() {
        let evidence = repeated_sets
            .iter()
            .map(|(set, count)| {
                Evidence::new(format!("Signer set [{}] used in {} transactions", set, count))
            })
            .collect();
        signals.push(
            PrivacySignal::new(
                "signer-set-reuse",
                "Identical Signer Set Reuse",
                Severity::High,
                format!(
                    "{} identical multi-signer sets recur across transactions",
                    repeated_sets.len()
                ),
            )
            .with_confidence(0.85)
            .with_evidence(evidence)
            .with_mitigation(
                "Vary the signer composition of multi-party transactions; a fixed set identifies the group.",
            ),
        );
    }

    for (signer, counterparts) in &co_signers {
        if counterparts.len() >= HUB_FANOUT {
            signals.push(
                PrivacySignal::new(
                    "signer-authority-hub",
                    "Signer Authority Hub",
                    Severity::High,
                    format!(
                        "{} co-signs alongside {} distinct other signers, marking it as a coordinating authority",
                        signer,
                        counterparts.len()
                    ),
                )
                .with_confidence(0.85)
                .with_evidence(
                    counterparts
                        .iter()
                        .map(|c| Evidence::new(format!("Co-signs with {}", c)).with_reference(*c))
                        .collect(),
                )
                .with_mitigation(
                    "Split coordinating authority across unlinked keys instead of one hub signer.",
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
    fn thirty_percent_boundary_is_inclusive() {
        let context = ScanContextBuilder::new("WalletY")
            .co_signed(&["SignerA"], 3)
            .self_paid(7)
            .build();
        assert_eq!(context.transaction_count, 10);
        let signals = check(&context);
        assert!(signals.iter().any(|s| s.id == "signer-repeated"));
    }

    #[test]
    fn below_threshold_not_flagged() {
        let context = ScanContextBuilder::new("WalletY")
            .co_signed(&["SignerA"], 2)
            .self_paid(8)
            .build();
        let signals = check(&context);
        assert!(!signals.iter().any(|s| s.id == "signer-repeated"));
    }

    #[test]
    fn seventy_percent_escalates_to_high() {
        let context = ScanContextBuilder::new("WalletY")
            .co_signed(&["SignerA"], 7)
            .self_paid(3)
            .build();
        let signal = check(&context)
            .into_iter()
            .find(|s| s.id == "signer-repeated")
            .unwrap();
        assert_eq!(signal.severity, Severity::High);
    }

    #[test]
    fn repeated_signer_sets_flagged() {
        let context = ScanContextBuilder::new("WalletY")
            .co_signed(&["SignerA", "SignerB"], 2)
            .self_paid(6)
            .build();
        let signals = check(&context);
        assert!(signals.iter().any(|s| s.id == "signer-set-reuse" && s.severity == Severity::High));
    }

    #[test]
    fn authority_hub_detected() {
        let context = ScanContextBuilder::new("WalletY")
            .co_signed(&["Hub", "PeerA"], 1)
            .co_signed(&["Hub", "PeerB"], 1)
            .co_signed(&["Hub", "PeerC"], 1)
            .build();
        let signals = check(&context);
        let hub = signals.iter().find(|s| s.id == "signer-authority-hub").unwrap();
        assert!(hub.reason.contains("Hub"));
        assert_eq!(hub.severity, Severity::High);
    }

    #[test]
    fn empty_context_is_quiet() {
        let context = ScanContextBuilder::new("WalletY").build();
        assert!(check(&context).is_empty());
    }
}
