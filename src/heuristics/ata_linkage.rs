//! ATA linkage - who pays to create token accounts for whom

use super::{Evidence, PrivacySignal};
use crate::context::{ScanContext, TokenAccountEventKind};
use crate::report::Severity;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct owners one fee payer must fund before it is flagged as an operator
const OPERATOR_FANOUT: usize = 2;
/// Creation-burst window in seconds, and the count that makes a burst
const BURST_WINDOW_SECS: i64 = 300;
const BURST_COUNT: usize = 3;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let creates: Vec<_> = context
        .token_account_events
        .iter()
        .filter(|e| e.kind == TokenAccountEventKind::Create)
        .collect();
    if creates.is_empty() {
        return Vec::new();
    }

    // creator -> set of owners whose accounts it paid for
    let mut edges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for event in &creates {
        if event.owner.is_empty() {
            continue;
        }
        let Some(signature) = event.signature.as_deref() else { continue };
        let Some(tx) = context.transaction(signature) else { continue };
        let Some(payer) = tx.fee_payer.as_deref() else { continue };
        if !payer.is_empty() && payer != event.owner {
            edges.entry(payer).or_default().insert(event.owner.as_str());
        }
    }

    let mut signals = Vec::new();

    for (creator, owners) in &edges {
        if owners.len() >= OPERATOR_FANOUT {
            signals.push(
                PrivacySignal::new(
                    "ata-creator-linkage",
                    "Token Account Creator Linkage",
                    Severity::High,
                    format!(
                        "{} paid to create token accounts for {} distinct owners, linking them to one operator",
                        creator,
                        owners.len()
                    ),
                )
                .with_confidence(0.85)
                .with_evidence(
                    owners
                        .iter()
                        .map(|owner| {
                            Evidence::new(format!("Created account owned by {}", owner))
                                .with_reference(*owner)
                        })
                        .collect(),
                )
                .with_mitigation(
                    "Let each owner fund its own associated-token-account creation, or use disposable funding wallets.",
                ),
            );
        }
    }

    // Burst detection over a sliding time window
    let mut times: Vec<i64> = creates.iter().filter_map(|e| e.timestamp).collect();
    times.sort_unstable();
    let mut max_in_window = 0usize;
    for (i, start) in times.iter().enumerate() {
        let in_window = times[i..]
            .iter()
            .take_while(|t| **t - *start <= BURST_WINDOW_SECS)
            .count();
        max_in_window = max_in_window.max(in_window);
    }

    if max_in_window >= BURST_COUNT {
        signals.push(
            PrivacySignal::new(
                "ata-funding-pattern",
                "Account Creation Burst",
                Severity::Medium,
                format!(
                    "{} token accounts created within a {}-minute window",
                    max_in_window,
                    BURST_WINDOW_SECS / 60
                ),
            )
            .with_confidence(0.7)
            .with_evidence(vec![Evidence::new(format!(
                "{} creations observed over {} total create events",
                max_in_window,
                creates.len()
            ))])
            .with_mitigation("Spread account setup over time; batched creation reads as one operator."),
        );
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context::ScanContextBuilder;

    #[test]
    fn creator_funding_two_owners_is_high() {
        let context = ScanContextBuilder::new("WalletY")
            .token_create("Ata1", "OwnerA", "Funder", 1_000)
            .token_create("Ata2", "OwnerB", "Funder", 500_000)
            .build();
        let signals = check(&context);
        let linkage = signals.iter().find(|s| s.id == "ata-creator-linkage").unwrap();
        assert_eq!(linkage.severity, Severity::High);
        assert!(linkage.reason.contains("Funder"));
        assert_eq!(linkage.evidence.len(), 2);
    }

    #[test]
    fn single_owner_not_flagged() {
        let context = ScanContextBuilder::new("WalletY")
            .token_create("Ata1", "OwnerA", "Funder", 1_000)
            .token_create("Ata2", "OwnerA", "Funder", 2_000)
            .build();
        let signals = check(&context);
        assert!(!signals.iter().any(|s| s.id == "ata-creator-linkage"));
    }

    #[test]
    fn self_funded_creation_not_flagged() {
        let context = ScanContextBuilder::new("WalletY")
            .token_create("Ata1", "OwnerA", "OwnerA", 1_000)
            .token_create("Ata2", "OwnerB", "OwnerB", 2_000)
            .build();
        let signals = check(&context);
        assert!(!signals.iter().any(|s| s.id == "ata-creator-linkage"));
    }

    #[test]
    fn creation_burst_is_medium() {
        let context = ScanContextBuilder::new("WalletY")
            .token_create("Ata1", "OwnerA", "OwnerA", 1_000)
            .token_create("Ata2", "OwnerB", "OwnerB", 1_060)
            .token_create("Ata3", "OwnerC", "OwnerC", 1_200)
            .build();
        let signals = check(&context);
        let burst = signals.iter().find(|s| s.id == "ata-funding-pattern").unwrap();
        assert_eq!(burst.severity, Severity::Medium);
    }

    #[test]
    fn spread_out_creations_no_burst() {
        let context = ScanContextBuilder::new("WalletY")
            .token_create("Ata1", "OwnerA", "OwnerA", 1_000)
            .token_create("Ata2", "OwnerB", "OwnerB", 10_000)
            .token_create("Ata3", "OwnerC", "OwnerC", 20_000)
            .build();
        assert!(check(&context).is_empty());
    }
}
