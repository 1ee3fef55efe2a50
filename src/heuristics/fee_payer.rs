//! Fee payer reuse - who funds this wallet's transaction fees

use super::{ratio, Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::report::Severity;
use std::collections::BTreeMap;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let mut payer_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut fee_paying_txs = 0usize;

    for tx in &context.transactions {
        if let Some(payer) = tx.fee_payer.as_deref() {
            if !payer.is_empty() {
                *payer_counts.entry(payer).or_insert(0) += 1;
                fee_paying_txs += 1;
            }
        }
    }

    if payer_counts.is_empty() {
        return Vec::new();
    }

    let self_paid = payer_counts.get(context.target.as_str()).copied().unwrap_or(0);
    let external: Vec<(&str, usize)> = payer_counts
        .iter()
        .filter(|(payer, _)| **payer != context.target.as_str())
        .map(|(payer, count)| (*payer, *count))
        .collect();
    let external_paid: usize = external.iter().map(|(_, count)| count).sum();

    let mut signals = Vec::new();

    if self_paid == 0 {
        // The wallet never funds itself: whoever does is operationally linked.
        let evidence = external
            .iter()
            .map(|(payer, count)| {
                Evidence::new(format!("{} paid fees for {} transactions", payer, count))
                    .with_reference(*payer)
            })
            .collect();
        signals.push(
            PrivacySignal::new(
                "fee-payer-never-self",
                "Fee Payer Never Self",
                Severity::High,
                format!(
                    "{} never paid its own transaction fees; {} external fee payers funded all {} fee-paying transactions",
                    context.target,
                    external.len(),
                    fee_paying_txs
                ),
            )
            .with_confidence(0.9)
            .with_evidence(evidence)
            .with_mitigation(
                "Fund transaction fees from the wallet itself, or rotate dedicated fee payers that never touch other activity.",
            ),
        );
    } else if !external.is_empty() {
        let external_share = ratio(external_paid, fee_paying_txs);
        let severity = if external.len() >= 2 {
            Severity::High
        } else {
            Severity::Medium
        };
        let evidence = external
            .iter()
            .map(|(payer, count)| {
                Evidence::new(format!("{} paid fees for {} transactions", payer, count))
                    .with_reference(*payer)
            })
            .collect();
        signals.push(
            PrivacySignal::new(
                "fee-payer-external",
                "External Fee Payers",
                severity,
                format!(
                    "{} of {} fee-paying transactions ({:.0}%) were funded by {} external fee payers",
                    external_paid,
                    fee_paying_txs,
                    external_share * 100.0,
                    external.len()
                ),
            )
            .with_confidence(0.55 + external_share * 0.35)
            .with_evidence(evidence)
            .with_mitigation(
                "Avoid mixing self-paid and sponsor-paid transactions in one wallet; the sponsor set becomes a linkage graph.",
            ),
        );
    }

    signals
}
