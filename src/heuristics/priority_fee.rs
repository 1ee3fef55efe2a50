//! Priority fee fingerprinting - a fixed fee value is a linkable signature

use super::{ratio, Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::report::Severity;
use std::collections::BTreeMap;

/// Share of fee-setting transactions the modal value must cover
const DOMINANT_SHARE: f64 = 0.5;
/// Minimum occurrences of the modal value, to avoid tiny-sample false positives
const MIN_OCCURRENCES: usize = 3;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let mut value_counts: BTreeMap<u64, usize> = BTreeMap::new();
    let mut total = 0usize;

    for tx in &context.transactions {
        if let Some(fee) = tx.priority_fee {
            if fee > 0 {
                *value_counts.entry(fee).or_insert(0) += 1;
                total += 1;
            }
        }
    }

    if total == 0 {
        return Vec::new();
    }

    // BTreeMap iteration picks the smallest value on a tie, deterministically
    let Some((value, count)) = value_counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
    else {
        return Vec::new();
    };

    let share = ratio(*count, total);
    if *count >= MIN_OCCURRENCES && share > DOMINANT_SHARE {
        return vec![
            PrivacySignal::new(
                "priority-fee-consistent",
                "Consistent Priority Fee",
                Severity::Medium,
                format!(
                    "The priority fee {} recurs in {} of {} fee-setting transactions ({:.0}%)",
                    value,
                    count,
                    total,
                    share * 100.0
                ),
            )
            .with_confidence(0.6 + share * 0.3)
            .with_evidence(vec![Evidence::new(format!(
                "Fee value {} micro-lamports used {} times",
                value, count
            ))])
            .with_mitigation(
                "Randomize priority fees within a band; an exact recurring value links otherwise unrelated transactions.",
            ),
        ];
    }

    Vec::new()
}
