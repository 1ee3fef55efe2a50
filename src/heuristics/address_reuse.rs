//! Address reuse - one address spread across many activity categories

use super::{Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::programs::{self, ProgramCategory};
use crate::report::Severity;
use std::collections::BTreeMap;

/// Distinct categories that mark the wallet as highly diverse
const HIGH_DIVERSITY: usize = 4;
const MODERATE_DIVERSITY: usize = 3;
/// Span past which sustained usage becomes a signal on its own
const LONG_TERM_SECS: i64 = 90 * 24 * 3600;
const LONG_TERM_MIN_TXS: usize = 10;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let mut signals = Vec::new();

    let mut category_counts: BTreeMap<ProgramCategory, usize> = BTreeMap::new();
    for instruction in &context.instructions {
        let label = context.labels.get(&instruction.program_id);
        if let Some(category) = programs::categorize_program(&instruction.program_id, label) {
            *category_counts.entry(category).or_insert(0) += 1;
        }
    }

    let distinct = category_counts.len();
    if distinct >= MODERATE_DIVERSITY {
        let evidence: Vec<Evidence> = category_counts
            .iter()
            .map(|(category, count)| {
                Evidence::new(format!("{}: {} instructions", category.as_str(), count))
            })
            .collect();
        let categories: Vec<&str> = category_counts.keys().map(|c| c.as_str()).collect();

        if distinct >= HIGH_DIVERSITY {
            signals.push(
                PrivacySignal::new(
                    "address-high-diversity",
                    "High Activity Diversity",
                    Severity::High,
                    format!(
                        "One address spans {} activity categories ({}), concentrating an entire on-chain life in one place",
                        distinct,
                        categories.join(", ")
                    ),
                )
                .with_confidence(0.85)
                .with_evidence(evidence)
                .with_mitigation(
                    "Split unrelated activity (DeFi, NFT, DAO, gaming) across dedicated wallets.",
                ),
            );
        } else {
            signals.push(
                PrivacySignal::new(
                    "address-moderate-diversity",
                    "Moderate Activity Diversity",
                    Severity::Medium,
                    format!(
                        "One address spans {} activity categories ({})",
                        distinct,
                        categories.join(", ")
                    ),
                )
                .with_confidence(0.7)
                .with_evidence(evidence)
                .with_mitigation("Consider separate wallets per activity category."),
            );
        }
    }

    let tx_count = if context.transaction_count > 0 {
        context.transaction_count
    } else {
        context.transactions.len()
    };
    if let Some(span) = context.span_seconds() {
        if span > LONG_TERM_SECS && tx_count >= LONG_TERM_MIN_TXS {
            let days = span / 86_400;
            signals.push(
                PrivacySignal::new(
                    "address-long-term-usage",
                    "Long-Term Address Usage",
                    Severity::Low,
                    format!(
                        "Sustained activity over {} days ({} transactions) accumulates a rich behavioral history",
                        days, tx_count
                    ),
                )
                .with_confidence(0.65)
                .with_evidence(vec![Evidence::new(format!(
                    "Activity span {} days with {} transactions",
                    days, tx_count
                ))])
                .with_mitigation("Rotate to fresh addresses periodically; old history never disappears."),
            );
        }
    }

    signals
}
