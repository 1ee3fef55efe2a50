//! Token account lifecycle - disposable accounts that fail to be disposable

use super::{Evidence, PrivacySignal};
use crate::context::{ScanContext, TokenAccountEventKind};
use crate::report::Severity;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct closed accounts refunding to one address before clustering is flagged
const REFUND_CLUSTER: usize = 2;
/// Create/close pairs per day that count as churn
const CHURN_PAIRS: usize = 3;
const CHURN_RATE_PER_DAY: f64 = 1.0;
/// Lifetime under which an account is "short-lived"
const SHORT_LIVED_SECS: i64 = 3600;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let creates: Vec<_> = context
        .token_account_events
        .iter()
        .filter(|e| e.kind == TokenAccountEventKind::Create)
        .collect();
    let closes: Vec<_> = context
        .token_account_events
        .iter()
        .filter(|e| e.kind == TokenAccountEventKind::Close)
        .collect();

    if creates.is_empty() && closes.is_empty() {
        return Vec::new();
    }

    let mut signals = Vec::new();

    // Rent refunds funneled to one address undo the unlinkability of burner accounts
    let mut refund_destinations: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for event in &closes {
        if event.rent_lamports == Some(0) {
            continue;
        }
        if let Some(destination) = event.rent_destination.as_deref() {
            if !destination.is_empty() {
                refund_destinations
                    .entry(destination)
                    .or_default()
                    .insert(event.account.as_str());
            }
        }
    }
    let clustered: Vec<(&&str, &BTreeSet<&str>)> = refund_destinations
        .iter()
        .filter(|(_, accounts)| accounts.len() >= REFUND_CLUSTER)
        .collect();
    if !clustered.is_empty() {
        let evidence = clustered
            .iter()
            .map(|(destination, accounts)| {
                Evidence::new(format!(
                    "{} closed accounts refund rent to {}",
                    accounts.len(),
                    destination
                ))
                .with_reference(**destination)
            })
            .collect();
        signals.push(
            PrivacySignal::new(
                "rent-refund-clustering",
                "Rent Refund Clustering",
                Severity::Medium,
                format!(
                    "{} addresses collect rent refunds from multiple closed token accounts",
                    clustered.len()
                ),
            )
            .with_confidence(0.8)
            .with_evidence(evidence)
            .with_mitigation(
                "Send rent refunds to the closing account's own owner, never a shared collector wallet.",
            ),
        );
    }

    // Create/close churn per unit time
    let pairs = creates.len().min(closes.len());
    if pairs >= CHURN_PAIRS {
        let mut times: Vec<i64> = context
            .token_account_events
            .iter()
            .filter_map(|e| e.timestamp)
            .collect();
        times.sort_unstable();
        if let (Some(first), Some(last)) = (times.first(), times.last()) {
            let span = last - first;
            if span > 0 {
                let rate = pairs as f64 / (span as f64 / 86_400.0);
                if rate > CHURN_RATE_PER_DAY {
                    signals.push(
                        PrivacySignal::new(
                            "token-account-churn",
                            "Token Account Churn",
                            Severity::Medium,
                            format!(
                                "{} create/close pairs in {:.1} days ({:.1} per day)",
                                pairs,
                                span as f64 / 86_400.0,
                                rate
                            ),
                        )
                        .with_confidence(0.7)
                        .with_evidence(vec![Evidence::new(format!(
                            "{} creates and {} closes in the scanned window",
                            creates.len(),
                            closes.len()
                        ))])
                        .with_mitigation(
                            "Rapid open/close cycles are themselves a recognizable pattern; hold accounts longer.",
                        ),
                    );
                }
            }
        }
    }

    // Accounts closed shortly after creation
    let mut create_times: BTreeMap<&str, i64> = BTreeMap::new();
    for event in &creates {
        if let Some(t) = event.timestamp {
            create_times.insert(event.account.as_str(), t);
        }
    }
    let mut short_lived: Vec<(&str, i64)> = Vec::new();
    for event in &closes {
        let (Some(close_time), Some(create_time)) =
            (event.timestamp, create_times.get(event.account.as_str()))
        else {
            continue;
        };
        let lifetime = close_time - create_time;
        if (0..SHORT_LIVED_SECS).contains(&lifetime) {
            short_lived.push((event.account.as_str(), lifetime));
        }
    }
    if !short_lived.is_empty() {
        let severity = if short_lived.len() >= 3 {
            Severity::Medium
        } else {
            Severity::Low
        };
        let evidence = short_lived
            .iter()
            .map(|(account, lifetime)| {
                Evidence::new(format!("{} lived {} minutes", account, lifetime / 60))
                    .with_reference(*account)
            })
            .collect();
        signals.push(
            PrivacySignal::new(
                "token-account-short-lived",
                "Short-Lived Token Accounts",
                severity,
                format!(
                    "{} token accounts were closed within an hour of creation",
                    short_lived.len()
                ),
            )
            .with_confidence(0.65)
            .with_evidence(evidence)
            .with_mitigation(
                "Sub-hour account lifetimes tie the create and close to one session of activity.",
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
    fn refund_clustering_at_two_accounts() {
        let context = ScanContextBuilder::new("WalletY")
            .token_close("Ata1", "Collector", 1_000)
            .token_close("Ata2", "Collector", 2_000)
            .build();
        let signals = check(&context);
        let cluster = signals.iter().find(|s| s.id == "rent-refund-clustering").unwrap();
        assert_eq!(cluster.severity, Severity::Medium);
        assert!(cluster.evidence[0].description.contains("Collector"));
    }

    #[test]
    fn distinct_refund_destinations_quiet() {
        let context = ScanContextBuilder::new("WalletY")
            .token_close("Ata1", "DestA", 1_000)
            .token_close("Ata2", "DestB", 2_000)
            .build();
        let signals = check(&context);
        assert!(!signals.iter().any(|s| s.id == "rent-refund-clustering"));
    }

    #[test]
    fn churn_detected() {
        let mut builder = ScanContextBuilder::new("WalletY");
        for i in 0..3i64 {
            let account = format!("Ata{}", i);
            builder = builder
                .token_create(&account, "WalletY", "WalletY", i * 20_000)
                .token_close(&account, "WalletY", i * 20_000 + 10_000);
        }
        let signals = check(&builder.build());
        assert!(signals.iter().any(|s| s.id == "token-account-churn"));
    }

    #[test]
    fn short_lived_account_is_low() {
        let context = ScanContextBuilder::new("WalletY")
            .token_create("Ata1", "WalletY", "WalletY", 1_000)
            .token_close("Ata1", "OwnerElse", 2_800)
            .build();
        let signals = check(&context);
        let short = signals.iter().find(|s| s.id == "token-account-short-lived").unwrap();
        assert_eq!(short.severity, Severity::Low);
    }

    #[test]
    fn hour_boundary_excluded() {
        let context = ScanContextBuilder::new("WalletY")
            .token_create("Ata1", "WalletY", "WalletY", 0)
            .token_close("Ata1", "OwnerElse", SHORT_LIVED_SECS)
            .build();
        let signals = check(&context);
        assert!(!signals.iter().any(|s| s.id == "token-account-short-lived"));
    }

    #[test]
    fn no_events_no_signal() {
        let context = ScanContextBuilder::new("WalletY").self_paid(2).build();
        assert!(check(&context).is_empty());
    }
}
