//! Known entity interaction - transfers touching labeled addresses

use super::{Evidence, PrivacySignal};
use crate::context::{Label, LabelType, ScanContext};
use crate::report::Severity;

/// Label types in emission order, with the signal id and severity each maps to
const TYPE_SIGNALS: &[(LabelType, &str, Severity, f64)] = &[
    (LabelType::Exchange, "known-entity-exchange", Severity::High, 0.9),
    (LabelType::Bridge, "known-entity-bridge", Severity::Medium, 0.75),
    (LabelType::Protocol, "known-entity-protocol", Severity::Low, 0.6),
    (LabelType::Service, "known-entity-service", Severity::Low, 0.6),
    (LabelType::Other, "known-entity-other", Severity::Low, 0.5),
];

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    if context.transfers.is_empty() || context.labels.is_empty() {
        return Vec::new();
    }

    // (label, interaction count) per labeled address that actually appears
    let mut matched: Vec<(&Label, usize)> = Vec::new();
    for label in context.labels.values() {
        let count = context
            .transfers
            .iter()
            .filter(|t| t.from == label.address || t.to == label.address)
            .count();
        if count > 0 {
            matched.push((label, count));
        }
    }

    let mut signals = Vec::new();

    for (label_type, id, severity, confidence) in TYPE_SIGNALS {
        let of_type: Vec<&(&Label, usize)> = matched
            .iter()
            .filter(|(label, _)| label.label_type == *label_type)
            .collect();
        if of_type.is_empty() {
            continue;
        }

        let total: usize = of_type.iter().map(|(_, count)| count).sum();
        let evidence = of_type
            .iter()
            .map(|(label, count)| {
                Evidence::new(format!("{}: {} transfers", label.name, count))
                    .with_reference(label.address.clone())
            })
            .collect();

        signals.push(
            PrivacySignal::new(
                id,
                &format!("Known {} Interaction", capitalize(label_type.as_str())),
                *severity,
                format!(
                    "{} transfers with {} known {} entities",
                    total,
                    of_type.len(),
                    label_type.as_str()
                ),
            )
            .with_confidence(*confidence)
            .with_evidence(evidence)
            .with_mitigation(mitigation_for(*label_type)),
        );
    }

    signals
}

fn mitigation_for(label_type: LabelType) -> &'static str {
    match label_type {
        LabelType::Exchange => {
            "Route exchange deposits through an intermediate wallet; direct deposits bind this address to a KYC identity."
        }
        LabelType::Bridge => {
            "Bridge transfers link activity across chains; use fresh addresses on both sides."
        }
        _ => "Interactions with well-known addresses narrow the anonymity set; spread activity across wallets.",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context::{ScanContextBuilder, SolanaAddresses};

    #[test]
    fn exchange_interaction_is_high() {
        let context = ScanContextBuilder::new("WalletY")
            .transfers_with(SolanaAddresses::TEST_EXCHANGE_DEPOSIT, 2)
            .label(SolanaAddresses::TEST_EXCHANGE_DEPOSIT, "Binance Deposit", LabelType::Exchange)
            .build();
        let signals = check(&context);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].id, "known-entity-exchange");
        assert_eq!(signals[0].severity, Severity::High);
        assert!(signals[0].evidence[0].description.contains("Binance Deposit"));
        assert_eq!(
            signals[0].evidence[0].reference.as_deref(),
            Some(SolanaAddresses::TEST_EXCHANGE_DEPOSIT)
        );
    }

    #[test]
    fn one_signal_per_label_type() {
        let context = ScanContextBuilder::new("WalletY")
            .transfers_with("ExchangeAddr", 1)
            .transfers_with("BridgeAddr", 1)
            .transfers_with("ProtocolAddr", 1)
            .label("ExchangeAddr", "Coinbase", LabelType::Exchange)
            .label("BridgeAddr", "Wormhole", LabelType::Bridge)
            .label("ProtocolAddr", "Raydium", LabelType::Protocol)
            .build();
        let signals = check(&context);
        let ids: Vec<&str> = signals.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["known-entity-exchange", "known-entity-bridge", "known-entity-protocol"]
        );
    }

    #[test]
    fn unmatched_labels_are_quiet() {
        let context = ScanContextBuilder::new("WalletY")
            .transfers_with("SomeRandom", 2)
            .label("ExchangeAddr", "Coinbase", LabelType::Exchange)
            .build();
        assert!(check(&context).is_empty());
    }
}
