//! Identity metadata exposure - NFT metadata and .sol name-service activity

use super::{Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::programs;
use crate::report::Severity;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let mut signals = Vec::new();

    let metadata_calls: Vec<&str> = context
        .instructions
        .iter()
        .filter(|i| i.program_id == programs::TOKEN_METADATA_PROGRAM)
        .map(|i| i.signature.as_str())
        .collect();

    if !metadata_calls.is_empty() {
        let evidence = metadata_calls
            .iter()
            .take(3)
            .map(|sig| Evidence::new(format!("Token metadata instruction in {}", sig)))
            .collect();
        signals.push(
            PrivacySignal::new(
                "identity-nft-metadata",
                "NFT Metadata Activity",
                Severity::Medium,
                format!(
                    "{} token-metadata instructions tie NFT creation or updates to this wallet",
                    metadata_calls.len()
                ),
            )
            .with_confidence(0.7)
            .with_evidence(evidence)
            .with_mitigation(
                "Mint and manage NFTs from a wallet separated from day-to-day activity; creator fields are public.",
            ),
        );
    }

    let name_service_calls: Vec<&str> = context
        .instructions
        .iter()
        .filter(|i| i.program_id == programs::NAME_SERVICE_PROGRAM)
        .map(|i| i.signature.as_str())
        .collect();

    if !name_service_calls.is_empty() {
        let evidence = name_service_calls
            .iter()
            .take(3)
            .map(|sig| Evidence::new(format!("Name-service instruction in {}", sig)))
            .collect();
        signals.push(
            PrivacySignal::new(
                "identity-sol-domain",
                ".sol Domain Linkage",
                Severity::High,
                format!(
                    "{} name-service instructions bind a human-readable .sol name to this wallet",
                    name_service_calls.len()
                ),
            )
            .with_confidence(0.9)
            .with_evidence(evidence)
            .with_mitigation(
                "Do not hold a .sol domain in a wallet you want unlinkable; the registry is a public reverse-lookup.",
            ),
        );
    }

    signals
}
