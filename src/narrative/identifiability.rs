//! Identifiability classifier - how close the evidence comes to a real identity

use crate::report::{PrivacyReport, Severity};
use serde::{Deserialize, Serialize};

/// Coarse verdict on identity exposure, weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdentifiabilityLevel {
    #[serde(rename = "anonymous")]
    Anonymous,
    #[serde(rename = "pseudonymous")]
    Pseudonymous,
    #[serde(rename = "identifiable")]
    Identifiable,
    #[serde(rename = "fully-identified")]
    FullyIdentified,
}

impl IdentifiabilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifiabilityLevel::Anonymous => "anonymous",
            IdentifiabilityLevel::Pseudonymous => "pseudonymous",
            IdentifiabilityLevel::Identifiable => "identifiable",
            IdentifiabilityLevel::FullyIdentified => "fully-identified",
        }
    }
}

/// Signal id that exposes PII directly
const PII_SIGNAL: &str = "memo-pii-exposure";
/// Signal id binding the wallet to a KYC'd exchange account
const EXCHANGE_SIGNAL: &str = "known-entity-exchange";
/// Signal id binding the wallet to a human-readable name
const DOMAIN_SIGNAL: &str = "identity-sol-domain";
/// Signals that tie the wallet into an operator's infrastructure
const STRONG_LINKAGE_SIGNALS: &[&str] =
    &["fee-payer-never-self", "signer-authority-hub", "ata-creator-linkage"];

/// Strict precedence chain; the first satisfied rule wins.
pub fn determine_identifiability(report: &PrivacyReport) -> IdentifiabilityLevel {
    let has = |id: &str| report.signals.iter().any(|s| s.id == id);

    let pii = has(PII_SIGNAL);
    let exchange = has(EXCHANGE_SIGNAL);
    let domain = has(DOMAIN_SIGNAL);

    if (pii && exchange) || (domain && exchange) {
        return IdentifiabilityLevel::FullyIdentified;
    }

    if pii || exchange || domain {
        return IdentifiabilityLevel::Identifiable;
    }
    if STRONG_LINKAGE_SIGNALS.iter().any(|id| has(id)) && report.summary.high_risk_signals >= 2 {
        return IdentifiabilityLevel::Identifiable;
    }

    if report.overall_risk >= Severity::Medium || report.summary.total_signals > 0 {
        return IdentifiabilityLevel::Pseudonymous;
    }

    IdentifiabilityLevel::Anonymous
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TargetType;
    use crate::heuristics::PrivacySignal;
    use crate::report::{PrivacyReport, ReportSummary};

    fn report_with(ids: &[(&str, Severity)]) -> PrivacyReport {
        let signals: Vec<PrivacySignal> = ids
            .iter()
            .map(|(id, severity)| PrivacySignal::new(id, id, *severity, format!("signal {}", id)))
            .collect();
        let high = signals.iter().filter(|s| s.severity == Severity::High).count();
        let medium = signals.iter().filter(|s| s.severity == Severity::Medium).count();
        let low = signals.iter().filter(|s| s.severity == Severity::Low).count();
        let overall_risk = if high >= 2 || (high >= 1 && medium >= 2) {
            Severity::High
        } else if high >= 1 || medium >= 2 || (medium >= 1 && low >= 2) {
            Severity::Medium
        } else {
            Severity::Low
        };
        PrivacyReport {
            version: "0.1.0".to_string(),
            timestamp: "2025-01-01T00:00:00Z".to_string(),
            target_type: TargetType::Wallet,
            target: "WalletY".to_string(),
            overall_risk,
            summary: ReportSummary {
                total_signals: signals.len(),
                high_risk_signals: high,
                medium_risk_signals: medium,
                low_risk_signals: low,
                transactions_analyzed: 10,
            },
            signals,
            mitigations: Vec::new(),
            known_entities: Vec::new(),
        }
    }

    #[test]
    fn pii_plus_exchange_is_fully_identified() {
        let report = report_with(&[
            ("memo-pii-exposure", Severity::High),
            ("known-entity-exchange", Severity::High),
        ]);
        assert_eq!(determine_identifiability(&report), IdentifiabilityLevel::FullyIdentified);
    }

    #[test]
    fn domain_plus_exchange_is_fully_identified() {
        let report = report_with(&[
            ("identity-sol-domain", Severity::High),
            ("known-entity-exchange", Severity::High),
        ]);
        assert_eq!(determine_identifiability(&report), IdentifiabilityLevel::FullyIdentified);
    }

    #[test]
    fn exchange_alone_is_identifiable() {
        let report = report_with(&[("known-entity-exchange", Severity::High)]);
        assert_eq!(determine_identifiability(&report), IdentifiabilityLevel::Identifiable);
    }

    #[test]
    fn strong_linkage_needs_two_high_signals() {
        let report = report_with(&[("fee-payer-never-self", Severity::High)]);
        assert_eq!(determine_identifiability(&report), IdentifiabilityLevel::Pseudonymous);

        let report = report_with(&[
            ("fee-payer-never-self", Severity::High),
            ("timing-burst", Severity::High),
        ]);
        assert_eq!(determine_identifiability(&report), IdentifiabilityLevel::Identifiable);
    }

    #[test]
    fn any_signal_is_at_least_pseudonymous() {
        let report = report_with(&[("memo-usage", Severity::Low)]);
        assert_eq!(determine_identifiability(&report), IdentifiabilityLevel::Pseudonymous);
    }

    #[test]
    fn empty_report_is_anonymous() {
        let report = report_with(&[]);
        assert_eq!(determine_identifiability(&report), IdentifiabilityLevel::Anonymous);
    }
}
