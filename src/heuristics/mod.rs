//! Privacy heuristics
//!
//! Each submodule is one pure detection rule `fn check(&ScanContext) ->
//! Vec<PrivacySignal>`. Heuristics never fail: partial or malformed context
//! degrades to an empty result. No heuristic reads another's output.

pub mod address_reuse;
pub mod ata_linkage;
pub mod counterparty;
pub mod fee_payer;
pub mod identity_metadata;
pub mod instruction_fingerprint;
pub mod known_entity;
pub mod memo;
pub mod priority_fee;
pub mod signer_overlap;
pub mod staking;
pub mod timing;
pub mod token_lifecycle;

use crate::context::ScanContext;
use crate::report::Severity;
use serde::{Deserialize, Serialize};

/// One supporting observation behind a signal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Address or other stable key the evidence refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Evidence {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), severity: None, reference: None }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// One unit of detected privacy-degrading behavior.
///
/// Created fresh per evaluation, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySignal {
    /// Stable string key, e.g. `fee-payer-never-self`
    pub id: String,
    pub name: String,
    pub severity: Severity,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub reason: String,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

impl PrivacySignal {
    pub fn new(id: &str, name: &str, severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            severity,
            confidence: 0.8,
            reason: reason.into(),
            evidence: Vec::new(),
            mitigation: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_mitigation(mut self, mitigation: impl Into<String>) -> Self {
        self.mitigation = Some(mitigation.into());
        self
    }
}

/// Heuristics in their documented order. The order only affects the initial
/// concatenation; the final contract is the severity sort below.
type Heuristic = fn(&ScanContext) -> Vec<PrivacySignal>;

const HEURISTICS: &[Heuristic] = &[
    fee_payer::check,
    signer_overlap::check,
    memo::check,
    known_entity::check,
    identity_metadata::check,
    ata_linkage::check,
    address_reuse::check,
    counterparty::check,
    instruction_fingerprint::check,
    token_lifecycle::check,
    priority_fee::check,
    staking::check,
    timing::check,
];

/// Run all heuristics and sort the combined output severity-descending.
///
/// The sort is stable: ties within a severity preserve emission order, so a
/// deterministic context yields a deterministic signal list.
pub fn evaluate_heuristics(context: &ScanContext) -> Vec<PrivacySignal> {
    let mut signals: Vec<PrivacySignal> = Vec::new();
    for heuristic in HEURISTICS {
        signals.extend(heuristic(context));
    }
    signals.sort_by_key(|s| std::cmp::Reverse(s.severity.rank()));
    signals
}

/// Fraction helper used by threshold checks; 0.0 on an empty denominator
/// so degenerate contexts never produce NaN-driven signals.
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
