//! Report aggregation and output formatting

use crate::context::{Label, ScanContext, TargetType};
use crate::heuristics::{evaluate_heuristics, PrivacySignal};
use anyhow::Result;
use colored::*;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Severity of a privacy signal. Also used for the report's overall risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }

    /// Marker used in plain-text narrative output
    pub fn indicator(&self) -> &'static str {
        match self {
            Severity::Low => "[.]",
            Severity::Medium => "[~]",
            Severity::High => "[!]",
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn colorize(&self, text: &str) -> ColoredString {
        match self {
            Severity::Low => text.white(),
            Severity::Medium => text.yellow(),
            Severity::High => text.red().bold(),
        }
    }
}

/// Parse severity from a CLI string, defaulting to LOW
pub fn parse_severity(s: &str) -> Severity {
    match s.to_lowercase().as_str() {
        "high" => Severity::High,
        "medium" => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Signal counts partitioned by severity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_signals: usize,
    pub high_risk_signals: usize,
    pub medium_risk_signals: usize,
    pub low_risk_signals: usize,
    pub transactions_analyzed: usize,
}

/// The aggregate privacy assessment for one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyReport {
    pub version: String,
    pub timestamp: String,
    pub target_type: TargetType,
    pub target: String,
    pub overall_risk: Severity,
    pub signals: Vec<PrivacySignal>,
    pub summary: ReportSummary,
    pub mitigations: Vec<String>,
    pub known_entities: Vec<Label>,
}

/// Run every heuristic against the context and aggregate the result.
///
/// Deterministic and side-effect-free apart from the `timestamp` field:
/// the same context always yields the same risk, signal list, mitigations
/// and known-entity set.
pub fn generate_report(context: &ScanContext) -> PrivacyReport {
    let signals = evaluate_heuristics(context);

    let high = signals.iter().filter(|s| s.severity == Severity::High).count();
    let medium = signals.iter().filter(|s| s.severity == Severity::Medium).count();
    let low = signals.iter().filter(|s| s.severity == Severity::Low).count();

    let overall_risk = overall_risk(high, medium, low);

    let mut mitigations: Vec<String> = Vec::new();
    for signal in &signals {
        if let Some(mitigation) = &signal.mitigation {
            if !mitigations.iter().any(|m| m == mitigation) {
                mitigations.push(mitigation.clone());
            }
        }
    }

    let known_entities = collect_known_entities(context, &signals);

    PrivacyReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        target_type: context.target_type,
        target: context.target.clone(),
        overall_risk,
        summary: ReportSummary {
            total_signals: signals.len(),
            high_risk_signals: high,
            medium_risk_signals: medium,
            low_risk_signals: low,
            transactions_analyzed: context.transaction_count,
        },
        signals,
        mitigations,
        known_entities,
    }
}

/// Fixed escalation thresholds for the aggregate risk level
fn overall_risk(high: usize, medium: usize, low: usize) -> Severity {
    if high >= 2 || (high >= 1 && medium >= 2) {
        Severity::High
    } else if high >= 1 || medium >= 2 || (medium >= 1 && low >= 2) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Pull the labels referenced by known-entity signal evidence out of the context
fn collect_known_entities(context: &ScanContext, signals: &[PrivacySignal]) -> Vec<Label> {
    let mut entities: Vec<Label> = Vec::new();
    for signal in signals {
        if !signal.id.starts_with("known-entity") {
            continue;
        }
        for evidence in &signal.evidence {
            let Some(address) = &evidence.reference else { continue };
            if let Some(label) = context.labels.get(address) {
                if !entities.iter().any(|e| e.address == label.address) {
                    entities.push(label.clone());
                }
            }
        }
    }
    entities
}

/// Print a colored text report to stdout
pub fn print_text_report(report: &PrivacyReport, min_severity: Severity) {
    println!("{}", "=".repeat(60).bright_cyan());
    println!(
        "Target: {} ({})",
        report.target.bright_white().bold(),
        report.target_type.as_str()
    );
    println!(
        "Overall risk: {}   {} transactions analyzed",
        report.overall_risk.colorize(report.overall_risk.as_str()),
        report.summary.transactions_analyzed
    );
    println!(
        "Signals: {} total  [!] High: {}  [~] Medium: {}  [.] Low: {}",
        report.summary.total_signals,
        report.summary.high_risk_signals,
        report.summary.medium_risk_signals,
        report.summary.low_risk_signals
    );
    println!("{}", "=".repeat(60).bright_cyan());
    println!();

    for signal in report.signals.iter().filter(|s| s.severity >= min_severity) {
        print_signal(signal);
    }

    if !report.known_entities.is_empty() {
        println!("{}", "Known entities touched:".bold());
        for entity in &report.known_entities {
            println!(
                "   - {} ({}) {}",
                entity.name.bright_white(),
                entity.label_type.as_str(),
                entity.address.dimmed()
            );
        }
        println!();
    }

    if !report.mitigations.is_empty() {
        println!("{}", "Suggested mitigations:".bright_yellow().bold());
        for (i, mitigation) in report.mitigations.iter().enumerate() {
            println!("   {}. {}", i + 1, mitigation);
        }
        println!();
    }

    if report.signals.is_empty() {
        println!("{} No privacy signals detected.", "[OK]".green());
    }
}

fn print_signal(signal: &PrivacySignal) {
    println!(
        "{} [{}] {}: {} ({:.0}%)",
        signal.severity.indicator(),
        signal.severity.colorize(signal.severity.as_str()),
        signal.id.bright_white().bold(),
        signal.name.bold(),
        signal.confidence * 100.0
    );
    println!("   {}", signal.reason);

    if !signal.evidence.is_empty() {
        println!("   {} Evidence:", "[INFO]".bright_cyan());
        for ev in &signal.evidence {
            println!("      - {}", ev.description.dimmed());
        }
    }

    if let Some(mitigation) = &signal.mitigation {
        println!("   {} {}", "Fix:".bright_yellow(), mitigation);
    }
    println!();
}

/// Serialize the report as pretty JSON
pub fn to_json(report: &PrivacyReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScanContext;
    use crate::test_context::ScanContextBuilder;

    #[test]
    fn empty_context_yields_low_risk_empty_report() {
        let context = ScanContext::new("WalletY", TargetType::Wallet);
        let report = generate_report(&context);
        assert_eq!(report.overall_risk, Severity::Low);
        assert!(report.signals.is_empty());
        assert!(report.mitigations.is_empty());
        assert!(report.known_entities.is_empty());
        assert_eq!(report.summary.total_signals, 0);
    }

    #[test]
    fn summary_counts_partition_signals() {
        let context = ScanContextBuilder::new("WalletY")
            .external_fee_payer("WalletX", 3)
            .memo("contact me at test@example.com")
            .build();
        let report = generate_report(&context);
        let high = report.signals.iter().filter(|s| s.severity == Severity::High).count();
        let medium = report.signals.iter().filter(|s| s.severity == Severity::Medium).count();
        let low = report.signals.iter().filter(|s| s.severity == Severity::Low).count();
        assert_eq!(report.summary.high_risk_signals, high);
        assert_eq!(report.summary.medium_risk_signals, medium);
        assert_eq!(report.summary.low_risk_signals, low);
        assert_eq!(report.summary.total_signals, report.signals.len());
        assert_eq!(high + medium + low, report.signals.len());
    }

    #[test]
    fn signals_sorted_severity_descending() {
        let context = ScanContextBuilder::new("WalletY")
            .external_fee_payer("WalletX", 4)
            .memo("gm")
            .build();
        let report = generate_report(&context);
        for pair in report.signals.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn risk_thresholds() {
        assert_eq!(overall_risk(2, 0, 0), Severity::High);
        assert_eq!(overall_risk(1, 2, 0), Severity::High);
        assert_eq!(overall_risk(1, 1, 0), Severity::Medium);
        assert_eq!(overall_risk(0, 2, 0), Severity::Medium);
        assert_eq!(overall_risk(0, 1, 2), Severity::Medium);
        assert_eq!(overall_risk(0, 1, 1), Severity::Low);
        assert_eq!(overall_risk(0, 0, 5), Severity::Low);
        assert_eq!(overall_risk(0, 0, 0), Severity::Low);
    }

    #[test]
    fn mitigations_deduplicated() {
        let context = ScanContextBuilder::new("WalletY")
            .external_fee_payer("WalletX", 3)
            .build();
        let report = generate_report(&context);
        let mut seen = std::collections::BTreeSet::new();
        for m in &report.mitigations {
            assert!(seen.insert(m.clone()), "duplicate mitigation: {}", m);
        }
    }
}
