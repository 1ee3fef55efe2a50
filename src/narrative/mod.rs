//! Adversary narrative engine
//!
//! Turns a `PrivacyReport` into a first-person story told from the point of
//! view of someone hostile analyzing the wallet. All phrase selection is
//! index- and modulo-based; there is no randomness anywhere, so the same
//! report always renders the same narrative.

pub mod identifiability;
pub mod templates;

pub use identifiability::{determine_identifiability, IdentifiabilityLevel};
pub use templates::{find_template, NarrativeCategory, SignalTemplate};

use crate::heuristics::PrivacySignal;
use crate::report::{PrivacyReport, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Knobs for narrative generation
#[derive(Debug, Clone)]
pub struct NarrativeOptions {
    /// Include LOW-severity signals in the story
    pub include_low_severity: bool,
    /// Render per-statement evidence detail lines
    pub include_details: bool,
    /// Cap statements per category; HIGH severity survives truncation first
    pub max_statements_per_category: usize,
}

impl Default for NarrativeOptions {
    fn default() -> Self {
        Self {
            include_low_severity: true,
            include_details: true,
            max_statements_per_category: 5,
        }
    }
}

/// One rendered claim the adversary makes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdversaryStatement {
    pub text: String,
    #[serde(default)]
    pub details: Vec<String>,
    pub category: NarrativeCategory,
    pub severity: Severity,
    pub confidence: f64,
}

/// One themed paragraph of the narrative
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeParagraph {
    pub category: NarrativeCategory,
    pub title: String,
    pub opening: String,
    pub statements: Vec<AdversaryStatement>,
    pub closing: String,
}

/// The full structured narrative
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdversaryNarrative {
    pub introduction: String,
    pub paragraphs: Vec<NarrativeParagraph>,
    pub conclusion: String,
    pub identifiability_level: IdentifiabilityLevel,
    pub signal_count: usize,
    pub timestamp: String,
}

/// Opening lines per category: index 0 is the urgent variant, used when the
/// paragraph carries a HIGH statement; index 1 is the calmer one.
fn openings(category: NarrativeCategory) -> &'static [&'static str] {
    match category {
        NarrativeCategory::Identity => &[
            "This is the part that should worry you: I know things about who you are.",
            "Let me start with the identity traces you have left behind.",
        ],
        NarrativeCategory::Connections => &[
            "Your relationships are not private. The graph around you is dense, and I have drawn it.",
            "Here is what your transaction partners reveal about you.",
        ],
        NarrativeCategory::Behavior => &[
            "Your habits betray you faster than any single transaction ever could.",
            "Your behavioral patterns tell a quieter story of their own.",
        ],
        NarrativeCategory::Exposure => &[
            "You have walked straight into entities that know exactly who you are.",
            "A few of your touchpoints keep records of their own.",
        ],
    }
}

/// Closing lines per category; index 0 is always used.
fn closings(category: NarrativeCategory) -> &'static [&'static str] {
    match category {
        NarrativeCategory::Identity => &[
            "Everything above is permanent; identity leaks do not expire.",
        ],
        NarrativeCategory::Connections => &[
            "Each link compounds the others. Graphs are merciless that way.",
        ],
        NarrativeCategory::Behavior => &[
            "Patterns persist even after you rotate addresses.",
        ],
        NarrativeCategory::Exposure => &[
            "What these entities log today, someone else can request tomorrow.",
        ],
    }
}

/// Conclusion variants per identifiability level; picked by signal count
/// modulo the pool size.
fn conclusions(level: IdentifiabilityLevel) -> &'static [&'static str] {
    match level {
        IdentifiabilityLevel::Anonymous => &[
            "I found nothing to hold against this wallet. Today, you are a stranger to me.",
            "No signals, no story. This wallet keeps its secrets - for now.",
        ],
        IdentifiabilityLevel::Pseudonymous => &[
            "I cannot name you yet, but I can recognize you. You are a consistent character in my data, and consistency is how pseudonyms die.",
            "You are still a pseudonym to me - a distinctive one. Every new transaction makes the silhouette sharper.",
        ],
        IdentifiabilityLevel::Identifiable => &[
            "One subpoena, one data partnership, or one careless reuse away: that is how far you stand from being named. I would not call that anonymous.",
            "The trail you left crosses systems that know real names. Connecting you to yours is work, but it is routine work.",
        ],
        IdentifiabilityLevel::FullyIdentified => &[
            "I am no longer guessing. The evidence here links this wallet to a real-world identity, and everything it ever did inherits that name.",
            "This wallet is done being anonymous. Between the identity leaks and the record-keeping counterparties, the name attaches to the whole history.",
        ],
    }
}

/// Transition pools for statements after the first in a paragraph
const AMPLIFYING_TRANSITIONS: &[&str] = &["Worse still,", "It gets worse:", "And it compounds:"];
const ADDITIVE_TRANSITIONS: &[&str] = &["On top of that,", "Add to that:", "And there is more:"];
const NEUTRAL_TRANSITIONS: &[&str] = &["Meanwhile,", "Separately,", "Elsewhere,"];

/// Pick the transition preceding statement `index` in a paragraph.
///
/// Index 0 gets none. A statement more severe than its predecessor gets an
/// amplifying phrase; otherwise additive and neutral pools alternate by index
/// parity. All lookups are modulo the pool size - deterministic variety.
pub fn select_transition(current: Severity, previous: Severity, index: usize) -> Option<&'static str> {
    if index == 0 {
        return None;
    }
    if current.rank() > previous.rank() {
        return Some(AMPLIFYING_TRANSITIONS[index % AMPLIFYING_TRANSITIONS.len()]);
    }
    if index % 2 == 1 {
        Some(ADDITIVE_TRANSITIONS[index % ADDITIVE_TRANSITIONS.len()])
    } else {
        Some(NEUTRAL_TRANSITIONS[index % NEUTRAL_TRANSITIONS.len()])
    }
}

/// Build the structured adversary narrative for a report.
pub fn generate_narrative(report: &PrivacyReport, options: &NarrativeOptions) -> AdversaryNarrative {
    let signals: Vec<&PrivacySignal> = report
        .signals
        .iter()
        .filter(|s| options.include_low_severity || s.severity > Severity::Low)
        .collect();

    let mut grouped: BTreeMap<NarrativeCategory, Vec<AdversaryStatement>> = BTreeMap::new();
    for signal in &signals {
        let statement = build_statement(signal, options.include_details);
        grouped.entry(statement.category).or_default().push(statement);
    }

    let mut paragraphs = Vec::new();
    for category in NarrativeCategory::PRIORITY {
        let Some(mut statements) = grouped.remove(&category) else { continue };
        if statements.is_empty() {
            continue;
        }
        // Stable severity sort so HIGH statements survive the cut
        statements.sort_by_key(|s| std::cmp::Reverse(s.severity.rank()));
        statements.truncate(options.max_statements_per_category);

        let pool = openings(category);
        let opening_index = if statements.iter().any(|s| s.severity == Severity::High) {
            0
        } else {
            1
        };
        let opening = pool[opening_index % pool.len()].to_string();
        let closing = closings(category)[0].to_string();

        paragraphs.push(NarrativeParagraph {
            category,
            title: category.title().to_string(),
            opening,
            statements,
            closing,
        });
    }

    let level = determine_identifiability(report);
    let conclusion_pool = conclusions(level);
    let conclusion = conclusion_pool[report.summary.total_signals % conclusion_pool.len()].to_string();

    AdversaryNarrative {
        introduction: build_introduction(report),
        paragraphs,
        conclusion,
        identifiability_level: level,
        signal_count: signals.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

fn build_statement(signal: &PrivacySignal, include_details: bool) -> AdversaryStatement {
    if let Some(template) = find_template(&signal.id) {
        let vars = (template.extract)(signal);
        let text = templates::interpolate(template.template, &vars);
        let details = if include_details {
            signal
                .evidence
                .iter()
                .take(3)
                .enumerate()
                .map(|(i, evidence)| {
                    let detail_template = if template.detail_templates.is_empty() {
                        "{evidence}"
                    } else {
                        template.detail_templates[i % template.detail_templates.len()]
                    };
                    let mut detail_vars = vars.clone();
                    detail_vars.insert("evidence", evidence.description.clone());
                    templates::interpolate(detail_template, &detail_vars)
                })
                .collect()
        } else {
            Vec::new()
        };
        AdversaryStatement {
            text,
            details,
            category: template.category,
            severity: signal.severity,
            confidence: signal.confidence,
        }
    } else {
        // No template for this id: fall back to a literal restatement
        let details = if include_details {
            signal.evidence.iter().take(3).map(|e| e.description.clone()).collect()
        } else {
            Vec::new()
        };
        AdversaryStatement {
            text: format!("I can determine that: {}", signal.reason),
            details,
            category: NarrativeCategory::Behavior,
            severity: signal.severity,
            confidence: signal.confidence,
        }
    }
}

fn build_introduction(report: &PrivacyReport) -> String {
    let summary = &report.summary;
    match report.overall_risk {
        Severity::High => format!(
            "I have been watching {}. {} transactions handed me {} usable signals, {} of them serious. You should assume I am not the only one who noticed.",
            report.target,
            summary.transactions_analyzed,
            summary.total_signals,
            summary.high_risk_signals
        ),
        Severity::Medium => format!(
            "I took an interest in {}. Across {} transactions I collected {} signals worth keeping. None of them alone undoes you; together they start to.",
            report.target,
            summary.transactions_analyzed,
            summary.total_signals
        ),
        Severity::Low => {
            if summary.total_signals == 0 {
                format!(
                    "I went looking through {} transactions from {} and came back with very little. That is rare, and to your credit.",
                    summary.transactions_analyzed, report.target
                )
            } else {
                format!(
                    "I looked through {} transactions from {} and found {} minor tells. Small things - but I keep small things.",
                    summary.transactions_analyzed, report.target, summary.total_signals
                )
            }
        }
    }
}

/// Render the narrative as plain text with the fixed banner/section format.
pub fn generate_narrative_text(narrative: &AdversaryNarrative) -> String {
    let banner = "=".repeat(60);
    let mut out = String::new();

    out.push_str(&banner);
    out.push('\n');
    out.push_str(" ADVERSARY'S VIEW\n");
    out.push_str(&banner);
    out.push_str("\n\n");

    out.push_str(&narrative.introduction);
    out.push_str("\n\n");

    for paragraph in &narrative.paragraphs {
        out.push_str(&format!("--- {} ---\n", paragraph.title));
        out.push_str(&paragraph.opening);
        out.push_str("\n\n");

        let mut previous: Option<Severity> = None;
        for (index, statement) in paragraph.statements.iter().enumerate() {
            let transition = match previous {
                Some(prev) => select_transition(statement.severity, prev, index),
                None => None,
            };
            match transition {
                Some(phrase) => out.push_str(&format!(
                    "{} {} {}\n",
                    statement.severity.indicator(),
                    phrase,
                    statement.text
                )),
                None => out.push_str(&format!(
                    "{} {}\n",
                    statement.severity.indicator(),
                    statement.text
                )),
            }
            for detail in &statement.details {
                out.push_str(&format!("    - {}\n", detail));
            }
            previous = Some(statement.severity);
        }

        out.push('\n');
        out.push_str(&paragraph.closing);
        out.push_str("\n\n");
    }

    out.push_str("--- Conclusion ---\n");
    out.push_str(&narrative.conclusion);
    out.push_str("\n\n");

    out.push_str(&banner);
    out.push('\n');
    out.push_str(&format!(
        " Signals: {} | Identifiability: {}\n",
        narrative.signal_count,
        narrative.identifiability_level.as_str()
    ));
    out.push_str(&banner);
    out.push('\n');

    out
}

/// Serialize the narrative as pretty JSON
pub fn to_json(narrative: &AdversaryNarrative) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(narrative)?)
}
