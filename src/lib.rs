//! Vigil - Solana Wallet Privacy Analyzer
//!
//! Takes a normalized view of a wallet's on-chain activity (`ScanContext`),
//! runs a fixed battery of privacy heuristics over it, aggregates the detected
//! signals into a `PrivacyReport`, and renders the result as a deterministic
//! adversary narrative.
//!
//! The crate is pure and synchronous: no RPC, no I/O, no shared state. Data
//! collection and normalization live in external collaborators that hand a
//! `ScanContext` to [`generate_report`].

pub mod context;
pub mod heuristics;
pub mod narrative;
pub mod programs;
pub mod report;
pub mod test_context;

pub use context::{load_context, Label, LabelType, ScanContext, TargetType};
pub use heuristics::{evaluate_heuristics, Evidence, PrivacySignal};
pub use narrative::{
    determine_identifiability, generate_narrative, generate_narrative_text, AdversaryNarrative,
    IdentifiabilityLevel, NarrativeCategory, NarrativeOptions,
};
pub use report::{generate_report, PrivacyReport, ReportSummary, Severity};
