//! Normalized view of one wallet/transaction/program's on-chain activity.
//!
//! A `ScanContext` is produced by an external normalizer from raw RPC data and
//! is the sole input to every heuristic. All collections that feed signal
//! emission are ordered (`BTreeMap`/`BTreeSet`) so a byte-identical context
//! always yields a byte-identical signal list.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// What kind of entity is being analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Wallet,
    Transaction,
    Program,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Wallet => "wallet",
            TargetType::Transaction => "transaction",
            TargetType::Program => "program",
        }
    }
}

/// Classification of a known address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Exchange,
    Bridge,
    Protocol,
    Service,
    Other,
}

impl LabelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelType::Exchange => "exchange",
            LabelType::Bridge => "bridge",
            LabelType::Protocol => "protocol",
            LabelType::Service => "service",
            LabelType::Other => "other",
        }
    }
}

/// A known-entity label attached to an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub address: String,
    pub name: String,
    #[serde(rename = "type")]
    pub label_type: LabelType,
    #[serde(default)]
    pub description: Option<String>,
}

/// A single native or token transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// Per-signature transaction metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub signature: String,
    #[serde(default)]
    pub fee_payer: Option<String>,
    #[serde(default)]
    pub signers: Vec<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub priority_fee: Option<u64>,
    #[serde(default)]
    pub compute_units: Option<u64>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// One program invocation inside a transaction, in execution order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionRecord {
    /// Signature of the containing transaction
    #[serde(default)]
    pub signature: String,
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Decoded instruction payload when the normalizer could parse it
    #[serde(default)]
    pub decoded: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenAccountEventKind {
    Create,
    Close,
}

/// A token-account create or close observed in the scanned window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccountEvent {
    pub kind: TokenAccountEventKind,
    pub account: String,
    #[serde(default)]
    pub owner: String,
    /// Where the rent refund went on close
    #[serde(default)]
    pub rent_destination: Option<String>,
    #[serde(default)]
    pub rent_lamports: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub signature: Option<String>,
}

/// An interaction with a program-derived address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdaInteraction {
    pub address: String,
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Earliest/latest observed activity, unix seconds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    #[serde(default)]
    pub earliest: Option<i64>,
    #[serde(default)]
    pub latest: Option<i64>,
}

/// Normalized, read-only view of the target's activity.
///
/// Every collection defaults to empty so a partial context deserializes
/// cleanly; heuristics treat missing data as "no evidence", never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanContext {
    pub target: String,
    pub target_type: TargetType,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
    #[serde(default)]
    pub instructions: Vec<InstructionRecord>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub token_account_events: Vec<TokenAccountEvent>,
    #[serde(default)]
    pub pda_interactions: Vec<PdaInteraction>,
    #[serde(default)]
    pub counterparties: BTreeSet<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, Label>,
    #[serde(default)]
    pub fee_payers: BTreeSet<String>,
    #[serde(default)]
    pub signers: BTreeSet<String>,
    #[serde(default)]
    pub programs: BTreeSet<String>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub transaction_count: usize,
}

impl ScanContext {
    /// Create an empty context for a target
    pub fn new(target: &str, target_type: TargetType) -> Self {
        Self {
            target: target.to_string(),
            target_type,
            transfers: Vec::new(),
            instructions: Vec::new(),
            transactions: Vec::new(),
            token_account_events: Vec::new(),
            pda_interactions: Vec::new(),
            counterparties: BTreeSet::new(),
            labels: BTreeMap::new(),
            fee_payers: BTreeSet::new(),
            signers: BTreeSet::new(),
            programs: BTreeSet::new(),
            time_range: TimeRange::default(),
            transaction_count: 0,
        }
    }

    /// Look up a transaction by signature
    pub fn transaction(&self, signature: &str) -> Option<&TransactionRecord> {
        self.transactions.iter().find(|t| t.signature == signature)
    }

    /// All known block times, ascending
    pub fn block_times(&self) -> Vec<i64> {
        let mut times: Vec<i64> = self.transactions.iter().filter_map(|t| t.block_time).collect();
        times.sort_unstable();
        times
    }

    /// Observed activity span in seconds, preferring the declared time range
    /// and falling back to transaction block times. `None` when there is not
    /// enough data to measure a span.
    pub fn span_seconds(&self) -> Option<i64> {
        if let (Some(earliest), Some(latest)) = (self.time_range.earliest, self.time_range.latest) {
            if latest >= earliest {
                return Some(latest - earliest);
            }
        }
        let times = self.block_times();
        match (times.first(), times.last()) {
            (Some(first), Some(last)) if times.len() >= 2 => Some(last - first),
            _ => None,
        }
    }
}

/// Load a `ScanContext` from a JSON file produced by the normalizer
pub fn load_context(path: &Path) -> Result<ScanContext> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;
    let context: ScanContext = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse context JSON: {}", path.display()))?;
    Ok(context)
}
