//! Shared test fixtures for heuristic and narrative tests
//!
//! Provides realistic Solana addresses and a `ScanContextBuilder` so tests can
//! assemble small, internally consistent contexts without hand-maintaining the
//! derived sets (`fee_payers`, `signers`, `counterparties`, ...).

#![allow(dead_code)]

use crate::context::{
    InstructionRecord, Label, LabelType, PdaInteraction, ScanContext, TargetType,
    TokenAccountEvent, TokenAccountEventKind, Transfer, TransactionRecord,
};
use crate::programs;

/// Solana mainnet addresses used for realistic test data
pub struct SolanaAddresses;

impl SolanaAddresses {
    pub const SYSTEM_PROGRAM: &'static str = "11111111111111111111111111111111";
    pub const TOKEN_PROGRAM: &'static str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    pub const ASSOCIATED_TOKEN_PROGRAM: &'static str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";
    pub const TEST_USER_WALLET: &'static str = "5d1bR8D4J7QoJnQ7Xn8cK9mL2pQ4rS5tU6vW7xY8zZa";
    pub const TEST_EXCHANGE_DEPOSIT: &'static str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    pub const TEST_VALIDATOR_VOTE: &'static str = "CertusDeBmqN8ZawdkxK5kFGMwBXdudvWHYwtNgNhvLu";
}

/// Incrementally builds a `ScanContext`, back-filling the derived sets and
/// counters at `build()` time so collections stay consistent with
/// `transaction_count`.
pub struct ScanContextBuilder {
    context: ScanContext,
    next_signature: usize,
    explicit_count: Option<usize>,
}

impl ScanContextBuilder {
    pub fn new(target: &str) -> Self {
        Self {
            context: ScanContext::new(target, TargetType::Wallet),
            next_signature: 0,
            explicit_count: None,
        }
    }

    fn signature(&mut self) -> String {
        self.next_signature += 1;
        format!("sig{:03}", self.next_signature)
    }

    fn base_transaction(&mut self) -> TransactionRecord {
        TransactionRecord {
            signature: self.signature(),
            fee_payer: Some(self.context.target.clone()),
            signers: vec![self.context.target.clone()],
            ..Default::default()
        }
    }

    /// Add `n` transactions whose fee is paid by `payer`, not the target
    pub fn external_fee_payer(mut self, payer: &str, n: usize) -> Self {
        for _ in 0..n {
            let mut tx = self.base_transaction();
            tx.fee_payer = Some(payer.to_string());
            self.context.transactions.push(tx);
        }
        self
    }

    /// Add `n` self-paid transactions with no other interesting features
    pub fn self_paid(mut self, n: usize) -> Self {
        for _ in 0..n {
            let tx = self.base_transaction();
            self.context.transactions.push(tx);
        }
        self
    }

    /// Add a self-paid transaction carrying a memo
    pub fn memo(mut self, text: &str) -> Self {
        let mut tx = self.base_transaction();
        tx.memo = Some(text.to_string());
        self.context.transactions.push(tx);
        self
    }

    /// Add a transaction with a memo-program instruction carrying `text`
    pub fn memo_instruction(mut self, text: &str) -> Self {
        let tx = self.base_transaction();
        let signature = tx.signature.clone();
        self.context.transactions.push(tx);
        self.context.instructions.push(InstructionRecord {
            signature,
            program_id: programs::MEMO_PROGRAM_V2.to_string(),
            accounts: vec![self.context.target.clone()],
            decoded: Some(serde_json::Value::String(text.to_string())),
        });
        self
    }

    /// Add `n` transactions co-signed by the given non-target signers
    pub fn co_signed(mut self, signers: &[&str], n: usize) -> Self {
        for _ in 0..n {
            let mut tx = self.base_transaction();
            tx.signers.extend(signers.iter().map(|s| s.to_string()));
            self.context.transactions.push(tx);
        }
        self
    }

    /// Add `n` transfers between the target and a counterparty
    pub fn transfers_with(mut self, counterparty: &str, n: usize) -> Self {
        for _ in 0..n {
            let tx = self.base_transaction();
            let signature = tx.signature.clone();
            self.context.transactions.push(tx);
            self.context.transfers.push(Transfer {
                from: self.context.target.clone(),
                to: counterparty.to_string(),
                amount: 1_000_000,
                signature,
                block_time: None,
            });
        }
        self
    }

    /// Register a known-entity label
    pub fn label(mut self, address: &str, name: &str, label_type: LabelType) -> Self {
        self.context.labels.insert(
            address.to_string(),
            Label {
                address: address.to_string(),
                name: name.to_string(),
                label_type,
                description: None,
            },
        );
        self
    }

    /// Add one transaction invoking the given programs in order
    pub fn instruction_sequence(mut self, program_ids: &[&str]) -> Self {
        let tx = self.base_transaction();
        let signature = tx.signature.clone();
        self.context.transactions.push(tx);
        for program_id in program_ids {
            self.context.instructions.push(InstructionRecord {
                signature: signature.clone(),
                program_id: program_id.to_string(),
                accounts: Vec::new(),
                decoded: None,
            });
        }
        self
    }

    /// Add a token-account create event paid for by `fee_payer`
    pub fn token_create(mut self, account: &str, owner: &str, fee_payer: &str, timestamp: i64) -> Self {
        let mut tx = self.base_transaction();
        tx.fee_payer = Some(fee_payer.to_string());
        tx.block_time = Some(timestamp);
        let signature = tx.signature.clone();
        self.context.transactions.push(tx);
        self.context.token_account_events.push(TokenAccountEvent {
            kind: TokenAccountEventKind::Create,
            account: account.to_string(),
            owner: owner.to_string(),
            rent_destination: None,
            rent_lamports: None,
            timestamp: Some(timestamp),
            signature: Some(signature),
        });
        self
    }

    /// Add a token-account close event refunding rent to `rent_destination`
    pub fn token_close(mut self, account: &str, rent_destination: &str, timestamp: i64) -> Self {
        let mut tx = self.base_transaction();
        tx.block_time = Some(timestamp);
        let signature = tx.signature.clone();
        self.context.transactions.push(tx);
        self.context.token_account_events.push(TokenAccountEvent {
            kind: TokenAccountEventKind::Close,
            account: account.to_string(),
            owner: self.context.target.clone(),
            rent_destination: Some(rent_destination.to_string()),
            rent_lamports: Some(2_039_280),
            timestamp: Some(timestamp),
            signature: Some(signature),
        });
        self
    }

    /// Record `n` interactions with one program-derived address
    pub fn pda(mut self, address: &str, program_id: &str, n: usize) -> Self {
        for _ in 0..n {
            let signature = self.signature();
            self.context.pda_interactions.push(PdaInteraction {
                address: address.to_string(),
                program_id: program_id.to_string(),
                signature: Some(signature),
            });
        }
        self
    }

    /// Add `n` transactions carrying the same priority fee
    pub fn priority_fee(mut self, micro_lamports: u64, n: usize) -> Self {
        for _ in 0..n {
            let mut tx = self.base_transaction();
            tx.priority_fee = Some(micro_lamports);
            self.context.transactions.push(tx);
        }
        self
    }

    /// Add a stake delegation instruction targeting `vote_account`
    pub fn stake_delegation(mut self, vote_account: &str, timestamp: i64) -> Self {
        let mut tx = self.base_transaction();
        tx.block_time = Some(timestamp);
        let signature = tx.signature.clone();
        self.context.transactions.push(tx);
        self.context.instructions.push(InstructionRecord {
            signature,
            program_id: programs::STAKE_PROGRAM.to_string(),
            accounts: vec!["StakeAccount111".to_string(), vote_account.to_string()],
            decoded: Some(serde_json::json!({ "type": "delegate", "voteAccount": vote_account })),
        });
        self
    }

    /// Add `n` self-paid transactions at the given block times
    pub fn timed_transactions(mut self, times: &[i64]) -> Self {
        for t in times {
            let mut tx = self.base_transaction();
            tx.block_time = Some(*t);
            self.context.transactions.push(tx);
        }
        self
    }

    /// Override the transaction count instead of deriving it
    pub fn transaction_count(mut self, count: usize) -> Self {
        self.explicit_count = Some(count);
        self
    }

    /// Finalize: back-fill derived sets and counters from the records
    pub fn build(mut self) -> ScanContext {
        for tx in &self.context.transactions {
            if let Some(payer) = &tx.fee_payer {
                self.context.fee_payers.insert(payer.clone());
            }
            for signer in &tx.signers {
                self.context.signers.insert(signer.clone());
            }
        }
        for instruction in &self.context.instructions {
            self.context.programs.insert(instruction.program_id.clone());
        }
        for transfer in &self.context.transfers {
            let other = if transfer.from == self.context.target {
                &transfer.to
            } else {
                &transfer.from
            };
            if other != &self.context.target {
                self.context.counterparties.insert(other.clone());
            }
        }

        self.context.transaction_count = self
            .explicit_count
            .unwrap_or(self.context.transactions.len());

        if self.context.time_range.earliest.is_none() {
            let times = self.context.block_times();
            self.context.time_range.earliest = times.first().copied();
            self.context.time_range.latest = times.last().copied();
        }

        self.context
    }
}
