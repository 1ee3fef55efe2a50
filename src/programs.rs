//! Known program tables - well-known Solana program ids and the
//! category taxonomy used by the address-diversity heuristic.

use crate::context::{Label, LabelType};

/// SPL Memo v1
pub const MEMO_PROGRAM_V1: &str = "Memo1UhkJRfHyvLMcVucJwxXeuD728EqVDDwQDxFMNo";
/// SPL Memo v2
pub const MEMO_PROGRAM_V2: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";
/// Metaplex token metadata (NFT create/update)
pub const TOKEN_METADATA_PROGRAM: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";
/// Bonfida name service (.sol domains)
pub const NAME_SERVICE_PROGRAM: &str = "namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX";
/// Native stake program
pub const STAKE_PROGRAM: &str = "Stake11111111111111111111111111111111111111";
/// System program
pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";
/// SPL Token
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
/// Associated token account program
pub const ASSOCIATED_TOKEN_PROGRAM: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";
/// Compute budget program
pub const COMPUTE_BUDGET_PROGRAM: &str = "ComputeBudget111111111111111111111111111111";

pub fn is_memo_program(program_id: &str) -> bool {
    program_id == MEMO_PROGRAM_V1 || program_id == MEMO_PROGRAM_V2
}

/// Activity category a program falls into, for behavioral profiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProgramCategory {
    Defi,
    Nft,
    Gaming,
    Dao,
    Exchange,
    P2p,
}

impl ProgramCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramCategory::Defi => "DeFi",
            ProgramCategory::Nft => "NFT",
            ProgramCategory::Gaming => "Gaming",
            ProgramCategory::Dao => "DAO",
            ProgramCategory::Exchange => "Exchange",
            ProgramCategory::P2p => "P2P",
        }
    }
}

/// Well-known mainnet program ids with a fixed category
const KNOWN_PROGRAM_CATEGORIES: &[(&str, ProgramCategory)] = &[
    // DeFi
    ("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8", ProgramCategory::Defi), // Raydium AMM
    ("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc", ProgramCategory::Defi),  // Orca Whirlpool
    ("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4", ProgramCategory::Defi),  // Jupiter v6
    // Exchange-adjacent order books
    ("srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX", ProgramCategory::Exchange), // Serum DEX v3
    ("opnb2LAfJYbRMAHHvqjCwQxanZn7ReEHp1k81EohpZb", ProgramCategory::Exchange), // OpenBook v2
    // NFT
    (TOKEN_METADATA_PROGRAM, ProgramCategory::Nft),
    ("cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ", ProgramCategory::Nft), // Candy Machine v3
    // DAO
    ("GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw", ProgramCategory::Dao), // SPL Governance
];

/// Keyword buckets applied to a label's name/description when the program id
/// itself is not in the fixed table.
const CATEGORY_KEYWORDS: &[(ProgramCategory, &[&str])] = &[
    (ProgramCategory::Defi, &["swap", "amm", "dex", "lend", "liquidity", "farm", "stake pool"]),
    (ProgramCategory::Nft, &["nft", "metadata", "candy", "collection"]),
    (ProgramCategory::Gaming, &["game", "gaming", "play"]),
    (ProgramCategory::Dao, &["dao", "governance", "realm", "vote"]),
    (ProgramCategory::Exchange, &["exchange", "order book", "orderbook"]),
    (ProgramCategory::P2p, &["p2p", "escrow", "peer"]),
];

/// Categorize a program by fixed table first, then by its label when one exists.
/// Returns `None` for infrastructure programs and anything unrecognized.
pub fn categorize_program(program_id: &str, label: Option<&Label>) -> Option<ProgramCategory> {
    if let Some((_, category)) = KNOWN_PROGRAM_CATEGORIES.iter().find(|(id, _)| *id == program_id) {
        return Some(*category);
    }

    let label = label?;
    if label.label_type == LabelType::Exchange {
        return Some(ProgramCategory::Exchange);
    }

    let mut haystack = label.name.to_lowercase();
    if let Some(desc) = &label.description {
        haystack.push(' ');
        haystack.push_str(&desc.to_lowercase());
    }

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return Some(*category);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_programs_recognized() {
        assert!(is_memo_program(MEMO_PROGRAM_V1));
        assert!(is_memo_program(MEMO_PROGRAM_V2));
        assert!(!is_memo_program(SYSTEM_PROGRAM));
    }

    #[test]
    fn known_ids_categorized_without_label() {
        assert_eq!(
            categorize_program(TOKEN_METADATA_PROGRAM, None),
            Some(ProgramCategory::Nft)
        );
        assert_eq!(
            categorize_program("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8", None),
            Some(ProgramCategory::Defi)
        );
    }

    #[test]
    fn label_keywords_drive_category() {
        let label = Label {
            address: "SomeProgram".to_string(),
            name: "Degen Swap AMM".to_string(),
            label_type: LabelType::Protocol,
            description: None,
        };
        assert_eq!(
            categorize_program("SomeProgram", Some(&label)),
            Some(ProgramCategory::Defi)
        );
    }

    #[test]
    fn unknown_program_has_no_category() {
        assert_eq!(categorize_program("UnknownProgram111", None), None);
    }
}
