//! Staking delegation patterns - concentrated validators and clockwork restaking

use super::{ratio, Evidence, PrivacySignal};
use crate::context::{InstructionRecord, ScanContext};
use crate::programs;
use crate::report::Severity;
use std::collections::BTreeMap;

/// Minimum stake instructions before concentration is measured
const MIN_STAKE_ACTIONS: usize = 3;
/// Share of stake actions the top one or two validators must cover
const CONCENTRATION_SHARE: f64 = 0.8;
/// Coefficient of variation under which stake timing counts as regular
const REGULAR_CV: f64 = 0.3;
/// Account index holding the vote account in a delegate instruction
const VOTE_ACCOUNT_INDEX: usize = 1;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let stake_instructions: Vec<&InstructionRecord> = context
        .instructions
        .iter()
        .filter(|i| i.program_id == programs::STAKE_PROGRAM)
        .collect();

    if stake_instructions.len() < MIN_STAKE_ACTIONS {
        return Vec::new();
    }

    let mut signals = Vec::new();

    let mut validator_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for instruction in &stake_instructions {
        if let Some(validator) = extract_validator(instruction) {
            *validator_counts.entry(validator).or_insert(0) += 1;
        }
    }

    let total: usize = validator_counts.values().sum();
    if total >= MIN_STAKE_ACTIONS {
        let mut counts: Vec<usize> = validator_counts.values().copied().collect();
        counts.sort_unstable_by(|a, b| b.cmp(a));
        let top_two: usize = counts.iter().take(2).sum();
        let share = ratio(top_two, total);

        if validator_counts.len() <= 2 || share > CONCENTRATION_SHARE {
            let evidence = validator_counts
                .iter()
                .map(|(validator, count)| {
                    Evidence::new(format!("{}: {} delegations", validator, count))
                        .with_reference(*validator)
                })
                .collect();
            signals.push(
                PrivacySignal::new(
                    "stake-delegation-pattern",
                    "Concentrated Stake Delegation",
                    Severity::Medium,
                    format!(
                        "{:.0}% of {} stake actions target {} validators",
                        share * 100.0,
                        total,
                        validator_counts.len().min(2)
                    ),
                )
                .with_confidence(0.7)
                .with_evidence(evidence)
                .with_mitigation(
                    "Spread delegations across validators; loyalty to one or two is a stable preference marker.",
                ),
            );
        }
    }

    // Clockwork restaking
    let mut times: Vec<i64> = stake_instructions
        .iter()
        .filter_map(|i| context.transaction(&i.signature).and_then(|t| t.block_time))
        .collect();
    times.sort_unstable();
    if times.len() >= MIN_STAKE_ACTIONS {
        let gaps: Vec<f64> = times.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        if let Some(cv) = coefficient_of_variation(&gaps) {
            if cv < REGULAR_CV {
                signals.push(
                    PrivacySignal::new(
                        "stake-timing-correlation",
                        "Regular Stake Timing",
                        Severity::Medium,
                        format!(
                            "{} stake actions arrive at near-regular intervals (variation {:.2})",
                            times.len(),
                            cv
                        ),
                    )
                    .with_confidence(0.7)
                    .with_evidence(vec![Evidence::new(format!(
                        "Mean interval {:.1} hours across {} stake actions",
                        gaps.iter().sum::<f64>() / gaps.len() as f64 / 3600.0,
                        times.len()
                    ))])
                    .with_mitigation("Jitter recurring staking operations instead of running them on a schedule."),
                );
            }
        }
    }

    signals
}

/// Prefer the decoded vote-account field, fall back to the fixed account index
fn extract_validator(instruction: &InstructionRecord) -> Option<&str> {
    if let Some(decoded) = &instruction.decoded {
        if let Some(vote_account) = decoded.get("voteAccount").and_then(|v| v.as_str()) {
            return Some(vote_account);
        }
    }
    instruction.accounts.get(VOTE_ACCOUNT_INDEX).map(String::as_str)
}

/// stddev/mean of the gaps; `None` when the mean is not positive
fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt() / mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context::{ScanContextBuilder, SolanaAddresses};

    #[test]
    fn concentrated_delegation_flagged() {
        let context = ScanContextBuilder::new("WalletY")
            .stake_delegation(SolanaAddresses::TEST_VALIDATOR_VOTE, 0)
            .stake_delegation(SolanaAddresses::TEST_VALIDATOR_VOTE, 1_000_000)
            .stake_delegation(SolanaAddresses::TEST_VALIDATOR_VOTE, 2_500_000)
            .build();
        let signals = check(&context);
        assert!(signals.iter().any(|s| s.id == "stake-delegation-pattern"));
    }

    #[test]
    fn spread_delegation_quiet() {
        let mut builder = ScanContextBuilder::new("WalletY");
        for (i, t) in [0i64, 900_000, 1_700_000, 3_100_000, 4_900_000].iter().enumerate() {
            let validator = format!("Validator{}", i);
            builder = builder.stake_delegation(&validator, *t);
        }
        let signals = check(&builder.build());
        assert!(!signals.iter().any(|s| s.id == "stake-delegation-pattern"));
    }

    #[test]
    fn clockwork_restaking_flagged() {
        let context = ScanContextBuilder::new("WalletY")
            .stake_delegation("ValidatorA", 0)
            .stake_delegation("ValidatorB", 604_800)
            .stake_delegation("ValidatorC", 1_209_600)
            .stake_delegation("ValidatorD", 1_814_400)
            .build();
        let signals = check(&context);
        assert!(signals.iter().any(|s| s.id == "stake-timing-correlation"));
    }

    #[test]
    fn fallback_to_account_index() {
        let mut context = ScanContextBuilder::new("WalletY")
            .stake_delegation("ValidatorA", 0)
            .stake_delegation("ValidatorA", 5_000_000)
            .stake_delegation("ValidatorA", 9_000_000)
            .build();
        for instruction in &mut context.instructions {
            instruction.decoded = None;
        }
        let signals = check(&context);
        let pattern = signals.iter().find(|s| s.id == "stake-delegation-pattern").unwrap();
        assert!(pattern.evidence[0].description.contains("ValidatorA"));
    }

    #[test]
    fn fewer_than_three_actions_quiet() {
        let context = ScanContextBuilder::new("WalletY")
            .stake_delegation("ValidatorA", 0)
            .stake_delegation("ValidatorA", 1_000)
            .build();
        assert!(check(&context).is_empty());
    }
}
