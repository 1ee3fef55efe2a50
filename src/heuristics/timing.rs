//! Timing patterns - bursts, clockwork intervals, and timezone leakage

use super::{Evidence, PrivacySignal};
use crate::context::ScanContext;
use crate::report::Severity;
use std::collections::BTreeMap;

/// Transactions per hour that count as a burst
const BURST_RATE_PER_HOUR: f64 = 10.0;
/// Coefficient of variation under which gaps count as automated
const REGULAR_CV: f64 = 0.3;
/// Minimum gap count before interval regularity is measured
const MIN_GAPS: usize = 3;
/// Minimum sample and coverage for the hour-of-day concentration check
const TIMEZONE_MIN_TXS: usize = 6;
const TIMEZONE_TOP_HOURS: usize = 3;
const TIMEZONE_COVERAGE: f64 = 0.6;

pub fn check(context: &ScanContext) -> Vec<PrivacySignal> {
    let tx_count = if context.transaction_count > 0 {
        context.transaction_count
    } else {
        context.transactions.len()
    };
    if tx_count == 0 {
        return Vec::new();
    }

    let mut signals = Vec::new();

    if let Some(span) = context.span_seconds() {
        if span > 0 {
            let hours = span as f64 / 3600.0;
            let rate = tx_count as f64 / hours;
            if rate > BURST_RATE_PER_HOUR {
                signals.push(
                    PrivacySignal::new(
                        "timing-burst",
                        "Transaction Burst",
                        Severity::High,
                        format!(
                            "{} transactions in {:.1} hours ({:.0} per hour) map this wallet's active sessions",
                            tx_count, hours, rate
                        ),
                    )
                    .with_confidence(0.8)
                    .with_evidence(vec![Evidence::new(format!(
                        "Observed rate {:.0} transactions/hour over the scanned window",
                        rate
                    ))])
                    .with_mitigation("Spread activity out; dense bursts delimit sessions an observer can correlate."),
                );
            }
        }
    }

    let times = context.block_times();
    if times.len() >= MIN_GAPS + 1 {
        let gaps: Vec<f64> = times.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
        if mean > 0.0 {
            let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
            let cv = variance.sqrt() / mean;
            if cv < REGULAR_CV {
                signals.push(
                    PrivacySignal::new(
                        "timing-regular-interval",
                        "Regular Transaction Interval",
                        Severity::Medium,
                        format!(
                            "Inter-transaction gaps average {:.1} minutes with variation {:.2}; this is automation, not a human",
                            mean / 60.0,
                            cv
                        ),
                    )
                    .with_confidence(0.75)
                    .with_evidence(vec![Evidence::new(format!(
                        "{} gaps measured, coefficient of variation {:.2}",
                        gaps.len(),
                        cv
                    ))])
                    .with_mitigation("Add jitter to scheduled transactions; fixed intervals fingerprint the scheduler."),
                );
            }
        }
    }

    // Hour-of-day concentration hints at the operator's timezone
    if times.len() >= TIMEZONE_MIN_TXS {
        let mut hour_counts: BTreeMap<u8, usize> = BTreeMap::new();
        for t in &times {
            let hour = (t.rem_euclid(86_400) / 3600) as u8;
            *hour_counts.entry(hour).or_insert(0) += 1;
        }
        let mut counts: Vec<(u8, usize)> =
            hour_counts.iter().map(|(hour, count)| (*hour, *count)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let top: usize = counts.iter().take(TIMEZONE_TOP_HOURS).map(|(_, c)| c).sum();
        let coverage = top as f64 / times.len() as f64;
        if coverage >= TIMEZONE_COVERAGE {
            let top_hours: Vec<String> = counts
                .iter()
                .take(TIMEZONE_TOP_HOURS)
                .map(|(hour, count)| format!("{:02}:00 UTC ({} txs)", hour, count))
                .collect();
            signals.push(
                PrivacySignal::new(
                    "timing-timezone-pattern",
                    "Timezone Activity Pattern",
                    Severity::Low,
                    format!(
                        "{:.0}% of transactions fall in {} hours of the day, hinting at the operator's timezone",
                        coverage * 100.0,
                        TIMEZONE_TOP_HOURS
                    ),
                )
                .with_confidence(0.6)
                .with_evidence(
                    top_hours.into_iter().map(Evidence::new).collect(),
                )
                .with_mitigation("Schedule some activity outside working hours to blur the timezone estimate."),
            );
        }
    }

    signals
}
