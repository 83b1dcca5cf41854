use crate::protocol::{Outcome, Verdict};

use super::Finding;

/// Collapse findings into a single outcome.
///
/// - No findings → Allow with no message
/// - Otherwise the most severe finding decides, and every finding is reported
///   in the order the checks produced them
pub(crate) fn aggregate(findings: &[Finding]) -> Outcome {
    let verdict = findings
        .iter()
        .map(|f| f.severity)
        .max()
        .unwrap_or(Verdict::Allow);

    Outcome {
        verdict,
        messages: findings.iter().map(|f| f.to_string()).collect(),
    }
}
