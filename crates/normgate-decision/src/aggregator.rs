use normgate_core::{Verdict, VerdictResult};

/// Verdicts split by outcome and by whether their severity blocks.
///
/// Each bucket keeps input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// `FAIL` with severity `error`.
    pub blocking_failures: Vec<Verdict>,
    /// `FAIL` with severity `warning` or `info`.
    pub non_blocking_failures: Vec<Verdict>,
    /// `PASS` with severity `error`.
    pub blocking_passes: Vec<Verdict>,
    /// `PASS` with severity `warning` or `info`.
    pub non_blocking_passes: Vec<Verdict>,
}

/// Partitions verdicts into the four buckets.
pub fn aggregate(verdicts: &[Verdict]) -> Aggregation {
    let mut aggregation = Aggregation::default();
    for verdict in verdicts {
        let bucket = match (verdict.result(), verdict.severity().is_blocking()) {
            (VerdictResult::Fail, true) => &mut aggregation.blocking_failures,
            (VerdictResult::Fail, false) => &mut aggregation.non_blocking_failures,
            (VerdictResult::Pass, true) => &mut aggregation.blocking_passes,
            (VerdictResult::Pass, false) => &mut aggregation.non_blocking_passes,
        };
        bucket.push(verdict.clone());
    }
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use normgate_canonical::hash_str;
    use normgate_core::{Severity, VerdictContent};

    fn verdict(tag: &str, result: VerdictResult, severity: Severity) -> Verdict {
        Verdict::new(VerdictContent {
            rule_id: hash_str(tag),
            snapshot_id: hash_str("subject"),
            result,
            evidence_ids: vec![hash_str(tag)],
            reasoning: tag.to_string(),
            severity,
        })
        .unwrap()
    }

    #[test]
    fn buckets_preserve_input_order() {
        let verdicts = vec![
            verdict("a", VerdictResult::Fail, Severity::Error),
            verdict("b", VerdictResult::Pass, Severity::Info),
            verdict("c", VerdictResult::Fail, Severity::Warning),
            verdict("d", VerdictResult::Fail, Severity::Error),
            verdict("e", VerdictResult::Pass, Severity::Error),
        ];
        let agg = aggregate(&verdicts);
        assert_eq!(agg.blocking_failures, vec![verdicts[0].clone(), verdicts[3].clone()]);
        assert_eq!(agg.non_blocking_failures, vec![verdicts[2].clone()]);
        assert_eq!(agg.blocking_passes, vec![verdicts[4].clone()]);
        assert_eq!(agg.non_blocking_passes, vec![verdicts[1].clone()]);
    }

    #[test]
    fn empty_input_gives_empty_buckets() {
        assert_eq!(aggregate(&[]), Aggregation::default());
    }
}
