use crate::delta::DeltaSummary;

/// Format delta counts as a single `key=value` line.
pub fn format_summary(summary: &DeltaSummary) -> String {
    format!(
        "tables_new={} tables_changed={} chains_full={} chains_partial={} rules={}",
        summary.tables_new,
        summary.tables_changed,
        summary.chains_full,
        summary.chains_partial,
        summary.rules
    )
}

#[cfg(test)]
mod tests {
    use super::format_summary;
    use crate::delta::DeltaSummary;

    #[test]
    fn empty_summary_is_all_zero() {
        assert_eq!(
            format_summary(&DeltaSummary::default()),
            "tables_new=0 tables_changed=0 chains_full=0 chains_partial=0 rules=0"
        );
    }
}
