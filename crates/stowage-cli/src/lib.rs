use stowage_services::ImportSummary;

/// One-line report printed when an import finishes.
pub fn summary_line(summary: &ImportSummary, dry_run: bool) -> String {
    let mode = if dry_run { " (dry run)" } else { "" };
    format!(
        "Imported {} file(s), skipped {}{}",
        summary.imported, summary.skipped, mode
    )
}

/// Initialize tracing for CLI binaries.
///
/// `RUST_LOG` wins; otherwise `default_level` applies.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_reports_counts() {
        let summary = ImportSummary {
            imported: 3,
            skipped: 1,
        };
        assert_eq!(summary_line(&summary, false), "Imported 3 file(s), skipped 1");
        assert_eq!(
            summary_line(&summary, true),
            "Imported 3 file(s), skipped 1 (dry run)"
        );
    }
}
