use colored::Colorize;
use nft_delta_core::{format_summary, DeltaSummary};

/// Render delta counts for terminal output.
pub fn render_summary(summary: &DeltaSummary) -> String {
    format_summary(summary).cyan().to_string()
}
