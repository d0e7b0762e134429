use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "nft-delta")]
#[command(about = "Print the nftables fragment a complete ruleset adds on top of a baseline")]
#[command(override_usage = "nft-delta [OPTIONS] <GLOBAL> <COMPLETE>\n       \
                            nft-delta [OPTIONS] <FILE>\n       \
                            nft-delta [OPTIONS] -")]
pub struct Cli {
    /// Baseline ruleset, or the only input when normalizing. `-` reads stdin.
    #[arg(value_name = "GLOBAL")]
    pub first: String,
    /// Complete ruleset. When given, only what it adds to GLOBAL is printed.
    #[arg(value_name = "COMPLETE")]
    pub second: Option<String>,
    /// Do not infer missing DNAT destinations from ip6 accept rules.
    #[arg(long)]
    pub no_infer_dnat: bool,
    /// Output format for the delta.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Print table/chain/rule counts instead of the fragment.
    #[arg(long)]
    pub summary: bool,
    /// Write the result to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Log parser and inference decisions to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
