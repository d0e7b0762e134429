//! Parsing, normalization, and declarative diffing for nftables rulesets.
//!
//! The pipeline is text in, text out:
//!
//! 1. [`comments`] strips block and line comments.
//! 2. [`normalize`] rewrites legacy `xt target` NAT spellings and counter
//!    values into canonical form, and optionally runs the [`infer`] pass.
//! 3. [`parser`] recovers tables and chains by brace matching.
//! 4. [`delta`] subtracts a baseline [`Ruleset`] from a complete one and
//!    [`writer`] renders what is left as a loadable fragment.

pub mod comments;
pub mod delta;
pub mod format;
pub mod infer;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod writer;

pub use comments::strip_comments;
pub use delta::{delta, summarize, ChainContent, ChainDelta, DeltaSummary, TableDelta};
pub use format::{format_json, format_summary};
pub use infer::infer_dnat_targets;
pub use model::{normalize_rule, Chain, Ruleset, Table, TableKey};
pub use normalize::{normalize, normalize_with_options, NormalizeOptions};
pub use parser::{find_matching_brace, parse, parse_file, ParseError};
pub use writer::{render_delta, write_delta, write_file, WriteError};
