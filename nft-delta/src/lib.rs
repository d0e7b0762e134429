//! Command-line front end for `nft-delta-core`.
//!
//! The binary has two modes. With two inputs it prints the declarative
//! fragment that the second ruleset (COMPLETE) adds on top of the first
//! (GLOBAL). With one input it prints the normalized text only.

pub mod input;
pub mod path_guard;
pub mod report;
