use std::path::PathBuf;

use nft_delta_core::{parse, parse_file, ParseError, TableKey};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_tables_and_chains_in_declaration_order() {
    let ruleset = parse_file(&fixture("fixtures/complete.nft")).expect("parse should succeed");

    let keys: Vec<String> = ruleset.tables().iter().map(|t| t.key().to_string()).collect();
    assert_eq!(keys, vec!["inet filter", "ip6 nat", "ip6 filter"]);

    let filter = ruleset.get_table("inet", "filter").expect("inet filter should exist");
    let names: Vec<&str> = filter.chain_names().collect();
    assert_eq!(names, vec!["input", "forward", "output"]);
    assert_eq!(filter.indent(), "");
}

#[test]
fn splits_headers_from_rules_and_keeps_formatting() {
    let ruleset = parse_file(&fixture("fixtures/global.nft")).expect("parse should succeed");
    let input = ruleset
        .table(&TableKey::new("inet", "filter"))
        .and_then(|t| t.chain("input"))
        .expect("input chain should exist");

    assert_eq!(input.indent(), "\t");
    assert_eq!(
        input.header_lines(),
        ["\t\ttype filter hook input priority filter; policy drop;"]
    );
    assert_eq!(input.rules().len(), 3);
    assert_eq!(input.rules()[1], "\t\tiif \"lo\" accept");
    assert!(input.blank_after_header());
    assert!(input.normalized_rules().contains("tcp dport 22 accept"));

    let forward = ruleset
        .get_table("inet", "filter")
        .and_then(|t| t.chain("forward"))
        .expect("forward chain should exist");
    assert!(forward.rules().is_empty());
    assert!(!forward.blank_after_header());
}

#[test]
fn parses_single_line_blocks() {
    let ruleset = parse(
        "table ip6 nat { chain prerouting { type nat hook prerouting priority -100; dnat to 10.0.0.5:80; } }",
    )
    .expect("parse should succeed");
    let chain = ruleset
        .get_table("ip6", "nat")
        .and_then(|t| t.chain("prerouting"))
        .expect("prerouting should exist");
    assert_eq!(chain.header_lines().len(), 1);
    assert!(chain.rules().is_empty());
}

#[test]
fn ignores_sets_and_text_outside_tables() {
    let ruleset = parse(
        "flush ruleset\ndefine LAN = 10.0.0.0/8\ntable inet f {\n\tset blocked {\n\t\ttype ipv4_addr\n\t}\n\tchain input {\n\t\tip saddr @blocked drop\n\t}\n}\n",
    )
    .expect("parse should succeed");
    assert_eq!(ruleset.len(), 1);
    let table = ruleset.get_table("inet", "f").expect("table should exist");
    assert_eq!(table.chains().len(), 1);
    assert_eq!(table.chains()[0].rules(), ["\t\tip saddr @blocked drop"]);
}

#[test]
fn repeated_declarations_merge_into_first() {
    let ruleset = parse(
        "table ip filter {\n chain input {\n  type filter hook input priority 0;\n  a\n }\n}\ntable ip nat {\n}\ntable ip filter {\n chain input {\n  b\n }\n chain output {\n  c\n }\n}\n",
    )
    .expect("parse should succeed");

    let keys: Vec<String> = ruleset.tables().iter().map(|t| t.key().to_string()).collect();
    assert_eq!(keys, vec!["ip filter", "ip nat"]);

    let filter = ruleset.get_table("ip", "filter").expect("filter should exist");
    let input = filter.chain("input").expect("input should exist");
    assert_eq!(input.header_lines().len(), 1);
    assert_eq!(input.rules(), ["  a", "  b"]);
    assert!(filter.chain("output").is_some());
}

#[test]
fn truncated_input_reports_unmatched_brace() {
    let err = parse_file(&fixture("fixtures/truncated.nft")).expect_err("parse should fail");
    match &err {
        ParseError::UnmatchedBrace { block, line } => {
            assert_eq!(block, "table inet filter");
            assert_eq!(*line, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("unmatched"));
}

#[test]
fn unmatched_brace_reports_line_of_opening_block() {
    let err = parse("table ip a {\n}\n\ntable ip b {\n\tchain c {\n\t}\n").expect_err("parse should fail");
    assert!(matches!(err, ParseError::UnmatchedBrace { ref block, line: 4 } if block == "table ip b"));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = parse_file(&fixture("fixtures/does-not-exist.nft")).expect_err("read should fail");
    assert!(matches!(err, ParseError::Io(_)));
}

#[test]
fn empty_input_is_an_empty_ruleset() {
    let ruleset = parse("").expect("parse should succeed");
    assert!(ruleset.is_empty());
}

#[test]
fn quoted_text_in_line_comment_does_not_leak_block_comment_into_rules() {
    let ruleset = parse("table ip t {\n chain c {\n  accept # \" /* multi\nline */ drop\n }\n}\n")
        .expect("parse should succeed");
    let chain = ruleset
        .get_table("ip", "t")
        .and_then(|t| t.chain("c"))
        .expect("chain c should exist");
    assert_eq!(chain.rules(), ["  accept"]);
}
