use tracing::debug;

use crate::delta::result::{ChainContent, ChainDelta, DeltaSummary, TableDelta};
use crate::model::{Chain, Ruleset, Table};

/// Compute what `current` adds on top of `base`, table by table.
///
/// Tables follow `current`'s declaration order. A table missing from `base`
/// is carried whole; otherwise chains missing from the base table come
/// first, followed by chains reduced to the rules the base chain lacks.
/// Tables and chains with nothing new are left out.
pub fn delta(current: &Ruleset, base: &Ruleset) -> Vec<TableDelta> {
    let out: Vec<TableDelta> = current
        .tables()
        .iter()
        .filter_map(|table| table_delta(table, base.table(&table.key())))
        .collect();
    debug!(tables = out.len(), "computed ruleset delta");
    out
}

fn table_delta(table: &Table, base: Option<&Table>) -> Option<TableDelta> {
    let chains: Vec<ChainDelta> = match base {
        None => table.chains().iter().map(full_chain).collect(),
        Some(base_table) => {
            let mut chains: Vec<ChainDelta> = table
                .chains()
                .iter()
                .filter(|chain| base_table.chain(chain.name()).is_none())
                .map(full_chain)
                .collect();
            chains.extend(table.chains().iter().filter_map(|chain| {
                base_table
                    .chain(chain.name())
                    .and_then(|base_chain| partial_chain(chain, base_chain))
            }));
            chains
        }
    };

    if chains.is_empty() {
        return None;
    }
    Some(TableDelta {
        family: table.family().to_string(),
        name: table.name().to_string(),
        indent: table.indent().to_string(),
        new_table: base.is_none(),
        chains,
    })
}

fn full_chain(chain: &Chain) -> ChainDelta {
    ChainDelta {
        name: chain.name().to_string(),
        indent: chain.indent().to_string(),
        content: ChainContent::Full {
            header_lines: chain.header_lines().to_vec(),
            blank_after_header: chain.blank_after_header(),
            rules: chain.rules().to_vec(),
        },
    }
}

fn partial_chain(chain: &Chain, base: &Chain) -> Option<ChainDelta> {
    let rules: Vec<String> = chain
        .novel_rules(Some(base))
        .into_iter()
        .map(ToString::to_string)
        .collect();
    if rules.is_empty() {
        return None;
    }
    Some(ChainDelta {
        name: chain.name().to_string(),
        indent: chain.indent().to_string(),
        content: ChainContent::Partial { rules },
    })
}

/// Count tables, chains, and rule lines in a computed delta.
pub fn summarize(tables: &[TableDelta]) -> DeltaSummary {
    let mut summary = DeltaSummary::default();
    for table in tables {
        if table.new_table {
            summary.tables_new += 1;
        } else {
            summary.tables_changed += 1;
        }
        for chain in &table.chains {
            match &chain.content {
                ChainContent::Full { .. } => summary.chains_full += 1,
                ChainContent::Partial { .. } => summary.chains_partial += 1,
            }
            summary.rules += chain.content.rules().len();
        }
    }
    summary
}
