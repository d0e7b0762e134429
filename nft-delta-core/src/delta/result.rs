use serde::Serialize;

/// What a chain contributes to the rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainContent {
    /// Chain absent from the baseline: headers and every rule.
    Full {
        header_lines: Vec<String>,
        blank_after_header: bool,
        rules: Vec<String>,
    },
    /// Chain present in the baseline: only rules the baseline lacks.
    Partial { rules: Vec<String> },
}

impl ChainContent {
    pub fn rules(&self) -> &[String] {
        match self {
            ChainContent::Full { rules, .. } | ChainContent::Partial { rules } => rules,
        }
    }
}

/// A chain selected for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDelta {
    pub name: String,
    pub indent: String,
    pub content: ChainContent,
}

/// A table with at least one chain selected for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDelta {
    pub family: String,
    pub name: String,
    pub indent: String,
    /// True when the baseline has no table with this family and name.
    pub new_table: bool,
    pub chains: Vec<ChainDelta>,
}

/// Counts describing a computed delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeltaSummary {
    pub tables_new: usize,
    pub tables_changed: usize,
    pub chains_full: usize,
    pub chains_partial: usize,
    pub rules: usize,
}
