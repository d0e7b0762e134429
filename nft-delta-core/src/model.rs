use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Identity of a table within a ruleset: address family plus table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableKey {
    pub family: String,
    pub name: String,
}

impl TableKey {
    pub fn new(family: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            name: name.into(),
        }
    }
}

impl Display for TableKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.name)
    }
}

/// Reduce a rule line to the form used for equality checks.
///
/// Surrounding whitespace and one trailing `;` are dropped and inner
/// whitespace runs collapse to a single space.
pub fn normalize_rule(line: &str) -> String {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One `chain <name> { ... }` block.
///
/// Lines are stored exactly as they appeared in the source, indentation
/// included. The normalized rule set is built once in [`Chain::new`] and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chain {
    name: String,
    indent: String,
    header_lines: Vec<String>,
    rules: Vec<String>,
    blank_after_header: bool,
    #[serde(skip)]
    normalized: HashSet<String>,
}

impl Chain {
    pub(crate) fn new(
        name: String,
        indent: String,
        header_lines: Vec<String>,
        rules: Vec<String>,
        blank_after_header: bool,
    ) -> Self {
        let normalized = rules.iter().map(|line| normalize_rule(line)).collect();
        Self {
            name,
            indent,
            header_lines,
            rules,
            blank_after_header,
            normalized,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leading whitespace of the `chain` line in the source.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// `type`/`hook`/`priority`/`policy`/`flags` lines preceding the rules.
    pub fn header_lines(&self) -> &[String] {
        &self.header_lines
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Whether the source separated headers from rules with a blank line.
    pub fn blank_after_header(&self) -> bool {
        self.blank_after_header
    }

    pub fn normalized_rules(&self) -> &HashSet<String> {
        &self.normalized
    }

    /// Return true if a rule equivalent to `line` is present.
    pub fn contains_rule(&self, line: &str) -> bool {
        self.normalized.contains(&normalize_rule(line))
    }

    /// Original rule lines with no equivalent in `base`, in this chain's order.
    ///
    /// Every rule is novel when there is no base chain.
    pub fn novel_rules<'a>(&'a self, base: Option<&Chain>) -> Vec<&'a str> {
        self.rules
            .iter()
            .filter(|line| base.is_none_or(|other| !other.contains_rule(line)))
            .map(String::as_str)
            .collect()
    }
}

/// One `table <family> <name> { ... }` block with chains in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    family: String,
    name: String,
    indent: String,
    chains: Vec<Chain>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Table {
    /// Build a table; chain names must already be unique.
    pub(crate) fn new(family: String, name: String, indent: String, chains: Vec<Chain>) -> Self {
        let index = chains
            .iter()
            .enumerate()
            .map(|(idx, chain)| (chain.name.clone(), idx))
            .collect();
        Self {
            family,
            name,
            indent,
            chains,
            index,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    pub fn key(&self) -> TableKey {
        TableKey::new(self.family.clone(), self.name.clone())
    }

    /// Return the chain with the provided name.
    pub fn chain(&self, name: &str) -> Option<&Chain> {
        self.index.get(name).map(|idx| &self.chains[*idx])
    }

    /// Chains in declaration order.
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain_names(&self) -> impl Iterator<Item = &str> {
        self.chains.iter().map(Chain::name)
    }
}

/// Every table recovered from one input text, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ruleset {
    tables: Vec<Table>,
    #[serde(skip)]
    index: HashMap<TableKey, usize>,
}

impl Ruleset {
    /// Build a ruleset; table keys must already be unique.
    pub(crate) fn new(tables: Vec<Table>) -> Self {
        let index = tables
            .iter()
            .enumerate()
            .map(|(idx, table)| (table.key(), idx))
            .collect();
        Self { tables, index }
    }

    /// Parse declarative ruleset text. See [`crate::parser::parse`].
    pub fn parse(text: &str) -> Result<Self, crate::ParseError> {
        crate::parser::parse(text)
    }

    pub fn table(&self, key: &TableKey) -> Option<&Table> {
        self.index.get(key).map(|idx| &self.tables[*idx])
    }

    /// Return the table by family and name.
    pub fn get_table(&self, family: &str, name: &str) -> Option<&Table> {
        self.table(&TableKey::new(family, name))
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
