use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::{ExpectedSymbols, Grammar, SymbolId};

use super::EarleyItem;

/// The items of one input position, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    items: Vec<EarleyItem>,
    seen: HashSet<EarleyItem>,
    /// Items whose dot stands before a non-terminal, by that non-terminal.
    waiting: HashMap<SymbolId, Vec<EarleyItem>>,
}

impl Column {
    /// Adds the item unless it is already there.
    pub(super) fn push(&mut self, item: EarleyItem, grammar: &Grammar) -> bool {
        if !self.seen.insert(item) {
            return false;
        }

        if let Some(sym) = item.next_symbol(grammar).filter(|&sym| !grammar.is_terminal(sym)) {
            self.waiting.entry(sym).or_default().push(item);
        }

        self.items.push(item);
        true
    }

    /// Items waiting on the non-terminal, in insertion order.
    pub(super) fn waiting_on(&self, sym: SymbolId) -> &[EarleyItem] {
        self.waiting.get(&sym).map(Vec::as_slice).unwrap_or_default()
    }

    pub(super) fn get(&self, index: usize) -> Option<EarleyItem> {
        self.items.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EarleyItem> {
        self.items.iter()
    }

    pub fn contains(&self, item: &EarleyItem) -> bool {
        self.seen.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The item sets of a parse, one column per input position.
///
/// Column `i` holds the items reached after reading `i` tokens.
#[derive(Debug, Clone)]
pub struct Chart<'g> {
    pub(super) grammar: &'g Grammar,
    pub(super) columns: Vec<Column>,
}

impl<'g> Chart<'g> {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Number of columns, the input length plus one.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// True if the last column holds `<start> -> S •` from origin 0.
    pub fn is_accepted(&self) -> bool {
        let accepting = EarleyItem {
            rule: 0,
            dot: 1,
            origin: 0,
        };

        self.columns
            .last()
            .map(|column| column.contains(&accepting))
            .unwrap_or(false)
    }

    /// Terminals which could be scanned from a column.
    pub fn expected(&self, position: usize) -> ExpectedSymbols {
        self.columns
            .get(position)
            .into_iter()
            .flat_map(|column| column.iter())
            .filter_map(|item| item.next_symbol(self.grammar))
            .filter(|&sym| self.grammar.is_terminal(sym))
            .map(|sym| self.grammar.symbol(sym).clone())
            .collect()
    }

    /// Iterate over the completed items of a column.
    pub fn completed(&self, position: usize) -> impl Iterator<Item = &EarleyItem> + '_ {
        self.columns
            .get(position)
            .into_iter()
            .flat_map(|column| column.iter())
            .filter(|item| item.is_complete(self.grammar))
    }
}

impl fmt::Display for Chart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, column) in self.columns.iter().enumerate() {
            writeln!(f, "#{}", position)?;
            for item in column.iter() {
                writeln!(f, "  {}", item.display(self.grammar))?;
            }
        }
        Ok(())
    }
}
