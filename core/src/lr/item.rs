use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::{Grammar, RuleId, SymbolId};

use super::{
    lookahead::{display_lookahead, FirstK, Lookahead},
    StateId,
};

/// An LR(k) item: a rule, a position in its right-hand side, and the
/// lookahead expected once the rule is reduced.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct LrItem {
    pub rule: RuleId,
    pub position: usize,
    pub lookahead: Lookahead,
}

impl LrItem {
    pub fn new(rule: RuleId, lookahead: Lookahead) -> Self {
        Self {
            rule,
            position: 0,
            lookahead,
        }
    }

    /// The symbol right after the dot, if any.
    pub fn symbol(&self, grammar: &Grammar) -> Option<SymbolId> {
        grammar.rule(self.rule).rhs.get(self.position).copied()
    }

    /// The symbols after the dot.
    pub fn remaining<'g>(&self, grammar: &'g Grammar) -> &'g [SymbolId] {
        &grammar.rule(self.rule).rhs[self.position..]
    }

    pub fn next(&self) -> Self {
        Self {
            rule: self.rule,
            position: self.position + 1,
            lookahead: self.lookahead.clone(),
        }
    }

    pub fn display(&self, grammar: &Grammar, k: usize) -> String {
        let rule = grammar.rule(self.rule);
        let mut rhs = rule
            .rhs
            .iter()
            .map(|&sym| grammar.symbol(sym).to_string())
            .collect::<Vec<_>>();
        rhs.insert(self.position, "•".to_string());

        format!(
            "[{} -> {}, {}]",
            grammar.symbol(rule.lhs),
            rhs.join(" "),
            display_lookahead(grammar, k, &self.lookahead)
        )
    }
}

/// A state of the automaton.
///
/// Two sets are the same state when their kernels are equal.
#[derive(Debug, Clone)]
pub(crate) struct ItemSet {
    pub id: StateId,
    kernel: BTreeSet<LrItem>,
    items: BTreeSet<LrItem>,
}

impl PartialEq for ItemSet {
    fn eq(&self, other: &Self) -> bool {
        self.kernel.eq(&other.kernel)
    }
}

impl Eq for ItemSet {}

impl ItemSet {
    pub fn from_kernel(id: StateId, kernel: BTreeSet<LrItem>) -> Self {
        Self {
            id,
            items: kernel.clone(),
            kernel,
        }
    }

    /// Iterates over the closed items.
    pub fn iter(&self) -> impl Iterator<Item = &LrItem> {
        self.items.iter()
    }

    /// Adds `B -> • γ, w` for each item `A -> α • B β, u` and each w in
    /// FIRST_k(β u), until nothing is added.
    pub fn close(&mut self, grammar: &Grammar, first: &FirstK) {
        let mut stack: Vec<LrItem> = self.kernel.iter().cloned().collect();

        while let Some(item) = stack.pop() {
            let Some(sym) = item.symbol(grammar) else {
                continue;
            };

            if grammar.is_terminal(sym) {
                continue;
            }

            let lookaheads = first.of_sequence(&item.remaining(grammar)[1..], &item.lookahead);

            for rule in grammar.rules_of(sym) {
                for lookahead in lookaheads.iter() {
                    let predicted = LrItem::new(rule.id, lookahead.clone());
                    if self.items.insert(predicted.clone()) {
                        stack.push(predicted);
                    }
                }
            }
        }
    }

    /// The kernels reached by moving the dot over each symbol.
    pub fn reachable_kernels(&self, grammar: &Grammar) -> BTreeMap<SymbolId, BTreeSet<LrItem>> {
        let mut kernels = BTreeMap::<SymbolId, BTreeSet<LrItem>>::new();

        for item in self.iter() {
            if let Some(sym) = item.symbol(grammar) {
                kernels.entry(sym).or_default().insert(item.next());
            }
        }

        kernels
    }

    pub fn display(&self, grammar: &Grammar, k: usize) -> String {
        format!(
            "#{}{{{}}}",
            self.id,
            self.iter().map(|item| item.display(grammar, k)).join(", ")
        )
    }
}
