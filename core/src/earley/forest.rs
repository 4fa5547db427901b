use std::collections::HashMap;

use crate::{
    ast::{Forest, Node, NodeId, Packed},
    Grammar, RuleId, SymbolId,
};

use super::Chart;

/// A piece of a right-hand side matched over the input.
#[derive(Debug, Clone, Copy)]
enum Span {
    Leaf(usize),
    Symbol(SymbolId, usize, usize),
}

/// Rebuilds the derivations out of the completed items of a chart.
///
/// A completed item `(A -> γ •, i)` in column `j` says A derives the tokens
/// `i..j` through that rule. Each rule is matched back against the input by
/// splitting the span over its right-hand side, every split found becoming
/// an alternative of the `(A, i, j)` node.
///
/// Nodes are created on first reference and their alternatives filled in
/// from a work list, so a node may point to itself or to an ancestor.
pub(super) struct ForestBuilder<'a> {
    grammar: &'a Grammar,
    tokens: &'a [SymbolId],
    /// (lhs, start, end) -> rules completed over that span
    completed: HashMap<(SymbolId, usize, usize), Vec<RuleId>>,
    /// (lhs, start) -> ends of the completed spans
    ends: HashMap<(SymbolId, usize), Vec<usize>>,
    nodes: Vec<Node>,
    symbol_nodes: HashMap<(SymbolId, usize, usize), NodeId>,
    leaf_nodes: HashMap<usize, NodeId>,
    /// Symbol nodes whose alternatives are not computed yet.
    pending: Vec<(NodeId, SymbolId, usize, usize)>,
}

impl<'a> ForestBuilder<'a> {
    pub fn new(chart: &Chart<'a>, tokens: &'a [SymbolId]) -> Self {
        let grammar = chart.grammar;
        let mut completed = HashMap::<_, Vec<RuleId>>::new();
        let mut ends = HashMap::<_, Vec<usize>>::new();

        for end in 0..chart.len() {
            for item in chart.completed(end) {
                let lhs = grammar.rule(item.rule).lhs;

                let rules = completed.entry((lhs, item.origin, end)).or_default();
                if rules.is_empty() {
                    ends.entry((lhs, item.origin)).or_default().push(end);
                }
                if !rules.contains(&item.rule) {
                    rules.push(item.rule);
                }
            }
        }

        Self {
            grammar,
            tokens,
            completed,
            ends,
            nodes: vec![],
            symbol_nodes: HashMap::new(),
            leaf_nodes: HashMap::new(),
            pending: vec![],
        }
    }

    /// Builds the forest rooted at the start symbol over the whole input.
    pub fn build(mut self) -> Forest {
        let root = self.symbol_node(self.grammar.start_id(), 0, self.tokens.len());

        while let Some((id, symbol, start, end)) = self.pending.pop() {
            let rules = self
                .completed
                .get(&(symbol, start, end))
                .cloned()
                .unwrap_or_default();
            let mut packed = vec![];

            for rule in rules {
                for split in self.split(&self.grammar.rule(rule).rhs, start, end) {
                    let children = split
                        .into_iter()
                        .map(|span| match span {
                            Span::Leaf(position) => self.leaf_node(position),
                            Span::Symbol(sym, from, to) => self.symbol_node(sym, from, to),
                        })
                        .collect();

                    packed.push(Packed { rule, children });
                }
            }

            if let Node::Symbol { alternatives, .. } = &mut self.nodes[id] {
                *alternatives = packed;
            }
        }

        Forest::new(self.nodes, root)
    }

    fn leaf_node(&mut self, position: usize) -> NodeId {
        if let Some(&id) = self.leaf_nodes.get(&position) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            terminal: self.grammar.symbol(self.tokens[position]).clone(),
            position,
        });
        self.leaf_nodes.insert(position, id);
        id
    }

    /// Returns the node of the span, queuing it if it is new.
    fn symbol_node(&mut self, symbol: SymbolId, start: usize, end: usize) -> NodeId {
        let key = (symbol, start, end);
        if let Some(&id) = self.symbol_nodes.get(&key) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node::Symbol {
            symbol: self.grammar.symbol(symbol).clone(),
            start,
            end,
            alternatives: vec![],
        });
        self.symbol_nodes.insert(key, id);
        self.pending.push((id, symbol, start, end));
        id
    }

    /// Enumerates the ways `rhs` derives the tokens `start..end`.
    fn split(&self, rhs: &[SymbolId], start: usize, end: usize) -> Vec<Vec<Span>> {
        let mut out = vec![];
        // (index in rhs, position in the input, spans matched so far)
        let mut stack = vec![(0, start, Vec::with_capacity(rhs.len()))];

        while let Some((index, position, spans)) = stack.pop() {
            let Some(&sym) = rhs.get(index) else {
                if position == end {
                    out.push(spans);
                }
                continue;
            };

            if self.grammar.is_terminal(sym) {
                if position < end && self.tokens[position] == sym {
                    let mut spans = spans;
                    spans.push(Span::Leaf(position));
                    stack.push((index + 1, position + 1, spans));
                }
                continue;
            }

            let rest = &rhs[index + 1..];

            // Only terminals left: the symbol's end is fixed.
            if rest.iter().all(|&s| self.grammar.is_terminal(s)) {
                let Some(to) = end.checked_sub(rest.len()) else {
                    continue;
                };
                if to >= position && self.completed.contains_key(&(sym, position, to)) {
                    let mut spans = spans;
                    spans.push(Span::Symbol(sym, position, to));
                    stack.push((index + 1, to, spans));
                }
                continue;
            }

            let Some(ends) = self.ends.get(&(sym, position)) else {
                continue;
            };

            for &to in ends.iter().rev().filter(|&&to| to <= end) {
                let mut next = spans.clone();
                next.push(Span::Symbol(sym, position, to));
                stack.push((index + 1, to, next));
            }
        }

        out
    }
}
