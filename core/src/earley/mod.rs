//! Earley chart parser.
//!
//! Works with any context-free grammar: left recursion, epsilon rules, cycles
//! and ambiguity included. Ambiguous inputs yield a forest holding every
//! derivation.

use log::{debug, trace};

use crate::{ast::Forest, Grammar, ParseOutcome, Rejection, Symbol, SymbolId};

mod chart;
mod forest;
mod item;

pub use chart::*;
pub use item::*;

use forest::ForestBuilder;

/// An Earley parser over a grammar.
///
/// The parser holds no state between two parses, it can be shared between
/// threads.
#[derive(Debug, Clone, Copy)]
pub struct EarleyParser<'g> {
    grammar: &'g Grammar,
}

impl<'g> EarleyParser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Returns true if the tokens are derivable from the start symbol.
    pub fn recognize(&self, tokens: &[Symbol]) -> bool {
        match self.resolve(tokens) {
            Ok(terminals) => self.fill(&terminals).0.is_accepted(),
            Err(_) => false,
        }
    }

    /// Builds the chart of the tokens.
    ///
    /// Tokens unknown to the grammar are never scanned. The chart stops
    /// growing at the first column nothing could be scanned into.
    pub fn chart(&self, tokens: &[Symbol]) -> Chart<'g> {
        let terminals: Vec<Option<SymbolId>> = tokens
            .iter()
            .map(|tok| self.grammar.terminal_id(tok))
            .collect();

        self.fill_with(&terminals).0
    }

    /// Parses the tokens and returns every derivation.
    pub fn parse(&self, tokens: &[Symbol]) -> ParseOutcome<Forest> {
        let terminals = match self.resolve(tokens) {
            Ok(terminals) => terminals,
            Err(rejection) => return ParseOutcome::Rejected(rejection),
        };

        let (chart, stuck) = self.fill(&terminals);

        if let Some(position) = stuck {
            return ParseOutcome::Rejected(Rejection::NoDerivation {
                position,
                found: tokens.get(position).cloned(),
                expected: chart.expected(position),
            });
        }

        if !chart.is_accepted() {
            return ParseOutcome::Rejected(Rejection::NoDerivation {
                position: tokens.len(),
                found: None,
                expected: chart.expected(tokens.len()),
            });
        }

        let forest = ForestBuilder::new(&chart, &terminals).build();
        debug!(
            "accepted {} tokens, forest holds {} nodes",
            tokens.len(),
            forest.len()
        );

        ParseOutcome::Accepted(forest)
    }

    /// Maps each token to the grammar's terminal.
    fn resolve(&self, tokens: &[Symbol]) -> Result<Vec<SymbolId>, Rejection> {
        tokens
            .iter()
            .enumerate()
            .map(|(position, tok)| {
                self.grammar
                    .terminal_id(tok)
                    .ok_or_else(|| Rejection::UnknownToken {
                        position,
                        token: tok.clone(),
                    })
            })
            .collect()
    }

    fn fill(&self, terminals: &[SymbolId]) -> (Chart<'g>, Option<usize>) {
        let terminals: Vec<Option<SymbolId>> = terminals.iter().copied().map(Some).collect();
        self.fill_with(&terminals)
    }

    /// Runs the predictor, scanner and completer over each column.
    ///
    /// Returns the chart, and the position of the token nothing could be
    /// scanned on if the parse got stuck.
    fn fill_with(&self, terminals: &[Option<SymbolId>]) -> (Chart<'g>, Option<usize>) {
        let grammar = self.grammar;
        let sets = grammar.sets();
        let len = terminals.len();

        let mut columns = vec![Column::default(); len + 1];
        columns[0].push(EarleyItem::new(0, 0), grammar);

        for position in 0..=len {
            let mut cursor = 0;

            while let Some(item) = columns[position].get(cursor) {
                cursor += 1;

                match item.next_symbol(grammar) {
                    // Completer
                    None => {
                        let lhs = grammar.rule(item.rule).lhs;
                        let advanced: Vec<EarleyItem> = columns[item.origin]
                            .waiting_on(lhs)
                            .iter()
                            .map(EarleyItem::advance)
                            .collect();

                        for next in advanced {
                            columns[position].push(next, grammar);
                        }
                    }
                    // Scanner
                    Some(sym) if grammar.is_terminal(sym) => {
                        if position < len && terminals[position] == Some(sym) {
                            columns[position + 1].push(item.advance(), grammar);
                        }
                    }
                    // Predictor
                    Some(sym) => {
                        let predicted: Vec<EarleyItem> = grammar
                            .rules_of(sym)
                            .map(|rule| EarleyItem::new(rule.id, position))
                            .collect();

                        for next in predicted {
                            columns[position].push(next, grammar);
                        }

                        // A nullable symbol may complete in this very column,
                        // after the items waiting on it were processed.
                        if sets.is_nullable(sym) {
                            columns[position].push(item.advance(), grammar);
                        }
                    }
                }
            }

            trace!("column #{} holds {} items", position, columns[position].len());

            if position < len && columns[position + 1].is_empty() {
                columns.truncate(position + 2);
                return (Chart { grammar, columns }, Some(position));
            }
        }

        (Chart { grammar, columns }, None)
    }
}
