//! Canonical LR(k) parser.
//!
//! The table is built once from a grammar and a lookahead length, then any
//! number of parsers can drive it.

use log::trace;

use crate::{ast::Tree, Grammar, ParseOutcome, Rejection, Symbol, SymbolId};

mod action;
mod graph;
mod item;
pub(crate) mod lookahead;
mod table;
mod transition;

pub use action::*;
use graph::*;
use lookahead::display_lookahead;
pub use table::*;
use transition::*;

/// Settings of the table construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LrConfig {
    /// The number of lookahead tokens, at least 1.
    pub lookahead: usize,
}

impl Default for LrConfig {
    fn default() -> Self {
        Self { lookahead: 1 }
    }
}

impl LrConfig {
    pub fn new(lookahead: usize) -> Self {
        Self { lookahead }
    }
}

/// Drives an LR table over a sequence of tokens.
#[derive(Debug, Clone, Copy)]
pub struct LrParser<'table, 'g> {
    table: &'table LrTable<'g>,
}

impl<'table, 'g> LrParser<'table, 'g> {
    pub fn new(table: &'table LrTable<'g>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'table LrTable<'g> {
        self.table
    }

    pub fn recognize(&self, tokens: &[Symbol]) -> bool {
        self.parse(tokens).is_accepted()
    }

    /// Parses the tokens into the single tree the table allows.
    pub fn parse(&self, tokens: &[Symbol]) -> ParseOutcome<Tree> {
        let grammar = self.table.grammar();
        let k = self.table.lookahead();

        let terminals = match resolve(grammar, tokens) {
            Ok(terminals) => terminals,
            Err(rejection) => return ParseOutcome::Rejected(rejection),
        };

        let mut states: Vec<StateId> = vec![0];
        let mut stack: Vec<Tree> = vec![];
        let mut position = 0;

        loop {
            let Some(&state) = states.last() else {
                return ParseOutcome::Rejected(self.unexpected(tokens, position, 0));
            };

            let lookahead = &terminals[position..(position + k).min(terminals.len())];

            let Some(action) = self.table.action(state, lookahead) else {
                return ParseOutcome::Rejected(self.unexpected(tokens, position, state));
            };

            trace!(
                "#{} [{}] :: {}",
                state,
                display_lookahead(grammar, k, lookahead),
                action
            );

            match action {
                // Push the token on top of the stack.
                Action::Shift(next) => {
                    let Some(token) = tokens.get(position) else {
                        return ParseOutcome::Rejected(self.unexpected(tokens, position, state));
                    };

                    stack.push(Tree::Leaf {
                        terminal: token.clone(),
                        position,
                    });
                    states.push(next);
                    position += 1;
                }

                // Consume the right-hand side, then go to the state below.
                Action::Reduce(rule_id) => {
                    let rule = grammar.rule(rule_id);
                    let consume = rule.len();

                    if stack.len() < consume || states.len() <= consume {
                        return ParseOutcome::Rejected(self.unexpected(tokens, position, state));
                    }

                    let children = stack.split_off(stack.len() - consume);
                    states.truncate(states.len() - consume);

                    let below = states.last().copied().unwrap_or_default();
                    let Some(goto) = self.table.goto(below, rule.lhs) else {
                        return ParseOutcome::Rejected(self.unexpected(tokens, position, below));
                    };

                    states.push(goto);
                    stack.push(Tree::Node {
                        symbol: grammar.symbol(rule.lhs).clone(),
                        rule: rule_id,
                        children,
                    });
                }

                Action::Accept => {
                    return match stack.pop() {
                        Some(tree) => ParseOutcome::Accepted(tree),
                        None => ParseOutcome::Rejected(self.unexpected(tokens, position, state)),
                    };
                }
            }
        }
    }

    fn unexpected(&self, tokens: &[Symbol], position: usize, state: StateId) -> Rejection {
        Rejection::UnexpectedToken {
            position,
            found: tokens.get(position).cloned(),
            expected: self.table.expected(state),
        }
    }
}

fn resolve(grammar: &Grammar, tokens: &[Symbol]) -> Result<Vec<SymbolId>, Rejection> {
    tokens
        .iter()
        .enumerate()
        .map(|(position, tok)| {
            grammar
                .terminal_id(tok)
                .ok_or_else(|| Rejection::UnknownToken {
                    position,
                    token: tok.clone(),
                })
        })
        .collect()
}
