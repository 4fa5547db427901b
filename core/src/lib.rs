//! Earley and LR(k) parsing of context-free grammars.
//!
//! A [`Grammar`] is built once, then shared by any number of parsers:
//!
//! - [`EarleyParser`] accepts every context-free grammar and returns a
//!   [`Forest`] of all the derivations of the input;
//! - [`LrParser`] drives an [`LrTable`] built for a fixed lookahead, and
//!   returns the single [`Tree`] of the input.

mod rule;
mod symbol;

pub mod ast;
pub mod earley;
pub mod error;
pub mod grammar;
pub mod lr;
mod sets;

pub use ast::{Forest, Node, NodeId, Packed, ParseOutcome, Tree};
pub use earley::{Chart, Column, EarleyItem, EarleyParser};
pub use error::{
    Conflict, ConflictKind, ConstructionError, ConstructionResult, ExpectedSymbols, GrammarError,
    GrammarResult, Rejection,
};
pub use grammar::{Grammar, GrammarBuilder};
pub use lr::{Action, LrConfig, LrParser, LrTable, StateId};
pub use rule::{Production, Rule, RuleId};
pub use symbol::{terminals, Symbol, SymbolId, EOS, START};
