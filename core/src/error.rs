use itertools::Itertools as _;
use thiserror::Error;

use crate::{lr::Action, Symbol};

/// Errors raised while building a grammar.
///
/// A grammar that fails here can not be used by any engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("undeclared symbol {0}")]
    UndeclaredSymbol(String),

    #[error("the start symbol {0} has no production")]
    NoSuchStart(String),

    #[error("a symbol with the same identifier already exists {0}")]
    DuplicatedSymbol(String),

    #[error("the identifier {0} is reserved")]
    ReservedSymbol(String),

    #[error("terminal {0} can not be the left-hand side of a rule")]
    TerminalOnLeftHandSide(String),
}

pub type GrammarResult<T> = Result<T, GrammarError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift-reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce-reduce"),
        }
    }
}

/// Two actions competing for the same table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub state: usize,
    pub lookahead: Vec<Symbol>,
    pub actions: [Action; 2],
}

impl Conflict {
    pub(crate) fn new(state: usize, lookahead: Vec<Symbol>, actions: [Action; 2]) -> Self {
        let kind = if actions.iter().any(|action| matches!(action, Action::Shift(_))) {
            ConflictKind::ShiftReduce
        } else {
            ConflictKind::ReduceReduce
        };

        Self {
            kind,
            state,
            lookahead,
            actions,
        }
    }
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "a {} conflict has occurred for lookahead [{}] ({} / {}), state={}",
            self.kind,
            self.lookahead.iter().join(" "),
            self.actions[0],
            self.actions[1],
            self.state
        )
    }
}

/// Errors raised while building a LR(k) automaton.
///
/// The grammar is not supported by the engine for that lookahead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("{0}")]
    Conflict(Conflict),

    #[error("unsupported lookahead length {0}, at least one symbol is required")]
    UnsupportedLookahead(usize),
}

impl ConstructionError {
    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            ConstructionError::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

pub type ConstructionResult<T> = Result<T, ConstructionError>;

/// The terminals a parser was ready to accept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedSymbols(pub(crate) Vec<Symbol>);

impl ExpectedSymbols {
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.0.contains(symbol)
    }
}

impl FromIterator<Symbol> for ExpectedSymbols {
    /// Collects sorted, without duplicates.
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        Self(iter.into_iter().sorted().dedup().collect())
    }
}

impl std::fmt::Display for ExpectedSymbols {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.iter().join(", "))
    }
}

/// Why an input was rejected.
///
/// This is an expected parse outcome, not a fault of the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("unknown token {token} at position {position}")]
    UnknownToken { position: usize, token: Symbol },

    #[error("no derivation, stuck at position {position} on {}, expecting {expected}", display_found(.found))]
    NoDerivation {
        position: usize,
        found: Option<Symbol>,
        expected: ExpectedSymbols,
    },

    #[error("unexpected symbol {} at position {position}, expecting {expected}", display_found(.found))]
    UnexpectedToken {
        position: usize,
        found: Option<Symbol>,
        expected: ExpectedSymbols,
    },
}

fn display_found(found: &Option<Symbol>) -> String {
    found
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "end of stream".to_string())
}

impl Rejection {
    /// Position of the token the parser stopped on.
    pub fn position(&self) -> usize {
        match self {
            Rejection::UnknownToken { position, .. }
            | Rejection::NoDerivation { position, .. }
            | Rejection::UnexpectedToken { position, .. } => *position,
        }
    }
}
