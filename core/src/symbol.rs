use std::fmt;

/// Index of a symbol inside a grammar's symbol table.
pub type SymbolId = usize;

/// Identifier of the reserved end-of-stream terminal.
pub const EOS: &str = "<eos>";
/// Identifier of the reserved augmented start non-terminal.
pub const START: &str = "<start>";

pub(crate) const EOS_ID: SymbolId = 0;
pub(crate) const START_ID: SymbolId = 1;

/// A grammar symbol.
///
/// Two symbols are the same if they have the same kind and the same name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn term(id: impl Into<String>) -> Self {
        Self::Terminal(id.into())
    }

    pub fn nterm(id: impl Into<String>) -> Self {
        Self::Nonterminal(id.into())
    }

    /// The end-of-stream symbol (<eos>).
    pub fn eos() -> Self {
        Self::term(EOS)
    }

    /// The augmented start symbol (<start>).
    pub fn start() -> Self {
        Self::nterm(START)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Terminal(id) | Self::Nonterminal(id) => id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    pub fn is_eos(&self) -> bool {
        matches!(self, Self::Terminal(id) if id == EOS)
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Self::Nonterminal(id) if id == START)
    }

    pub(crate) fn is_reserved(&self) -> bool {
        matches!(self.name(), EOS | START)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds a token sequence out of terminal names.
///
/// # Example
/// ```
/// use twinparse_core::terminals;
///
/// let tokens = terminals("a a b b".split_whitespace());
/// assert_eq!(tokens.len(), 4);
/// ```
pub fn terminals<I, S>(names: I) -> Vec<Symbol>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Symbol::term).collect()
}

#[macro_export]
/// Creates a terminal symbol.
macro_rules! term {
    ($id:expr) => {
        $crate::Symbol::term($id)
    };
}

#[macro_export]
/// Creates a non-terminal symbol.
macro_rules! nterm {
    ($id:expr) => {
        $crate::Symbol::nterm($id)
    };
}
