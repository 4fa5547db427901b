use std::fmt;

use itertools::Itertools;

use crate::{Symbol, SymbolId};

/// The rule's identifier in the grammar.
///
/// Rule #0 is always the augmented rule `<start> -> S`.
pub type RuleId = usize;

/// A production as supplied by the caller.
///
/// An empty right-hand side is an epsilon production.
///
/// # Example
/// S -> a S b
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new<I>(lhs: Symbol, rhs: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        Self {
            lhs,
            rhs: rhs.into_iter().collect(),
        }
    }

    /// The epsilon production `lhs -> ε`.
    pub fn epsilon(lhs: Symbol) -> Self {
        Self { lhs, rhs: vec![] }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            write!(f, " ε")
        } else {
            write!(f, " {}", self.rhs.iter().join(" "))
        }
    }
}

/// A grammar rule
///
/// This object is produced by the grammar with
/// interned symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub id: RuleId,
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
}

impl Rule {
    /// Check the rule contains a certain symbol in its RHS.
    #[inline(always)]
    pub fn contains(&self, sym: SymbolId) -> bool {
        self.rhs.contains(&sym)
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }
}

/// Shorthand to write a production out of symbol names.
///
/// Terminals are written as string literals, non-terminals as identifiers.
///
/// ```
/// use twinparse_core::{production, Symbol};
///
/// let p = production!(S => "a" S "b");
/// assert_eq!(p.rhs[1], Symbol::nterm("S"));
/// let e = production!(S =>);
/// assert!(e.rhs.is_empty());
/// ```
#[macro_export]
macro_rules! production {
    ($lhs:ident => $($rhs:tt)*) => {
        $crate::Production::new(
            $crate::Symbol::nterm(stringify!($lhs)),
            $crate::production!(@rhs [] $($rhs)*)
        )
    };
    (@rhs [$($acc:expr,)*]) => {
        vec![$($acc,)*]
    };
    (@rhs [$($acc:expr,)*] $t:literal $($rest:tt)*) => {
        $crate::production!(@rhs [$($acc,)* $crate::Symbol::term($t),] $($rest)*)
    };
    (@rhs [$($acc:expr,)*] $nt:ident $($rest:tt)*) => {
        $crate::production!(@rhs [$($acc,)* $crate::Symbol::nterm(stringify!($nt)),] $($rest)*)
    };
}
