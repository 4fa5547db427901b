//! FIRST_k sets.
//!
//! A lookahead is a string of at most k terminals. A string shorter than k
//! means the input ends right after it.

use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;

use crate::{Grammar, Symbol, SymbolId};

pub type Lookahead = Vec<SymbolId>;

/// The terminal strings of length <= k each symbol can begin with.
#[derive(Debug, Clone)]
pub(crate) struct FirstK {
    k: usize,
    sets: Vec<BTreeSet<Lookahead>>,
}

impl FirstK {
    pub fn compute(grammar: &Grammar, k: usize) -> Self {
        let mut sets: Vec<BTreeSet<Lookahead>> = (0..grammar.symbol_count())
            .map(|id| {
                if grammar.is_terminal(id) {
                    BTreeSet::from([vec![id]])
                } else {
                    BTreeSet::new()
                }
            })
            .collect();

        let mut rounds = 0;
        let mut changed = true;

        while changed {
            changed = false;
            rounds += 1;

            for rule in grammar.rules() {
                let derived = rule
                    .rhs
                    .iter()
                    .fold(BTreeSet::from([vec![]]), |acc, &sym| concat(k, &acc, &sets[sym]));

                let before = sets[rule.lhs].len();
                sets[rule.lhs].extend(derived);
                changed |= sets[rule.lhs].len() != before;
            }
        }

        debug!("first_{} sets computed in {} rounds", k, rounds);

        Self { k, sets }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// FIRST_k of `seq` followed by `tail`.
    ///
    /// Empty if a symbol of the sequence derives no terminal string.
    pub fn of_sequence(&self, seq: &[SymbolId], tail: &Lookahead) -> BTreeSet<Lookahead> {
        let mut acc = BTreeSet::from([vec![]]);

        for &sym in seq {
            acc = concat(self.k, &acc, &self.sets[sym]);
            if acc.iter().all(|la| la.len() >= self.k) {
                return acc;
            }
        }

        concat(self.k, &acc, &BTreeSet::from([tail.clone()]))
    }
}

/// Concatenates every string of `left` with every string of `right`, truncated to k.
fn concat(k: usize, left: &BTreeSet<Lookahead>, right: &BTreeSet<Lookahead>) -> BTreeSet<Lookahead> {
    let mut out = BTreeSet::new();

    for prefix in left {
        if prefix.len() >= k {
            out.insert(prefix.clone());
            continue;
        }

        for suffix in right {
            out.insert(
                prefix
                    .iter()
                    .chain(suffix.iter())
                    .take(k)
                    .copied()
                    .collect(),
            );
        }
    }

    out
}

/// The symbols of a lookahead, <eos> marking the end of input.
pub(crate) fn lookahead_symbols(grammar: &Grammar, k: usize, lookahead: &[SymbolId]) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = lookahead.iter().map(|&sym| grammar.symbol(sym).clone()).collect();
    if lookahead.len() < k {
        symbols.push(Symbol::eos());
    }
    symbols
}

pub(crate) fn display_lookahead(grammar: &Grammar, k: usize, lookahead: &[SymbolId]) -> String {
    lookahead_symbols(grammar, k, lookahead).iter().join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::FirstK;
    use crate::{
        fixtures::{expr_grammar, lr2_grammar},
        Grammar, Symbol,
    };

    fn ids(g: &Grammar, strings: &[&[&str]]) -> BTreeSet<Vec<usize>> {
        strings
            .iter()
            .map(|s| {
                s.iter()
                    .map(|name| g.symbol_id(&Symbol::term(*name)).unwrap())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_001_first_1_matches_first() {
        let g = expr_grammar();
        let first = FirstK::compute(&g, 1);
        let e = g.symbol_id(&Symbol::nterm("E")).unwrap();

        assert_eq!(first.of_sequence(&[e], &vec![]), ids(&g, &[&["("], &["id"]]));
    }

    #[test]
    fn test_002_first_2() {
        let g = lr2_grammar();
        let first = FirstK::compute(&g, 2);
        let sym = |name: &str| g.symbol_id(&Symbol::nterm(name)).unwrap();

        assert_eq!(first.of_sequence(&[sym("D")], &vec![]), ids(&g, &[&["b", "b"]]));
        assert_eq!(
            first.of_sequence(&[sym("B")], &vec![]),
            ids(&g, &[&["a", "b"]])
        );
        assert_eq!(
            first.of_sequence(&[sym("A")], &vec![]),
            ids(&g, &[&["a"]])
        );

        let b = g.symbol_id(&Symbol::term("b")).unwrap();
        assert_eq!(
            first.of_sequence(&[sym("A")], &vec![b, b]),
            ids(&g, &[&["a", "b"]])
        );
    }

    #[test]
    fn test_003_nullable_sequences_keep_the_tail() {
        let g = crate::fixtures::anbn_grammar();
        let first = FirstK::compute(&g, 2);
        let s = g.symbol_id(&Symbol::nterm("S")).unwrap();
        let b = g.symbol_id(&Symbol::term("b")).unwrap();
        let a = g.symbol_id(&Symbol::term("a")).unwrap();

        // S -> a S b | ε
        assert_eq!(
            first.of_sequence(&[s], &vec![b]),
            BTreeSet::from([vec![b], vec![a, a], vec![a, b]])
        );
    }
}
