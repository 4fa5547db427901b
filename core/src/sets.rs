//! NULLABLE, FIRST and FOLLOW sets.
//!
//! Each set is computed by iterating over the rules until nothing changes.
//! Sets only ever grow, and they are bounded by the number of terminals, so
//! every loop terminates.

use std::collections::BTreeSet;

use log::debug;

use crate::{symbol::{EOS_ID, START_ID}, Rule, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSets {
    nullable: Vec<bool>,
    first: Vec<BTreeSet<SymbolId>>,
    follow: Vec<BTreeSet<SymbolId>>,
}

impl DerivedSets {
    /// Computes the sets, `terminal[id]` tells whether a symbol is a terminal.
    pub(crate) fn compute(terminal: &[bool], rules: &[Rule]) -> Self {
        let mut sets = Self {
            nullable: vec![false; terminal.len()],
            first: terminal
                .iter()
                .enumerate()
                .map(|(id, &is_terminal)| {
                    if is_terminal {
                        BTreeSet::from([id])
                    } else {
                        BTreeSet::new()
                    }
                })
                .collect(),
            follow: vec![BTreeSet::new(); terminal.len()],
        };

        sets.compute_nullable(rules);
        sets.compute_first(rules);
        sets.compute_follow(terminal, rules);
        sets
    }

    fn compute_nullable(&mut self, rules: &[Rule]) {
        let mut rounds = 0;
        let mut changed = true;

        while changed {
            changed = false;
            rounds += 1;

            for rule in rules {
                if !self.nullable[rule.lhs] && rule.rhs.iter().all(|&sym| self.nullable[sym]) {
                    self.nullable[rule.lhs] = true;
                    changed = true;
                }
            }
        }

        debug!("nullable set computed in {} rounds", rounds);
    }

    fn compute_first(&mut self, rules: &[Rule]) {
        let mut rounds = 0;
        let mut changed = true;

        while changed {
            changed = false;
            rounds += 1;

            for rule in rules {
                for &sym in rule.rhs.iter() {
                    let missing: Vec<SymbolId> = self.first[sym]
                        .difference(&self.first[rule.lhs])
                        .copied()
                        .collect();

                    if !missing.is_empty() {
                        self.first[rule.lhs].extend(missing);
                        changed = true;
                    }

                    if !self.nullable[sym] {
                        break;
                    }
                }
            }
        }

        debug!("first sets computed in {} rounds", rounds);
    }

    fn compute_follow(&mut self, terminal: &[bool], rules: &[Rule]) {
        self.follow[START_ID].insert(EOS_ID);

        let mut rounds = 0;
        let mut changed = true;

        while changed {
            changed = false;
            rounds += 1;

            for rule in rules {
                for (pos, &sym) in rule.rhs.iter().enumerate() {
                    if terminal[sym] {
                        continue;
                    }

                    // A → α X β : FIRST(β) ⊆ FOLLOW(X), and FOLLOW(A) too if β ⇒* ε
                    let (mut found, nullable) = self.first_of_sequence(&rule.rhs[pos + 1..]);
                    if nullable {
                        found.extend(self.follow[rule.lhs].iter().copied());
                    }

                    let before = self.follow[sym].len();
                    self.follow[sym].extend(found);
                    changed |= self.follow[sym].len() != before;
                }
            }
        }

        debug!("follow sets computed in {} rounds", rounds);
    }

    pub fn is_nullable(&self, sym: SymbolId) -> bool {
        self.nullable[sym]
    }

    pub fn first(&self, sym: SymbolId) -> &BTreeSet<SymbolId> {
        &self.first[sym]
    }

    pub fn follow(&self, sym: SymbolId) -> &BTreeSet<SymbolId> {
        &self.follow[sym]
    }

    /// FIRST of a sequence of symbols, and whether the whole sequence is nullable.
    pub fn first_of_sequence(&self, seq: &[SymbolId]) -> (BTreeSet<SymbolId>, bool) {
        let mut set = BTreeSet::new();

        for &sym in seq {
            set.extend(self.first[sym].iter().copied());
            if !self.nullable[sym] {
                return (set, false);
            }
        }

        (set, true)
    }
}
