#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use twinparse::{production, terminals, Grammar, Symbol, SymbolId};

pub fn init() {
    let _ = pretty_env_logger::try_init();
}

pub fn tokens(input: &str) -> Vec<Symbol> {
    terminals(input.split_whitespace())
}

/// Every sentence of at most `max_len` tokens, found by growing the set of
/// strings each symbol derives until nothing changes.
pub fn language(grammar: &Grammar, max_len: usize) -> HashSet<Vec<Symbol>> {
    let mut derived: HashMap<SymbolId, HashSet<Vec<SymbolId>>> = HashMap::new();
    let mut changed = true;

    while changed {
        changed = false;

        for rule in grammar.rules() {
            let mut strings: HashSet<Vec<SymbolId>> = HashSet::from([vec![]]);

            for &sym in rule.rhs.iter() {
                let parts: HashSet<Vec<SymbolId>> = if grammar.is_terminal(sym) {
                    HashSet::from([vec![sym]])
                } else {
                    derived.get(&sym).cloned().unwrap_or_default()
                };

                strings = strings
                    .iter()
                    .cartesian_product(parts.iter())
                    .map(|(left, right)| left.iter().chain(right.iter()).copied().collect_vec())
                    .filter(|s| s.len() <= max_len)
                    .collect();
            }

            let set = derived.entry(rule.lhs).or_default();
            let before = set.len();
            set.extend(strings);
            changed |= set.len() != before;
        }
    }

    derived
        .get(&grammar.start_id())
        .into_iter()
        .flatten()
        .map(|s| s.iter().map(|&id| grammar.symbol(id).clone()).collect())
        .collect()
}

/// Every string of at most `max_len` tokens over the grammar's terminals.
pub fn all_inputs(grammar: &Grammar, max_len: usize) -> Vec<Vec<Symbol>> {
    let alphabet: Vec<Symbol> = grammar.terminals().cloned().collect();
    let mut inputs = vec![vec![]];

    for len in 1..=max_len {
        inputs.extend(
            std::iter::repeat(alphabet.iter().cloned())
                .take(len)
                .multi_cartesian_product(),
        );
    }

    inputs
}

pub fn render(tokens: &[Symbol]) -> String {
    tokens.iter().join(" ")
}

pub fn anbn_grammar() -> Grammar {
    Grammar::build([production!(S => "a" S "b"), production!(S =>)], "S").unwrap()
}

pub fn expr_grammar() -> Grammar {
    Grammar::build(
        [
            production!(E => E "+" T),
            production!(E => T),
            production!(T => T "*" F),
            production!(T => F),
            production!(F => "(" E ")"),
            production!(F => "id"),
        ],
        "E",
    )
    .unwrap()
}

pub fn ambiguous_expr_grammar() -> Grammar {
    Grammar::build(
        [
            production!(E => E "+" E),
            production!(E => E "*" E),
            production!(E => "id"),
        ],
        "E",
    )
    .unwrap()
}

pub fn brackets_grammar() -> Grammar {
    Grammar::build(
        [
            production!(S => "(" S ")"),
            production!(S => S S),
            production!(S =>),
        ],
        "S",
    )
    .unwrap()
}

pub fn equal_ab_grammar() -> Grammar {
    Grammar::build(
        [
            production!(S => "a" S "b" S),
            production!(S => "b" S "a" S),
            production!(S =>),
        ],
        "S",
    )
    .unwrap()
}

pub fn cyclic_grammar() -> Grammar {
    Grammar::build(
        [
            production!(S => A),
            production!(S => "a" "b" "c"),
            production!(A => A),
        ],
        "S",
    )
    .unwrap()
}

pub fn seminar_grammar() -> Grammar {
    Grammar::build([production!(S => S "a" S "b"), production!(S =>)], "S").unwrap()
}

pub fn dangling_else_grammar() -> Grammar {
    Grammar::build(
        [
            production!(S => "if" E "then" S),
            production!(S => "if" E "then" S "else" S),
            production!(S => "other"),
            production!(E => "cond"),
        ],
        "S",
    )
    .unwrap()
}

pub fn lr2_grammar() -> Grammar {
    Grammar::build(
        [
            production!(S => A B),
            production!(A => "a"),
            production!(B => C D),
            production!(B => "a" E),
            production!(C => "a" "b"),
            production!(D => "b" "b"),
            production!(E => "b" "b" "a"),
        ],
        "S",
    )
    .unwrap()
}

/// S -> a S | ε, the start symbol is nullable.
pub fn nullable_start_grammar() -> Grammar {
    Grammar::build([production!(S => "a" S), production!(S =>)], "S").unwrap()
}

/// S -> a S | a, the start symbol is not nullable.
pub fn non_nullable_start_grammar() -> Grammar {
    Grammar::build([production!(S => "a" S), production!(S => "a")], "S").unwrap()
}

/// S -> S a | ε
pub fn left_recursive_grammar() -> Grammar {
    Grammar::build([production!(S => S "a"), production!(S =>)], "S").unwrap()
}

/// `count` copies of the tokens in `input`.
pub fn repeated(input: &str, count: usize) -> Vec<Symbol> {
    tokens(&vec![input; count].join(" "))
}

/// Catalan number C(n).
pub fn catalan(n: u64) -> u64 {
    (0..n).fold(1, |c, i| c * 2 * (2 * i + 1) / (i + 2))
}
