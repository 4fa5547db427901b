use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use prettytable::Table as PtTable;

use crate::{
    error::{Conflict, ConstructionError, ConstructionResult, ExpectedSymbols},
    Grammar, Symbol, SymbolId,
};

use super::{
    lookahead::{display_lookahead, lookahead_symbols, FirstK, Lookahead},
    Action, Graph, LrConfig, StateId, Transition,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Row {
    actions: BTreeMap<Lookahead, Action>,
    goto: HashMap<SymbolId, StateId>,
}

impl Row {
    pub fn action(&self, lookahead: &[SymbolId]) -> Option<Action> {
        self.actions.get(lookahead).copied()
    }

    pub fn goto(&self, symbol: SymbolId) -> Option<StateId> {
        self.goto.get(&symbol).copied()
    }

    /// Sets the action of a cell, two different actions in the same cell
    /// being a conflict.
    fn insert(
        &mut self,
        state: StateId,
        lookahead: Lookahead,
        action: Action,
        grammar: &Grammar,
        k: usize,
    ) -> ConstructionResult<()> {
        if let Some(&existing) = self.actions.get(&lookahead) {
            if existing != action {
                return Err(ConstructionError::Conflict(Conflict::new(
                    state,
                    lookahead_symbols(grammar, k, &lookahead),
                    [existing, action],
                )));
            }
        }

        self.actions.insert(lookahead, action);
        Ok(())
    }

    fn from_transition(
        transition: Transition<'_>,
        grammar: &Grammar,
        first: &FirstK,
    ) -> ConstructionResult<Self> {
        let state = transition.from.id;
        let k = first.k();
        let mut row = Row::default();

        let mut shifts = HashMap::<SymbolId, StateId>::new();

        for (sym, set) in transition.edges.iter() {
            if grammar.is_terminal(*sym) {
                shifts.insert(*sym, set.id);
            } else {
                row.goto.insert(*sym, set.id);
            }
        }

        for item in transition.from.iter() {
            match item.symbol(grammar) {
                None => {
                    let action = if item.rule == 0 {
                        Action::Accept
                    } else {
                        Action::Reduce(item.rule)
                    };
                    row.insert(state, item.lookahead.clone(), action, grammar, k)?;
                }
                Some(sym) if grammar.is_terminal(sym) => {
                    let Some(&to) = shifts.get(&sym) else {
                        continue;
                    };

                    // Shift on every string the rest of the item can begin with.
                    for lookahead in first.of_sequence(item.remaining(grammar), &item.lookahead) {
                        row.insert(state, lookahead, Action::Shift(to), grammar, k)?;
                    }
                }
                Some(_) => {}
            }
        }

        Ok(row)
    }
}

/// The action and goto tables of a canonical LR(k) parser.
///
/// Actions are keyed by lookahead strings of at most k terminals, a shorter
/// string meaning the input ends after it.
#[derive(PartialEq, Eq)]
pub struct LrTable<'g> {
    grammar: &'g Grammar,
    lookahead: usize,
    rows: Vec<Row>,
}

impl std::fmt::Debug for LrTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::fmt::Display for LrTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = PtTable::new();

        let lookaheads: BTreeSet<&Lookahead> =
            self.rows.iter().flat_map(|row| row.actions.keys()).collect();
        let nonterminals: Vec<SymbolId> = (0..self.grammar.symbol_count())
            .filter(|&id| !self.grammar.is_terminal(id) && !self.grammar.symbol(id).is_start())
            .collect();

        table.add_row(
            ["#".to_string()]
                .into_iter()
                .chain(
                    lookaheads
                        .iter()
                        .map(|la| display_lookahead(self.grammar, self.lookahead, la)),
                )
                .chain(
                    nonterminals
                        .iter()
                        .map(|&sym| self.grammar.symbol(sym).to_string()),
                )
                .collect(),
        );

        for (id, row) in self.rows.iter().enumerate() {
            table.add_row(
                [id.to_string()]
                    .into_iter()
                    .chain(lookaheads.iter().map(|la| {
                        row.action(la).map(|a| a.to_string()).unwrap_or_default()
                    }))
                    .chain(nonterminals.iter().map(|&sym| {
                        row.goto(sym).map(|to| to.to_string()).unwrap_or_default()
                    }))
                    .collect(),
            );
        }

        write!(f, "{}", table)
    }
}

impl<'g> LrTable<'g> {
    /// Build an LR table from a grammar.
    ///
    /// Fails on the first conflicting cell found.
    pub fn build(grammar: &'g Grammar, config: &LrConfig) -> ConstructionResult<Self> {
        if config.lookahead == 0 {
            return Err(ConstructionError::UnsupportedLookahead(config.lookahead));
        }

        let first = FirstK::compute(grammar, config.lookahead);

        let mut graph = Graph::new(grammar, &first);
        graph.build();

        let rows = graph
            .iter_transitions()
            .map(|t| Row::from_transition(t, grammar, &first))
            .collect::<ConstructionResult<Vec<_>>>()?;

        debug!("LR({}) table holds {} rows", config.lookahead, rows.len());

        Ok(Self {
            grammar,
            lookahead: config.lookahead,
            rows,
        })
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The number of lookahead tokens.
    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// The number of states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn action(&self, state: StateId, lookahead: &[SymbolId]) -> Option<Action> {
        self.rows.get(state).and_then(|row| row.action(lookahead))
    }

    pub fn goto(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        self.rows.get(state).and_then(|row| row.goto(symbol))
    }

    /// The terminals a state has an action for, <eos> standing for the end of input.
    pub fn expected(&self, state: StateId) -> ExpectedSymbols {
        self.rows
            .get(state)
            .into_iter()
            .flat_map(|row| row.actions.keys())
            .map(|la| match la.first() {
                Some(&sym) => self.grammar.symbol(sym).clone(),
                None => Symbol::eos(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::LrTable;
    use crate::{
        fixtures::{
            ambiguous_expr_grammar, anbn_grammar, dangling_else_grammar, expr_grammar,
            lr2_grammar, reduce_reduce_grammar,
        },
        lr::{Action, LrConfig},
        ConflictKind, ConstructionError, Symbol,
    };

    #[test]
    fn test_001_anbn_table() {
        let g = anbn_grammar();
        let table = LrTable::build(&g, &LrConfig::default()).expect("cannot build table");

        let a = g.symbol_id(&Symbol::term("a")).unwrap();
        let b = g.symbol_id(&Symbol::term("b")).unwrap();
        let s = g.symbol_id(&Symbol::nterm("S")).unwrap();

        assert_eq!(table.len(), 8);
        assert_eq!(table.lookahead(), 1);
        assert_eq!(table.action(0, &[]), Some(Action::Reduce(2)));
        assert_eq!(table.action(0, &[a]), Some(Action::Shift(2)));
        assert_eq!(table.action(0, &[b]), None);
        assert_eq!(table.action(1, &[]), Some(Action::Accept));
        assert_eq!(table.goto(0, s), Some(1));
        assert_eq!(table.expected(0).to_string(), "<eos>, a");
    }

    #[test]
    fn test_002_display() {
        let g = anbn_grammar();
        let table = LrTable::build(&g, &LrConfig::default()).expect("cannot build table");
        let rendered = table.to_string();

        assert!(rendered.contains("acc"));
        assert!(rendered.contains("s2"));
        assert!(rendered.contains("r2"));
        assert_eq!(rendered.lines().filter(|l| l.starts_with('|')).count(), 9);
    }

    #[test]
    fn test_003_expressions_are_lr1() {
        let g = expr_grammar();
        assert!(LrTable::build(&g, &LrConfig::new(1)).is_ok());
        assert!(LrTable::build(&g, &LrConfig::new(2)).is_ok());
    }

    #[test]
    fn test_004_dangling_else() {
        let g = dangling_else_grammar();

        for k in [1, 2, 3] {
            let err = LrTable::build(&g, &LrConfig::new(k)).expect_err("the grammar is ambiguous");
            let conflict = err.conflict().expect("expecting a conflict");

            assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
            assert_eq!(conflict.lookahead.first(), Some(&Symbol::term("else")));
        }
    }

    #[test]
    fn test_005_ambiguous_expressions() {
        let g = ambiguous_expr_grammar();
        let err = LrTable::build(&g, &LrConfig::default()).expect_err("the grammar is ambiguous");

        assert_eq!(err.conflict().map(|c| c.kind), Some(ConflictKind::ShiftReduce));
    }

    #[test]
    fn test_006_reduce_reduce() {
        let g = reduce_reduce_grammar();
        let err = LrTable::build(&g, &LrConfig::default()).expect_err("the grammar is ambiguous");
        let conflict = err.conflict().expect("expecting a conflict");

        assert_eq!(conflict.kind, ConflictKind::ReduceReduce);
        assert_eq!(conflict.lookahead, vec![Symbol::eos()]);
    }

    #[test]
    fn test_007_lr2_grammar() {
        let g = lr2_grammar();

        let err = LrTable::build(&g, &LrConfig::new(1)).expect_err("the grammar is not LR(1)");
        let conflict = err.conflict().expect("expecting a conflict");
        assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
        assert_eq!(conflict.lookahead, vec![Symbol::term("b")]);

        assert!(LrTable::build(&g, &LrConfig::new(2)).is_ok());
    }

    #[test]
    fn test_008_no_lookahead() {
        let g = anbn_grammar();

        assert!(matches!(
            LrTable::build(&g, &LrConfig::new(0)),
            Err(ConstructionError::UnsupportedLookahead(0))
        ));
    }
}
