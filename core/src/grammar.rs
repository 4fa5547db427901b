use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use log::debug;

use crate::{
    sets::DerivedSets,
    symbol::{EOS_ID, START_ID},
    GrammarError, GrammarResult, Production, Rule, RuleId, Symbol, SymbolId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A grammar
///
/// The grammar is augmented with a rule `<start> -> S` (rule #0), where S is
/// the start symbol given by the caller. NULLABLE, FIRST and FOLLOW sets are
/// computed once when the grammar is built; the grammar can not be modified
/// afterwards.
///
/// # Example
///
/// For the following grammar :
///
/// ```grammar
/// 1. S := a S b
/// 2. S := ε
/// ```
///
/// ```
/// use twinparse_core::{production, Grammar};
///
/// let grammar = Grammar::build(
///     [production!(S => "a" S "b"), production!(S =>)],
///     "S",
/// ).unwrap();
///
/// assert_eq!(grammar.rules().len(), 3);
/// ```
pub struct Grammar {
    symbols: Vec<Symbol>,
    index: HashMap<Symbol, SymbolId>,
    rules: Vec<Rule>,
    start: SymbolId,
    by_lhs: Vec<Vec<RuleId>>,
    sets: DerivedSets,
}

/// Symbol table under construction.
#[derive(Default)]
struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
}

impl SymbolTable {
    fn new() -> Self {
        let mut table = Self::default();
        table.push(Symbol::eos());
        table.push(Symbol::start());
        table
    }

    fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = self.symbols.len();
        self.by_name.insert(symbol.name().to_string(), id);
        self.symbols.push(symbol);
        id
    }

    fn get(&self, symbol: &Symbol) -> Option<SymbolId> {
        self.by_name
            .get(symbol.name())
            .copied()
            .filter(|&id| &self.symbols[id] == symbol)
    }

    /// Declares the symbol if it does not exist yet.
    fn declare(&mut self, symbol: &Symbol) -> GrammarResult<SymbolId> {
        if symbol.is_reserved() {
            return Err(GrammarError::ReservedSymbol(symbol.name().to_string()));
        }

        match self.by_name.get(symbol.name()) {
            Some(&id) if &self.symbols[id] == symbol => Ok(id),
            Some(_) => Err(GrammarError::DuplicatedSymbol(symbol.name().to_string())),
            None => Ok(self.push(symbol.clone())),
        }
    }
}

impl Grammar {
    /// Builds a grammar from its productions and the name of its start symbol.
    ///
    /// Terminals are declared by their use in a right-hand side. Non-terminals
    /// are declared by being the left-hand side of a production.
    pub fn build<I>(productions: I, start: &str) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = Production>,
    {
        Self::from_parts(std::iter::empty(), productions, start)
    }

    /// Returns a builder declaring symbols ahead of rules.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    fn from_parts<T, I>(terminals: T, productions: I, start: &str) -> GrammarResult<Self>
    where
        T: IntoIterator<Item = Symbol>,
        I: IntoIterator<Item = Production>,
    {
        let productions: Vec<Production> = productions.into_iter().collect();
        let mut table = SymbolTable::new();

        // Non-terminals are declared by the left-hand sides.
        let lhs = productions
            .iter()
            .map(|production| {
                if production.lhs.is_terminal() {
                    Err(GrammarError::TerminalOnLeftHandSide(
                        production.lhs.name().to_string(),
                    ))
                } else {
                    table.declare(&production.lhs)
                }
            })
            .collect::<GrammarResult<Vec<_>>>()?;

        for terminal in terminals {
            table.declare(&terminal)?;
        }

        let start = table
            .get(&Symbol::nterm(start))
            .ok_or_else(|| GrammarError::NoSuchStart(start.to_string()))?;

        let mut rules = vec![Rule {
            id: 0,
            lhs: START_ID,
            rhs: vec![start],
        }];

        for (production, lhs) in productions.iter().zip(lhs) {
            let rhs = production
                .rhs
                .iter()
                .map(|sym| {
                    if sym.is_terminal() {
                        table.declare(sym)
                    } else {
                        table
                            .get(sym)
                            .ok_or_else(|| GrammarError::UndeclaredSymbol(sym.name().to_string()))
                    }
                })
                .collect::<GrammarResult<Vec<_>>>()?;

            rules.push(Rule {
                id: rules.len(),
                lhs,
                rhs,
            });
        }

        let SymbolTable { symbols, .. } = table;
        let index = symbols
            .iter()
            .cloned()
            .enumerate()
            .map(|(id, sym)| (sym, id))
            .collect();

        let mut by_lhs = vec![Vec::new(); symbols.len()];
        for rule in rules.iter() {
            by_lhs[rule.lhs].push(rule.id);
        }

        let terminal: Vec<bool> = symbols.iter().map(Symbol::is_terminal).collect();
        let sets = DerivedSets::compute(&terminal, &rules);

        debug!(
            "grammar built with {} symbols and {} rules, start={}",
            symbols.len(),
            rules.len(),
            symbols[start]
        );

        Ok(Self {
            symbols,
            index,
            rules,
            start,
            by_lhs,
            sets,
        })
    }
}

impl Grammar {
    /// Returns the start symbol chosen by the caller.
    pub fn start(&self) -> &Symbol {
        &self.symbols[self.start]
    }

    pub fn start_id(&self) -> SymbolId {
        self.start
    }

    /// Returns the end-of-stream symbol (<eos>) of the grammar.
    pub fn eos(&self) -> &Symbol {
        &self.symbols[EOS_ID]
    }

    /// Returns the symbol behind the ID
    ///
    /// # Panics
    /// Panics if the id does not belong to this grammar.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symbol_id(&self, symbol: &Symbol) -> Option<SymbolId> {
        self.index.get(symbol).copied()
    }

    /// Resolves a token into one of the grammar's terminals.
    ///
    /// The end-of-stream marker is not a valid token.
    pub fn terminal_id(&self, token: &Symbol) -> Option<SymbolId> {
        self.symbol_id(token)
            .filter(|&id| id != EOS_ID && self.is_terminal(id))
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.symbols[id].is_terminal()
    }

    /// Iterate over the terminals declared by the caller.
    pub fn terminals(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|sym| sym.is_terminal() && !sym.is_eos())
    }

    /// Iterate over the non-terminals declared by the caller.
    pub fn nonterminals(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|sym| !sym.is_terminal() && !sym.is_start())
    }

    pub(crate) fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// All the rules, the augmented rule #0 included.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// # Panics
    /// Panics if the id does not belong to this grammar.
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    /// Iterate the rules behind a non-terminal.
    pub fn rules_of(&self, lhs: SymbolId) -> impl Iterator<Item = &Rule> + '_ {
        self.by_lhs[lhs].iter().map(|&id| &self.rules[id])
    }

    /// Returns the rule as the caller wrote it.
    pub fn production(&self, id: RuleId) -> Production {
        let rule = self.rule(id);
        Production::new(
            self.symbol(rule.lhs).clone(),
            rule.rhs.iter().map(|&sym| self.symbol(sym).clone()),
        )
    }

    pub(crate) fn sets(&self) -> &DerivedSets {
        &self.sets
    }

    /// Whether the symbol can derive the empty sequence.
    pub fn nullable(&self, symbol: &Symbol) -> bool {
        self.symbol_id(symbol)
            .map(|id| self.sets.is_nullable(id))
            .unwrap_or(false)
    }

    /// Terminals that can begin a derivation from the symbol.
    pub fn first(&self, symbol: &Symbol) -> BTreeSet<Symbol> {
        self.symbol_id(symbol)
            .map(|id| self.to_symbols(self.sets.first(id)))
            .unwrap_or_default()
    }

    /// Terminals that can immediately follow the non-terminal.
    ///
    /// FOLLOW of the start symbol contains <eos>.
    pub fn follow(&self, symbol: &Symbol) -> BTreeSet<Symbol> {
        self.symbol_id(symbol)
            .map(|id| self.to_symbols(self.sets.follow(id)))
            .unwrap_or_default()
    }

    /// FIRST of a sequence of symbols, and whether the sequence is nullable.
    ///
    /// Unknown symbols derive nothing.
    pub fn first_of_sequence(&self, seq: &[Symbol]) -> (BTreeSet<Symbol>, bool) {
        match seq
            .iter()
            .map(|sym| self.symbol_id(sym))
            .collect::<Option<Vec<_>>>()
        {
            Some(ids) => {
                let (set, nullable) = self.sets.first_of_sequence(&ids);
                (self.to_symbols(&set), nullable)
            }
            None => (BTreeSet::new(), false),
        }
    }

    fn to_symbols(&self, ids: &BTreeSet<SymbolId>) -> BTreeSet<Symbol> {
        ids.iter().map(|&id| self.symbol(id).clone()).collect()
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.rules
                .iter()
                .map(|rule| format!("({}) {}", rule.id, self.production(rule.id)))
                .join("\n")
        )
    }
}

/// Builds a grammar by declaring every symbol before the rules using them.
///
/// # Example
///
/// ```
/// use twinparse_core::{Grammar, GrammarResult};
///
/// fn grammar() -> GrammarResult<Grammar> {
///     let mut builder = Grammar::builder();
///
///     builder
///         .add_terminal_symbol("0")?
///         .add_terminal_symbol("1")?
///         .add_terminal_symbol("+")?
///         .add_non_terminal_symbol("E")?
///         .add_non_terminal_symbol("B")?;
///
///     builder
///         .add_rule("E", ["E", "+", "B"])?
///         .add_rule("E", ["B"])?
///         .add_rule("B", ["0"])?
///         .add_rule("B", ["1"])?;
///
///     builder.build("E")
/// }
///
/// assert_eq!(grammar().unwrap().rules().len(), 5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct GrammarBuilder {
    symbols: Vec<Symbol>,
    productions: Vec<Production>,
}

impl GrammarBuilder {
    fn declare(&mut self, symbol: Symbol) -> GrammarResult<&mut Self> {
        if symbol.is_reserved() {
            Err(GrammarError::ReservedSymbol(symbol.name().to_string()))
        } else if self.try_get_symbol(symbol.name()).is_some() {
            Err(GrammarError::DuplicatedSymbol(symbol.name().to_string()))
        } else {
            self.symbols.push(symbol);
            Ok(self)
        }
    }

    /// Add a terminal symbol in the grammar.
    ///
    /// Returns an error if a symbol with the same id already exists.
    pub fn add_terminal_symbol(&mut self, id: &str) -> GrammarResult<&mut Self> {
        self.declare(Symbol::term(id))
    }

    /// Add a non-terminal symbol in the grammar.
    ///
    /// Returns an error if a symbol with the same id already exists.
    pub fn add_non_terminal_symbol(&mut self, id: &str) -> GrammarResult<&mut Self> {
        self.declare(Symbol::nterm(id))
    }

    /// Get a declared symbol based on its id.
    pub fn try_get_symbol(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|sym| sym.name() == id)
    }

    /// Add a new rule, an empty right-hand side being an epsilon rule.
    ///
    /// Returns an error if a symbol used in the rule has not been declared.
    pub fn add_rule<I, S>(&mut self, lhs: &str, rhs: I) -> GrammarResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lhs = self
            .try_get_symbol(lhs)
            .cloned()
            .ok_or_else(|| GrammarError::UndeclaredSymbol(lhs.to_string()))?;

        if lhs.is_terminal() {
            return Err(GrammarError::TerminalOnLeftHandSide(lhs.name().to_string()));
        }

        let rhs = rhs
            .into_iter()
            .map(|id| {
                self.try_get_symbol(id.as_ref())
                    .cloned()
                    .ok_or_else(|| GrammarError::UndeclaredSymbol(id.as_ref().to_string()))
            })
            .collect::<GrammarResult<Vec<_>>>()?;

        self.productions.push(Production { lhs, rhs });
        Ok(self)
    }

    /// Builds the grammar.
    ///
    /// A declared non-terminal used in a rule without producing anything is
    /// reported as undeclared.
    pub fn build(&self, start: &str) -> GrammarResult<Grammar> {
        Grammar::from_parts(
            self.symbols.iter().filter(|sym| sym.is_terminal()).cloned(),
            self.productions.iter().cloned(),
            start,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        fixtures::{anbn_grammar, expr_grammar},
        production, Grammar, GrammarError, Production, Symbol,
    };

    #[test]
    fn test_001_rules_are_augmented() {
        let g = anbn_grammar();

        assert_eq!(g.start(), &Symbol::nterm("S"));
        assert_eq!(g.production(0), Production::new(Symbol::start(), [Symbol::nterm("S")]));
        assert_eq!(g.production(1), production!(S => "a" S "b"));
        assert_eq!(g.production(2), production!(S =>));
        assert_eq!(g.rules_of(g.start_id()).count(), 2);

        let a = g.terminal_id(&Symbol::term("a")).unwrap();
        assert!(g.rule(1).contains(a));
        assert!(g.rule(1).contains(g.start_id()));
        assert!(!g.rule(1).is_epsilon());
        assert!(!g.rule(2).contains(a));
        assert!(g.rule(2).is_epsilon());
    }

    #[test]
    fn test_002_symbols() {
        let g = expr_grammar();

        assert_eq!(
            g.terminals().map(Symbol::name).collect::<Vec<_>>(),
            vec!["+", "*", "(", ")", "id"]
        );
        assert_eq!(
            g.nonterminals().map(Symbol::name).collect::<Vec<_>>(),
            vec!["E", "T", "F"]
        );
        assert!(g.terminal_id(&Symbol::term("id")).is_some());
        assert!(g.terminal_id(&Symbol::nterm("E")).is_none());
        assert!(g.terminal_id(&Symbol::eos()).is_none());
        assert!(g.terminal_id(&Symbol::term("-")).is_none());
    }

    #[test]
    fn test_003_undeclared_symbol() {
        let err = Grammar::build([production!(S => "a" A)], "S").unwrap_err();
        assert_eq!(err, GrammarError::UndeclaredSymbol("A".into()));
    }

    #[test]
    fn test_004_no_such_start() {
        let err = Grammar::build([production!(S => "a")], "T").unwrap_err();
        assert_eq!(err, GrammarError::NoSuchStart("T".into()));

        let err = Grammar::build([], "S").unwrap_err();
        assert_eq!(err, GrammarError::NoSuchStart("S".into()));
    }

    #[test]
    fn test_005_symbol_kind_clash() {
        let err = Grammar::build([production!(S => "S")], "S").unwrap_err();
        assert_eq!(err, GrammarError::DuplicatedSymbol("S".into()));
    }

    #[test]
    fn test_006_reserved_symbols() {
        let err = Grammar::build([production!(S => "<eos>")], "S").unwrap_err();
        assert_eq!(err, GrammarError::ReservedSymbol("<eos>".into()));

        let err = Grammar::builder().add_non_terminal_symbol("<start>").unwrap_err();
        assert_eq!(err, GrammarError::ReservedSymbol("<start>".into()));
    }

    #[test]
    fn test_007_builder() {
        let mut builder = Grammar::builder();

        builder
            .add_terminal_symbol("a")
            .unwrap()
            .add_non_terminal_symbol("S")
            .unwrap();

        assert_eq!(
            builder.add_terminal_symbol("a").unwrap_err(),
            GrammarError::DuplicatedSymbol("a".into())
        );
        assert_eq!(
            builder.add_rule("S", ["a", "b"]).unwrap_err(),
            GrammarError::UndeclaredSymbol("b".into())
        );
        assert_eq!(
            builder.add_rule("a", ["S"]).unwrap_err(),
            GrammarError::TerminalOnLeftHandSide("a".into())
        );

        builder
            .add_rule("S", ["a", "S"])
            .unwrap()
            .add_rule("S", Vec::<&str>::new())
            .unwrap();

        let g = builder.build("S").unwrap();
        assert_eq!(g.production(1), production!(S => "a" S));
        assert!(g.nullable(&Symbol::nterm("S")));
    }

    #[test]
    fn test_008_builder_declared_non_terminal_without_rule() {
        let mut builder = Grammar::builder();

        builder
            .add_terminal_symbol("a")
            .unwrap()
            .add_non_terminal_symbol("S")
            .unwrap()
            .add_non_terminal_symbol("A")
            .unwrap()
            .add_rule("S", ["a", "A"])
            .unwrap();

        assert_eq!(
            builder.build("S").unwrap_err(),
            GrammarError::UndeclaredSymbol("A".into())
        );
    }

    #[test]
    fn test_009_display() {
        let g = anbn_grammar();
        assert_eq!(g.to_string(), "(0) <start> -> S\n(1) S -> a S b\n(2) S -> ε");
    }
}
