use std::collections::{BTreeSet, HashMap, VecDeque};

use log::{debug, trace};

use crate::{Grammar, SymbolId};

use super::{
    item::{ItemSet, LrItem},
    lookahead::FirstK,
    StateId,
};

/// The canonical LR(k) automaton.
pub(crate) struct Graph<'g> {
    pub(super) grammar: &'g Grammar,
    pub(super) first: &'g FirstK,
    pub(super) sets: Vec<ItemSet>,
    pub(super) edges: Vec<(StateId, SymbolId, StateId)>,
    index: HashMap<BTreeSet<LrItem>, StateId>,
}

impl<'g> Graph<'g> {
    /// Starts from `<start> -> • S`, whose lookahead is the end of input.
    pub fn new(grammar: &'g Grammar, first: &'g FirstK) -> Self {
        let kernel = BTreeSet::from([LrItem::new(0, vec![])]);

        Self {
            grammar,
            first,
            sets: vec![ItemSet::from_kernel(0, kernel.clone())],
            edges: vec![],
            index: HashMap::from([(kernel, 0)]),
        }
    }

    /// Push a new set in the graph, if no set has the same kernel yet.
    ///
    /// Returns the id of the set and whether it was pushed.
    fn push(&mut self, kernel: BTreeSet<LrItem>) -> (StateId, bool) {
        if let Some(&id) = self.index.get(&kernel) {
            return (id, false);
        }

        let id = self.sets.len();
        self.index.insert(kernel.clone(), id);
        self.sets.push(ItemSet::from_kernel(id, kernel));
        (id, true)
    }

    pub fn build(&mut self) {
        let mut queue = VecDeque::from_iter([0]);
        let (grammar, first) = (self.grammar, self.first);

        while let Some(set_id) = queue.pop_front() {
            self.sets[set_id].close(grammar, first);
            trace!("{}", self.sets[set_id].display(grammar, first.k()));

            for (symbol, kernel) in self.sets[set_id].reachable_kernels(grammar) {
                let (to_id, pushed) = self.push(kernel);
                if pushed {
                    queue.push_back(to_id);
                }

                self.edges.push((set_id, symbol, to_id));
            }
        }

        debug!(
            "LR({}) automaton built, {} states and {} transitions",
            first.k(),
            self.sets.len(),
            self.edges.len()
        );
    }
}
