use super::{graph::Graph, item::ItemSet};
use crate::SymbolId;

/// A state along with its outgoing edges.
pub(crate) struct Transition<'graph> {
    pub(super) from: &'graph ItemSet,
    pub(super) edges: Vec<(SymbolId, &'graph ItemSet)>,
}

impl Graph<'_> {
    pub fn iter_transitions(&self) -> impl Iterator<Item = Transition<'_>> {
        self.sets.iter().map(|set| Transition {
            from: set,
            edges: self
                .edges
                .iter()
                .filter(|(from, _, _)| set.id == *from)
                .map(|&(_, sym, to)| (sym, &self.sets[to]))
                .collect(),
        })
    }
}
