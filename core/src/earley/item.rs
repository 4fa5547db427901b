use std::fmt;

use crate::{Grammar, RuleId, SymbolId};

/// An Earley item.
///
/// # Example
/// [S -> a • S b, 0]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EarleyItem {
    pub rule: RuleId,
    pub dot: usize,
    /// Column the item was predicted in.
    pub origin: usize,
}

impl EarleyItem {
    /// Creates an item with the dot at the beginning of the rule.
    pub fn new(rule: RuleId, origin: usize) -> Self {
        Self {
            rule,
            dot: 0,
            origin,
        }
    }

    /// Returns the symbol after the dot.
    /// If A -> w •, then returns None.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<SymbolId> {
        grammar.rule(self.rule).rhs.get(self.dot).copied()
    }

    /// Check if we reached the end of the rule.
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.rule(self.rule).rhs.len()
    }

    /// (A -> α • X β).advance() -> (A -> α X • β)
    pub fn advance(&self) -> Self {
        Self {
            dot: self.dot + 1,
            ..*self
        }
    }

    pub fn display<'g>(&self, grammar: &'g Grammar) -> ItemDisplay<'g> {
        ItemDisplay {
            item: *self,
            grammar,
        }
    }
}

pub struct ItemDisplay<'g> {
    item: EarleyItem,
    grammar: &'g Grammar,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.grammar.rule(self.item.rule);

        write!(f, "[({}) {} ->", rule.id, self.grammar.symbol(rule.lhs))?;
        for (pos, &sym) in rule.rhs.iter().enumerate() {
            if pos == self.item.dot {
                write!(f, " •")?;
            }
            write!(f, " {}", self.grammar.symbol(sym))?;
        }
        if self.item.dot >= rule.rhs.len() {
            write!(f, " •")?;
        }
        write!(f, ", {}]", self.item.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::EarleyItem;
    use crate::fixtures::anbn_grammar;

    #[test]
    fn test_item_progress() {
        let g = anbn_grammar();

        let item = EarleyItem::new(1, 0);
        assert!(!item.is_complete(&g));
        assert_eq!(item.display(&g).to_string(), "[(1) S -> • a S b, 0]");

        let item = item.advance().advance().advance();
        assert!(item.is_complete(&g));
        assert_eq!(item.next_symbol(&g), None);
        assert_eq!(item.display(&g).to_string(), "[(1) S -> a S b •, 0]");

        assert_eq!(EarleyItem::new(2, 3).display(&g).to_string(), "[(2) S -> •, 3]");
    }
}
