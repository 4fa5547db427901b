use crate::{Rejection, RuleId, Symbol};

/// Index of a node in a forest arena.
pub type NodeId = usize;

/// The result of a parse.
///
/// A rejection is the expected answer for an input outside of the language,
/// it is not an error of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    Accepted(T),
    Rejected(Rejection),
}

impl<T> ParseOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ParseOutcome::Accepted(_))
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            ParseOutcome::Accepted(value) => Some(value),
            ParseOutcome::Rejected(_) => None,
        }
    }

    pub fn as_accepted(&self) -> Option<&T> {
        match self {
            ParseOutcome::Accepted(value) => Some(value),
            ParseOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ParseOutcome::Accepted(_) => None,
            ParseOutcome::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ParseOutcome<U> {
        match self {
            ParseOutcome::Accepted(value) => ParseOutcome::Accepted(f(value)),
            ParseOutcome::Rejected(rejection) => ParseOutcome::Rejected(rejection),
        }
    }

    pub fn into_result(self) -> Result<T, Rejection> {
        match self {
            ParseOutcome::Accepted(value) => Ok(value),
            ParseOutcome::Rejected(rejection) => Err(rejection),
        }
    }
}

/// A single derivation.
///
/// Cloning, dropping and rendering walk the tree with an explicit stack, so
/// a tree as deep as the input is long is handled like any other.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum Tree {
    Leaf {
        terminal: Symbol,
        position: usize,
    },
    Node {
        symbol: Symbol,
        rule: RuleId,
        children: Vec<Tree>,
    },
}

impl Tree {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Tree::Leaf { terminal, .. } => terminal,
            Tree::Node { symbol, .. } => symbol,
        }
    }

    /// The terminals covered by the tree, in input order.
    pub fn leaves(&self) -> Vec<&Symbol> {
        let mut leaves = vec![];
        let mut stack = vec![self];

        while let Some(tree) = stack.pop() {
            match tree {
                Tree::Leaf { terminal, .. } => leaves.push(terminal),
                Tree::Node { children, .. } => stack.extend(children.iter().rev()),
            }
        }

        leaves
    }

    /// Canonical rendering, `(S a (S) b)`.
    pub fn flatten_to_string(&self) -> String {
        enum Step<'a> {
            Tree(&'a Tree),
            Space,
            Close,
        }

        let mut buf = String::new();
        let mut steps = vec![Step::Tree(self)];

        while let Some(step) = steps.pop() {
            match step {
                Step::Tree(Tree::Leaf { terminal, .. }) => buf.push_str(terminal.name()),
                Step::Tree(Tree::Node {
                    symbol, children, ..
                }) => {
                    buf.push('(');
                    buf.push_str(symbol.name());
                    steps.push(Step::Close);
                    for child in children.iter().rev() {
                        steps.push(Step::Tree(child));
                        steps.push(Step::Space);
                    }
                }
                Step::Space => buf.push(' '),
                Step::Close => buf.push(')'),
            }
        }

        buf
    }
}

impl Clone for Tree {
    fn clone(&self) -> Self {
        enum Step<'a> {
            Tree(&'a Tree),
            Rebuild(&'a Symbol, RuleId, usize),
        }

        let mut steps = vec![Step::Tree(self)];
        let mut built: Vec<Tree> = vec![];

        while let Some(step) = steps.pop() {
            match step {
                Step::Tree(Tree::Leaf { terminal, position }) => built.push(Tree::Leaf {
                    terminal: terminal.clone(),
                    position: *position,
                }),
                Step::Tree(Tree::Node {
                    symbol,
                    rule,
                    children,
                }) => {
                    steps.push(Step::Rebuild(symbol, *rule, children.len()));
                    steps.extend(children.iter().rev().map(Step::Tree));
                }
                Step::Rebuild(symbol, rule, len) => {
                    let children = built.split_off(built.len() - len);
                    built.push(Tree::Node {
                        symbol: symbol.clone(),
                        rule,
                        children,
                    });
                }
            }
        }

        // The last rebuild step is the root's.
        built.swap_remove(0)
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let Tree::Node { children, .. } = self else {
            return;
        };

        let mut stack = std::mem::take(children);
        while let Some(mut tree) = stack.pop() {
            if let Tree::Node { children, .. } = &mut tree {
                stack.append(children);
            }
        }
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.flatten_to_string())
    }
}

/// One way to derive a forest node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub rule: RuleId,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        terminal: Symbol,
        position: usize,
    },
    /// A symbol derived over the tokens `start..end`.
    ///
    /// Each alternative is a distinct derivation of the same span.
    Symbol {
        symbol: Symbol,
        start: usize,
        end: usize,
        alternatives: Vec<Packed>,
    },
}

impl Node {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Node::Leaf { terminal, .. } => terminal,
            Node::Symbol { symbol, .. } => symbol,
        }
    }

    pub fn alternatives(&self) -> &[Packed] {
        match self {
            Node::Leaf { .. } => &[],
            Node::Symbol { alternatives, .. } => alternatives,
        }
    }
}

/// The alternatives left once those closing a cycle are dropped.
struct Acyclic {
    /// Indices of the kept alternatives of each node.
    kept: Vec<Vec<usize>>,
    /// Nodes reachable from the root, each after its children.
    order: Vec<NodeId>,
}

/// A shared packed parse forest.
///
/// Nodes live in an arena and reference their children by index, so common
/// subtrees are stored once. Cyclic grammars (`A -> A`) produce nodes which
/// are their own descendants.
///
/// Trees are read out of the forest after dropping every alternative which
/// leads back to a node being derived, in a depth-first walk from the root.
/// What remains is acyclic, so counts are finite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forest {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Forest {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// True if the input has more than one derivation.
    ///
    /// Alternatives going through a cycle do not count as derivations.
    pub fn is_ambiguous(&self) -> bool {
        self.count_trees() > 1
    }

    fn acyclic(&self) -> Acyclic {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut kept = vec![Vec::new(); self.nodes.len()];
        let mut order = vec![];

        // (node, alternative, child) cursors
        let mut stack = vec![(self.root, 0, 0)];
        marks[self.root] = Mark::Open;

        while let Some(top) = stack.last_mut() {
            let (id, alt, child) = *top;

            let Some(packed) = self.nodes[id].alternatives().get(alt) else {
                marks[id] = Mark::Done;
                order.push(id);
                stack.pop();
                continue;
            };

            let Some(&next) = packed.children.get(child) else {
                kept[id].push(alt);
                *top = (id, alt + 1, 0);
                continue;
            };

            match marks[next] {
                // Back to a node being derived.
                Mark::Open => *top = (id, alt + 1, 0),
                Mark::Done => *top = (id, alt, child + 1),
                Mark::New => {
                    *top = (id, alt, child + 1);
                    marks[next] = Mark::Open;
                    stack.push((next, 0, 0));
                }
            }
        }

        Acyclic { kept, order }
    }

    /// Number of derivations of each node, saturating.
    fn counts(&self, acyclic: &Acyclic) -> Vec<usize> {
        let mut counts = vec![0usize; self.nodes.len()];

        for &id in acyclic.order.iter() {
            let count = match &self.nodes[id] {
                Node::Leaf { .. } => 1,
                Node::Symbol { alternatives, .. } => acyclic.kept[id]
                    .iter()
                    .map(|&alt| {
                        alternatives[alt]
                            .children
                            .iter()
                            .fold(1usize, |product, &child| product.saturating_mul(counts[child]))
                    })
                    .fold(0usize, usize::saturating_add),
            };
            counts[id] = count;
        }

        counts
    }

    /// Number of distinct derivations.
    pub fn count_trees(&self) -> usize {
        let acyclic = self.acyclic();
        self.counts(&acyclic)[self.root]
    }

    /// Enumerates every derivation.
    ///
    /// The number of trees can grow exponentially with the input length,
    /// check [`Forest::count_trees`] first on large inputs.
    pub fn trees(&self) -> Vec<Tree> {
        let acyclic = self.acyclic();
        let mut trees: Vec<Vec<Tree>> = vec![vec![]; self.nodes.len()];

        for &id in acyclic.order.iter() {
            let derived = match &self.nodes[id] {
                Node::Leaf { terminal, position } => vec![Tree::Leaf {
                    terminal: terminal.clone(),
                    position: *position,
                }],
                Node::Symbol {
                    symbol,
                    alternatives,
                    ..
                } => {
                    let mut derived = vec![];

                    for &alt in acyclic.kept[id].iter() {
                        let packed = &alternatives[alt];

                        // Cartesian product of the children's derivations.
                        let mut combinations: Vec<Vec<Tree>> = vec![vec![]];
                        for &child in packed.children.iter() {
                            combinations = combinations
                                .into_iter()
                                .flat_map(|prefix| {
                                    trees[child].iter().map(move |tree| {
                                        let mut children = prefix.clone();
                                        children.push(tree.clone());
                                        children
                                    })
                                })
                                .collect();
                        }

                        derived.extend(combinations.into_iter().map(|children| Tree::Node {
                            symbol: symbol.clone(),
                            rule: packed.rule,
                            children,
                        }));
                    }

                    derived
                }
            };
            trees[id] = derived;
        }

        std::mem::take(&mut trees[self.root])
    }

    /// Returns the derivation if there is exactly one.
    pub fn single_tree(&self) -> Option<Tree> {
        let acyclic = self.acyclic();
        let counts = self.counts(&acyclic);

        if counts[self.root] != 1 {
            return None;
        }

        let mut stack = vec![Frame::new(self, &acyclic, &counts, self.root)?];

        while let Some(top) = stack.last_mut() {
            let Some(&child) = top.children.get(top.built.len()) else {
                let done = stack.pop()?;
                let tree = Tree::Node {
                    symbol: done.symbol.clone(),
                    rule: done.rule,
                    children: done.built,
                };

                match stack.last_mut() {
                    Some(parent) => parent.built.push(tree),
                    None => return Some(tree),
                }
                continue;
            };

            match &self.nodes[child] {
                Node::Leaf { terminal, position } => top.built.push(Tree::Leaf {
                    terminal: terminal.clone(),
                    position: *position,
                }),
                Node::Symbol { .. } => {
                    let next = Frame::new(self, &acyclic, &counts, child)?;
                    stack.push(next);
                }
            }
        }

        None
    }

    /// Canonical rendering.
    ///
    /// An unambiguous forest renders like its tree, `(S a (S) b)`. A node with
    /// several derivations separates them with `|`, `(E alt1 | alt2)`, and a
    /// node reached again through a cycle renders as `(E ...)`.
    pub fn flatten_to_string(&self) -> String {
        enum Step {
            Node(NodeId),
            Space,
            Bar,
            Close(NodeId),
        }

        let mut buf = String::new();
        let mut path = vec![false; self.nodes.len()];
        let mut steps = vec![Step::Node(self.root)];

        while let Some(step) = steps.pop() {
            match step {
                Step::Space => buf.push(' '),
                Step::Bar => buf.push_str(" |"),
                Step::Close(id) => {
                    path[id] = false;
                    buf.push(')');
                }
                Step::Node(id) => match &self.nodes[id] {
                    Node::Leaf { terminal, .. } => buf.push_str(terminal.name()),
                    Node::Symbol {
                        symbol,
                        alternatives,
                        ..
                    } => {
                        buf.push('(');
                        buf.push_str(symbol.name());

                        if path[id] {
                            buf.push_str(" ...)");
                            continue;
                        }

                        path[id] = true;
                        steps.push(Step::Close(id));
                        for (i, packed) in alternatives.iter().enumerate().rev() {
                            for &child in packed.children.iter().rev() {
                                steps.push(Step::Node(child));
                                steps.push(Step::Space);
                            }
                            if i > 0 {
                                steps.push(Step::Bar);
                            }
                        }
                    }
                },
            }
        }

        buf
    }
}

/// A node of the single derivation being rebuilt.
struct Frame<'a> {
    symbol: &'a Symbol,
    rule: RuleId,
    children: &'a [NodeId],
    built: Vec<Tree>,
}

impl<'a> Frame<'a> {
    /// Along a single derivation every node has exactly one alternative
    /// whose children all have a single derivation.
    fn new(forest: &'a Forest, acyclic: &Acyclic, counts: &[usize], id: NodeId) -> Option<Self> {
        let Node::Symbol {
            symbol,
            alternatives,
            ..
        } = &forest.nodes[id]
        else {
            return None;
        };

        let packed = acyclic.kept[id]
            .iter()
            .map(|&alt| &alternatives[alt])
            .find(|packed| packed.children.iter().all(|&child| counts[child] == 1))?;

        Some(Self {
            symbol,
            rule: packed.rule,
            children: &packed.children,
            built: vec![],
        })
    }
}

impl std::fmt::Display for Forest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.flatten_to_string())
    }
}
