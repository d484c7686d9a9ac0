/*! The operator tree produced by the regex parser.

Nodes live in an arena owned by [`RegexTree`] and are identified by their
[`NodeId`]. Parent and children links are ids too, so re-parenting a node is
just an id rewrite. A node removed from the tree frees its slot in the arena;
using a freed id is a programming error and panics.
*/

/// Identifier of a node inside a [`RegexTree`].
pub type NodeId = usize;

const INITIAL_CHILDREN_CAPACITY: usize = 5;

/// The three unary closure operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureKind {
    /// `*`: zero or more.
    Star,
    /// `+`: one or more.
    Plus,
    /// `?`: zero or one.
    Optional,
}

impl ClosureKind {
    pub fn operator(self) -> char {
        match self {
            ClosureKind::Star => '*',
            ClosureKind::Plus => '+',
            ClosureKind::Optional => '?',
        }
    }
}

/// What a node of the tree stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `a|b`: matches any of its children.
    Alternation,
    /// `ab`: matches its children one after the other.
    Concatenation,
    /// A single character.
    Literal(char),
    /// Wraps exactly one child.
    Closure(ClosureKind),
    /// `[x-y]`: any character between `low` and `high`, both included.
    Range { low: char, high: char },
    /// `.`: any character.
    Wildcard,
    /// `\e`: the empty string.
    EmptyLiteral,
    /// `\s`: any whitespace character.
    AnyWhitespace,
}

impl NodeKind {
    /// Alternations and concatenations are the only kinds that group an
    /// arbitrary number of children.
    pub fn is_group(self) -> bool {
        matches!(self, NodeKind::Alternation | NodeKind::Concatenation)
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-allocated, single-rooted regex operator tree.
#[derive(Debug, Clone)]
pub struct RegexTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    live: usize,
}

impl RegexTree {
    /// Creates a tree consisting of a single root node of the given kind.
    pub fn new(root: NodeKind) -> Self {
        let mut tree = RegexTree { nodes: Vec::new(), root: 0, live: 0 };
        tree.root = tree.create(root);
        tree
    }

    /// Creates a new isolated node with no parent and no children.
    ///
    /// The node is not part of the tree until it is passed to
    /// [`RegexTree::add_child`].
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Some(Node {
            kind,
            parent: None,
            children: Vec::with_capacity(INITIAL_CHILDREN_CAPACITY),
        }));
        self.live += 1;
        self.nodes.len() - 1
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// # Panics
    ///
    /// If `child` already has a parent, or if it is `parent` itself.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        assert_ne!(parent, child, "node {} can't be its own child", child);
        assert!(
            self.node(child).parent.is_none() && child != self.root,
            "node {} is already attached to the tree",
            child
        );
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Replaces the last child of `parent` with a new closure node that wraps
    /// it, and returns the closure node.
    ///
    /// Returns `None` if `parent` has no children.
    pub fn wrap_last_child(
        &mut self,
        parent: NodeId,
        closure: ClosureKind,
    ) -> Option<NodeId> {
        let last = *self.node(parent).children.last()?;
        let wrapper = self.create(NodeKind::Closure(closure));

        self.node_mut(wrapper).children.push(last);
        self.node_mut(wrapper).parent = Some(parent);
        self.node_mut(last).parent = Some(wrapper);

        let children = &mut self.node_mut(parent).children;
        let slot = children.len() - 1;
        children[slot] = wrapper;

        Some(wrapper)
    }

    /// Detaches the subtree rooted at `id` from its parent and frees all of
    /// its nodes.
    ///
    /// Destroying the root leaves an empty tree, which only supports
    /// [`RegexTree::len`] and [`RegexTree::is_empty`].
    pub fn destroy(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes[id].take() {
                pending.extend(node.children);
                self.live -= 1;
            }
        }
    }

    /// Collapses every alternation or concatenation with exactly one child
    /// into that child, bottom-up.
    ///
    /// Running it on an already minimized tree changes nothing.
    pub fn minimize(&mut self) {
        // Reversed pre-order visits every node after all of its descendants.
        // The walk uses an explicit stack, so deeply nested patterns don't
        // exhaust the call stack.
        let mut order = Vec::with_capacity(self.live);
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            order.push(id);
            pending.extend_from_slice(&self.node(id).children);
        }

        for &id in order.iter().rev() {
            let node = self.node(id);
            if !(node.kind.is_group() && node.children.len() == 1) {
                continue;
            }

            let only_child = node.children[0];
            let parent = node.parent;

            self.node_mut(only_child).parent = parent;
            match parent {
                Some(parent) => {
                    let children = &mut self.node_mut(parent).children;
                    if let Some(slot) = children.iter_mut().find(|c| **c == id) {
                        *slot = only_child;
                    }
                }
                None => self.root = only_child,
            }

            self.nodes[id] = None;
            self.live -= 1;
        }
    }

    /// Follows parent links from `id` up to the topmost ancestor.
    pub fn topmost(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.node(id).parent {
            id = parent;
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Returns the last child of `id`, if any.
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    /// Number of live nodes in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id) {
            Some(Some(node)) => node,
            _ => panic!("node {} does not exist in the regex tree", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id) {
            Some(Some(node)) => node,
            _ => panic!("node {} does not exist in the regex tree", id),
        }
    }
}

#[cfg(feature = "ascii-tree")]
impl RegexTree {
    /// Returns a representation of the tree as an ASCII tree.
    pub fn ascii_tree(&self) -> ascii_tree::Tree {
        self.node_ascii_tree(self.root)
    }

    fn node_ascii_tree(&self, id: NodeId) -> ascii_tree::Tree {
        use ascii_tree::Tree::{Leaf, Node};

        let label = match self.kind(id) {
            NodeKind::Alternation => "alternation".to_owned(),
            NodeKind::Concatenation => "concatenation".to_owned(),
            NodeKind::Literal(c) => format!("{:?}", c),
            NodeKind::Closure(kind) => format!("closure {}", kind.operator()),
            NodeKind::Range { low, high } => format!("[{}-{}]", low, high),
            NodeKind::Wildcard => "any character".to_owned(),
            NodeKind::EmptyLiteral => "empty string".to_owned(),
            NodeKind::AnyWhitespace => "any whitespace".to_owned(),
        };

        let children = self.children(id);
        if children.is_empty() {
            Leaf(vec![label])
        } else {
            Node(
                label,
                children.iter().map(|&c| self.node_ascii_tree(c)).collect(),
            )
        }
    }
}
