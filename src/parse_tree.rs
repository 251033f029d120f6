use std::fmt;

use crowbook_text_processing::escape;

use crate::grammar::EPSILON;

/// Handle to a node of a [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    label: char,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An ordered tree of symbols stored in an arena.
///
/// Children are owned by exactly one parent and kept in insertion order; the
/// parent link is a plain [`NodeId`]. The root is created with the tree and
/// cannot be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    pub fn new(root_label: char) -> Self {
        Self {
            nodes: vec![Node {
                label: root_label,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Creates a node, attaching it to `parent` when given.
    ///
    /// A fresh node can be neither present under `parent` nor one of its
    /// ancestors, so it is linked in without the checks of [`add_child`].
    ///
    /// [`add_child`]: ParseTree::add_child
    pub fn add_node(&mut self, label: char, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            label,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Makes `child` the last child of `parent`.
    ///
    /// Nothing happens if `child` already belongs to `parent`, or if `child`
    /// is `parent` or one of its ancestors. A child of another node is moved.
    /// Returns whether the tree changed.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.nodes[parent.0].children.contains(&child) || self.is_ancestor(child, parent) {
            return false;
        }

        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    /// Whether `ancestor` is `node` or lies on the path from `node` to the root.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    pub fn label(&self, id: NodeId) -> char {
        self.nodes[id.0].label
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Leaves reachable from the root, left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let children = self.children(id);
            if children.is_empty() {
                leaves.push(id);
            } else {
                stack.extend(children.iter().rev());
            }
        }
        leaves
    }

    /// Concatenated leaf labels without `ε`: the string the tree derives.
    pub fn frontier(&self) -> String {
        self.leaves()
            .into_iter()
            .map(|id| self.label(id))
            .filter(|&c| c != EPSILON)
            .collect()
    }

    /// Depth-first walk from the root without recursion, so trees of any
    /// depth can be rendered.
    fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(self.nodes.len() * 3);
        let mut stack = vec![Step::Enter(self.root())];
        while let Some(step) = stack.pop() {
            if let Step::Enter(id) = step {
                stack.push(Step::Leave(id));
                for (i, &c) in self.children(id).iter().enumerate().rev() {
                    stack.push(Step::Enter(c));
                    if i > 0 {
                        stack.push(Step::Between);
                    }
                }
            }
            steps.push(step);
        }
        steps
    }

    /// One node per line, children indented under their parent.
    pub fn to_plaintext(&self) -> String {
        let mut lines = Vec::new();
        let mut stack = vec![(self.root(), 0)];
        while let Some((id, depth)) = stack.pop() {
            lines.push(format!("{}{}", "  ".repeat(depth), self.label(id)));
            stack.extend(self.children(id).iter().rev().map(|&c| (c, depth + 1)));
        }
        lines.join("\n")
    }

    /// `{"label":"A","children":[{"label":"1","children":[]}]}`
    pub fn to_json(&self) -> String {
        let mut output = String::new();
        for step in self.steps() {
            match step {
                Step::Enter(id) => {
                    let label = serde_json::to_string(&self.label(id)).unwrap_or_default();
                    output.push_str("{\"label\":");
                    output.push_str(&label);
                    output.push_str(",\"children\":[");
                }
                Step::Between => output.push(','),
                Step::Leave(_) => output.push_str("]}"),
            }
        }
        output
    }

    /// qtree bracketing: `\Tree [.A 1 ]`.
    pub fn to_latex(&self) -> String {
        let mut output = String::from("\\Tree ");
        for step in self.steps() {
            match step {
                Step::Enter(id) => {
                    let label = self.label(id);
                    let label = if label == EPSILON {
                        "$\\epsilon$".to_string()
                    } else {
                        escape::tex(label.to_string()).to_string()
                    };
                    if self.children(id).is_empty() {
                        output.push_str(&label);
                    } else {
                        output.push_str("[.");
                        output.push_str(&label);
                        output.push(' ');
                    }
                }
                Step::Between => output.push(' '),
                Step::Leave(id) => {
                    if !self.children(id).is_empty() {
                        output.push_str(" ]");
                    }
                }
            }
        }
        output
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Enter(NodeId),
    Between,
    Leave(NodeId),
}

/// `C(A(0), B(1))`
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.steps() {
            match step {
                Step::Enter(id) => {
                    write!(f, "{}", self.label(id))?;
                    if !self.children(id).is_empty() {
                        write!(f, "(")?;
                    }
                }
                Step::Between => write!(f, ", ")?,
                Step::Leave(id) => {
                    if !self.children(id).is_empty() {
                        write!(f, ")")?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ParseTree {
        let mut tree = ParseTree::new('C');
        let root = tree.root();
        let a = tree.add_node('A', Some(root));
        let b = tree.add_node('B', Some(root));
        tree.add_node('0', Some(a));
        tree.add_node('1', Some(b));
        tree
    }

    #[test]
    fn attach_at_construction() {
        let tree = sample();
        let root = tree.root();
        let children = tree.children(root);

        assert_eq!(children.len(), 2);
        assert_eq!(tree.label(children[0]), 'A');
        assert_eq!(tree.parent(children[1]), Some(root));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.to_string(), "C(A(0), B(1))");
    }

    #[test]
    fn attach_later_is_idempotent() {
        let mut tree = ParseTree::new('A');
        let root = tree.root();
        let x = tree.add_node('x', None);

        assert_eq!(tree.parent(x), None);
        assert!(tree.add_child(root, x));
        assert!(!tree.add_child(root, x));
        assert_eq!(tree.children(root), &[x]);
        assert_eq!(tree.parent(x), Some(root));
    }

    #[test]
    fn reattach_moves_child() {
        let mut tree = sample();
        let root = tree.root();
        let a = tree.children(root)[0];
        let b = tree.children(root)[1];
        let zero = tree.children(a)[0];

        assert!(tree.add_child(b, zero));
        assert_eq!(tree.children(a), &[] as &[NodeId]);
        assert_eq!(tree.parent(zero), Some(b));
        assert_eq!(tree.to_string(), "C(A, B(1, 0))");
    }

    #[test]
    fn cycles_are_refused() {
        let mut tree = sample();
        let root = tree.root();
        let a = tree.children(root)[0];

        assert!(!tree.add_child(a, root));
        assert!(!tree.add_child(a, a));
        assert_eq!(tree.to_string(), "C(A(0), B(1))");
    }

    #[test]
    fn frontier_skips_epsilon() {
        let mut tree = ParseTree::new('E');
        let root = tree.root();
        let t = tree.add_node('T', Some(root));
        tree.add_node('i', Some(t));
        let y = tree.add_node('Y', Some(root));
        tree.add_node(EPSILON, Some(y));

        let labels: Vec<char> = tree.leaves().into_iter().map(|id| tree.label(id)).collect();
        assert_eq!(labels, vec!['i', 'ε']);
        assert_eq!(tree.frontier(), "i");
    }

    #[test]
    fn plaintext_and_json() {
        let tree = sample();

        assert_eq!(tree.to_plaintext(), "C\n  A\n    0\n  B\n    1");
        assert_eq!(
            tree.to_json(),
            r#"{"label":"C","children":[{"label":"A","children":[{"label":"0","children":[]}]},{"label":"B","children":[{"label":"1","children":[]}]}]}"#
        );
    }

    #[test]
    fn latex_qtree() {
        let mut tree = sample();
        let root = tree.root();
        let d = tree.add_node('D', Some(root));
        tree.add_node(EPSILON, Some(d));
        tree.add_node('x', Some(d));

        assert_eq!(
            tree.to_latex(),
            r"\Tree [.C [.A 0 ] [.B 1 ] [.D $\epsilon$ x ] ]"
        );
    }

    #[test]
    fn add_node_links_both_ways() {
        let mut tree = ParseTree::new('A');
        let root = tree.root();
        let x = tree.add_node('x', Some(root));
        let y = tree.add_node('y', None);

        assert_eq!(tree.children(root), &[x]);
        assert_eq!(tree.parent(x), Some(root));
        assert_eq!(tree.parent(y), None);
        assert_eq!(tree.node_count(), 3);
    }

    fn chain(depth: usize) -> ParseTree {
        let mut tree = ParseTree::new('N');
        let mut parent = tree.root();
        for _ in 0..depth {
            tree.add_node('d', Some(parent));
            parent = tree.add_node('N', Some(parent));
        }
        tree.add_node('n', Some(parent));
        tree
    }

    #[test]
    fn deep_tree_renders_without_recursion() {
        let depth = 200_000;
        let tree = chain(depth);

        let text = tree.to_string();
        assert!(text.starts_with("N(d, N(d, N("));
        assert!(text.ends_with(&")".repeat(depth + 1)));

        let json = tree.to_json();
        assert!(json.ends_with(&"]}".repeat(depth + 2)));
        assert!(tree.to_latex().ends_with(" ]"));
        assert_eq!(tree.frontier().len(), depth + 1);
    }
}
