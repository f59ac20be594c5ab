//! # Parse Tree
//!
//! A generic, write-only (from the generator's point of view) tree of
//! labelled nodes, built top-down in left-to-right sibling order as the
//! parser recurses. Rendered with the same box-drawing glyphs
//! (`├── └── │`) the Python original got for free from `anytree`.
//!
//! Generalises the teacher's per-non-terminal typed-struct tree (one Rust
//! type per production in `non_terminals.rs`) into the single node shape
//! the grammar's ~50 non-terminals actually need here; `make_indent`'s
//! spirit survives as [`render`]'s prefix bookkeeping.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

pub type NodeRef = Rc<RefCell<ParseTreeNode>>;

#[derive(Debug)]
pub struct ParseTreeNode {
    pub label: String,
    pub parent: Option<Weak<RefCell<ParseTreeNode>>>,
    pub children: Vec<NodeRef>,
}

impl ParseTreeNode {
    fn new(label: impl Into<String>, parent: Option<&NodeRef>) -> NodeRef {
        let node = Rc::new(RefCell::new(ParseTreeNode {
            label: label.into(),
            parent: parent.map(Rc::downgrade),
            children: Vec::new(),
        }));
        if let Some(parent) = parent {
            parent.borrow_mut().children.push(Rc::clone(&node));
        }
        node
    }
}

/// Owns the root and hands out child-attachment operations to the parser.
/// The parser is the only mutator; everything else only reads the tree.
pub struct ParseTree {
    root: NodeRef,
}

impl ParseTree {
    /// Creates the tree with a root labelled `root_label` (always
    /// `"Program"` in practice, per the data model's invariant).
    pub fn new(root_label: impl Into<String>) -> Self {
        ParseTree {
            root: ParseTreeNode::new(root_label, None),
        }
    }

    pub fn root(&self) -> NodeRef {
        Rc::clone(&self.root)
    }

    /// Attaches a fresh labelled child to `parent` and returns it, so the
    /// caller can recurse into it as the new parent.
    pub fn attach(&self, parent: &NodeRef, label: impl Into<String>) -> NodeRef {
        ParseTreeNode::new(label, Some(parent))
    }

    /// Renders the whole tree using `├── `, `└── `, and `│   ` connectors,
    /// one node per line, matching `parse_tree.txt`'s format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        writeln!(out, "{}", self.root.borrow().label).unwrap();
        render_children(&self.root, "", &mut out);
        out
    }
}

fn render_children(node: &NodeRef, prefix: &str, out: &mut String) {
    let node = node.borrow();
    let last_index = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        let is_last = i == last_index;
        let connector = if is_last { "└── " } else { "├── " };
        writeln!(out, "{prefix}{connector}{}", child.borrow().label).unwrap();
        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        render_children(child, &child_prefix, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_children_with_box_drawing_connectors() {
        let tree = ParseTree::new("Program");
        let root = tree.root();
        let decl_list = tree.attach(&root, "Declaration-list");
        tree.attach(&decl_list, "epsilon");
        tree.attach(&root, "$");

        let rendered = tree.render();
        assert_eq!(
            rendered,
            "Program\n├── Declaration-list\n│   └── epsilon\n└── $\n"
        );
    }
}
