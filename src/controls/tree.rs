//! Control nesting.
//!
//! Groups and expanders declare how many of the following descriptors they contain. The
//! builder keeps a stack of open scopes, each with the number of children it still expects;
//! a nested group counts as one child of its parent once it closes.

use crate::error::DescriptorError;

/// One registered control and the controls nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Registration index of the control.
    pub index: usize,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(index: usize) -> Self {
        Self {
            index,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlTree {
    pub roots: Vec<TreeNode>,
}

struct OpenScope {
    node: TreeNode,
    name: String,
    declared: usize,
    remaining: usize,
}

#[derive(Default)]
pub struct TreeBuilder {
    roots: Vec<TreeNode>,
    open: Vec<OpenScope>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next control. `group_children` is the declared child count for grouping
    /// controls and `None` for leaves.
    pub fn push(&mut self, index: usize, name: &str, group_children: Option<usize>) {
        let node = TreeNode::leaf(index);
        match group_children {
            Some(declared) if declared > 0 => self.open.push(OpenScope {
                node,
                name: name.to_string(),
                declared,
                remaining: declared,
            }),
            _ => self.attach(node),
        }
    }

    fn attach(&mut self, mut node: TreeNode) {
        while let Some(scope) = self.open.last_mut() {
            scope.node.children.push(node);
            scope.remaining -= 1;
            if scope.remaining > 0 {
                return;
            }
            match self.open.pop() {
                Some(closed) => node = closed.node,
                None => return,
            }
        }
        self.roots.push(node);
    }

    /// Finish registration. Fails if a group was declared with more children than followed.
    pub fn finish(self) -> Result<ControlTree, DescriptorError> {
        if let Some(scope) = self.open.last() {
            return Err(DescriptorError::UnclosedGroup {
                name: scope.name.clone(),
                declared: scope.declared,
                found: scope.declared - scope.remaining,
            });
        }
        Ok(ControlTree { roots: self.roots })
    }
}

#[cfg(test)]
mod tests {
    use super::{TreeBuilder, TreeNode};
    use crate::error::DescriptorError;

    fn leaf(index: usize) -> TreeNode {
        TreeNode {
            index,
            children: Vec::new(),
        }
    }

    #[test]
    fn nested_group_counts_as_one_child() {
        let mut builder = TreeBuilder::new();
        builder.push(0, "Outer", Some(2));
        builder.push(1, "Inner", Some(2));
        builder.push(2, "a", None);
        builder.push(3, "b", None);
        builder.push(4, "c", None);
        builder.push(5, "d", None);
        let tree = builder.finish().expect("tree");
        assert_eq!(
            tree.roots,
            vec![
                TreeNode {
                    index: 0,
                    children: vec![
                        TreeNode {
                            index: 1,
                            children: vec![leaf(2), leaf(3)],
                        },
                        leaf(4),
                    ],
                },
                leaf(5),
            ]
        );
    }

    #[test]
    fn empty_group_is_a_leaf() {
        let mut builder = TreeBuilder::new();
        builder.push(0, "Empty", Some(0));
        builder.push(1, "a", None);
        let tree = builder.finish().expect("tree");
        assert_eq!(tree.roots, vec![leaf(0), leaf(1)]);
    }

    #[test]
    fn unclosed_group_is_reported() {
        let mut builder = TreeBuilder::new();
        builder.push(0, "Outer", Some(3));
        builder.push(1, "a", None);
        assert_eq!(
            builder.finish(),
            Err(DescriptorError::UnclosedGroup {
                name: "Outer".to_string(),
                declared: 3,
                found: 1,
            })
        );
    }
}
