//! Tree traversal.

use crate::node::Node;

/// Visit every node of `root` in pre-order (parent first, children left to right).
///
/// Uses an explicit stack, so arbitrarily deep trees are fine.
pub fn enumerate<'a, F>(root: &'a Node, mut visit: F)
where
    F: FnMut(&'a Node),
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visit(node);
        stack.extend(node.children.iter().rev());
    }
}
