//! Flat heading list to nested forest.
//!
//! Each heading opens a node whose subtree runs until the next heading at
//! the same or a shallower level. Levels may skip (a level-3 heading directly
//! under a level-1 heading becomes its child) and need not start at 1.
//! Empty-text headings are dropped before nesting, so they never close a
//! subtree.

use crate::heading::{Heading, HeadingNode};

/// Build the ToC forest for an ordered heading sequence.
///
/// Pre-order traversal of the result reproduces `headings` with empty-text
/// entries removed.
///
/// Runs in a single pass over `headings`, without recursion, so arbitrarily
/// deep level sequences are fine.
#[must_use]
pub fn synthesize(headings: &[Heading]) -> Vec<HeadingNode> {
    let mut roots = Vec::new();
    // Nodes whose subtree is still open, outermost first. Levels strictly
    // increase towards the top of the stack.
    let mut open: Vec<HeadingNode> = Vec::new();

    for heading in headings.iter().filter(|h| !h.is_empty()) {
        while let Some(closed) = open.pop_if(|top| heading.level <= top.heading.level) {
            attach(&mut open, &mut roots, closed);
        }
        open.push(HeadingNode::leaf(heading.clone()));
    }
    while let Some(closed) = open.pop() {
        attach(&mut open, &mut roots, closed);
    }

    roots
}

/// Append a finished node to the innermost open node, or to the roots.
fn attach(open: &mut [HeadingNode], roots: &mut Vec<HeadingNode>, node: HeadingNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}
